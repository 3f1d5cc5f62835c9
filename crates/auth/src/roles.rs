use serde::{Deserialize, Serialize};

use salon_core::{RoleId, UserId};

/// Seeded role names. Route policies refer to roles by name.
pub const ADMINISTRATOR: &str = "Administrador";
pub const EMPLOYEE: &str = "Empleado";
pub const CLIENT: &str = "Cliente";

/// A role as stored in the directory. Created by seed/admin data; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub description: Option<String>,
}

impl Role {
    pub fn new(id: RoleId, name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.map(str::to_string),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The three roles every deployment starts with, in id order.
    pub fn seeded() -> Vec<Role> {
        vec![
            Role::new(RoleId::new(1), ADMINISTRATOR, Some("Acceso completo al sistema")),
            Role::new(RoleId::new(2), EMPLOYEE, Some("Puede gestionar citas y ventas")),
            Role::new(
                RoleId::new(3),
                CLIENT,
                Some("Acceso limitado para ver citas y servicios"),
            ),
        ]
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Catalogue entry: a role with the number of accounts holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    #[serde(flatten)]
    pub role: Role,
    pub user_count: usize,
}

/// A role with the accounts holding it, active or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleDetail {
    #[serde(flatten)]
    pub role: Role,
    pub users: Vec<RoleMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleMember {
    pub id: UserId,
    pub email: String,
    pub active: bool,
}
