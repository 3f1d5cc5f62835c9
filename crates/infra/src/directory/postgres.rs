//! Postgres-backed account directory.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | DirectoryError | Scenario |
//! |------------|----------------------|----------------|----------|
//! | Database (unique violation) | `23505` | `EmailTaken` | Email already held by another row |
//! | Database (foreign key violation) | `23503` | `RoleNotFound` | `role_id` has no row in `roles` |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | Other | N/A | `Backend` | Pool closed, network errors, etc. |
//!
//! The unique index on `users.email` is what makes concurrent registration
//! with one email produce exactly one account.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;

use salon_auth::{AccountDirectory, DirectoryError, NewUser, Role, User, UserChanges};
use salon_core::{RoleId, UserId};

const ACCOUNTS_SCHEMA: &str = include_str!("../../migrations/0001_accounts.sql");

/// Columns of a user joined with its role, shared by every user query.
const USER_COLUMNS: &str = r#"
    u.id, u.email, u.password_hash, u.role_id, u.active, u.last_access_at, u.created_at,
    r.name AS role_name, r.description AS role_description
"#;

#[derive(Debug, Clone)]
pub struct PostgresAccountDirectory {
    pool: Arc<PgPool>,
}

impl PostgresAccountDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect a pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, DirectoryError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the schema if missing and make sure the seeded roles exist.
    ///
    /// Idempotent; safe to run on every startup.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), DirectoryError> {
        sqlx::raw_sql(ACCOUNTS_SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;

        for role in Role::seeded() {
            sqlx::query(
                "INSERT INTO roles (id, name, description) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
            )
            .bind(role.id.get())
            .bind(&role.name)
            .bind(role.description.as_deref())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("seed_roles", e))?;
        }

        // Explicit ids bypass the sequence; move it past them.
        sqlx::query("SELECT setval(pg_get_serial_sequence('roles', 'id'), (SELECT MAX(id) FROM roles))")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("seed_roles", e))?;

        tracing::info!("account schema ready");
        Ok(())
    }

    async fn fetch_user(&self, operation: &str, filter: &str, bind: UserFilter<'_>) -> Result<Option<User>, DirectoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE {filter}");
        let query = sqlx::query(&sql);
        let query = match bind {
            UserFilter::Id(id) => query.bind(id.get()),
            UserFilter::Email(email) => query.bind(email),
        };

        let row = query
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        row.as_ref().map(user_from_row).transpose()
    }
}

enum UserFilter<'a> {
    Id(UserId),
    Email(&'a str),
}

#[async_trait]
impl AccountDirectory for PostgresAccountDirectory {
    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        self.fetch_user("find_by_email", "u.email = $1", UserFilter::Email(email)).await
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DirectoryError> {
        self.fetch_user("find_by_id", "u.id = $1", UserFilter::Id(id)).await
    }

    async fn list_users(&self) -> Result<Vec<User>, DirectoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id ORDER BY u.id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_users", e))?;

        rows.iter().map(user_from_row).collect()
    }

    #[instrument(skip(self, new_user), fields(role_id = %new_user.role_id), err)]
    async fn create(&self, new_user: NewUser) -> Result<User, DirectoryError> {
        let sql = format!(
            r#"
            WITH u AS (
                INSERT INTO users (email, password_hash, role_id, active)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {USER_COLUMNS} FROM u JOIN roles r ON r.id = u.role_id
            "#
        );

        let row = sqlx::query(&sql)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(new_user.role_id.get())
            .bind(new_user.active)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("create", e))?;

        user_from_row(&row)
    }

    #[instrument(skip(self, changes), fields(user_id = %id), err)]
    async fn update(&self, id: UserId, changes: UserChanges) -> Result<User, DirectoryError> {
        let sql = format!(
            r#"
            WITH u AS (
                UPDATE users SET
                    email = COALESCE($2, email),
                    password_hash = COALESCE($3, password_hash),
                    role_id = COALESCE($4, role_id),
                    active = COALESCE($5, active)
                WHERE id = $1
                RETURNING *
            )
            SELECT {USER_COLUMNS} FROM u JOIN roles r ON r.id = u.role_id
            "#
        );

        let row = sqlx::query(&sql)
            .bind(id.get())
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.role_id.map(RoleId::get))
            .bind(changes.active)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;

        row.as_ref().map(user_from_row).transpose()?.ok_or(DirectoryError::NotFound)
    }

    async fn update_last_access(&self, id: UserId, at: DateTime<Utc>) -> Result<(), DirectoryError> {
        let result = sqlx::query("UPDATE users SET last_access_at = $2 WHERE id = $1")
            .bind(id.get())
            .bind(at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_last_access", e))?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn update_active_flag(&self, id: UserId, active: bool) -> Result<User, DirectoryError> {
        self.update(
            id,
            UserChanges {
                active: Some(active),
                ..Default::default()
            },
        )
        .await
    }

    async fn role_exists(&self, id: RoleId) -> Result<bool, DirectoryError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM roles WHERE id = $1) AS present")
            .bind(id.get())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("role_exists", e))?;

        row.try_get("present").map_err(|e| map_sqlx_error("role_exists", e))
    }

    async fn find_role(&self, id: RoleId) -> Result<Option<Role>, DirectoryError> {
        let row = sqlx::query("SELECT id, name, description FROM roles WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_role", e))?;

        row.as_ref().map(role_from_row).transpose()
    }

    async fn list_roles(&self) -> Result<Vec<Role>, DirectoryError> {
        let rows = sqlx::query("SELECT id, name, description FROM roles ORDER BY id ASC")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_roles", e))?;

        rows.iter().map(role_from_row).collect()
    }
}

fn user_from_row(row: &PgRow) -> Result<User, DirectoryError> {
    let decode = |e| map_sqlx_error("decode_user", e);
    let role_id: i64 = row.try_get("role_id").map_err(decode)?;

    Ok(User {
        id: UserId::new(row.try_get("id").map_err(decode)?),
        email: row.try_get("email").map_err(decode)?,
        password_hash: row.try_get("password_hash").map_err(decode)?,
        role: Role {
            id: RoleId::new(role_id),
            name: row.try_get("role_name").map_err(decode)?,
            description: row.try_get("role_description").map_err(decode)?,
        },
        active: row.try_get("active").map_err(decode)?,
        last_access_at: row.try_get("last_access_at").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}

fn role_from_row(row: &PgRow) -> Result<Role, DirectoryError> {
    let decode = |e| map_sqlx_error("decode_role", e);
    Ok(Role {
        id: RoleId::new(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> DirectoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            if db_err.is_unique_violation() {
                return DirectoryError::EmailTaken;
            }
            if db_err.is_foreign_key_violation() {
                return DirectoryError::RoleNotFound;
            }
            DirectoryError::Backend(format!("database error in {operation}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => DirectoryError::Backend(format!("connection pool closed in {operation}")),
        _ => DirectoryError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}
