use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::error::{ServiceError, ServiceResult};
use crate::store::postgres::is_unique_violation;

const USER_COLUMNS: &str = "id, name, surname, email, password_hash, created_at";

impl User {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by (normalised) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password.
    pub async fn create(db: &PgPool, new: NewUser) -> ServiceResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, surname, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.surname)
        .bind(&new.email)
        .bind(&new.password_hash)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::AlreadyExists { entity: "user", email: new.email.clone() }
            } else {
                e.into()
            }
        })?;
        Ok(user)
    }
}
