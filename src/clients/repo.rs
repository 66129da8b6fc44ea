use sqlx::PgPool;
use uuid::Uuid;

use crate::clients::{dto::ClientInput, repo_types::Client};
use crate::error::{ServiceError, ServiceResult};
use crate::store::postgres::is_unique_violation;

const CLIENT_COLUMNS: &str = "id, name, surname, company, email, phone, seller_id, created_at";

fn map_write_error(e: sqlx::Error, email: &str) -> ServiceError {
    if is_unique_violation(&e) {
        ServiceError::AlreadyExists { entity: "client", email: email.to_string() }
    } else {
        e.into()
    }
}

impl Client {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> ServiceResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(client)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> ServiceResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(client)
    }

    /// All clients, or only those of `seller_id` when given.
    pub async fn list(db: &PgPool, seller_id: Option<Uuid>) -> ServiceResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, Client>(&format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE $1::uuid IS NULL OR seller_id = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(seller_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(db: &PgPool, seller_id: Uuid, input: &ClientInput) -> ServiceResult<Client> {
        sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (name, surname, company, email, phone, seller_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.surname)
        .bind(&input.company)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(seller_id)
        .fetch_one(db)
        .await
        .map_err(|e| map_write_error(e, &input.email))
    }

    pub async fn update(db: &PgPool, id: Uuid, input: &ClientInput) -> ServiceResult<Option<Client>> {
        sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clients
               SET name = $2, surname = $3, company = $4, email = $5, phone = $6
             WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.surname)
        .bind(&input.company)
        .bind(&input.email)
        .bind(&input.phone)
        .fetch_optional(db)
        .await
        .map_err(|e| map_write_error(e, &input.email))
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> ServiceResult<bool> {
        let res = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
