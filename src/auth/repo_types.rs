use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Seller account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[graphql(skip)]
    pub password_hash: String,      // Argon2 hash, never exposed
    pub created_at: OffsetDateTime,
}

/// Fields for a user about to be inserted; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
}
