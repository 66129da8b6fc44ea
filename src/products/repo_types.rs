use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub stock: i32,   // units on hand, never negative
    pub price: f64,
    pub created_at: OffsetDateTime,
}
