use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ownership::Owned;

/// Customer record owned by a single seller.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    pub company: String,
    pub email: String,
    pub phone: Option<String>,
    pub seller_id: Uuid,
    pub created_at: OffsetDateTime,
}

impl Owned for Client {
    const ENTITY: &'static str = "client";

    fn id(&self) -> Uuid {
        self.id
    }
    fn owner_id(&self) -> Uuid {
        self.seller_id
    }
}
