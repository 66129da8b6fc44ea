use async_graphql::{Enum, InputObject, SimpleObject};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{auth::repo_types::User, clients::repo_types::Client, ownership::Owned};

/// Order lifecycle. Wire and database values keep the Spanish names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Enum, sqlx::Type)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "PENDIENTE")]
    #[graphql(name = "PENDIENTE")]
    #[sqlx(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "COMPLETADO")]
    #[graphql(name = "COMPLETADO")]
    #[sqlx(rename = "COMPLETADO")]
    Completed,
    #[serde(rename = "CANCELADO")]
    #[graphql(name = "CANCELADO")]
    #[sqlx(rename = "CANCELADO")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject, InputObject)]
#[graphql(input_name = "LineItemInput")]
pub struct LineItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct Order {
    pub id: Uuid,
    pub client_id: Uuid,
    pub seller_id: Uuid,
    #[sqlx(json)]
    pub items: Vec<LineItem>,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: OffsetDateTime,
}

impl Owned for Order {
    const ENTITY: &'static str = "order";

    fn id(&self) -> Uuid {
        self.id
    }
    fn owner_id(&self) -> Uuid {
        self.seller_id
    }
}

/// Order about to be persisted. The store reserves `items` and inserts the
/// row as one unit.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub client_id: Uuid,
    pub seller_id: Uuid,
    pub items: Vec<LineItem>,
    pub total: f64,
}

/// Fields to overwrite on an existing order. When `items` is present the
/// store reserves them together with the update.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub client_id: Option<Uuid>,
    pub items: Option<Vec<LineItem>>,
    pub total: Option<f64>,
    pub status: Option<OrderStatus>,
}

/// Optional filters for order listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub seller_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

/// A client with the summed total of its completed orders.
#[derive(Debug, Clone, FromRow, SimpleObject)]
pub struct ClientRanking {
    pub total: f64,
    #[sqlx(flatten)]
    pub client: Client,
}

/// A seller with the summed total of their completed orders.
#[derive(Debug, Clone, FromRow, SimpleObject)]
pub struct SellerRanking {
    pub total: f64,
    #[sqlx(flatten)]
    pub seller: User,
}
