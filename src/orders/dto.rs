use async_graphql::InputObject;
use uuid::Uuid;

use super::repo_types::{LineItem, OrderStatus};

#[derive(Debug, Clone, InputObject)]
pub struct OrderInput {
    pub client_id: Uuid,
    pub items: Vec<LineItem>,
    pub total: f64,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, InputObject)]
pub struct OrderUpdateInput {
    pub client_id: Option<Uuid>,
    pub items: Option<Vec<LineItem>>,
    pub total: Option<f64>,
    pub status: Option<OrderStatus>,
}
