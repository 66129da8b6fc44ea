//! Persistence port. Services depend on `dyn Store`; `PgStore` backs
//! production and `MemoryStore` backs tests and `memory://` runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, User},
    clients::{dto::ClientInput, repo_types::Client},
    error::ServiceResult,
    orders::repo_types::{ClientRanking, NewOrder, Order, OrderFilter, OrderPatch, SellerRanking},
    products::{dto::ProductInput, repo_types::Product},
};

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, id: Uuid) -> ServiceResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> ServiceResult<Option<User>>;
    /// Fails with `AlreadyExists` when the email is taken.
    async fn insert_user(&self, user: NewUser) -> ServiceResult<User>;

    async fn find_client(&self, id: Uuid) -> ServiceResult<Option<Client>>;
    async fn find_client_by_email(&self, email: &str) -> ServiceResult<Option<Client>>;
    async fn list_clients(&self, seller_id: Option<Uuid>) -> ServiceResult<Vec<Client>>;
    async fn insert_client(&self, seller_id: Uuid, input: ClientInput) -> ServiceResult<Client>;
    async fn update_client(&self, id: Uuid, input: ClientInput) -> ServiceResult<Option<Client>>;
    async fn delete_client(&self, id: Uuid) -> ServiceResult<bool>;

    async fn find_product(&self, id: Uuid) -> ServiceResult<Option<Product>>;
    async fn list_products(&self) -> ServiceResult<Vec<Product>>;
    async fn search_products(&self, text: &str, limit: i64) -> ServiceResult<Vec<Product>>;
    async fn insert_product(&self, input: ProductInput) -> ServiceResult<Product>;
    async fn update_product(&self, id: Uuid, input: ProductInput) -> ServiceResult<Option<Product>>;
    async fn delete_product(&self, id: Uuid) -> ServiceResult<bool>;

    async fn find_order(&self, id: Uuid) -> ServiceResult<Option<Order>>;
    async fn list_orders(&self, filter: OrderFilter) -> ServiceResult<Vec<Order>>;
    /// Decrements stock for every line item and inserts the order atomically:
    /// on `NotFound` or `InsufficientStock` nothing is written.
    async fn insert_order(&self, order: NewOrder) -> ServiceResult<Order>;
    /// Same all-or-nothing contract as `insert_order` for `patch.items`.
    async fn update_order(&self, id: Uuid, patch: OrderPatch) -> ServiceResult<Option<Order>>;
    async fn delete_order(&self, id: Uuid) -> ServiceResult<bool>;

    async fn top_clients(&self) -> ServiceResult<Vec<ClientRanking>>;
    async fn top_sellers(&self, limit: i64) -> ServiceResult<Vec<SellerRanking>>;
}
