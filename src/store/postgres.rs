use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::Store;
use crate::{
    auth::repo_types::{NewUser, User},
    clients::{dto::ClientInput, repo_types::Client},
    error::ServiceResult,
    orders::repo_types::{ClientRanking, NewOrder, Order, OrderFilter, OrderPatch, SellerRanking},
    products::{dto::ProductInput, repo_types::Product},
};

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: Uuid) -> ServiceResult<Option<User>> {
        User::find_by_id(&self.db, id).await
    }

    async fn find_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        User::find_by_email(&self.db, email).await
    }

    async fn insert_user(&self, user: NewUser) -> ServiceResult<User> {
        User::create(&self.db, user).await
    }

    async fn find_client(&self, id: Uuid) -> ServiceResult<Option<Client>> {
        Client::find_by_id(&self.db, id).await
    }

    async fn find_client_by_email(&self, email: &str) -> ServiceResult<Option<Client>> {
        Client::find_by_email(&self.db, email).await
    }

    async fn list_clients(&self, seller_id: Option<Uuid>) -> ServiceResult<Vec<Client>> {
        Client::list(&self.db, seller_id).await
    }

    async fn insert_client(&self, seller_id: Uuid, input: ClientInput) -> ServiceResult<Client> {
        Client::create(&self.db, seller_id, &input).await
    }

    async fn update_client(&self, id: Uuid, input: ClientInput) -> ServiceResult<Option<Client>> {
        Client::update(&self.db, id, &input).await
    }

    async fn delete_client(&self, id: Uuid) -> ServiceResult<bool> {
        Client::delete(&self.db, id).await
    }

    async fn find_product(&self, id: Uuid) -> ServiceResult<Option<Product>> {
        Product::find_by_id(&self.db, id).await
    }

    async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Product::list(&self.db).await
    }

    async fn search_products(&self, text: &str, limit: i64) -> ServiceResult<Vec<Product>> {
        Product::search(&self.db, text, limit).await
    }

    async fn insert_product(&self, input: ProductInput) -> ServiceResult<Product> {
        Product::create(&self.db, &input).await
    }

    async fn update_product(&self, id: Uuid, input: ProductInput) -> ServiceResult<Option<Product>> {
        Product::update(&self.db, id, &input).await
    }

    async fn delete_product(&self, id: Uuid) -> ServiceResult<bool> {
        Product::delete(&self.db, id).await
    }

    async fn find_order(&self, id: Uuid) -> ServiceResult<Option<Order>> {
        Order::find_by_id(&self.db, id).await
    }

    async fn list_orders(&self, filter: OrderFilter) -> ServiceResult<Vec<Order>> {
        Order::list(&self.db, filter).await
    }

    async fn insert_order(&self, order: NewOrder) -> ServiceResult<Order> {
        Order::create_reserving(&self.db, &order).await
    }

    async fn update_order(&self, id: Uuid, patch: OrderPatch) -> ServiceResult<Option<Order>> {
        Order::update_reserving(&self.db, id, &patch).await
    }

    async fn delete_order(&self, id: Uuid) -> ServiceResult<bool> {
        Order::delete(&self.db, id).await
    }

    async fn top_clients(&self) -> ServiceResult<Vec<ClientRanking>> {
        ClientRanking::top(&self.db).await
    }

    async fn top_sellers(&self, limit: i64) -> ServiceResult<Vec<SellerRanking>> {
        SellerRanking::top(&self.db, limit).await
    }
}
