use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use super::{acting_user, extend, store, viewer};
use crate::{
    auth::repo_types::User,
    clients::{repo_types::Client, services as clients},
    orders::{
        repo_types::{ClientRanking, Order, OrderStatus, SellerRanking},
        services as orders,
    },
    products::{repo_types::Product, services as products},
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The authenticated seller, or null for anonymous requests.
    async fn current_user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(id) = viewer(ctx).0 else {
            return Ok(None);
        };
        store(ctx)?.find_user(id).await.map_err(extend)
    }

    async fn products(&self, ctx: &Context<'_>) -> Result<Vec<Product>> {
        products::list_products(store(ctx)?.as_ref()).await.map_err(extend)
    }

    async fn product(&self, ctx: &Context<'_>, id: Uuid) -> Result<Product> {
        products::get_product(store(ctx)?.as_ref(), id).await.map_err(extend)
    }

    /// Full-text search on product names, at most ten results.
    async fn search_products(&self, ctx: &Context<'_>, text: String) -> Result<Vec<Product>> {
        products::search_products(store(ctx)?.as_ref(), &text).await.map_err(extend)
    }

    async fn clients(&self, ctx: &Context<'_>) -> Result<Vec<Client>> {
        acting_user(ctx)?;
        clients::list_all_clients(store(ctx)?.as_ref()).await.map_err(extend)
    }

    async fn seller_clients(&self, ctx: &Context<'_>) -> Result<Vec<Client>> {
        let seller = acting_user(ctx)?;
        clients::list_seller_clients(store(ctx)?.as_ref(), seller).await.map_err(extend)
    }

    async fn client(&self, ctx: &Context<'_>, id: Uuid) -> Result<Client> {
        let seller = acting_user(ctx)?;
        clients::get_client(store(ctx)?.as_ref(), seller, id).await.map_err(extend)
    }

    async fn orders(&self, ctx: &Context<'_>) -> Result<Vec<Order>> {
        acting_user(ctx)?;
        orders::list_all_orders(store(ctx)?.as_ref()).await.map_err(extend)
    }

    async fn seller_orders(&self, ctx: &Context<'_>) -> Result<Vec<Order>> {
        let seller = acting_user(ctx)?;
        orders::list_seller_orders(store(ctx)?.as_ref(), seller).await.map_err(extend)
    }

    async fn order(&self, ctx: &Context<'_>, id: Uuid) -> Result<Order> {
        let seller = acting_user(ctx)?;
        orders::get_order(store(ctx)?.as_ref(), seller, id).await.map_err(extend)
    }

    async fn orders_by_status(&self, ctx: &Context<'_>, status: OrderStatus) -> Result<Vec<Order>> {
        let seller = acting_user(ctx)?;
        orders::list_orders_by_status(store(ctx)?.as_ref(), seller, status)
            .await
            .map_err(extend)
    }

    /// Clients ranked by the value of their completed orders.
    async fn top_clients(&self, ctx: &Context<'_>) -> Result<Vec<ClientRanking>> {
        acting_user(ctx)?;
        orders::top_clients(store(ctx)?.as_ref()).await.map_err(extend)
    }

    /// The three sellers with the highest completed-order value.
    async fn top_sellers(&self, ctx: &Context<'_>) -> Result<Vec<SellerRanking>> {
        acting_user(ctx)?;
        orders::top_sellers(store(ctx)?.as_ref()).await.map_err(extend)
    }
}
