use async_graphql::{Context, Object, Result};
use uuid::Uuid;

use super::{acting_user, extend, store};
use crate::{
    auth::{
        dto::{AuthInput, Token, UserInput},
        jwt::JwtKeys,
        repo_types::User,
        services as auth,
    },
    clients::{dto::ClientInput, repo_types::Client, services as clients},
    orders::{
        dto::{OrderInput, OrderUpdateInput},
        repo_types::Order,
        services as orders,
    },
    products::{dto::ProductInput, repo_types::Product, services as products},
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn register_user(&self, ctx: &Context<'_>, input: UserInput) -> Result<User> {
        auth::register(store(ctx)?.as_ref(), input).await.map_err(extend)
    }

    async fn authenticate_user(&self, ctx: &Context<'_>, input: AuthInput) -> Result<Token> {
        let keys = ctx.data::<JwtKeys>()?;
        auth::authenticate(store(ctx)?.as_ref(), keys, input)
            .await
            .map_err(extend)
    }

    async fn create_product(&self, ctx: &Context<'_>, input: ProductInput) -> Result<Product> {
        acting_user(ctx)?;
        products::create_product(store(ctx)?.as_ref(), input).await.map_err(extend)
    }

    async fn update_product(&self, ctx: &Context<'_>, id: Uuid, input: ProductInput) -> Result<Product> {
        acting_user(ctx)?;
        products::update_product(store(ctx)?.as_ref(), id, input).await.map_err(extend)
    }

    async fn delete_product(&self, ctx: &Context<'_>, id: Uuid) -> Result<String> {
        acting_user(ctx)?;
        products::delete_product(store(ctx)?.as_ref(), id).await.map_err(extend)
    }

    async fn create_client(&self, ctx: &Context<'_>, input: ClientInput) -> Result<Client> {
        let seller = acting_user(ctx)?;
        clients::create_client(store(ctx)?.as_ref(), seller, input).await.map_err(extend)
    }

    async fn update_client(&self, ctx: &Context<'_>, id: Uuid, input: ClientInput) -> Result<Client> {
        let seller = acting_user(ctx)?;
        clients::update_client(store(ctx)?.as_ref(), seller, id, input)
            .await
            .map_err(extend)
    }

    async fn delete_client(&self, ctx: &Context<'_>, id: Uuid) -> Result<String> {
        let seller = acting_user(ctx)?;
        clients::delete_client(store(ctx)?.as_ref(), seller, id).await.map_err(extend)
    }

    async fn create_order(&self, ctx: &Context<'_>, input: OrderInput) -> Result<Order> {
        let seller = acting_user(ctx)?;
        orders::place_order(store(ctx)?.as_ref(), seller, input).await.map_err(extend)
    }

    async fn update_order(&self, ctx: &Context<'_>, id: Uuid, input: OrderUpdateInput) -> Result<Order> {
        let seller = acting_user(ctx)?;
        orders::update_order(store(ctx)?.as_ref(), seller, id, input)
            .await
            .map_err(extend)
    }

    async fn delete_order(&self, ctx: &Context<'_>, id: Uuid) -> Result<String> {
        let seller = acting_user(ctx)?;
        orders::delete_order(store(ctx)?.as_ref(), seller, id).await.map_err(extend)
    }
}
