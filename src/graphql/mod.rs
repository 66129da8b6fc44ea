mod mutation;
mod query;

use std::sync::Arc;

use async_graphql::{http::GraphiQLSource, Context, EmptySubscription, ErrorExtensions, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use uuid::Uuid;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

use crate::{
    auth::{extractors::Viewer, jwt::JwtKeys},
    error::ServiceError,
    state::AppState,
    store::Store,
};

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(store: Arc<dyn Store>, keys: JwtKeys) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .data(keys)
        .finish()
}

pub async fn graphql_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    req: GraphQLRequest,
) -> GraphQLResponse {
    state.schema.execute(req.into_inner().data(viewer)).await.into()
}

pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

fn store<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<dyn Store>> {
    ctx.data::<Arc<dyn Store>>()
}

fn viewer(ctx: &Context<'_>) -> Viewer {
    ctx.data_opt::<Viewer>().copied().unwrap_or_default()
}

/// Acting user id, or an `UNAUTHENTICATED` error for anonymous requests.
fn acting_user(ctx: &Context<'_>) -> async_graphql::Result<Uuid> {
    viewer(ctx).require().map_err(|e| e.extend())
}

fn extend(e: ServiceError) -> async_graphql::Error {
    e.extend()
}
