use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    clients::repo_types::Client,
    error::{ServiceError, ServiceResult},
    orders::{
        dto::{OrderInput, OrderUpdateInput},
        repo_types::{
            ClientRanking, LineItem, NewOrder, Order, OrderFilter, OrderPatch, OrderStatus,
            SellerRanking,
        },
    },
    ownership::ensure_owner,
    store::Store,
};

/// Number of sellers returned by `top_sellers`.
pub const TOP_SELLERS: i64 = 3;

fn validate_items(items: &[LineItem]) -> ServiceResult<()> {
    if items.is_empty() {
        return Err(ServiceError::validation("an order needs at least one line item"));
    }
    if let Some(bad) = items.iter().find(|i| i.quantity <= 0) {
        return Err(ServiceError::validation(format!(
            "quantity for product {} must be positive",
            bad.product_id
        )));
    }
    Ok(())
}

fn validate_total(total: f64) -> ServiceResult<()> {
    if !total.is_finite() || total < 0.0 {
        return Err(ServiceError::validation("total must be a non-negative number"));
    }
    Ok(())
}

async fn fetch_order(store: &dyn Store, id: Uuid) -> ServiceResult<Order> {
    store
        .find_order(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("order", id))
}

/// Loads the client and checks it belongs to `seller_id`.
async fn owned_client(store: &dyn Store, seller_id: Uuid, client_id: Uuid) -> ServiceResult<Client> {
    let client = store
        .find_client(client_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("client", client_id))?;
    ensure_owner(&client, seller_id)?;
    Ok(client)
}

/// Places an order for one of the caller's clients. Stock for every line item
/// is reserved atomically with the insert; a shortfall on any item leaves all
/// stock untouched.
#[instrument(skip(store, input), fields(client_id = %input.client_id, items = input.items.len()))]
pub async fn place_order(store: &dyn Store, seller_id: Uuid, input: OrderInput) -> ServiceResult<Order> {
    let client = owned_client(store, seller_id, input.client_id).await?;
    validate_items(&input.items)?;
    validate_total(input.total)?;

    let order = store
        .insert_order(NewOrder {
            client_id: client.id,
            seller_id,
            items: input.items,
            total: input.total,
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "order placement rejected");
            e
        })?;

    info!(order_id = %order.id, total = order.total, "order placed");
    Ok(order)
}

/// Updates an order owned by the caller. New line items are reserved on top
/// of whatever the order already consumed; stock for replaced items is not
/// returned.
#[instrument(skip(store, input))]
pub async fn update_order(
    store: &dyn Store,
    seller_id: Uuid,
    id: Uuid,
    input: OrderUpdateInput,
) -> ServiceResult<Order> {
    let order = fetch_order(store, id).await?;
    ensure_owner(&order, seller_id)?;
    owned_client(store, seller_id, input.client_id.unwrap_or(order.client_id)).await?;

    if let Some(items) = &input.items {
        validate_items(items)?;
    }
    if let Some(total) = input.total {
        validate_total(total)?;
    }

    let patch = OrderPatch {
        client_id: input.client_id,
        items: input.items,
        total: input.total,
        status: input.status,
    };
    let updated = store
        .update_order(id, patch)
        .await?
        .ok_or_else(|| ServiceError::not_found("order", id))?;

    info!(status = ?updated.status, "order updated");
    Ok(updated)
}

#[instrument(skip(store))]
pub async fn delete_order(store: &dyn Store, seller_id: Uuid, id: Uuid) -> ServiceResult<String> {
    let order = fetch_order(store, id).await?;
    ensure_owner(&order, seller_id)?;

    if !store.delete_order(id).await? {
        return Err(ServiceError::not_found("order", id));
    }
    info!("order deleted");
    Ok("order deleted".to_string())
}

pub async fn get_order(store: &dyn Store, seller_id: Uuid, id: Uuid) -> ServiceResult<Order> {
    let order = fetch_order(store, id).await?;
    ensure_owner(&order, seller_id)?;
    Ok(order)
}

pub async fn list_all_orders(store: &dyn Store) -> ServiceResult<Vec<Order>> {
    store.list_orders(OrderFilter::default()).await
}

pub async fn list_seller_orders(store: &dyn Store, seller_id: Uuid) -> ServiceResult<Vec<Order>> {
    store
        .list_orders(OrderFilter { seller_id: Some(seller_id), status: None })
        .await
}

pub async fn list_orders_by_status(
    store: &dyn Store,
    seller_id: Uuid,
    status: OrderStatus,
) -> ServiceResult<Vec<Order>> {
    store
        .list_orders(OrderFilter { seller_id: Some(seller_id), status: Some(status) })
        .await
}

pub async fn top_clients(store: &dyn Store) -> ServiceResult<Vec<ClientRanking>> {
    store.top_clients().await
}

pub async fn top_sellers(store: &dyn Store) -> ServiceResult<Vec<SellerRanking>> {
    store.top_sellers(TOP_SELLERS).await
}
