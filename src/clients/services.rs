use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::{is_valid_email, normalize_email},
    clients::{dto::ClientInput, repo_types::Client},
    error::{ServiceError, ServiceResult},
    ownership::ensure_owner,
    store::Store,
};

fn validate(input: ClientInput) -> ServiceResult<ClientInput> {
    let email = normalize_email(&input.email);
    if !is_valid_email(&email) {
        return Err(ServiceError::validation("invalid client email"));
    }
    let name = input.name.trim().to_string();
    let surname = input.surname.trim().to_string();
    if name.is_empty() || surname.is_empty() {
        return Err(ServiceError::validation("client name and surname are required"));
    }
    Ok(ClientInput {
        name,
        surname,
        company: input.company.trim().to_string(),
        email,
        phone: input.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
    })
}

async fn fetch(store: &dyn Store, id: Uuid) -> ServiceResult<Client> {
    store
        .find_client(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("client", id))
}

pub async fn list_all_clients(store: &dyn Store) -> ServiceResult<Vec<Client>> {
    store.list_clients(None).await
}

pub async fn list_seller_clients(store: &dyn Store, seller_id: Uuid) -> ServiceResult<Vec<Client>> {
    store.list_clients(Some(seller_id)).await
}

#[instrument(skip(store))]
pub async fn get_client(store: &dyn Store, seller_id: Uuid, id: Uuid) -> ServiceResult<Client> {
    let client = fetch(store, id).await?;
    ensure_owner(&client, seller_id)?;
    Ok(client)
}

#[instrument(skip(store, input), fields(email = %input.email))]
pub async fn create_client(
    store: &dyn Store,
    seller_id: Uuid,
    input: ClientInput,
) -> ServiceResult<Client> {
    let input = validate(input)?;
    if store.find_client_by_email(&input.email).await?.is_some() {
        warn!("client already registered");
        return Err(ServiceError::AlreadyExists { entity: "client", email: input.email });
    }
    let client = store.insert_client(seller_id, input).await?;
    info!(client_id = %client.id, "client created");
    Ok(client)
}

#[instrument(skip(store, input))]
pub async fn update_client(
    store: &dyn Store,
    seller_id: Uuid,
    id: Uuid,
    input: ClientInput,
) -> ServiceResult<Client> {
    let client = fetch(store, id).await?;
    ensure_owner(&client, seller_id)?;

    let updated = store
        .update_client(id, validate(input)?)
        .await?
        .ok_or_else(|| ServiceError::not_found("client", id))?;
    info!("client updated");
    Ok(updated)
}

/// Removes the client only. Its orders stay in place.
#[instrument(skip(store))]
pub async fn delete_client(store: &dyn Store, seller_id: Uuid, id: Uuid) -> ServiceResult<String> {
    let client = fetch(store, id).await?;
    ensure_owner(&client, seller_id)?;

    if !store.delete_client(id).await? {
        return Err(ServiceError::not_found("client", id));
    }
    info!("client deleted");
    Ok("client deleted".to_string())
}
