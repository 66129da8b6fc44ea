use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{ServiceError, ServiceResult},
    products::{dto::ProductInput, repo_types::Product},
    store::Store,
};

/// Upper bound on `search_products` results.
pub const SEARCH_LIMIT: i64 = 10;

fn validate(input: ProductInput) -> ServiceResult<ProductInput> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::validation("product name must not be empty"));
    }
    if input.stock < 0 {
        return Err(ServiceError::validation("stock must not be negative"));
    }
    if !input.price.is_finite() || input.price < 0.0 {
        return Err(ServiceError::validation("price must be a non-negative number"));
    }
    Ok(ProductInput { name, ..input })
}

pub async fn list_products(store: &dyn Store) -> ServiceResult<Vec<Product>> {
    store.list_products().await
}

pub async fn get_product(store: &dyn Store, id: Uuid) -> ServiceResult<Product> {
    store
        .find_product(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("product", id))
}

pub async fn search_products(store: &dyn Store, text: &str) -> ServiceResult<Vec<Product>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    store.search_products(text, SEARCH_LIMIT).await
}

#[instrument(skip(store, input), fields(name = %input.name))]
pub async fn create_product(store: &dyn Store, input: ProductInput) -> ServiceResult<Product> {
    let product = store.insert_product(validate(input)?).await?;
    info!(product_id = %product.id, stock = product.stock, "product created");
    Ok(product)
}

#[instrument(skip(store, input))]
pub async fn update_product(store: &dyn Store, id: Uuid, input: ProductInput) -> ServiceResult<Product> {
    let input = validate(input)?;
    let product = store
        .update_product(id, input)
        .await?
        .ok_or_else(|| {
            warn!("product not found");
            ServiceError::not_found("product", id)
        })?;
    info!(stock = product.stock, "product updated");
    Ok(product)
}

#[instrument(skip(store))]
pub async fn delete_product(store: &dyn Store, id: Uuid) -> ServiceResult<String> {
    if !store.delete_product(id).await? {
        warn!("product not found");
        return Err(ServiceError::not_found("product", id));
    }
    info!("product deleted");
    Ok("product deleted".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{memory::MemoryStore, testing::seed_product};

    fn input(name: &str, stock: i32, price: f64) -> ProductInput {
        ProductInput { name: name.into(), stock, price }
    }

    #[tokio::test]
    async fn create_trims_name() {
        let store = MemoryStore::default();
        let p = create_product(&store, input("  Laptop ", 5, 999.0)).await.unwrap();
        assert_eq!(p.name, "Laptop");
        assert_eq!(p.stock, 5);
    }

    #[tokio::test]
    async fn negative_stock_or_price_is_rejected() {
        let store = MemoryStore::default();
        assert!(matches!(
            create_product(&store, input("Laptop", -1, 1.0)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            create_product(&store, input("Laptop", 1, -1.0)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            create_product(&store, input(" ", 1, 1.0)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(store.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let store = MemoryStore::default();
        let id = Uuid::new_v4();
        assert!(matches!(get_product(&store, id).await, Err(ServiceError::NotFound { .. })));
        assert!(matches!(
            update_product(&store, id, input("x", 1, 1.0)).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(delete_product(&store, id).await, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn update_and_delete_existing_product() {
        let store = MemoryStore::default();
        let p = seed_product(&store, "Monitor", 3, 150.0).await;

        let updated = update_product(&store, p.id, input("Monitor 27", 8, 180.0)).await.unwrap();
        assert_eq!(updated.name, "Monitor 27");
        assert_eq!(get_product(&store, p.id).await.unwrap().stock, 8);

        delete_product(&store, p.id).await.unwrap();
        assert!(matches!(get_product(&store, p.id).await, Err(ServiceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn search_is_capped() {
        let store = MemoryStore::default();
        for i in 0..12 {
            seed_product(&store, &format!("Cable {i}"), 1, 1.0).await;
        }
        assert_eq!(search_products(&store, "cable").await.unwrap().len(), SEARCH_LIMIT as usize);
        assert!(search_products(&store, "").await.unwrap().is_empty());
    }
}
