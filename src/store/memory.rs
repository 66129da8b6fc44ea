use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Store;
use crate::{
    auth::repo_types::{NewUser, User},
    clients::{dto::ClientInput, repo_types::Client},
    error::{ServiceError, ServiceResult},
    orders::repo_types::{
        ClientRanking, LineItem, NewOrder, Order, OrderFilter, OrderPatch, OrderStatus,
        SellerRanking,
    },
    products::{dto::ProductInput, repo_types::Product},
};

/// Process-local store. A single writer lock serialises every mutation, so
/// stock reservation is atomic here without per-product locking.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    clients: Vec<Client>,
    products: Vec<Product>,
    orders: Vec<Order>,
}

impl Tables {
    fn client_email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.clients
            .iter()
            .any(|c| c.email == email && Some(c.id) != except)
    }
}

fn decrement_stock(products: &mut [Product], item: &LineItem) -> ServiceResult<()> {
    let product = products
        .iter_mut()
        .find(|p| p.id == item.product_id)
        .ok_or_else(|| ServiceError::not_found("product", item.product_id))?;

    if item.quantity > product.stock {
        return Err(ServiceError::InsufficientStock {
            product_id: product.id,
            name: product.name.clone(),
            requested: item.quantity,
            available: product.stock,
        });
    }
    product.stock -= item.quantity;
    Ok(())
}

/// Applies every decrement to a staged copy and swaps it in only when all
/// items succeed.
fn reserve_stock(products: &mut Vec<Product>, items: &[LineItem]) -> ServiceResult<()> {
    let mut staged = products.clone();
    for item in items {
        decrement_stock(&mut staged, item)?;
    }
    *products = staged;
    Ok(())
}

fn completed_totals<K, F>(orders: &[Order], key: F) -> HashMap<K, f64>
where
    K: std::hash::Hash + Eq,
    F: Fn(&Order) -> K,
{
    let mut totals = HashMap::new();
    for order in orders.iter().filter(|o| o.status == OrderStatus::Completed) {
        *totals.entry(key(order)).or_insert(0.0) += order.total;
    }
    totals
}

fn matches_search(name: &str, terms: &[String]) -> bool {
    let words: Vec<String> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    terms.iter().all(|t| words.contains(t))
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: Uuid) -> ServiceResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, new: NewUser) -> ServiceResult<User> {
        let mut t = self.tables.write().await;
        if t.users.iter().any(|u| u.email == new.email) {
            return Err(ServiceError::AlreadyExists { entity: "user", email: new.email });
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            surname: new.surname,
            email: new.email,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_client(&self, id: Uuid) -> ServiceResult<Option<Client>> {
        let t = self.tables.read().await;
        Ok(t.clients.iter().find(|c| c.id == id).cloned())
    }

    async fn find_client_by_email(&self, email: &str) -> ServiceResult<Option<Client>> {
        let t = self.tables.read().await;
        Ok(t.clients.iter().find(|c| c.email == email).cloned())
    }

    async fn list_clients(&self, seller_id: Option<Uuid>) -> ServiceResult<Vec<Client>> {
        let t = self.tables.read().await;
        Ok(t.clients
            .iter()
            .filter(|c| seller_id.map_or(true, |s| c.seller_id == s))
            .cloned()
            .collect())
    }

    async fn insert_client(&self, seller_id: Uuid, input: ClientInput) -> ServiceResult<Client> {
        let mut t = self.tables.write().await;
        if t.client_email_taken(&input.email, None) {
            return Err(ServiceError::AlreadyExists { entity: "client", email: input.email });
        }
        let client = Client {
            id: Uuid::new_v4(),
            name: input.name,
            surname: input.surname,
            company: input.company,
            email: input.email,
            phone: input.phone,
            seller_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.clients.push(client.clone());
        Ok(client)
    }

    async fn update_client(&self, id: Uuid, input: ClientInput) -> ServiceResult<Option<Client>> {
        let mut t = self.tables.write().await;
        if t.client_email_taken(&input.email, Some(id)) {
            return Err(ServiceError::AlreadyExists { entity: "client", email: input.email });
        }
        let Some(client) = t.clients.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        client.name = input.name;
        client.surname = input.surname;
        client.company = input.company;
        client.email = input.email;
        client.phone = input.phone;
        Ok(Some(client.clone()))
    }

    async fn delete_client(&self, id: Uuid) -> ServiceResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.clients.len();
        t.clients.retain(|c| c.id != id);
        Ok(t.clients.len() != before)
    }

    async fn find_product(&self, id: Uuid) -> ServiceResult<Option<Product>> {
        let t = self.tables.read().await;
        Ok(t.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.tables.read().await.products.clone())
    }

    async fn search_products(&self, text: &str, limit: i64) -> ServiceResult<Vec<Product>> {
        let terms: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let t = self.tables.read().await;
        Ok(t.products
            .iter()
            .filter(|p| matches_search(&p.name, &terms))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn insert_product(&self, input: ProductInput) -> ServiceResult<Product> {
        let product = Product {
            id: Uuid::new_v4(),
            name: input.name,
            stock: input.stock,
            price: input.price,
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: Uuid, input: ProductInput) -> ServiceResult<Option<Product>> {
        let mut t = self.tables.write().await;
        let Some(product) = t.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        product.name = input.name;
        product.stock = input.stock;
        product.price = input.price;
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: Uuid) -> ServiceResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.products.len();
        t.products.retain(|p| p.id != id);
        Ok(t.products.len() != before)
    }

    async fn find_order(&self, id: Uuid) -> ServiceResult<Option<Order>> {
        let t = self.tables.read().await;
        Ok(t.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self, filter: OrderFilter) -> ServiceResult<Vec<Order>> {
        let t = self.tables.read().await;
        Ok(t.orders
            .iter()
            .filter(|o| filter.seller_id.map_or(true, |s| o.seller_id == s))
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect())
    }

    async fn insert_order(&self, new: NewOrder) -> ServiceResult<Order> {
        let mut t = self.tables.write().await;
        reserve_stock(&mut t.products, &new.items)?;
        let order = Order {
            id: Uuid::new_v4(),
            client_id: new.client_id,
            seller_id: new.seller_id,
            items: new.items,
            total: new.total,
            status: OrderStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
        };
        t.orders.push(order.clone());
        Ok(order)
    }

    async fn update_order(&self, id: Uuid, patch: OrderPatch) -> ServiceResult<Option<Order>> {
        let mut t = self.tables.write().await;
        let Some(idx) = t.orders.iter().position(|o| o.id == id) else {
            return Ok(None);
        };
        if let Some(items) = &patch.items {
            reserve_stock(&mut t.products, items)?;
        }

        let order = &mut t.orders[idx];
        if let Some(client_id) = patch.client_id {
            order.client_id = client_id;
        }
        if let Some(items) = patch.items {
            order.items = items;
        }
        if let Some(total) = patch.total {
            order.total = total;
        }
        if let Some(status) = patch.status {
            order.status = status;
        }
        Ok(Some(order.clone()))
    }

    async fn delete_order(&self, id: Uuid) -> ServiceResult<bool> {
        let mut t = self.tables.write().await;
        let before = t.orders.len();
        t.orders.retain(|o| o.id != id);
        Ok(t.orders.len() != before)
    }

    async fn top_clients(&self) -> ServiceResult<Vec<ClientRanking>> {
        let t = self.tables.read().await;
        let totals = completed_totals(&t.orders, |o| o.client_id);
        let mut ranking: Vec<ClientRanking> = totals
            .into_iter()
            .filter_map(|(id, total)| {
                let client = t.clients.iter().find(|c| c.id == id)?.clone();
                Some(ClientRanking { total, client })
            })
            .collect();
        ranking.sort_by(|a, b| b.total.total_cmp(&a.total));
        Ok(ranking)
    }

    async fn top_sellers(&self, limit: i64) -> ServiceResult<Vec<SellerRanking>> {
        let t = self.tables.read().await;
        let totals = completed_totals(&t.orders, |o| o.seller_id);
        let mut ranking: Vec<SellerRanking> = totals
            .into_iter()
            .filter_map(|(id, total)| {
                let seller = t.users.iter().find(|u| u.id == id)?.clone();
                Some(SellerRanking { total, seller })
            })
            .collect();
        ranking.sort_by(|a, b| b.total.total_cmp(&a.total));
        ranking.truncate(limit.max(0) as usize);
        Ok(ranking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{seed_product, seed_user, stock_of};

    fn item(product_id: Uuid, quantity: i32) -> LineItem {
        LineItem { product_id, quantity }
    }

    #[tokio::test]
    async fn reservation_is_all_or_nothing() {
        let store = MemoryStore::default();
        let seller = seed_user(&store, "s@example.com").await;
        let a = seed_product(&store, "Mouse", 10, 20.0).await;
        let b = seed_product(&store, "Keyboard", 1, 50.0).await;

        let err = store
            .insert_order(NewOrder {
                client_id: Uuid::new_v4(),
                seller_id: seller.id,
                items: vec![item(a.id, 4), item(b.id, 2)],
                total: 180.0,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InsufficientStock { product_id, .. } if product_id == b.id));
        assert_eq!(stock_of(&store, a.id).await, 10);
        assert_eq!(stock_of(&store, b.id).await, 1);
        assert!(store.list_orders(OrderFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_product_lines_accumulate() {
        let store = MemoryStore::default();
        let p = seed_product(&store, "Cable", 5, 3.0).await;
        let mut products = store.tables.read().await.products.clone();

        assert!(reserve_stock(&mut products, &[item(p.id, 3), item(p.id, 3)]).is_err());
        assert_eq!(products[0].stock, 5);

        reserve_stock(&mut products, &[item(p.id, 3), item(p.id, 2)]).unwrap();
        assert_eq!(products[0].stock, 0);
    }

    #[tokio::test]
    async fn unknown_product_fails_reservation() {
        let store = MemoryStore::default();
        let missing = Uuid::new_v4();
        let err = store
            .insert_order(NewOrder {
                client_id: Uuid::new_v4(),
                seller_id: Uuid::new_v4(),
                items: vec![item(missing, 1)],
                total: 1.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "product", id } if id == missing));
    }

    #[tokio::test]
    async fn search_matches_whole_words_case_insensitively() {
        let store = MemoryStore::default();
        seed_product(&store, "Laptop Pro 14", 1, 1.0).await;
        seed_product(&store, "Laptop Air", 1, 1.0).await;
        seed_product(&store, "Desk lamp", 1, 1.0).await;

        assert_eq!(store.search_products("laptop", 10).await.unwrap().len(), 2);
        assert_eq!(store.search_products("LAPTOP air", 10).await.unwrap().len(), 1);
        assert_eq!(store.search_products("lap", 10).await.unwrap().len(), 0);
        assert_eq!(store.search_products("laptop", 1).await.unwrap().len(), 1);
        assert!(store.search_products("   ", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_missing_order_reserves_nothing() {
        let store = MemoryStore::default();
        let p = seed_product(&store, "Cable", 5, 3.0).await;
        let res = store
            .update_order(
                Uuid::new_v4(),
                OrderPatch { items: Some(vec![item(p.id, 2)]), ..Default::default() },
            )
            .await
            .unwrap();
        assert!(res.is_none());
        assert_eq!(stock_of(&store, p.id).await, 5);
    }
}
