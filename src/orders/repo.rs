use sqlx::{types::Json, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::orders::repo_types::{
    ClientRanking, NewOrder, Order, OrderFilter, OrderPatch, OrderStatus, SellerRanking,
};
use crate::products::repo_types::Product;

const ORDER_COLUMNS: &str = "id, client_id, seller_id, items, total, status, created_at";

impl Order {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> ServiceResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(order)
    }

    pub async fn list(db: &PgPool, filter: OrderFilter) -> ServiceResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE ($1::uuid IS NULL OR seller_id = $1)
              AND ($2::order_status IS NULL OR status = $2)
            ORDER BY created_at ASC
            "#
        ))
        .bind(filter.seller_id)
        .bind(filter.status)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Reserves every line item and inserts the order in one transaction.
    /// Any failing item rolls back the decrements made before it.
    pub async fn create_reserving(db: &PgPool, new: &NewOrder) -> ServiceResult<Order> {
        let mut tx = db.begin().await?;
        for item in &new.items {
            Product::decrement_stock(&mut tx, item).await?;
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (client_id, seller_id, items, total, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(new.client_id)
        .bind(new.seller_id)
        .bind(Json(&new.items))
        .bind(new.total)
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(order_id = %order.id, items = new.items.len(), "order inserted");
        Ok(order)
    }

    /// Applies `patch`, reserving `patch.items` in the same transaction.
    /// Returns `None` when the order does not exist.
    pub async fn update_reserving(
        db: &PgPool,
        id: Uuid,
        patch: &OrderPatch,
    ) -> ServiceResult<Option<Order>> {
        let mut tx = db.begin().await?;

        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        for item in patch.items.iter().flatten() {
            Product::decrement_stock(&mut tx, item).await?;
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
               SET client_id = COALESCE($2, client_id),
                   items     = COALESCE($3, items),
                   total     = COALESCE($4, total),
                   status    = COALESCE($5, status)
             WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.client_id)
        .bind(patch.items.as_ref().map(Json))
        .bind(patch.total)
        .bind(patch.status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(order))
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> ServiceResult<bool> {
        let res = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

impl ClientRanking {
    /// Clients ranked by the summed total of their completed orders.
    pub async fn top(db: &PgPool) -> ServiceResult<Vec<ClientRanking>> {
        let rows = sqlx::query_as::<_, ClientRanking>(
            r#"
            SELECT c.id, c.name, c.surname, c.company, c.email, c.phone, c.seller_id, c.created_at,
                   SUM(o.total) AS total
            FROM orders o
            JOIN clients c ON c.id = o.client_id
            WHERE o.status = $1
            GROUP BY c.id
            ORDER BY total DESC
            "#,
        )
        .bind(OrderStatus::Completed)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

impl SellerRanking {
    /// Sellers ranked by the summed total of their completed orders.
    pub async fn top(db: &PgPool, limit: i64) -> ServiceResult<Vec<SellerRanking>> {
        let rows = sqlx::query_as::<_, SellerRanking>(
            r#"
            SELECT u.id, u.name, u.surname, u.email, u.password_hash, u.created_at,
                   SUM(o.total) AS total
            FROM orders o
            JOIN users u ON u.id = o.seller_id
            WHERE o.status = $1
            GROUP BY u.id
            ORDER BY total DESC
            LIMIT $2
            "#,
        )
        .bind(OrderStatus::Completed)
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::{NewUser, User};
    use crate::clients::{dto::ClientInput, repo_types::Client};
    use crate::error::ServiceError;
    use crate::orders::repo_types::LineItem;
    use crate::products::dto::ProductInput;

    struct Seeded {
        seller: User,
        client: Client,
    }

    async fn seed(db: &PgPool) -> Seeded {
        let seller = User::create(
            db,
            NewUser {
                name: "Ana".into(),
                surname: "Ruiz".into(),
                email: "ana@example.com".into(),
                password_hash: "x".into(),
            },
        )
        .await
        .unwrap();
        let client = Client::create(
            db,
            seller.id,
            &ClientInput {
                name: "Luis".into(),
                surname: "Gil".into(),
                company: "Gil SA".into(),
                email: "luis@example.com".into(),
                phone: None,
            },
        )
        .await
        .unwrap();
        Seeded { seller, client }
    }

    async fn product(db: &PgPool, name: &str, stock: i32) -> Product {
        Product::create(db, &ProductInput { name: name.into(), stock, price: 1.0 })
            .await
            .unwrap()
    }

    async fn stock(db: &PgPool, id: Uuid) -> i32 {
        Product::find_by_id(db, id).await.unwrap().unwrap().stock
    }

    fn new_order(s: &Seeded, items: Vec<LineItem>) -> NewOrder {
        NewOrder { client_id: s.client.id, seller_id: s.seller.id, items, total: 10.0 }
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
    async fn create_reserving_decrements_and_inserts(db: PgPool) {
        let s = seed(&db).await;
        let p = product(&db, "Teclado", 5).await;

        let order = Order::create_reserving(&db, &new_order(&s, vec![LineItem { product_id: p.id, quantity: 3 }]))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items, vec![LineItem { product_id: p.id, quantity: 3 }]);
        assert_eq!(stock(&db, p.id).await, 2);
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
    async fn shortfall_on_later_item_rolls_back_transaction(db: PgPool) {
        let s = seed(&db).await;
        let a = product(&db, "Raton", 10).await;
        let b = product(&db, "Monitor", 1).await;

        let err = Order::create_reserving(
            &db,
            &new_order(
                &s,
                vec![
                    LineItem { product_id: a.id, quantity: 4 },
                    LineItem { product_id: b.id, quantity: 2 },
                ],
            ),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::InsufficientStock { product_id, requested: 2, available: 1, .. } if product_id == b.id
        ));
        assert_eq!(stock(&db, a.id).await, 10);
        assert_eq!(stock(&db, b.id).await, 1);
        assert!(Order::list(&db, OrderFilter::default()).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
    async fn unknown_product_is_not_found(db: PgPool) {
        let s = seed(&db).await;
        let err = Order::create_reserving(
            &db,
            &new_order(&s, vec![LineItem { product_id: Uuid::new_v4(), quantity: 1 }]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "product", .. }));
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
    async fn status_patch_keeps_items_and_feeds_rankings(db: PgPool) {
        let s = seed(&db).await;
        let p = product(&db, "Cable", 10).await;
        let order = Order::create_reserving(&db, &new_order(&s, vec![LineItem { product_id: p.id, quantity: 2 }]))
            .await
            .unwrap();

        let patch = OrderPatch { status: Some(OrderStatus::Completed), ..Default::default() };
        let updated = Order::update_reserving(&db, order.id, &patch).await.unwrap().unwrap();

        assert_eq!(updated.status, OrderStatus::Completed);
        assert_eq!(updated.items, order.items);
        assert_eq!(updated.total, order.total);
        assert_eq!(stock(&db, p.id).await, 8);

        let clients = ClientRanking::top(&db).await.unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].client.id, s.client.id);
        assert_eq!(clients[0].total, 10.0);

        let sellers = SellerRanking::top(&db, 3).await.unwrap();
        assert_eq!(sellers[0].seller.id, s.seller.id);
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
    async fn update_of_missing_order_is_none(db: PgPool) {
        let patch = OrderPatch { total: Some(1.0), ..Default::default() };
        assert!(Order::update_reserving(&db, Uuid::new_v4(), &patch).await.unwrap().is_none());
    }
}
