//! Return repository.
//!
//! Status changes are guarded UPDATEs on the expected current status. The
//! guard is what makes processing idempotent: once a return is `processed`
//! a second attempt matches zero rows and the stock credit never repeats.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use ventas_core::{Return, ReturnStatus};

use crate::error::{DbError, DbResult};

/// Input for opening a return.
#[derive(Debug, Clone)]
pub struct NewReturn {
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub reason: String,
    /// Initial status. A return created directly as `processed` credits
    /// stock immediately.
    pub status: ReturnStatus,
    pub processed_by: Option<String>,
}

pub struct ReturnRepository {
    pool: SqlitePool,
}

impl ReturnRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewReturn) -> DbResult<Return> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let order_exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM orders WHERE id = ?1")
                .bind(&new.order_id)
                .fetch_optional(&mut *tx)
                .await?;
        if order_exists.is_none() {
            return Err(DbError::not_found("Order", new.order_id));
        }

        let product_exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM products WHERE id = ?1")
                .bind(&new.product_id)
                .fetch_optional(&mut *tx)
                .await?;
        if product_exists.is_none() {
            return Err(DbError::not_found("Product", new.product_id));
        }

        let ret = Return {
            id: Uuid::new_v4().to_string(),
            order_id: new.order_id,
            product_id: new.product_id,
            quantity: new.quantity,
            reason: new.reason,
            status: new.status,
            processed_by: new.processed_by,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO returns
                (id, order_id, product_id, quantity, reason, status,
                 processed_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&ret.id)
        .bind(&ret.order_id)
        .bind(&ret.product_id)
        .bind(ret.quantity)
        .bind(&ret.reason)
        .bind(ret.status)
        .bind(&ret.processed_by)
        .bind(ret.created_at)
        .bind(ret.updated_at)
        .execute(&mut *tx)
        .await?;

        if ret.status == ReturnStatus::Processed {
            credit_stock(&mut tx, &ret.product_id, ret.quantity).await?;
        }

        tx.commit().await?;
        Ok(ret)
    }

    /// Move a return to `next`, crediting stock when the move completes
    /// processing.
    pub async fn transition(
        &self,
        id: &str,
        next: ReturnStatus,
        actor: Option<&str>,
    ) -> DbResult<Return> {
        // Every reachable target has exactly one predecessor state; derive it
        // from the state machine so the guard below checks the same rules the
        // domain layer declares.
        let expected = [
            ReturnStatus::Requested,
            ReturnStatus::Approved,
            ReturnStatus::Rejected,
            ReturnStatus::Processed,
        ]
        .into_iter()
        .find(|from| from.can_transition(next));

        let Some(expected) = expected else {
            // Nothing transitions back to requested.
            let current = self.require(id).await?;
            return Err(DbError::InvalidTransition {
                id: id.to_string(),
                from: current.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        };

        let mut tx = self.pool.begin().await?;

        let processed_by = if next == ReturnStatus::Processed {
            actor.map(str::to_string)
        } else {
            None
        };

        let result = sqlx::query(
            r#"
            UPDATE returns
            SET status = ?1,
                processed_by = COALESCE(?2, processed_by),
                updated_at = ?3
            WHERE id = ?4 AND status = ?5
            "#,
        )
        .bind(next)
        .bind(&processed_by)
        .bind(Utc::now())
        .bind(id)
        .bind(expected)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let current = sqlx::query_as::<_, Return>("SELECT * FROM returns WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            return match current {
                None => Err(DbError::not_found("Return", id)),
                Some(r) => Err(DbError::InvalidTransition {
                    id: id.to_string(),
                    from: r.status.as_str().to_string(),
                    to: next.as_str().to_string(),
                }),
            };
        }

        let ret = sqlx::query_as::<_, Return>("SELECT * FROM returns WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if expected.credits_stock(next) {
            credit_stock(&mut tx, &ret.product_id, ret.quantity).await?;
        }

        tx.commit().await?;
        Ok(ret)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Return>> {
        let ret = sqlx::query_as::<_, Return>("SELECT * FROM returns WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ret)
    }

    pub async fn list_for_order(&self, order_id: &str) -> DbResult<Vec<Return>> {
        let returns = sqlx::query_as::<_, Return>(
            "SELECT * FROM returns WHERE order_id = ?1 ORDER BY created_at DESC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(returns)
    }

    async fn require(&self, id: &str) -> DbResult<Return> {
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Return", id))
    }
}

async fn credit_stock(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    sqlx::query("UPDATE products SET stock = stock + ?1, updated_at = ?3 WHERE id = ?2")
        .bind(quantity)
        .bind(product_id)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::NewProduct;
    use ventas_core::{Order, Product};

    async fn setup() -> (Database, Product, Order) {
        let db = Database::new(&DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .create(NewProduct {
                sku: "SKU-001".into(),
                name: "Monitor 24\"".into(),
                description: String::new(),
                category: "pantallas".into(),
                price_cents: 12_000,
                stock: 10,
                min_stock: 2,
                warranty_months: 24,
            })
            .await
            .unwrap();

        let orders = db.orders();
        let user = orders.ensure_user("maria").await.unwrap();
        let cart = orders.get_or_create_cart(&user.id).await.unwrap();
        orders.add_cart_item(&cart.id, &product.id, 2).await.unwrap();
        let order = orders
            .checkout(&user.id, "Av. Siempre Viva 742")
            .await
            .unwrap()
            .unwrap();

        (db, product, order)
    }

    fn request(product: &Product, order: &Order) -> NewReturn {
        NewReturn {
            order_id: order.id.clone(),
            product_id: product.id.clone(),
            quantity: 2,
            reason: "defectuoso".into(),
            status: ReturnStatus::Requested,
            processed_by: None,
        }
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn approve_then_process_credits_stock_once() {
        let (db, product, order) = setup().await;
        let returns = db.returns();
        let ret = returns.create(request(&product, &order)).await.unwrap();

        let ret = returns
            .transition(&ret.id, ReturnStatus::Approved, None)
            .await
            .unwrap();
        assert_eq!(ret.status, ReturnStatus::Approved);
        // Approval alone credits nothing.
        assert_eq!(stock_of(&db, &product.id).await, 10);

        let ret = returns
            .transition(&ret.id, ReturnStatus::Processed, Some("admin"))
            .await
            .unwrap();
        assert_eq!(ret.status, ReturnStatus::Processed);
        assert_eq!(ret.processed_by.as_deref(), Some("admin"));
        assert_eq!(stock_of(&db, &product.id).await, 12);

        // Processing again is refused and does not credit a second time.
        let err = returns
            .transition(&ret.id, ReturnStatus::Processed, Some("admin"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidTransition { .. }));
        assert_eq!(stock_of(&db, &product.id).await, 12);
    }

    #[tokio::test]
    async fn rejection_never_credits_stock() {
        let (db, product, order) = setup().await;
        let returns = db.returns();
        let ret = returns.create(request(&product, &order)).await.unwrap();

        let ret = returns
            .transition(&ret.id, ReturnStatus::Rejected, None)
            .await
            .unwrap();
        assert_eq!(ret.status, ReturnStatus::Rejected);
        assert_eq!(stock_of(&db, &product.id).await, 10);

        // A rejected return is terminal.
        let err = returns
            .transition(&ret.id, ReturnStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn skipping_approval_is_refused() {
        let (db, product, order) = setup().await;
        let returns = db.returns();
        let ret = returns.create(request(&product, &order)).await.unwrap();

        let err = returns
            .transition(&ret.id, ReturnStatus::Processed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidTransition { .. }));
        assert_eq!(stock_of(&db, &product.id).await, 10);
    }

    #[tokio::test]
    async fn created_as_processed_credits_immediately() {
        let (db, product, order) = setup().await;
        let ret = db
            .returns()
            .create(NewReturn {
                status: ReturnStatus::Processed,
                processed_by: Some("admin".into()),
                ..request(&product, &order)
            })
            .await
            .unwrap();
        assert_eq!(ret.status, ReturnStatus::Processed);
        assert_eq!(stock_of(&db, &product.id).await, 12);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let (db, product, order) = setup().await;
        let err = db
            .returns()
            .create(NewReturn {
                order_id: "missing".into(),
                ..request(&product, &order)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
