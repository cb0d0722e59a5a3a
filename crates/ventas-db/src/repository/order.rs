//! Users, carts, checkout and payments.
//!
//! Checkout converts a cart into an order and its line items in one
//! transaction, freezing unit prices as they are at that moment. It does
//! not touch the stock counter; stock moves through the inventory ledger
//! and return processing.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use ventas_core::{
    Cart, CartItem, Money, Order, OrderItem, OrderStatus, Payment, PaymentMethod, PaymentStatus,
    User, FLAT_SHIPPING_CENTS,
};

use crate::error::{DbError, DbResult};

pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    /// Fetch a user by name, creating it on first sight.
    pub async fn ensure_user(&self, username: &str) -> DbResult<User> {
        if let Some(user) = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(user);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            role: "customer".to_string(),
            created_at: Utc::now(),
        };
        sqlx::query("INSERT INTO users (id, username, role, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.role)
            .bind(user.created_at)
            .execute(&self.pool)
            .await?;
        Ok(user)
    }

    // -------------------------------------------------------------------------
    // Carts
    // -------------------------------------------------------------------------

    pub async fn get_or_create_cart(&self, user_id: &str) -> DbResult<Cart> {
        if let Some(cart) = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(cart);
        }

        let cart = Cart {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query("INSERT INTO carts (id, user_id, created_at) VALUES (?1, ?2, ?3)")
            .bind(&cart.id)
            .bind(&cart.user_id)
            .bind(cart.created_at)
            .execute(&self.pool)
            .await?;
        Ok(cart)
    }

    /// Add units of a product to the cart. Re-adding accumulates quantity.
    pub async fn add_cart_item(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        let product_exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM products WHERE id = ?1 AND is_active = 1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;
        if product_exists.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, cart_id, product_id, quantity)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = quantity + excluded.quantity
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_cart_item(&self, cart_id: &str, product_id: &str) -> DbResult<()> {
        let result =
            sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1 AND product_id = ?2")
                .bind(cart_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", product_id));
        }
        Ok(())
    }

    /// Cart lines with current catalog prices joined in.
    pub async fn cart_items(&self, cart_id: &str) -> DbResult<Vec<CartItem>> {
        let items = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, p.price_cents
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = ?1
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Turn the user's cart into an order. Returns `None` when the cart is
    /// empty. The cart is cleared in the same transaction.
    pub async fn checkout(&self, user_id: &str, address: &str) -> DbResult<Option<Order>> {
        let mut tx = self.pool.begin().await?;

        let cart_id: Option<String> =
            sqlx::query_scalar("SELECT id FROM carts WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(cart_id) = cart_id else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, CartItem>(
            r#"
            SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, p.price_cents
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.cart_id = ?1
            "#,
        )
        .bind(&cart_id)
        .fetch_all(&mut *tx)
        .await?;
        if items.is_empty() {
            return Ok(None);
        }

        let total = items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.line_total());

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            status: OrderStatus::Pending,
            total_cents: total.cents(),
            shipping_cents: FLAT_SHIPPING_CENTS,
            address: address.to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders
                (id, user_id, status, total_cents, shipping_cents, address,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.status)
        .bind(order.total_cents)
        .bind(order.shipping_cents)
        .bind(&order.address)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity, price_cents)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&order.id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.price_cents)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
            .bind(&cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(order))
    }

    // -------------------------------------------------------------------------
    // Payments
    // -------------------------------------------------------------------------

    /// Record a simulated payment attempt. An approved payment marks the
    /// order paid in the same transaction.
    pub async fn record_payment(
        &self,
        order_id: &str,
        method: PaymentMethod,
        approved: bool,
    ) -> DbResult<Payment> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        let status = if approved {
            PaymentStatus::Approved
        } else {
            PaymentStatus::Rejected
        };

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            order_id: order.id.clone(),
            method,
            status,
            amount_cents: order.grand_total().cents(),
            transaction_id: format!("txn_{}_{}", order.id, method.as_str()),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO payments
                (id, order_id, method, status, amount_cents, transaction_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(payment.method)
        .bind(payment.status)
        .bind(payment.amount_cents)
        .bind(&payment.transaction_id)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        if approved {
            sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(OrderStatus::Paid)
                .bind(Utc::now())
                .bind(&order.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(payment)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items =
            sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = ?1")
                .bind(order_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(items)
    }

    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = ?1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }
}
