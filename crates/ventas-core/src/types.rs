//! # Domain Types
//!
//! Core domain types used throughout the Ventas back office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  status         │   │  order_id (FK)  │       │
//! │  │  stock >= 0     │   │  total_cents    │   │  method         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌───────────────────┐   ┌─────────────────┐   ┌─────────────────┐     │
//! │  │ InventoryMovement │   │     Return      │   │ ReportSnapshot  │     │
//! │  │  ───────────────  │   │  ─────────────  │   │  ─────────────  │     │
//! │  │  direction IN/OUT │   │  Requested      │   │  prompt         │     │
//! │  │  quantity > 0     │   │  Approved       │   │  rows (JSON)    │     │
//! │  │  append-only      │   │  Processed      │   │  immutable      │     │
//! │  └───────────────────┘   └─────────────────┘   └─────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: (sku, username, transaction_id)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product with a non-negative stock counter.
///
/// `stock` is mutated only through inventory movements and return
/// processing, never written directly by request handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name.
    pub name: String,

    /// Free-form description; empty when not provided.
    pub description: String,

    /// Category label (free-form for now).
    pub category: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Current stock level. Invariant: never negative.
    pub stock: i64,

    /// Minimum stock threshold for low-stock alerting.
    pub min_stock: i64,

    /// Warranty duration in months.
    pub warranty_months: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// True when the counter has fallen to or below the configured minimum.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

// =============================================================================
// Inventory Movement
// =============================================================================

/// Direction of an inventory movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    /// Goods received: stock += quantity. Always succeeds.
    In,
    /// Goods issued: stock -= quantity. Requires stock >= quantity.
    Out,
}

impl MovementDirection {
    /// Parses the wire tokens `"IN"` / `"OUT"` (case-insensitive).
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "in" => Some(MovementDirection::In),
            "out" => Some(MovementDirection::Out),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MovementDirection::In => "in",
            MovementDirection::Out => "out",
        }
    }
}

/// An append-only stock ledger entry.
///
/// A movement row and its counter update are always written in one
/// transaction; a movement without its stock effect (or vice versa) is a
/// correctness bug.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryMovement {
    pub id: String,
    pub product_id: String,
    pub direction: MovementDirection,
    /// Positive unit count.
    pub quantity: i64,
    /// Free-form reason ("reposición", "venta mostrador", ...).
    pub reason: String,
    /// Who recorded the movement.
    pub actor: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// Minimal user record.
///
/// Authentication and permissions are out of scope; users exist because
/// orders belong to someone and report field paths reach `user.username`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cart
// =============================================================================

/// A shopping cart. One active cart per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// A cart line. Unique per (cart, product); quantity accumulates on re-add.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartItem {
    pub id: String,
    pub cart_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Current catalog price, joined in for display and checkout totals.
    pub price_cents: i64,
}

impl CartItem {
    /// Line total at current catalog price.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created at checkout, awaiting payment.
    Pending,
    /// Payment approved.
    Paid,
    /// Handed to logistics.
    Shipped,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// An order created at checkout.
///
/// Checkout records the order and its items only; the stock counter is not
/// touched here. Stock moves through the inventory ledger and return
/// processing (see `ledger`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub shipping_cents: i64,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Total including shipping, as charged at payment time.
    #[inline]
    pub fn grand_total(&self) -> Money {
        Money::from_cents(self.total_cents + self.shipping_cents)
    }
}

/// A line item in an order.
/// Uses snapshot pattern to freeze the product price at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents at checkout time (frozen).
    pub price_cents: i64,
}

// =============================================================================
// Payment
// =============================================================================

/// Supported payment methods (simulation only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Paypal,
    Stripe,
}

impl PaymentMethod {
    /// Parses the wire tokens `"PAYPAL"` / `"STRIPE"` (case-insensitive).
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "paypal" => Some(PaymentMethod::Paypal),
            "stripe" => Some(PaymentMethod::Stripe),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Stripe => "stripe",
        }
    }
}

/// Outcome of a simulated payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Approved,
    Rejected,
}

/// A payment attempt against an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Amount charged: order total + shipping, in cents.
    pub amount_cents: i64,
    /// External reference from the simulated gateway.
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Return
// =============================================================================

/// The status of a return request.
///
/// ## State Machine
/// ```text
/// Requested ──► Approved ──► Processed   (stock credited on this edge only)
///     │
///     └───────► Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Requested,
    Approved,
    Rejected,
    Processed,
}

impl ReturnStatus {
    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// The Approved → Processed guard is the sole safeguard against
    /// double-crediting stock; nothing else enforces idempotency.
    pub fn can_transition(self, next: ReturnStatus) -> bool {
        matches!(
            (self, next),
            (ReturnStatus::Requested, ReturnStatus::Approved)
                | (ReturnStatus::Requested, ReturnStatus::Rejected)
                | (ReturnStatus::Approved, ReturnStatus::Processed)
        )
    }

    /// Whether a transition from `self` to `next` puts units back on the
    /// shelf. Only Approved → Processed does.
    pub fn credits_stock(self, next: ReturnStatus) -> bool {
        self == ReturnStatus::Approved && next == ReturnStatus::Processed
    }

    /// Parses the wire tokens (`"APPROVED"`, `"rejected"`, ...).
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "requested" => Some(ReturnStatus::Requested),
            "approved" => Some(ReturnStatus::Approved),
            "rejected" => Some(ReturnStatus::Rejected),
            "processed" => Some(ReturnStatus::Processed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReturnStatus::Requested => "requested",
            ReturnStatus::Approved => "approved",
            ReturnStatus::Rejected => "rejected",
            ReturnStatus::Processed => "processed",
        }
    }
}

impl Default for ReturnStatus {
    fn default() -> Self {
        ReturnStatus::Requested
    }
}

/// A product return against an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Return {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub reason: String,
    pub status: ReturnStatus,
    /// Operator who processed the return, once processed.
    pub processed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Report Snapshot
// =============================================================================

/// A persisted, immutable copy of report results captured at generation
/// time. Exports re-serve this snapshot instead of re-querying live data,
/// so an export always matches the preview the user saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReportSnapshot {
    pub id: String,
    /// The original free-text prompt.
    pub prompt: String,
    /// Human-readable description of the resolved query (rendered SQL).
    pub query_description: String,
    /// Result rows as a JSON array, serialized.
    pub rows_json: String,
    pub row_count: i64,
    /// The output format the prompt asked for ("json", "pdf", "excel").
    pub format: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_transitions() {
        use ReturnStatus::*;

        assert!(Requested.can_transition(Approved));
        assert!(Requested.can_transition(Rejected));
        assert!(Approved.can_transition(Processed));

        // Everything else is illegal, including processing twice.
        assert!(!Requested.can_transition(Processed));
        assert!(!Processed.can_transition(Processed));
        assert!(!Rejected.can_transition(Approved));
        assert!(!Approved.can_transition(Rejected));
    }

    #[test]
    fn test_only_processing_credits_stock() {
        use ReturnStatus::*;

        assert!(Approved.credits_stock(Processed));
        assert!(!Requested.credits_stock(Approved));
        assert!(!Requested.credits_stock(Rejected));
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(MovementDirection::parse("IN"), Some(MovementDirection::In));
        assert_eq!(MovementDirection::parse("out"), Some(MovementDirection::Out));
        assert_eq!(MovementDirection::parse("sideways"), None);
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("PAYPAL"), Some(PaymentMethod::Paypal));
        assert_eq!(PaymentMethod::parse("stripe"), Some(PaymentMethod::Stripe));
        assert_eq!(PaymentMethod::parse("cash"), None);
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }
}
