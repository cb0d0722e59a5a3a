//! # ventas-core: Pure Business Logic for the Ventas Back Office
//!
//! This crate is the **heart** of the back office. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Ventas Back Office Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │    reports, inventory movements, cart, checkout, returns       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ventas-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  ledger   │  │  report   │  │ validation│  │   │
//! │  │   │  Product  │  │ IN / OUT  │  │  parser   │  │   rules   │  │   │
//! │  │   │   Order   │  │  returns  │  │   plan    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ventas-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, InventoryMovement, Return, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`ledger`] - Stock counter transition rules (the stock >= 0 invariant)
//! - [`report`] - Prompt parser and report query planning
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use ventas_core::Money` instead of
// `use ventas_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use report::parser::{parse_prompt, ParsedPrompt};
pub use report::plan::{build_plan, ReportPlan};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single inventory movement or cart line
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 100000 instead of 100).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Maximum rows returned by a report preview.
///
/// Exports re-read the stored snapshot, so the preview cap is also the
/// snapshot size. See `report::plan`.
pub const REPORT_PREVIEW_LIMIT: i64 = 100;

/// Flat shipping cost applied at checkout, in cents.
pub const FLAT_SHIPPING_CENTS: i64 = 1_000;
