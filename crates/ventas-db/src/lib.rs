// =============================================================================
// ventas-db: SQLite persistence for the ventas back office
// =============================================================================
//
// Storage layout:
//   products / inventory_movements   stock counter plus append-only ledger
//   users / carts / cart_items       shopping state
//   orders / order_items / payments  checkout results
//   returns                          return requests and their state machine
//   report_snapshots                 frozen report result sets
//   audit_log                        best-effort mutation trail
//
// Invariants enforced here rather than in callers:
//   * `products.stock` never goes negative. Debits are a single guarded
//     UPDATE (`... AND stock >= ?`) in the same transaction as the ledger
//     insert, so concurrent debits cannot jointly overdraw.
//   * Return status changes are guarded UPDATEs on the expected current
//     status, so a return is never processed (and stock credited) twice.
//
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
