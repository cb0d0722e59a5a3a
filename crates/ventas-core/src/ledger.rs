//! # Stock Ledger Rules
//!
//! Pure transition rules for the product stock counter.
//!
//! ## The Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     stock: i64  •  stock >= 0                           │
//! │                                                                         │
//! │  IN movement       stock += quantity            always succeeds        │
//! │  OUT movement      stock -= quantity            requires stock >= qty  │
//! │  Return processed  stock += returned quantity   Approved→Processed only│
//! │  Checkout          (no stock effect)            open product decision  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! These functions are the single place the transition arithmetic lives.
//! Persistence is separate: `ventas-db` applies the same rule inside a
//! transaction with a compare-and-swap on the counter, so concurrent OUT
//! movements cannot jointly overdraw. The functions here exist so the rule
//! is unit-testable without a database and so handlers can pre-check
//! without trusting a read-modify-write cycle.

use crate::error::{CoreError, CoreResult};
use crate::types::MovementDirection;
use crate::MAX_LINE_QUANTITY;

/// Applies a movement to a stock level, returning the new level.
///
/// ## Errors
/// - `InsufficientStock` when an OUT movement would drive the counter
///   below zero. The caller must abort the enclosing transaction.
/// - `QuantityTooLarge` / `Validation` for non-positive or oversized
///   quantities.
///
/// ## Example
/// ```rust
/// use ventas_core::ledger::apply_movement;
/// use ventas_core::types::MovementDirection;
///
/// assert_eq!(apply_movement(5, MovementDirection::In, 3).unwrap(), 8);
/// assert_eq!(apply_movement(5, MovementDirection::Out, 3).unwrap(), 2);
/// assert!(apply_movement(5, MovementDirection::Out, 6).is_err());
/// ```
pub fn apply_movement(stock: i64, direction: MovementDirection, quantity: i64) -> CoreResult<i64> {
    check_quantity(quantity)?;

    match direction {
        MovementDirection::In => Ok(stock + quantity),
        MovementDirection::Out => {
            if stock < quantity {
                return Err(CoreError::InsufficientStock {
                    product: String::new(),
                    available: stock,
                    requested: quantity,
                });
            }
            Ok(stock - quantity)
        }
    }
}

/// Credits returned units back onto the shelf.
///
/// Only called on the Approved → Processed edge (or when a return is
/// created directly in Processed state); the status guard upstream is the
/// sole protection against double-crediting.
pub fn credit_return(stock: i64, quantity: i64) -> CoreResult<i64> {
    check_quantity(quantity)?;
    Ok(stock + quantity)
}

fn check_quantity(quantity: i64) -> CoreResult<()> {
    if quantity <= 0 {
        return Err(CoreError::Validation(
            crate::error::ValidationError::MustBePositive {
                field: "quantity".to_string(),
            },
        ));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_movement_always_adds() {
        assert_eq!(apply_movement(0, MovementDirection::In, 7).unwrap(), 7);
        assert_eq!(apply_movement(100, MovementDirection::In, 1).unwrap(), 101);
    }

    #[test]
    fn test_out_movement_decrements() {
        assert_eq!(apply_movement(10, MovementDirection::Out, 10).unwrap(), 0);
        assert_eq!(apply_movement(10, MovementDirection::Out, 3).unwrap(), 7);
    }

    #[test]
    fn test_out_movement_refuses_overdraw() {
        let err = apply_movement(5, MovementDirection::Out, 6).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(apply_movement(5, MovementDirection::In, 0).is_err());
        assert!(apply_movement(5, MovementDirection::Out, -1).is_err());
        assert!(credit_return(5, 0).is_err());
    }

    #[test]
    fn test_credit_return_adds() {
        assert_eq!(credit_return(2, 3).unwrap(), 5);
    }
}
