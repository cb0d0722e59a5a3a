//! # Report Query Plan
//!
//! Turns a [`ParsedPrompt`] into a [`ReportPlan`]: the AND-combined filter
//! set plus the select-field list the database layer renders to SQL.
//!
//! The plan performs NO schema validation. A path the schema doesn't know
//! surfaces only when the query executes, as a generic internal error —
//! this mirrors the preview endpoint's contract, where the parser is the
//! only producer of paths and unknown ones are a server bug, not user
//! input.

use serde::{Deserialize, Serialize};

use super::parser::{OutputFormat, ParsedPrompt, ReportFilters, DEFAULT_FIELDS};

/// A ready-to-render report query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPlan {
    /// Field paths to select, in request order.
    ///
    /// Path rules (preserved from the original report builder):
    /// - `relation.attribute` (exactly two segments) kept as-is
    /// - separator-free paths pass through unchanged
    /// - three or more segments are silently dropped
    pub select: Vec<String>,
    pub filters: ReportFilters,
    pub format: OutputFormat,
}

impl ReportPlan {
    /// Whether any selected path reaches into order items (forces the
    /// order_items join at render time).
    pub fn needs_items_join(&self) -> bool {
        self.select.iter().any(|f| f.starts_with("items."))
    }
}

/// Builds the query plan from parser output.
pub fn build_plan(parsed: &ParsedPrompt) -> ReportPlan {
    let requested: Vec<&str> = if parsed.fields.is_empty() {
        DEFAULT_FIELDS.to_vec()
    } else {
        parsed.fields.iter().map(|f| f.as_str()).collect()
    };

    let mut select = Vec::with_capacity(requested.len());
    for field in requested {
        if field.contains('.') {
            if field.split('.').count() == 2 {
                select.push(field.to_string());
            }
            // Deeper paths are dropped without error.
        } else {
            select.push(field.to_string());
        }
    }

    ReportPlan {
        select,
        filters: parsed.filters.clone(),
        format: parsed.format,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::parser::parse_prompt_with_year;

    #[test]
    fn test_two_segment_paths_survive() {
        let parsed = parse_prompt_with_year("nombre del cliente y método de pago", 2026);
        let plan = build_plan(&parsed);
        assert_eq!(plan.select, vec!["user.username", "payment.method"]);
    }

    #[test]
    fn test_three_segment_paths_are_dropped() {
        // "producto" maps to items.product.name, which has no rendering.
        let parsed = parse_prompt_with_year("producto y precio", 2026);
        let plan = build_plan(&parsed);
        assert_eq!(plan.select, vec!["items.price"]);
        assert!(plan.needs_items_join());
    }

    #[test]
    fn test_bare_paths_pass_through() {
        let parsed = parse_prompt_with_year("monto total pagado y fecha de orden", 2026);
        let plan = build_plan(&parsed);
        // "pagado" inside the label also trips the status keyword; the
        // select list is what matters here.
        assert_eq!(plan.select, vec!["total", "created_at"]);
        assert!(!plan.needs_items_join());
    }

    #[test]
    fn test_filters_carried_over() {
        let parsed = parse_prompt_with_year("ventas de noviembre pagado", 2026);
        let plan = build_plan(&parsed);
        assert_eq!(plan.filters.month, Some(11));
        assert_eq!(plan.filters.year, Some(2026));
        assert!(plan.filters.status.is_some());
    }
}
