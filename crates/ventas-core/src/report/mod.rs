//! # Report Module
//!
//! Best-effort prompt parsing and report query planning.
//!
//! ## Read Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Report Read Path                                │
//! │                                                                         │
//! │  "ventas de noviembre pagado en pdf"                                   │
//! │       │                                                                 │
//! │       ▼ parser::parse_prompt (pure, infallible)                        │
//! │  ParsedPrompt { fields, filters, format }                              │
//! │       │                                                                 │
//! │       ▼ plan::build_plan (pure)                                        │
//! │  ReportPlan { select list, AND-combined filters }                      │
//! │       │                                                                 │
//! │       ▼ ventas-db ReportRepository (SQL rendering + execution)         │
//! │  rows (≤ 100) ──► snapshot store ──► later export                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod parser;
pub mod plan;

pub use parser::{parse_prompt, parse_prompt_with_year, OutputFormat, ParsedPrompt, ReportFilters};
pub use plan::{build_plan, ReportPlan};
