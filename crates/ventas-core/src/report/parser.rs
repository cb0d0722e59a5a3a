//! # Prompt Parser
//!
//! Maps free-text Spanish report prompts to a structured filter set using
//! keyword and regex matching over a fixed vocabulary.
//!
//! ## Best-Effort Contract
//! Parsing NEVER fails. Unrecognized text is ignored and every component
//! degrades to an explicit default:
//!
//! | component | vocabulary                         | default            |
//! |-----------|------------------------------------|--------------------|
//! | dates     | `dd/mm/yyyy` (1 = day, 2 = range)  | none               |
//! | month     | enero..diciembre                   | none               |
//! | year      | 4-digit token (`del`/`año` prefix) | parse-time year when a month matched |
//! | status    | "pagado"                           | none               |
//! | method    | "paypal", "stripe"                 | none               |
//! | fields    | static label map below             | username/total/date|
//! | format    | "pdf", "excel"/"xlsx"              | json               |
//!
//! Two quirks are deliberate and load-bearing:
//! - The year token also matches the year inside an explicit `dd/mm/yyyy`
//!   date, so a date-range prompt additionally carries a year filter.
//! - A month without a year resolves to the year *at parse time*, which is
//!   surprising around New Year. Callers that need determinism pass the
//!   reference year via [`parse_prompt_with_year`].

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{OrderStatus, PaymentMethod};

// =============================================================================
// Vocabulary
// =============================================================================

/// Spanish month names in calendar order.
const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Label → field-path map, checked in declaration order.
///
/// Paths use `relation.attribute` form; `items.product.name` is a known
/// three-segment path that the query planner silently drops (it never had a
/// rendering in the original reports either).
const FIELD_LABELS: [(&str, &str); 8] = [
    ("nombre del cliente", "user.username"),
    ("monto total pagado", "total"),
    ("fecha de orden", "created_at"),
    ("estado", "status"),
    ("método de pago", "payment.method"),
    ("cantidad", "items.quantity"),
    ("producto", "items.product.name"),
    ("precio", "items.price"),
];

/// Fallback field triple used when no label matches.
pub const DEFAULT_FIELDS: [&str; 3] = ["user.username", "total", "created_at"];

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}/\d{1,2}/\d{4})\b").expect("date regex"));

static MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"\b(?:de|en|del)?\s*({})\b", MONTH_NAMES.join("|"));
    Regex::new(&pattern).expect("month regex")
});

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:del|año)?\s*(\d{4})\b").expect("year regex"));

// =============================================================================
// Output Types
// =============================================================================

/// Requested output format for the generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Json,
    Pdf,
    Excel,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Excel => "excel",
        }
    }

    /// Parses a format token (used by the export endpoint query string).
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "pdf" => Some(OutputFormat::Pdf),
            "excel" | "xlsx" => Some(OutputFormat::Excel),
            _ => None,
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Json
    }
}

/// Recognized filters, AND-combined by the query planner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilters {
    /// Exact-day filter (exactly one date token in the prompt).
    pub date: Option<NaiveDate>,
    /// Inclusive range (two or more date tokens; first two win).
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Calendar month 1..=12.
    pub month: Option<u32>,
    /// Calendar year.
    pub year: Option<i32>,
    pub status: Option<OrderStatus>,
    pub payment_method: Option<PaymentMethod>,
}

impl ReportFilters {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.date_range.is_none()
            && self.month.is_none()
            && self.year.is_none()
            && self.status.is_none()
            && self.payment_method.is_none()
    }
}

/// The parser's structured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedPrompt {
    /// Requested field paths (never empty; defaults applied).
    pub fields: Vec<String>,
    pub filters: ReportFilters,
    pub format: OutputFormat,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a report prompt, resolving a month-without-year against the
/// current calendar year.
pub fn parse_prompt(prompt: &str) -> ParsedPrompt {
    parse_prompt_with_year(prompt, Utc::now().year())
}

/// Parses a report prompt with an explicit reference year for the
/// month-without-year default.
pub fn parse_prompt_with_year(prompt: &str, reference_year: i32) -> ParsedPrompt {
    let lower = prompt.to_lowercase();

    // Requested field labels, in vocabulary order.
    let mut fields: Vec<String> = Vec::new();
    for (label, path) in FIELD_LABELS {
        if lower.contains(label) {
            fields.push(path.to_string());
        }
    }
    if fields.is_empty() {
        fields = DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect();
    }

    let mut filters = ReportFilters::default();

    // Explicit dates: one → exact day, two+ → inclusive range from the
    // first two. A failed parse of either range bound drops the range
    // entirely rather than degrading to the single-date case.
    let dates: Vec<&str> = DATE_RE
        .find_iter(prompt)
        .map(|m| m.as_str())
        .take(2)
        .collect();
    match dates.as_slice() {
        [start, end] => {
            if let (Ok(start), Ok(end)) = (parse_date(start), parse_date(end)) {
                filters.date_range = Some((start, end));
            }
        }
        [single] => {
            if let Ok(date) = parse_date(single) {
                filters.date = Some(date);
            }
        }
        _ => {}
    }

    // Month name, first match wins.
    let month_matched = if let Some(caps) = MONTH_RE.captures(&lower) {
        filters.month = month_number(&caps[1]);
        filters.month.is_some()
    } else {
        false
    };

    // Year token. Also matches the year digits inside an explicit date,
    // which is preserved behavior: a range prompt carries the year too.
    if let Some(caps) = YEAR_RE.captures(&lower) {
        filters.year = caps[1].parse::<i32>().ok();
    }
    // A month without a year means "this year", resolved at parse time.
    if month_matched && filters.year.is_none() {
        filters.year = Some(reference_year);
    }

    // Status / payment method keywords. Stripe is checked after PayPal, so
    // it wins when both appear.
    if lower.contains("pagado") {
        filters.status = Some(OrderStatus::Paid);
    }
    if lower.contains("paypal") {
        filters.payment_method = Some(PaymentMethod::Paypal);
    }
    if lower.contains("stripe") {
        filters.payment_method = Some(PaymentMethod::Stripe);
    }

    // Output format keyword.
    let format = if lower.contains("pdf") {
        OutputFormat::Pdf
    } else if lower.contains("excel") || lower.contains("xlsx") {
        OutputFormat::Excel
    } else {
        OutputFormat::Json
    };

    ParsedPrompt {
        fields,
        filters,
        format,
    }
}

fn parse_date(token: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(token, "%d/%m/%Y")
}

fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| *m == name)
        .map(|idx| idx as u32 + 1)
}

// =============================================================================
// Unit Tests
// =============================================================================
