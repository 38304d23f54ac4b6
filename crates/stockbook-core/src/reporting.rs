//! # KPI Computation
//!
//! Pure aggregation math over already-loaded ledger data.
//!
//! ## Division of Labour
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  stockbook-db ReportRepository          stockbook-core (this file)  │
//! │  ─────────────────────────────          ──────────────────────────  │
//! │  SQL: load sales in range        ────►  revenue / profit math       │
//! │  SQL: SUM expenses in range      ────►  assembled into KpiSummary   │
//! │  SQL: GROUP BY bucketing                (pure, unit-testable)       │
//! │       (trend, stock overview,                                       │
//! │        year/month/day drill-down)                                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Profit reads the cost **snapshots** frozen on transaction items, never
//! live product prices. That is the whole point of the snapshot pattern.

use serde::{Deserialize, Serialize};

use crate::types::{Transaction, TransactionKind};

// =============================================================================
// KPI Summary
// =============================================================================

/// Aggregated business metrics for one reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    /// Σ total of `sale` transactions in the period.
    pub revenue_cents: i64,
    /// Σ per-item margin of sales, minus each sale's discount once.
    pub profit_cents: i64,
    /// Σ expense amounts in the period.
    pub expenses_cents: i64,
    /// Reserved metric, always 0. The business definition of "loss"
    /// (damaged stock? negative-margin sales?) has never been supplied;
    /// the field stays in the contract until it is.
    pub loss_cents: i64,
}

// =============================================================================
// Profit Math
// =============================================================================

/// Profit contribution of a single sale:
/// `Σ (unit_price − unit_cost_snapshot) × quantity − discount`.
///
/// The discount is subtracted once per transaction, not once per item.
pub fn sale_profit_cents(sale: &Transaction) -> i64 {
    let margin: i64 = sale.items.iter().map(|item| item.margin_cents()).sum();
    margin - sale.discount_cents
}

/// Computes the KPI summary for a period from its sale transactions and
/// pre-summed expense total.
///
/// Non-sale transactions in `sales` are ignored defensively; callers are
/// expected to filter by kind at the query layer.
pub fn summarize(sales: &[Transaction], expenses_cents: i64) -> KpiSummary {
    let mut revenue_cents = 0;
    let mut profit_cents = 0;

    for sale in sales.iter().filter(|t| t.kind == TransactionKind::Sale) {
        revenue_cents += sale.total_cents;
        profit_cents += sale_profit_cents(sale);
    }

    KpiSummary {
        revenue_cents,
        profit_cents,
        expenses_cents,
        loss_cents: 0, // reserved, see field docs
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
