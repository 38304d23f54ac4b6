//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate is the **heart** of the inventory tracker. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Stockbook Architecture                          │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                apps/server (Axum HTTP API)                    │  │
//! │  │   POST /transactions ── GET /dashboard ── GET /logs/...       │  │
//! │  └─────────────────────────────┬─────────────────────────────────┘  │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐  │
//! │  │             ★ stockbook-core (THIS CRATE) ★                   │  │
//! │  │                                                               │  │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────┐  │  │
//! │  │   │  types  │ │  money  │ │ engine  │ │ period  │ │reporting│ │  │
//! │  │   │ Product │ │  Money  │ │ prepare │ │ bounds  │ │  KPIs  │  │  │
//! │  │   │ Ledger  │ │  cents  │ │snapshots│ │ windows │ │ profit │  │  │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └────────┘  │  │
//! │  │                                                               │  │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │  │
//! │  └─────────────────────────────┬─────────────────────────────────┘  │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐  │
//! │  │                 stockbook-db (Database Layer)                 │  │
//! │  │           SQLite queries, migrations, repositories            │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Transaction, Expense)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`engine`] - Transaction preparation: validate-all-then-apply-all
//! - [`period`] - Calendar period math for reporting
//! - [`reporting`] - KPI computation over loaded ledger data
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic; callers pass
//!    the clock and the loaded state in
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod money;
pub mod period;
pub mod reporting;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use engine::{PreparedTransaction, RequestedItem, StockAdjustment, TransactionRequest};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use period::DateRange;
pub use reporting::KpiSummary;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single transaction.
///
/// Prevents runaway requests; a single-register shop never legitimately
/// rings up more distinct lines than this.
pub const MAX_TRANSACTION_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// Guards against typos (1000 instead of 10) turning into inventory
/// mutations.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum accepted monetary amount, in cents (one billion in major
/// units).
///
/// Caps every price, discount, and expense amount so that
/// `MAX_TRANSACTION_ITEMS × MAX_ITEM_QUANTITY × MAX_AMOUNT_CENTS`
/// stays far below `i64::MAX`: totals can then be summed with plain
/// arithmetic and cannot overflow.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Default per-product low-stock threshold when none is supplied.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Bucket label reports use for products whose category reference is
/// null or unresolvable.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
