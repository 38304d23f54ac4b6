//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌────────────────┐   ┌────────────────┐   ┌────────────────┐      │
//! │  │    Product     │   │  Transaction   │   │    Expense     │      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  id (UUID)     │   │  id (UUID)     │   │  id (UUID)     │      │
//! │  │  category_id ──┼─┐ │  kind          │   │  title         │      │
//! │  │  quantity      │ │ │  items[]       │   │  amount_cents  │      │
//! │  │  cost/sell ¢   │ │ │  total_cents   │   │  date          │      │
//! │  └────────────────┘ │ └────────────────┘   └────────────────┘      │
//! │                     │                                              │
//! │  ┌────────────────┐ │ ┌────────────────┐   ┌────────────────┐      │
//! │  │    Category    │◄┘ │TransactionKind │   │ PaymentMethod  │      │
//! │  │  ────────────  │   │  ────────────  │   │  ────────────  │      │
//! │  │  name (unique) │   │  Sale          │   │  Cash          │      │
//! │  │  description   │   │  Purchase      │   │  Card          │      │
//! │  └────────────────┘   │  ReturnSupplier│   │  Online        │      │
//! │                       │  ReturnCustomer│   └────────────────┘      │
//! │                       └────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `TransactionItem` freezes the product's name and cost price at the
//! moment the transaction is applied. Later edits to the product never
//! rewrite history, which is what keeps profit reports truthful.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Transaction Kind
// =============================================================================

/// The business event a ledger entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Stock leaves the shop, revenue comes in.
    Sale,
    /// Restock from a supplier.
    Purchase,
    /// Previously purchased stock sent back to the supplier.
    ReturnSupplier,
    /// A customer returns a sold item; it goes back on the shelf.
    ReturnCustomer,
}

impl TransactionKind {
    /// Signed stock delta this kind applies for a given item quantity.
    ///
    /// ```text
    /// sale            → −quantity
    /// purchase        → +quantity
    /// return_supplier → −quantity
    /// return_customer → +quantity
    /// ```
    #[inline]
    pub const fn stock_delta(&self, quantity: i64) -> i64 {
        match self {
            TransactionKind::Sale | TransactionKind::ReturnSupplier => -quantity,
            TransactionKind::Purchase | TransactionKind::ReturnCustomer => quantity,
        }
    }

    /// Whether this kind removes stock (and therefore needs a
    /// sufficiency check before it is applied).
    #[inline]
    pub const fn removes_stock(&self) -> bool {
        matches!(self, TransactionKind::Sale | TransactionKind::ReturnSupplier)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Category
// =============================================================================

/// A reference catalog entry that products point to.
///
/// Deleting a category never cascades: products keep running with a null
/// reference and show up in the "Uncategorized" bucket on reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    /// Unique display name.
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product held in inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, also snapshotted onto transaction items.
    pub name: String,

    /// Weak reference to a category; `None` means uncategorized.
    pub category_id: Option<String>,

    /// Units on hand. Invariant: never negative.
    pub quantity: i64,

    /// What the shop pays per unit, in cents.
    pub cost_price_cents: i64,

    /// What the shop charges per unit, in cents.
    pub selling_price_cents: i64,

    /// Supplier name (free text).
    pub supplier: Option<String>,

    pub notes: Option<String>,

    /// Quantity at or below which the product counts as low on stock.
    /// Presentation concern only; the engine never enforces it.
    pub low_stock_threshold: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the cost price as a Money type.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }

    /// Returns the selling price as a Money type.
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Whether the product is at or below its low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// An immutable ledger entry for one stock-affecting business event.
///
/// Once persisted it is never updated or deleted; corrections are made by
/// recording a compensating transaction (e.g. a customer return).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub items: Vec<TransactionItem>,
    /// `Σ(quantity × unit_price_cents) − discount_cents`.
    pub total_cents: i64,
    pub discount_cents: i64,
    /// Customer or supplier name, depending on kind.
    pub party_name: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    /// Business date. Defaults to apply time but may be backdated
    /// (seed/historical data).
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the transaction total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Transaction Item
// =============================================================================

/// A line item in a ledger entry.
/// Uses the snapshot pattern to freeze product data at apply time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price charged/paid for this line, in cents.
    pub unit_price_cents: i64,
    /// Product cost price at apply time (frozen). Profit math reads this,
    /// never the live product, so later cost edits cannot distort history.
    pub unit_cost_cents: i64,
    /// Product name at apply time (frozen).
    pub product_name: String,
}

impl TransactionItem {
    /// Line total before discount: `unit price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents * self.quantity)
    }

    /// Margin for this line: `(unit price − unit cost) × quantity`.
    #[inline]
    pub fn margin_cents(&self) -> i64 {
        (self.unit_price_cents - self.unit_cost_cents) * self.quantity
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A business expense, independent of products.
/// Consumed only by the reporting service for expense totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount_cents: i64,
    /// Free-text grouping label, unrelated to product categories.
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
