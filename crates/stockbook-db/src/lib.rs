//! # Stockbook Database Layer
//!
//! SQLite persistence for the Stockbook inventory and POS tracker.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        stockbook-db                                 │
//! │                                                                     │
//! │  ┌──────────┐    ┌──────────────┐    ┌─────────────────────────┐   │
//! │  │   pool   │───▶│  migrations  │    │      repository/        │   │
//! │  │ Database │    │  (embedded)  │    │  categories  products   │   │
//! │  └──────────┘    └──────────────┘    │  transactions expenses  │   │
//! │        │                             │  reports                │   │
//! │        └────────────────────────────▶└─────────────────────────┘   │
//! │                                                                     │
//! │  Business rules live in stockbook-core; this crate loads state,    │
//! │  delegates to core::prepare, and makes the outcome durable in one  │
//! │  SQLite transaction.                                               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{ApplyError, DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    CategoryInput, CategoryRepository, CategoryStock, DayBucket, ExpenseInput, ExpenseRepository,
    MonthBucket, MonthlyRevenue, ProductInput, ProductRepository, ProductWithCategory,
    ReportRepository, SearchFilter, TransactionRepository,
};
