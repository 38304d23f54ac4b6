//! # Repository Modules
//!
//! Repository pattern: each entity gets a repository owning its SQL.
//! Handlers never write queries; they call repositories obtained from
//! [`crate::Database`].

pub mod category;
pub mod expense;
pub mod product;
pub mod report;
pub mod transaction;

pub use category::{CategoryInput, CategoryRepository};
pub use expense::{ExpenseInput, ExpenseRepository};
pub use product::{ProductInput, ProductRepository, ProductWithCategory};
pub use report::{
    CategoryStock, DayBucket, MonthBucket, MonthlyRevenue, ReportRepository, SearchFilter,
};
pub use transaction::TransactionRepository;
