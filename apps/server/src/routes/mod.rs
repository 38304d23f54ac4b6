//! # Route Modules
//!
//! One module per resource; each exports a `routes()` function that the
//! app router nests under the resource path.

pub mod categories;
pub mod dashboard;
pub mod expenses;
pub mod health;
pub mod logs;
pub mod products;
pub mod transactions;
