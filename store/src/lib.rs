//! A small store built on the `assoc` containers
//!
//! Products are loaded from a flat text file into an AVL tree keyed by id and re-keyed by name.
//! Simulated orders and supplier purchases are indexed per product in chained hash tables, which
//! back the per-product reports.

pub mod catalog;
pub mod config;
pub mod error;
pub mod order;
pub mod product;
pub mod report;
pub mod sequence;
pub mod simulation;
pub mod supplier;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use order::{Order, Payment};
pub use product::{Product, ProductId, ProductKind};
pub use sequence::IdSequence;
pub use simulation::{OrderBook, SupplierBook};
pub use supplier::Supplier;
