//! Query modules for the sales dashboard.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and exposes methods
//! returning typed `Result<T>` rows.

pub mod sales;

pub use sales::{rank_sellers, SalesQuery};
