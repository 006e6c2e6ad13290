//! # Price Database Crate
//!
//! This crate is the PostgreSQL adapter behind the price series provider.
//! It reads daily open/close rows from the `stock_info` table and hands them
//! to the analytics layer as `PricePoint`s.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** All SQL lives here. The analytics crate never sees a
//!   connection; the application fetches once and loads the rows into an
//!   in-memory provider.
//! - **Read-only:** Loading prices into the table is done elsewhere. This crate
//!   never writes and runs no migrations.
//! - **Asynchronous & Pooled:** All operations are asynchronous over a `PgPool`.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::connect;
pub use error::DbError;
pub use repository::DbRepository;
