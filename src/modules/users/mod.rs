//! Account persistence.
//!
//! [`UserStore`] is the seam the account service talks to. [`PgUserStore`] is
//! the production implementation; [`MemoryUserStore`] is compiled for tests and
//! with the `test-utils` feature.

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;
pub mod repository;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use repository::UserStore;
