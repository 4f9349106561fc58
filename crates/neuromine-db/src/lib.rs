//! Neuromine Database Layer
//!
//! Embedded LanceDB storage for the compound collection: one row per
//! compound name, with its evidence entries and confidence label.
//!
//! # Example
//!
//! ```rust,no_run
//! use neuromine_db::{CompoundRepository, CompoundStore, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("./data/neuromine.db").await?;
//!     db.initialize().await?;
//!
//!     let compounds = CompoundRepository::new(std::sync::Arc::new(db));
//!     println!("{} compounds", compounds.count().await?);
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod schema;
pub mod schema_arrow;
pub mod compounds;
pub mod store;

pub use database::{Database, DatabaseStats};
pub use error::{DbError, Result};
pub use schema::{CompoundRecord, EvidenceEntry, TABLE_COMPOUNDS};
pub use compounds::CompoundRepository;
pub use store::{CompoundStore, UpsertOutcome};
