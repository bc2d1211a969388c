//! Persistence sessions for Spravochnik
//!
//! A [`Store`] is a SQLite database holding one table per registered entity kind.
//! A [`SqliteSession`] is the unit of work a record grid owns: it stages inserts,
//! updates and deletes, exposes them to its own reads, and makes them durable
//! only on [`Session::commit`].
//!
//! ## Basic Usage
//!
//! ```rust,ignore
//! use spravochnik_store::{Session, Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("spravochnik.db"))
//!     .register::<Department>()
//!     .build()?;
//!
//! let mut session = store.session()?;
//! let mut dept = Department::default();
//! session.stage_insert(&mut dept)?;
//! session.commit()?;
//! ```

pub mod config;
mod error;
pub mod schema;
mod session;
mod sqlite;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use schema::{create_table_sql, Schema};
pub use session::{LabelLookup, LookupFilter, Session};
pub use sqlite::{SqliteSession, Store, StoreBuilder};
