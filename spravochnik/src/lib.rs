//! Spravochnik: department and professor reference tables
//!
//! This crate ties the generic layers together for the two concrete tables:
//!
//! - [`kinds`]: the `Department` and `Professor` records and their schemas
//! - [`editors`]: the default editor registry for both tables
//! - [`seed`]: sample rows for a fresh database
//! - [`catalog`]: the table picker
//! - [`config`]: figment-based configuration
//!
//! ## Basic Usage
//!
//! ```rust,ignore
//! use spravochnik::{bootstrap, open_view, Professor, SpravochnikConfig};
//!
//! let config = SpravochnikConfig::load()?;
//! let store = bootstrap(&config)?;
//! let mut view = open_view::<Professor>(&store)?;
//! view.toggle_sort(1)?;
//! ```

pub mod catalog;
pub mod config;
pub mod editors;
mod error;
pub mod kinds;
pub mod seed;

use tracing::info;

use spravochnik_fields::Entity;
use spravochnik_grid::{RecordGrid, SortAdapter};
use spravochnik_store::{SqliteSession, Store};

pub use catalog::{catalog, Table, APP_TITLE};
pub use config::SpravochnikConfig;
pub use editors::default_registry;
pub use error::{ConfigError, Result, SpravochnikError};
pub use kinds::{Department, Professor, DEPARTMENTS, PROFESSORS};
pub use seed::seed_sample_rows;

/// Open the store with both tables registered, creating missing tables.
pub fn open_store(config: &SpravochnikConfig) -> Result<Store> {
    let store = Store::open(config.store_config())
        .register::<Department>()
        .register::<Professor>()
        .build()?;
    Ok(store)
}

/// Open the store and, when configured, seed empty tables.
pub fn bootstrap(config: &SpravochnikConfig) -> Result<Store> {
    let store = open_store(config)?;
    if config.seed_sample_rows {
        seed_sample_rows(&store)?;
    }
    info!(path = %store.path().display(), "store ready");
    Ok(store)
}

/// A grid over one table with a fresh session of its own.
pub fn open_grid<E: Entity>(store: &Store) -> Result<RecordGrid<E, SqliteSession>> {
    Ok(RecordGrid::open(store.session()?)?)
}

/// A sortable view over one table, initially in identity order.
pub fn open_view<E: Entity>(store: &Store) -> Result<SortAdapter<E, SqliteSession>> {
    Ok(SortAdapter::new(open_grid(store)?))
}
