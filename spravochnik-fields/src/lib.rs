//! Entity descriptors and typed field values
//!
//! `spravochnik-fields` is the schema-only layer shared by the store and the grid.
//! It knows nothing about SQLite or editors; it describes record kinds and how to
//! reach their fields by column index.
//!
//! # Architecture
//!
//! - **Data-only descriptors**: [`EntityDef`] is an ordered list of [`FieldDef`]s with
//!   the identity field at column 0
//! - **Typed values**: [`Value`] is the native value of one cell, never a display label
//! - **Accessor tables**: each kind implements [`Entity`] with a static table of
//!   `(getter, setter)` pairs indexed by column, built once per kind

pub mod entity;
pub mod error;
pub mod types;
pub mod value;

pub use entity::{check_entity, Entity, FieldAccessor};
pub use error::{FieldsError, Result};
pub use types::{Editor, EntityDef, FieldDef, FieldType, SortKind};
pub use value::{Value, NULL_DISPLAY};
