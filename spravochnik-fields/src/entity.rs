//! The `Entity` contract: a record kind with a column-indexed accessor table.

use std::fmt::Debug;

use crate::error::{FieldsError, Result};
use crate::types::EntityDef;
use crate::value::Value;

/// Getter/setter pair for one column of an entity.
///
/// Tables of these are plain `static` arrays of function pointers, so column
/// access needs neither reflection nor per-call allocation.
pub struct FieldAccessor<E> {
    pub get: fn(&E) -> Value,
    pub set: fn(&mut E, Value) -> Result<()>,
}

/// A record kind.
///
/// `Default` produces a fresh, not yet persisted instance with every field at
/// its default value and no identity.
pub trait Entity: Clone + Default + Debug + 'static {
    /// Schema of this kind. Column `i` is `entity_def().fields[i]`.
    fn entity_def() -> &'static EntityDef;

    /// Accessor table, one entry per field, in column order.
    fn accessors() -> &'static [FieldAccessor<Self>];

    /// Read the value at a column.
    fn get(&self, column: usize) -> Option<Value> {
        Self::accessors().get(column).map(|a| (a.get)(self))
    }

    /// Overwrite the value at a column.
    fn set(&mut self, column: usize, value: Value) -> Result<()> {
        let accessor = Self::accessors()
            .get(column)
            .ok_or_else(|| FieldsError::ColumnOutOfRange {
                entity: Self::entity_def().name.clone(),
                column,
            })?;
        (accessor.set)(self, value)
    }

    /// Identity assigned by the store, `None` before the first insert.
    fn identity(&self) -> Option<i64> {
        self.get(0).and_then(|v| v.as_integer())
    }

    /// All values in column order.
    fn values(&self) -> Vec<Value> {
        Self::accessors().iter().map(|a| (a.get)(self)).collect()
    }
}

/// Verify that a kind's descriptor is well formed and its accessor table
/// covers exactly its columns.
pub fn check_entity<E: Entity>() -> Result<()> {
    let def = E::entity_def();
    def.validate()?;
    let accessors = E::accessors().len();
    if accessors != def.column_count() {
        return Err(FieldsError::invalid_entity(
            &def.name,
            format!(
                "{} accessors for {} columns",
                accessors,
                def.column_count()
            ),
        ));
    }
    Ok(())
}
