//! The persistence session contract consumed by the record grid.

use spravochnik_fields::{Entity, Value};

use crate::error::Result;

/// Which rows a [`LabelLookup::lookup`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupFilter {
    All,
    ById(i64),
}

/// Read-only access to `(identity, field)` pairs of any registered kind.
///
/// Split from [`Session`] so editors can query options through a trait object.
pub trait LabelLookup {
    /// `(identity, value of field)` for every row of `entity` matching `filter`,
    /// ordered by identity. Staged changes of this session are visible.
    fn lookup(&self, entity: &str, field: &str, filter: LookupFilter) -> Result<Vec<(i64, Value)>>;
}

/// A unit of work against the durable store.
///
/// Every `stage_*` call is pending until [`Session::commit`]; reads through the
/// same session already observe it. [`Session::rollback`] discards all of it.
pub trait Session: LabelLookup {
    /// Every row of `E`, ordered by identity.
    fn load_all<E: Entity>(&self) -> Result<Vec<E>>;

    /// Stage a new row. The store assigns the identity and writes it back into `entity`.
    fn stage_insert<E: Entity>(&mut self, entity: &mut E) -> Result<()>;

    /// Stage the current value of one column of an existing row.
    fn stage_update<E: Entity>(&mut self, entity: &E, column: usize) -> Result<()>;

    /// Stage removal of a row. A row inserted earlier in this session simply disappears.
    fn stage_delete<E: Entity>(&mut self, entity: &E) -> Result<()>;

    /// Whether anything is staged.
    fn has_pending(&self) -> bool;

    /// Make every staged operation durable, all or nothing.
    ///
    /// On error nothing was written and everything is still staged.
    fn commit(&mut self) -> Result<()>;

    /// Discard every staged operation.
    fn rollback(&mut self) -> Result<()>;

    /// Release the session. Anything still staged is discarded.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}
