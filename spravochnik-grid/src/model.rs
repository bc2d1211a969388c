//! The record grid: a working set of one entity kind shown as rows and columns.

use tracing::{debug, warn};

use spravochnik_fields::{
    check_entity, Entity, EntityDef, FieldDef, FieldType, SortKind, Value, NULL_DISPLAY,
};
use spravochnik_store::{LabelLookup, LookupFilter, Session};

use crate::error::{GridError, Result};
use crate::event::{GridEvent, Observers};

/// Editable grid over the rows of `E`, backed by a session it owns.
///
/// Row `r` is the `r`-th record of the working set in identity order; column `c`
/// is field `c` of `E`'s schema. Structural operations (add, delete, commit,
/// revert) reload the working set from the session and emit
/// [`GridEvent::RowsReset`].
pub struct RecordGrid<E: Entity, S: Session> {
    session: S,
    rows: Vec<E>,
    observers: Observers,
}

impl<E: Entity, S: Session> RecordGrid<E, S> {
    /// Take ownership of `session` and load the working set.
    pub fn open(session: S) -> Result<Self> {
        check_entity::<E>()?;
        let rows = session.load_all::<E>()?;
        debug!(entity = %E::entity_def().name, rows = rows.len(), "grid opened");
        Ok(Self {
            session,
            rows,
            observers: Observers::default(),
        })
    }

    pub fn entity_def(&self) -> &'static EntityDef {
        E::entity_def()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        E::entity_def().column_count()
    }

    /// Column header: the field name.
    pub fn header(&self, column: usize) -> Option<&'static str> {
        E::entity_def().field_at(column).map(|f| f.name.as_str())
    }

    /// The record behind a row.
    pub fn record(&self, row: usize) -> Option<&E> {
        self.rows.get(row)
    }

    /// The working set, in row order.
    pub fn records(&self) -> &[E] {
        &self.rows
    }

    /// Native value of a cell, never a resolved label.
    pub fn raw_value(&self, row: usize, column: usize) -> Result<Value> {
        self.field(column)?;
        let record = self.checked_row(row)?;
        Ok(record.get(column).unwrap_or_default())
    }

    /// Human-readable text of a cell.
    ///
    /// References show the referenced row's label, or `None` when the reference
    /// is null or the referenced row cannot be found.
    pub fn display_value(&self, row: usize, column: usize) -> Result<String> {
        let raw = self.raw_value(row, column)?;
        let field = self.field(column)?;
        if let FieldType::Reference { entity, label } = &field.type_ {
            return Ok(self
                .resolve_label(entity, label, &raw)
                .unwrap_or_else(|| NULL_DISPLAY.to_string()));
        }
        Ok(raw.to_string())
    }

    /// Value a sort pass compares for a cell.
    ///
    /// Label-sorted fields compare their display text, so an unresolved
    /// reference orders as the word it shows; every other field compares its
    /// raw value.
    pub fn sort_key(&self, row: usize, column: usize) -> Result<Value> {
        match self.field(column)?.effective_sort() {
            SortKind::Natural => self.raw_value(row, column),
            SortKind::Label => Ok(Value::Text(self.display_value(row, column)?)),
        }
    }

    /// Whether a column accepts [`RecordGrid::set_value`]. The identity never does.
    pub fn is_editable(&self, column: usize) -> bool {
        E::entity_def()
            .field_at(column)
            .is_some_and(|f| !f.is_identity())
    }

    /// Stage a new value for one cell and notify [`GridEvent::CellChanged`].
    ///
    /// Values are expected in the field's native type; editors coerce input
    /// before calling this.
    pub fn set_value(&mut self, row: usize, column: usize, value: Value) -> Result<()> {
        let field = self.field(column)?;
        if field.is_identity() {
            return Err(GridError::ReadOnlyColumn {
                field: field.name.clone(),
            });
        }
        let mut updated = self.checked_row(row)?.clone();
        updated.set(column, value)?;
        self.session.stage_update(&updated, column)?;
        self.rows[row] = updated;
        debug!(entity = %E::entity_def().name, row, field = %field.name, "cell staged");
        self.observers.emit(GridEvent::CellChanged { row, column });
        Ok(())
    }

    /// Stage a new record with default values. It appears as the last row.
    pub fn add_row(&mut self) -> Result<()> {
        let mut record = E::default();
        let staged = self.session.stage_insert(&mut record);
        self.reset()?;
        staged?;
        debug!(entity = %E::entity_def().name, id = ?record.identity(), "row added");
        Ok(())
    }

    /// Stage deletion of the addressed rows. Repeated indices count once.
    ///
    /// Rows that were added in this session and never committed are simply
    /// dropped from the pending inserts.
    pub fn delete_rows(&mut self, rows: &[usize]) -> Result<()> {
        let mut indices = rows.to_vec();
        indices.sort_unstable();
        indices.dedup();
        let targets = indices
            .iter()
            .map(|&row| self.checked_row(row).cloned())
            .collect::<Result<Vec<_>>>()?;

        let staged = targets
            .iter()
            .try_for_each(|record| self.session.stage_delete(record));
        self.reset()?;
        staged?;
        debug!(entity = %E::entity_def().name, count = targets.len(), "rows deleted");
        Ok(())
    }

    /// Make all staged changes durable, then reload.
    ///
    /// On failure the working set is left untouched and every change stays
    /// staged, so the caller can correct it and retry or [`RecordGrid::revert`].
    pub fn commit(&mut self) -> Result<()> {
        let entity = &E::entity_def().name;
        if let Err(source) = self.session.commit() {
            warn!(%entity, error = %source, "commit failed");
            return Err(GridError::CommitFailed {
                entity: entity.clone(),
                source,
            });
        }
        self.reset()
    }

    /// Discard all staged changes and reload from durable storage.
    pub fn revert(&mut self) -> Result<()> {
        self.session.rollback()?;
        self.reset()
    }

    /// Whether the session holds uncommitted changes.
    pub fn has_pending_changes(&self) -> bool {
        self.session.has_pending()
    }

    /// Register an observer for [`GridEvent`]s.
    pub fn subscribe(&mut self, observer: impl FnMut(&GridEvent) + 'static) {
        self.observers.subscribe(observer);
    }

    /// Read access to the session for editors that need option lists.
    pub fn lookup(&self) -> &dyn LabelLookup {
        &self.session
    }

    /// Release the session. Uncommitted changes are discarded.
    pub fn close(self) -> Result<()> {
        debug!(entity = %E::entity_def().name, "grid closed");
        self.session.close()?;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.rows = self.session.load_all::<E>()?;
        self.observers.emit(GridEvent::RowsReset);
        Ok(())
    }

    fn field(&self, column: usize) -> Result<&'static FieldDef> {
        E::entity_def()
            .field_at(column)
            .ok_or(GridError::ColumnOutOfRange {
                column,
                columns: self.column_count(),
            })
    }

    fn checked_row(&self, row: usize) -> Result<&E> {
        self.rows.get(row).ok_or(GridError::RowOutOfRange {
            row,
            rows: self.rows.len(),
        })
    }

    fn resolve_label(&self, entity: &str, label: &str, raw: &Value) -> Option<String> {
        let id = raw.as_integer()?;
        match self.session.lookup(entity, label, LookupFilter::ById(id)) {
            Ok(found) => {
                let text = found.into_iter().next().map(|(_, v)| v.to_string());
                if text.is_none() {
                    debug!(%entity, id, "referenced row missing");
                }
                text
            }
            Err(e) => {
                warn!(%entity, id, error = %e, "reference lookup failed");
                None
            }
        }
    }
}

impl<E: Entity, S: Session> std::fmt::Debug for RecordGrid<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordGrid")
            .field("entity", &E::entity_def().name)
            .field("rows", &self.rows.len())
            .field("observers", &self.observers)
            .finish()
    }
}
