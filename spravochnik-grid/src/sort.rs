//! Sorted view over a record grid.
//!
//! The adapter never reorders the grid's working set. It keeps a permutation
//! `order` where view row `v` shows source row `order[v]`, and rebuilds it
//! after every operation it forwards.

use spravochnik_fields::{Entity, EntityDef, Value};
use spravochnik_store::Session;
use tracing::debug;

use crate::editor::{EditorRegistry, EditorSurface};
use crate::error::{GridError, Result};
use crate::event::{GridEvent, Observers};
use crate::model::RecordGrid;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// A [`RecordGrid`] presented in user-chosen column order.
///
/// Keys come from [`RecordGrid::sort_key`]: raw values, except reference
/// columns which sort by their resolved labels. Equal keys keep source row
/// order; descending is the exact reverse of ascending.
pub struct SortAdapter<E: Entity, S: Session> {
    source: RecordGrid<E, S>,
    order: Vec<usize>,
    sort: Option<(usize, SortOrder)>,
    observers: Observers,
}

impl<E: Entity, S: Session> SortAdapter<E, S> {
    /// Wrap a grid, initially unsorted.
    pub fn new(source: RecordGrid<E, S>) -> Self {
        let order = (0..source.row_count()).collect();
        Self {
            source,
            order,
            sort: None,
            observers: Observers::default(),
        }
    }

    pub fn source(&self) -> &RecordGrid<E, S> {
        &self.source
    }

    /// Unwrap the grid, dropping the sort.
    pub fn into_source(self) -> RecordGrid<E, S> {
        self.source
    }

    pub fn entity_def(&self) -> &'static EntityDef {
        self.source.entity_def()
    }

    /// Current sort column and direction, if any.
    pub fn sort_column(&self) -> Option<(usize, SortOrder)> {
        self.sort
    }

    /// Sort by a column.
    pub fn sort(&mut self, column: usize, order: SortOrder) -> Result<()> {
        if column >= self.source.column_count() {
            return Err(GridError::ColumnOutOfRange {
                column,
                columns: self.source.column_count(),
            });
        }
        self.sort = Some((column, order));
        self.refresh()
    }

    /// Header-click behavior: a new column sorts ascending, the current one flips.
    pub fn toggle_sort(&mut self, column: usize) -> Result<SortOrder> {
        let order = match self.sort {
            Some((current, order)) if current == column => order.toggled(),
            _ => SortOrder::Ascending,
        };
        self.sort(column, order)?;
        Ok(order)
    }

    /// Return to source row order.
    pub fn clear_sort(&mut self) -> Result<()> {
        self.sort = None;
        self.refresh()
    }

    /// Source row shown at a view row.
    pub fn map_to_source(&self, row: usize) -> Option<usize> {
        self.order.get(row).copied()
    }

    /// View row showing a source row.
    pub fn map_from_source(&self, source_row: usize) -> Option<usize> {
        self.order.iter().position(|&r| r == source_row)
    }

    pub fn row_count(&self) -> usize {
        self.order.len()
    }

    pub fn column_count(&self) -> usize {
        self.source.column_count()
    }

    pub fn header(&self, column: usize) -> Option<&'static str> {
        self.source.header(column)
    }

    pub fn is_editable(&self, column: usize) -> bool {
        self.source.is_editable(column)
    }

    pub fn record(&self, row: usize) -> Option<&E> {
        self.map_to_source(row).and_then(|r| self.source.record(r))
    }

    pub fn raw_value(&self, row: usize, column: usize) -> Result<Value> {
        self.source.raw_value(self.source_row(row)?, column)
    }

    pub fn display_value(&self, row: usize, column: usize) -> Result<String> {
        self.source.display_value(self.source_row(row)?, column)
    }

    /// Stage a cell edit addressed in view coordinates.
    ///
    /// Editing the sort column can move the row, in which case observers get a
    /// reset instead of a cell change.
    pub fn set_value(&mut self, row: usize, column: usize, value: Value) -> Result<()> {
        let source_row = self.source_row(row)?;
        self.source.set_value(source_row, column, value)?;
        self.after_edit(row, column, source_row)
    }

    pub fn add_row(&mut self) -> Result<()> {
        let result = self.source.add_row();
        self.refresh()?;
        result
    }

    /// Stage deletion of rows addressed in view coordinates.
    pub fn delete_rows(&mut self, rows: &[usize]) -> Result<()> {
        let source_rows = rows
            .iter()
            .map(|&r| self.source_row(r))
            .collect::<Result<Vec<_>>>()?;
        let result = self.source.delete_rows(&source_rows);
        self.refresh()?;
        result
    }

    /// Commit through the grid. A failed commit leaves the view as it was.
    pub fn commit(&mut self) -> Result<()> {
        self.source.commit()?;
        self.refresh()
    }

    pub fn revert(&mut self) -> Result<()> {
        self.source.revert()?;
        self.refresh()
    }

    pub fn has_pending_changes(&self) -> bool {
        self.source.has_pending_changes()
    }

    /// Register an observer for events in view coordinates.
    pub fn subscribe(&mut self, observer: impl FnMut(&GridEvent) + 'static) {
        self.observers.subscribe(observer);
    }

    /// Open the registered editor for a cell, loaded with its current value.
    pub fn begin_edit(
        &self,
        registry: &EditorRegistry,
        row: usize,
        column: usize,
    ) -> Result<Option<EditorSurface>> {
        registry.begin_edit(&self.source, self.source_row(row)?, column)
    }

    /// Apply an editor's value to a cell. Returns `false` if the editor rejected its input.
    pub fn finish_edit(
        &mut self,
        registry: &EditorRegistry,
        row: usize,
        column: usize,
        surface: &EditorSurface,
    ) -> Result<bool> {
        let source_row = self.source_row(row)?;
        let applied = registry.finish_edit(&mut self.source, source_row, column, surface)?;
        if applied {
            self.after_edit(row, column, source_row)?;
        }
        Ok(applied)
    }

    pub fn close(self) -> Result<()> {
        self.source.close()
    }

    fn source_row(&self, row: usize) -> Result<usize> {
        self.map_to_source(row).ok_or(GridError::RowOutOfRange {
            row,
            rows: self.order.len(),
        })
    }

    fn after_edit(&mut self, row: usize, column: usize, source_row: usize) -> Result<()> {
        let sorted_on_edit = matches!(self.sort, Some((c, _)) if c == column);
        if !sorted_on_edit {
            self.observers.emit(GridEvent::CellChanged { row, column });
            return Ok(());
        }
        self.rebuild_order()?;
        match self.map_from_source(source_row) {
            Some(now) if now == row => {
                self.observers.emit(GridEvent::CellChanged { row, column });
            }
            _ => self.observers.emit(GridEvent::RowsReset),
        }
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.rebuild_order()?;
        self.observers.emit(GridEvent::RowsReset);
        Ok(())
    }

    fn rebuild_order(&mut self) -> Result<()> {
        let rows = self.source.row_count();
        let mut order: Vec<usize> = (0..rows).collect();
        if let Some((column, direction)) = self.sort {
            // One key per row per pass; labels cost a lookup each.
            let keys = (0..rows)
                .map(|r| self.source.sort_key(r, column))
                .collect::<Result<Vec<_>>>()?;
            order.sort_by(|&a, &b| keys[a].cmp(&keys[b]).then(a.cmp(&b)));
            if direction == SortOrder::Descending {
                order.reverse();
            }
            debug!(
                entity = %self.source.entity_def().name,
                column,
                ?direction,
                rows,
                "rows sorted"
            );
        }
        self.order = order;
        Ok(())
    }
}
