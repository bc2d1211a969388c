//! Editable record grids over Spravochnik stores
//!
//! A [`RecordGrid`] presents the working set of one entity kind as rows and
//! columns: it reads and writes cells by index, stages structural changes in the
//! session it owns, and notifies observers with [`GridEvent`]s. A [`SortAdapter`]
//! wraps a grid with a view order, and an [`EditorRegistry`] supplies the
//! per-field editors that turn user input into native values.
//!
//! ## Basic Usage
//!
//! ```rust,ignore
//! use spravochnik_grid::{EditorRegistry, RecordGrid, SortAdapter, SortOrder};
//!
//! let grid = RecordGrid::<Professor, _>::open(store.session()?)?;
//! let mut view = SortAdapter::new(grid);
//! view.sort(1, SortOrder::Ascending)?;
//!
//! let registry = EditorRegistry::from_entity(Professor::entity_def());
//! if let Some(mut surface) = view.begin_edit(&registry, 0, 3)? {
//!     surface.set_number(42);
//!     view.finish_edit(&registry, 0, 3, &surface)?;
//! }
//! view.commit()?;
//! ```

pub mod editor;
mod error;
pub mod event;
pub mod model;
pub mod sort;

#[cfg(test)]
mod testing;

pub use editor::{
    editor_for_field, CellEditor, ChoiceOption, DateEditor, DecimalEditor, EditorRegistry,
    EditorSurface, IntegerEditor, LongTextEditor, ReferenceEditor, TextEditor,
};
pub use error::{EditorError, GridError, Result};
pub use event::{GridEvent, Observer, Observers};
pub use model::RecordGrid;
pub use sort::{SortAdapter, SortOrder};
