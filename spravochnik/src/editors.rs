//! Editors for the department and professor tables.

use spravochnik_fields::Entity;
use spravochnik_grid::EditorRegistry;

use crate::kinds::{Department, Professor};

/// Registry with an editor for every editable field of both tables:
/// line edits for names, a plain-text box for the description, a decimal spin
/// box for the budget, a calendar for the birth date, a 0..=99 spin box for
/// the rating and a department choice list.
pub fn default_registry() -> EditorRegistry {
    let mut registry = EditorRegistry::from_entity(Department::entity_def());
    registry.add_entity(Professor::entity_def());
    registry
}
