//! Per-field cell editors and the registry that selects them.
//!
//! An editor does three things for one field: build an input surface, load a
//! raw cell value into it, and turn whatever the user left in it back into a
//! native [`Value`]. [`EditorSurface`] is the widget-independent state a view
//! binds its input widget to.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use spravochnik_fields::{Editor, Entity, EntityDef, FieldDef, FieldType, Value, NULL_DISPLAY};
use spravochnik_store::{LabelLookup, LookupFilter, Session};

use crate::error::{EditorError, Result};
use crate::model::RecordGrid;

/// One entry of a choice list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub label: String,
    /// Identity stored when this option is chosen. `None` for the null option.
    pub identity: Option<i64>,
}

/// State of an input widget while a cell is being edited.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorSurface {
    LineEdit {
        text: String,
        max_length: Option<usize>,
    },
    PlainText {
        text: String,
    },
    SpinBox {
        value: i64,
        min: i64,
        max: i64,
    },
    Calendar {
        selected: NaiveDate,
    },
    DecimalSpinBox {
        text: String,
        scale: u32,
        max: Decimal,
    },
    Choice {
        options: Vec<ChoiceOption>,
        current: usize,
    },
}

impl EditorSurface {
    /// The editor kind this surface belongs to.
    pub fn kind(&self) -> Editor {
        match self {
            EditorSurface::LineEdit { .. } => Editor::LineEdit,
            EditorSurface::PlainText { .. } => Editor::PlainText,
            EditorSurface::SpinBox { .. } => Editor::SpinBox,
            EditorSurface::Calendar { .. } => Editor::Calendar,
            EditorSurface::DecimalSpinBox { .. } => Editor::DecimalSpinBox,
            EditorSurface::Choice { .. } => Editor::Choice,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            EditorSurface::LineEdit { .. } => "line-edit",
            EditorSurface::PlainText { .. } => "plain-text",
            EditorSurface::SpinBox { .. } => "spin-box",
            EditorSurface::Calendar { .. } => "calendar",
            EditorSurface::DecimalSpinBox { .. } => "decimal-spin-box",
            EditorSurface::Choice { .. } => "choice",
        }
    }

    /// Replace the text of a text-like surface. Line edits keep at most
    /// `max_length` characters. Returns `false` for other surfaces.
    pub fn set_text(&mut self, input: &str) -> bool {
        match self {
            EditorSurface::LineEdit { text, max_length } => {
                *text = truncate(input, *max_length);
                true
            }
            EditorSurface::PlainText { text } | EditorSurface::DecimalSpinBox { text, .. } => {
                *text = input.to_string();
                true
            }
            _ => false,
        }
    }

    /// Set a spin box, clamped into its range.
    pub fn set_number(&mut self, input: i64) -> bool {
        match self {
            EditorSurface::SpinBox { value, min, max } => {
                *value = input.clamp(*min, *max);
                true
            }
            _ => false,
        }
    }

    pub fn select_date(&mut self, date: NaiveDate) -> bool {
        match self {
            EditorSurface::Calendar { selected } => {
                *selected = date;
                true
            }
            _ => false,
        }
    }

    /// Choose an option by position.
    pub fn select_option(&mut self, index: usize) -> bool {
        match self {
            EditorSurface::Choice { options, current } if index < options.len() => {
                *current = index;
                true
            }
            _ => false,
        }
    }

    /// Choose the option carrying `identity`; unknown identities choose the null option.
    pub fn select_identity(&mut self, identity: Option<i64>) -> bool {
        match self {
            EditorSurface::Choice { options, current } => {
                *current = options
                    .iter()
                    .position(|o| o.identity == identity)
                    .unwrap_or(0);
                true
            }
            _ => false,
        }
    }
}

fn truncate(input: &str, max_length: Option<usize>) -> String {
    match max_length {
        Some(max) => input.chars().take(max).collect(),
        None => input.to_string(),
    }
}

fn wrong_surface(expected: &'static str, found: &EditorSurface) -> EditorError {
    EditorError::WrongSurface {
        expected,
        found: found.name(),
    }
}

/// Editing behavior for one field.
pub trait CellEditor {
    /// A fresh input surface. Choice editors read their options from `lookup` here.
    fn create_editor(&self, lookup: &dyn LabelLookup) -> Result<EditorSurface>;

    /// Initialize `editor` from a cell's raw value.
    fn load_into(&self, editor: &mut EditorSurface, raw: &Value) -> std::result::Result<(), EditorError>;

    /// The value to store, coerced to the field's type.
    fn extract_from(&self, editor: &EditorSurface) -> std::result::Result<Value, EditorError>;
}

/// Single-line text with an optional length cap.
#[derive(Debug, Clone)]
pub struct TextEditor {
    pub max_length: Option<usize>,
}

impl CellEditor for TextEditor {
    fn create_editor(&self, _lookup: &dyn LabelLookup) -> Result<EditorSurface> {
        Ok(EditorSurface::LineEdit {
            text: String::new(),
            max_length: self.max_length,
        })
    }

    fn load_into(&self, editor: &mut EditorSurface, raw: &Value) -> std::result::Result<(), EditorError> {
        let text = raw.as_text().unwrap_or_default();
        if editor.set_text(text) {
            Ok(())
        } else {
            Err(wrong_surface("line-edit", editor))
        }
    }

    fn extract_from(&self, editor: &EditorSurface) -> std::result::Result<Value, EditorError> {
        match editor {
            EditorSurface::LineEdit { text, .. } => Ok(Value::Text(truncate(text, self.max_length))),
            other => Err(wrong_surface("line-edit", other)),
        }
    }
}

/// Multi-line text.
#[derive(Debug, Clone, Default)]
pub struct LongTextEditor;

impl CellEditor for LongTextEditor {
    fn create_editor(&self, _lookup: &dyn LabelLookup) -> Result<EditorSurface> {
        Ok(EditorSurface::PlainText {
            text: String::new(),
        })
    }

    fn load_into(&self, editor: &mut EditorSurface, raw: &Value) -> std::result::Result<(), EditorError> {
        match editor {
            EditorSurface::PlainText { text } => {
                *text = raw.as_text().unwrap_or_default().to_string();
                Ok(())
            }
            other => Err(wrong_surface("plain-text", other)),
        }
    }

    fn extract_from(&self, editor: &EditorSurface) -> std::result::Result<Value, EditorError> {
        match editor {
            EditorSurface::PlainText { text } => Ok(Value::Text(text.clone())),
            other => Err(wrong_surface("plain-text", other)),
        }
    }
}

/// Whole number within `min..=max`.
#[derive(Debug, Clone)]
pub struct IntegerEditor {
    pub min: i64,
    pub max: i64,
}

impl CellEditor for IntegerEditor {
    fn create_editor(&self, _lookup: &dyn LabelLookup) -> Result<EditorSurface> {
        Ok(EditorSurface::SpinBox {
            value: self.min,
            min: self.min,
            max: self.max,
        })
    }

    fn load_into(&self, editor: &mut EditorSurface, raw: &Value) -> std::result::Result<(), EditorError> {
        let value = raw.as_integer().unwrap_or(self.min);
        if editor.set_number(value) {
            Ok(())
        } else {
            Err(wrong_surface("spin-box", editor))
        }
    }

    fn extract_from(&self, editor: &EditorSurface) -> std::result::Result<Value, EditorError> {
        match editor {
            EditorSurface::SpinBox { value, .. } if (self.min..=self.max).contains(value) => {
                Ok(Value::Integer(*value))
            }
            EditorSurface::SpinBox { value, .. } => {
                Err(EditorError::out_of_range(value, self.min, self.max))
            }
            other => Err(wrong_surface("spin-box", other)),
        }
    }
}

/// Calendar date picker.
#[derive(Debug, Clone, Default)]
pub struct DateEditor;

impl CellEditor for DateEditor {
    fn create_editor(&self, _lookup: &dyn LabelLookup) -> Result<EditorSurface> {
        Ok(EditorSurface::Calendar {
            selected: chrono::Local::now().date_naive(),
        })
    }

    fn load_into(&self, editor: &mut EditorSurface, raw: &Value) -> std::result::Result<(), EditorError> {
        match (editor, raw.as_date()) {
            (EditorSurface::Calendar { selected }, Some(date)) => {
                *selected = date;
                Ok(())
            }
            // A non-date raw value leaves today's date selected
            (EditorSurface::Calendar { .. }, None) => Ok(()),
            (other, _) => Err(wrong_surface("calendar", other)),
        }
    }

    fn extract_from(&self, editor: &EditorSurface) -> std::result::Result<Value, EditorError> {
        match editor {
            EditorSurface::Calendar { selected } => Ok(Value::Date(*selected)),
            other => Err(wrong_surface("calendar", other)),
        }
    }
}

/// Decimal currency typed as text. Accepts `.` or `,` as the separator.
#[derive(Debug, Clone)]
pub struct DecimalEditor {
    pub scale: u32,
    pub max: Decimal,
}

impl DecimalEditor {
    /// Parse user text into an exact decimal with `scale` fraction digits.
    pub fn parse(&self, input: &str) -> std::result::Result<Decimal, EditorError> {
        let normalized = input.trim().replace(',', ".");
        // Decimal::from_str also takes '_' digit separators
        if !normalized
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        {
            return Err(EditorError::unparsable(
                input,
                "expected digits with one '.' or ',' separator",
            ));
        }
        let parsed =
            Decimal::from_str(&normalized).map_err(|e| EditorError::unparsable(input, e))?;
        let mut value = parsed.round_dp(self.scale);
        value.rescale(self.scale);
        if value < Decimal::ZERO || value > self.max {
            return Err(EditorError::out_of_range(value, Decimal::ZERO, self.max));
        }
        Ok(value)
    }
}

impl CellEditor for DecimalEditor {
    fn create_editor(&self, _lookup: &dyn LabelLookup) -> Result<EditorSurface> {
        let mut zero = Decimal::ZERO;
        zero.rescale(self.scale);
        Ok(EditorSurface::DecimalSpinBox {
            text: zero.to_string(),
            scale: self.scale,
            max: self.max,
        })
    }

    fn load_into(&self, editor: &mut EditorSurface, raw: &Value) -> std::result::Result<(), EditorError> {
        let mut value = raw.as_decimal().unwrap_or_default().round_dp(self.scale);
        value.rescale(self.scale);
        match editor {
            EditorSurface::DecimalSpinBox { text, .. } => {
                *text = value.to_string();
                Ok(())
            }
            other => Err(wrong_surface("decimal-spin-box", other)),
        }
    }

    fn extract_from(&self, editor: &EditorSurface) -> std::result::Result<Value, EditorError> {
        match editor {
            EditorSurface::DecimalSpinBox { text, .. } => self.parse(text).map(Value::Decimal),
            other => Err(wrong_surface("decimal-spin-box", other)),
        }
    }
}

/// Choice among the labels of another kind's rows, plus a leading null option.
#[derive(Debug, Clone)]
pub struct ReferenceEditor {
    pub entity: String,
    pub label: String,
}

impl CellEditor for ReferenceEditor {
    fn create_editor(&self, lookup: &dyn LabelLookup) -> Result<EditorSurface> {
        let mut options = vec![ChoiceOption {
            label: NULL_DISPLAY.to_string(),
            identity: None,
        }];
        options.extend(
            lookup
                .lookup(&self.entity, &self.label, LookupFilter::All)?
                .into_iter()
                .map(|(id, label)| ChoiceOption {
                    label: label.to_string(),
                    identity: Some(id),
                }),
        );
        debug!(entity = %self.entity, options = options.len(), "choice editor created");
        Ok(EditorSurface::Choice {
            options,
            current: 0,
        })
    }

    fn load_into(&self, editor: &mut EditorSurface, raw: &Value) -> std::result::Result<(), EditorError> {
        if editor.select_identity(raw.as_integer()) {
            Ok(())
        } else {
            Err(wrong_surface("choice", editor))
        }
    }

    fn extract_from(&self, editor: &EditorSurface) -> std::result::Result<Value, EditorError> {
        match editor {
            EditorSurface::Choice { options, current } => options
                .get(*current)
                .map(|o| Value::from(o.identity))
                .ok_or(EditorError::NoSelection),
            other => Err(wrong_surface("choice", other)),
        }
    }
}

/// Default editor for a field, inferred from its type and editor hint.
pub fn editor_for_field(field: &FieldDef) -> Option<Box<dyn CellEditor>> {
    let editor: Box<dyn CellEditor> = match (field.effective_editor(), &field.type_) {
        (Editor::None, _) | (_, FieldType::Identity) => return None,
        (Editor::LineEdit, FieldType::Text { max_length }) => Box::new(TextEditor {
            max_length: *max_length,
        }),
        (Editor::LineEdit, FieldType::LongText) => Box::new(TextEditor { max_length: None }),
        (Editor::PlainText, FieldType::Text { .. } | FieldType::LongText) => Box::new(LongTextEditor),
        (Editor::SpinBox, FieldType::Integer { min, max }) => Box::new(IntegerEditor {
            min: *min,
            max: *max,
        }),
        (Editor::Calendar, FieldType::Date) => Box::new(DateEditor),
        (Editor::DecimalSpinBox, FieldType::Decimal { scale, max }) => Box::new(DecimalEditor {
            scale: *scale,
            max: *max,
        }),
        (Editor::Choice, FieldType::Reference { entity, label }) => Box::new(ReferenceEditor {
            entity: entity.clone(),
            label: label.clone(),
        }),
        (editor, type_) => {
            warn!(field = %field.name, ?editor, kind = type_.name(), "editor does not fit field type");
            return None;
        }
    };
    Some(editor)
}

/// Editors keyed by `(entity, field)`.
#[derive(Default)]
pub struct EditorRegistry {
    editors: HashMap<(String, String), Box<dyn CellEditor>>,
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the inferred editor of every editable field of `def`.
    pub fn from_entity(def: &EntityDef) -> Self {
        let mut registry = Self::new();
        registry.add_entity(def);
        registry
    }

    /// Register inferred editors for every editable field of `def`.
    /// Fields that already have an editor keep it.
    pub fn add_entity(&mut self, def: &EntityDef) -> &mut Self {
        for field in &def.fields {
            let key = (def.name.clone(), field.name.clone());
            if self.editors.contains_key(&key) {
                continue;
            }
            if let Some(editor) = editor_for_field(field) {
                self.editors.insert(key, editor);
            }
        }
        self
    }

    /// Register or replace the editor of one field.
    pub fn register(
        &mut self,
        entity: impl Into<String>,
        field: impl Into<String>,
        editor: impl CellEditor + 'static,
    ) -> &mut Self {
        self.editors
            .insert((entity.into(), field.into()), Box::new(editor));
        self
    }

    pub fn get(&self, entity: &str, field: &str) -> Option<&dyn CellEditor> {
        self.editors
            .get(&(entity.to_string(), field.to_string()))
            .map(|e| &**e)
    }

    fn editor_for<E: Entity>(&self, column: usize) -> Option<&dyn CellEditor> {
        let def = E::entity_def();
        let field = def.field_at(column)?;
        if field.is_identity() {
            return None;
        }
        self.get(&def.name, &field.name)
    }

    /// Create and load the editor for a grid cell.
    ///
    /// `Ok(None)` when the column has no editor, which always holds for the identity.
    pub fn begin_edit<E: Entity, S: Session>(
        &self,
        grid: &RecordGrid<E, S>,
        row: usize,
        column: usize,
    ) -> Result<Option<EditorSurface>> {
        let raw = grid.raw_value(row, column)?;
        let Some(editor) = self.editor_for::<E>(column) else {
            return Ok(None);
        };
        let mut surface = editor.create_editor(grid.lookup())?;
        if let Err(e) = editor.load_into(&mut surface, &raw) {
            warn!(row, column, error = %e, "editor could not load cell value");
        }
        Ok(Some(surface))
    }

    /// Write an editor's value into a grid cell.
    ///
    /// Returns `Ok(false)` and leaves the cell unchanged when the editor rejects
    /// its input or the column has no editor.
    pub fn finish_edit<E: Entity, S: Session>(
        &self,
        grid: &mut RecordGrid<E, S>,
        row: usize,
        column: usize,
        surface: &EditorSurface,
    ) -> Result<bool> {
        let Some(editor) = self.editor_for::<E>(column) else {
            return Ok(false);
        };
        match editor.extract_from(surface) {
            Ok(value) => {
                grid.set_value(row, column, value)?;
                Ok(true)
            }
            Err(e) => {
                debug!(row, column, error = %e, "edit rejected");
                Ok(false)
            }
        }
    }
}

impl std::fmt::Debug for EditorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self
            .editors
            .keys()
            .map(|(entity, field)| format!("{entity}.{field}"))
            .collect();
        keys.sort();
        f.debug_struct("EditorRegistry").field("editors", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixture, Player, Team};

    fn budget_editor() -> DecimalEditor {
        DecimalEditor {
            scale: 2,
            max: Decimal::new(1_000_000, 0),
        }
    }

    fn registry() -> EditorRegistry {
        let mut registry = EditorRegistry::from_entity(Team::entity_def());
        registry.add_entity(Player::entity_def());
        registry
    }

    #[test]
    fn comma_and_dot_parse_to_exact_decimal() {
        let editor = budget_editor();
        assert_eq!(editor.parse("100,10").unwrap(), Decimal::new(10010, 2));
        assert_eq!(editor.parse("100.10").unwrap(), Decimal::new(10010, 2));
        assert_eq!(editor.parse(" 7 ").unwrap().to_string(), "7.00");
        assert_eq!(editor.parse("0,005").unwrap().to_string(), "0.00");
    }

    #[test]
    fn bad_decimal_input_is_rejected() {
        let editor = budget_editor();
        assert!(matches!(
            editor.parse("ten"),
            Err(EditorError::Unparsable { .. })
        ));
        assert!(matches!(
            editor.parse("1000000,01"),
            Err(EditorError::OutOfRange { .. })
        ));
        assert!(editor.parse("-1").is_err());
        for input in ["1_000", "1_000,50", "_5"] {
            assert!(
                matches!(editor.parse(input), Err(EditorError::Unparsable { .. })),
                "{input} should not parse"
            );
        }
    }

    #[test]
    fn decimal_surface_round_trips_through_text() {
        let editor = budget_editor();
        let fx = fixture();
        let grid = fx.teams();
        let mut surface = editor.create_editor(grid.lookup()).unwrap();
        assert_eq!(
            surface,
            EditorSurface::DecimalSpinBox {
                text: "0.00".into(),
                scale: 2,
                max: Decimal::new(1_000_000, 0)
            }
        );
        editor
            .load_into(&mut surface, &Value::from(Decimal::new(1001, 1)))
            .unwrap();
        assert!(matches!(&surface, EditorSurface::DecimalSpinBox { text, .. } if text == "100.10"));
        surface.set_text("100,10");
        assert_eq!(
            editor.extract_from(&surface).unwrap(),
            Value::Decimal(Decimal::new(10010, 2))
        );
    }

    #[test]
    fn line_edit_caps_length() {
        let editor = TextEditor {
            max_length: Some(3),
        };
        let mut surface = EditorSurface::LineEdit {
            text: String::new(),
            max_length: Some(3),
        };
        editor
            .load_into(&mut surface, &Value::from("Дайняк"))
            .unwrap();
        assert_eq!(editor.extract_from(&surface).unwrap(), Value::from("Дай"));
    }

    #[test]
    fn spin_box_clamps_on_load_and_checks_on_extract() {
        let editor = IntegerEditor { min: 0, max: 99 };
        let mut surface = EditorSurface::SpinBox {
            value: 0,
            min: 0,
            max: 99,
        };
        editor.load_into(&mut surface, &Value::from(150)).unwrap();
        assert_eq!(editor.extract_from(&surface).unwrap(), Value::from(99));

        let forged = EditorSurface::SpinBox {
            value: 150,
            min: 0,
            max: 200,
        };
        assert!(matches!(
            editor.extract_from(&forged),
            Err(EditorError::OutOfRange { .. })
        ));
    }

    #[test]
    fn calendar_yields_date() {
        let editor = DateEditor;
        let date = NaiveDate::from_ymd_opt(2007, 8, 8).unwrap();
        let mut surface = EditorSurface::Calendar {
            selected: NaiveDate::from_ymd_opt(2002, 12, 27).unwrap(),
        };
        editor.load_into(&mut surface, &Value::from(date)).unwrap();
        assert_eq!(editor.extract_from(&surface).unwrap(), Value::Date(date));
    }

    #[test]
    fn wrong_surface_is_reported() {
        let editor = DateEditor;
        let mut surface = EditorSurface::PlainText {
            text: String::new(),
        };
        assert_eq!(
            editor.load_into(&mut surface, &Value::Null),
            Err(EditorError::WrongSurface {
                expected: "calendar",
                found: "plain-text"
            })
        );
    }

    #[test]
    fn choice_offers_null_first_and_maps_back_to_identity() {
        let fx = fixture();
        let grid = fx.players();
        let editor = ReferenceEditor {
            entity: "teams".into(),
            label: "name".into(),
        };
        let mut surface = editor.create_editor(grid.lookup()).unwrap();
        let EditorSurface::Choice { options, .. } = &surface else {
            panic!("expected choice surface");
        };
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["None", "Owls", "Bees"]);
        assert_eq!(options[0].identity, None);
        let bees = options[2].identity;

        // Null raw value pre-selects the null option
        editor.load_into(&mut surface, &Value::Null).unwrap();
        assert_eq!(editor.extract_from(&surface).unwrap(), Value::Null);

        assert!(surface.select_option(2));
        assert_eq!(editor.extract_from(&surface).unwrap(), Value::from(bees));
        assert!(!surface.select_option(3));

        // Unknown identity falls back to the null option
        editor.load_into(&mut surface, &Value::from(4242)).unwrap();
        assert_eq!(editor.extract_from(&surface).unwrap(), Value::Null);
    }

    #[test]
    fn registry_infers_editors_and_skips_identity() {
        let registry = registry();
        assert!(registry.get("teams", "id").is_none());
        assert!(registry.get("players", "id").is_none());
        assert!(registry.get("teams", "budget").is_some());
        assert!(registry.get("players", "team_id").is_some());
        assert!(registry.get("players", "nope").is_none());
    }

    #[test]
    fn register_overrides_inferred_editor() {
        let mut registry = registry();
        registry.register("players", "name", TextEditor { max_length: Some(2) });
        let fx = fixture();
        let grid = fx.players();
        let surface = registry.begin_edit(&grid, 0, 1).unwrap().unwrap();
        assert_eq!(
            surface,
            EditorSurface::LineEdit {
                text: "An".into(),
                max_length: Some(2)
            }
        );
    }

    #[test]
    fn begin_edit_loads_current_value() {
        let registry = registry();
        let fx = fixture();
        let grid = fx.players();
        assert_eq!(registry.begin_edit(&grid, 0, 0).unwrap(), None);

        let surface = registry.begin_edit(&grid, 0, 3).unwrap().unwrap();
        assert_eq!(
            surface,
            EditorSurface::SpinBox {
                value: 7,
                min: 0,
                max: 10
            }
        );

        let surface = registry.begin_edit(&grid, 1, 2).unwrap().unwrap();
        assert!(matches!(surface, EditorSurface::Choice { current: 0, .. }));
    }

    #[test_log::test]
    fn finish_edit_applies_or_keeps_prior_value() {
        let registry = registry();
        let fx = fixture();
        let mut grid = fx.teams();

        let mut surface = registry.begin_edit(&grid, 0, 3).unwrap().unwrap();
        surface.set_text("12,5");
        assert!(registry.finish_edit(&mut grid, 0, 3, &surface).unwrap());
        assert_eq!(grid.display_value(0, 3).unwrap(), "12.50");

        surface.set_text("twelve");
        assert!(!registry.finish_edit(&mut grid, 0, 3, &surface).unwrap());
        assert_eq!(grid.display_value(0, 3).unwrap(), "12.50");
    }
}
