//! Core field and entity types for record descriptors.
//!
//! Field definitions describe named, typed attributes. Entity definitions are
//! ordered field lists; column `i` of a grid is field `i` of its entity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FieldsError, Result};

/// The semantic type of a field. Determines what shape the value takes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldType {
    /// Row identity assigned by the store. Always column 0, never edited.
    Identity,
    /// Single-line text.
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    /// Multi-line text.
    LongText,
    /// Whole number within an inclusive range.
    Integer { min: i64, max: i64 },
    /// Calendar date.
    Date,
    /// Exact decimal with a fixed number of fraction digits.
    Decimal { scale: u32, max: Decimal },
    /// Nullable identity of a row of another entity, displayed through `label`.
    Reference { entity: String, label: String },
}

impl FieldType {
    /// Short type name used in error messages and DDL comments.
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Identity => "identity",
            FieldType::Text { .. } => "text",
            FieldType::LongText => "long-text",
            FieldType::Integer { .. } => "integer",
            FieldType::Date => "date",
            FieldType::Decimal { .. } => "decimal",
            FieldType::Reference { .. } => "reference",
        }
    }
}

/// How a field value is edited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Editor {
    LineEdit,
    PlainText,
    SpinBox,
    Calendar,
    DecimalSpinBox,
    Choice,
    None,
}

/// How a field sorts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortKind {
    /// Compare the raw values.
    Natural,
    /// Compare the resolved display labels.
    Label,
}

/// A field definition: the complete schema for a single named attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<Editor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortKind>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, type_: FieldType) -> Self {
        Self {
            name: name.into(),
            type_,
            editor: None,
            sort: None,
        }
    }

    /// The conventional `id` identity field.
    pub fn identity() -> Self {
        Self::new("id", FieldType::Identity)
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.type_, FieldType::Identity)
    }

    /// Infer editor from field type if not explicitly set.
    pub fn effective_editor(&self) -> Editor {
        if let Some(e) = self.editor {
            return e;
        }
        match &self.type_ {
            FieldType::Identity => Editor::None,
            FieldType::Text { .. } => Editor::LineEdit,
            FieldType::LongText => Editor::PlainText,
            FieldType::Integer { .. } => Editor::SpinBox,
            FieldType::Date => Editor::Calendar,
            FieldType::Decimal { .. } => Editor::DecimalSpinBox,
            FieldType::Reference { .. } => Editor::Choice,
        }
    }

    /// Infer sort behavior from field type if not explicitly set.
    pub fn effective_sort(&self) -> SortKind {
        if let Some(s) = self.sort {
            return s;
        }
        match &self.type_ {
            FieldType::Reference { .. } => SortKind::Label,
            _ => SortKind::Natural,
        }
    }
}

/// An entity definition: the ordered schema of one record kind.
///
/// `name` doubles as the table name in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityDef {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: vec![FieldDef::identity()],
        }
    }

    /// Append a field after the ones already declared.
    pub fn field(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    /// Field at a column, in declaration order.
    pub fn field_at(&self, column: usize) -> Option<&FieldDef> {
        self.fields.get(column)
    }

    /// Column index of a field by name.
    pub fn column_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    /// Check the structural rules every kind must satisfy.
    ///
    /// Column 0 is the only identity field and names are unique. Reference
    /// targets live in other kinds and are checked by whoever registers them.
    pub fn validate(&self) -> Result<()> {
        match self.fields.first() {
            Some(f) if f.is_identity() => {}
            _ => {
                return Err(FieldsError::invalid_entity(
                    &self.name,
                    "column 0 must be the identity field",
                ))
            }
        }
        if self.fields.iter().skip(1).any(FieldDef::is_identity) {
            return Err(FieldsError::invalid_entity(
                &self.name,
                "only column 0 may be an identity field",
            ));
        }
        for (i, f) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|prev| prev.name == f.name) {
                return Err(FieldsError::invalid_entity(
                    &self.name,
                    format!("duplicate field name: {}", f.name),
                ));
            }
        }
        Ok(())
    }
}
