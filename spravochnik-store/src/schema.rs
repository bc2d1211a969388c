//! Table layout and value codec derived from entity definitions.

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rust_decimal::Decimal;

use spravochnik_fields::{EntityDef, FieldDef, FieldType, FieldsError, Value};

use crate::error::{Result, StoreError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The set of entity kinds a store knows how to persist.
#[derive(Debug, Default, Clone)]
pub struct Schema {
    entities: Vec<&'static EntityDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a kind. Registering the same name twice keeps the first.
    pub fn register(&mut self, def: &'static EntityDef) {
        if self.get(&def.name).is_none() {
            self.entities.push(def);
        }
    }

    pub fn get(&self, name: &str) -> Option<&'static EntityDef> {
        self.entities.iter().copied().find(|e| e.name == name)
    }

    pub fn require(&self, name: &str) -> Result<&'static EntityDef> {
        self.get(name).ok_or_else(|| StoreError::unknown_entity(name))
    }

    /// Registered kinds, in registration order.
    pub fn entities(&self) -> &[&'static EntityDef] {
        &self.entities
    }

    /// Every reference points at a registered kind and labels it with one of
    /// that kind's text fields.
    pub fn validate_references(&self) -> Result<()> {
        for def in &self.entities {
            for field in &def.fields {
                let FieldType::Reference { entity, label } = &field.type_ else {
                    continue;
                };
                let target = self.require(entity)?;
                let label_field = target
                    .column_of(label)
                    .and_then(|c| target.field_at(c))
                    .ok_or_else(|| StoreError::UnknownField {
                        entity: entity.clone(),
                        field: label.clone(),
                    })?;
                if !matches!(
                    label_field.type_,
                    FieldType::Text { .. } | FieldType::LongText
                ) {
                    return Err(FieldsError::invalid_entity(
                        &def.name,
                        format!(
                            "reference '{}' is labelled by {entity}.{label}, which is not text",
                            field.name
                        ),
                    )
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// Quote an identifier for use in SQL text.
pub(crate) fn quote(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn column_ddl(field: &FieldDef) -> String {
    let name = quote(&field.name);
    match &field.type_ {
        FieldType::Identity => format!("{name} INTEGER PRIMARY KEY"),
        FieldType::Text { .. } | FieldType::LongText => format!("{name} TEXT NOT NULL"),
        FieldType::Integer { .. } => format!("{name} INTEGER NOT NULL"),
        FieldType::Date | FieldType::Decimal { .. } => format!("{name} TEXT NOT NULL"),
        FieldType::Reference { entity, .. } => format!(
            "{name} INTEGER REFERENCES {} DEFERRABLE INITIALLY DEFERRED",
            quote(entity)
        ),
    }
}

/// `CREATE TABLE IF NOT EXISTS` statement for one kind.
pub fn create_table_sql(def: &EntityDef) -> String {
    let columns = def
        .fields
        .iter()
        .map(column_ddl)
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {} ({columns})", quote(&def.name))
}

/// Comma-separated quoted column list, in schema order.
pub(crate) fn column_list<'a>(fields: impl IntoIterator<Item = &'a FieldDef>) -> String {
    fields
        .into_iter()
        .map(|f| quote(&f.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert a cell value to its stored form.
///
/// Decimals are kept as text so their exact digits and scale survive.
pub(crate) fn encode(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Date(d) => SqlValue::Text(d.format(DATE_FORMAT).to_string()),
        Value::Decimal(d) => SqlValue::Text(d.to_string()),
    }
}

/// Read a stored column back as its field's semantic type.
pub(crate) fn decode(entity: &str, field: &FieldDef, raw: ValueRef<'_>) -> Result<Value> {
    let fail = |message: String| StoreError::decode(entity, &field.name, message);
    let text = |bytes: &[u8]| {
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| fail(e.to_string()))
    };

    match (&field.type_, raw) {
        (FieldType::Identity | FieldType::Reference { .. }, ValueRef::Null) => Ok(Value::Null),
        (
            FieldType::Identity | FieldType::Reference { .. } | FieldType::Integer { .. },
            ValueRef::Integer(i),
        ) => Ok(Value::Integer(i)),
        (FieldType::Text { .. } | FieldType::LongText, ValueRef::Text(bytes)) => {
            Ok(Value::Text(text(bytes)?))
        }
        (FieldType::Date, ValueRef::Text(bytes)) => {
            let s = text(bytes)?;
            NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map(Value::Date)
                .map_err(|e| fail(format!("{s:?}: {e}")))
        }
        (FieldType::Decimal { .. }, ValueRef::Text(bytes)) => {
            let s = text(bytes)?;
            Decimal::from_str(&s)
                .map(Value::Decimal)
                .map_err(|e| fail(format!("{s:?}: {e}")))
        }
        // Rows written by other tools may hold numeric affinity values.
        (FieldType::Decimal { scale, .. }, ValueRef::Integer(i)) => {
            let mut d = Decimal::from(i);
            d.rescale(*scale);
            Ok(Value::Decimal(d))
        }
        (FieldType::Decimal { scale, .. }, ValueRef::Real(f)) => Decimal::try_from(f)
            .map(|d| Value::Decimal(d.round_dp(*scale)))
            .map_err(|e| fail(e.to_string())),
        (_, other) => Err(fail(format!(
            "unexpected {:?} for {} field",
            other.data_type(),
            field.type_.name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::LazyLock;

    static PROFESSORS: LazyLock<EntityDef> = LazyLock::new(|| {
        EntityDef::new("professors")
            .field(FieldDef::new("fio", FieldType::Text { max_length: Some(60) }))
            .field(FieldDef::new("birth_date", FieldType::Date))
            .field(FieldDef::new(
                "department_id",
                FieldType::Reference {
                    entity: "departments".into(),
                    label: "name".into(),
                },
            ))
    });

    #[test]
    fn create_table_declares_deferred_reference() {
        let sql = create_table_sql(&PROFESSORS);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"professors\""));
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY"));
        assert!(sql.contains("\"fio\" TEXT NOT NULL"));
        assert!(sql.contains(
            "\"department_id\" INTEGER REFERENCES \"departments\" DEFERRABLE INITIALLY DEFERRED"
        ));
    }

    #[test]
    fn quote_escapes_embedded_quotes() {
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn schema_keeps_first_registration() {
        let mut schema = Schema::new();
        schema.register(&PROFESSORS);
        schema.register(&PROFESSORS);
        assert_eq!(schema.entities().len(), 1);
        assert!(schema.require("professors").is_ok());
        assert!(matches!(
            schema.require("students"),
            Err(StoreError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn references_need_a_registered_text_label() {
        static DEPARTMENTS: LazyLock<EntityDef> = LazyLock::new(|| {
            EntityDef::new("departments")
                .field(FieldDef::new("name", FieldType::Text { max_length: None }))
        });
        static BUDGETS: LazyLock<EntityDef> = LazyLock::new(|| {
            EntityDef::new("departments")
                .field(FieldDef::new("name", FieldType::Integer { min: 0, max: 9 }))
        });
        static BY_CODE: LazyLock<EntityDef> = LazyLock::new(|| {
            EntityDef::new("professors").field(FieldDef::new(
                "department_id",
                FieldType::Reference {
                    entity: "departments".into(),
                    label: "code".into(),
                },
            ))
        });

        let mut schema = Schema::new();
        schema.register(&PROFESSORS);
        assert!(matches!(
            schema.validate_references(),
            Err(StoreError::UnknownEntity { .. })
        ));
        schema.register(&DEPARTMENTS);
        schema.validate_references().unwrap();

        let mut schema = Schema::new();
        schema.register(&BY_CODE);
        schema.register(&DEPARTMENTS);
        assert!(matches!(
            schema.validate_references(),
            Err(StoreError::UnknownField { .. })
        ));

        let mut schema = Schema::new();
        schema.register(&PROFESSORS);
        schema.register(&BUDGETS);
        let err = schema.validate_references().unwrap_err();
        assert!(err.to_string().contains("not text"));
    }

    #[test]
    fn decimal_keeps_scale_through_text() {
        let field = FieldDef::new(
            "budget",
            FieldType::Decimal {
                scale: 2,
                max: Decimal::new(1_000_000, 0),
            },
        );
        let stored = encode(&Value::Decimal(Decimal::new(10010, 2)));
        assert_eq!(stored, SqlValue::Text("100.10".into()));
        let back = decode("departments", &field, ValueRef::Text(b"100.10")).unwrap();
        assert_eq!(back.to_string(), "100.10");

        let from_int = decode("departments", &field, ValueRef::Integer(5)).unwrap();
        assert_eq!(from_int.to_string(), "5.00");
    }

    #[test]
    fn decode_rejects_wrong_storage_class() {
        let field = FieldDef::new("birth_date", FieldType::Date);
        let err = decode("professors", &field, ValueRef::Integer(3)).unwrap_err();
        assert!(err.to_string().contains("professors.birth_date"));

        let err = decode("professors", &field, ValueRef::Text(b"27.12.2002")).unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
