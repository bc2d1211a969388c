//! The two reference tables: departments and the professors assigned to them.

use std::sync::LazyLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use spravochnik_fields::{Entity, EntityDef, FieldAccessor, FieldDef, FieldType, Value};

/// Table name of [`Department`].
pub const DEPARTMENTS: &str = "departments";
/// Table name of [`Professor`].
pub const PROFESSORS: &str = "professors";

/// Birth date a new professor starts with.
pub fn default_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2002, 12, 27).unwrap_or_default()
}

/// An academic department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub budget: Decimal,
}

impl Default for Department {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: String::new(),
            budget: Decimal::new(0, 2),
        }
    }
}

static DEPARTMENT_DEF: LazyLock<EntityDef> = LazyLock::new(|| {
    EntityDef::new(DEPARTMENTS)
        .field(FieldDef::new(
            "name",
            FieldType::Text {
                max_length: Some(100),
            },
        ))
        .field(FieldDef::new("description", FieldType::LongText))
        .field(FieldDef::new(
            "budget",
            FieldType::Decimal {
                scale: 2,
                max: Decimal::new(1_000_000, 0),
            },
        ))
});

static DEPARTMENT_ACCESSORS: [FieldAccessor<Department>; 4] = [
    FieldAccessor {
        get: |d| Value::from(d.id),
        set: |d, v| {
            d.id = v.into_optional_integer("id")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |d| Value::from(d.name.clone()),
        set: |d, v| {
            d.name = v.into_text("name")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |d| Value::from(d.description.clone()),
        set: |d, v| {
            d.description = v.into_text("description")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |d| Value::from(d.budget),
        set: |d, v| {
            d.budget = v.into_decimal("budget")?;
            Ok(())
        },
    },
];

impl Entity for Department {
    fn entity_def() -> &'static EntityDef {
        &DEPARTMENT_DEF
    }

    fn accessors() -> &'static [FieldAccessor<Self>] {
        &DEPARTMENT_ACCESSORS
    }
}

/// A professor, optionally assigned to a department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Professor {
    pub id: Option<i64>,
    /// Full name: surname, given name, patronymic.
    pub fio: String,
    pub birth_date: NaiveDate,
    pub social_rating: i64,
    pub department_id: Option<i64>,
}

impl Default for Professor {
    fn default() -> Self {
        Self {
            id: None,
            fio: String::new(),
            birth_date: default_birth_date(),
            social_rating: 0,
            department_id: None,
        }
    }
}

static PROFESSOR_DEF: LazyLock<EntityDef> = LazyLock::new(|| {
    EntityDef::new(PROFESSORS)
        .field(FieldDef::new(
            "fio",
            FieldType::Text {
                max_length: Some(60),
            },
        ))
        .field(FieldDef::new("birth_date", FieldType::Date))
        .field(FieldDef::new(
            "social_rating",
            FieldType::Integer { min: 0, max: 99 },
        ))
        .field(FieldDef::new(
            "department_id",
            FieldType::Reference {
                entity: DEPARTMENTS.into(),
                label: "name".into(),
            },
        ))
});

static PROFESSOR_ACCESSORS: [FieldAccessor<Professor>; 5] = [
    FieldAccessor {
        get: |p| Value::from(p.id),
        set: |p, v| {
            p.id = v.into_optional_integer("id")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |p| Value::from(p.fio.clone()),
        set: |p, v| {
            p.fio = v.into_text("fio")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |p| Value::from(p.birth_date),
        set: |p, v| {
            p.birth_date = v.into_date("birth_date")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |p| Value::from(p.social_rating),
        set: |p, v| {
            p.social_rating = v.into_integer("social_rating")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |p| Value::from(p.department_id),
        set: |p, v| {
            p.department_id = v.into_optional_integer("department_id")?;
            Ok(())
        },
    },
];

impl Entity for Professor {
    fn entity_def() -> &'static EntityDef {
        &PROFESSOR_DEF
    }

    fn accessors() -> &'static [FieldAccessor<Self>] {
        &PROFESSOR_ACCESSORS
    }
}
