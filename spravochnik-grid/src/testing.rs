//! Two small related kinds and a seeded on-disk store for unit tests.

use std::sync::LazyLock;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use spravochnik_fields::{Entity, EntityDef, FieldAccessor, FieldDef, FieldType, Value};
use spravochnik_store::{Session, SqliteSession, Store, StoreConfig};

use crate::model::RecordGrid;

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: Option<i64>,
    pub name: String,
    pub founded: NaiveDate,
    pub budget: Decimal,
}

impl Default for Team {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            founded: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            budget: Decimal::ZERO,
        }
    }
}

static TEAM_DEF: LazyLock<EntityDef> = LazyLock::new(|| {
    EntityDef::new("teams")
        .field(FieldDef::new("name", FieldType::Text { max_length: Some(10) }))
        .field(FieldDef::new("founded", FieldType::Date))
        .field(FieldDef::new(
            "budget",
            FieldType::Decimal {
                scale: 2,
                max: Decimal::new(1000, 0),
            },
        ))
});

static TEAM_ACCESSORS: [FieldAccessor<Team>; 4] = [
    FieldAccessor {
        get: |t| Value::from(t.id),
        set: |t, v| {
            t.id = v.into_optional_integer("id")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |t| Value::from(t.name.clone()),
        set: |t, v| {
            t.name = v.into_text("name")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |t| Value::from(t.founded),
        set: |t, v| {
            t.founded = v.into_date("founded")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |t| Value::from(t.budget),
        set: |t, v| {
            t.budget = v.into_decimal("budget")?;
            Ok(())
        },
    },
];

impl Entity for Team {
    fn entity_def() -> &'static EntityDef {
        &TEAM_DEF
    }

    fn accessors() -> &'static [FieldAccessor<Self>] {
        &TEAM_ACCESSORS
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Player {
    pub id: Option<i64>,
    pub name: String,
    pub team_id: Option<i64>,
    pub rating: i64,
}

static PLAYER_DEF: LazyLock<EntityDef> = LazyLock::new(|| {
    EntityDef::new("players")
        .field(FieldDef::new("name", FieldType::LongText))
        .field(FieldDef::new(
            "team_id",
            FieldType::Reference {
                entity: "teams".into(),
                label: "name".into(),
            },
        ))
        .field(FieldDef::new("rating", FieldType::Integer { min: 0, max: 10 }))
});

static PLAYER_ACCESSORS: [FieldAccessor<Player>; 4] = [
    FieldAccessor {
        get: |p| Value::from(p.id),
        set: |p, v| {
            p.id = v.into_optional_integer("id")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |p| Value::from(p.name.clone()),
        set: |p, v| {
            p.name = v.into_text("name")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |p| Value::from(p.team_id),
        set: |p, v| {
            p.team_id = v.into_optional_integer("team_id")?;
            Ok(())
        },
    },
    FieldAccessor {
        get: |p| Value::from(p.rating),
        set: |p, v| {
            p.rating = v.into_integer("rating")?;
            Ok(())
        },
    },
];

impl Entity for Player {
    fn entity_def() -> &'static EntityDef {
        &PLAYER_DEF
    }

    fn accessors() -> &'static [FieldAccessor<Self>] {
        &PLAYER_ACCESSORS
    }
}

/// A store seeded with two teams (Owls, Bees) and two players
/// (Ann on the Owls, Bo without a team).
pub struct Fixture {
    pub store: Store,
    _dir: TempDir,
}

impl Fixture {
    pub fn teams(&self) -> RecordGrid<Team, SqliteSession> {
        RecordGrid::open(self.store.session().unwrap()).unwrap()
    }

    pub fn players(&self) -> RecordGrid<Player, SqliteSession> {
        RecordGrid::open(self.store.session().unwrap()).unwrap()
    }
}

pub fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let store = Store::open(StoreConfig::new(dir.path().join("grid.db")))
        .register::<Team>()
        .register::<Player>()
        .build()
        .unwrap();

    let mut session = store.session().unwrap();
    let mut owls = Team {
        name: "Owls".into(),
        founded: NaiveDate::from_ymd_opt(1990, 4, 1).unwrap(),
        budget: Decimal::new(25050, 2),
        ..Team::default()
    };
    let mut bees = Team {
        name: "Bees".into(),
        founded: NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
        budget: Decimal::new(7500, 2),
        ..Team::default()
    };
    session.stage_insert(&mut owls).unwrap();
    session.stage_insert(&mut bees).unwrap();
    let mut ann = Player {
        name: "Ann".into(),
        team_id: owls.id,
        rating: 7,
        ..Player::default()
    };
    let mut bo = Player {
        name: "Bo".into(),
        rating: 3,
        ..Player::default()
    };
    session.stage_insert(&mut ann).unwrap();
    session.stage_insert(&mut bo).unwrap();
    session.commit().unwrap();
    session.close().unwrap();

    Fixture { store, _dir: dir }
}
