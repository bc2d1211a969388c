//! The table picker: every table the application can open, by name.

use std::fmt;
use std::str::FromStr;

use spravochnik_fields::{Entity, EntityDef};

use crate::error::SpravochnikError;
use crate::kinds::{Department, Professor, DEPARTMENTS, PROFESSORS};

/// Title shown above the table picker.
pub const APP_TITLE: &str = "Справочник";

/// A table offered by the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Departments,
    Professors,
}

impl Table {
    /// All tables in picker order.
    pub const ALL: [Table; 2] = [Table::Departments, Table::Professors];

    pub fn name(self) -> &'static str {
        match self {
            Table::Departments => DEPARTMENTS,
            Table::Professors => PROFESSORS,
        }
    }

    pub fn entity_def(self) -> &'static EntityDef {
        match self {
            Table::Departments => Department::entity_def(),
            Table::Professors => Professor::entity_def(),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = SpravochnikError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| SpravochnikError::UnknownTable(s.to_string()))
    }
}

/// Tables in picker order.
pub fn catalog() -> &'static [Table] {
    &Table::ALL
}
