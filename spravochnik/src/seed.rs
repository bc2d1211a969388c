//! Sample rows for a fresh database.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use spravochnik_store::{Session, Store};

use crate::error::Result;
use crate::kinds::{Department, Professor};

/// The department inserted into an empty `departments` table.
pub fn sample_department() -> Department {
    Department {
        id: None,
        name: "Кафедра компьютерных технологий и систем".to_string(),
        description: "Лучшая кафедра на свете (лене)".to_string(),
        budget: Decimal::new(10010, 2),
    }
}

/// The professor inserted into an empty `professors` table.
pub fn sample_professor(department_id: Option<i64>) -> Professor {
    Professor {
        id: None,
        fio: "Дайняк Виктор Владимирович".to_string(),
        birth_date: NaiveDate::from_ymd_opt(2007, 8, 8).unwrap_or_default(),
        social_rating: 99,
        department_id,
    }
}

/// Insert the sample rows into whichever tables are empty.
///
/// The sample professor belongs to the first department. Returns the number
/// of rows inserted; tables that already hold data are left alone.
pub fn seed_sample_rows(store: &Store) -> Result<usize> {
    let mut session = store.session()?;
    let mut inserted = 0;

    let mut departments = session.load_all::<Department>()?;
    if departments.is_empty() {
        let mut dept = sample_department();
        session.stage_insert(&mut dept)?;
        departments.push(dept);
        inserted += 1;
    }

    if session.load_all::<Professor>()?.is_empty() {
        let department_id = departments.first().and_then(|d| d.id);
        session.stage_insert(&mut sample_professor(department_id))?;
        inserted += 1;
    }

    if inserted == 0 {
        debug!("tables already populated, nothing to seed");
        session.close()?;
        return Ok(0);
    }

    session.commit()?;
    session.close()?;
    info!(rows = inserted, "seeded sample rows");
    Ok(inserted)
}
