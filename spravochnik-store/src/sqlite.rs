//! SQLite implementation of the store and its sessions.
//!
//! A [`Store`] owns the database location and the registered kinds. Each
//! [`SqliteSession`] owns one connection; its staged operations run inside a
//! deferred transaction opened on the first `stage_*` call, so they are visible
//! to the session's own reads and invisible to everyone else until commit.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info, warn};

use spravochnik_fields::{check_entity, Entity, Value};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::schema::{self, column_list, create_table_sql, quote, Schema};
use crate::session::{LabelLookup, LookupFilter, Session};

/// Builder for [`Store`]. Created by [`Store::open`].
pub struct StoreBuilder {
    config: StoreConfig,
    schema: Schema,
}

impl StoreBuilder {
    /// Register a kind; its table is created on build if missing.
    pub fn register<E: Entity>(mut self) -> Self {
        self.schema.register(E::entity_def());
        self
    }

    /// Build the store: create the database directory and missing tables.
    pub fn build(self) -> Result<Store> {
        for def in self.schema.entities() {
            def.validate()?;
        }
        self.schema.validate_references()?;

        let path = &self.config.database_path;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| StoreError::Directory {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        for def in self.schema.entities() {
            conn.execute_batch(&create_table_sql(def))?;
        }
        conn.close().map_err(|(_, e)| e)?;

        info!(
            path = %path.display(),
            entities = self.schema.entities().len(),
            "store opened"
        );

        Ok(Store {
            config: self.config,
            schema: Arc::new(self.schema),
        })
    }
}

/// A durable store of registered entity kinds.
pub struct Store {
    config: StoreConfig,
    schema: Arc<Schema>,
}

impl Store {
    /// Open or create a store. Returns a builder for kind registration.
    ///
    /// ```rust,ignore
    /// let store = Store::open(StoreConfig::new("spravochnik.db"))
    ///     .register::<Department>()
    ///     .register::<Professor>()
    ///     .build()?;
    /// let session = store.session()?;
    /// ```
    pub fn open(config: StoreConfig) -> StoreBuilder {
        StoreBuilder {
            config,
            schema: Schema::new(),
        }
    }

    /// Start a new session with its own connection.
    pub fn session(&self) -> Result<SqliteSession> {
        let conn = Connection::open(&self.config.database_path)?;
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))?;
        conn.execute_batch(if self.config.enforce_foreign_keys {
            "PRAGMA foreign_keys = ON"
        } else {
            "PRAGMA foreign_keys = OFF"
        })?;
        debug!(path = %self.path().display(), "session opened");
        Ok(SqliteSession {
            conn,
            schema: Arc::clone(&self.schema),
        })
    }

    pub fn path(&self) -> &Path {
        &self.config.database_path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// A session over one SQLite connection.
pub struct SqliteSession {
    conn: Connection,
    schema: Arc<Schema>,
}

impl SqliteSession {
    /// Run one staged statement inside the session transaction.
    ///
    /// A transaction opened for a statement that then fails is rolled back, so
    /// a rejected first operation leaves nothing pending.
    fn staged<T>(&self, op: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let opened = self.conn.is_autocommit();
        if opened {
            self.conn.execute_batch("BEGIN DEFERRED")?;
            debug!("staging transaction opened");
        }
        let result = op(&self.conn);
        if result.is_err() && opened && !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
            debug!("empty staging transaction discarded");
        }
        result
    }

    fn require_identity<E: Entity>(entity: &E) -> Result<i64> {
        entity.identity().ok_or_else(|| StoreError::NotPersisted {
            entity: E::entity_def().name.clone(),
        })
    }
}

impl LabelLookup for SqliteSession {
    fn lookup(&self, entity: &str, field: &str, filter: LookupFilter) -> Result<Vec<(i64, Value)>> {
        let def = self.schema.require(entity)?;
        let column = def
            .column_of(field)
            .and_then(|c| def.field_at(c))
            .ok_or_else(|| StoreError::UnknownField {
                entity: entity.to_string(),
                field: field.to_string(),
            })?;
        let identity = quote(&def.fields[0].name);

        let mut sql = format!(
            "SELECT {identity}, {} FROM {}",
            quote(&column.name),
            quote(&def.name)
        );
        let mut params = Vec::new();
        if let LookupFilter::ById(id) = filter {
            sql.push_str(&format!(" WHERE {identity} = ?1"));
            params.push(id);
        }
        sql.push_str(&format!(" ORDER BY {identity}"));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let id: i64 = row.get(0)?;
            let value = schema::decode(&def.name, column, row.get_ref(1)?)?;
            out.push((id, value));
        }
        Ok(out)
    }
}

impl Session for SqliteSession {
    fn load_all<E: Entity>(&self) -> Result<Vec<E>> {
        let def = E::entity_def();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {}",
            column_list(&def.fields),
            quote(&def.name),
            quote(&def.fields[0].name)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut entity = E::default();
            for (column, field) in def.fields.iter().enumerate() {
                let value = schema::decode(&def.name, field, row.get_ref(column)?)?;
                entity.set(column, value)?;
            }
            out.push(entity);
        }
        debug!(entity = %def.name, rows = out.len(), "loaded rows");
        Ok(out)
    }

    fn stage_insert<E: Entity>(&mut self, entity: &mut E) -> Result<()> {
        check_entity::<E>()?;
        let def = E::entity_def();
        let table = quote(&def.name);
        let values: Vec<_> = entity
            .values()
            .iter()
            .skip(1)
            .map(schema::encode)
            .collect();

        let sql = if values.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES")
        } else {
            let placeholders = (1..=values.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {table} ({}) VALUES ({placeholders})",
                column_list(&def.fields[1..])
            )
        };

        let id = self.staged(|conn| {
            conn.execute(&sql, params_from_iter(values))?;
            Ok(conn.last_insert_rowid())
        })?;
        entity.set(0, Value::Integer(id))?;
        debug!(entity = %def.name, id, "staged insert");
        Ok(())
    }

    fn stage_update<E: Entity>(&mut self, entity: &E, column: usize) -> Result<()> {
        let def = E::entity_def();
        let id = Self::require_identity(entity)?;
        let field = def
            .field_at(column)
            .ok_or_else(|| spravochnik_fields::FieldsError::ColumnOutOfRange {
                entity: def.name.clone(),
                column,
            })?;
        let value = entity.get(column).unwrap_or_default();

        let sql = format!(
            "UPDATE {} SET {} = ?1 WHERE {} = ?2",
            quote(&def.name),
            quote(&field.name),
            quote(&def.fields[0].name)
        );
        self.staged(|conn| {
            let changed = conn.execute(&sql, rusqlite::params![schema::encode(&value), id])?;
            if changed == 0 {
                return Err(StoreError::RowNotFound {
                    entity: def.name.clone(),
                    id,
                });
            }
            Ok(())
        })?;
        debug!(entity = %def.name, id, field = %field.name, "staged update");
        Ok(())
    }

    fn stage_delete<E: Entity>(&mut self, entity: &E) -> Result<()> {
        let def = E::entity_def();
        let id = Self::require_identity(entity)?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            quote(&def.name),
            quote(&def.fields[0].name)
        );
        self.staged(|conn| conn.execute(&sql, [id]).map_err(StoreError::from))?;
        debug!(entity = %def.name, id, "staged delete");
        Ok(())
    }

    fn has_pending(&self) -> bool {
        !self.conn.is_autocommit()
    }

    fn commit(&mut self) -> Result<()> {
        if self.conn.is_autocommit() {
            debug!("nothing staged to commit");
            return Ok(());
        }
        match self.conn.execute_batch("COMMIT") {
            Ok(()) => {
                debug!("staged changes committed");
                Ok(())
            }
            Err(source) => {
                if self.conn.is_autocommit() {
                    // SQLite abandons the transaction on I/O and memory errors.
                    warn!(%source, "commit failed and sqlite rolled back the batch");
                } else {
                    warn!(%source, "commit rejected, changes remain staged");
                }
                Err(StoreError::CommitRejected { source })
            }
        }
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
            debug!("staged changes discarded");
        }
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        if self.has_pending() {
            debug!("closing session with staged changes");
            self.rollback()?;
        }
        self.conn.close().map_err(|(_, e)| e)?;
        debug!("session closed");
        Ok(())
    }
}
