// store.rs — MetaStore: SQLite persistence for goals.
//
// One `metas` table with an AUTOINCREMENT primary key, so ids are assigned
// by the database and never reused even if rows were removed by hand.
// Schema changes are applied in order on open and tracked with
// `PRAGMA user_version`.
//
// The connection lives behind a Mutex; each call holds it for one short
// statement (or the insert + rowid pair), which is all the coordination
// the store needs.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::MetaError;
use crate::meta::{Meta, MetaFilter, NewMeta};

const MIGRATIONS: &[&str] = &[
    // 1: initial schema
    "CREATE TABLE metas (
        id                INTEGER PRIMARY KEY AUTOINCREMENT,
        division          TEXT    NOT NULL,
        proceso           TEXT    NOT NULL,
        indicador         TEXT    NOT NULL,
        linea_base_anio   INTEGER NOT NULL,
        valor_linea_base  REAL    NOT NULL,
        unidad            TEXT,
        fecha_objetivo    TEXT    NOT NULL,
        creado_por        TEXT    NOT NULL,
        creado_en         TEXT    NOT NULL
    );",
];

const SELECT_COLUMNS: &str = "SELECT id, division, proceso, indicador, linea_base_anio, \
     valor_linea_base, unidad, fecha_objetivo, creado_por, creado_en FROM metas";

/// Persistent store for goal records.
pub struct MetaStore {
    conn: Mutex<Connection>,
}

impl MetaStore {
    /// Open (or create) a database file and bring its schema up to date.
    /// Creates the parent directory if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MetaError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| MetaError::IoError {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened goal database");
        Self::from_connection(conn)
    }

    /// A private in-memory database, used by tests and throwaway servers.
    pub fn open_in_memory() -> Result<Self, MetaError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self, MetaError> {
        migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist a validated goal and return it with its new id.
    pub fn save(&self, record: NewMeta, creado_en: DateTime<Utc>) -> Result<Meta, MetaError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO metas (division, proceso, indicador, linea_base_anio, \
             valor_linea_base, unidad, fecha_objetivo, creado_por, creado_en) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.division,
                record.proceso,
                record.indicador,
                record.linea_base_anio,
                record.valor_linea_base,
                record.unidad,
                record.fecha_objetivo,
                record.creado_por,
                creado_en,
            ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(record.into_meta(id, creado_en))
    }

    /// Get a specific goal by id.
    pub fn get(&self, id: i64) -> Result<Option<Meta>, MetaError> {
        let conn = self.lock()?;
        let meta = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_COLUMNS), [id], row_to_meta)
            .optional()?;
        Ok(meta)
    }

    /// List all goals in insertion order.
    pub fn list(&self) -> Result<Vec<Meta>, MetaError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;
        let metas = stmt
            .query_map([], row_to_meta)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(metas)
    }

    /// List goals matching `filter`, still in insertion order.
    pub fn list_filtered(&self, filter: &MetaFilter) -> Result<Vec<Meta>, MetaError> {
        let all = self.list()?;
        if filter.is_empty() {
            return Ok(all);
        }
        Ok(all.into_iter().filter(|m| filter.matches(m)).collect())
    }

    /// Number of stored goals.
    pub fn count(&self) -> Result<usize, MetaError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM metas", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, MetaError> {
        self.conn.lock().map_err(|_| MetaError::LockPoisoned)
    }
}

fn row_to_meta(row: &Row<'_>) -> rusqlite::Result<Meta> {
    Ok(Meta {
        id: row.get(0)?,
        division: row.get(1)?,
        proceso: row.get(2)?,
        indicador: row.get(3)?,
        linea_base_anio: row.get(4)?,
        valor_linea_base: row.get(5)?,
        unidad: row.get(6)?,
        fecha_objetivo: row.get(7)?,
        creado_por: row.get(8)?,
        creado_en: row.get(9)?,
    })
}

fn migrate(conn: &mut Connection) -> Result<(), MetaError> {
    let current: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    let latest = MIGRATIONS.len() as u32;

    if current > latest {
        return Err(MetaError::UnsupportedSchema {
            found: current,
            supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (index, sql) in MIGRATIONS.iter().enumerate().skip(current as usize) {
        tx.execute_batch(sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {}", index + 1))?;
    }
    tx.commit()?;
    tracing::info!(from = current, to = latest, "migrated goal database schema");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn make_record(division: &str, year: i32) -> NewMeta {
        NewMeta {
            division: division.to_string(),
            proceso: "Flotación".to_string(),
            indicador: "Consumo Agua".to_string(),
            linea_base_anio: 2023,
            valor_linea_base: 10.5,
            unidad: Some("m3/ton".to_string()),
            fecha_objetivo: NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
            creado_por: "test@codelco.cl".to_string(),
        }
    }

    #[test]
    fn save_and_get_round_trip() {
        let store = MetaStore::open_in_memory().unwrap();

        let saved = store.save(make_record("Andina", 2030), Utc::now()).unwrap();
        let found = store.get(saved.id).unwrap().unwrap();

        assert_eq!(found.id, saved.id);
        assert_eq!(found.division, "Andina");
        assert_eq!(found.unidad.as_deref(), Some("m3/ton"));
        assert_eq!(found.fecha_objetivo, saved.fecha_objetivo);
        assert_eq!(found.creado_en, saved.creado_en);
    }

    #[test]
    fn get_nonexistent_returns_none() {
        let store = MetaStore::open_in_memory().unwrap();
        assert!(store.get(404).unwrap().is_none());
    }

    #[test]
    fn identical_records_get_distinct_ids() {
        let store = MetaStore::open_in_memory().unwrap();

        let first = store.save(make_record("Andina", 2030), Utc::now()).unwrap();
        let second = store.save(make_record("Andina", 2030), Utc::now()).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = MetaStore::open_in_memory().unwrap();
        for division in ["Salvador", "Andina", "Chuquicamata"] {
            store.save(make_record(division, 2030), Utc::now()).unwrap();
        }

        let divisions: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|m| m.division)
            .collect();
        assert_eq!(divisions, vec!["Salvador", "Andina", "Chuquicamata"]);
    }

    #[test]
    fn list_filtered_applies_filter() {
        let store = MetaStore::open_in_memory().unwrap();
        store.save(make_record("Andina", 2030), Utc::now()).unwrap();
        store.save(make_record("Salvador", 2030), Utc::now()).unwrap();
        store.save(make_record("Andina", 2032), Utc::now()).unwrap();

        let filter = MetaFilter {
            division: Some("andina".to_string()),
            anio: Some(2032),
            ..Default::default()
        };
        let found = store.list_filtered(&filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].fecha_objetivo.to_string(), "2032-12-31");
    }

    #[test]
    fn missing_unidad_is_stored_as_null() {
        let store = MetaStore::open_in_memory().unwrap();
        let mut record = make_record("Andina", 2030);
        record.unidad = None;

        let saved = store.save(record, Utc::now()).unwrap();
        assert!(store.get(saved.id).unwrap().unwrap().unidad.is_none());
    }

    #[test]
    fn store_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("data").join("metas.db");

        let id = {
            let store = MetaStore::open(&db_path).unwrap();
            store.save(make_record("Persistente", 2030), Utc::now()).unwrap().id
        };

        let store = MetaStore::open(&db_path).unwrap();
        let found = store.get(id).unwrap().unwrap();
        assert_eq!(found.division, "Persistente");

        // Ids keep increasing across reopen.
        let next = store.save(make_record("Andina", 2030), Utc::now()).unwrap();
        assert!(next.id > id);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("metas.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch("PRAGMA user_version = 99").unwrap();
        }

        let result = MetaStore::open(&db_path);
        assert!(matches!(
            result,
            Err(MetaError::UnsupportedSchema { found: 99, .. })
        ));
    }
}
