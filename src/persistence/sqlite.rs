use super::{Collection, PersistenceError, PersistenceResult, Repository, Stored};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};

/// One table for every collection; values are kept as JSON bodies.
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path.as_ref())?;
        Self::initialize_schema(&connection)?;
        tracing::debug!(path = %path.as_ref().display(), "opened sqlite store");
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                body_json TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS records_by_collection ON records (collection);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl<T: Collection> Repository<T> for SqliteStore {
    fn insert(&self, value: &T) -> PersistenceResult<i64> {
        value.validate()?;
        let json = serde_json::to_string(value)?;
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO records (collection, body_json) VALUES (?1, ?2)",
            params![T::NAME, json],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(collection = T::NAME, id, "inserted record");
        Ok(id)
    }

    fn update(&self, id: i64, value: &T) -> PersistenceResult<()> {
        value.validate()?;
        let json = serde_json::to_string(value)?;
        let conn = self.connection.lock();
        let changed = conn.execute(
            "UPDATE records SET body_json = ?1, updated_at = CURRENT_TIMESTAMP \
             WHERE id = ?2 AND collection = ?3",
            params![json, id, T::NAME],
        )?;
        if changed == 0 {
            return Err(PersistenceError::NotFound {
                collection: T::NAME,
                id,
            });
        }
        tracing::info!(collection = T::NAME, id, "updated record");
        Ok(())
    }

    fn get_by_id(&self, id: i64) -> PersistenceResult<Option<T>> {
        let conn = self.connection.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT body_json FROM records WHERE id = ?1 AND collection = ?2",
                params![id, T::NAME],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|json| serde_json::from_str(&json).map_err(PersistenceError::from))
            .transpose()
    }

    fn get_all(&self) -> PersistenceResult<Vec<Stored<T>>> {
        let conn = self.connection.lock();
        let mut stmt =
            conn.prepare("SELECT id, body_json FROM records WHERE collection = ?1 ORDER BY id ASC")?;
        let rows = stmt.query_map(params![T::NAME], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut values = Vec::new();
        for row in rows {
            let (id, json) = row?;
            values.push(Stored {
                id,
                value: serde_json::from_str(&json)?,
            });
        }
        Ok(values)
    }
}
