use crate::domain::{ArticleId, OutletCode, OutletCursor};
use crate::errors::{HarvestError, HarvestResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::CursorRepository;

pub struct SqliteCursorRepository {
    storage: SqliteStorage,
}

impl SqliteCursorRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl CursorRepository for SqliteCursorRepository {
    fn get(&self, outlet: OutletCode) -> HarvestResult<Option<OutletCursor>> {
        let conn = self.storage.connection()?;
        let mut stmt =
            conn.prepare("SELECT last_article_id FROM outlet_cursors WHERE outlet_code = ?1")?;

        match stmt.query_row([outlet.0], |row| row.get::<_, u64>(0)) {
            Ok(id) => Ok(Some(OutletCursor::new(outlet, ArticleId(id)))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(HarvestError::from(e)),
        }
    }

    fn save(&self, cursor: &OutletCursor) -> HarvestResult<()> {
        let conn = self.storage.connection()?;
        conn.execute(
            "INSERT INTO outlet_cursors (outlet_code, last_article_id) VALUES (?1, ?2)
             ON CONFLICT(outlet_code) DO UPDATE SET
                last_article_id = excluded.last_article_id,
                updated_at = datetime('now')",
            (cursor.outlet_code.0, cursor.last_article_id.0),
        )?;
        Ok(())
    }

    fn get_all(&self) -> HarvestResult<Vec<OutletCursor>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(
            "SELECT outlet_code, last_article_id FROM outlet_cursors ORDER BY outlet_code",
        )?;

        let cursors = stmt.query_map([], |row| {
            Ok(OutletCursor::new(
                OutletCode(row.get(0)?),
                ArticleId(row.get(1)?),
            ))
        })?;

        cursors.collect::<Result<Vec<_>, _>>().map_err(HarvestError::from)
    }
}
