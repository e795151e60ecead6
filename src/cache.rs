//! Gallery Core - Local Photo Cache
//!
//! Persistent keyed storage of photo records in SQLite, surviving
//! process restarts. The cache exclusively owns the persisted records:
//! every write path in the crate goes through this type. Mutations
//! republish the full ordered list to observers.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, Row};
use tokio::sync::watch;

use crate::error::GalleryResult;

/// One persisted photo record. The wire-only `type` and `liked` fields
/// are deliberately absent.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRow {
    pub id: i64,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub url: Option<String>,
    pub photographer: Option<String>,
    pub photographer_url: Option<String>,
    pub photographer_id: Option<i64>,
    /// Average color as stored, `#AARRGGBB` hex text.
    pub avg_color: Option<String>,
    pub thumbnail_url: Option<String>,
    pub tiny_thumbnail_url: Option<String>,
    pub large_image_url: Option<String>,
    pub alt: Option<String>,
}

/// SQLite-backed photo cache.
pub struct PhotoCache {
    conn: Mutex<Connection>,
    /// Replay-latest publisher of the ordered record list.
    all_photos: watch::Sender<Vec<PhotoRow>>,
}

impl PhotoCache {
    /// Open (or create) the cache database at `path`.
    pub fn open(path: &Path) -> GalleryResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open a throwaway in-memory cache.
    pub fn open_in_memory() -> GalleryResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> GalleryResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS photos (
                id INTEGER PRIMARY KEY,
                width INTEGER,
                height INTEGER,
                url TEXT,
                photographer TEXT,
                photographer_url TEXT,
                photographer_id INTEGER,
                avg_color TEXT,
                thumbnail_url TEXT,
                tiny_thumbnail_url TEXT,
                large_image_url TEXT,
                alt TEXT
            );
            "#,
        )?;

        let initial = Self::query_all(&conn)?;
        let (all_photos, _) = watch::channel(initial);

        Ok(Self {
            conn: Mutex::new(conn),
            all_photos,
        })
    }

    /// Insert-or-replace a batch of records, atomically.
    pub fn upsert_many(&self, rows: &[PhotoRow]) -> GalleryResult<()> {
        {
            let mut conn = self.conn.lock();
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO photos (
                        id, width, height, url, photographer, photographer_url,
                        photographer_id, avg_color, thumbnail_url,
                        tiny_thumbnail_url, large_image_url, alt
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                )?;
                for row in rows {
                    stmt.execute(params![
                        row.id,
                        row.width,
                        row.height,
                        row.url,
                        row.photographer,
                        row.photographer_url,
                        row.photographer_id,
                        row.avg_color,
                        row.thumbnail_url,
                        row.tiny_thumbnail_url,
                        row.large_image_url,
                        row.alt,
                    ])?;
                }
            }
            tx.commit()?;
        }
        self.publish();
        Ok(())
    }

    /// Look up a single record by id.
    pub fn get_by_id(&self, id: i64) -> GalleryResult<Option<PhotoRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT * FROM photos WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], Self::map_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// All records ordered by id descending.
    pub fn get_all(&self) -> GalleryResult<Vec<PhotoRow>> {
        let conn = self.conn.lock();
        Self::query_all(&conn)
    }

    /// Reactive view of the ordered record list. New subscribers receive
    /// the current list immediately, then every subsequent change.
    pub fn observe_all(&self) -> watch::Receiver<Vec<PhotoRow>> {
        self.all_photos.subscribe()
    }

    /// Remove every record. Used before writing a fresh first page so a
    /// previous session's entries cannot leak into the new result set.
    pub fn clear_all(&self) -> GalleryResult<()> {
        {
            let conn = self.conn.lock();
            conn.execute("DELETE FROM photos", [])?;
        }
        self.publish();
        Ok(())
    }

    /// Number of cached records.
    pub fn count(&self) -> GalleryResult<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn publish(&self) {
        let snapshot = {
            let conn = self.conn.lock();
            Self::query_all(&conn)
        };
        match snapshot {
            Ok(rows) => {
                self.all_photos.send_replace(rows);
            }
            Err(e) => log::warn!("cache snapshot after write failed: {e}"),
        }
    }

    fn query_all(conn: &Connection) -> GalleryResult<Vec<PhotoRow>> {
        let mut stmt = conn.prepare("SELECT * FROM photos ORDER BY id DESC")?;
        let rows = stmt.query_map([], Self::map_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<PhotoRow> {
        Ok(PhotoRow {
            id: row.get("id")?,
            width: row.get("width")?,
            height: row.get("height")?,
            url: row.get("url")?,
            photographer: row.get("photographer")?,
            photographer_url: row.get("photographer_url")?,
            photographer_id: row.get("photographer_id")?,
            avg_color: row.get("avg_color")?,
            thumbnail_url: row.get("thumbnail_url")?,
            tiny_thumbnail_url: row.get("tiny_thumbnail_url")?,
            large_image_url: row.get("large_image_url")?,
            alt: row.get("alt")?,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_row(id: i64) -> PhotoRow {
    PhotoRow {
        id,
        width: Some(3756),
        height: Some(5627),
        url: Some(format!("https://www.pexels.com/photo/{id}/")),
        photographer: Some("Christina Morillo".into()),
        photographer_url: Some("https://www.pexels.com/@divinetechygirl".into()),
        photographer_id: Some(473730),
        avg_color: Some("#FF82773C".into()),
        thumbnail_url: Some(format!("https://images.pexels.com/{id}/m.jpg")),
        tiny_thumbnail_url: Some(format!("https://images.pexels.com/{id}/t.jpg")),
        large_image_url: Some(format!("https://images.pexels.com/{id}/l.jpg")),
        alt: Some("Woman in black blazer".into()),
    }
}
