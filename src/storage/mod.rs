use anyhow::Context;
use rusqlite::{Connection, params};
use std::path::Path;

pub struct Storage {
    conn: Connection,
}

impl Storage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("open {}", path.display()))?;
        let s = Self { conn };
        s.init_schema()?;
        Ok(s)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn
            .execute_batch(
                r#"
CREATE TABLE IF NOT EXISTS timed_lines (
  variant_id TEXT PRIMARY KEY,
  lines_json TEXT NOT NULL,
  updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS alignment_cache (
  variant_id TEXT PRIMARY KEY,
  response_json TEXT NOT NULL,
  fetched_at INTEGER NOT NULL
);
"#,
            )
            .context("init schema")?;
        Ok(())
    }

    /// Persist the converted line array for a song variant.
    pub fn save_lines(
        &self,
        variant_id: &str,
        lines_json: &str,
        now_unix: i64,
    ) -> anyhow::Result<()> {
        self.conn
            .execute(
                r#"
INSERT INTO timed_lines(variant_id, lines_json, updated_at)
VALUES(?1, ?2, ?3)
ON CONFLICT(variant_id) DO UPDATE SET
  lines_json=excluded.lines_json,
  updated_at=excluded.updated_at
"#,
                params![variant_id, lines_json, now_unix],
            )
            .context("save lines")?;
        Ok(())
    }

    pub fn get_lines(&self, variant_id: &str) -> anyhow::Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT lines_json FROM timed_lines WHERE variant_id=?1")
            .context("prepare lines query")?;
        let mut rows = stmt.query(params![variant_id]).context("query lines")?;
        if let Some(row) = rows.next().context("read lines row")? {
            let json: String = row.get(0)?;
            Ok(Some(json))
        } else {
            Ok(None)
        }
    }

    /// Cache the raw alignment response so a re-convert does not refetch.
    pub fn cache_alignment(
        &self,
        variant_id: &str,
        response_json: &str,
        now_unix: i64,
    ) -> anyhow::Result<()> {
        self.conn
            .execute(
                r#"
INSERT INTO alignment_cache(variant_id, response_json, fetched_at)
VALUES(?1, ?2, ?3)
ON CONFLICT(variant_id) DO UPDATE SET
  response_json=excluded.response_json,
  fetched_at=excluded.fetched_at
"#,
                params![variant_id, response_json, now_unix],
            )
            .context("cache alignment")?;
        Ok(())
    }

    pub fn get_cached_alignment(&self, variant_id: &str) -> anyhow::Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT response_json FROM alignment_cache WHERE variant_id=?1")
            .context("prepare alignment cache query")?;
        let mut rows = stmt
            .query(params![variant_id])
            .context("query alignment cache")?;
        if let Some(row) = rows.next().context("read alignment cache row")? {
            let json: String = row.get(0)?;
            Ok(Some(json))
        } else {
            Ok(None)
        }
    }
}
