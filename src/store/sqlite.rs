//! SQLiteによるキー・バリュー保存
//!
//! テーブル1つ（`kv_store`）にJSON文字列を保存する。各操作はそれぞれ1トランザクション。
//! スキーマは `PRAGMA user_version` で管理し、開く時に古ければその場で更新する。

use super::KvEngine;
use crate::error::{CleanupError, Result};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::info;

/// 現在のスキーマバージョン
pub const SCHEMA_VERSION: i32 = 2;

/// バージョンごとの更新手順（index 0 → v1）
const MIGRATIONS: &[&str] = &[
    // v1: キー・バリューテーブル
    "CREATE TABLE IF NOT EXISTS kv_store (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );",
    // v2: 更新日時
    "ALTER TABLE kv_store ADD COLUMN updated_at INTEGER;",
];

pub struct SqliteEngine {
    conn: Mutex<Connection>,
}

impl SqliteEngine {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        upgrade_schema(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn schema_version(&self) -> Result<i32> {
        let conn = self.lock()?;
        Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CleanupError::Storage("接続のロックに失敗しました".into()))
    }
}

/// 古いスキーマを現在のバージョンまで更新
///
/// 書き込みロックを取ってからバージョンを読むので、複数プロセスでも1回だけ適用される。
fn upgrade_schema(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let version: i32 = tx.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    for sql in MIGRATIONS.iter().skip(version.max(0) as usize) {
        tx.execute_batch(sql)?;
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    info!(from = version, to = SCHEMA_VERSION, "ローカル保存のスキーマを更新しました");
    Ok(())
}

impl KvEngine for SqliteEngine {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let value = tx
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        tx.commit()?;
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
            params![key, value, chrono::Utc::now().timestamp_millis()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        tx.commit()?;
        Ok(())
    }
}
