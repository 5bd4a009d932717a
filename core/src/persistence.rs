//! Load/save hooks and the backends that carry the bytes.
//!
//! RULE: The store never touches files or databases directly. It encodes
//! the full record set with `encode_records` and hands the bytes to a
//! RecordBackend. On startup the backend's bytes go through
//! `decode_records`; a missing source is an empty set, not an error.
//!
//! Format: `{"version": 1, "records": [...]}`. A bare JSON array of
//! records (the format written before versioning) is accepted on load.

use crate::{
    error::{RiskError, RiskResult},
    record::RiskRecord,
};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    version: u32,
    records: &'a [RiskRecord],
}

/// Load hook.
pub fn decode_records(raw: Option<&[u8]>) -> RiskResult<Vec<RiskRecord>> {
    let Some(bytes) = raw else {
        return Ok(Vec::new());
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let records = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut envelope) => {
            let version = envelope.get("version").and_then(|v| v.as_u64());
            if version != Some(FORMAT_VERSION as u64) {
                return Err(RiskError::validation(
                    "version",
                    format!("unsupported record format version {version:?}"),
                ));
            }
            envelope
                .remove("records")
                .ok_or_else(|| RiskError::validation("records", "missing from envelope"))?
        }
        _ => {
            return Err(RiskError::validation(
                "records",
                "expected an array or a versioned envelope",
            ))
        }
    };
    Ok(serde_json::from_value(records)?)
}

/// Save hook.
pub fn encode_records(records: &[RiskRecord]) -> RiskResult<Vec<u8>> {
    let envelope = EnvelopeOut {
        version: FORMAT_VERSION,
        records,
    };
    Ok(serde_json::to_vec_pretty(&envelope)?)
}

/// Where encoded record sets live between runs.
pub trait RecordBackend: Send {
    fn name(&self) -> &'static str;

    /// Most recently saved bytes, or None if nothing was ever saved.
    fn load(&self) -> RiskResult<Option<Vec<u8>>>;

    fn save(&self, bytes: &[u8]) -> RiskResult<()>;
}

// ── Flat file ──────────────────────────────────────────────────────

pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordBackend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "json_file"
    }

    fn load(&self) -> RiskResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, bytes: &[u8]) -> RiskResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(&self.path, bytes)?;
        Ok(())
    }
}

// ── SQLite ─────────────────────────────────────────────────────────

/// Every save appends a snapshot row; load reads the newest one.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    pub fn open(path: &str) -> RiskResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Self::with_connection(conn)
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> RiskResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> RiskResult<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS record_snapshot (
                 id         INTEGER PRIMARY KEY AUTOINCREMENT,
                 saved_at   TEXT    NOT NULL,
                 state_json TEXT    NOT NULL
             );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of snapshots written so far.
    pub fn snapshot_count(&self) -> RiskResult<i64> {
        let conn = self.lock()?;
        let count = conn.query_row("SELECT COUNT(*) FROM record_snapshot", [], |row| row.get(0))?;
        Ok(count)
    }

    fn lock(&self) -> RiskResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| RiskError::Other(anyhow::anyhow!("sqlite connection lock poisoned")))
    }
}

impl RecordBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn load(&self) -> RiskResult<Option<Vec<u8>>> {
        let conn = self.lock()?;
        let latest: Option<String> = conn
            .query_row(
                "SELECT state_json FROM record_snapshot ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(latest.map(String::into_bytes))
    }

    fn save(&self, bytes: &[u8]) -> RiskResult<()> {
        let state_json = std::str::from_utf8(bytes)
            .map_err(|e| RiskError::Other(anyhow::anyhow!("snapshot is not UTF-8: {e}")))?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO record_snapshot (saved_at, state_json) VALUES (?1, ?2)",
            params![chrono::Utc::now().to_rfc3339(), state_json],
        )?;
        Ok(())
    }
}

// ── In memory ──────────────────────────────────────────────────────

/// Shared buffer backend. Clones see the same bytes, so a test can keep
/// one handle while the store owns another.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    bytes:      Option<Vec<u8>>,
    save_count: usize,
    failing:    bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        let backend = Self::default();
        backend.with_state(|state| state.bytes = Some(bytes));
        backend
    }

    /// Make subsequent saves fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.with_state(|state| state.failing = failing);
    }

    pub fn save_count(&self) -> usize {
        self.with_state(|state| state.save_count)
    }

    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.with_state(|state| state.bytes.clone())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MemoryState) -> R) -> R {
        let mut state = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut state)
    }
}

impl RecordBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn load(&self) -> RiskResult<Option<Vec<u8>>> {
        Ok(self.bytes())
    }

    fn save(&self, bytes: &[u8]) -> RiskResult<()> {
        self.with_state(|state| {
            if state.failing {
                return Err(RiskError::Io(std::io::Error::other(
                    "memory backend set to fail",
                )));
            }
            state.bytes = Some(bytes.to_vec());
            state.save_count += 1;
            Ok(())
        })
    }
}
