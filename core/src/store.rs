//! In-memory record store with debounced write-through.
//!
//! RULES:
//!   - Only the store mutates the record collection.
//!   - A record is written together with its computed output. There is
//!     no window in which a stored record lacks an output.
//!   - Persistence is coalesced: every mutation re-arms one quiet period,
//!     and a single save of the whole collection runs once it elapses.
//!     Save failures are logged and swallowed; the mutation stands.

use crate::{
    error::{RiskError, RiskResult},
    persistence::{decode_records, encode_records, RecordBackend},
    query::{plan, Page, RiskQuery},
    record::{Assessment, RiskRecord},
    stats::{compute_stats, RiskStats},
    types::Timestamp,
};
use chrono::Utc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

/// Pending-save state. Either idle (both markers None) or pending exactly
/// once; re-arming moves `last_mutation` but keeps `dirty_since`.
#[derive(Debug, Clone)]
pub struct SaveDebounce {
    quiet_period:  Duration,
    dirty_since:   Option<Instant>,
    last_mutation: Option<Instant>,
}

impl SaveDebounce {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            dirty_since:   None,
            last_mutation: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.dirty_since.get_or_insert(now);
        self.last_mutation = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_mutation.is_some()
    }

    /// First unsaved mutation, if any.
    pub fn dirty_since(&self) -> Option<Instant> {
        self.dirty_since
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.last_mutation
            .is_some_and(|last| now.saturating_duration_since(last) >= self.quiet_period)
    }

    fn clear(&mut self) {
        self.dirty_since = None;
        self.last_mutation = None;
    }
}

pub struct RiskStore {
    records:  Vec<RiskRecord>,
    backend:  Option<Box<dyn RecordBackend>>,
    debounce: SaveDebounce,
}

impl RiskStore {
    /// Store with no backend. Mutations are never persisted.
    pub fn in_memory() -> Self {
        Self::from_records(Vec::new())
    }

    pub fn from_records(records: Vec<RiskRecord>) -> Self {
        Self {
            records,
            backend: None,
            debounce: SaveDebounce::new(DEFAULT_QUIET_PERIOD),
        }
    }

    /// Load the initial record set from `backend` and keep it for saves.
    pub fn open(backend: Box<dyn RecordBackend>, quiet_period: Duration) -> RiskResult<Self> {
        let raw = backend.load()?;
        let records = decode_records(raw.as_deref())?;
        log::info!("Loaded {} risks from {} backend", records.len(), backend.name());
        Ok(Self {
            records,
            backend: Some(backend),
            debounce: SaveDebounce::new(quiet_period),
        })
    }

    // ── Mutations ──────────────────────────────────────────────────

    /// Store a scored assessment under a fresh id and the current time.
    pub fn create(&mut self, assessment: Assessment) -> RiskRecord {
        self.create_with_timestamp(assessment, Utc::now())
    }

    /// As `create`, with an explicit creation time (imports, seeding).
    pub fn create_with_timestamp(
        &mut self,
        assessment: Assessment,
        created_at: Timestamp,
    ) -> RiskRecord {
        let record = RiskRecord {
            id: Uuid::new_v4().to_string(),
            assessment,
            created_at,
        };
        log::debug!("Created {} risk {}", record.kind(), record.id);
        self.records.push(record.clone());
        self.mark_dirty();
        record
    }

    /// Replace the assessment of an existing record. Id, kind and
    /// creation time never change. Unknown id ⇒ Ok(None).
    pub fn update(&mut self, id: &str, assessment: Assessment) -> RiskResult<Option<RiskRecord>> {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if record.kind() != assessment.kind() {
            return Err(RiskError::validation(
                "type",
                format!(
                    "risk {id} is {}, cannot replace it with a {} assessment",
                    record.kind(),
                    assessment.kind()
                ),
            ));
        }
        record.assessment = assessment;
        let updated = record.clone();
        log::debug!("Updated risk {id}");
        self.mark_dirty();
        Ok(Some(updated))
    }

    /// True if a record existed and was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            return false;
        };
        self.records.remove(index);
        log::debug!("Deleted risk {id}");
        self.mark_dirty();
        true
    }

    // ── Queries ────────────────────────────────────────────────────

    pub fn find_by_id(&self, id: &str) -> Option<&RiskRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn find_all(&self, query: &RiskQuery) -> Page<RiskRecord> {
        plan(&self.records, query)
    }

    pub fn stats(&self) -> RiskStats {
        compute_stats(&self.records)
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[RiskRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ── Persistence ────────────────────────────────────────────────

    pub fn has_pending_save(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn debounce(&self) -> &SaveDebounce {
        &self.debounce
    }

    /// Save if the quiet period has elapsed since the last mutation.
    /// Returns true if a save was attempted.
    pub fn poll_persistence(&mut self, now: Instant) -> bool {
        if !self.debounce.is_due(now) {
            return false;
        }
        self.save(now);
        true
    }

    /// Save immediately if anything is pending.
    pub fn flush(&mut self) -> bool {
        if !self.debounce.is_pending() {
            return false;
        }
        self.save(Instant::now());
        true
    }

    fn mark_dirty(&mut self) {
        if self.backend.is_some() {
            self.debounce.arm(Instant::now());
        }
    }

    fn save(&mut self, now: Instant) {
        let Some(backend) = self.backend.as_ref() else {
            self.debounce.clear();
            return;
        };
        let result = encode_records(&self.records).and_then(|bytes| backend.save(&bytes));
        match result {
            Ok(()) => {
                log::debug!("Saved {} risks to {} backend", self.records.len(), backend.name());
                self.debounce.clear();
            }
            Err(e) => {
                // Re-arm so the next quiet period retries.
                log::error!("Error saving risks to {} backend: {e}", backend.name());
                self.debounce.arm(now);
            }
        }
    }
}

impl Drop for RiskStore {
    fn drop(&mut self) {
        if self.debounce.is_pending() {
            self.flush();
        }
    }
}
