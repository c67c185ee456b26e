//! The in-memory event log.
//!
//! RULE: The log is a bounded window carried on `GameState`.
//! Entries are appended most-recent-last and the oldest are evicted
//! once `config.log_window` is exceeded. Nothing is persisted.

use crate::types::Tick;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Warning,
    Crisis,
    Success,
    News,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Uuid,
    pub tick: Tick,
    pub kind: LogKind,
    pub title: String,
    pub detail: String,
}

/// Collects the entries one tick produces.
///
/// Ids are derived from (tick, sequence) so two replays of the same
/// tick produce identical logs.
#[derive(Debug)]
pub struct TickLog {
    tick: Tick,
    entries: Vec<EventLogEntry>,
}

impl TickLog {
    pub fn new(tick: Tick) -> Self {
        Self { tick, entries: Vec::new() }
    }

    pub fn push(&mut self, kind: LogKind, title: impl Into<String>, detail: impl Into<String>) {
        let seq = self.entries.len() as u128;
        let id = Uuid::from_u128((u128::from(self.tick) << 64) | seq);
        self.entries.push(EventLogEntry {
            id,
            tick: self.tick,
            kind,
            title: title.into(),
            detail: detail.into(),
        });
    }

    pub fn info(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.push(LogKind::Info, title, detail);
    }

    pub fn warning(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.push(LogKind::Warning, title, detail);
    }

    pub fn crisis(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.push(LogKind::Crisis, title, detail);
    }

    pub fn success(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.push(LogKind::Success, title, detail);
    }

    pub fn news(&mut self, title: impl Into<String>, detail: impl Into<String>) {
        self.push(LogKind::News, title, detail);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append this tick's entries to `log` and evict down to `window`.
    pub fn flush_into(self, log: &mut Vec<EventLogEntry>, window: usize) {
        log.extend(self.entries);
        truncate_window(log, window);
    }
}

/// Drop the oldest entries so at most `window` remain.
pub fn truncate_window(log: &mut Vec<EventLogEntry>, window: usize) {
    if log.len() > window {
        let excess = log.len() - window;
        log.drain(..excess);
    }
}
