//! history.rs — bounded in-memory log of recent aggregate results, feeding
//! trend and anomaly checks. Lost on restart.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

use crate::aggregator::AggregateResult;
use crate::mood::MoodLabel;

const MAX_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub ts: DateTime<Utc>,
    pub overall: u8,
    pub label: MoodLabel,
}

#[derive(Debug)]
pub struct ScoreHistory {
    inner: Mutex<Vec<HistoryEntry>>,
    cap: usize,
}

impl ScoreHistory {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_CAPACITY);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap)),
            cap,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn push(&self, result: &AggregateResult) {
        self.push_at(result, Utc::now());
    }

    pub fn push_at(&self, result: &AggregateResult, ts: DateTime<Utc>) {
        let mut v = self.inner.lock().expect("history mutex poisoned");
        self.append(&mut v, result, ts);
    }

    /// Scores recorded before `result` (oldest first), then append `result`.
    /// Both happen under one lock, so concurrent callers each see a distinct
    /// prefix of the final order.
    pub fn record(&self, result: &AggregateResult) -> Vec<f64> {
        let mut v = self.inner.lock().expect("history mutex poisoned");
        let prior = v.iter().map(|e| f64::from(e.overall)).collect();
        self.append(&mut v, result, Utc::now());
        prior
    }

    fn append(&self, v: &mut Vec<HistoryEntry>, result: &AggregateResult, ts: DateTime<Utc>) {
        v.push(HistoryEntry {
            ts,
            overall: result.overall,
            label: result.label,
        });
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    pub fn snapshot_last_n(&self, n: usize) -> Vec<HistoryEntry> {
        let v = self.inner.lock().expect("history mutex poisoned");
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }

    /// Overall scores, oldest first.
    pub fn scores(&self) -> Vec<f64> {
        let v = self.inner.lock().expect("history mutex poisoned");
        v.iter().map(|e| f64::from(e.overall)).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("history mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
