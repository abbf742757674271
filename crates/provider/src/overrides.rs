//! Override bookkeeping.
//!
//! Records are kept in an arena keyed by a monotonically increasing request
//! id. Each requester token owns at most one record; the record with the
//! highest id is the active override.

use foldstate_sensors::RequesterToken;
use foldstate_states::{StateFlags, StateId};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverrideRecord {
    pub token: RequesterToken,
    pub state: StateId,
    /// Flags of the requested state, captured at request time.
    #[serde(skip)]
    pub flags: StateFlags,
    pub requested_at_ms: i64,
}

#[derive(Debug, Default)]
pub struct OverrideTable {
    records: BTreeMap<u64, OverrideRecord>,
    next_id: u64,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an override for `token`, replacing any earlier one it owns.
    pub fn insert(&mut self, token: RequesterToken, state: StateId, flags: StateFlags) -> u64 {
        self.remove_token(token);

        let id = self.next_id;
        self.next_id += 1;
        self.records.insert(
            id,
            OverrideRecord {
                token,
                state,
                flags,
                requested_at_ms: chrono::Utc::now().timestamp_millis(),
            },
        );
        id
    }

    pub fn remove_token(&mut self, token: RequesterToken) -> Option<OverrideRecord> {
        let id = self
            .records
            .iter()
            .find(|(_, r)| r.token == token)
            .map(|(id, _)| *id)?;
        self.records.remove(&id)
    }

    /// The most recent override.
    pub fn active(&self) -> Option<&OverrideRecord> {
        self.records.last_key_value().map(|(_, r)| r)
    }

    /// Remove and return every record matching `should_drop`.
    pub fn drain_where<F>(&mut self, mut should_drop: F) -> Vec<OverrideRecord>
    where
        F: FnMut(&OverrideRecord) -> bool,
    {
        let ids: Vec<u64> = self
            .records
            .iter()
            .filter(|(_, r)| should_drop(r))
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.records.remove(&id))
            .collect()
    }

    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
