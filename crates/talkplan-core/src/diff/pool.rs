//! Matching pool for one diff computation.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::model::SlotKey;

/// Start times still available for matching, grouped by room
///
/// Seeded from the symmetric difference; behaves as a multiset of
/// `(room, start)` pairs. Rooms keep the order of their first appearance in
/// the sorted difference, which is the fallback search order.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    room_order: Vec<String>,
    starts: HashMap<String, Vec<DateTime<Utc>>>,
}

impl CandidatePool {
    /// Seed a pool from difference entries, in their sorted order
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a SlotKey>) -> Self {
        let mut pool = Self::default();
        for key in keys {
            match pool.starts.get_mut(&key.room_id) {
                Some(starts) => starts.push(key.start),
                None => {
                    pool.room_order.push(key.room_id.clone());
                    pool.starts.insert(key.room_id.clone(), vec![key.start]);
                }
            }
        }
        pool
    }

    /// Whether at least one start time in the room is unconsumed
    pub fn has_room(&self, room_id: &str) -> bool {
        self.starts.get(room_id).is_some_and(|s| !s.is_empty())
    }

    /// Rooms to search for a counterpart: `own_room` first, then the other
    /// rooms with remaining start times in first-appearance order
    pub fn search_order(&self, own_room: &str) -> Vec<&str> {
        let mut order = Vec::with_capacity(self.room_order.len());
        order.extend(
            self.room_order
                .iter()
                .map(String::as_str)
                .find(|room| *room == own_room && self.has_room(room)),
        );
        order.extend(
            self.room_order
                .iter()
                .map(String::as_str)
                .filter(|room| *room != own_room && self.has_room(room)),
        );
        order
    }

    /// Unconsumed start times of a room, in seeding order
    pub fn starts(&self, room_id: &str) -> &[DateTime<Utc>] {
        self.starts.get(room_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Remove one occurrence of `(room, start)`; false if none was left
    pub fn consume(&mut self, room_id: &str, start: DateTime<Utc>) -> bool {
        let Some(starts) = self.starts.get_mut(room_id) else {
            return false;
        };
        match starts.iter().position(|s| *s == start) {
            Some(idx) => {
                starts.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Total number of unconsumed pairs
    #[cfg(test)]
    fn remaining(&self) -> usize {
        self.starts.values().map(Vec::len).sum()
    }
}
