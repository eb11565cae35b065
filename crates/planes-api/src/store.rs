// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Authoritative plane collection and display filtering.
//!
//! The store holds the last server-confirmed list in server order. Mutations
//! happen only through the explicit apply operations after the server has
//! confirmed them; the filtered view is a derived, non-owned subset computed
//! on demand and never feeds back into the collection.

use log::warn;

use crate::model::PlaneRecord;

/// Display filter over the authoritative collection.
///
/// `None` for manufacturer/year means "all". The search text matches
/// case-insensitively as a substring of the name or the manufacturer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaneFilter {
    /// Free-text search over name and manufacturer.
    pub search: String,
    /// Exact manufacturer to keep, or `None` for all.
    pub manufacturer: Option<String>,
    /// Exact year to keep, or `None` for all.
    pub year: Option<i32>,
}

impl PlaneFilter {
    /// True when no criterion is active (the filtered view is the full list).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.manufacturer.is_none() && self.year.is_none()
    }

    /// Whether a single record passes all active criteria.
    #[must_use]
    pub fn matches(&self, plane: &PlaneRecord) -> bool {
        let needle = self.search.trim().to_lowercase();
        let text_match = needle.is_empty()
            || plane.name.to_lowercase().contains(&needle)
            || plane.manufacturer.to_lowercase().contains(&needle);

        let maker_match = self
            .manufacturer
            .as_deref()
            .map_or(true, |m| plane.manufacturer == m);

        let year_match = self.year.map_or(true, |y| plane.year == y);

        text_match && maker_match && year_match
    }
}

/// The authoritative in-memory plane collection.
#[derive(Debug, Default)]
pub struct PlaneStore {
    planes: Vec<PlaneRecord>,
}

impl PlaneStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection with a fresh server snapshot.
    pub fn replace_all(&mut self, planes: Vec<PlaneRecord>) {
        self.planes = planes;
    }

    /// Append a newly created, server-confirmed record.
    ///
    /// Ids are unique across the collection; a duplicate means the server
    /// state diverged from ours, so the existing record is replaced in place.
    pub fn insert(&mut self, plane: PlaneRecord) {
        if let Some(id) = plane.id {
            if let Some(existing) = self.planes.iter_mut().find(|p| p.id == Some(id)) {
                warn!("insert of already-known plane {id}; replacing in place");
                *existing = plane;
                return;
            }
        }
        self.planes.push(plane);
    }

    /// Replace the record with the same id in place. Returns false when no
    /// such record exists.
    pub fn update(&mut self, plane: PlaneRecord) -> bool {
        let Some(id) = plane.id else {
            warn!("update with an unsaved record (no id); ignoring");
            return false;
        };
        match self.planes.iter_mut().find(|p| p.id == Some(id)) {
            Some(existing) => {
                *existing = plane;
                true
            }
            None => false,
        }
    }

    /// Remove the record with the given id, returning it when present.
    pub fn remove(&mut self, id: i64) -> Option<PlaneRecord> {
        let pos = self.planes.iter().position(|p| p.id == Some(id))?;
        Some(self.planes.remove(pos))
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get_by_id(&self, id: i64) -> Option<&PlaneRecord> {
        self.planes.iter().find(|p| p.id == Some(id))
    }

    /// The full collection in server order.
    #[must_use]
    pub fn planes(&self) -> &[PlaneRecord] {
        &self.planes
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// The records passing the filter, in collection order.
    ///
    /// Pure with respect to the collection; recomputed on demand.
    #[must_use]
    pub fn filtered(&self, filter: &PlaneFilter) -> Vec<PlaneRecord> {
        self.planes
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    /// Sorted distinct manufacturer names, for the filter combo.
    #[must_use]
    pub fn manufacturers(&self) -> Vec<String> {
        let mut makers: Vec<String> = self
            .planes
            .iter()
            .filter(|p| !p.manufacturer.is_empty())
            .map(|p| p.manufacturer.clone())
            .collect();
        makers.sort_unstable();
        makers.dedup();
        makers
    }

    /// Sorted distinct manufacturing years, for the filter combo.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .planes
            .iter()
            .filter(|p| p.year != 0)
            .map(|p| p.year)
            .collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(id: i64, name: &str, maker: &str, year: i32) -> PlaneRecord {
        PlaneRecord {
            id: Some(id),
            name: name.to_string(),
            year,
            manufacturer: maker.to_string(),
            image_ref: None,
            seats_class_a: 4,
            seats_class_b: 20,
            seats_class_c: 120,
        }
    }

    fn sample_store() -> PlaneStore {
        let mut store = PlaneStore::new();
        store.replace_all(vec![
            plane(1, "737 MAX", "Boeing", 2017),
            plane(2, "A320neo", "Airbus", 2016),
            plane(3, "787 Dreamliner", "Boeing", 2011),
            plane(4, "E195-E2", "Embraer", 2019),
        ]);
        store
    }

    #[test]
    fn test_empty_filter_returns_all_in_order() {
        let store = sample_store();
        let filter = PlaneFilter::default();
        assert!(filter.is_empty());
        let shown = store.filtered(&filter);
        assert_eq!(shown.len(), 4);
        let ids: Vec<_> = shown.iter().map(|p| p.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_search_matches_name_or_manufacturer_case_insensitive() {
        let store = sample_store();
        let filter = PlaneFilter {
            search: "boe".to_string(),
            ..Default::default()
        };
        let ids: Vec<_> = store.filtered(&filter).iter().map(|p| p.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 3]);

        let filter = PlaneFilter {
            search: "  NEO ".to_string(),
            ..Default::default()
        };
        let ids: Vec<_> = store.filtered(&filter).iter().map(|p| p.id.unwrap()).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_combined_criteria_are_anded() {
        let store = sample_store();
        let filter = PlaneFilter {
            search: "7".to_string(),
            manufacturer: Some("Boeing".to_string()),
            year: Some(2011),
        };
        let ids: Vec<_> = store.filtered(&filter).iter().map(|p| p.id.unwrap()).collect();
        assert_eq!(ids, vec![3]);

        // Same search, wrong year: nothing qualifies.
        let filter = PlaneFilter {
            year: Some(1999),
            ..filter
        };
        assert!(store.filtered(&filter).is_empty());
    }

    #[test]
    fn test_insert_keeps_ids_unique() {
        let mut store = sample_store();
        store.insert(plane(5, "A350", "Airbus", 2015));
        assert_eq!(store.len(), 5);

        // Duplicate id replaces instead of growing the collection.
        store.insert(plane(5, "A350-1000", "Airbus", 2018));
        assert_eq!(store.len(), 5);
        assert_eq!(store.get_by_id(5).unwrap().name, "A350-1000");
    }

    #[test]
    fn test_update_in_place_preserves_order() {
        let mut store = sample_store();
        let mut changed = store.get_by_id(2).unwrap().clone();
        changed.year = 2020;
        assert!(store.update(changed));

        let ids: Vec<_> = store.planes().iter().map(|p| p.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert_eq!(store.get_by_id(2).unwrap().year, 2020);

        assert!(!store.update(plane(99, "ghost", "Nobody", 2000)));
    }

    #[test]
    fn test_remove() {
        let mut store = sample_store();
        let removed = store.remove(3).unwrap();
        assert_eq!(removed.name, "787 Dreamliner");
        assert_eq!(store.len(), 3);
        assert!(store.get_by_id(3).is_none());
        assert!(store.remove(3).is_none());
    }

    #[test]
    fn test_distinct_filter_options() {
        let store = sample_store();
        assert_eq!(store.manufacturers(), vec!["Airbus", "Boeing", "Embraer"]);
        assert_eq!(store.years(), vec![2011, 2016, 2017, 2019]);
    }
}
