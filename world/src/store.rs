//! Sparse cell storage backing the unbounded grid.

use std::collections::BTreeMap;

use world_of_bits_core::{CellCoord, CellRect, Event, EvictionPolicy, Token};
use world_of_bits_system_spawning::Spawning;

/// Logical record of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    coord: CellCoord,
    token: Option<Token>,
    spawned: Option<Token>,
}

impl Cell {
    /// Coordinate addressed by the cell.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Token currently stored in the cell.
    #[must_use]
    pub const fn token(&self) -> Option<Token> {
        self.token
    }

    /// Reports whether player actions changed the cell since it was materialized.
    #[must_use]
    pub fn is_mutated(&self) -> bool {
        self.token != self.spawned
    }
}

#[derive(Clone, Copy, Debug)]
struct StoredCell {
    cell: Cell,
    /// Whether the cell lies inside the current window.
    attached: bool,
}

/// Sparse coordinate-to-cell map that materializes cells on first request.
///
/// Records inside the current window are attached. Cells touched outside of
/// it (by an interaction or a scripted setup) are kept detached and are never
/// evicted, since they never entered the window.
#[derive(Debug)]
pub(crate) struct CellStore {
    spawning: Spawning,
    policy: EvictionPolicy,
    window: Option<CellRect>,
    entries: BTreeMap<CellCoord, StoredCell>,
}

impl CellStore {
    pub(crate) fn new(spawning: Spawning, policy: EvictionPolicy) -> Self {
        Self {
            spawning,
            policy,
            window: None,
            entries: BTreeMap::new(),
        }
    }

    pub(crate) const fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub(crate) const fn window(&self) -> Option<CellRect> {
        self.window
    }

    pub(crate) fn get(&self, coord: CellCoord) -> Option<&Cell> {
        self.entries.get(&coord).map(|stored| &stored.cell)
    }

    fn in_window(&self, coord: CellCoord) -> bool {
        self.window.map_or(false, |window| window.contains(coord))
    }

    /// Returns the cell, consulting the spawn source only when no record exists.
    pub(crate) fn get_or_materialize(&mut self, coord: CellCoord, out: &mut Vec<Event>) -> Cell {
        let attached = self.in_window(coord);
        if let Some(stored) = self.entries.get_mut(&coord) {
            stored.attached |= attached;
            return stored.cell;
        }

        let spawned = self.spawning.spawn(coord);
        let cell = Cell {
            coord,
            token: spawned,
            spawned,
        };
        let _ = self.entries.insert(coord, StoredCell { cell, attached });
        out.push(Event::CellMaterialized {
            cell: coord,
            token: spawned,
        });
        cell
    }

    pub(crate) fn set_token(&mut self, coord: CellCoord, token: Option<Token>, out: &mut Vec<Event>) {
        let _ = self.get_or_materialize(coord, out);
        if let Some(stored) = self.entries.get_mut(&coord) {
            stored.cell.token = token;
        }
    }

    /// Detaches the cell from the window and applies the eviction policy.
    ///
    /// Returns whether the record survived, or `None` when the cell was not attached.
    fn evict(&mut self, coord: CellCoord, out: &mut Vec<Event>) -> Option<bool> {
        let stored = self.entries.get_mut(&coord)?;
        if !stored.attached {
            return None;
        }

        let retained = match self.policy {
            EvictionPolicy::Farming => false,
            // Pristine cells regenerate identically, so only mutations need a record.
            EvictionPolicy::Persistent => stored.cell.is_mutated(),
        };

        if retained {
            stored.attached = false;
        } else {
            let _ = self.entries.remove(&coord);
        }
        out.push(Event::CellEvicted {
            cell: coord,
            retained,
        });
        Some(retained)
    }

    /// Evicts every cell of the previous window outside `range`, then
    /// materializes all of `range` as the new window.
    pub(crate) fn sync(&mut self, range: CellRect, out: &mut Vec<Event>) {
        let leaving: Vec<CellCoord> = self
            .entries
            .iter()
            .filter(|(coord, stored)| stored.attached && !range.contains(**coord))
            .map(|(coord, _)| *coord)
            .collect();
        for coord in leaving {
            let _ = self.evict(coord, out);
        }

        self.window = Some(range);
        for coord in range.iter() {
            let _ = self.get_or_materialize(coord, out);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.window = None;
        self.entries.clear();
    }

    pub(crate) fn attached_count(&self) -> usize {
        self.entries.values().filter(|stored| stored.attached).count()
    }

    pub(crate) fn retained_count(&self) -> usize {
        self.entries.values().filter(|stored| !stored.attached).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_of_bits_system_spawning::Config;

    fn store(policy: EvictionPolicy) -> CellStore {
        CellStore::new(Spawning::new(Config::new(7, 0.5, 4)), policy)
    }

    fn window(store: &mut CellStore, center: CellCoord, events: &mut Vec<Event>) {
        store.sync(CellRect::around(center, 1), events);
    }

    #[test]
    fn materialization_is_idempotent() {
        let mut store = store(EvictionPolicy::Farming);
        let mut events = Vec::new();
        let coord = CellCoord::new(4, -9);

        let first = store.get_or_materialize(coord, &mut events);
        let second = store.get_or_materialize(coord, &mut events);

        assert_eq!(first, second);
        assert_eq!(events.len(), 1, "spawn source consulted once per record");
    }

    #[test]
    fn get_does_not_materialize() {
        let store = store(EvictionPolicy::Farming);
        assert!(store.get(CellCoord::new(1, 1)).is_none());
        assert_eq!(store.attached_count(), 0);
    }

    #[test]
    fn farming_forgets_mutations() {
        let mut store = store(EvictionPolicy::Farming);
        let mut events = Vec::new();
        let coord = CellCoord::new(0, 0);
        window(&mut store, coord, &mut events);
        let spawned = store.get(coord).and_then(|cell| cell.token());

        store.set_token(coord, Token::from_value(1024), &mut events);
        window(&mut store, CellCoord::new(50, 50), &mut events);
        assert!(store.get(coord).is_none());

        window(&mut store, coord, &mut events);
        assert_eq!(store.get(coord).and_then(|cell| cell.token()), spawned);
    }

    #[test]
    fn persistent_retains_only_mutated_cells() {
        let mut store = store(EvictionPolicy::Persistent);
        let mut events = Vec::new();
        let mutated = CellCoord::new(0, 0);
        let pristine = CellCoord::new(0, 1);
        window(&mut store, mutated, &mut events);
        store.set_token(mutated, Token::from_value(1024), &mut events);

        assert_eq!(store.evict(mutated, &mut events), Some(true));
        assert_eq!(store.evict(pristine, &mut events), Some(false));
        assert_eq!(store.evict(mutated, &mut events), None, "already detached");
        assert_eq!(store.retained_count(), 1);

        let restored = store.get_or_materialize(mutated, &mut events);
        assert_eq!(restored.token(), Token::from_value(1024));
        assert_eq!(store.retained_count(), 0);
    }

    #[test]
    fn cells_outside_the_window_stay_detached() {
        let mut store = store(EvictionPolicy::Farming);
        let mut events = Vec::new();
        let range = CellRect::around(CellCoord::new(0, 0), 1);
        store.sync(range, &mut events);
        let outside = CellCoord::new(2, 2);
        store.set_token(outside, None, &mut events);
        assert_eq!(store.attached_count(), 9);

        events.clear();
        store.sync(range, &mut events);

        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::CellEvicted { .. })));
        assert_eq!(store.get(outside).and_then(|cell| cell.token()), None);
        assert!(store.get(outside).is_some());
        assert_eq!(store.window(), Some(range));
    }

    #[test]
    fn sync_replaces_window() {
        let mut store = store(EvictionPolicy::Farming);
        let mut events = Vec::new();
        store.sync(CellRect::around(CellCoord::new(0, 0), 1), &mut events);
        assert_eq!(store.attached_count(), 9);

        events.clear();
        store.sync(CellRect::around(CellCoord::new(0, 1), 1), &mut events);
        assert_eq!(store.attached_count(), 9);
        let evicted = events
            .iter()
            .filter(|event| matches!(event, Event::CellEvicted { .. }))
            .count();
        assert_eq!(evicted, 3);
    }
}
