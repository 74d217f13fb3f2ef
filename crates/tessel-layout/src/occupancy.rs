#![forbid(unsafe_code)]

//! Per-cell occupancy maps.
//!
//! Placement of brand-new items and compaction test candidate rectangles
//! cell by cell instead of pairwise. An [`OccupancyMap`] records which item
//! owns each `(x, y)` cell; when items overlap, the later one wins.

use rustc_hash::FxHashMap;
use tessel_core::geometry::GridPosition;
use tessel_core::item::{GridItem, ItemId};

/// Cell → owning item id.
#[derive(Debug, Clone, Default)]
pub struct OccupancyMap {
    cells: FxHashMap<(u16, u16), ItemId>,
}

impl OccupancyMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every cell of `position` as owned by `id`.
    pub fn insert(&mut self, position: &GridPosition, id: &ItemId) {
        for cell in position.cells() {
            self.cells.insert(cell, id.clone());
        }
    }

    /// Owner of a cell.
    #[inline]
    pub fn owner(&self, x: u16, y: u16) -> Option<&ItemId> {
        self.cells.get(&(x, y))
    }

    /// Whether a cell is taken.
    #[inline]
    pub fn is_occupied(&self, x: u16, y: u16) -> bool {
        self.cells.contains_key(&(x, y))
    }

    /// Whether any cell of `position` is taken.
    pub fn intersects(&self, position: &GridPosition) -> bool {
        position.cells().any(|(x, y)| self.is_occupied(x, y))
    }

    /// Number of occupied cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate `(cell, owner)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&(u16, u16), &ItemId)> {
        self.cells.iter()
    }
}

impl<'a, C> FromIterator<&'a GridItem<C>> for OccupancyMap
where
    C: 'a,
{
    fn from_iter<I: IntoIterator<Item = &'a GridItem<C>>>(iter: I) -> Self {
        let mut map = Self::new();
        for item in iter {
            map.insert(&item.position, &item.id);
        }
        map
    }
}

/// Every cell covered by `position`, as a list.
pub fn occupied_cells(position: &GridPosition) -> Vec<(u16, u16)> {
    position.cells().collect()
}

/// Occupancy of a whole layout.
pub fn all_occupied_cells<C>(items: &[GridItem<C>]) -> OccupancyMap {
    items.iter().collect()
}
