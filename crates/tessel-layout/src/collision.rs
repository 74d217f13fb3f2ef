#![forbid(unsafe_code)]

//! Pairwise collision tests.
//!
//! # Invariants
//!
//! - [`positions_overlap`] is symmetric.
//! - Rectangles that share only an edge do not overlap.
//! - [`check_collision`] never reports the item itself, even when it is
//!   present in `others`.
//! - Inputs are never mutated.

use serde::Serialize;
use tessel_core::geometry::GridPosition;
use tessel_core::item::{GridItem, ItemId};

use crate::placement::find_valid_position;

/// Outcome of a collision check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CollisionResult {
    /// Whether any other item overlaps.
    pub has_collision: bool,
    /// Ids of overlapping items, in input order.
    pub colliding_items: Vec<ItemId>,
    /// A collision-free alternative, filled by [`resolve_collision`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_position: Option<GridPosition>,
}

impl CollisionResult {
    /// Whether `id` is among the colliding items.
    pub fn collides_with(&self, id: &str) -> bool {
        self.colliding_items.iter().any(|c| c.as_str() == id)
    }
}

/// Half-open rectangle overlap test.
///
/// A position with zero width or height covers no cells and overlaps
/// nothing, matching [`OccupancyMap`](crate::OccupancyMap).
#[inline]
pub fn positions_overlap(a: &GridPosition, b: &GridPosition) -> bool {
    if a.area() == 0 || b.area() == 0 {
        return false;
    }
    !(a.right() <= u32::from(b.x)
        || b.right() <= u32::from(a.x)
        || a.bottom() <= u32::from(b.y)
        || b.bottom() <= u32::from(a.y))
}

/// Every item in `others` overlapping `item`, skipping `item` itself and
/// `exclude_id`.
pub fn check_collision<C>(
    item: &GridItem<C>,
    others: &[GridItem<C>],
    exclude_id: Option<&str>,
) -> CollisionResult {
    check_collision_at(item.id.as_str(), &item.position, others, exclude_id)
}

/// [`check_collision`] for an item id at a hypothetical position.
pub fn check_collision_at<C>(
    id: &str,
    position: &GridPosition,
    others: &[GridItem<C>],
    exclude_id: Option<&str>,
) -> CollisionResult {
    let colliding_items: Vec<ItemId> = others
        .iter()
        .filter(|other| other.id.as_str() != id && Some(other.id.as_str()) != exclude_id)
        .filter(|other| positions_overlap(position, &other.position))
        .map(|other| other.id.clone())
        .collect();

    CollisionResult {
        has_collision: !colliding_items.is_empty(),
        colliding_items,
        suggested_position: None,
    }
}

/// Whether `position` is free of every item except `id` and `exclude_id`.
pub(crate) fn is_free_at<C>(
    id: &str,
    position: &GridPosition,
    others: &[GridItem<C>],
    exclude_id: Option<&str>,
) -> bool {
    !others.iter().any(|other| {
        other.id.as_str() != id
            && Some(other.id.as_str()) != exclude_id
            && positions_overlap(position, &other.position)
    })
}

/// Check `item` and, on collision, attach the first collision-free
/// position found by [`find_valid_position`].
///
/// `suggested_position` stays `None` when there is no collision. When the
/// scan is exhausted it carries the original position, matching
/// [`find_valid_position`]'s fallback.
pub fn resolve_collision<C>(
    item: &GridItem<C>,
    others: &[GridItem<C>],
    max_columns: u16,
    max_rows: u16,
) -> CollisionResult {
    let mut result = check_collision(item, others, None);
    if result.has_collision {
        result.suggested_position = Some(find_valid_position(item, others, max_columns, max_rows));
    }
    result
}
