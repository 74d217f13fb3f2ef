#![forbid(unsafe_code)]

//! Collision detection, placement search, and compaction.
//!
//! Every function here is pure: it borrows the caller's items and returns
//! new positions or new item vectors. Nothing is cached between calls, so
//! rapid-fire calls from pointer moves need no coordination.
//!
//! # Cost
//! Placement is a brute-force raster scan, `O(max_rows × max_columns)`
//! candidate tests per item and `O(n × max_rows × max_columns)` for a full
//! compaction. That is fine for dashboard-sized grids and a cliff for very
//! large ones; see `benches/layout_bench.rs`.

pub mod collision;
pub mod compact;
pub mod occupancy;
pub mod placement;
pub mod stats;

pub use collision::{
    CollisionResult, check_collision, check_collision_at, positions_overlap, resolve_collision,
};
pub use compact::compact_layout;
pub use occupancy::{OccupancyMap, all_occupied_cells, occupied_cells};
pub use placement::{find_first_available_position, find_valid_position, validate_position};
pub use stats::{GridStats, get_grid_stats};

pub use tessel_core::geometry::{DEFAULT_COLUMNS, DEFAULT_MAX_ROWS};
