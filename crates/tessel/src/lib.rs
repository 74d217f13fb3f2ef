#![forbid(unsafe_code)]

//! Tessel public facade crate.
//!
//! Tessel computes positions, collisions and transition deltas for a
//! column-based dashboard grid and drives keyboard interaction over it. It
//! never draws. This crate re-exports the common types from the internal
//! crates, adds [`GridSession`] to wire them together, and offers a
//! lightweight prelude.

pub mod session;

// --- Core re-exports -------------------------------------------------------

pub use tessel_core::config::{ConfigError, GridBreakpoint, GridConfig};
pub use tessel_core::easing::Easing;
pub use tessel_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerEvent, PointerEventKind,
};
pub use tessel_core::geometry::{CellMetrics, GridPosition, GridSize, Offset, PixelRect};
pub use tessel_core::item::{GridItem, ItemId, find_item};
pub use tessel_core::Instant;

// --- Layout re-exports -----------------------------------------------------

pub use tessel_layout::{
    CollisionResult, GridStats, OccupancyMap, check_collision, compact_layout,
    find_first_available_position, find_valid_position, get_grid_stats, resolve_collision,
    validate_position,
};

// --- Runtime re-exports ----------------------------------------------------

pub use tessel_runtime::{
    DebounceConfig, Debouncer, FlipAnimator, FlipBatch, PositionSnapshot, TransformPlayer,
    TweenPlayer, capture_positions,
};

// --- Widget re-exports -----------------------------------------------------

pub use tessel_widgets::{
    Announcer, AriaProps, GridCommand, InteractionMode, KeyboardController, LiveRegion,
};

// --- Session ---------------------------------------------------------------

pub use session::{GridSession, LayoutSnapshot, SessionEvent, capture_layout};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CellMetrics, FlipAnimator, GridConfig, GridItem, GridPosition, GridSession, GridSize,
        Instant, InteractionMode, ItemId, KeyCode, KeyEvent, SessionEvent,
    };

    pub use crate::{core, layout, runtime, widgets};
}

pub use tessel_core as core;
pub use tessel_layout as layout;
pub use tessel_runtime as runtime;
pub use tessel_widgets as widgets;
