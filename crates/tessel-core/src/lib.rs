// Forbid unsafe in production code.
#![cfg_attr(not(test), forbid(unsafe_code))]

//! Core: grid model, geometry, input events, and configuration.
//!
//! # Role in Tessel
//! `tessel-core` is the vocabulary layer. It owns the types every other
//! crate speaks: [`GridPosition`](geometry::GridPosition),
//! [`GridItem`](item::GridItem), key and pointer events, easing curves, and
//! [`GridConfig`](config::GridConfig).
//!
//! # How it fits in the system
//! `tessel-layout` computes positions over these types, `tessel-runtime`
//! schedules and animates their changes, and `tessel-widgets` drives them
//! from the keyboard. Nothing here holds state between calls.

pub mod config;
pub mod easing;
pub mod event;
pub mod geometry;
pub mod item;
pub mod logging;

/// Monotonic instant used by every time-dependent API.
///
/// `web_time::Instant` is `std::time::Instant` on native targets and a
/// `performance.now()` shim on wasm.
pub use web_time::Instant;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

pub use config::{ConfigError, GridBreakpoint, GridConfig};
pub use easing::Easing;
pub use geometry::{CellMetrics, GridPosition, GridSize, Offset, PixelRect};
pub use item::{GridItem, ItemId, find_item};
