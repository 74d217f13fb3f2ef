#![forbid(unsafe_code)]

//! Runtime: update scheduling and FLIP animation.
//!
//! # Role in Tessel
//! Layout functions in `tessel-layout` are pure and instantaneous. This
//! crate adds the two time-dependent pieces that sit after them:
//!
//! - [`debounce`]: coalesce bursts of position changes into one
//!   notification, or cap a callback's rate.
//! - [`flip`]: turn committed position changes into smooth transitions.
//!
//! Neither owns a clock or a thread. Time is passed in by the host, either
//! as an [`Instant`](web_time::Instant) (`Debouncer::poll`) or as a frame
//! delta (`FlipAnimator::tick`).

pub mod debounce;
pub mod flip;

pub use debounce::{DebounceConfig, Debouncer, animation_throttler, layout_debouncer, throttle};
pub use flip::{
    FLIP_EPSILON, FlipAnimation, FlipAnimator, FlipBatch, FlipEasing, PlaybackId, PlaybackOutcome,
    PositionSnapshot, TransformPlayer, TweenPlayer, capture_positions,
};
