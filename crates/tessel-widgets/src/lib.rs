#![forbid(unsafe_code)]

//! Keyboard interaction and screen-reader announcements for Tessel grids.
//!
//! [`KeyboardController`] is a table-driven state machine over three
//! modes (navigate, move, resize). It emits [`GridCommand`]s that the host
//! applies through the layout engine, and narrates each step through an
//! [`Announcer`]. [`LiveRegion`] is the stock announcer: a polite status
//! region whose messages expire after [`ANNOUNCEMENT_TTL`].

pub mod announcer;
pub mod keyboard;

pub use announcer::{ANNOUNCEMENT_TTL, Announcement, Announcer, LiveRegion, NoopAnnouncer};
pub use keyboard::{
    AriaProps, Direction, Effect, GridCommand, INSTRUCTIONS_ID, INSTRUCTIONS_TEXT,
    InteractionMode, KeyInput, KeyboardController, KeyboardState, TRANSITIONS, Transition,
    transition,
};
