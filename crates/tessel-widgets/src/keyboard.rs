#![forbid(unsafe_code)]

//! Keyboard interaction over a grid.
//!
//! The controller is a three-mode state machine driven by a data table.
//! It tracks which item has focus and which mode is active, turns key
//! events into [`GridCommand`]s, and announces every mode change, move and
//! resize through an injected [`Announcer`].
//!
//! # State Machine
//!
//! ```text
//!                 'm' (focused, draggable)
//!   ┌──────────┐ ─────────────────────────▶ ┌──────┐
//!   │          │ ◀───────────────────────── │ Move │ ◀─┐ arrows: nudge ±1
//!   │ Navigate │          Escape            └──────┘ ──┘
//!   │          │ ─────────────────────────▶ ┌────────┐
//!   └──────────┘ ◀───────────────────────── │ Resize │ ◀─┐ + / -: grow, shrink
//!    ▲   │  Tab, arrows: focus   Escape     └────────┘ ──┘
//!    └───┘  Enter, Space: activate
//! ```
//!
//! The full table is [`TRANSITIONS`]; [`transition`] looks up one row.
//!
//! # Invariants
//!
//! - Only [`Escape`](KeyInput::Escape) leaves Move or Resize.
//! - Move and Resize always have a focused item.
//! - Nudges never drive `x` or `y` below 0.
//! - Growing never pushes the right edge past the grid's columns.
//! - Shrinking never goes below 1×1.
//!
//! # Roving focus
//!
//! Exactly one item is in the tab order ([`AriaProps::tab_index`] 0): the
//! focused item, or the first item while nothing is focused.

use std::fmt;

use tessel_core::config::GridConfig;
use tessel_core::event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
use tessel_core::geometry::{DEFAULT_COLUMNS, GridPosition};
use tessel_core::item::{GridItem, ItemId, find_item};
use web_time::Instant;

use crate::announcer::Announcer;

/// Element id of the visually hidden usage instructions.
pub const INSTRUCTIONS_ID: &str = "grid-instructions";

/// Text for the instructions element.
pub const INSTRUCTIONS_TEXT: &str = "Use Tab to move between items. Press M to move the focused \
item with the arrow keys, R to resize it with plus and minus, Enter or Space to activate it, \
and Escape to return to navigation.";

// ---------------------------------------------------------------------------
// Modes and inputs
// ---------------------------------------------------------------------------

/// Interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionMode {
    /// Focus moves between items.
    #[default]
    Navigate,
    /// Arrow keys move the focused item.
    Move,
    /// Plus and minus resize the focused item.
    Resize,
}

impl InteractionMode {
    pub const ALL: [Self; 3] = [Self::Navigate, Self::Move, Self::Resize];
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Navigate => "navigate",
            Self::Move => "move",
            Self::Resize => "resize",
        })
    }
}

/// A cardinal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A key event reduced to what the state machine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyInput {
    Tab,
    BackTab,
    Arrow(Direction),
    /// `m`
    MoveKey,
    /// `r`
    ResizeKey,
    /// `+` or `=`
    Grow,
    /// `-` or `_`
    Shrink,
    /// Enter or Space
    Activate,
    Escape,
}

impl KeyInput {
    pub const ALL: [Self; 12] = [
        Self::Tab,
        Self::BackTab,
        Self::Arrow(Direction::Up),
        Self::Arrow(Direction::Down),
        Self::Arrow(Direction::Left),
        Self::Arrow(Direction::Right),
        Self::MoveKey,
        Self::ResizeKey,
        Self::Grow,
        Self::Shrink,
        Self::Activate,
        Self::Escape,
    ];

    /// Classify a key event. Releases and chords with Ctrl, Alt or Super
    /// map to `None`.
    pub fn from_key(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.is_back_tab() {
            return Some(Self::BackTab);
        }
        if key.is_chord() {
            return None;
        }
        Some(match key.code {
            KeyCode::Tab => Self::Tab,
            KeyCode::Up => Self::Arrow(Direction::Up),
            KeyCode::Down => Self::Arrow(Direction::Down),
            KeyCode::Left => Self::Arrow(Direction::Left),
            KeyCode::Right => Self::Arrow(Direction::Right),
            KeyCode::Enter | KeyCode::Char(' ') => Self::Activate,
            KeyCode::Escape => Self::Escape,
            KeyCode::Char('m') => Self::MoveKey,
            KeyCode::Char('r') => Self::ResizeKey,
            KeyCode::Char('+' | '=') => Self::Grow,
            KeyCode::Char('-' | '_') => Self::Shrink,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// What a transition does besides changing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FocusNext,
    FocusPrevious,
    /// Clear focus without a mode change.
    ClearFocus,
    EnterMove,
    EnterResize,
    /// Leave Move or Resize, clearing focus.
    ExitToNavigate,
    Nudge(Direction),
    Grow,
    Shrink,
    Activate,
}

impl Effect {
    /// Whether the effect acts on the focused item.
    pub const fn needs_focus(self) -> bool {
        !matches!(
            self,
            Self::FocusNext | Self::FocusPrevious | Self::ClearFocus | Self::ExitToNavigate
        )
    }
}

/// One row of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: InteractionMode,
    pub input: KeyInput,
    pub to: InteractionMode,
    pub effect: Effect,
}

const fn row(
    from: InteractionMode,
    input: KeyInput,
    to: InteractionMode,
    effect: Effect,
) -> Transition {
    Transition {
        from,
        input,
        to,
        effect,
    }
}

use Direction::{Down, Left, Right, Up};
use InteractionMode::{Move, Navigate, Resize};

/// Every transition. Inputs without a row are ignored in that mode.
pub const TRANSITIONS: &[Transition] = &[
    row(Navigate, KeyInput::Tab, Navigate, Effect::FocusNext),
    row(Navigate, KeyInput::BackTab, Navigate, Effect::FocusPrevious),
    row(Navigate, KeyInput::Arrow(Down), Navigate, Effect::FocusNext),
    row(Navigate, KeyInput::Arrow(Right), Navigate, Effect::FocusNext),
    row(Navigate, KeyInput::Arrow(Up), Navigate, Effect::FocusPrevious),
    row(Navigate, KeyInput::Arrow(Left), Navigate, Effect::FocusPrevious),
    row(Navigate, KeyInput::MoveKey, Move, Effect::EnterMove),
    row(Navigate, KeyInput::ResizeKey, Resize, Effect::EnterResize),
    row(Navigate, KeyInput::Activate, Navigate, Effect::Activate),
    row(Navigate, KeyInput::Escape, Navigate, Effect::ClearFocus),
    row(Move, KeyInput::Arrow(Up), Move, Effect::Nudge(Up)),
    row(Move, KeyInput::Arrow(Down), Move, Effect::Nudge(Down)),
    row(Move, KeyInput::Arrow(Left), Move, Effect::Nudge(Left)),
    row(Move, KeyInput::Arrow(Right), Move, Effect::Nudge(Right)),
    row(Move, KeyInput::Escape, Navigate, Effect::ExitToNavigate),
    row(Resize, KeyInput::Grow, Resize, Effect::Grow),
    row(Resize, KeyInput::Shrink, Resize, Effect::Shrink),
    row(Resize, KeyInput::Escape, Navigate, Effect::ExitToNavigate),
];

/// The row for `(from, input)`, if any.
pub fn transition(from: InteractionMode, input: KeyInput) -> Option<&'static Transition> {
    TRANSITIONS
        .iter()
        .find(|t| t.from == from && t.input == input)
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Focus and mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    pub focused_item_id: Option<ItemId>,
    pub mode: InteractionMode,
}

impl KeyboardState {
    /// Back to no focus in Navigate mode.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of a handled key, for the host to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCommand {
    /// Focus moved. `to` is `None` when focus was cleared.
    FocusChanged {
        from: Option<ItemId>,
        to: Option<ItemId>,
    },
    /// The mode changed.
    ModeChanged {
        item: Option<ItemId>,
        mode: InteractionMode,
    },
    /// The focused item should move to `position`.
    Move { id: ItemId, position: GridPosition },
    /// The focused item should take `position` (same origin, new size).
    Resize { id: ItemId, position: GridPosition },
    /// The focused item was activated.
    Activate { id: ItemId },
}

/// ARIA attributes for one grid item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AriaProps {
    pub label: String,
    pub described_by: Option<&'static str>,
    pub tab_index: i32,
    pub role: &'static str,
}

/// Keyboard state machine over a grid.
pub struct KeyboardController<A: Announcer> {
    state: KeyboardState,
    columns: u16,
    enabled: bool,
    announcer: A,
}

impl<A: Announcer> fmt::Debug for KeyboardController<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyboardController")
            .field("state", &self.state)
            .field("columns", &self.columns)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl<A: Announcer> KeyboardController<A> {
    /// Controller for a 12-column grid.
    pub fn new(announcer: A) -> Self {
        Self {
            state: KeyboardState::default(),
            columns: DEFAULT_COLUMNS,
            enabled: true,
            announcer,
        }
    }

    /// Controller using the columns and keyboard switch of `config`.
    pub fn from_config(config: &GridConfig, announcer: A) -> Self {
        Self {
            state: KeyboardState::default(),
            columns: config.columns.max(1),
            enabled: config.enable_keyboard_nav,
            announcer,
        }
    }

    /// Set the column count used to bound growth (builder pattern).
    #[must_use]
    pub fn columns(mut self, columns: u16) -> Self {
        self.columns = columns.max(1);
        self
    }

    /// Update the column count, e.g. after a breakpoint change.
    pub fn set_columns(&mut self, columns: u16) {
        self.columns = columns.max(1);
    }

    #[inline]
    pub fn state(&self) -> &KeyboardState {
        &self.state
    }

    #[inline]
    pub fn mode(&self) -> InteractionMode {
        self.state.mode
    }

    #[inline]
    pub fn focused(&self) -> Option<&ItemId> {
        self.state.focused_item_id.as_ref()
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn keyboard handling on or off. Turning it off resets the state.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.state.reset();
        }
        self.enabled = enabled;
    }

    #[inline]
    pub fn announcer(&self) -> &A {
        &self.announcer
    }

    #[inline]
    pub fn announcer_mut(&mut self) -> &mut A {
        &mut self.announcer
    }

    /// Record that `id` received focus from the host (click, programmatic).
    ///
    /// Ignored while disabled or while Move/Resize is active on another item.
    pub fn focus(&mut self, id: impl Into<ItemId>) {
        if !self.enabled {
            return;
        }
        let id = id.into();
        if self.state.mode != InteractionMode::Navigate
            && self.state.focused_item_id.as_ref() != Some(&id)
        {
            return;
        }
        self.state.focused_item_id = Some(id);
    }

    /// Drop focus and return to Navigate, as on unmount.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Feed one key event.
    ///
    /// Returns the command the host should apply, or `None` when the key
    /// means nothing in the current state.
    pub fn handle_key<C>(
        &mut self,
        key: &KeyEvent,
        items: &[GridItem<C>],
        now: Instant,
    ) -> Option<GridCommand> {
        if !self.enabled {
            return None;
        }
        let input = KeyInput::from_key(key)?;

        // The focused item vanished from under an active mode.
        if self.state.mode != InteractionMode::Navigate && self.focused_item(items).is_none() {
            tracing::debug!(
                target: "tessel.keyboard",
                mode = %self.state.mode,
                "focused item gone; resetting to navigate"
            );
            self.state.reset();
        }

        let row = transition(self.state.mode, input)?;
        let focused = if row.effect.needs_focus() {
            Some(self.focused_item(items)?)
        } else {
            None
        };

        tracing::trace!(
            target: "tessel.keyboard",
            from = %row.from,
            to = %row.to,
            ?input,
            "key transition"
        );

        match (row.effect, focused) {
            (Effect::FocusNext, _) => self.move_focus(items, true),
            (Effect::FocusPrevious, _) => self.move_focus(items, false),
            (Effect::ClearFocus, _) => {
                let from = self.state.focused_item_id.take()?;
                Some(GridCommand::FocusChanged {
                    from: Some(from),
                    to: None,
                })
            }
            (Effect::ExitToNavigate, _) => {
                let item = self.state.focused_item_id.take();
                self.state.mode = InteractionMode::Navigate;
                self.announcer.announce("Returned to navigation mode", now);
                tracing::debug!(target: "tessel.keyboard", "returned to navigate mode");
                Some(GridCommand::ModeChanged {
                    item,
                    mode: InteractionMode::Navigate,
                })
            }
            (Effect::EnterMove, Some(item)) => {
                if !item.is_draggable {
                    tracing::debug!(
                        target: "tessel.keyboard",
                        item_id = %item.id,
                        "item is not draggable"
                    );
                    return None;
                }
                self.enter_mode(item.id.clone(), row.to, now)
            }
            (Effect::EnterResize, Some(item)) => {
                if !item.is_resizable {
                    tracing::debug!(
                        target: "tessel.keyboard",
                        item_id = %item.id,
                        "item is not resizable"
                    );
                    return None;
                }
                self.enter_mode(item.id.clone(), row.to, now)
            }
            (Effect::Nudge(direction), Some(item)) => {
                let position = nudge(item.position, direction);
                self.announcer.announce(
                    &format!("Moved item to position ({}, {})", position.x, position.y),
                    now,
                );
                Some(GridCommand::Move {
                    id: item.id.clone(),
                    position,
                })
            }
            (Effect::Grow, Some(item)) => {
                let position = grow(item.position, self.columns);
                Some(self.resized(item.id.clone(), position, now))
            }
            (Effect::Shrink, Some(item)) => {
                let position = shrink(item.position);
                Some(self.resized(item.id.clone(), position, now))
            }
            (Effect::Activate, Some(item)) => {
                self.announcer
                    .announce(&format!("Activated item {}", item.id), now);
                Some(GridCommand::Activate {
                    id: item.id.clone(),
                })
            }
            (_, None) => None,
        }
    }

    /// ARIA attributes for item `id`, or `None` if it is not in `items`.
    pub fn aria_props<C>(&self, items: &[GridItem<C>], id: &str) -> Option<AriaProps> {
        let item = find_item(items, id)?;
        let is_focused = self.focused().is_some_and(|f| f.as_str() == id);
        let focus_target = match self.focused_item(items) {
            Some(focused) => focused.id.as_str() == id,
            None => items.first().is_some_and(|first| first.id.as_str() == id),
        };

        Some(AriaProps {
            label: format!(
                "Grid item {}, size {} by {}",
                item.id, item.position.width, item.position.height
            ),
            described_by: is_focused.then_some(INSTRUCTIONS_ID),
            tab_index: if self.enabled && focus_target { 0 } else { -1 },
            role: "gridcell",
        })
    }

    fn focused_item<'a, C>(&self, items: &'a [GridItem<C>]) -> Option<&'a GridItem<C>> {
        let id = self.state.focused_item_id.as_ref()?;
        find_item(items, id.as_str())
    }

    fn move_focus<C>(&mut self, items: &[GridItem<C>], forward: bool) -> Option<GridCommand> {
        let len = items.len();
        if len == 0 {
            return None;
        }
        let current = self
            .state
            .focused_item_id
            .as_ref()
            .and_then(|id| items.iter().position(|item| item.id == *id));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        let to = items[next].id.clone();
        let from = self.state.focused_item_id.replace(to.clone());
        Some(GridCommand::FocusChanged { from, to: Some(to) })
    }

    fn enter_mode(
        &mut self,
        id: ItemId,
        mode: InteractionMode,
        now: Instant,
    ) -> Option<GridCommand> {
        self.state.mode = mode;
        let message = match mode {
            InteractionMode::Move => "Move mode activated. Use arrow keys to move the item.",
            InteractionMode::Resize => "Resize mode activated. Use + and - keys to resize.",
            InteractionMode::Navigate => "Returned to navigation mode",
        };
        self.announcer.announce(message, now);
        tracing::debug!(target: "tessel.keyboard", item_id = %id, %mode, "mode entered");
        Some(GridCommand::ModeChanged {
            item: Some(id),
            mode,
        })
    }

    fn resized(&mut self, id: ItemId, position: GridPosition, now: Instant) -> GridCommand {
        self.announcer.announce(
            &format!("Resized item to {}×{}", position.width, position.height),
            now,
        );
        GridCommand::Resize { id, position }
    }
}

/// Shift by one cell, saturating at 0.
fn nudge(position: GridPosition, direction: Direction) -> GridPosition {
    let GridPosition { x, y, .. } = position;
    match direction {
        Direction::Up => position.with_origin(x, y.saturating_sub(1)),
        Direction::Down => position.with_origin(x, y.saturating_add(1)),
        Direction::Left => position.with_origin(x.saturating_sub(1), y),
        Direction::Right => position.with_origin(x.saturating_add(1), y),
    }
}

/// One cell larger on both axes, width capped at the grid's right edge.
fn grow(position: GridPosition, columns: u16) -> GridPosition {
    let room = columns.saturating_sub(position.x);
    let mut grown = position;
    grown.width = position.width.saturating_add(1).min(room).max(1);
    grown.height = position.height.saturating_add(1);
    grown
}

/// One cell smaller on both axes, floored at 1.
fn shrink(position: GridPosition) -> GridPosition {
    let mut shrunk = position;
    shrunk.width = position.width.saturating_sub(1).max(1);
    shrunk.height = position.height.saturating_sub(1).max(1);
    shrunk
}
