#![forbid(unsafe_code)]

//! Input the grid reacts to.
//!
//! A host maps its native keyboard and pointer events onto these types and
//! feeds them to a keyboard controller or a grid session. Only the keys the
//! grid interaction model uses have a [`KeyCode`]; hosts drop the rest
//! before they get here.
//!
//! Shift+Tab arrives either as `Tab` with [`Modifiers::SHIFT`] or as
//! [`KeyCode::BackTab`], depending on the host. [`KeyEvent::is_back_tab`]
//! treats both the same.
//!
//! Pointer coordinates are pixels measured from the grid's top-left corner.
//! They go negative when the pointer leaves the grid up or to the left.

use bitflags::bitflags;

/// Keyboard or pointer input.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(KeyEvent),
    Pointer(PointerEvent),
}

/// One key transition with the modifiers held at the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A press of `code` with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
            kind: KeyEventKind::Press,
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Shift+Tab in either encoding.
    #[must_use]
    pub fn is_back_tab(&self) -> bool {
        match self.code {
            KeyCode::BackTab => true,
            KeyCode::Tab => self.modifiers.contains(Modifiers::SHIFT),
            _ => false,
        }
    }

    /// Whether a command modifier (Ctrl, Alt or Super) is held.
    ///
    /// Chords belong to the host's shortcuts, not to grid interaction.
    #[must_use]
    pub const fn is_chord(&self) -> bool {
        self.modifiers.intersects(Modifiers::COMMAND)
    }
}

/// Keys that take part in grid interaction.
///
/// Letters and symbols (`m`, `r`, `+`, `=`, `-`, `_`, space) arrive as
/// [`KeyCode::Char`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Up,
    Down,
    Left,
    Right,
}

/// Press, auto-repeat or release.
///
/// Hosts that cannot tell them apart report `Press`. Holding an arrow key
/// in move mode produces a stream of `Repeat`s, one cell each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
        /// Command on macOS, the Windows key elsewhere.
        const SUPER = 1 << 3;
        /// Any modifier that turns a key into a host shortcut.
        const COMMAND = Self::ALT.bits() | Self::CTRL.bits() | Self::SUPER.bits();
    }
}

/// Primary-button pointer input, in pixels from the grid origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub x: f64,
    pub y: f64,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    #[must_use]
    pub const fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::empty(),
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Primary button went down.
    Down,
    /// Pointer moved with the button held.
    Drag,
    /// Button released; the gesture commits.
    Up,
    /// The host aborted the gesture (capture lost, window blurred).
    Cancel,
}
