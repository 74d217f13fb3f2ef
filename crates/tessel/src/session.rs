#![forbid(unsafe_code)]

//! Grid session: the container side of the data flow.
//!
//! A [`GridSession`] holds no copies of the items. Each call takes the
//! current ordered item slice, returns the position the caller should
//! commit, and queues a layout snapshot on the update scheduler. When the
//! scheduler fires, the snapshot is diffed against the last layout reported
//! and `on_item_move(id, position)` runs for the items that changed.
//!
//! ```text
//! key / pointer ─▶ KeyboardController ─┐
//!                                      ├─▶ validate ─▶ resolve ─▶ caller commits
//! request_move ────────────────────────┘                  │
//!                                         Debouncer ◀─────┘
//!                                             │ poll / flush
//!                                             ▼
//!                                    diff ─▶ on_item_move
//! ```
//!
//! # Invariants
//!
//! - Every returned position fits the active column count and `max_rows`.
//! - Items that are not draggable (resizable) never move (resize).
//! - `on_item_move` never sees an unchanged position twice in a row.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tessel_core::config::GridConfig;
use tessel_core::event::{Event, KeyEvent, PointerEvent, PointerEventKind};
use tessel_core::geometry::{CellMetrics, GridPosition, GridSize};
use tessel_core::item::{GridItem, ItemId, find_item};
use tessel_layout::{
    all_occupied_cells, compact_layout, find_first_available_position, find_valid_position,
    validate_position,
};
use tessel_runtime::debounce::{Debouncer, layout_debouncer};
use tessel_runtime::flip::{PositionSnapshot, capture_positions};
use tessel_widgets::{
    Announcer, AriaProps, GridCommand, InteractionMode, KeyboardController, LiveRegion,
};
use web_time::Instant;

/// Ordered `(id, position)` pairs describing a whole layout.
pub type LayoutSnapshot = Vec<(ItemId, GridPosition)>;

type SnapshotSlot = Rc<RefCell<Option<LayoutSnapshot>>>;
type Notify = Box<dyn FnMut(LayoutSnapshot)>;
type MoveListener = Box<dyn FnMut(&ItemId, GridPosition)>;

/// Outcome of a key handled by [`GridSession::handle_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The focused item should be committed at `position`.
    Moved { id: ItemId, position: GridPosition },
    /// The focused item should be committed at `position` with its new size.
    Resized { id: ItemId, position: GridPosition },
    Activated { id: ItemId },
    FocusChanged {
        from: Option<ItemId>,
        to: Option<ItemId>,
    },
    ModeChanged {
        item: Option<ItemId>,
        mode: InteractionMode,
    },
}

#[derive(Debug, Clone)]
struct DragState {
    id: ItemId,
    /// Cell offset of the pointer inside the item when the drag began.
    grab: (u16, u16),
    last_cell: (u16, u16),
    metrics: CellMetrics,
}

/// Wires the layout engine, the update scheduler and the keyboard
/// controller around a caller-owned item collection.
pub struct GridSession<A: Announcer = LiveRegion> {
    config: GridConfig,
    columns: u16,
    keyboard: KeyboardController<A>,
    scheduler: Debouncer<LayoutSnapshot, Notify>,
    pending: SnapshotSlot,
    reported: FxHashMap<ItemId, GridPosition>,
    on_item_move: Option<MoveListener>,
    drag: Option<DragState>,
}

impl<A: Announcer> fmt::Debug for GridSession<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridSession")
            .field("columns", &self.columns)
            .field("keyboard", &self.keyboard)
            .field("scheduler", &self.scheduler)
            .field("reported", &self.reported.len())
            .field("dragging", &self.drag.as_ref().map(|d| &d.id))
            .finish_non_exhaustive()
    }
}

impl GridSession<LiveRegion> {
    /// Session announcing through a [`LiveRegion`].
    pub fn new(config: GridConfig) -> Self {
        Self::with_announcer(config, LiveRegion::new())
    }
}

impl<A: Announcer> GridSession<A> {
    /// Session announcing through `announcer`. The config is validated first.
    pub fn with_announcer(config: GridConfig, announcer: A) -> Self {
        let config = config.validated();
        let pending = SnapshotSlot::default();
        let sink = Rc::clone(&pending);
        let notify: Notify = Box::new(move |snapshot: LayoutSnapshot| {
            *sink.borrow_mut() = Some(snapshot);
        });

        Self {
            columns: config.columns,
            keyboard: KeyboardController::from_config(&config, announcer),
            scheduler: layout_debouncer(notify, config.debounce()),
            pending,
            reported: FxHashMap::default(),
            on_item_move: None,
            drag: None,
            config,
        }
    }

    /// Listener for debounced position changes (builder pattern).
    #[must_use]
    pub fn on_item_move(mut self, f: impl FnMut(&ItemId, GridPosition) + 'static) -> Self {
        self.on_item_move = Some(Box::new(f));
        self
    }

    /// Treat `items` as already reported, so only later changes notify.
    #[must_use]
    pub fn with_baseline<C>(mut self, items: &[GridItem<C>]) -> Self {
        self.reported = items
            .iter()
            .map(|item| (item.id.clone(), item.position))
            .collect();
        self
    }

    #[inline]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Column count in effect after the last container resize.
    #[inline]
    pub fn columns(&self) -> u16 {
        self.columns
    }

    #[inline]
    pub fn keyboard(&self) -> &KeyboardController<A> {
        &self.keyboard
    }

    #[inline]
    pub fn keyboard_mut(&mut self) -> &mut KeyboardController<A> {
        &mut self.keyboard
    }

    #[inline]
    pub fn announcer(&self) -> &A {
        self.keyboard.announcer()
    }

    /// Pick the column count for a container `width` pixels wide.
    ///
    /// Returns `true` when the active breakpoint changed the column count.
    pub fn set_container_width(&mut self, width: u32) -> bool {
        let columns = self.config.columns_for(width);
        if columns == self.columns {
            return false;
        }
        tracing::debug!(
            target: "tessel.session",
            width,
            from = self.columns,
            to = columns,
            "column count changed"
        );
        self.columns = columns;
        self.keyboard.set_columns(columns);
        true
    }

    // -----------------------------------------------------------------------
    // Move and resize
    // -----------------------------------------------------------------------

    /// Validate and collision-resolve a move of item `id` to `position`.
    ///
    /// Returns the position to commit, or `None` when the item is unknown or
    /// not draggable. The resulting layout is queued for notification.
    pub fn request_move<C: Clone>(
        &mut self,
        items: &[GridItem<C>],
        id: &str,
        position: GridPosition,
        now: Instant,
    ) -> Option<GridPosition> {
        let item = find_item(items, id)?;
        if !item.is_draggable {
            tracing::debug!(
                target: "tessel.session",
                item_id = id,
                "move refused; item is not draggable"
            );
            return None;
        }
        Some(self.place(items, item, position, now))
    }

    /// Like [`request_move`](Self::request_move) for a new size.
    ///
    /// The size is clamped to the configured item bounds, then to the
    /// item's own `min_size` / `max_size`.
    pub fn request_resize<C: Clone>(
        &mut self,
        items: &[GridItem<C>],
        id: &str,
        position: GridPosition,
        now: Instant,
    ) -> Option<GridPosition> {
        let item = find_item(items, id)?;
        if !item.is_resizable {
            tracing::debug!(
                target: "tessel.session",
                item_id = id,
                "resize refused; item is not resizable"
            );
            return None;
        }
        let size = item.constrain_size(self.config.clamp_item_size(position.size()));
        Some(self.place(items, item, position.with_size(size), now))
    }

    fn place<C: Clone>(
        &mut self,
        items: &[GridItem<C>],
        item: &GridItem<C>,
        requested: GridPosition,
        now: Instant,
    ) -> GridPosition {
        let max_rows = self.config.max_rows;
        let validated = validate_position(requested, self.columns, Some(max_rows));
        let resolved = find_valid_position(&item.at(validated), items, self.columns, max_rows);

        tracing::debug!(
            target: "tessel.session",
            item_id = %item.id,
            x = resolved.x,
            y = resolved.y,
            width = resolved.width,
            height = resolved.height,
            displaced = resolved != validated,
            "placement resolved"
        );

        let snapshot = items
            .iter()
            .map(|other| {
                let position = if other.id == item.id {
                    resolved
                } else {
                    other.position
                };
                (other.id.clone(), position)
            })
            .collect();
        self.scheduler.call(snapshot, now);
        resolved
    }

    /// First free slot for a new item of `size` (clamped to the item bounds).
    pub fn insert_position<C>(&self, items: &[GridItem<C>], size: GridSize) -> GridPosition {
        let size = self.config.clamp_item_size(size);
        let occupied = all_occupied_cells(items);
        find_first_available_position(size, &occupied, self.columns, self.config.max_rows)
    }

    /// Gravity-compacted copy of `items` for the active column count.
    pub fn compact<C: Clone>(&self, items: &[GridItem<C>]) -> Vec<GridItem<C>> {
        compact_layout(items, self.columns)
    }

    // -----------------------------------------------------------------------
    // Keyboard
    // -----------------------------------------------------------------------

    /// Route a key event through the keyboard controller.
    ///
    /// Moves and resizes go through the same validation and resolution as
    /// [`request_move`](Self::request_move).
    pub fn handle_key<C: Clone>(
        &mut self,
        items: &[GridItem<C>],
        key: &KeyEvent,
        now: Instant,
    ) -> Option<SessionEvent> {
        let command = self.keyboard.handle_key(key, items, now)?;
        let event = match command {
            GridCommand::Move { id, position } => {
                let position = self.request_move(items, id.as_str(), position, now)?;
                SessionEvent::Moved { id, position }
            }
            GridCommand::Resize { id, position } => {
                let position = self.request_resize(items, id.as_str(), position, now)?;
                SessionEvent::Resized { id, position }
            }
            GridCommand::Activate { id } => SessionEvent::Activated { id },
            GridCommand::FocusChanged { from, to } => SessionEvent::FocusChanged { from, to },
            GridCommand::ModeChanged { item, mode } => SessionEvent::ModeChanged { item, mode },
        };
        Some(event)
    }

    /// Host-side focus (click, programmatic).
    pub fn focus(&mut self, id: impl Into<ItemId>) {
        self.keyboard.focus(id);
    }

    pub fn aria_props<C>(&self, items: &[GridItem<C>], id: &str) -> Option<AriaProps> {
        self.keyboard.aria_props(items, id)
    }

    // -----------------------------------------------------------------------
    // Pointer drag
    // -----------------------------------------------------------------------

    /// Start dragging item `id` from pointer `(px, py)`, relative to the
    /// grid origin.
    ///
    /// Returns `false` (and starts nothing) for unknown or locked items.
    pub fn begin_drag<C>(
        &mut self,
        items: &[GridItem<C>],
        id: &str,
        px: f64,
        py: f64,
        metrics: CellMetrics,
    ) -> bool {
        let Some(item) = find_item(items, id).filter(|item| item.is_draggable) else {
            return false;
        };
        let cell = metrics.cell_at(px, py);
        let grab = (
            cell.0.saturating_sub(item.position.x),
            cell.1.saturating_sub(item.position.y),
        );
        tracing::trace!(
            target: "tessel.session",
            item_id = id,
            col = cell.0,
            row = cell.1,
            "drag started"
        );
        self.drag = Some(DragState {
            id: item.id.clone(),
            grab,
            last_cell: cell,
            metrics,
        });
        true
    }

    /// Pointer moved during a drag.
    ///
    /// Returns the position to commit when the pointer crossed into a new
    /// cell, `None` otherwise.
    pub fn drag_to<C: Clone>(
        &mut self,
        items: &[GridItem<C>],
        px: f64,
        py: f64,
        now: Instant,
    ) -> Option<GridPosition> {
        let drag = self.drag.as_mut()?;
        let cell = drag.metrics.cell_at(px, py);
        if cell == drag.last_cell {
            return None;
        }
        drag.last_cell = cell;
        let x = cell.0.saturating_sub(drag.grab.0);
        let y = cell.1.saturating_sub(drag.grab.1);
        let id = drag.id.clone();

        let item = find_item(items, id.as_str())?;
        Some(self.place(items, item, item.position.with_origin(x, y), now))
    }

    /// Finish the drag and deliver any pending layout change immediately.
    pub fn end_drag(&mut self, now: Instant) -> Vec<(ItemId, GridPosition)> {
        let Some(drag) = self.drag.take() else {
            return Vec::new();
        };
        tracing::trace!(target: "tessel.session", item_id = %drag.id, "drag ended");
        self.flush(now)
    }

    /// Translate a pointer event into drag calls.
    ///
    /// `Down` hit-tests the cell under the pointer and starts dragging the
    /// item there. `Drag` reports the new position when the pointer crosses
    /// a cell. `Up` flushes the pending layout change; `Cancel` leaves it
    /// queued.
    pub fn handle_pointer<C: Clone>(
        &mut self,
        items: &[GridItem<C>],
        event: &PointerEvent,
        metrics: CellMetrics,
        now: Instant,
    ) -> Option<SessionEvent> {
        match event.kind {
            PointerEventKind::Down => {
                let (col, row) = metrics.cell_at(event.x, event.y);
                let hit = items.iter().find(|item| item.position.contains(col, row))?;
                let id = hit.id.clone();
                self.begin_drag(items, id.as_str(), event.x, event.y, metrics);
                None
            }
            PointerEventKind::Drag => {
                let position = self.drag_to(items, event.x, event.y, now)?;
                let id = self.dragged_item()?.clone();
                Some(SessionEvent::Moved { id, position })
            }
            PointerEventKind::Up => {
                self.end_drag(now);
                None
            }
            PointerEventKind::Cancel => {
                if let Some(drag) = self.drag.take() {
                    tracing::trace!(target: "tessel.session", item_id = %drag.id, "drag cancelled");
                }
                None
            }
        }
    }

    /// Dispatch any input event.
    pub fn handle_event<C: Clone>(
        &mut self,
        items: &[GridItem<C>],
        event: &Event,
        metrics: CellMetrics,
        now: Instant,
    ) -> Option<SessionEvent> {
        match event {
            Event::Key(key) => self.handle_key(items, key, now),
            Event::Pointer(pointer) => self.handle_pointer(items, pointer, metrics, now),
        }
    }

    #[inline]
    pub fn dragged_item(&self) -> Option<&ItemId> {
        self.drag.as_ref().map(|drag| &drag.id)
    }

    // -----------------------------------------------------------------------
    // Notification
    // -----------------------------------------------------------------------

    /// Drive the scheduler. Returns the changes delivered to `on_item_move`.
    pub fn poll(&mut self, now: Instant) -> Vec<(ItemId, GridPosition)> {
        if self.scheduler.poll(now) {
            self.deliver()
        } else {
            Vec::new()
        }
    }

    /// Deliver a pending layout change now.
    pub fn flush(&mut self, now: Instant) -> Vec<(ItemId, GridPosition)> {
        if self.scheduler.flush(now) {
            self.deliver()
        } else {
            Vec::new()
        }
    }

    /// Drop a pending layout change without delivering it.
    pub fn cancel_pending(&mut self) {
        self.scheduler.cancel();
        self.pending.borrow_mut().take();
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// When [`poll`](Self::poll) should next be called.
    #[inline]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    fn deliver(&mut self) -> Vec<(ItemId, GridPosition)> {
        let Some(snapshot) = self.pending.borrow_mut().take() else {
            return Vec::new();
        };

        let mut changed = Vec::new();
        let mut next = FxHashMap::default();
        for (id, position) in snapshot {
            if self.reported.get(&id) != Some(&position) {
                changed.push((id.clone(), position));
            }
            next.insert(id, position);
        }
        self.reported = next;

        tracing::debug!(
            target: "tessel.session",
            changed = changed.len(),
            "layout change delivered"
        );
        if let Some(listener) = self.on_item_move.as_mut() {
            for (id, position) in &changed {
                listener(id, *position);
            }
        }
        changed
    }
}

/// Pixel rectangles of `items` under `metrics`, ready for a FLIP capture.
pub fn capture_layout<C>(items: &[GridItem<C>], metrics: &CellMetrics) -> PositionSnapshot {
    capture_positions(
        items
            .iter()
            .map(|item| (item.id.clone(), metrics.rect_for(&item.position))),
    )
}
