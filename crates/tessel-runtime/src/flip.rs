#![forbid(unsafe_code)]

//! FLIP (First, Last, Invert, Play) transitions for layout changes.
//!
//! A layout change makes items jump. FLIP turns the jump into motion:
//!
//! 1. **First**: [`capture_positions`] records every item's rectangle.
//! 2. **Last**: the caller commits the new layout and measures again.
//! 3. **Invert**: [`FlipAnimator::animate_items`] computes
//!    `old.top_left - new.top_left` per item.
//! 4. **Play**: a [`TransformPlayer`] animates `translate(delta)` back to
//!    `translate(0)`.
//!
//! # Invariants
//!
//! - The first snapshot must be taken before the layout mutation it pairs
//!   with. Taken after, every delta is zero and nothing animates.
//! - At most one animation per item. Starting another cancels the previous
//!   one (no queueing).
//! - Deltas below 0.1px on both axes are skipped.
//! - The completion callback fires on natural finish only, never on
//!   cancellation.
//!
//! # Playback
//!
//! [`TransformPlayer`] is the renderer seam: web hosts forward `play` to a
//! native animation and report the outcome back through
//! [`FlipAnimator::report`]. [`TweenPlayer`] is the built-in player for
//! hosts that redraw every frame; drive it with [`FlipAnimator::tick`].

use std::fmt;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tessel_core::config::GridConfig;
use tessel_core::geometry::{Offset, PixelRect};
use tessel_core::item::ItemId;

pub use tessel_core::easing::Easing as FlipEasing;

/// Deltas smaller than this on both axes are not animated.
pub const FLIP_EPSILON: f64 = 0.1;

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Item rectangles keyed by id, in capture order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionSnapshot {
    entries: Vec<(ItemId, PixelRect)>,
    index: FxHashMap<ItemId, usize>,
}

impl PositionSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rectangle, replacing any earlier one for the same id.
    pub fn insert(&mut self, id: ItemId, rect: PixelRect) {
        match self.index.get(&id) {
            Some(&i) => self.entries[i].1 = rect,
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, rect));
            }
        }
    }

    /// Rectangle recorded for `id`.
    pub fn get(&self, id: &str) -> Option<&PixelRect> {
        self.index.get(id).map(|&i| &self.entries[i].1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &PixelRect)> {
        self.entries.iter().map(|(id, rect)| (id, rect))
    }
}

impl FromIterator<(ItemId, PixelRect)> for PositionSnapshot {
    fn from_iter<I: IntoIterator<Item = (ItemId, PixelRect)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (id, rect) in iter {
            snapshot.insert(id, rect);
        }
        snapshot
    }
}

/// Record each item's current rectangle.
///
/// Call this before the layout mutation it pairs with.
pub fn capture_positions<I, K>(rects: I) -> PositionSnapshot
where
    I: IntoIterator<Item = (K, PixelRect)>,
    K: Into<ItemId>,
{
    rects.into_iter().map(|(id, rect)| (id.into(), rect)).collect()
}

// ---------------------------------------------------------------------------
// Player capability
// ---------------------------------------------------------------------------

/// Handle to one playing transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackId(pub u64);

/// How a playback ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Ran to its end.
    Completed,
    /// Stopped before its end.
    Cancelled,
}

/// Something that can play a translate transform on an item.
pub trait TransformPlayer {
    /// Start animating `item` from `from` to `to`.
    fn play(
        &mut self,
        item: &ItemId,
        from: Offset,
        to: Offset,
        duration: Duration,
        easing: FlipEasing,
    ) -> PlaybackId;

    /// Stop a playback. Unknown or finished ids are ignored.
    fn cancel(&mut self, playback: PlaybackId);
}

#[derive(Debug, Clone)]
struct Tween {
    item: ItemId,
    from: Offset,
    to: Offset,
    duration: Duration,
    elapsed: Duration,
    easing: FlipEasing,
}

impl Tween {
    fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    fn offset(&self) -> Offset {
        self.from.lerp(self.to, self.easing.apply(self.progress()))
    }
}

/// Frame-driven player: evaluates each transform's eased offset on demand.
#[derive(Debug, Default)]
pub struct TweenPlayer {
    tweens: FxHashMap<PlaybackId, Tween>,
    next_id: u64,
}

impl TweenPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every tween by `dt`, returning the ones that finished in
    /// ascending id order.
    pub fn tick(&mut self, dt: Duration) -> Vec<PlaybackId> {
        let mut finished = Vec::new();
        for (&id, tween) in &mut self.tweens {
            tween.elapsed = tween.elapsed.saturating_add(dt);
            if tween.elapsed >= tween.duration {
                finished.push(id);
            }
        }
        finished.sort_unstable();
        for id in &finished {
            self.tweens.remove(id);
        }
        finished
    }

    /// Current transform of `item`, if it is animating.
    pub fn offset_of(&self, item: &str) -> Option<Offset> {
        self.tweens
            .values()
            .find(|t| t.item.as_str() == item)
            .map(Tween::offset)
    }

    /// Number of running tweens.
    #[inline]
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }
}

impl TransformPlayer for TweenPlayer {
    fn play(
        &mut self,
        item: &ItemId,
        from: Offset,
        to: Offset,
        duration: Duration,
        easing: FlipEasing,
    ) -> PlaybackId {
        self.next_id += 1;
        let id = PlaybackId(self.next_id);
        self.tweens.insert(
            id,
            Tween {
                item: item.clone(),
                from,
                to,
                duration,
                elapsed: Duration::ZERO,
                easing,
            },
        );
        id
    }

    fn cancel(&mut self, playback: PlaybackId) {
        self.tweens.remove(&playback);
    }
}

// ---------------------------------------------------------------------------
// Animator
// ---------------------------------------------------------------------------

/// One tracked transition.
#[derive(Debug, Clone, PartialEq)]
pub struct FlipAnimation {
    pub item_id: ItemId,
    pub from_rect: PixelRect,
    pub to_rect: PixelRect,
    /// `from_rect.top_left - to_rect.top_left`.
    pub delta: Offset,
    pub duration: Duration,
    pub easing: FlipEasing,
    pub playback: PlaybackId,
}

/// The items started by one [`FlipAnimator::animate_items`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlipBatch {
    entries: Vec<(ItemId, PlaybackId)>,
}

impl FlipBatch {
    /// Items animated by this batch, in snapshot order.
    pub fn items(&self) -> impl Iterator<Item = &ItemId> {
        self.entries.iter().map(|(id, _)| id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

type CompletionFn = Box<dyn FnMut(&ItemId)>;

/// Orchestrates FLIP transitions over a [`TransformPlayer`].
pub struct FlipAnimator<P: TransformPlayer> {
    player: P,
    duration: Duration,
    easing: FlipEasing,
    enabled: bool,
    active: FxHashMap<ItemId, FlipAnimation>,
    on_complete: Option<CompletionFn>,
}

impl<P: TransformPlayer + fmt::Debug> fmt::Debug for FlipAnimator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlipAnimator")
            .field("player", &self.player)
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("enabled", &self.enabled)
            .field("active", &self.active.len())
            .finish()
    }
}

impl<P: TransformPlayer> FlipAnimator<P> {
    /// Create an animator with the default 200ms standard-curve transition.
    pub fn new(player: P) -> Self {
        Self::from_config(&GridConfig::default(), player)
    }

    /// Create an animator using the timing and easing of `config`.
    pub fn from_config(config: &GridConfig, player: P) -> Self {
        Self {
            player,
            duration: config.animation_duration(),
            easing: config.easing,
            enabled: config.enable_animations,
            active: FxHashMap::default(),
            on_complete: None,
        }
    }

    /// Set the transition duration (builder pattern).
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: FlipEasing) -> Self {
        self.easing = easing;
        self
    }

    /// Register a callback for naturally finished animations (builder pattern).
    #[must_use]
    pub fn on_complete(mut self, f: impl FnMut(&ItemId) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Enable or disable animation. Disabling cancels running animations.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.cancel_all_animations();
        }
        self.enabled = enabled;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The underlying player.
    #[inline]
    pub fn player(&self) -> &P {
        &self.player
    }

    /// Animate every item present in both snapshots whose top-left moved.
    pub fn animate_items(
        &mut self,
        old: &PositionSnapshot,
        current: &PositionSnapshot,
    ) -> FlipBatch {
        let mut batch = FlipBatch::default();
        if !self.enabled {
            return batch;
        }

        let mut skipped = 0usize;
        for (id, new_rect) in current.iter() {
            let Some(old_rect) = old.get(id.as_str()) else {
                continue;
            };
            let delta = old_rect.delta_from(new_rect);
            if delta.is_negligible(FLIP_EPSILON) {
                skipped += 1;
                continue;
            }

            if let Some(previous) = self.active.remove(id) {
                self.player.cancel(previous.playback);
                tracing::trace!(
                    target: "tessel.flip",
                    item_id = %id,
                    "superseding running animation"
                );
            }

            let playback = self
                .player
                .play(id, delta, Offset::ZERO, self.duration, self.easing);
            self.active.insert(
                id.clone(),
                FlipAnimation {
                    item_id: id.clone(),
                    from_rect: *old_rect,
                    to_rect: *new_rect,
                    delta,
                    duration: self.duration,
                    easing: self.easing,
                    playback,
                },
            );
            batch.entries.push((id.clone(), playback));
        }

        tracing::debug!(
            target: "tessel.flip",
            started = batch.len(),
            skipped,
            duration_ms = self.duration.as_millis() as u64,
            "flip batch started"
        );
        batch
    }

    /// Stop every animation without firing completion callbacks.
    pub fn cancel_all_animations(&mut self) {
        if self.active.is_empty() {
            return;
        }
        let cancelled = self.active.len();
        for (_, animation) in self.active.drain() {
            self.player.cancel(animation.playback);
        }
        tracing::debug!(target: "tessel.flip", cancelled, "flip animations cancelled");
    }

    /// Record how a playback ended.
    ///
    /// Stale ids (superseded or already cancelled) are ignored.
    pub fn report(&mut self, playback: PlaybackId, outcome: PlaybackOutcome) {
        let Some(item_id) = self
            .active
            .iter()
            .find(|(_, a)| a.playback == playback)
            .map(|(id, _)| id.clone())
        else {
            return;
        };
        self.active.remove(&item_id);

        match outcome {
            PlaybackOutcome::Completed => {
                tracing::trace!(target: "tessel.flip", item_id = %item_id, "flip completed");
                if let Some(callback) = self.on_complete.as_mut() {
                    callback(&item_id);
                }
            }
            PlaybackOutcome::Cancelled => {
                tracing::trace!(
                    target: "tessel.flip",
                    item_id = %item_id,
                    "flip cancelled by host"
                );
            }
        }
    }

    /// Whether every animation of `batch` has ended.
    pub fn batch_complete(&self, batch: &FlipBatch) -> bool {
        batch.entries.iter().all(|(id, playback)| {
            self.active
                .get(id)
                .is_none_or(|a| a.playback != *playback)
        })
    }

    /// The running animation of `id`.
    pub fn animation(&self, id: &str) -> Option<&FlipAnimation> {
        self.active.get(id)
    }

    #[inline]
    pub fn is_animating(&self, id: &str) -> bool {
        self.active.contains_key(id)
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn has_active_animations(&self) -> bool {
        !self.active.is_empty()
    }
}

impl FlipAnimator<TweenPlayer> {
    /// Animator driven by the built-in [`TweenPlayer`].
    pub fn tweened() -> Self {
        Self::new(TweenPlayer::new())
    }

    /// Advance the built-in player and complete finished animations.
    pub fn tick(&mut self, dt: Duration) {
        for playback in self.player.tick(dt) {
            self.report(playback, PlaybackOutcome::Completed);
        }
    }

    /// Current transform to draw `id` with; zero when not animating.
    pub fn offset_of(&self, id: &str) -> Offset {
        self.player.offset_of(id).unwrap_or(Offset::ZERO)
    }
}
