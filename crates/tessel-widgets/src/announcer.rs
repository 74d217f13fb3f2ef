#![forbid(unsafe_code)]

//! Accessibility announcements.
//!
//! The keyboard controller never touches a document or a screen reader. It
//! speaks through an injected [`Announcer`]; hosts decide where the text
//! goes. [`LiveRegion`] is the stock implementation: a polite status region
//! whose messages expire after one second.

use std::collections::VecDeque;
use std::time::Duration;

use web_time::Instant;

/// How long a live-region message stays readable.
pub const ANNOUNCEMENT_TTL: Duration = Duration::from_secs(1);

/// Sink for short assistive-technology messages.
pub trait Announcer {
    /// Publish `message` at `now`.
    fn announce(&mut self, message: &str, now: Instant);
}

impl<F> Announcer for F
where
    F: FnMut(&str, Instant),
{
    fn announce(&mut self, message: &str, now: Instant) {
        self(message, now)
    }
}

/// Discards every announcement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAnnouncer;

impl Announcer for NoopAnnouncer {
    fn announce(&mut self, _message: &str, _now: Instant) {}
}

/// A message visible in a [`LiveRegion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub message: String,
    pub expires_at: Instant,
}

/// Polite `role="status"` region holding recent announcements.
#[derive(Debug, Clone)]
pub struct LiveRegion {
    ttl: Duration,
    messages: VecDeque<Announcement>,
}

impl Default for LiveRegion {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveRegion {
    /// ARIA role of the region.
    pub const ROLE: &'static str = "status";
    /// `aria-live` politeness of the region.
    pub const POLITENESS: &'static str = "polite";

    /// Region with the standard one-second lifetime.
    pub fn new() -> Self {
        Self::with_ttl(ANNOUNCEMENT_TTL)
    }

    /// Region with a custom message lifetime.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            messages: VecDeque::new(),
        }
    }

    /// Drop expired messages.
    pub fn prune(&mut self, now: Instant) {
        while self
            .messages
            .front()
            .is_some_and(|m| m.expires_at <= now)
        {
            self.messages.pop_front();
        }
    }

    /// Messages still visible at `now`, oldest first.
    pub fn visible(&self, now: Instant) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(move |m| m.expires_at > now)
            .map(|m| m.message.as_str())
    }

    /// The newest message still visible at `now`.
    pub fn latest(&self, now: Instant) -> Option<&str> {
        self.messages
            .back()
            .filter(|m| m.expires_at > now)
            .map(|m| m.message.as_str())
    }

    /// Messages currently held, including expired ones not yet pruned.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Announcer for LiveRegion {
    fn announce(&mut self, message: &str, now: Instant) {
        self.prune(now);
        self.messages.push_back(Announcement {
            message: message.to_owned(),
            expires_at: now + self.ttl,
        });
    }
}
