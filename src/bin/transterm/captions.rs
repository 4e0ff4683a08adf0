//! Rolling caption session: a bounded, time-decaying list of overlay captions.
//!
//! Each caption ages through `active -> fading -> removed` on deadlines owned
//! by an explicit timer table, while inserts truncate the list to the newest
//! five. Eviction and aging are independent removal paths for the same item:
//! whichever fires first wins and the loser is a no-op.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Display lifetime before a caption starts fading.
pub(crate) const CAPTION_DISPLAY_MS: u64 = 10_000;

/// Fade-out grace period before the caption is dropped from the list.
pub(crate) const CAPTION_FADE_MS: u64 = 500;

/// Maximum captions kept on screen at once.
pub(crate) const MAX_VISIBLE_CAPTIONS: usize = 5;

/// One overlay caption. The key doubles as identity for the timer table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Caption {
    pub(crate) text: String,
    /// Milliseconds since the epoch, monotonized so keys never collide.
    pub(crate) key: u64,
    pub(crate) fading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Fade,
    Remove,
}

#[derive(Debug, Clone, Copy)]
struct PendingTransition {
    due: Instant,
    next: Transition,
}

/// Caption list plus the timer table driving per-caption transitions.
#[derive(Debug, Default)]
pub(crate) struct CaptionSession {
    captions: Vec<Caption>,
    timers: BTreeMap<u64, PendingTransition>,
    last_key: u64,
}

impl CaptionSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a caption for one translation event.
    ///
    /// Overflow eviction runs synchronously before the new caption's fade
    /// timer is scheduled; evicted captions are dropped without a fade and
    /// their timers cancelled.
    pub(crate) fn push(&mut self, text: String, wall_ms: u64, now: Instant) -> u64 {
        let key = self.next_key(wall_ms);
        self.captions.push(Caption {
            text,
            key,
            fading: false,
        });
        while self.captions.len() > MAX_VISIBLE_CAPTIONS {
            let evicted = self.captions.remove(0);
            self.cancel_timer(evicted.key);
        }
        self.timers.insert(
            key,
            PendingTransition {
                due: now + Duration::from_millis(CAPTION_DISPLAY_MS),
                next: Transition::Fade,
            },
        );
        key
    }

    /// Apply every transition due at `now`. Returns true when anything changed.
    ///
    /// Removal deadlines are anchored to the nominal fade instant, not the
    /// tick that observed it, so transitions stay exact under a late tick.
    pub(crate) fn tick(&mut self, now: Instant) -> bool {
        let due: Vec<u64> = self
            .timers
            .iter()
            .filter(|(_, pending)| pending.due <= now)
            .map(|(key, _)| *key)
            .collect();
        let mut changed = false;
        for key in due {
            let Some(pending) = self.timers.remove(&key) else {
                continue;
            };
            match pending.next {
                Transition::Fade => {
                    // The caption may have been evicted since scheduling; a
                    // fired timer for a missing caption is a no-op.
                    if let Some(caption) = self.captions.iter_mut().find(|c| c.key == key) {
                        caption.fading = true;
                        self.timers.insert(
                            key,
                            PendingTransition {
                                due: pending.due + Duration::from_millis(CAPTION_FADE_MS),
                                next: Transition::Remove,
                            },
                        );
                        changed = true;
                    }
                }
                Transition::Remove => {
                    let before = self.captions.len();
                    self.captions.retain(|c| c.key != key);
                    changed |= self.captions.len() != before;
                }
            }
        }
        changed
    }

    /// Cancel a caption's pending transition. Idempotent; never errors when
    /// the timer already fired or the caption is already gone.
    pub(crate) fn cancel_timer(&mut self, key: u64) {
        self.timers.remove(&key);
    }

    /// Earliest pending deadline, for pacing the event loop.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|pending| pending.due).min()
    }

    /// Drop every caption and pending timer (view teardown).
    pub(crate) fn clear(&mut self) {
        self.captions.clear();
        self.timers.clear();
    }

    pub(crate) fn captions(&self) -> &[Caption] {
        &self.captions
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }

    fn next_key(&mut self, wall_ms: u64) -> u64 {
        let key = wall_ms.max(self.last_key.saturating_add(1));
        self.last_key = key;
        key
    }

    #[cfg(test)]
    fn pending_timer_count(&self) -> usize {
        self.timers.len()
    }
}
