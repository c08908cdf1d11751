use std::time::Instant;

/*
Voice Slot Lifecycle
====================

Vocabulary
----------

  occupant     The note key currently bound to the slot. `None` is the free
               sentinel: a slot is Free exactly when it has no occupant.

  allocated_at Monotonic timestamp taken when the occupant was bound. Only
               used to pick the steal victim (oldest loses); meaningless
               while the slot is Free.

  stealing     Rebinding an occupied slot to a new key because nothing is
               Free. The old occupant is cut off; allocation never fails.

  reaping      The per-tick sweep that frees slots whose fade has finished
               or whose occupancy has outlived the dead-time ceiling.


The State Machine
-----------------

            bind                 begin_release
    Free ──────────→ Active ──────────────────→ Releasing
     ↑                 │                            │
     │                 │ clear (steal, dead-time,   │
     │                 │        immediate policy)   │
     └─────────────────┴────────────────────────────┘
                 clear (fade done, steal, dead-time)

Key behaviors:

  - bind() works from ANY state. Stealing is just binding over a live
    occupant, which is why it clears release bookkeeping on the way in.
  - Releasing keeps the occupant key bound. The release scan and the
    reaper both still need to match the key while the fade runs.
  - Several slots may hold the SAME key at once. Retriggering a key that
    is still sounding legally allocates a second voice; there is no
    per-key exclusivity anywhere in the pool.

Every transition that touches more than one field happens in one method
call, and callers hold the control-context lock across it - an observer
never sees a key without its timestamp or one gain channel without its
pair.
*/

/// Lifecycle of one playback slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Free,      // no occupant; timestamps are meaningless
    Active,    // bound to a key and sounding
    Releasing, // note-off seen, fade running, key still bound
}

/// One of exactly N voice slots.
///
/// A single record replaces the original's parallel arrays so that a bind or
/// clear updates every related field in one place. The key stays bound while
/// Releasing - the reaper and the release scan still need to match it.
#[derive(Debug, Clone, Copy)]
pub struct VoiceSlot {
    index: usize,
    key: Option<u8>,
    state: SlotState,
    allocated_at: Instant,
    release_started_at: Option<Instant>,
    gain: (f32, f32),
}

impl VoiceSlot {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            key: None,
            state: SlotState::Free,
            allocated_at: Instant::now(),
            release_started_at: None,
            gain: (0.0, 0.0),
        }
    }

    /// Bind a new occupant. Works on a Free slot or steals an occupied one;
    /// any in-flight release state is cleared so the slot starts clean.
    pub fn bind(&mut self, key: u8, gain: (f32, f32), now: Instant) {
        self.key = Some(key);
        self.state = SlotState::Active;
        self.allocated_at = now;
        self.release_started_at = None;
        self.gain = gain;
        self.check_invariants();
    }

    /// Active → Releasing. The occupant key stays bound.
    pub fn begin_release(&mut self, now: Instant) {
        debug_assert_eq!(self.state, SlotState::Active);
        self.state = SlotState::Releasing;
        self.release_started_at = Some(now);
        self.check_invariants();
    }

    /// Return to Free, whatever state the slot was in.
    pub fn clear(&mut self) {
        self.key = None;
        self.state = SlotState::Free;
        self.release_started_at = None;
        self.gain = (0.0, 0.0);
        self.check_invariants();
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The occupant key, `None` while Free.
    pub fn key(&self) -> Option<u8> {
        self.key
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn is_free(&self) -> bool {
        self.state == SlotState::Free
    }

    /// When the current occupant was bound. Meaningless while Free.
    pub fn allocated_at(&self) -> Instant {
        self.allocated_at
    }

    /// When the release fade started. `Some` iff Releasing.
    pub fn release_started_at(&self) -> Option<Instant> {
        self.release_started_at
    }

    /// (left, right) gain pair. Meaningful only while occupied.
    pub fn gain(&self) -> (f32, f32) {
        self.gain
    }

    fn check_invariants(&self) {
        debug_assert_eq!(self.key.is_none(), self.state == SlotState::Free);
        debug_assert_eq!(
            self.release_started_at.is_some(),
            self.state == SlotState::Releasing
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fresh_slot_is_free() {
        let slot = VoiceSlot::new(3);
        assert_eq!(slot.index(), 3);
        assert!(slot.is_free());
        assert_eq!(slot.key(), None);
        assert_eq!(slot.release_started_at(), None);
    }

    #[test]
    fn bind_release_clear_walks_the_lifecycle() {
        let t0 = Instant::now();
        let mut slot = VoiceSlot::new(0);

        slot.bind(60, (0.1, 0.2), t0);
        assert_eq!(slot.state(), SlotState::Active);
        assert_eq!(slot.key(), Some(60));
        assert_eq!(slot.gain(), (0.1, 0.2));

        let t1 = t0 + Duration::from_millis(5);
        slot.begin_release(t1);
        assert_eq!(slot.state(), SlotState::Releasing);
        assert_eq!(slot.key(), Some(60), "key stays bound while releasing");
        assert_eq!(slot.release_started_at(), Some(t1));

        slot.clear();
        assert!(slot.is_free());
        assert_eq!(slot.key(), None);
        assert_eq!(slot.release_started_at(), None);
    }

    #[test]
    fn rebinding_a_releasing_slot_clears_release_state() {
        let t0 = Instant::now();
        let mut slot = VoiceSlot::new(0);
        slot.bind(60, (0.1, 0.2), t0);
        slot.begin_release(t0 + Duration::from_millis(1));

        let t2 = t0 + Duration::from_millis(2);
        slot.bind(72, (0.3, 0.4), t2);
        assert_eq!(slot.state(), SlotState::Active);
        assert_eq!(slot.key(), Some(72));
        assert_eq!(slot.release_started_at(), None);
        assert_eq!(slot.allocated_at(), t2);
    }
}
