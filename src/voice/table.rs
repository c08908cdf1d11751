//! The fixed voice pool and its allocation scan.

use std::time::Instant;

use crate::voice::slot::VoiceSlot;

/// What `allocate` did to satisfy the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub index: usize,
    /// True when an occupied slot was evicted. The caller owes the backend a
    /// `stop` on this slot before the new `play`.
    pub stolen: bool,
}

/// All N slots. Capacity is fixed at construction; the pool is never
/// resized and slots are never created or destroyed afterwards.
pub struct VoiceTable {
    slots: Vec<VoiceSlot>,
}

impl VoiceTable {
    pub fn new(polyphony: usize) -> Self {
        assert!(polyphony > 0, "a voice table needs at least one slot");
        Self {
            slots: (0..polyphony).map(VoiceSlot::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> &VoiceSlot {
        &self.slots[index]
    }

    pub fn slots(&self) -> &[VoiceSlot] {
        &self.slots
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut VoiceSlot {
        &mut self.slots[index]
    }

    /// Find or steal a slot for `key`. Never fails: with no Free slot the
    /// oldest occupant is evicted, whatever state it is in.
    ///
    /// The same key may already be sounding elsewhere in the pool; that is a
    /// legal retrigger and allocates a second voice, no per-key exclusivity.
    pub fn allocate(&mut self, key: u8, gain: (f32, f32), now: Instant) -> Allocation {
        if let Some(index) = self.slots.iter().position(|s| s.is_free()) {
            self.slots[index].bind(key, gain, now);
            return Allocation {
                index,
                stolen: false,
            };
        }

        // Everything is occupied: steal the slot with the oldest binding.
        // Strict `<` keeps the lowest index on equal timestamps - an
        // artifact of scan order, deterministic but not a declared policy.
        let mut oldest = 0;
        for (i, slot) in self.slots.iter().enumerate().skip(1) {
            if slot.allocated_at() < self.slots[oldest].allocated_at() {
                oldest = i;
            }
        }
        self.slots[oldest].bind(key, gain, now);
        Allocation {
            index: oldest,
            stolen: true,
        }
    }

    /// Indices of all occupied slots currently bound to `key`, in scan
    /// order. The release path wants every instance, not just the newest.
    pub fn bound_to(&self, key: u8) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.key() == Some(key))
            .map(|(i, _)| i)
    }
}
