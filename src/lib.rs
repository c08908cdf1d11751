pub mod backend; // Fire-and-forget command surface toward the mixer
pub mod engine; // Control context: event dispatch, reaper ticks, critical sections
pub mod io;
pub mod render; // Software rendition of the fixed mixing topology
pub mod store;
pub mod voice; // Voice table, allocation, stealing, release, reaping

use std::time::Duration;

/// Number of simultaneously playable voices. Fixed for the process lifetime;
/// the table never grows or shrinks.
pub const POLYPHONY: usize = 12;

/// Lowest playable key. Events below this are dropped without side effects.
pub const KEY_LOW: u8 = 29;
/// Highest playable key. Events above this are dropped without side effects.
pub const KEY_HIGH: u8 = 89;
/// Number of distinct keys the sample table covers.
pub const KEY_SPAN: usize = (KEY_HIGH - KEY_LOW) as usize + 1;

/// Release fade length under the fade policy.
pub const FADE: Duration = Duration::from_millis(250);
/// Maximum occupancy of any slot. The reaper force-frees anything older,
/// note-off or not.
pub const DEAD_TIME: Duration = Duration::from_secs(8);

/// Voices per sub-mixer group in the fixed topology.
pub const GROUP_SIZE: usize = 4;

/// Rate the instrument's samples were recorded at.
pub const SOURCE_RATE: u32 = 11_025;
/// Rate the output side runs at. Deliberately not SOURCE_RATE: playing one
/// source frame per output frame shifts every sample about three semitones
/// sharp, and that shift is part of the instrument's sound. Do not resample.
pub const OUTPUT_RATE: u32 = 13_110;

pub const MAX_BLOCK_SIZE: usize = 2048;
