// Purpose: the scarce-resource core. A fixed pool of voice slots, the
// allocation/stealing scan, key-position panning, release scheduling, and
// the per-tick reaper that unsticks anything the stream forgot to end.

pub mod pan;
pub mod reaper;
pub mod release;
pub mod slot;
pub mod table;
