// Purpose - external interfaces: note event framing and PCM conversions

pub mod converter;
pub mod midi;
pub mod source;
