//! Leaf producers: silence, callbacks, tones, ring buffers and decoders.

mod ring;
mod silence;
mod tone;
#[cfg(feature = "vorbis_src")]
mod vorbis;

pub use ring::*;
pub use silence::*;
pub use tone::*;
#[cfg(feature = "vorbis_src")]
pub use vorbis::*;
