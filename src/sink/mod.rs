//! Consumers at the root of a producer tree.

mod ring;
#[cfg(feature = "cpal_sink")]
mod speaker;

pub use ring::RingSink;
#[cfg(feature = "cpal_sink")]
pub use speaker::{Speaker, SpeakerConfig};
