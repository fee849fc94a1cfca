//! Effects that transform the samples of a wrapped producer in place.
//!
//! Every effect pulls its inner producer into the caller's buffer, edits the
//! samples it got and passes `(n, more)` through unchanged, together with the
//! inner producer's error.

mod channels;
mod ctrl;
mod doppler;
mod equalizer;
mod gain;
mod pan;

pub use channels::{mono, swap, Mono, Swap};
pub use ctrl::Ctrl;
pub use doppler::Doppler;
pub use equalizer::{EqSection, Equalizer};
pub use gain::{Gain, Volume};
pub use pan::Pan;
