//! Pull-based audio streaming.
//!
//! Audio is a tree of [`Producer`]s. The consumer at the root (a device
//! callback, a [`Buffer`], a [`sink::RingSink`]) pulls blocks of stereo
//! [`Sample`]s, and every node pulls its children as needed. Leaves live in
//! [`source`], combinators that restructure streams in [`compose`], and
//! in-place transformations in [`effect`]. [`Mixer`] sums a changing set of
//! producers and [`Resampler`] converts between sample rates.
//!
//! ```
//! use strom::{collect, Resampler, SampleRate};
//! use strom::compose::{seq, take};
//! use strom::source::{sine, silence};
//!
//! let rate = SampleRate(8000);
//! let tone = take(800, sine(rate, 440.0)?);
//! let pause = take(400, silence(1000));
//! let song = seq([Box::new(tone) as Box<dyn strom::Producer>, Box::new(pause)]);
//!
//! let mut out = Resampler::new(2, rate, SampleRate(16000), song)?;
//! assert_eq!(collect(&mut out).len(), 2400);
//! # Ok::<(), strom::Error>(())
//! ```
//!
//! # Features
//!
//! - `cpal_sink` - [`sink::Speaker`], playback on the default output device
//! - `vorbis_src` - [`source::VorbisDecoder`], Ogg/Vorbis decoding

mod buffer;
mod error;
mod format;
mod mixer;
mod producer;
mod resample;
mod sample;

pub mod compose;
pub mod effect;
pub mod sink;
pub mod source;

pub use buffer::{Buffer, Slice};
pub use error::{Error, Result};
pub use format::{Format, MAX_PRECISION};
pub use mixer::Mixer;
pub use producer::{collect, fill, from_fn, FromFn, Producer, Seekable, BLOCK_SIZE};
pub use resample::{Resampler, MAX_QUALITY};
pub use sample::{Sample, SampleRate};
