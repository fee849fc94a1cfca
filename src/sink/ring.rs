//! Ring buffer sink for custom audio processing

use rtrb::Producer as RingProducer;

use crate::producer::{Producer, BLOCK_SIZE};
use crate::sample::Sample;

/// Pulls a producer into an rtrb ring buffer as interleaved `f32`.
///
/// Useful for handing audio to another thread, a custom output backend or
/// an analyser. The sink never blocks: each [`pump`](Self::pump) moves as
/// much as the ring has room for.
pub struct RingSink<P> {
    source: P,
    ring: RingProducer<f32>,
    channels: usize,
    scratch: Vec<Sample>,
    done: bool,
}

impl<P: Producer> RingSink<P> {
    /// Write stereo frames (left, right) for `source` into `ring`.
    pub fn stereo(source: P, ring: RingProducer<f32>) -> Self {
        Self::with_channels(source, ring, 2)
    }

    /// Write one averaged value per sample.
    pub fn mono(source: P, ring: RingProducer<f32>) -> Self {
        Self::with_channels(source, ring, 1)
    }

    fn with_channels(source: P, ring: RingProducer<f32>, channels: usize) -> Self {
        Self {
            source,
            ring,
            channels,
            scratch: vec![Sample::SILENCE; BLOCK_SIZE],
            done: false,
        }
    }

    /// Samples that fit into the ring right now
    #[inline]
    pub fn available(&self) -> usize {
        self.ring.slots() / self.channels
    }

    pub fn source_mut(&mut self) -> &mut P {
        &mut self.source
    }

    /// Move samples from the source into the ring until the ring is full,
    /// the source stalls or the source ends. Returns the number of samples
    /// moved and whether the source is still live.
    pub fn pump(&mut self) -> (usize, bool) {
        if self.done {
            return (0, false);
        }
        let mut moved = 0;
        loop {
            let room = self.available().min(BLOCK_SIZE);
            if room == 0 {
                return (moved, true);
            }
            let (n, ok) = self.source.pull(&mut self.scratch[..room]);
            for s in &self.scratch[..n] {
                // room was checked above, so every push succeeds
                if self.channels == 1 {
                    let _ = self.ring.push(((s.left + s.right) / 2.0) as f32);
                } else {
                    let _ = self.ring.push(s.left as f32);
                    let _ = self.ring.push(s.right as f32);
                }
            }
            moved += n;
            if !ok {
                self.done = true;
                return (moved, false);
            }
            if n == 0 {
                return (moved, true);
            }
        }
    }
}
