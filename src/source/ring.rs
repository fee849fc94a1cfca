//! Ring buffer source for audio produced on another thread

use rtrb::{Consumer, RingBuffer};

use crate::producer::Producer;
use crate::sample::Sample;

/// A source that reads interleaved stereo `f32` from an rtrb ring buffer.
///
/// Whatever is in the ring is handed out immediately; an empty ring yields
/// `(0, true)` so the consumer can retry later. Once the writing half is
/// dropped and the ring is drained, the source is exhausted.
pub struct RingSource {
    consumer: Consumer<f32>,
}

impl RingSource {
    /// Wrap the reading half of a ring buffer.
    pub fn new(consumer: Consumer<f32>) -> Self {
        Self { consumer }
    }

    /// Create a ring holding `capacity` stereo samples, returning the writing
    /// half and the source reading from it.
    pub fn with_capacity(capacity: usize) -> (rtrb::Producer<f32>, Self) {
        let (producer, consumer) = RingBuffer::new(capacity.max(1) * 2);
        (producer, Self::new(consumer))
    }

    /// Stereo samples ready to be read
    #[inline]
    pub fn available(&self) -> usize {
        self.consumer.slots() / 2
    }
}

impl Producer for RingSource {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let n = buf.len().min(self.available());
        if n == 0 {
            return (0, !self.consumer.is_abandoned());
        }

        for out in &mut buf[..n] {
            // slots were checked above, so both pops succeed
            let left = self.consumer.pop().unwrap_or(0.0);
            let right = self.consumer.pop().unwrap_or(0.0);
            *out = Sample::new(left as f64, right as f64);
        }
        (n, true)
    }
}
