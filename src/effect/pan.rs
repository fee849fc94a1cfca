//! Stereo balance

use crate::error::Error;
use crate::producer::Producer;
use crate::sample::Sample;

/// Moves the wrapped producer between the left and right channel.
///
/// `pan` of -1 sends both channels to the left, +1 sends both to the right,
/// 0 changes nothing. Values in between move that fraction of the far
/// channel over.
pub struct Pan<P> {
    inner: P,
    pan: f64,
}

impl<P: Producer> Pan<P> {
    /// `pan` is clamped to [-1, 1].
    pub fn new(pan: f64, inner: P) -> Self {
        Self {
            inner,
            pan: pan.clamp(-1.0, 1.0),
        }
    }

    #[inline]
    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn set_pan(&mut self, pan: f64) {
        self.pan = pan.clamp(-1.0, 1.0);
    }
}

impl<P: Producer> Producer for Pan<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let (n, ok) = self.inner.pull(buf);
        let p = self.pan;
        if p < 0.0 {
            for s in &mut buf[..n] {
                let moved = -p * s.right;
                s.left += moved;
                s.right -= moved;
            }
        } else if p > 0.0 {
            for s in &mut buf[..n] {
                let moved = p * s.left;
                s.left -= moved;
                s.right += moved;
            }
        }
        (n, ok)
    }

    fn last_error(&self) -> Option<Error> {
        self.inner.last_error()
    }
}
