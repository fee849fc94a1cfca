//! Channel rearrangement

use crate::error::Error;
use crate::producer::Producer;
use crate::sample::Sample;

/// Swaps left and right. See [`swap`].
pub struct Swap<P>(P);

/// `inner` with its channels swapped.
pub fn swap<P: Producer>(inner: P) -> Swap<P> {
    Swap(inner)
}

impl<P: Producer> Producer for Swap<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let (n, ok) = self.0.pull(buf);
        for s in &mut buf[..n] {
            core::mem::swap(&mut s.left, &mut s.right);
        }
        (n, ok)
    }

    fn last_error(&self) -> Option<Error> {
        self.0.last_error()
    }
}

/// Downmixes to mono. See [`mono`].
pub struct Mono<P>(P);

/// `inner` with both channels replaced by their average.
pub fn mono<P: Producer>(inner: P) -> Mono<P> {
    Mono(inner)
}

impl<P: Producer> Producer for Mono<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let (n, ok) = self.0.pull(buf);
        for s in &mut buf[..n] {
            *s = Sample::mono((s.left + s.right) / 2.0);
        }
        (n, ok)
    }

    fn last_error(&self) -> Option<Error> {
        self.0.last_error()
    }
}
