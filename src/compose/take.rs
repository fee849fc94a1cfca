//! Bounded playback

use std::time::Duration;

use crate::error::Error;
use crate::producer::Producer;
use crate::sample::{Sample, SampleRate};

/// Passes through at most `limit` samples of the wrapped producer.
///
/// Errors of the wrapped producer are forwarded unchanged.
pub struct Take<P> {
    inner: P,
    limit: usize,
    consumed: usize,
    done: bool,
}

/// The first `n` samples of `inner`.
pub fn take<P: Producer>(n: usize, inner: P) -> Take<P> {
    Take {
        inner,
        limit: n,
        consumed: 0,
        done: false,
    }
}

/// The first `d` worth of `inner` at `rate`.
pub fn take_for<P: Producer>(rate: SampleRate, d: Duration, inner: P) -> Take<P> {
    take(rate.samples_for(d), inner)
}

impl<P> Take<P> {
    /// Samples passed through so far
    #[inline]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: Producer> Producer for Take<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        if self.done || self.consumed >= self.limit {
            self.done = true;
            return (0, false);
        }
        let want = buf.len().min(self.limit - self.consumed);
        let (n, ok) = self.inner.pull(&mut buf[..want]);
        self.consumed += n;
        self.done = !ok;
        (n, ok)
    }

    fn last_error(&self) -> Option<Error> {
        self.inner.last_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::collect;
    use crate::source::Silence;

    #[test]
    fn limits_an_endless_source() {
        let mut t = take(1000, Silence::endless());
        assert_eq!(collect(&mut t).len(), 1000);
        assert_eq!(t.consumed(), 1000);
        let mut buf = [Sample::SILENCE; 4];
        assert_eq!(t.pull(&mut buf), (0, false));
    }

    #[test]
    fn take_zero_is_empty() {
        let mut t = take(0, Silence::endless());
        let mut buf = [Sample::SILENCE; 4];
        assert_eq!(t.pull(&mut buf), (0, false));
    }

    #[test]
    fn take_for_converts_duration() {
        let mut t = take_for(SampleRate(44100), Duration::from_millis(10), Silence::endless());
        assert_eq!(collect(&mut t).len(), 441);
    }

    #[test]
    fn shorter_source_ends_first() {
        let mut t = take(100, crate::source::silence(30));
        assert_eq!(collect(&mut t).len(), 30);
    }
}
