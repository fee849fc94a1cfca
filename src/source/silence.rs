//! Silence and callback producers.

use crate::producer::Producer;
use crate::sample::Sample;

/// Produces zero samples, either a fixed number of them or forever.
pub struct Silence {
    remaining: Option<usize>,
}

/// `n` samples of silence.
pub fn silence(n: usize) -> Silence {
    Silence { remaining: Some(n) }
}

impl Silence {
    /// Silence that never ends.
    pub fn endless() -> Self {
        Self { remaining: None }
    }

    /// Samples left, `None` if endless.
    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }
}

impl Producer for Silence {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let n = match &mut self.remaining {
            Some(0) => return (0, false),
            Some(left) => {
                let n = buf.len().min(*left);
                *left -= n;
                n
            }
            None => buf.len(),
        };
        buf[..n].fill(Sample::SILENCE);
        (n, true)
    }
}

/// Produces nothing; runs a closure the first time it is pulled.
///
/// Put one in a [`Seq`](crate::compose::Seq) to find out when playback got
/// that far.
pub struct Callback<F> {
    f: Option<F>,
}

pub fn callback<F: FnOnce() + Send>(f: F) -> Callback<F> {
    Callback { f: Some(f) }
}

impl<F: FnOnce() + Send> Producer for Callback<F> {
    fn pull(&mut self, _buf: &mut [Sample]) -> (usize, bool) {
        if let Some(f) = self.f.take() {
            f();
        }
        (0, false)
    }
}
