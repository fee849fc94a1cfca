//! The pull contract and the helpers built directly on top of it.

use crate::error::{Error, Result};
use crate::sample::Sample;

/// Size of the scratch block used by components that buffer internally.
pub const BLOCK_SIZE: usize = 512;

/// The core trait for anything that produces audio.
///
/// A producer is pulled by its consumer: [`pull`](Self::pull) fills the front
/// of `buf` and reports how many samples it wrote and whether more are coming.
///
/// # Contract
///
/// - `(n, true)`: `n <= buf.len()` samples were written and the producer is
///   still live. `n` may be smaller than requested (even zero); call again for
///   the rest.
/// - `(n, false)`: the producer is exhausted after writing `n` samples. Every
///   later call must return `(0, false)`.
/// - Once [`last_error`](Self::last_error) returns `Some`, the call that set it
///   and every later call report `false`. The error never clears.
///
/// # Example
///
/// ```
/// use strom::{Producer, Sample};
///
/// /// A constant DC offset, forever
/// struct Dc(f64);
///
/// impl Producer for Dc {
///     fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
///         buf.fill(Sample::mono(self.0));
///         (buf.len(), true)
///     }
/// }
///
/// let mut dc = Dc(0.5);
/// let mut buf = [Sample::SILENCE; 4];
/// assert_eq!(dc.pull(&mut buf), (4, true));
/// assert_eq!(buf[3], Sample::mono(0.5));
/// ```
pub trait Producer: Send {
    /// Fill the front of `buf`, returning `(written, more_available)`.
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool);

    /// Sticky error, if the producer failed.
    fn last_error(&self) -> Option<Error> {
        None
    }
}

/// A producer with random access.
///
/// Positions are sample indices in `[0, len]`. Seeking back from the end
/// makes an exhausted producer live again; this is the one exception to the
/// exhaustion rule of [`Producer`].
pub trait Seekable: Producer {
    /// Total number of samples.
    fn len(&self) -> usize;

    /// Index of the next sample [`pull`](Producer::pull) will produce.
    fn position(&self) -> usize;

    /// Move to `pos`. Fails with [`Error::OutOfRange`] and leaves the position
    /// unchanged if `pos > len()`.
    fn seek(&mut self, pos: usize) -> Result<()>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: Producer + ?Sized> Producer for Box<P> {
    #[inline]
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        (**self).pull(buf)
    }

    #[inline]
    fn last_error(&self) -> Option<Error> {
        (**self).last_error()
    }
}

impl<P: Producer + ?Sized> Producer for &mut P {
    #[inline]
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        (**self).pull(buf)
    }

    #[inline]
    fn last_error(&self) -> Option<Error> {
        (**self).last_error()
    }
}

impl<S: Seekable + ?Sized> Seekable for Box<S> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn seek(&mut self, pos: usize) -> Result<()> {
        (**self).seek(pos)
    }
}

/// Producer backed by a closure. See [`from_fn`].
pub struct FromFn<F> {
    f: F,
    done: bool,
}

/// Turn a closure with the [`Producer::pull`] signature into a producer.
///
/// The wrapper enforces the exhaustion rule: after the closure reports
/// `false` once, it is never called again.
///
/// ```
/// use strom::{from_fn, Producer, Sample};
///
/// let mut left = 3;
/// let mut p = from_fn(move |buf: &mut [Sample]| {
///     let n = buf.len().min(left);
///     left -= n;
///     (n, n > 0)
/// });
/// let mut buf = [Sample::SILENCE; 2];
/// assert_eq!(p.pull(&mut buf), (2, true));
/// assert_eq!(p.pull(&mut buf), (1, true));
/// assert_eq!(p.pull(&mut buf), (0, false));
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(&mut [Sample]) -> (usize, bool) + Send,
{
    FromFn { f, done: false }
}

impl<F> Producer for FromFn<F>
where
    F: FnMut(&mut [Sample]) -> (usize, bool) + Send,
{
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        if self.done {
            return (0, false);
        }
        let (n, ok) = (self.f)(buf);
        self.done = !ok;
        (n.min(buf.len()), ok)
    }
}

/// Pull from `p` until `buf` is full, `p` is exhausted, or `p` stalls by
/// returning zero samples while still live.
pub fn fill<P: Producer + ?Sized>(p: &mut P, buf: &mut [Sample]) -> (usize, bool) {
    let mut filled = 0;
    while filled < buf.len() {
        let (n, ok) = p.pull(&mut buf[filled..]);
        filled += n;
        if !ok {
            return (filled, false);
        }
        if n == 0 {
            break;
        }
    }
    (filled, true)
}

/// Drain `p` to exhaustion and return everything it produced.
///
/// Never returns for an infinite producer; bound it with
/// [`Take`](crate::compose::Take) first.
pub fn collect<P: Producer + ?Sized>(p: &mut P) -> Vec<Sample> {
    let mut out = Vec::new();
    let mut block = [Sample::SILENCE; BLOCK_SIZE];
    loop {
        let (n, ok) = p.pull(&mut block);
        out.extend_from_slice(&block[..n]);
        if !ok {
            return out;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stuttering(total: usize) -> impl Producer {
        // hands out at most 3 samples per call, with an empty call in between
        let mut left = total;
        let mut tick = false;
        from_fn(move |buf: &mut [Sample]| {
            tick = !tick;
            if left == 0 {
                return (0, false);
            }
            if !tick {
                return (0, true);
            }
            let n = buf.len().min(left).min(3);
            for s in &mut buf[..n] {
                *s = Sample::mono(left as f64);
                left -= 1;
            }
            (n, true)
        })
    }

    #[test]
    fn fill_stops_on_stall() {
        let mut p = stuttering(10);
        let mut buf = [Sample::SILENCE; 8];
        assert_eq!(fill(&mut p, &mut buf), (3, true));
        assert_eq!(fill(&mut p, &mut buf), (3, true));
        assert_eq!(fill(&mut p, &mut buf), (3, true));
        assert_eq!(fill(&mut p, &mut buf), (1, false));
        assert_eq!(fill(&mut p, &mut buf), (0, false));
    }

    #[test]
    fn collect_keeps_pulling_through_stalls() {
        let mut p = stuttering(10);
        let out = collect(&mut p);
        assert_eq!(out.len(), 10);
        assert_eq!(out[0], Sample::mono(10.0));
        assert_eq!(out[9], Sample::mono(1.0));
    }

    #[test]
    fn from_fn_is_not_called_after_exhaustion() {
        let mut calls = 0;
        {
            let mut p = from_fn(|_: &mut [Sample]| {
                calls += 1;
                (0, false)
            });
            let mut buf = [Sample::SILENCE; 4];
            assert_eq!(p.pull(&mut buf), (0, false));
            assert_eq!(p.pull(&mut buf), (0, false));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn boxed_producers_forward() {
        let mut p: Box<dyn Producer> = Box::new(stuttering(2));
        assert_eq!(collect(&mut p).len(), 2);
    }
}
