//! Repeated playback of a seekable producer

use crate::error::Error;
use crate::producer::{Producer, Seekable};
use crate::sample::Sample;

/// Plays a [`Seekable`] producer a number of times, or forever.
///
/// A single pull keeps filling across loop boundaries, so a short read only
/// happens at the very end. Errors of the wrapped producer are forwarded;
/// when one shows up mid-pull, the samples already written by that pull are
/// returned together with `false`.
///
/// A pass that produces nothing ends the loop, even an endless one.
pub struct Loop<S> {
    inner: S,
    /// Passes left, `None` when endless
    remaining: Option<usize>,
    pass_produced: bool,
    err: Option<Error>,
    done: bool,
}

/// Play `inner` `count` times. A count of zero produces nothing.
pub fn looped<S: Seekable>(count: usize, inner: S) -> Loop<S> {
    Loop {
        inner,
        remaining: Some(count),
        pass_produced: false,
        err: None,
        done: false,
    }
}

impl<S: Seekable> Loop<S> {
    /// Play `inner` over and over.
    pub fn forever(inner: S) -> Self {
        Self {
            inner,
            remaining: None,
            pass_produced: false,
            err: None,
            done: false,
        }
    }

    /// Passes left including the current one, `None` when endless
    pub fn remaining(&self) -> Option<usize> {
        self.remaining
    }

    fn finish(&mut self, n: usize) -> (usize, bool) {
        self.remaining = Some(0);
        self.done = n == 0;
        (n, n > 0)
    }
}

impl<S: Seekable> Producer for Loop<S> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        if self.done || self.remaining == Some(0) || self.last_error().is_some() {
            self.done = true;
            return (0, false);
        }

        let mut n = 0;
        while n < buf.len() {
            let (sn, ok) = self.inner.pull(&mut buf[n..]);
            n += sn;
            self.pass_produced |= sn > 0;
            if ok {
                if sn == 0 {
                    break;
                }
                continue;
            }

            // end of the current pass
            if self.inner.last_error().is_some() {
                self.done = true;
                return (n, false);
            }
            if let Some(left) = &mut self.remaining {
                *left -= 1;
            }
            if self.remaining == Some(0) || !self.pass_produced {
                return self.finish(n);
            }
            if let Err(e) = self.inner.seek(0) {
                self.err = Some(e);
                self.done = true;
                return (n, false);
            }
            self.pass_produced = false;
        }
        (n, true)
    }

    fn last_error(&self) -> Option<Error> {
        self.err.clone().or_else(|| self.inner.last_error())
    }
}
