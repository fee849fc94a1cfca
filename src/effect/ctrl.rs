//! Pausing and detaching

use crate::error::Error;
use crate::producer::Producer;
use crate::sample::Sample;

/// Gives the application control over a playing producer.
///
/// While paused, pulls are answered with silence and the wrapped producer is
/// not touched, so it resumes exactly where it stopped. After
/// [`detach`](Self::detach) the wrapped producer is gone and the control is
/// exhausted.
///
/// State changes made while the producer is being pulled on another thread
/// must hold the same lock as the pulling side.
pub struct Ctrl<P> {
    inner: Option<P>,
    paused: bool,
    /// The wrapped producer reported the end
    done: bool,
}

impl<P: Producer> Ctrl<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner: Some(inner),
            paused: false,
            done: false,
        }
    }

    #[inline]
    pub fn paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Remove the wrapped producer, handing it back if it was still attached.
    pub fn detach(&mut self) -> Option<P> {
        self.inner.take()
    }

    pub fn get_mut(&mut self) -> Option<&mut P> {
        self.inner.as_mut()
    }
}

impl<P: Producer> Producer for Ctrl<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let Some(inner) = self.inner.as_mut() else {
            return (0, false);
        };
        if self.done {
            return (0, false);
        }
        if self.paused {
            buf.fill(Sample::SILENCE);
            return (buf.len(), true);
        }
        let (n, ok) = inner.pull(buf);
        self.done = !ok;
        (n, ok)
    }

    fn last_error(&self) -> Option<Error> {
        self.inner.as_ref().and_then(|p| p.last_error())
    }
}
