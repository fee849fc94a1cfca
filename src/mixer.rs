//! Live mixing of a changing set of producers

use tracing::{debug, warn};

use crate::producer::{fill, Producer, BLOCK_SIZE};
use crate::sample::Sample;

/// Sums every producer currently added to it.
///
/// The set can change between pulls: [`add`](Self::add) starts a producer,
/// [`clear`](Self::clear) drops them all, and a producer that finishes is
/// removed on the spot. A producer that fails is removed as well; its error
/// is logged and otherwise ignored, so one broken sound never stops the rest.
///
/// The mixer itself never ends. A pull that starts with producers playing is
/// filled completely, with silence where they ran out. A pull that starts
/// with none returns `(0, true)` so more can be added later.
///
/// # Locking
///
/// The mixer does no synchronization of its own. When it is pulled on one
/// thread and changed on another, the application wraps it (or the whole tree
/// it is part of) in a single lock and holds it for every pull and every
/// change, as [`Speaker`](crate::sink::Speaker) does.
///
/// ```
/// use strom::{Mixer, Producer, Sample};
/// use strom::source::silence;
///
/// let mut mixer = Mixer::new();
/// let mut buf = [Sample::SILENCE; 64];
/// assert_eq!(mixer.pull(&mut buf), (0, true));
///
/// mixer.add(silence(100));
/// assert_eq!(mixer.pull(&mut buf), (64, true));
/// assert_eq!(mixer.pull(&mut buf), (64, true));
/// assert_eq!(mixer.pull(&mut buf), (0, true));
/// ```
pub struct Mixer {
    active: Vec<Box<dyn Producer>>,
    scratch: Vec<Sample>,
}

impl Mixer {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            scratch: vec![Sample::SILENCE; BLOCK_SIZE],
        }
    }

    /// Start mixing in `p`.
    pub fn add<P: Producer + 'static>(&mut self, p: P) {
        self.active.push(Box::new(p));
        debug!(active = self.active.len(), "added producer to mixer");
    }

    /// Start mixing in several producers at once.
    pub fn add_all<I>(&mut self, producers: I)
    where
        I: IntoIterator<Item = Box<dyn Producer>>,
    {
        self.active.extend(producers);
        debug!(active = self.active.len(), "added producers to mixer");
    }

    /// Drop every producer. Output already handed to a sink still plays.
    pub fn clear(&mut self) {
        debug!(dropped = self.active.len(), "cleared mixer");
        self.active.clear();
    }

    /// Producers currently playing
    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Producer for Mixer {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        if self.active.is_empty() {
            return (0, true);
        }
        let mut n = 0;
        while n < buf.len() {
            let len = BLOCK_SIZE.min(buf.len() - n);
            let out = &mut buf[n..n + len];
            out.fill(Sample::SILENCE);
            if self.active.is_empty() {
                n += len;
                continue;
            }

            let scratch = &mut self.scratch[..len];
            self.active.retain_mut(|p| {
                let (sn, ok) = fill(p, scratch);
                for (o, s) in out.iter_mut().zip(&scratch[..sn]) {
                    *o += *s;
                }
                if !ok {
                    match p.last_error() {
                        Some(e) => warn!(error = %e, "mixer dropped a failed producer"),
                        None => debug!("mixer retired a finished producer"),
                    }
                }
                ok
            });

            n += len;
        }
        (n, true)
    }
}
