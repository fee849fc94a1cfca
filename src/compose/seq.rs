//! Back-to-back playback

use crate::producer::Producer;
use crate::sample::Sample;

/// Plays producers one after another with no gap.
///
/// When one ends mid-pull, the next one continues filling the same buffer.
/// Errors of individual producers are not propagated: a failed producer just
/// counts as finished.
pub struct Seq<P> {
    items: Vec<P>,
    current: usize,
}

pub fn seq<P, I>(items: I) -> Seq<P>
where
    P: Producer,
    I: IntoIterator<Item = P>,
{
    Seq {
        items: items.into_iter().collect(),
        current: 0,
    }
}

impl<P> Seq<P> {
    /// Index of the producer currently playing
    pub fn current(&self) -> usize {
        self.current
    }
}

impl<P: Producer> Producer for Seq<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        if buf.is_empty() {
            return (0, self.current < self.items.len());
        }
        let mut n = 0;
        let mut ok = false;
        while self.current < self.items.len() && n < buf.len() {
            let (sn, sok) = self.items[self.current].pull(&mut buf[n..]);
            n += sn;
            ok |= sok;
            if !sok {
                self.current += 1;
            } else if sn == 0 {
                break;
            }
        }
        (n, ok || n > 0)
    }
}
