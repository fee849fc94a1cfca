//! Static mixing of a fixed set of producers

use crate::producer::{fill, Producer, BLOCK_SIZE};
use crate::sample::Sample;

/// Sums a fixed set of producers sample by sample.
///
/// Runs until every input is finished; a finished input simply stops
/// contributing. Errors of individual inputs are not propagated. For a set
/// that changes during playback use [`Mixer`](crate::Mixer).
pub struct Mix<P> {
    items: Vec<P>,
    scratch: Vec<Sample>,
}

pub fn mix<P, I>(items: I) -> Mix<P>
where
    P: Producer,
    I: IntoIterator<Item = P>,
{
    Mix {
        items: items.into_iter().collect(),
        scratch: vec![Sample::SILENCE; BLOCK_SIZE],
    }
}

impl<P> Mix<P> {
    /// Inputs that have not finished yet
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<P: Producer> Producer for Mix<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        if self.items.is_empty() {
            return (0, false);
        }
        if buf.is_empty() {
            return (0, true);
        }

        let mut n = 0;
        let mut ok = false;
        while n < buf.len() && !self.items.is_empty() {
            let len = BLOCK_SIZE.min(buf.len() - n);
            let out = &mut buf[n..n + len];
            out.fill(Sample::SILENCE);

            let scratch = &mut self.scratch[..len];
            let mut produced = 0;
            self.items.retain_mut(|item| {
                let (sn, sok) = fill(item, scratch);
                for (o, s) in out.iter_mut().zip(&scratch[..sn]) {
                    *o += *s;
                }
                produced = produced.max(sn);
                ok |= sok;
                sok
            });

            n += produced;
            if produced < len {
                break;
            }
        }
        (n, ok)
    }
}
