//! Fan-out of one producer into two independent views

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Error;
use crate::producer::Producer;
use crate::sample::Sample;

struct Shared<P> {
    source: P,
    /// Samples already pulled from `source` but not yet read by each view
    queues: [VecDeque<Sample>; 2],
    attached: [bool; 2],
    live: bool,
}

impl<P> Shared<P> {
    /// Nothing left for `side`, now or later
    fn drained(&self, side: usize) -> bool {
        !self.live && self.queues[side].is_empty()
    }
}

/// One of the two views returned by [`dup`].
///
/// Each view sees the full output of the shared source exactly once, no
/// matter how the two are pulled relative to each other. Samples one view
/// has read ahead of the other are queued for the slower one, so the views
/// should be pulled at roughly the same pace.
pub struct DupView<P> {
    shared: Arc<Mutex<Shared<P>>>,
    side: usize,
}

/// Split `source` into two views of the same sample sequence.
///
/// The source is pulled once per sample; whichever view gets there first
/// queues a copy for the other. It is dropped when both views are.
pub fn dup<P: Producer>(source: P) -> (DupView<P>, DupView<P>) {
    let shared = Arc::new(Mutex::new(Shared {
        source,
        queues: [VecDeque::new(), VecDeque::new()],
        attached: [true, true],
        live: true,
    }));
    (
        DupView {
            shared: shared.clone(),
            side: 0,
        },
        DupView { shared, side: 1 },
    )
}

impl<P> DupView<P> {
    fn lock(&self) -> MutexGuard<'_, Shared<P>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Samples queued for this view
    pub fn queued(&self) -> usize {
        self.lock().queues[self.side].len()
    }
}

impl<P: Producer> Producer for DupView<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let side = self.side;
        let other = 1 - side;
        let mut shared = self.lock();
        let shared = &mut *shared;

        let queue = &mut shared.queues[side];
        let mut n = buf.len().min(queue.len());
        for (out, s) in buf.iter_mut().zip(queue.drain(..n)) {
            *out = s;
        }

        if n < buf.len() && shared.live {
            let (sn, ok) = shared.source.pull(&mut buf[n..]);
            if shared.attached[other] {
                shared.queues[other].extend(&buf[n..n + sn]);
            }
            n += sn;
            shared.live = ok;
        }

        if shared.drained(side) && (n == 0 || shared.source.last_error().is_some()) {
            return (n, false);
        }
        (n, true)
    }

    /// The source's error, once this view has read everything before it.
    fn last_error(&self) -> Option<Error> {
        let shared = self.lock();
        if shared.drained(self.side) {
            shared.source.last_error()
        } else {
            None
        }
    }
}

impl<P> Drop for DupView<P> {
    fn drop(&mut self) {
        let side = self.side;
        let mut shared = self.lock();
        shared.attached[side] = false;
        shared.queues[side] = VecDeque::new();
    }
}
