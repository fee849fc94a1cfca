//! In-memory sample storage addressed by time.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::format::Format;
use crate::producer::{Producer, Seekable, BLOCK_SIZE};
use crate::sample::Sample;

/// Encoded samples in memory.
///
/// Samples are appended at the back by draining producers, discarded from
/// the front with [`pop`](Self::pop), and read back through [`Slice`]s.
/// Slices share the stored bytes; changing the buffer afterwards does not
/// affect slices that already exist.
///
/// ```
/// use std::time::Duration;
/// use strom::{Buffer, Format, SampleRate, Seekable};
/// use strom::source::silence;
///
/// let rate = SampleRate(44100);
/// let mut buffer = Buffer::new(Format::new(rate, 2, 2)?);
/// buffer.append(silence(768));
/// buffer.pop(rate.duration_for(512));
/// assert_eq!(buffer.len(), 256);
///
/// let slice = buffer.slice(Duration::ZERO, buffer.duration())?;
/// assert_eq!(slice.len(), 256);
/// # Ok::<(), strom::Error>(())
/// ```
pub struct Buffer {
    format: Format,
    data: Arc<Vec<u8>>,
}

impl Buffer {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            data: Arc::new(Vec::new()),
        }
    }

    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    /// Number of samples stored
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / self.format.width()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Playing time of the stored samples
    pub fn duration(&self) -> Duration {
        self.format.sample_rate.duration_for(self.len())
    }

    /// Drain `p` to exhaustion, appending everything it produces.
    ///
    /// There is no limit: an endless producer has to be bounded by the
    /// caller, e.g. with [`Take`](crate::compose::Take).
    pub fn append<P: Producer>(&mut self, mut p: P) {
        let width = self.format.width();
        let format = self.format;
        let data = Arc::make_mut(&mut self.data);
        let mut block = [Sample::SILENCE; BLOCK_SIZE];
        let mut appended = 0;
        loop {
            let (n, ok) = p.pull(&mut block);
            let start = data.len();
            data.resize(start + n * width, 0);
            for (bytes, s) in data[start..].chunks_exact_mut(width).zip(&block[..n]) {
                format.encode_signed(bytes, *s);
            }
            appended += n;
            if !ok {
                break;
            }
        }
        debug!(appended, total = self.len(), "appended to buffer");
    }

    /// Discard up to `d` worth of samples from the front.
    pub fn pop(&mut self, d: Duration) {
        let n = self.format.sample_rate.samples_for(d).min(self.len());
        if n == 0 {
            return;
        }
        let width = self.format.width();
        Arc::make_mut(&mut self.data).drain(..n * width);
    }

    /// A producer reading the samples between `from` and `to`.
    ///
    /// Fails with [`Error::OutOfRange`] if `to` is past the end or before
    /// `from`.
    pub fn slice(&self, from: Duration, to: Duration) -> Result<Slice> {
        let rate = self.format.sample_rate;
        let (start, end) = (rate.samples_for(from), rate.samples_for(to));
        if end > self.len() {
            return Err(Error::OutOfRange {
                index: end,
                len: self.len(),
            });
        }
        if start > end {
            return Err(Error::OutOfRange {
                index: start,
                len: end,
            });
        }
        Ok(self.slice_samples(start, end))
    }

    /// A producer reading the whole buffer.
    pub fn streamer(&self) -> Slice {
        self.slice_samples(0, self.len())
    }

    fn slice_samples(&self, start: usize, end: usize) -> Slice {
        Slice {
            format: self.format,
            data: self.data.clone(),
            start,
            len: end - start,
            pos: 0,
        }
    }
}

/// Read-only view of part of a [`Buffer`], with its own position.
#[derive(Clone)]
pub struct Slice {
    format: Format,
    data: Arc<Vec<u8>>,
    /// First sample, as an index into `data`
    start: usize,
    len: usize,
    pos: usize,
}

impl Slice {
    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }
}

impl Producer for Slice {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        if self.pos >= self.len {
            return (0, false);
        }
        let width = self.format.width();
        let n = buf.len().min(self.len - self.pos);
        let from = (self.start + self.pos) * width;
        let bytes = &self.data[from..from + n * width];
        for (out, chunk) in buf.iter_mut().zip(bytes.chunks_exact(width)) {
            *out = self.format.decode_signed(chunk);
        }
        self.pos += n;
        (n, true)
    }
}

impl Seekable for Slice {
    fn len(&self) -> usize {
        self.len
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.len {
            return Err(Error::OutOfRange {
                index: pos,
                len: self.len,
            });
        }
        self.pos = pos;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::take;
    use crate::producer::{collect, from_fn};
    use crate::sample::SampleRate;
    use crate::source::silence;

    fn counting(format: Format, n: usize) -> Buffer {
        let mut buffer = Buffer::new(format);
        let mut i = 0;
        buffer.append(take(
            n,
            from_fn(move |buf: &mut [Sample]| {
                for s in buf.iter_mut() {
                    *s = Sample::new(i as f64 / 1000.0, -(i as f64) / 1000.0);
                    i += 1;
                }
                (buf.len(), true)
            }),
        ));
        buffer
    }

    #[test]
    fn pop_clamps_to_length() {
        let mut buffer = Buffer::new(Format::new(SampleRate(44100), 2, 2).unwrap());
        buffer.append(silence(100));
        buffer.pop(Duration::from_secs(10));
        assert!(buffer.is_empty());
        buffer.pop(Duration::from_secs(1));
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn slice_reads_the_requested_range() {
        let rate = SampleRate(1000);
        let buffer = counting(Format::new(rate, 2, 3).unwrap(), 900);
        let mut slice = buffer
            .slice(rate.duration_for(100), rate.duration_for(300))
            .unwrap();
        assert_eq!(slice.len(), 200);
        let out = collect(&mut slice);
        assert_eq!(out.len(), 200);
        assert!((out[0].left - 0.1).abs() < 1e-6);
        assert!((out[199].right + 0.299).abs() < 1e-6);
    }

    #[test]
    fn slice_out_of_range_fails() {
        let rate = SampleRate(1000);
        let buffer = counting(Format::new(rate, 2, 2).unwrap(), 10);
        assert!(matches!(
            buffer.slice(Duration::ZERO, rate.duration_for(11)),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            buffer.slice(rate.duration_for(5), rate.duration_for(4)),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn seek_checks_bounds_and_keeps_position() {
        let buffer = counting(Format::new(SampleRate(1000), 1, 2).unwrap(), 10);
        let mut slice = buffer.streamer();
        let mut buf = [Sample::SILENCE; 4];
        slice.pull(&mut buf);
        assert!(slice.seek(11).is_err());
        assert_eq!(slice.position(), 4);
        slice.seek(10).unwrap();
        assert_eq!(slice.pull(&mut buf), (0, false));
        slice.seek(9).unwrap();
        assert_eq!(slice.pull(&mut buf), (1, true));
    }

    #[test]
    fn slices_are_independent_of_later_changes() {
        let rate = SampleRate(1000);
        let mut buffer = counting(Format::new(rate, 2, 2).unwrap(), 10);
        let mut a = buffer.streamer();
        let mut b = buffer.streamer();
        buffer.pop(rate.duration_for(5));
        buffer.append(silence(20));
        assert_eq!(buffer.len(), 25);

        let mut buf = [Sample::SILENCE; 3];
        a.pull(&mut buf);
        assert_eq!(collect(&mut b).len(), 10);
        assert_eq!(collect(&mut a).len(), 7);
    }
}
