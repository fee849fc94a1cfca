//! Sample rate conversion by Lagrange interpolation

use tracing::debug;

use crate::error::{Error, Result};
use crate::producer::{Producer, BLOCK_SIZE};
use crate::sample::{Sample, SampleRate};

/// Highest supported interpolation quality.
pub const MAX_QUALITY: usize = 64;

/// Input positions from here on count as past the end of any input.
const MAX_POSITION: f64 = (1u64 << 62) as f64;

/// Changes the playback rate of a producer.
///
/// Output sample `i` is the input signal evaluated at input position
/// `j = i * ratio`, where `ratio = old_rate / new_rate`. The value there is
/// the Lagrange polynomial through the `2 * quality` input samples around
/// `j`, computed for each channel separately. Input positions before the
/// start or past the end of the input count as silence.
///
/// The ratio can be changed at any time with [`set_ratio`](Self::set_ratio);
/// the input position carries over, so a change of speed or pitch is
/// seamless. Output is fully determined by the input and the sequence of
/// ratio changes.
///
/// Errors of the wrapped producer are forwarded unchanged.
///
/// ```
/// use strom::{collect, Resampler, SampleRate};
/// use strom::compose::take;
/// use strom::source::sine;
///
/// let tone = take(1000, sine(SampleRate(1000), 100.0)?);
/// let mut up = Resampler::new(3, SampleRate(1000), SampleRate(2000), tone)?;
/// assert_eq!(collect(&mut up).len(), 2000);
/// # Ok::<(), strom::Error>(())
/// ```
pub struct Resampler<P> {
    inner: P,
    quality: usize,
    ratio: f64,
    /// Input position at which the current ratio took effect
    anchor: f64,
    /// Output samples produced since `anchor`
    steps: u64,

    /// Input samples `[offset - BLOCK_SIZE, offset)`
    prev: Vec<Sample>,
    /// Input samples `[offset, offset + curr_len)`
    curr: Vec<Sample>,
    curr_len: usize,
    offset: i64,
    /// One past the last input sample, once the input has ended
    end: Option<i64>,

    /// Interpolation weights for the current output sample
    weights: Vec<f64>,
    done: bool,
}

impl<P: Producer> Resampler<P> {
    /// Convert `inner` from `old` to `new` samples per second.
    ///
    /// `quality` is the number of input samples used on each side of an
    /// output sample, 1 to [`MAX_QUALITY`]. 1 or 2 is fine for moderate rate
    /// changes; higher is more accurate and slower.
    pub fn new(quality: usize, old: SampleRate, new: SampleRate, inner: P) -> Result<Self> {
        if old.hz() == 0 || new.hz() == 0 {
            return Err(Error::config(format!(
                "cannot resample from {} Hz to {} Hz",
                old.hz(),
                new.hz()
            )));
        }
        Self::with_ratio(quality, old.hz() as f64 / new.hz() as f64, inner)
    }

    /// Play `inner` at `ratio` times its speed.
    pub fn with_ratio(quality: usize, ratio: f64, inner: P) -> Result<Self> {
        if !(1..=MAX_QUALITY).contains(&quality) {
            return Err(Error::config(format!(
                "resampling quality must be 1 to {MAX_QUALITY}, got {quality}"
            )));
        }
        check_ratio(ratio)?;
        Ok(Self {
            inner,
            quality,
            ratio,
            anchor: 0.0,
            steps: 0,
            prev: vec![Sample::SILENCE; BLOCK_SIZE],
            curr: vec![Sample::SILENCE; BLOCK_SIZE],
            curr_len: 0,
            offset: 0,
            end: None,
            weights: vec![0.0; quality * 2],
            done: false,
        })
    }

    /// Current `old_rate / new_rate`
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Change the ratio without disturbing the input position.
    ///
    /// Fails with [`Error::Config`] unless `ratio` is positive and finite.
    pub fn set_ratio(&mut self, ratio: f64) -> Result<()> {
        check_ratio(ratio)?;
        self.anchor = self.position();
        self.steps = 0;
        self.ratio = ratio;
        debug!(ratio, position = self.anchor, "resampler ratio changed");
        Ok(())
    }

    #[inline]
    pub fn quality(&self) -> usize {
        self.quality
    }

    /// Input position of the next output sample
    #[inline]
    fn position(&self) -> f64 {
        self.anchor + self.steps as f64 * self.ratio
    }

    /// Input sample `l`, silence outside the input
    #[inline]
    fn input(&self, l: i64) -> Sample {
        if l < 0 || self.end.is_some_and(|end| l >= end) {
            return Sample::SILENCE;
        }
        if l >= self.offset {
            self.curr[(l - self.offset) as usize]
        } else if l >= self.offset - BLOCK_SIZE as i64 {
            self.prev[(l - self.offset + BLOCK_SIZE as i64) as usize]
        } else {
            Sample::SILENCE
        }
    }

    /// Make input samples up to `last` available. Returns false if the input
    /// stalled before getting there.
    fn load_through(&mut self, last: i64) -> bool {
        while self.end.is_none() && last >= self.offset + self.curr_len as i64 {
            if self.curr_len == BLOCK_SIZE {
                core::mem::swap(&mut self.prev, &mut self.curr);
                self.offset += BLOCK_SIZE as i64;
                self.curr_len = 0;
            }
            let (n, ok) = self.inner.pull(&mut self.curr[self.curr_len..]);
            self.curr_len += n;
            if !ok {
                self.end = Some(self.offset + self.curr_len as i64);
            } else if n == 0 {
                return false;
            }
        }
        true
    }
}

fn check_ratio(ratio: f64) -> Result<()> {
    if ratio.is_finite() && ratio > 0.0 {
        Ok(())
    } else {
        Err(Error::config(format!("invalid resampling ratio {ratio}")))
    }
}

impl<P: Producer> Producer for Resampler<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        if self.done {
            return (0, false);
        }

        let q = self.quality as i64;
        let mut n = 0;
        while n < buf.len() {
            let j = self.position();
            if j >= MAX_POSITION {
                self.done = true;
                break;
            }
            let base = j.floor() as i64;
            if !self.load_through(base + q) {
                break;
            }
            if self.end.is_some() && self.inner.last_error().is_some() {
                self.done = true;
                return (n, false);
            }
            if self.end.is_some_and(|end| base >= end) {
                self.done = true;
                break;
            }

            let first = base - q + 1;
            for (k, w) in self.weights.iter_mut().enumerate() {
                let xk = (first + k as i64) as f64;
                let mut l = 1.0;
                for m in 0..2 * q {
                    if m == k as i64 {
                        continue;
                    }
                    let xm = (first + m) as f64;
                    l *= (j - xm) / (xk - xm);
                }
                *w = l;
            }

            let mut out = Sample::SILENCE;
            for (k, w) in self.weights.iter().enumerate() {
                let s = self.input(first + k as i64);
                for ch in 0..2 {
                    *out.channel_mut(ch) += s.channel(ch) * w;
                }
            }
            buf[n] = out;
            n += 1;
            self.steps += 1;
        }

        if self.done {
            return (n, n > 0);
        }
        (n, true)
    }

    fn last_error(&self) -> Option<Error> {
        self.inner.last_error()
    }
}
