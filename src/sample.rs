//! Sample and sample-rate value types.

use core::ops::{Add, AddAssign, Mul, MulAssign};
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// One stereo sample.
///
/// Producers and sinks keep both channels in `[-1, 1]`, but nothing in between
/// enforces it: a [`Mix`](crate::compose::Mix) of loud inputs may exceed the
/// range until a sink clamps it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sample {
    pub left: f64,
    pub right: f64,
}

impl Sample {
    /// The zero sample.
    pub const SILENCE: Sample = Sample { left: 0.0, right: 0.0 };

    pub const fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    /// Same value on both channels.
    pub const fn mono(value: f64) -> Self {
        Self { left: value, right: value }
    }

    /// Both channels clamped to `[-1, 1]`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            left: self.left.clamp(-1.0, 1.0),
            right: self.right.clamp(-1.0, 1.0),
        }
    }

    #[inline]
    pub(crate) fn channel(&self, ch: usize) -> f64 {
        if ch == 0 {
            self.left
        } else {
            self.right
        }
    }

    #[inline]
    pub(crate) fn channel_mut(&mut self, ch: usize) -> &mut f64 {
        if ch == 0 {
            &mut self.left
        } else {
            &mut self.right
        }
    }
}

impl Add for Sample {
    type Output = Sample;

    #[inline]
    fn add(self, rhs: Sample) -> Sample {
        Sample::new(self.left + rhs.left, self.right + rhs.right)
    }
}

impl AddAssign for Sample {
    #[inline]
    fn add_assign(&mut self, rhs: Sample) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}

impl Mul<f64> for Sample {
    type Output = Sample;

    #[inline]
    fn mul(self, rhs: f64) -> Sample {
        Sample::new(self.left * rhs, self.right * rhs)
    }
}

impl MulAssign<f64> for Sample {
    #[inline]
    fn mul_assign(&mut self, rhs: f64) {
        self.left *= rhs;
        self.right *= rhs;
    }
}

/// Number of samples per second.
///
/// This is the only place where time and sample counts are converted into
/// each other; every other component goes through [`samples_for`](Self::samples_for)
/// and [`duration_for`](Self::duration_for).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SampleRate(pub u32);

impl SampleRate {
    #[inline]
    pub fn hz(self) -> u32 {
        self.0
    }

    /// Number of samples that fit in `d`, truncated.
    pub fn samples_for(self, d: Duration) -> usize {
        (d.as_nanos() * self.0 as u128 / NANOS_PER_SEC) as usize
    }

    /// Duration of `n` samples.
    ///
    /// Rounded up to the next nanosecond, so `samples_for(duration_for(n)) == n`.
    /// A zero rate yields [`Duration::ZERO`].
    pub fn duration_for(self, n: usize) -> Duration {
        if self.0 == 0 {
            return Duration::ZERO;
        }
        let rate = self.0 as u128;
        let nanos = (n as u128 * NANOS_PER_SEC + rate - 1) / rate;
        Duration::new(
            (nanos / NANOS_PER_SEC) as u64,
            (nanos % NANOS_PER_SEC) as u32,
        )
    }
}

impl From<u32> for SampleRate {
    fn from(hz: u32) -> Self {
        SampleRate(hz)
    }
}
