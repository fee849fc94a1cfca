//! Parametric equalizer built from peaking biquad sections

use std::f64::consts::PI;

use crate::error::{Error, Result};
use crate::producer::Producer;
use crate::sample::{Sample, SampleRate};

/// One band of an [`Equalizer`].
///
/// The band is a peaking filter: `gain_db` at `f0`, `ref_gain_db` far away
/// from it, and `band_gain_db` at the edges of a band `bandwidth` Hz wide.
/// A reference gain of 0 dB leaves the rest of the spectrum untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EqSection {
    /// Centre frequency in Hz
    pub f0: f64,
    /// Width in Hz of the band, measured where the gain is `band_gain_db`
    pub bandwidth: f64,
    pub band_gain_db: f64,
    pub ref_gain_db: f64,
    pub gain_db: f64,
}

impl EqSection {
    /// Boost or cut of `gain_db` around `f0`, with the band edges at half
    /// the gain in dB.
    pub fn peak(f0: f64, bandwidth: f64, gain_db: f64) -> Self {
        Self {
            f0,
            bandwidth,
            band_gain_db: gain_db / 2.0,
            ref_gain_db: 0.0,
            gain_db,
        }
    }
}

/// Second order filter in direct form I, state kept per channel
#[derive(Clone, Debug)]
struct Biquad {
    b: [f64; 3],
    a1: f64,
    a2: f64,
    x1: Sample,
    x2: Sample,
    y1: Sample,
    y2: Sample,
}

impl Biquad {
    fn new(rate: SampleRate, s: &EqSection) -> Result<Self> {
        let nyquist = rate.hz() as f64 / 2.0;
        if !(s.f0 > 0.0 && s.f0 < nyquist) {
            return Err(Error::config(format!(
                "equalizer frequency {} Hz outside (0, {nyquist}) Hz",
                s.f0
            )));
        }
        if !(s.bandwidth > 0.0 && s.bandwidth < nyquist) {
            return Err(Error::config(format!(
                "equalizer bandwidth {} Hz outside (0, {nyquist}) Hz",
                s.bandwidth
            )));
        }

        let power = |db: f64| 10f64.powf(db / 10.0);
        let g = 10f64.powf(s.gain_db / 20.0);
        let g0 = 10f64.powf(s.ref_gain_db / 20.0);
        let beta = (s.bandwidth / 2.0 * PI / nyquist).tan()
            * (power(s.band_gain_db) - power(s.ref_gain_db)).abs().sqrt()
            / (power(s.gain_db) - power(s.band_gain_db)).abs().sqrt();
        let cos_w0 = (s.f0 * PI / nyquist).cos();

        let b = [
            (g0 + g * beta) / (1.0 + beta),
            -2.0 * g0 * cos_w0 / (1.0 + beta),
            (g0 - g * beta) / (1.0 + beta),
        ];
        let a1 = -2.0 * cos_w0 / (1.0 + beta);
        let a2 = (1.0 - beta) / (1.0 + beta);
        if !b.iter().chain([&a1, &a2]).all(|c| c.is_finite()) {
            return Err(Error::config(format!("equalizer section {s:?} is degenerate")));
        }

        Ok(Self {
            b,
            a1,
            a2,
            x1: Sample::SILENCE,
            x2: Sample::SILENCE,
            y1: Sample::SILENCE,
            y2: Sample::SILENCE,
        })
    }

    #[inline]
    fn process(&mut self, x: Sample) -> Sample {
        let y = x * self.b[0] + self.x1 * self.b[1] + self.x2 * self.b[2]
            + self.y1 * -self.a1
            + self.y2 * -self.a2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

/// Runs the wrapped producer through a chain of [`EqSection`]s.
///
/// Filter state carries over between pulls, so the output does not depend
/// on how the stream is split into pulls.
pub struct Equalizer<P> {
    inner: P,
    sections: Vec<Biquad>,
}

impl<P: Producer> Equalizer<P> {
    /// Fails with [`Error::Config`] if a section's frequency or bandwidth is
    /// not between 0 and the Nyquist frequency of `rate`, or if its gains
    /// give no usable filter (band gain equal to the peak gain).
    pub fn new(rate: SampleRate, sections: &[EqSection], inner: P) -> Result<Self> {
        let sections = sections
            .iter()
            .map(|s| Biquad::new(rate, s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { inner, sections })
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: Producer> Producer for Equalizer<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let (n, ok) = self.inner.pull(buf);
        for section in &mut self.sections {
            for s in &mut buf[..n] {
                *s = section.process(*s);
            }
        }
        (n, ok)
    }

    fn last_error(&self) -> Option<Error> {
        self.inner.last_error()
    }
}
