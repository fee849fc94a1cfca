//! Amplitude control

use crate::error::Error;
use crate::producer::Producer;
use crate::sample::{Sample, SampleRate};

/// Scales the wrapped producer by a linear gain (1.0 = unity, 0.0 = silence).
///
/// Gain changes take effect on the next pulled sample unless smoothing is
/// enabled, in which case the applied gain glides towards the target.
pub struct Gain<P> {
    inner: P,
    gain: f64,
    /// Gain applied to the last sample
    smoothed: f64,
    /// 0.0 is instant, closer to 1.0 is slower
    smooth_coeff: f64,
}

impl<P: Producer> Gain<P> {
    pub fn new(gain: f64, inner: P) -> Self {
        Self {
            inner,
            gain,
            smoothed: gain,
            smooth_coeff: 0.0,
        }
    }

    /// Glide to a new gain over roughly `ms` milliseconds (one time constant).
    pub fn with_smoothing_ms(mut self, ms: f64, rate: SampleRate) -> Self {
        let samples = ms / 1000.0 * rate.hz() as f64;
        self.smooth_coeff = if samples > 0.0 { (-1.0 / samples).exp() } else { 0.0 };
        self
    }

    #[inline]
    pub fn gain(&self) -> f64 {
        self.gain
    }

    #[inline]
    pub fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: Producer> Producer for Gain<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let (n, ok) = self.inner.pull(buf);
        if self.smooth_coeff == 0.0 {
            self.smoothed = self.gain;
            for s in &mut buf[..n] {
                *s *= self.gain;
            }
        } else {
            let (target, coeff) = (self.gain, self.smooth_coeff);
            let mut gain = self.smoothed;
            for s in &mut buf[..n] {
                gain = target + coeff * (gain - target);
                *s *= gain;
            }
            self.smoothed = gain;
        }
        (n, ok)
    }

    fn last_error(&self) -> Option<Error> {
        self.inner.last_error()
    }
}

/// Volume on a perceptual scale.
///
/// The applied gain is `base ^ volume`, so 0 changes nothing, negative
/// values are quieter and positive ones louder. A base around 2 feels
/// natural; with base 10, `volume` is decibels divided by 10. Since no
/// exponent reaches zero gain, [`set_silent`](Self::set_silent) mutes.
pub struct Volume<P> {
    inner: P,
    pub base: f64,
    pub volume: f64,
    pub silent: bool,
}

impl<P: Producer> Volume<P> {
    pub fn new(base: f64, volume: f64, inner: P) -> Self {
        Self {
            inner,
            base,
            volume,
            silent: false,
        }
    }

    #[inline]
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    #[inline]
    pub fn set_silent(&mut self, silent: bool) {
        self.silent = silent;
    }

    /// Gain the current settings amount to
    pub fn gain(&self) -> f64 {
        if self.silent {
            0.0
        } else {
            self.base.powf(self.volume)
        }
    }
}

impl<P: Producer> Producer for Volume<P> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let (n, ok) = self.inner.pull(buf);
        let gain = self.gain();
        for s in &mut buf[..n] {
            *s *= gain;
        }
        (n, ok)
    }

    fn last_error(&self) -> Option<Error> {
        self.inner.last_error()
    }
}
