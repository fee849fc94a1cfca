//! Infinite tone generators

use crate::error::{Error, Result};
use crate::producer::Producer;
use crate::sample::{Sample, SampleRate};

/// Shape of one period of a [`Tone`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
    /// Sawtooth with a falling slope
    SawtoothReversed,
}

impl Waveform {
    /// Value at phase `t` in `[0, 1)`
    #[inline]
    fn at(self, t: f64) -> f64 {
        match self {
            Waveform::Sine => (t * core::f64::consts::TAU).sin(),
            Waveform::Square => {
                if t < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
            Waveform::Sawtooth => 2.0 * t - 1.0,
            Waveform::SawtoothReversed => 1.0 - 2.0 * t,
        }
    }
}

/// An endless periodic tone, identical on both channels.
///
/// Bound it with [`Take`](crate::compose::Take) to get a finite sound.
pub struct Tone {
    waveform: Waveform,
    /// Phase increment per sample
    step: f64,
    phase: f64,
    amplitude: f64,
}

impl Tone {
    /// Create a tone of `frequency` Hz at `rate`.
    ///
    /// Fails with [`Error::Config`] unless `0 < frequency < rate / 2`; above
    /// that the tone would alias.
    pub fn new(waveform: Waveform, rate: SampleRate, frequency: f64) -> Result<Self> {
        if rate.hz() == 0 {
            return Err(Error::config("sample rate must be positive"));
        }
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(Error::config(format!("invalid tone frequency {frequency}")));
        }
        let step = frequency / rate.hz() as f64;
        if step >= 0.5 {
            return Err(Error::config(format!(
                "sample rate {} must be more than twice the frequency {frequency}",
                rate.hz()
            )));
        }
        Ok(Self {
            waveform,
            step,
            phase: 0.0,
            amplitude: 1.0,
        })
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude.clamp(0.0, 1.0);
        self
    }

    #[inline]
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    #[inline]
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

pub fn sine(rate: SampleRate, frequency: f64) -> Result<Tone> {
    Tone::new(Waveform::Sine, rate, frequency)
}

pub fn square(rate: SampleRate, frequency: f64) -> Result<Tone> {
    Tone::new(Waveform::Square, rate, frequency)
}

pub fn triangle(rate: SampleRate, frequency: f64) -> Result<Tone> {
    Tone::new(Waveform::Triangle, rate, frequency)
}

pub fn sawtooth(rate: SampleRate, frequency: f64) -> Result<Tone> {
    Tone::new(Waveform::Sawtooth, rate, frequency)
}

pub fn sawtooth_reversed(rate: SampleRate, frequency: f64) -> Result<Tone> {
    Tone::new(Waveform::SawtoothReversed, rate, frequency)
}

impl Producer for Tone {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        for s in buf.iter_mut() {
            *s = Sample::mono(self.waveform.at(self.phase) * self.amplitude);
            self.phase = (self.phase + self.step).fract();
        }
        (buf.len(), true)
    }
}
