//! Sound travelling from a moving source

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::producer::{Producer, BLOCK_SIZE};
use crate::resample::Resampler;
use crate::sample::Sample;

/// Plays a producer as heard from a distance.
///
/// The air between source and listener is a queue of samples. It starts out
/// holding `distance(0) * samples_per_meter` samples of silence, so a far
/// source takes a while to be heard. Before every pull the distance function
/// is called with the number of samples about to be pulled; when the distance
/// changes, the source is resampled so that the queue grows or shrinks to
/// match. An approaching source plays faster and higher, a receding one
/// slower and lower.
///
/// Samples are attenuated by the inverse square of the distance at the time
/// they enter the air. Distances below one meter count as one meter.
pub struct Doppler<P, F> {
    resampler: Resampler<P>,
    distance: F,
    samples_per_meter: f64,
    space: VecDeque<Sample>,
    scratch: Vec<Sample>,
    /// The source has nothing more to send into the air
    ended: bool,
    done: bool,
}

impl<P, F> Doppler<P, F>
where
    P: Producer,
    F: FnMut(usize) -> f64 + Send,
{
    /// `samples_per_meter` is the sample rate divided by the speed of sound.
    /// `quality` is that of the underlying [`Resampler`].
    pub fn new(quality: usize, samples_per_meter: f64, inner: P, mut distance: F) -> Result<Self> {
        if !(samples_per_meter.is_finite() && samples_per_meter > 0.0) {
            return Err(Error::config(format!(
                "samples per meter must be positive, got {samples_per_meter}"
            )));
        }
        let resampler = Resampler::with_ratio(quality, 1.0, inner)?;
        let gap = air_len(distance(0), samples_per_meter);
        Ok(Self {
            resampler,
            distance,
            samples_per_meter,
            space: VecDeque::from(vec![Sample::SILENCE; gap]),
            scratch: vec![Sample::SILENCE; BLOCK_SIZE],
            ended: false,
            done: false,
        })
    }

    /// Playback speed of the source during the last pull
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.resampler.ratio()
    }

    /// Samples currently travelling through the air
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.space.len()
    }

    /// Resample enough of the source for the air to reach `target` samples
    /// after `len` leave it. Returns false if the source failed.
    fn send(&mut self, len: usize, target: usize, gain: f64) -> bool {
        let want = target
            .saturating_add(len)
            .saturating_sub(self.space.len())
            .max(1);
        // both at least one, so the ratio is always valid
        let _ = self.resampler.set_ratio(len as f64 / want as f64);

        let mut got = 0;
        while got < want {
            let k = (want - got).min(BLOCK_SIZE);
            let (n, ok) = self.resampler.pull(&mut self.scratch[..k]);
            self.space.extend(self.scratch[..n].iter().map(|&s| s * gain));
            got += n;
            if !ok {
                self.ended = true;
                return self.resampler.last_error().is_none();
            }
            if n == 0 {
                break;
            }
        }
        true
    }
}

fn air_len(distance: f64, samples_per_meter: f64) -> usize {
    // NaN and negative distances land on zero
    (distance.max(0.0) * samples_per_meter) as usize
}

impl<P, F> Producer for Doppler<P, F>
where
    P: Producer,
    F: FnMut(usize) -> f64 + Send,
{
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        if self.done {
            return (0, false);
        }
        if buf.is_empty() {
            return (0, true);
        }

        let len = buf.len();
        let distance = (self.distance)(len);
        if !self.ended {
            let target = air_len(distance, self.samples_per_meter);
            let gain = 1.0 / distance.max(1.0).powi(2);
            if !self.send(len, target, gain) {
                self.done = true;
                let n = len.min(self.space.len());
                for (out, s) in buf.iter_mut().zip(self.space.drain(..n)) {
                    *out = s;
                }
                return (n, false);
            }
        }

        if self.space.is_empty() {
            self.done = self.ended;
            return (0, !self.ended);
        }
        let n = len.min(self.space.len());
        for (out, s) in buf.iter_mut().zip(self.space.drain(..n)) {
            *out = s;
        }
        (n, true)
    }

    fn last_error(&self) -> Option<Error> {
        self.resampler.last_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::take;
    use crate::producer::{collect, from_fn};

    fn counting() -> impl Producer {
        let mut i = 0;
        from_fn(move |buf: &mut [Sample]| {
            for s in buf.iter_mut() {
                *s = Sample::mono(i as f64);
                i += 1;
            }
            (buf.len(), true)
        })
    }

    #[test]
    fn still_source_is_delayed_and_attenuated() {
        let mut d = Doppler::new(1, 1.0, take(100, counting()), |_| 10.0).unwrap();
        assert_eq!(d.in_flight(), 10);
        let out = collect(&mut d);
        assert_eq!(out.len(), 110);
        assert!(out[..10].iter().all(|&s| s == Sample::SILENCE));
        for (i, s) in out[10..].iter().enumerate() {
            assert!((s.left - i as f64 / 100.0).abs() < 1e-12, "{i}: {s:?}");
        }
        assert_eq!(d.ratio(), 1.0);
    }

    #[test]
    fn approaching_source_speeds_up() {
        let mut t = 0;
        let mut d = Doppler::new(2, 1.0, counting(), move |delta| {
            t += delta;
            100.0 - t as f64 * 0.1
        })
        .unwrap();
        let mut buf = [Sample::SILENCE; 64];
        assert_eq!(d.pull(&mut buf), (64, true));
        assert!(d.ratio() > 1.0, "{}", d.ratio());
        assert_eq!(d.in_flight(), 93);
    }

    #[test]
    fn receding_source_slows_down() {
        let mut t = 0;
        let mut d = Doppler::new(2, 1.0, counting(), move |delta| {
            t += delta;
            100.0 + t as f64 * 0.1
        })
        .unwrap();
        let mut buf = [Sample::SILENCE; 64];
        assert_eq!(d.pull(&mut buf), (64, true));
        assert!(d.ratio() < 1.0, "{}", d.ratio());
        assert_eq!(d.in_flight(), 106);
    }

    #[test]
    fn rejects_bad_speed_of_sound() {
        assert!(matches!(
            Doppler::new(1, 0.0, counting(), |_| 1.0),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Doppler::new(0, 1.0, counting(), |_| 1.0),
            Err(Error::Config(_))
        ));
    }
}
