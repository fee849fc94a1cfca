//! Byte encoding of samples.
//!
//! `N` samples in a [`Format`] take `N * channels * precision` bytes. Each
//! channel value is a little-endian integer of `precision` bytes, either
//! two's complement (signed) or offset binary (unsigned).

use crate::error::{Error, Result};
use crate::sample::{Sample, SampleRate};

/// Largest supported number of bytes per channel value.
pub const MAX_PRECISION: usize = 6;

/// Layout of encoded audio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Format {
    pub sample_rate: SampleRate,
    /// 1 is mono, 2 is stereo. Channels are interleaved.
    pub channels: usize,
    /// Bytes per channel value, 1 to 6
    pub precision: usize,
}

impl Format {
    pub fn new(sample_rate: SampleRate, channels: usize, precision: usize) -> Result<Self> {
        if sample_rate.hz() == 0 {
            return Err(Error::config("sample rate must be positive"));
        }
        if channels == 0 {
            return Err(Error::config("a format needs at least one channel"));
        }
        if !(1..=MAX_PRECISION).contains(&precision) {
            return Err(Error::config(format!(
                "precision must be 1 to {MAX_PRECISION} bytes, got {precision}"
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
            precision,
        })
    }

    /// Bytes taken by one encoded sample.
    #[inline]
    pub fn width(&self) -> usize {
        self.channels * self.precision
    }

    /// Encode `sample` into the first [`width`](Self::width) bytes of `out`
    /// as signed integers. Mono formats store the average of both channels,
    /// formats with more than two channels pad with zeros.
    ///
    /// # Panics
    ///
    /// If `out` is shorter than `width()`.
    pub fn encode_signed(&self, out: &mut [u8], sample: Sample) -> usize {
        self.encode(out, sample, true)
    }

    /// Like [`encode_signed`](Self::encode_signed), but offset binary.
    pub fn encode_unsigned(&self, out: &mut [u8], sample: Sample) -> usize {
        self.encode(out, sample, false)
    }

    /// Decode one signed sample from the front of `bytes`. Mono is
    /// duplicated to both channels, channels past the second are ignored.
    ///
    /// # Panics
    ///
    /// If `bytes` is shorter than `width()`.
    pub fn decode_signed(&self, bytes: &[u8]) -> Sample {
        self.decode(bytes, true)
    }

    pub fn decode_unsigned(&self, bytes: &[u8]) -> Sample {
        self.decode(bytes, false)
    }

    fn encode(&self, out: &mut [u8], sample: Sample, signed: bool) -> usize {
        let p = self.precision;
        if self.channels == 1 {
            let x = ((sample.left + sample.right) / 2.0).clamp(-1.0, 1.0);
            encode_value(&mut out[..p], x, signed);
        } else {
            for ch in 0..self.channels {
                let x = if ch < 2 {
                    sample.channel(ch).clamp(-1.0, 1.0)
                } else {
                    0.0
                };
                encode_value(&mut out[ch * p..(ch + 1) * p], x, signed);
            }
        }
        self.width()
    }

    fn decode(&self, bytes: &[u8], signed: bool) -> Sample {
        let p = self.precision;
        let left = decode_value(&bytes[..p], signed);
        if self.channels == 1 {
            return Sample::mono(left);
        }
        Sample::new(left, decode_value(&bytes[p..2 * p], signed))
    }
}

/// Largest magnitude of a signed value of `bytes` bytes
#[inline]
fn signed_scale(bytes: usize) -> f64 {
    ((1u64 << (bytes * 8 - 1)) - 1) as f64
}

#[inline]
fn unsigned_scale(bytes: usize) -> f64 {
    ((1u64 << (bytes * 8)) - 1) as f64
}

fn encode_value(out: &mut [u8], x: f64, signed: bool) {
    let bits = out.len() * 8;
    let mut v: u64 = if signed {
        if x < 0.0 {
            let magnitude = (-x * signed_scale(out.len())) as u64;
            (1u64 << bits).wrapping_sub(magnitude)
        } else {
            (x * signed_scale(out.len())) as u64
        }
    } else {
        ((x + 1.0) / 2.0 * unsigned_scale(out.len())) as u64
    };
    for byte in out.iter_mut() {
        *byte = v as u8;
        v >>= 8;
    }
}

fn decode_value(bytes: &[u8], signed: bool) -> f64 {
    let v = bytes.iter().rev().fold(0u64, |acc, &b| (acc << 8) | b as u64);
    let bits = bytes.len() * 8;
    if signed {
        if v >= 1u64 << (bits - 1) {
            let magnitude = (1u64 << bits) - v;
            -(magnitude as f64) / signed_scale(bytes.len())
        } else {
            v as f64 / signed_scale(bytes.len())
        }
    } else {
        v as f64 / unsigned_scale(bytes.len()) * 2.0 - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn formats() -> impl Iterator<Item = Format> {
        [100u32, 2347, 44100, 48000].into_iter().flat_map(|rate| {
            (1..=4).flat_map(move |channels| {
                (1..=MAX_PRECISION)
                    .map(move |precision| Format::new(SampleRate(rate), channels, precision).unwrap())
            })
        })
    }

    #[test]
    fn encode_decode_within_one_step() {
        let mut rng = rand::thread_rng();
        for format in formats() {
            let deviation = 2.0 / (2f64.powi(format.precision as i32 * 8) - 2.0);
            let mut tmp = vec![0u8; format.width()];
            for _ in 0..20 {
                let sample = Sample::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
                for signed in [true, false] {
                    let written = if signed {
                        format.encode_signed(&mut tmp, sample)
                    } else {
                        format.encode_unsigned(&mut tmp, sample)
                    };
                    assert_eq!(written, format.width());
                    let decoded = if signed {
                        format.decode_signed(&tmp)
                    } else {
                        format.decode_unsigned(&tmp)
                    };

                    if format.channels == 1 {
                        let avg = (sample.left + sample.right) / 2.0;
                        assert!((avg - decoded.left).abs() <= deviation, "{format:?} {sample:?} -> {decoded:?}");
                        assert_eq!(decoded.left, decoded.right);
                    } else {
                        assert!((sample.left - decoded.left).abs() <= deviation, "{format:?} {sample:?} -> {decoded:?}");
                        assert!((sample.right - decoded.right).abs() <= deviation, "{format:?} {sample:?} -> {decoded:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let format = Format::new(SampleRate(44100), 2, 2).unwrap();
        let mut tmp = [0u8; 4];
        format.encode_signed(&mut tmp, Sample::new(3.0, -3.0));
        assert_eq!(format.decode_signed(&tmp), Sample::new(1.0, -1.0));
    }

    #[test]
    fn extra_channels_are_padded_with_zero() {
        let format = Format::new(SampleRate(44100), 3, 1).unwrap();
        let mut tmp = [0xffu8; 3];
        format.encode_signed(&mut tmp, Sample::new(0.5, 0.5));
        assert_eq!(tmp[2], 0);
    }

    #[test]
    fn invalid_formats_are_rejected() {
        assert!(Format::new(SampleRate(44100), 0, 2).is_err());
        assert!(Format::new(SampleRate(44100), 2, 0).is_err());
        assert!(Format::new(SampleRate(44100), 2, 7).is_err());
        assert!(Format::new(SampleRate(0), 2, 2).is_err());
    }
}
