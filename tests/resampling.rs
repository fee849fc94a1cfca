//! Resampler output checked against a direct Lagrange evaluation and
//! against independently generated sine waves.

use dasp_signal::{self as signal, Signal};
use itertools::Itertools;
use proptest::prelude::*;
use strom::compose::take;
use strom::{collect, from_fn, Producer, Resampler, Sample, SampleRate};

fn from_vec(data: Vec<Sample>, chunk: usize) -> impl Producer {
    let mut pos = 0;
    from_fn(move |buf: &mut [Sample]| {
        let k = buf.len().min(chunk).min(data.len() - pos);
        buf[..k].copy_from_slice(&data[pos..pos + k]);
        pos += k;
        (k, k > 0)
    })
}

/// Evaluate the interpolating polynomial through the `2 * q` input samples
/// around each output position, one output sample at a time.
fn reference(input: &[Sample], q: usize, ratio: f64) -> Vec<Sample> {
    let at = |l: i64| -> Sample {
        if l < 0 || l as usize >= input.len() {
            Sample::SILENCE
        } else {
            input[l as usize]
        }
    };
    let q = q as i64;
    let mut out = Vec::new();
    for i in 0u64.. {
        let j = i as f64 * ratio;
        let base = j.floor() as i64;
        if base >= input.len() as i64 {
            break;
        }
        let first = base - q + 1;
        let mut y = Sample::SILENCE;
        for k in 0..2 * q {
            let xk = (first + k) as f64;
            let mut w = 1.0;
            for m in 0..2 * q {
                if m != k {
                    let xm = (first + m) as f64;
                    w *= (j - xm) / (xk - xm);
                }
            }
            let s = at(first + k);
            y.left += s.left * w;
            y.right += s.right * w;
        }
        out.push(y);
    }
    out
}

fn sine(rate: f64, hz: f64, n: usize) -> Vec<f64> {
    signal::rate(rate).const_hz(hz).sine().take(n).collect()
}

/// Largest deviation of the resampled 440 Hz tone from one generated at the
/// target rate, ignoring the edges where the input is padded with silence.
fn sine_error(quality: usize) -> f64 {
    let input: Vec<Sample> = sine(44100.0, 440.0, 4410)
        .into_iter()
        .map(Sample::mono)
        .collect();
    let mut r = Resampler::new(quality, SampleRate(44100), SampleRate(48000), from_vec(input, 512))
        .unwrap();
    let out = collect(&mut r);
    let expected = sine(48000.0, 440.0, out.len());
    out.iter()
        .zip(&expected)
        .skip(100)
        .take(out.len().saturating_sub(200))
        .map(|(s, e)| (s.left - e).abs())
        .fold(0.0, f64::max)
}

proptest! {
    #[test]
    fn matches_direct_evaluation(
        input in prop::collection::vec((-1.0f64..1.0, -1.0f64..1.0), 0..1500),
        quality in 1usize..8,
        ratio in 0.25f64..4.0,
        chunk in 1usize..600,
    ) {
        let input: Vec<Sample> = input.into_iter().map(|(l, r)| Sample::new(l, r)).collect();
        let expected = reference(&input, quality, ratio);
        let mut r = Resampler::with_ratio(quality, ratio, from_vec(input, chunk)).unwrap();
        let out = collect(&mut r);
        prop_assert_eq!(out.len(), expected.len());
        for (a, b) in out.iter().zip_eq(&expected) {
            prop_assert!((a.left - b.left).abs() < 1e-9);
            prop_assert!((a.right - b.right).abs() < 1e-9);
        }
    }

    /// Pull sizes do not change the output
    #[test]
    fn output_is_independent_of_pull_sizes(
        sizes in prop::collection::vec(1usize..300, 1..6),
        ratio in 0.5f64..2.0,
    ) {
        let tone = || take(3000, from_fn({
            let mut s = signal::rate(8000.0).const_hz(300.0).sine();
            move |buf: &mut [Sample]| {
                for out in buf.iter_mut() {
                    *out = Sample::mono(s.next());
                }
                (buf.len(), true)
            }
        }));
        let expected = collect(&mut Resampler::with_ratio(3, ratio, tone()).unwrap());

        let mut r = Resampler::with_ratio(3, ratio, tone()).unwrap();
        let mut out = Vec::new();
        let mut buf = [Sample::SILENCE; 300];
        for &size in sizes.iter().cycle() {
            let (n, ok) = r.pull(&mut buf[..size]);
            out.extend_from_slice(&buf[..n]);
            if !ok {
                break;
            }
        }
        prop_assert_eq!(out, expected);
    }
}

#[test]
fn higher_quality_is_more_accurate() {
    let linear = sine_error(1);
    let cubic = sine_error(2);
    let high = sine_error(8);
    assert!(linear < 1e-2, "{linear}");
    assert!(cubic < linear, "{cubic} >= {linear}");
    assert!(high < 1e-6, "{high}");
}

#[test]
fn upsampling_keeps_the_duration() {
    let input = vec![Sample::mono(0.1); 44100];
    let mut r = Resampler::new(4, SampleRate(44100), SampleRate(88200), from_vec(input, 1000)).unwrap();
    assert_eq!(collect(&mut r).len(), 88200);
}

/// Largest deviation after converting 44100 -> 48000 -> 44100 Hz.
fn round_trip_error(quality: usize) -> f64 {
    let input: Vec<Sample> = sine(44100.0, 440.0, 4410)
        .into_iter()
        .map(Sample::mono)
        .collect();
    let up = Resampler::new(quality, SampleRate(44100), SampleRate(48000), from_vec(input.clone(), 512))
        .unwrap();
    let mut down = Resampler::new(quality, SampleRate(48000), SampleRate(44100), up).unwrap();
    let out = collect(&mut down);
    assert!(out.len().abs_diff(input.len()) <= 2, "{} samples", out.len());
    out.iter()
        .zip(&input)
        .skip(200)
        .take(input.len().min(out.len()) - 400)
        .map(|(s, x)| (s.left - x.left).abs().max((s.right - x.right).abs()))
        .fold(0.0, f64::max)
}

#[test]
fn round_trip_error_shrinks_with_quality() {
    let linear = round_trip_error(1);
    let cubic = round_trip_error(2);
    let high = round_trip_error(8);
    assert!(linear < 1e-2, "{linear}");
    assert!(cubic < linear, "{cubic} >= {linear}");
    assert!(high < cubic, "{high} >= {cubic}");
    assert!(high < 1e-5, "{high}");
}
