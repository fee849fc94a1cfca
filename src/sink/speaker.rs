//! Playback through the default output device

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::mixer::Mixer;
use crate::producer::{fill, Producer};
use crate::sample::{Sample, SampleRate};

/// Options for opening a [`Speaker`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SpeakerConfig {
    /// Frames per device callback. Bigger is more reliable and uses less
    /// CPU, smaller reacts faster. `None` leaves it to the device.
    pub buffer_size: Option<u32>,
}

/// Plays producers on the default output device.
///
/// The speaker owns a [`Mixer`] behind a single lock. The device callback
/// takes that lock, pulls exactly as many samples as the device asked for,
/// pads with silence and clamps to [-1, 1]. Anything that changes producers
/// in the playing tree must hold the same lock, see [`lock`](Self::lock).
///
/// The stream lives on its own thread, since cpal streams can't be moved
/// between threads. Dropping the speaker stops it.
pub struct Speaker {
    mixer: Arc<Mutex<Mixer>>,
    sample_rate: SampleRate,
    closed: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Speaker {
    pub fn open(config: SpeakerConfig) -> Result<Self> {
        let mixer = Arc::new(Mutex::new(Mixer::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread = {
            let mixer = mixer.clone();
            let closed = closed.clone();
            thread::Builder::new()
                .name("strom-speaker".into())
                .spawn(move || {
                    let stream = match start_stream(config, mixer) {
                        Ok((stream, rate)) => {
                            let _ = ready_tx.send(Ok(rate));
                            stream
                        }
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                    // stream lives as long as this thread
                    while !closed.load(Ordering::Acquire) {
                        thread::park();
                    }
                    drop(stream);
                })?
        };

        let sample_rate = ready_rx
            .recv()
            .map_err(|_| Error::Device("speaker thread exited before the stream started".into()))??;
        debug!(rate = sample_rate.hz(), "speaker started");

        Ok(Self {
            mixer,
            sample_rate,
            closed,
            thread: Some(thread),
        })
    }

    /// Rate the device plays at. Producers should be resampled to it.
    #[inline]
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Start playing `p` alongside whatever is already playing.
    pub fn play<P: Producer + 'static>(&self, p: P) {
        self.lock().add(p);
    }

    /// Start playing several producers in the same callback.
    pub fn play_all<I>(&self, producers: I)
    where
        I: IntoIterator<Item = Box<dyn Producer>>,
    {
        self.lock().add_all(producers);
    }

    /// Stop everything. Samples already handed to the device still play.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Hold the playback lock. The device callback waits while the guard
    /// lives, so keep it short.
    pub fn lock(&self) -> MutexGuard<'_, Mixer> {
        lock(&self.mixer)
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            let _ = thread.join();
        }
        debug!("speaker stopped");
    }
}

fn lock(mixer: &Mutex<Mixer>) -> MutexGuard<'_, Mixer> {
    mixer.lock().unwrap_or_else(PoisonError::into_inner)
}

fn start_stream(
    config: SpeakerConfig,
    mixer: Arc<Mutex<Mixer>>,
) -> Result<(cpal::Stream, SampleRate)> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or_else(|| Error::Device("no output device available".into()))?;
    let supported = device
        .default_output_config()
        .map_err(|e| Error::Device(e.to_string()))?;

    let sample_format = supported.sample_format();
    let mut stream_config = supported.config();
    if let Some(frames) = config.buffer_size {
        stream_config.buffer_size = cpal::BufferSize::Fixed(frames);
    }

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, config, mixer),
        SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, config, mixer),
        SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, config, mixer),
        other => {
            return Err(Error::Device(format!("unsupported sample format {other:?}")));
        }
    }
    .map_err(|e| Error::Device(e.to_string()))?;

    stream.play().map_err(|e| Error::Device(e.to_string()))?;
    Ok((stream, SampleRate(stream_config.sample_rate.0)))
}

fn build_stream<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    config: SpeakerConfig,
    mixer: Arc<Mutex<Mixer>>,
) -> std::result::Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = stream_config.channels as usize;
    let mut scratch = callback_scratch(config);
    device.build_output_stream(
        stream_config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let frames = data.len() / channels;
            if scratch.len() < frames {
                scratch.resize(frames, Sample::SILENCE);
            }
            let buf = &mut scratch[..frames];
            let (n, _) = fill(&mut *lock(&mixer), buf);
            buf[n..].fill(Sample::SILENCE);
            write_frames(data, channels, buf);
        },
        |err| error!(error = %err, "output stream error"),
        None,
    )
}

/// Frames the callback buffer is sized for when the device picks the size.
const DEFAULT_CALLBACK_FRAMES: usize = 8192;

/// Scratch for the device callback, sized up front so the callback does
/// not allocate. Only a device that ignores the requested size can make it
/// grow.
fn callback_scratch(config: SpeakerConfig) -> Vec<Sample> {
    let frames = config
        .buffer_size
        .map_or(DEFAULT_CALLBACK_FRAMES, |frames| frames as usize);
    vec![Sample::SILENCE; frames]
}

/// Interleave `samples` into `data`. Mono devices get the average of both
/// channels; channels past the second are silent.
fn write_frames<T: FromSample<f32>>(data: &mut [T], channels: usize, samples: &[Sample]) {
    for (frame, s) in data.chunks_exact_mut(channels).zip(samples) {
        let s = s.clamped();
        for (ch, out) in frame.iter_mut().enumerate() {
            let v = match (channels, ch) {
                (1, _) => (s.left + s.right) / 2.0,
                (_, 0) => s.left,
                (_, 1) => s.right,
                _ => 0.0,
            };
            *out = T::from_sample_(v as f32);
        }
    }
}
