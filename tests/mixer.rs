//! The live mixer under changing load.

use std::sync::{Arc, Mutex};
use std::thread;

use strom::compose::take;
use strom::effect::Ctrl;
use strom::source::{sine, Silence};
use strom::{from_fn, Error, Mixer, Producer, Sample, SampleRate, BLOCK_SIZE};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn constant(v: f64) -> impl Producer {
    from_fn(move |buf: &mut [Sample]| {
        buf.fill(Sample::mono(v));
        (buf.len(), true)
    })
}

struct FailsAfter(usize);

impl Producer for FailsAfter {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let n = buf.len().min(self.0);
        buf[..n].fill(Sample::mono(1.0));
        self.0 -= n;
        (n, self.0 > 0)
    }

    fn last_error(&self) -> Option<Error> {
        (self.0 == 0).then(|| Error::Decode("stream truncated".into()))
    }
}

#[test]
fn stays_live_while_producers_come_and_go() {
    init_tracing();
    let mut mixer = Mixer::new();
    let mut buf = vec![Sample::SILENCE; 1000];

    assert_eq!(mixer.pull(&mut buf), (0, true));

    mixer.add(take(300, constant(0.5)));
    mixer.add(FailsAfter(200));
    assert_eq!(mixer.pull(&mut buf), (1000, true));
    assert_eq!(buf[0], Sample::mono(1.5));
    assert_eq!(buf[250], Sample::mono(0.5));
    assert_eq!(buf[999], Sample::SILENCE);
    assert!(mixer.is_empty());

    assert_eq!(mixer.pull(&mut buf), (0, true));
    mixer.add(Silence::endless());
    assert_eq!(mixer.pull(&mut buf), (1000, true));
    assert_eq!(mixer.len(), 1);
}

#[test]
fn paused_entries_keep_their_place() {
    let mut mixer = Mixer::new();
    let tone = Arc::new(Mutex::new(Ctrl::new(take(2 * BLOCK_SIZE, constant(0.25)))));
    let shared = tone.clone();
    mixer.add(from_fn(move |buf: &mut [Sample]| {
        shared.lock().map_or((0, false), |mut c| c.pull(buf))
    }));

    let mut buf = vec![Sample::SILENCE; BLOCK_SIZE];
    mixer.pull(&mut buf);
    tone.lock().unwrap().set_paused(true);
    for _ in 0..3 {
        assert_eq!(mixer.pull(&mut buf), (BLOCK_SIZE, true));
        assert!(buf.iter().all(|s| *s == Sample::SILENCE));
    }
    tone.lock().unwrap().set_paused(false);
    mixer.pull(&mut buf);
    assert_eq!(buf[BLOCK_SIZE - 1], Sample::mono(0.25));
    mixer.pull(&mut buf);
    assert!(mixer.is_empty());
}

#[test]
fn changes_from_another_thread_under_one_lock() {
    init_tracing();
    let mixer = Arc::new(Mutex::new(Mixer::new()));
    let rate = SampleRate(8000);

    let writer = {
        let mixer = mixer.clone();
        thread::spawn(move || {
            for _ in 0..50 {
                let tone = sine(rate, 440.0).map(|t| take(100, t));
                if let Ok(tone) = tone {
                    mixer.lock().unwrap().add(tone);
                }
            }
        })
    };

    let mut buf = [Sample::SILENCE; 64];
    let mut pulled = 0;
    while pulled < 100 {
        let (n, ok) = mixer.lock().unwrap().pull(&mut buf);
        assert!(ok);
        assert!(n == 0 || n == buf.len());
        pulled += 1;
    }
    writer.join().unwrap();

    let mut mixer = mixer.lock().unwrap();
    while !mixer.is_empty() {
        assert_eq!(mixer.pull(&mut buf), (64, true));
    }
}
