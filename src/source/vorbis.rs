//! Streaming Ogg/Vorbis decoding

use std::collections::VecDeque;
use std::io::{Read, Seek};

use lewton::inside_ogg::OggStreamReader;
use tracing::debug;

use crate::error::{Error, Result};
use crate::format::Format;
use crate::producer::Producer;
use crate::sample::{Sample, SampleRate};

/// Decodes an Ogg/Vorbis stream packet by packet as it is pulled.
///
/// Mono streams are duplicated to both channels, channels past the second are
/// dropped. Decoding failures become a sticky [`Error::Decode`].
///
/// The decoder is not [`Seekable`](crate::Seekable): Vorbis can only seek to
/// page boundaries, not to a given sample.
pub struct VorbisDecoder<R: Read + Seek> {
    reader: OggStreamReader<R>,
    format: Format,
    pending: VecDeque<Sample>,
    finished: bool,
    err: Option<Error>,
}

impl<R: Read + Seek + Send> VorbisDecoder<R> {
    /// Read the stream headers. Fails with [`Error::Decode`] if they are not
    /// valid Vorbis.
    pub fn new(reader: R) -> Result<Self> {
        let reader = OggStreamReader::new(reader).map_err(|e| Error::Decode(e.to_string()))?;
        let format = Format::new(
            SampleRate(reader.ident_hdr.audio_sample_rate),
            reader.ident_hdr.audio_channels as usize,
            2,
        )?;
        debug!(
            rate = format.sample_rate.hz(),
            channels = format.channels,
            "opened vorbis stream"
        );
        Ok(Self {
            reader,
            format,
            pending: VecDeque::new(),
            finished: false,
            err: None,
        })
    }

    /// Format of the decoded stream
    pub fn format(&self) -> Format {
        self.format
    }

    /// Decode the next packet into `pending`. Returns false at end of stream.
    fn decode_packet(&mut self) -> bool {
        let packet = match self.reader.read_dec_packet_itl() {
            Ok(Some(packet)) => packet,
            Ok(None) => return false,
            Err(e) => {
                self.err = Some(Error::Decode(e.to_string()));
                return false;
            }
        };
        let channels = self.format.channels;
        for frame in packet.chunks_exact(channels) {
            let left = frame[0] as f64 / i16::MAX as f64;
            let right = if channels > 1 {
                frame[1] as f64 / i16::MAX as f64
            } else {
                left
            };
            self.pending.push_back(Sample::new(left, right).clamped());
        }
        true
    }
}

impl<R: Read + Seek + Send> Producer for VorbisDecoder<R> {
    fn pull(&mut self, buf: &mut [Sample]) -> (usize, bool) {
        let mut n = 0;
        while n < buf.len() {
            match self.pending.pop_front() {
                Some(s) => {
                    buf[n] = s;
                    n += 1;
                }
                None if self.finished => break,
                None => self.finished = !self.decode_packet(),
            }
        }
        if self.err.is_some() {
            return (n, false);
        }
        (n, n > 0 || !self.finished)
    }

    fn last_error(&self) -> Option<Error> {
        self.err.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn garbage_is_rejected() {
        let data = Cursor::new(vec![0u8; 64]);
        assert!(matches!(VorbisDecoder::new(data), Err(Error::Decode(_))));
    }
}
