//! Opus codec backend.

use crate::error::StageError;
use crate::format::InputFormat;

use super::backend::{CodecBackend, DecodeStep, DecodedUnit};

// Max 120ms @ 48kHz = 5760 samples/channel, use 6000 for safety.
const MAX_DECODE_SAMPLES: usize = 6000;

/// Decodes Opus packets with the reference libopus decoder.
///
/// Each incoming chunk is treated as one Opus packet; packet framing is the
/// transport's job.
pub struct OpusBackend {
    decoder: opus::Decoder,
    channels: usize,
    scratch: Vec<i16>,
}

impl OpusBackend {
    pub fn new(format: &InputFormat) -> Result<Self, StageError> {
        let channels = match format.channels {
            1 => opus::Channels::Mono,
            2 => opus::Channels::Stereo,
            other => {
                return Err(StageError::UnsupportedInput(format!(
                    "opus supports 1 or 2 channels, got {other}"
                )));
            }
        };

        let decoder = opus::Decoder::new(format.sample_rate, channels)
            .map_err(|e| StageError::BackendInit(format!("opus: {e}")))?;

        Ok(Self {
            decoder,
            channels: format.channels as usize,
            scratch: vec![0i16; MAX_DECODE_SAMPLES * format.channels as usize],
        })
    }
}

impl CodecBackend for OpusBackend {
    fn decode(&mut self, input: &[u8]) -> Result<DecodeStep, StageError> {
        let frames = self
            .decoder
            .decode(input, &mut self.scratch, false)
            .map_err(|e| StageError::Decode(format!("opus: {e}")))?;

        let unit = (frames > 0).then(|| {
            let mut planes = vec![Vec::with_capacity(frames); self.channels];
            for frame in 0..frames {
                for (ch, plane) in planes.iter_mut().enumerate() {
                    let sample = self.scratch[frame * self.channels + ch];
                    plane.push(sample as f32 / 32768.0);
                }
            }
            DecodedUnit { planes, frames }
        });

        Ok(DecodeStep {
            consumed: input.len(),
            unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{AudioCodec, SampleFormat};

    fn opus_input(channels: u32, rate: u32) -> InputFormat {
        InputFormat {
            codec: AudioCodec::Opus,
            sample_format: SampleFormat::S16,
            channels,
            sample_rate: rate,
        }
    }

    #[test]
    fn rejects_unsupported_channel_counts() {
        let result = OpusBackend::new(&opus_input(6, 48000));
        assert!(matches!(result, Err(StageError::UnsupportedInput(_))));
    }

    #[test]
    fn rejects_unsupported_sample_rates() {
        let result = OpusBackend::new(&opus_input(2, 44100));
        assert!(matches!(result, Err(StageError::BackendInit(_))));
    }

    #[test]
    fn decodes_an_encoded_packet() {
        // One 20ms stereo frame at 48kHz, encoded with the matching encoder.
        let mut encoder =
            opus::Encoder::new(48000, opus::Channels::Stereo, opus::Application::Audio).unwrap();
        let pcm = vec![0i16; 960 * 2];
        let mut packet = vec![0u8; 4000];
        let len = encoder.encode(&pcm, &mut packet).unwrap();
        packet.truncate(len);

        let mut backend = OpusBackend::new(&opus_input(2, 48000)).unwrap();
        let step = backend.decode(&packet).unwrap();

        assert_eq!(step.consumed, packet.len());
        let unit = step.unit.expect("one packet yields one unit");
        assert_eq!(unit.channels(), 2);
        assert_eq!(unit.frames, 960);
    }

    #[test]
    fn malformed_packet_is_a_decode_error() {
        let mut backend = OpusBackend::new(&opus_input(1, 16000)).unwrap();
        // TOC code 1 requires an even payload length; three bytes is invalid
        // framing by construction.
        let result = backend.decode(&[0x01, 0xAA, 0xBB, 0xCC]);
        assert!(matches!(result, Err(StageError::Decode(_))));
    }
}
