use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Decoded PCM audio. Clips from the TTS providers and generated silence
/// both end up in this shape before concatenation.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioClip {
    pub fn from_wav_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let mut reader = WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let samples = match spec.sample_format {
            SampleFormat::Int => {
                if spec.bits_per_sample != 16 {
                    anyhow::bail!("unsupported WAV bit depth: {}", spec.bits_per_sample);
                }
                reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?
            }
            SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16))
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Raw headerless 16-bit little-endian PCM, as returned by ElevenLabs
    /// `pcm_*` output formats (always mono).
    pub fn from_pcm_s16le(bytes: &[u8], sample_rate: u32) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self {
            sample_rate,
            channels: 1,
            samples,
        }
    }

    /// Deterministic silence of exactly the requested length. Built locally,
    /// never via a provider.
    pub fn silence(duration_ms: u64, sample_rate: u32, channels: u16) -> Self {
        let frames = (u64::from(sample_rate) * duration_ms / 1000) as usize;
        Self {
            sample_rate,
            channels,
            samples: vec![0; frames * usize::from(channels)],
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        let frames = self.samples.len() as f64 / f64::from(self.channels);
        frames / f64::from(self.sample_rate)
    }
}

/// Ordered concatenation target. Clips are appended one at a time in segment
/// order; a sample-spec mismatch is rejected rather than resampled.
#[derive(Debug)]
pub struct AudioAccumulator {
    sample_rate: u32,
    channels: u16,
    samples: Vec<i16>,
    appended_seconds: f64,
}

impl AudioAccumulator {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            samples: Vec::new(),
            appended_seconds: 0.0,
        }
    }

    pub fn append(&mut self, clip: &AudioClip) -> anyhow::Result<()> {
        if clip.sample_rate != self.sample_rate || clip.channels != self.channels {
            anyhow::bail!(
                "sample spec mismatch: accumulator is {}Hz/{}ch, clip is {}Hz/{}ch",
                self.sample_rate,
                self.channels,
                clip.sample_rate,
                clip.channels
            );
        }
        self.samples.extend_from_slice(&clip.samples);
        self.appended_seconds += clip.duration_seconds();
        Ok(())
    }

    /// Sum of the durations of every appended clip.
    pub fn duration_seconds(&self) -> f64 {
        self.appended_seconds
    }

    pub fn into_wav_bytes(self) -> anyhow::Result<Vec<u8>> {
        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for sample in &self.samples {
            writer.write_sample(*sample)?;
        }
        writer.finalize()?;
        Ok(cursor.into_inner())
    }
}
