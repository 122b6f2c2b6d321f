use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info};

use crate::audio::{AudioAccumulator, AudioClip};
use crate::error::{PipelineError, Stage};
use crate::providers::SpeechSynthesizer;

/// The finished artifact of one run: a single WAV file plus its duration.
#[derive(Debug)]
pub struct MeditationAudio {
    pub wav: Vec<u8>,
    pub duration_seconds: f64,
}

impl MeditationAudio {
    /// M:SS (or MM:SS past ten minutes), as exposed in the duration header.
    pub fn duration_display(&self) -> String {
        let total = self.duration_seconds as u64;
        let minutes = total / 60;
        let seconds = total % 60;
        if minutes < 10 {
            format!("{}:{:02}", minutes, seconds)
        } else {
            format!("{:02}:{:02}", minutes, seconds)
        }
    }
}

/// Synthesizes every segment in order and stitches the clips together with
/// one fixed-duration silence between each adjacent pair.
///
/// The first failure aborts the whole run tagged with the segment index;
/// partial audio is never returned, since a skipped segment would corrupt
/// the segment/silence alternation. The silence clip is built once from the
/// first clip's sample spec and reused for every gap.
pub async fn assemble(
    segments: &[String],
    synthesizer: &dyn SpeechSynthesizer,
    pause_ms: u64,
    call_timeout: Duration,
) -> Result<MeditationAudio, PipelineError> {
    if segments.is_empty() {
        return Err(PipelineError::Validation("script produced no segments".into()));
    }

    let mut accumulator: Option<AudioAccumulator> = None;
    let mut silence: Option<AudioClip> = None;

    for (i, segment) in segments.iter().enumerate() {
        info!(
            "synthesizing segment {}/{} ({} chars)",
            i + 1,
            segments.len(),
            segment.len()
        );
        debug!("segment text: {}", segment);

        let clip = match timeout(call_timeout, synthesizer.synthesize(segment)).await {
            Err(_) => {
                return Err(PipelineError::Timeout {
                    stage: Stage::Synthesis,
                    seconds: call_timeout.as_secs(),
                });
            }
            Ok(Err(e)) => {
                return Err(PipelineError::Synthesis {
                    segment: i,
                    provider: e.provider.to_string(),
                    detail: e.detail,
                });
            }
            Ok(Ok(clip)) => clip,
        };

        let acc = accumulator
            .get_or_insert_with(|| AudioAccumulator::new(clip.sample_rate, clip.channels));
        acc.append(&clip).map_err(|e| PipelineError::Synthesis {
            segment: i,
            provider: synthesizer.name().to_string(),
            detail: e.to_string(),
        })?;

        if i < segments.len() - 1 {
            let gap = silence
                .get_or_insert_with(|| AudioClip::silence(pause_ms, clip.sample_rate, clip.channels));
            acc.append(gap).map_err(|e| PipelineError::Synthesis {
                segment: i,
                provider: synthesizer.name().to_string(),
                detail: e.to_string(),
            })?;
        }
    }

    // Loop guarantees Some for non-empty input.
    let accumulator = accumulator.ok_or_else(|| {
        PipelineError::Validation("script produced no segments".into())
    })?;
    let duration_seconds = accumulator.duration_seconds();
    let wav = accumulator
        .into_wav_bytes()
        .map_err(|e| PipelineError::Encoding(e.to_string()))?;

    info!("assembled {:.2}s of audio", duration_seconds);
    Ok(MeditationAudio {
        wav,
        duration_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::providers::ProviderError;

    const RATE: u32 = 1000;

    /// Returns a 10-sample clip whose samples all equal the 1-based call
    /// index, so ordering is visible in the stitched output. Fails on the
    /// configured segment index instead, when set.
    struct FakeSynth {
        calls: Mutex<Vec<String>>,
        fail_at: Option<usize>,
    }

    impl FakeSynth {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_at,
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSynth {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn synthesize(&self, text: &str) -> Result<AudioClip, ProviderError> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push(text.to_string());
            if self.fail_at == Some(index) {
                return Err(ProviderError::new("fake", "simulated outage"));
            }
            Ok(AudioClip {
                sample_rate: RATE,
                channels: 1,
                samples: vec![(index + 1) as i16; 10],
            })
        }
    }

    fn segments(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn clips_and_silence_strictly_alternate() {
        let synth = FakeSynth::new(None);
        let out = assemble(
            &segments(&["A", "B", "C"]),
            &synth,
            1000,
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        // 3 clips of 10 samples + 2 one-second (1000-sample) silences.
        let decoded = AudioClip::from_wav_bytes(&out.wav).unwrap();
        let mut expected = Vec::new();
        expected.extend(vec![1i16; 10]);
        expected.extend(vec![0i16; 1000]);
        expected.extend(vec![2i16; 10]);
        expected.extend(vec![0i16; 1000]);
        expected.extend(vec![3i16; 10]);
        assert_eq!(decoded.samples, expected);

        // Duration is the sum of all appended clips.
        let expected_seconds = (3.0 * 10.0 + 2.0 * 1000.0) / RATE as f64;
        assert!((out.duration_seconds - expected_seconds).abs() < 1e-6);
    }

    #[tokio::test]
    async fn single_segment_gets_no_silence() {
        let synth = FakeSynth::new(None);
        let out = assemble(&segments(&["only"]), &synth, 1000, Duration::from_secs(5))
            .await
            .unwrap();
        let decoded = AudioClip::from_wav_bytes(&out.wav).unwrap();
        assert_eq!(decoded.samples, vec![1i16; 10]);
    }

    #[tokio::test]
    async fn failure_reports_the_segment_index_and_stops() {
        let synth = FakeSynth::new(Some(1));
        let err = assemble(
            &segments(&["A", "B", "C"]),
            &synth,
            1000,
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        match err {
            PipelineError::Synthesis { segment, provider, .. } => {
                assert_eq!(segment, 1);
                assert_eq!(provider, "fake");
            }
            other => panic!("expected synthesis error, got {:?}", other),
        }
        // Fail fast: the third segment is never attempted.
        assert_eq!(synth.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn slow_synthesis_times_out() {
        struct SlowSynth;

        #[async_trait]
        impl SpeechSynthesizer for SlowSynth {
            fn name(&self) -> &'static str {
                "slow"
            }

            async fn synthesize(&self, _text: &str) -> Result<AudioClip, ProviderError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(AudioClip::silence(10, RATE, 1))
            }
        }

        let err = assemble(
            &segments(&["A"]),
            &SlowSynth,
            1000,
            Duration::from_millis(10),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Timeout {
                stage: Stage::Synthesis,
                ..
            }
        ));
    }

    #[test]
    fn duration_display_matches_reference_format() {
        let audio = |secs: f64| MeditationAudio {
            wav: Vec::new(),
            duration_seconds: secs,
        };
        assert_eq!(audio(272.8).duration_display(), "4:32");
        assert_eq!(audio(61.0).duration_display(), "1:01");
        assert_eq!(audio(615.0).duration_display(), "10:15");
    }
}
