use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::assembler::{self, MeditationAudio};
use crate::config::Config;
use crate::error::{PipelineError, Stage};
use crate::heuristics::HeuristicsTable;
use crate::providers::{self, ScriptGenerator, SpeechSynthesizer};
use crate::request::GenerationRequest;
use crate::script::{self, PAUSE_MARKER};

/// End-to-end driver for one run: heuristics lookup, script generation,
/// partitioning, and assembly. Each run owns its request-to-result lifecycle;
/// nothing is shared between concurrent runs.
pub struct Pipeline {
    heuristics: HeuristicsTable,
    config: Config,
}

impl Pipeline {
    pub fn new(heuristics: HeuristicsTable, config: Config) -> Self {
        Self { heuristics, config }
    }

    /// Resolves the configured providers for the request and runs the
    /// pipeline. Exactly one script provider and one speech provider per
    /// run; there is no fallback between them.
    pub async fn run(&self, request: &GenerationRequest) -> Result<MeditationAudio, PipelineError> {
        let generator = providers::script_generator(request.script_provider, &self.config)?;
        let synthesizer =
            providers::speech_synthesizer(request.speech_provider, &request.voice, &self.config)?;
        self.run_with(request, generator.as_ref(), synthesizer.as_ref())
            .await
    }

    pub async fn run_with(
        &self,
        request: &GenerationRequest,
        generator: &dyn ScriptGenerator,
        synthesizer: &dyn SpeechSynthesizer,
    ) -> Result<MeditationAudio, PipelineError> {
        let params = self.heuristics.lookup(request.duration, request.guidance)?;
        info!(
            "resolved parameters for {}/{}: {} chars, {} pauses of {}s",
            request.duration,
            request.guidance,
            params.target_char_count,
            params.pause_count,
            params.pause_seconds
        );

        let prompt = script::build_prompt(
            &request.focus,
            request.duration.minutes(),
            request.guidance,
            &params,
        );

        info!("requesting meditation script from {}", generator.name());
        let generation = timeout(
            self.config.script_timeout,
            generator.generate(&prompt, params.target_char_count),
        );
        let script_text = match generation.await {
            Err(_) => {
                return Err(PipelineError::Timeout {
                    stage: Stage::ScriptGeneration,
                    seconds: self.config.script_timeout.as_secs(),
                });
            }
            Ok(Err(e)) => {
                return Err(PipelineError::Generation {
                    provider: e.provider.to_string(),
                    detail: e.detail,
                });
            }
            Ok(Ok(text)) => text,
        };
        info!("script received ({} chars)", script_text.len());
        debug!("generated script:\n{}", script_text);

        let segments = script::split_segments(&script_text, PAUSE_MARKER);
        let markers = script::marker_count(&script_text, PAUSE_MARKER);
        if markers != params.pause_count as usize {
            // Best-effort policy: the model missed the requested structure,
            // so proceed with however many segments actually appeared.
            warn!(
                "script contains {} pause markers, expected {}; proceeding with {} segments",
                markers,
                params.pause_count,
                segments.len()
            );
        }
        info!("partitioned script into {} segments", segments.len());

        assembler::assemble(
            &segments,
            synthesizer,
            params.pause_ms(),
            self.config.synthesis_timeout,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::audio::AudioClip;
    use crate::providers::ProviderError;
    use crate::request::{DurationTier, GuidanceLevel, ScriptProvider, SpeechProvider};

    struct FakeGenerator {
        script: String,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScriptGenerator for FakeGenerator {
        fn name(&self) -> &'static str {
            "fake-llm"
        }

        async fn generate(&self, prompt: &str, _max_chars: u32) -> Result<String, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.script.clone())
        }
    }

    struct FakeSynth {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSynth {
        fn name(&self) -> &'static str {
            "fake-tts"
        }

        async fn synthesize(&self, _text: &str) -> Result<AudioClip, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            Ok(AudioClip::silence(100, 22050, 1))
        }
    }

    fn test_config() -> Config {
        Config {
            openai_api_key: None,
            anthropic_api_key: None,
            elevenlabs_api_key: None,
            secret_token: None,
            script_timeout: Duration::from_secs(5),
            synthesis_timeout: Duration::from_secs(5),
        }
    }

    fn test_request() -> GenerationRequest {
        GenerationRequest {
            duration: DurationTier::Short,
            guidance: GuidanceLevel::Low,
            script_provider: ScriptProvider::OpenAi,
            speech_provider: SpeechProvider::OpenAi,
            voice: "onyx".into(),
            focus: "breath".into(),
        }
    }

    #[tokio::test]
    async fn run_synthesizes_one_clip_per_segment() {
        let pipeline = Pipeline::new(HeuristicsTable::load_default().unwrap(), test_config());
        let generator = FakeGenerator {
            script: "A---PAUSE---B---PAUSE---C".into(),
            prompts: Mutex::new(Vec::new()),
        };
        let synth = FakeSynth {
            calls: Mutex::new(0),
        };

        let out = pipeline
            .run_with(&test_request(), &generator, &synth)
            .await
            .unwrap();

        assert_eq!(*synth.calls.lock().unwrap(), 3);
        // 3 segments of 0.1s plus 2 pauses of 90s (the 2-5min/low row).
        assert!((out.duration_seconds - (0.3 + 180.0)).abs() < 1e-6);

        let prompt = generator.prompts.lock().unwrap()[0].clone();
        assert!(prompt.contains("breath"));
        assert!(prompt.contains("1000 characters"));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_external_call() {
        let pipeline = Pipeline::new(HeuristicsTable::load_default().unwrap(), test_config());
        let err = pipeline.run(&test_request()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
    }

    #[tokio::test]
    async fn generator_failure_surfaces_as_generation_error() {
        struct FailingGenerator;

        #[async_trait]
        impl ScriptGenerator for FailingGenerator {
            fn name(&self) -> &'static str {
                "fake-llm"
            }

            async fn generate(
                &self,
                _prompt: &str,
                _max_chars: u32,
            ) -> Result<String, ProviderError> {
                Err(ProviderError::new("fake-llm", "rate limited"))
            }
        }

        let pipeline = Pipeline::new(HeuristicsTable::load_default().unwrap(), test_config());
        let synth = FakeSynth {
            calls: Mutex::new(0),
        };
        let err = pipeline
            .run_with(&test_request(), &FailingGenerator, &synth)
            .await
            .unwrap_err();

        match err {
            PipelineError::Generation { provider, detail } => {
                assert_eq!(provider, "fake-llm");
                assert!(detail.contains("rate limited"));
            }
            other => panic!("expected generation error, got {:?}", other),
        }
        // Synthesis never starts after a generation failure.
        assert_eq!(*synth.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn slow_generator_times_out_with_stage_tag() {
        struct SlowGenerator;

        #[async_trait]
        impl ScriptGenerator for SlowGenerator {
            fn name(&self) -> &'static str {
                "fake-llm"
            }

            async fn generate(
                &self,
                _prompt: &str,
                _max_chars: u32,
            ) -> Result<String, ProviderError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(String::new())
            }
        }

        let mut config = test_config();
        config.script_timeout = Duration::from_millis(10);
        let pipeline = Pipeline::new(HeuristicsTable::load_default().unwrap(), config);
        let synth = FakeSynth {
            calls: Mutex::new(0),
        };
        let err = pipeline
            .run_with(&test_request(), &SlowGenerator, &synth)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Timeout {
                stage: Stage::ScriptGeneration,
                ..
            }
        ));
    }
}
