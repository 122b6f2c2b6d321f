use std::time::Duration;

/// Process configuration read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    /// Shared secret required in the `x-secret-token` header of /generate.
    pub secret_token: Option<String>,
    pub script_timeout: Duration,
    pub synthesis_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env_opt("OPENAI_API_KEY"),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            elevenlabs_api_key: env_opt("ELEVENLABS_API_KEY"),
            secret_token: env_opt("SECRET_TOKEN"),
            script_timeout: env_secs("SCRIPT_TIMEOUT_SECS", 120),
            synthesis_timeout: env_secs("SYNTHESIS_TIMEOUT_SECS", 60),
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_secs(name: &str, default: u64) -> Duration {
    let secs = std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}
