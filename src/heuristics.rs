use std::collections::HashMap;

use serde::Deserialize;

use crate::error::PipelineError;
use crate::request::{DurationTier, GuidanceLevel};

/// Pacing parameters for one (duration, guidance) combination.
///
/// Longer sessions and higher guidance raise the character budget and pause
/// count; low guidance compensates with longer individual pauses.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GenerationParameters {
    pub target_char_count: u32,
    pub pause_count: u32,
    pub pause_seconds: u32,
}

impl GenerationParameters {
    pub fn section_count(&self) -> u32 {
        self.pause_count + 1
    }

    pub fn pause_ms(&self) -> u64 {
        u64::from(self.pause_seconds) * 1000
    }
}

#[derive(Debug, Deserialize)]
struct TableRow {
    duration: DurationTier,
    guidance: GuidanceLevel,
    #[serde(flatten)]
    params: GenerationParameters,
}

/// Hand-tuned pacing table, loaded from JSON so an operator can adjust it
/// without touching code. The default lives in `res/heuristics.json`.
#[derive(Debug)]
pub struct HeuristicsTable {
    entries: HashMap<(DurationTier, GuidanceLevel), GenerationParameters>,
}

const DEFAULT_TABLE: &str = include_str!("../res/heuristics.json");

impl HeuristicsTable {
    pub fn load_default() -> Result<Self, PipelineError> {
        Self::from_json(DEFAULT_TABLE)
    }

    /// Parses a table and validates it covers the full duration x guidance
    /// cross-product with sane values.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let rows: Vec<TableRow> = serde_json::from_str(json)
            .map_err(|e| PipelineError::Configuration(format!("bad heuristics table: {}", e)))?;

        let mut entries = HashMap::new();
        for row in rows {
            if row.params.target_char_count == 0 || row.params.pause_seconds == 0 {
                return Err(PipelineError::Configuration(format!(
                    "heuristics row {}/{} has a zero character budget or pause length",
                    row.duration, row.guidance
                )));
            }
            if entries
                .insert((row.duration, row.guidance), row.params)
                .is_some()
            {
                return Err(PipelineError::Configuration(format!(
                    "duplicate heuristics row for {}/{}",
                    row.duration, row.guidance
                )));
            }
        }

        for duration in DurationTier::ALL {
            for guidance in GuidanceLevel::ALL {
                if !entries.contains_key(&(duration, guidance)) {
                    return Err(PipelineError::Configuration(format!(
                        "heuristics table is missing the {}/{} row",
                        duration, guidance
                    )));
                }
            }
        }

        Ok(Self { entries })
    }

    pub fn lookup(
        &self,
        duration: DurationTier,
        guidance: GuidanceLevel,
    ) -> Result<GenerationParameters, PipelineError> {
        self.entries
            .get(&(duration, guidance))
            .copied()
            .ok_or_else(|| {
                PipelineError::Configuration(format!(
                    "no heuristics entry for {}/{}",
                    duration, guidance
                ))
            })
    }
}
