use crate::heuristics::GenerationParameters;
use crate::request::GuidanceLevel;

/// Literal delimiter the model is asked to place at every pause boundary.
pub const PAUSE_MARKER: &str = "---PAUSE---";

/// Splits a generated script on every occurrence of the marker, trimming
/// each piece. Always yields marker occurrences + 1 segments; empty segments
/// are kept so indices stay aligned with silence insertion.
pub fn split_segments(script: &str, marker: &str) -> Vec<String> {
    script.split(marker).map(|s| s.trim().to_string()).collect()
}

pub fn marker_count(script: &str, marker: &str) -> usize {
    script.matches(marker).count()
}

/// Builds the generation prompt around the resolved pacing parameters. The
/// wording is a condensed rendition of the tuned production prompt; the
/// structural asks (char budget, section count, marker placement) are what
/// the pipeline depends on.
pub fn build_prompt(
    focus: &str,
    minutes: u32,
    guidance: GuidanceLevel,
    params: &GenerationParameters,
) -> String {
    format!(
        "Your task is to create a script for a {minutes} minute guided meditation session \
         focusing on {focus}. The meditation should have {sections} sections and {pauses} \
         pauses total. Respond with the meditation script only, without any additional \
         commentary. Use ellipses (...) and commas strategically throughout to create a slow, \
         relaxed pace, with particular emphasis on the beginning and end of the session. \
         The script should be about {chars} characters long to align with the {minutes} minute \
         duration. Include exactly {pauses} '{marker}' markers at carefully considered \
         transition points, and gently guide the listener into each pause with a soft \
         introductory phrase so no marker feels abrupt. The script should provide '{guidance}' \
         level guidance; adjust the depth of instruction accordingly. The final section should \
         gently conclude the session, guiding the listener back to their surroundings while \
         tying back to the chosen focus.",
        minutes = minutes,
        focus = focus,
        sections = params.section_count(),
        pauses = params.pause_count,
        chars = params.target_char_count,
        marker = PAUSE_MARKER,
        guidance = guidance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::HeuristicsTable;
    use crate::request::DurationTier;

    #[test]
    fn segment_count_is_marker_count_plus_one() {
        let script = "A---PAUSE---B---PAUSE---C";
        assert_eq!(marker_count(script, PAUSE_MARKER), 2);
        let segments = split_segments(script, PAUSE_MARKER);
        assert_eq!(segments, vec!["A", "B", "C"]);
    }

    #[test]
    fn zero_markers_yield_one_trimmed_segment() {
        let segments = split_segments("  just breathe \n", PAUSE_MARKER);
        assert_eq!(segments, vec!["just breathe"]);
    }

    #[test]
    fn segments_are_trimmed_of_surrounding_whitespace() {
        let script = "settle in \n---PAUSE---\n  and breathe out";
        let segments = split_segments(script, PAUSE_MARKER);
        assert_eq!(segments, vec!["settle in", "and breathe out"]);
    }

    #[test]
    fn adjacent_markers_keep_an_empty_segment() {
        let script = "A---PAUSE------PAUSE---B";
        let segments = split_segments(script, PAUSE_MARKER);
        assert_eq!(segments, vec!["A", "", "B"]);
    }

    #[test]
    fn prompt_embeds_resolved_parameters() {
        let table = HeuristicsTable::load_default().unwrap();
        let params = table
            .lookup(DurationTier::Short, GuidanceLevel::High)
            .unwrap();
        let prompt = build_prompt("gratitude", 4, GuidanceLevel::High, &params);
        assert!(prompt.contains("gratitude"));
        assert!(prompt.contains(PAUSE_MARKER));
        assert!(prompt.contains("5 sections"));
        assert!(prompt.contains("4 pauses"));
        assert!(prompt.contains("2000 characters"));
        assert!(prompt.contains("'high' level guidance"));
    }
}
