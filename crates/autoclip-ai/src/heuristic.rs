//! Deterministic text-pattern virality scoring.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use autoclip_models::ViralityScore;

use crate::error::AiResult;
use crate::score::ViralityScorer;

const BASE_SCORE: f64 = 50.0;
const PATTERN_BONUS: f64 = 5.0;
const LENGTH_BONUS: f64 = 10.0;
const QUESTION_BONUS: f64 = 10.0;
const SUMMARY_MAX_CHARS: usize = 100;

/// Each match of any of these adds [`PATTERN_BONUS`].
static ENGAGEMENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // emphatic vocabulary
        r"(?i)\b(amazing|incredible|wow|insane|genius|brilliant|perfect)\b",
        // repeated punctuation
        r"[!?]{2,}",
        // hooks
        r"(?i)\b(you won't believe|here's why|this is|the secret)\b",
        // advice
        r"(?i)\b(tip|trick|hack|method|way to|how to)\b",
        // big numbers
        r"(?i)\b(million|billion|thousand)\b",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static FIRST_SENTENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^.!?]+[.!?]").ok());

/// Pure heuristic scorer used whenever the oracle is absent or fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score and summarize `text`. Same input, same output.
    pub fn evaluate(&self, text: &str) -> ViralityScore {
        ViralityScore {
            score: heuristic_score(text),
            summary: heuristic_summary(text),
        }
    }
}

#[async_trait]
impl ViralityScorer for HeuristicScorer {
    async fn score(&self, text: &str, _duration: f64) -> AiResult<ViralityScore> {
        Ok(self.evaluate(text))
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

/// Score in `[0, 100]` from engagement patterns, length and questions.
pub fn heuristic_score(text: &str) -> f64 {
    let mut score = BASE_SCORE;

    for pattern in ENGAGEMENT_PATTERNS.iter() {
        score += pattern.find_iter(text).count() as f64 * PATTERN_BONUS;
    }

    let word_count = text.split_whitespace().count();
    if (15..=50).contains(&word_count) {
        score += LENGTH_BONUS;
    }

    if text.contains('?') {
        score += QUESTION_BONUS;
    }

    score.clamp(0.0, 100.0)
}

/// First terminal-punctuated sentence, else the first 100 characters.
pub fn heuristic_summary(text: &str) -> String {
    if let Some(sentence) = FIRST_SENTENCE.as_ref().and_then(|re| re.find(text)) {
        return sentence.as_str().trim().to_string();
    }

    let mut summary: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
    if text.chars().count() > SUMMARY_MAX_CHARS {
        summary.push_str("...");
    }
    summary
}
