//! Self-reported metric extraction.
//!
//! Models are instructed to end every reply with a fixed-format metrics block
//! (`**RESPONSE METRICS:**` followed by three labelled percentages).  Real
//! replies drift from that format constantly, so extraction is a layered
//! fallback: block → contextual triple → trailing percentages → fixed
//! defaults.  Extraction never fails — the UI always gets a score to show.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// How many trailing characters the last-resort percentage sweep inspects.
const TAIL_WINDOW: usize = 1000;

/// The three self-reported scores, each clamped to `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scores {
    pub confidence: f64,
    pub accuracy: f64,
    pub f1: f64,
}

impl Scores {
    /// Fixed defaults used when a reply carries no usable percentages at all.
    pub const DEFAULTS: Scores = Scores {
        confidence: 0.75,
        accuracy: 0.80,
        f1: 0.78,
    };
}

// ─── Pattern tables ───────────────────────────────────────────────────────────

/// Ordered regex variants for one labelled metric, most specific first.
///
/// Precedence is a data artifact: tests can enumerate the table, and adding a
/// looser variant never shadows a stricter one above it.
struct MetricMatcher {
    /// Metric name, used in trace output only.
    name: &'static str,
    patterns: Lazy<Vec<Regex>>,
    /// Per-metric default when the block exists but this label is absent.
    default: f64,
}

impl MetricMatcher {
    /// First variant that matches wins; percentage is scaled to `[0, 1]`.
    fn extract(&self, text: &str) -> Option<f64> {
        for (i, re) in self.patterns.iter().enumerate() {
            if let Some(caps) = re.captures(text) {
                let pct: f64 = caps[1].parse().ok()?;
                tracing::debug!(metric = self.name, variant = i, pct, "metric matched");
                return Some(clamp_pct(pct));
            }
        }
        None
    }
}

macro_rules! metric_patterns {
    ($label:literal, $short:literal) => {
        Lazy::new(|| {
            [
                concat!(r"(?i)\*\*", $label, r":\*\*\s*([0-9]+(?:\.[0-9]+)?)%"),
                concat!(r"(?i)", $label, r":\s*([0-9]+(?:\.[0-9]+)?)%"),
                concat!(r"(?i)", $short, r":\s*([0-9]+(?:\.[0-9]+)?)%"),
                concat!(r"(?i)-\s*\*\*", $label, r":\*\*\s*([0-9]+(?:\.[0-9]+)?)%"),
            ]
            .iter()
            .map(|p| Regex::new(p).expect("metric pattern table: invalid regex"))
            .collect()
        })
    };
}

static CONFIDENCE: MetricMatcher = MetricMatcher {
    name: "confidence",
    patterns: metric_patterns!("Confidence Score", "Confidence"),
    default: 0.75,
};

static ACCURACY: MetricMatcher = MetricMatcher {
    name: "accuracy",
    patterns: metric_patterns!("Accuracy Score", "Accuracy"),
    default: 0.80,
};

static F1: MetricMatcher = MetricMatcher {
    name: "f1",
    patterns: metric_patterns!("F1 Score", "F1"),
    default: 0.78,
};

/// Metrics block: from the header label to the first blank line or end of input.
static METRICS_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\*\*RESPONSE METRICS:\*\*(.*?)(?:\n\n|\z)").expect("metrics block regex")
});

/// Everything from the header label to end of input — stripped for display.
static METRICS_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\*\*RESPONSE METRICS:\*\*.*\z").expect("metrics strip regex"));

/// Three percentages appearing after a metric keyword, mapped positionally.
static CONTEXT_TRIPLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)(?:confidence|accuracy|f1).*?([0-9]+(?:\.[0-9]+)?)%.*?([0-9]+(?:\.[0-9]+)?)%.*?([0-9]+(?:\.[0-9]+)?)%",
    )
    .expect("contextual triple regex")
});

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)%").expect("percent regex"));

fn clamp_pct(pct: f64) -> f64 {
    (pct / 100.0).clamp(0.0, 1.0)
}

// ─── Extraction ──────────────────────────────────────────────────────────────

/// Extract the three self-reported scores from a raw model reply.
///
/// Tiers, first hit wins:
/// 1. labelled values inside the `**RESPONSE METRICS:**` block
/// 2. three percentages near a metric keyword anywhere in the reply
/// 3. the last three percentages in the trailing window
/// 4. fixed defaults
pub fn extract_scores(reply: &str) -> Scores {
    if let Some(caps) = METRICS_BLOCK_RE.captures(reply) {
        let block = &caps[1];
        return Scores {
            confidence: CONFIDENCE.extract(block).unwrap_or(CONFIDENCE.default),
            accuracy: ACCURACY.extract(block).unwrap_or(ACCURACY.default),
            f1: F1.extract(block).unwrap_or(F1.default),
        };
    }

    if let Some(caps) = CONTEXT_TRIPLE_RE.captures(reply) {
        let pct = |i: usize| caps[i].parse::<f64>().map(clamp_pct).ok();
        if let (Some(confidence), Some(accuracy), Some(f1)) = (pct(1), pct(2), pct(3)) {
            tracing::debug!("scores via contextual triple");
            return Scores {
                confidence,
                accuracy,
                f1,
            };
        }
    }

    let tail = tail_window(reply, TAIL_WINDOW);
    let percents: Vec<f64> = PERCENT_RE
        .captures_iter(tail)
        .filter_map(|c| c[1].parse::<f64>().ok())
        .map(clamp_pct)
        .collect();
    if percents.len() >= 3 {
        tracing::debug!(count = percents.len(), "scores via trailing percentages");
        let last = &percents[percents.len() - 3..];
        return Scores {
            confidence: last[0],
            accuracy: last[1],
            f1: last[2],
        };
    }

    tracing::debug!("no usable percentages, using default scores");
    Scores::DEFAULTS
}

/// Strip the metrics block from the text destined for display.
pub fn clean_display_text(reply: &str) -> String {
    METRICS_STRIP_RE.replace(reply, "").trim().to_string()
}

/// Last `window` characters of `text`, respecting char boundaries.
fn tail_window(text: &str, window: usize) -> &str {
    if text.len() <= window {
        return text;
    }
    let mut start = text.len() - window;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "\
**CLINICAL ASSESSMENT:**\n\
This is a test response with medical content.\n\
\n\
**RESPONSE METRICS:**\n\
- **Confidence Score:** 85%\n\
- **Accuracy Score:** 90%\n\
- **F1 Score:** 88%";

    #[test]
    fn well_formed_block_extracts_exact_values() {
        let scores = extract_scores(WELL_FORMED);
        assert_eq!(scores.confidence, 0.85);
        assert_eq!(scores.accuracy, 0.90);
        assert_eq!(scores.f1, 0.88);
    }

    #[test]
    fn metrics_block_is_stripped_from_display_text() {
        let cleaned = clean_display_text(WELL_FORMED);
        assert!(!cleaned.contains("RESPONSE METRICS"));
        assert!(!cleaned.contains("85%"));
        assert!(cleaned.contains("**CLINICAL ASSESSMENT:**"));
        assert!(cleaned.ends_with("medical content."));
    }

    #[test]
    fn unlabelled_block_without_bold_markers_still_matches() {
        let reply = "Summary.\n\n**RESPONSE METRICS:**\nConfidence: 70%\nAccuracy: 75%\nF1: 72%";
        let scores = extract_scores(reply);
        assert_eq!(scores.confidence, 0.70);
        assert_eq!(scores.accuracy, 0.75);
        assert_eq!(scores.f1, 0.72);
    }

    #[test]
    fn block_missing_one_label_falls_back_to_that_metric_default() {
        let reply = "Text.\n\n**RESPONSE METRICS:**\n- **Confidence Score:** 91%\n- **F1 Score:** 82%";
        let scores = extract_scores(reply);
        assert_eq!(scores.confidence, 0.91);
        assert_eq!(scores.accuracy, 0.80);
        assert_eq!(scores.f1, 0.82);
    }

    #[test]
    fn contextual_triple_used_when_no_block_present() {
        let reply = "My confidence in this assessment is 77%, accuracy around 81%, and F1 of 79%.";
        let scores = extract_scores(reply);
        assert_eq!(scores.confidence, 0.77);
        assert_eq!(scores.accuracy, 0.81);
        assert_eq!(scores.f1, 0.79);
    }

    #[test]
    fn trailing_percentages_used_as_third_tier() {
        // No metric keyword anywhere, so the contextual tier cannot fire.
        let reply = "Dosing is weight based: 40%, then 60%, then 65%, finally 70% taper.";
        let scores = extract_scores(reply);
        assert_eq!(scores.confidence, 0.60);
        assert_eq!(scores.accuracy, 0.65);
        assert_eq!(scores.f1, 0.70);
    }

    #[test]
    fn fewer_than_three_percentages_yields_fixed_defaults() {
        let scores = extract_scores("Take the medication with food. Improvement in 48%.");
        assert_eq!(scores, Scores::DEFAULTS);
    }

    #[test]
    fn values_over_one_hundred_percent_are_clamped() {
        let reply = "**RESPONSE METRICS:**\n- **Confidence Score:** 140%\n- **Accuracy Score:** 90%\n- **F1 Score:** 88%";
        let scores = extract_scores(reply);
        assert_eq!(scores.confidence, 1.0);
    }

    #[test]
    fn all_tiers_stay_within_unit_interval() {
        let replies = [
            WELL_FORMED,
            "confidence 150% accuracy 300% f1 999%",
            "tail only: 120% 130% 110%",
            "nothing here",
        ];
        for reply in replies {
            let s = extract_scores(reply);
            for v in [s.confidence, s.accuracy, s.f1] {
                assert!((0.0..=1.0).contains(&v), "{v} out of range for {reply:?}");
            }
        }
    }

    #[test]
    fn tail_window_respects_multibyte_boundaries() {
        let mut reply = "⚠️".repeat(600);
        reply.push_str(" 55% 66% 77%");
        let scores = extract_scores(&reply);
        assert_eq!(scores.f1, 0.77);
    }

    #[test]
    fn clean_display_text_without_block_is_identity_trim() {
        assert_eq!(clean_display_text("  plain reply \n"), "plain reply");
    }
}
