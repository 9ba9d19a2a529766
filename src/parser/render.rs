// SPDX-License-Identifier: MIT
//! Line-to-fragment classification.
//!
//! Every body line inside a section maps to exactly one tagged fragment.
//! Precedence is an explicit ordered rule table, not a conditional cascade:
//! the first rule whose matcher accepts the line builds the fragment.  The
//! table order is a contract — a dosage-shaped line inside a bullet still
//! renders as dosage because the dosage rule sits above the bullet rule.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// One rendered visual unit for a single source line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Fragment {
    /// Dosage or schedule line (`500 mg twice daily`, `8:00 am dose`).
    Dosage { text: String },
    Bullet { spans: Vec<Span> },
    NumberedStep { number: u32, spans: Vec<Span> },
    /// Mixed-case `**Bold Text:**` line, markers stripped.
    Subheader { text: String },
    /// Line containing an urgency keyword, rendered with emphasis.
    Warning { text: String },
    Paragraph { spans: Vec<Span> },
    Spacer,
}

/// A run of text with an emphasis flag.  Single and double markdown emphasis
/// markers both map to strong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub strong: bool,
}

impl Span {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            strong: false,
        }
    }

    fn strong(text: &str) -> Self {
        Self {
            text: text.to_string(),
            strong: true,
        }
    }
}

// ─── Rule table ───────────────────────────────────────────────────────────────

/// One entry in the ordered precedence table.
pub struct RenderRule {
    /// Stable rule name, exposed so tests can assert table order.
    pub name: &'static str,
    matches: fn(&str) -> bool,
    build: fn(&str) -> Fragment,
}

/// Ordered precedence table — first match wins.
pub static RULES: &[RenderRule] = &[
    RenderRule {
        name: "dosage",
        matches: |l| DOSAGE_RE.is_match(l),
        build: |l| Fragment::Dosage {
            text: strip_emphasis(l.trim()),
        },
    },
    RenderRule {
        name: "bullet",
        matches: |l| l.trim_start().starts_with("- "),
        build: |l| Fragment::Bullet {
            spans: emphasis_spans(l.trim_start().trim_start_matches("- ").trim()),
        },
    },
    RenderRule {
        name: "numbered-step",
        matches: |l| NUMBERED_RE.is_match(l),
        build: |l| {
            let caps = NUMBERED_RE.captures(l).expect("matcher accepted the line");
            Fragment::NumberedStep {
                number: caps[1].parse().unwrap_or(0),
                spans: emphasis_spans(caps[2].trim()),
            }
        },
    },
    RenderRule {
        name: "subheader",
        matches: |l| SUBHEADER_RE.is_match(l),
        build: |l| {
            let caps = SUBHEADER_RE.captures(l).expect("matcher accepted the line");
            Fragment::Subheader {
                text: caps[1].trim().to_string(),
            }
        },
    },
    RenderRule {
        name: "warning",
        matches: |l| {
            let lower = l.to_lowercase();
            URGENCY_KEYWORDS.iter().any(|k| lower.contains(k))
        },
        build: |l| Fragment::Warning {
            text: strip_emphasis(l.trim()),
        },
    },
    RenderRule {
        name: "paragraph",
        matches: |l| !l.trim().is_empty(),
        build: |l| Fragment::Paragraph {
            spans: emphasis_spans(l.trim()),
        },
    },
    RenderRule {
        name: "spacer",
        matches: |l| l.trim().is_empty(),
        build: |_| Fragment::Spacer,
    },
];

/// Keywords that escalate a line to a warning callout.
const URGENCY_KEYWORDS: &[&str] = &[
    "urgent",
    "emergency",
    "immediately",
    "critical",
    "warning",
    "call 911",
    "seek immediate",
];

/// Leading quantity + dose unit, or a clock time.  An optional `- ` prefix is
/// accepted so bulleted dosage lines still classify as dosage.
static DOSAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)^\s*(?:-\s*)?(?:
            [0-9]+(?:\.[0-9]+)?\s*(?:mg|mcg|g|ml|iu|units?|tablets?|capsules?|drops?|puffs?|sprays?|tsp|tbsp)\b
            | [0-9]{1,2}:[0-9]{2}\s*(?:am|pm)?\b
        )",
    )
    .expect("dosage regex")
});

static NUMBERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]+)\.\s+(.*)$").expect("numbered step regex"));

static SUBHEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\*\*([^*]+?):\*\*\s*$").expect("subheader regex"));

static EMPHASIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*|\*([^*]+)\*").expect("emphasis regex"));

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Classify one source line.  Total: the spacer rule accepts anything the
/// earlier rules reject.
pub fn render_line(line: &str) -> Fragment {
    let rule = RULES
        .iter()
        .find(|r| (r.matches)(line))
        .unwrap_or(&RULES[RULES.len() - 1]);
    (rule.build)(line)
}

/// Render a section body line by line.
pub fn render_section(body: &[String]) -> Vec<Fragment> {
    body.iter().map(|l| render_line(l)).collect()
}

/// Split inline `**strong**` / `*strong*` markers into spans.
fn emphasis_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    for m in EMPHASIS_RE.captures_iter(text) {
        let whole = m.get(0).expect("capture 0 always present");
        if whole.start() > cursor {
            spans.push(Span::plain(&text[cursor..whole.start()]));
        }
        let inner = m.get(1).or_else(|| m.get(2)).expect("one alternative matched");
        spans.push(Span::strong(inner.as_str()));
        cursor = whole.end();
    }
    if cursor < text.len() {
        spans.push(Span::plain(&text[cursor..]));
    }
    if spans.is_empty() {
        spans.push(Span::plain(text));
    }
    spans
}

/// Remove emphasis markers without span structure (dosage/warning fragments).
fn strip_emphasis(text: &str) -> String {
    EMPHASIS_RE.replace_all(text, "$1$2").to_string()
}
