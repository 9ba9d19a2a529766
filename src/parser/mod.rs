//! Reply parsing: metric extraction, section segmentation, and line
//! classification.  Pure functions over the raw reply text — no I/O.

pub mod metrics;
pub mod render;
pub mod sections;

pub use metrics::{clean_display_text, extract_scores, Scores};
pub use render::{render_line, render_section, Fragment, Span};
pub use sections::{segment, Section};

/// Fully parsed model reply: scores, cleaned display text, sections.
#[derive(Debug, Clone)]
pub struct ParsedReply {
    pub scores: Scores,
    pub display_text: String,
    pub sections: Vec<Section>,
}

/// Run the whole parsing pipeline on one raw reply.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let scores = extract_scores(raw);
    let display_text = clean_display_text(raw);
    let sections = segment(&display_text);
    ParsedReply {
        scores,
        display_text,
        sections,
    }
}
