//! Section segmentation.
//!
//! Consultation replies are instructed to use `**BOLD CAPS:**` headers for
//! their main sections.  The segmenter scans line by line: a header line
//! starts a new named section, everything else accumulates into the current
//! one, and any text before the first header lands in an implicit
//! "Introduction" section at position 0.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// A titled, contiguous span of a model's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Lower-kebab-case slug of the title, stable for anchors and test ids.
    pub id: String,
    pub title: String,
    /// Body lines in source order.  Interior blank lines are preserved so the
    /// line renderer can emit spacers; leading/trailing blanks are trimmed.
    pub body: Vec<String>,
}

impl Section {
    fn new(title: &str) -> Self {
        Self {
            id: slug(title),
            title: title.to_string(),
            body: Vec::new(),
        }
    }

    fn has_content(&self) -> bool {
        self.body.iter().any(|l| !l.trim().is_empty())
    }

    /// Drop leading/trailing blank lines, keep interior ones.
    fn trim_body(&mut self) {
        while self.body.first().is_some_and(|l| l.trim().is_empty()) {
            self.body.remove(0);
        }
        while self.body.last().is_some_and(|l| l.trim().is_empty()) {
            self.body.pop();
        }
    }
}

/// Header line: a bold, capitalized phrase followed by a colon.
///
/// Only uppercase phrases count — mixed-case `**Bold Text:**` lines are body
/// content and render as subheader fragments instead.
static SECTION_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\*\*([A-Z][A-Z0-9 \-/&',()]*):\*\*\s*$").expect("section header regex")
});

/// Split cleaned reply text (metrics block already removed) into sections.
///
/// Order matches appearance in the source.  Sections with empty bodies are
/// dropped, including the implicit introduction when nothing precedes the
/// first header.
pub fn segment(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut intro = Section::new("Introduction");
    let mut current: Option<Section> = None;

    for line in text.lines() {
        if let Some(caps) = SECTION_HEADER_RE.captures(line) {
            if let Some(done) = current.take() {
                push_if_content(&mut sections, done);
            }
            current = Some(Section::new(caps[1].trim()));
        } else if let Some(section) = current.as_mut() {
            section.body.push(line.to_string());
        } else if !line.trim().is_empty() {
            intro.body.push(line.to_string());
        }
    }
    if let Some(done) = current.take() {
        push_if_content(&mut sections, done);
    }

    if intro.has_content() {
        intro.trim_body();
        sections.insert(0, intro);
    }
    sections
}

fn push_if_content(sections: &mut Vec<Section>, mut section: Section) {
    if section.has_content() {
        section.trim_body();
        sections.push(section);
    }
}

/// Lower-kebab-case slug: non-alphanumeric runs collapse to a single `-`.
pub fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}
