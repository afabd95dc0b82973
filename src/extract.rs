//! Status extraction from rendered HTML.
//!
//! The page is parsed into a DOM with html5ever. The status indicator is the
//! single element with a given tag name and class (`span.sailingStatus` on
//! the public pages). Its descendant text, minus script and style content,
//! is whitespace-collapsed and trimmed.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use thiserror::Error;

use crate::render::RenderedPage;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Status element not found: {0}")]
    NotFound(String),
}

/// Tag + class selector for the status indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSelector {
    pub tag: String,
    pub class: String,
}

impl Default for StatusSelector {
    fn default() -> Self {
        Self::new("span", "sailingStatus")
    }
}

impl std::fmt::Display for StatusSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.tag, self.class)
    }
}

impl StatusSelector {
    pub fn new(tag: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            class: class.into(),
        }
    }

    /// Trimmed text of the one matching element.
    pub fn extract(&self, page: &RenderedPage) -> Result<String, ExtractError> {
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut page.html.as_bytes())
            .map_err(|e| ExtractError::NotFound(format!("failed to parse page: {}", e)))?;

        let mut found = Vec::new();
        self.collect_matches(&dom.document, &mut found);

        match found.as_slice() {
            [] => Err(ExtractError::NotFound(format!(
                "no element matches '{}'",
                self
            ))),
            [text] => Ok(text.clone()),
            many => Err(ExtractError::NotFound(format!(
                "{} elements match '{}'",
                many.len(),
                self
            ))),
        }
    }

    fn collect_matches(&self, handle: &Handle, found: &mut Vec<String>) {
        if self.matches(handle) {
            found.push(normalize_ws(&collect_text(handle)));
        }
        for child in handle.children.borrow().iter() {
            self.collect_matches(child, found);
        }
    }

    /// Tag names are compared case-insensitively, class tokens exactly.
    fn matches(&self, handle: &Handle) -> bool {
        let NodeData::Element { name, attrs, .. } = &handle.data else {
            return false;
        };
        if !name.local.as_ref().eq_ignore_ascii_case(&self.tag) {
            return false;
        }
        attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == "class")
            .is_some_and(|attr| attr.value.split_ascii_whitespace().any(|c| c == self.class))
    }
}

/// Descendant text, skipping script and style content.
fn collect_text(handle: &Handle) -> String {
    let mut text = String::new();
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => text.push_str(&contents.borrow()),
            NodeData::Element { name, .. } => {
                if !matches!(name.local.as_ref(), "script" | "style") {
                    text.push_str(&collect_text(child));
                }
            }
            _ => {}
        }
    }
    text
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
