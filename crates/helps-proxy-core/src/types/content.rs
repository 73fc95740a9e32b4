//! Canonical content: the single output shape for every tool response

use serde::{Deserialize, Serialize};

/// One block of canonical content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            ContentBlock::Text { text } => text,
        }
    }
}

/// Ordered sequence of text blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalContent(Vec<ContentBlock>);

impl CanonicalContent {
    pub fn new(blocks: Vec<ContentBlock>) -> Self {
        Self(blocks)
    }

    /// Single-block content
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(vec![ContentBlock::text(text)])
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All block texts joined by blank lines
    pub fn joined_text(&self) -> String {
        self.0
            .iter()
            .map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn into_blocks(self) -> Vec<ContentBlock> {
        self.0
    }
}

impl From<Vec<ContentBlock>> for CanonicalContent {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        Self(blocks)
    }
}
