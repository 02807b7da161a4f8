use serde::{Deserialize, Serialize};

/// One unit of recognized text from layout analysis.
///
/// Blocks arrive in reading order; `index` is assigned by the caller before
/// mapping and is the addressable identity used in evidence block ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default, alias = "text")]
    pub content: String,
    #[serde(default, alias = "page")]
    pub page_number: u32,
    /// Opaque geometry from the layout backend; never inspected by mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl TextBlock {
    pub fn new(page_number: u32, index: usize, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            page_number,
            bounding_box: None,
            role: None,
            index: Some(index),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Stable evidence pointer of the form `p{page}b{index}`.
    ///
    /// A block without an assigned index renders as `p{page}b`.
    pub fn block_id(&self) -> String {
        match self.index {
            Some(index) => format!("p{}b{}", self.page_number, index),
            None => format!("p{}b", self.page_number),
        }
    }

    /// Heading-like roles reported by the layout backend.
    pub fn is_heading(&self) -> bool {
        matches!(self.role.as_deref(), Some("title") | Some("sectionHeading"))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    #[serde(default, alias = "page")]
    pub page_number: u32,
    #[serde(default)]
    pub row_count: usize,
    #[serde(default)]
    pub column_count: usize,
    #[serde(default)]
    pub cells: Vec<Cell>,
}

/// Output of the external layout-analysis backend for one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedLayout {
    #[serde(default)]
    pub text_blocks: Vec<TextBlock>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub page_anchors: serde_json::Map<String, serde_json::Value>,
}

impl ExtractedLayout {
    pub fn from_blocks(text_blocks: Vec<TextBlock>) -> Self {
        Self {
            text_blocks,
            ..Self::default()
        }
    }

    /// Set every block's `index` to its reading-order position.
    pub fn assign_block_indices(&mut self) {
        for (position, block) in self.text_blocks.iter_mut().enumerate() {
            block.index = Some(position);
        }
    }

    /// Page count reported in metadata, else the highest block page number.
    pub fn page_count(&self) -> u32 {
        self.metadata
            .get("page_count")
            .and_then(|v| v.as_u64())
            .map(|n| n as u32)
            .unwrap_or_else(|| {
                self.text_blocks
                    .iter()
                    .map(|b| b.page_number)
                    .max()
                    .unwrap_or(0)
            })
    }
}
