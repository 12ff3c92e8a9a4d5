//! Layout-analysis annotation document model
//!
//! Serde model of the analysis JSON a layout-detection backend emits: a
//! document is an ordered sequence of pages, each carrying recursively
//! nested block trees with optional text lines and spans. Blocks are never
//! mutated after parse; every derived view (flattened lists, resolved
//! coordinates) is a computed copy.
//!
//! Fields the model does not know about are preserved verbatim in a
//! per-record extension map so they round-trip into the inspector's raw
//! display.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier for a block.
///
/// Assigned at parse time, stable for the lifetime of the loaded document.
/// All selection and equality comparisons go through this id; two
/// structurally identical blocks are still distinct entities.
pub type BlockId = uuid::Uuid;

/// Errors raised while loading an annotation payload.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("failed to read annotation file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid payload: expected an object with a `pdf_info` array, or a bare page array")]
    InvalidShape,
}

/// Result type for annotation loading.
pub type FormatResult<T> = Result<T, FormatError>;

/// Bounding box as `[x_min, y_min, x_max, y_max]`.
///
/// Coordinates are either absolute page units or page-relative fractions
/// in `[0, 1]`, discriminated by the owning block's [`CoordSpace`] tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BBox(pub [f32; 4]);

impl BBox {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self([x_min, y_min, x_max, y_max])
    }

    pub fn x_min(&self) -> f32 {
        self.0[0]
    }

    pub fn y_min(&self) -> f32 {
        self.0[1]
    }

    pub fn x_max(&self) -> f32 {
        self.0[2]
    }

    pub fn y_max(&self) -> f32 {
        self.0[3]
    }

    pub fn width(&self) -> f32 {
        self.x_max() - self.x_min()
    }

    pub fn height(&self) -> f32 {
        self.y_max() - self.y_min()
    }

    /// Area in the box's native coordinate space.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// A box is well-formed iff every coordinate is finite and the extents
    /// are not inverted. Malformed boxes are excluded from painting, never
    /// an error.
    pub fn is_well_formed(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
            && self.x_min() <= self.x_max()
            && self.y_min() <= self.y_max()
    }

    /// Scale each x-coordinate by `sx` and each y-coordinate by `sy`.
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self([
            self.x_min() * sx,
            self.y_min() * sy,
            self.x_max() * sx,
            self.y_max() * sy,
        ])
    }
}

/// Coordinate space of a block's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordSpace {
    /// Absolute page units (the document's own unit system).
    #[default]
    Absolute,
    /// Fractions of the rendered page dimensions, in `[0, 1]`.
    Relative,
}

/// A run of text inside a line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub bbox: Option<BBox>,
    #[serde(rename = "type", default)]
    pub span_type: String,
    #[serde(default)]
    pub content: String,
}

/// A text line inside a block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Line {
    #[serde(default)]
    pub bbox: Option<BBox>,
    #[serde(default)]
    pub spans: Vec<Span>,
}

/// A detected layout region on a page.
///
/// Blocks nest: composite regions (tables, figures) carry their captions,
/// bodies, and footnotes as children. The `extra` map holds any fields the
/// backend emitted that the model does not interpret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    #[serde(skip, default = "BlockId::new_v4")]
    pub id: BlockId,

    #[serde(default)]
    pub bbox: Option<BBox>,

    #[serde(rename = "type", default)]
    pub block_type: String,

    /// Coordinate space of `bbox`; absolute unless the backend says otherwise.
    #[serde(default)]
    pub bbox_type: CoordSpace,

    /// Ordinal emitted by the backend; display hint only. Some backends
    /// emit fractional reading-order indices, so this stays a float.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<f64>,

    /// Nested child regions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<Line>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Block {
    /// Concatenated textual content of every span, lines separated by `\n`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Depth-first search for a block by id, self included.
    pub fn find(&self, id: BlockId) -> Option<&Block> {
        if self.id == id {
            return Some(self);
        }
        self.blocks.iter().find_map(|child| child.find(id))
    }
}

/// One page of the analyzed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page index. Uniqueness is not guaranteed by the source
    /// data; lookups take the first match.
    pub page_idx: usize,

    /// Nominal `[width, height]` in document units.
    pub page_size: [f32; 2],

    /// Primary content blocks.
    #[serde(default)]
    pub para_blocks: Vec<Block>,

    /// Auxiliary regions (headers, footers, page numbers) kept separate
    /// from primary content but still paintable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discarded_blocks: Vec<Block>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A parsed annotation document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub pdf_info: Vec<Page>,

    #[serde(rename = "_backend", default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,

    #[serde(rename = "_version_name", default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Parse an annotation payload from JSON text.
    ///
    /// A payload is valid iff it is an object with a `pdf_info` array, or
    /// is itself an array of pages (auto-wrapped). Anything else fails
    /// with [`FormatError::InvalidShape`] and leaves no partial state.
    pub fn from_json_str(text: &str) -> FormatResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parse an annotation payload from an already-decoded JSON value.
    pub fn from_value(value: Value) -> FormatResult<Self> {
        let value = match value {
            Value::Array(pages) => {
                let mut wrapped = Map::new();
                wrapped.insert("pdf_info".to_owned(), Value::Array(pages));
                Value::Object(wrapped)
            }
            Value::Object(map) => {
                if !map.get("pdf_info").is_some_and(Value::is_array) {
                    return Err(FormatError::InvalidShape);
                }
                Value::Object(map)
            }
            _ => return Err(FormatError::InvalidShape),
        };

        Ok(serde_json::from_value(value)?)
    }

    pub fn page_count(&self) -> usize {
        self.pdf_info.len()
    }

    /// Look up a page by zero-based index, first match wins.
    pub fn page_by_index(&self, page_idx: usize) -> Option<&Page> {
        self.pdf_info.iter().find(|page| page.page_idx == page_idx)
    }

    /// Find a block anywhere in the document by its id.
    pub fn find_block(&self, id: BlockId) -> Option<&Block> {
        self.pdf_info.iter().find_map(|page| {
            page.para_blocks
                .iter()
                .chain(page.discarded_blocks.iter())
                .find_map(|block| block.find(id))
        })
    }
}
