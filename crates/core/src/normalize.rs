//! Block normalization
//!
//! Flattens a page's nested block forests into a flat, paintable list:
//! depth-first traversal, stable area-descending stacking order, and
//! deferred relative-to-absolute coordinate resolution against the
//! rendered page dimensions.

use layout_inspector_model::{BBox, Block, BlockId, CoordSpace, Page};
use log::debug;

/// Rendered pixel dimensions of a page, as reported by the external
/// renderer. Relative-space bounding boxes can only resolve once these
/// are known; the nominal document page size is never a substitute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDims {
    pub width: f32,
    pub height: f32,
}

impl PageDims {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A block ready for painting: flattened, ordered, coordinate-resolved.
///
/// Borrows the source block; the original tree is never mutated. `bbox`
/// is a computed copy in absolute units.
#[derive(Debug, Clone)]
pub struct PaintableBlock<'a> {
    pub block: &'a Block,
    pub bbox: BBox,
}

impl PaintableBlock<'_> {
    pub fn id(&self) -> BlockId {
        self.block.id
    }

    pub fn block_type(&self) -> &str {
        &self.block.block_type
    }

    pub fn ordinal(&self) -> Option<f64> {
        self.block.index
    }
}

/// Depth-first pre-order flatten of the page's primary and discarded
/// forests: parent before children, children in original order. The
/// result order is the stable tie-break for the stacking sort.
pub fn flatten_page(page: &Page) -> Vec<&Block> {
    let mut out = Vec::new();
    for block in page.para_blocks.iter().chain(page.discarded_blocks.iter()) {
        push_depth_first(block, &mut out);
    }
    out
}

fn push_depth_first<'a>(block: &'a Block, out: &mut Vec<&'a Block>) {
    out.push(block);
    for child in &block.blocks {
        push_depth_first(child, out);
    }
}

/// Normalize a page into its paintable block sequence.
///
/// Larger regions sort first so smaller nested regions visually sit on
/// top. Areas are computed in each block's native coordinate space; ties
/// keep flatten order (stable sort). Blocks with a missing or malformed
/// bbox are excluded, as are relative-space blocks while `dims` is still
/// unknown — exclusions are never errors and never affect sibling blocks.
pub fn normalize_page<'a>(page: &'a Page, dims: Option<PageDims>) -> Vec<PaintableBlock<'a>> {
    let mut flat: Vec<(&Block, BBox, f32)> = flatten_page(page)
        .into_iter()
        .filter_map(|block| {
            let bbox = match block.bbox {
                Some(bbox) if bbox.is_well_formed() => bbox,
                Some(_) => {
                    debug!(
                        "page {}: excluding block {:?} with malformed bbox",
                        page.page_idx, block.block_type
                    );
                    return None;
                }
                None => {
                    debug!(
                        "page {}: excluding block {:?} without bbox",
                        page.page_idx, block.block_type
                    );
                    return None;
                }
            };
            let area = bbox.area();
            Some((block, bbox, area))
        })
        .collect();

    flat.sort_by(|a, b| b.2.total_cmp(&a.2));

    flat.into_iter()
        .filter_map(|(block, bbox, _area)| {
            let bbox = match block.bbox_type {
                CoordSpace::Absolute => bbox,
                CoordSpace::Relative => {
                    let dims = dims?;
                    bbox.scaled(dims.width, dims.height)
                }
            };
            Some(PaintableBlock { block, bbox })
        })
        .collect()
}
