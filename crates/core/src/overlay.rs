//! Page overlay compositing
//!
//! Combines a page's normalized and filtered block list with the zoom
//! scale and the renderer-reported page dimensions to produce positioned,
//! clickable overlay regions. Each page owns an independent render state
//! machine; regions are only emitted once the renderer has reported the
//! page's actual dimensions, so stale geometry never paints during a zoom
//! transition.

use std::collections::HashSet;

use layout_inspector_model::{Block, BlockId, Page};

use crate::filter;
use crate::normalize::{normalize_page, PageDims};
use crate::style::{self, BlockStyle};

/// Render lifecycle of a single page.
///
/// `Unloaded -> Loading -> Loaded(dims)`. Re-entering `Loading` (zoom
/// change forcing a re-render) drops the previous dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageRenderState {
    #[default]
    Unloaded,
    Loading,
    Loaded(PageDims),
}

impl PageRenderState {
    pub fn begin_loading(&mut self) {
        *self = Self::Loading;
    }

    pub fn loaded(&mut self, dims: PageDims) {
        *self = Self::Loaded(dims);
    }

    /// Invalidate previously reported dimensions. A page that was never
    /// asked to render stays `Unloaded`.
    pub fn invalidate(&mut self) {
        if !matches!(self, Self::Unloaded) {
            *self = Self::Loading;
        }
    }

    pub fn dims(&self) -> Option<PageDims> {
        match self {
            Self::Loaded(dims) => Some(*dims),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Screen-space rectangle in UI points, relative to the page origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A positioned, clickable overlay region.
///
/// Carries a reference back to the originating block: click handling must
/// report the original block, not the coordinate-resolved copy.
#[derive(Debug, Clone)]
pub struct OverlayRegion<'a> {
    pub rect: ScreenRect,
    pub style: BlockStyle,
    pub ordinal: Option<f64>,
    pub block: &'a Block,
    pub selected: bool,
}

impl OverlayRegion<'_> {
    pub fn id(&self) -> BlockId {
        self.block.id
    }

    pub fn label(&self) -> &'static str {
        self.style.label
    }
}

/// Compose the overlay regions for one page.
///
/// Returns an empty sequence unless the page is `Loaded`; the paint order
/// of the result is the normalizer's stacking order (larger regions
/// first).
pub fn compose_page<'a>(
    page: &'a Page,
    state: PageRenderState,
    scale: f32,
    visible: &HashSet<String>,
    selected: Option<BlockId>,
) -> Vec<OverlayRegion<'a>> {
    let Some(dims) = state.dims() else {
        return Vec::new();
    };

    normalize_page(page, Some(dims))
        .into_iter()
        .filter(|paintable| filter::is_visible(paintable.block_type(), visible))
        .map(|paintable| {
            let bbox = paintable.bbox;
            OverlayRegion {
                rect: ScreenRect {
                    x: bbox.x_min() * scale,
                    y: bbox.y_min() * scale,
                    width: bbox.width() * scale,
                    height: bbox.height() * scale,
                },
                style: style::resolve(paintable.block_type()),
                ordinal: paintable.ordinal(),
                selected: selected == Some(paintable.id()),
                block: paintable.block,
            }
        })
        .collect()
}

/// Topmost region under a point, if any.
///
/// Regions paint in order, so the last hit is the one visually on top;
/// the click contract selects it and must not fall through to the page
/// background.
pub fn hit_test<'a, 'r>(
    regions: &'r [OverlayRegion<'a>],
    x: f32,
    y: f32,
) -> Option<&'r OverlayRegion<'a>> {
    regions.iter().rev().find(|region| region.rect.contains(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use layout_inspector_model::Document;

    fn page_from_json(json: &str) -> Page {
        let doc = Document::from_json_str(json).expect("payload expected to parse");
        doc.pdf_info.into_iter().next().expect("one page expected")
    }

    fn all_visible() -> HashSet<String> {
        std::iter::once(filter::SHOW_ALL.to_owned()).collect()
    }

    const PAGE: &str = r#"{ "pdf_info": [ { "page_idx": 0, "page_size": [600, 800],
        "para_blocks": [
            { "bbox": [0, 0, 400, 300], "type": "table", "index": 4, "blocks": [
                { "bbox": [10, 10, 200, 40], "type": "table_caption" }
            ] },
            { "bbox": [0.5, 0.5, 0.9, 0.9], "type": "image", "bbox_type": "relative" }
        ]
    } ] }"#;

    #[test]
    fn no_regions_unless_loaded() {
        let page = page_from_json(PAGE);
        let visible = all_visible();

        for state in [PageRenderState::Unloaded, PageRenderState::Loading] {
            assert!(compose_page(&page, state, 1.0, &visible, None).is_empty());
        }

        let state = PageRenderState::Loaded(PageDims::new(600.0, 800.0));
        assert_eq!(compose_page(&page, state, 1.0, &visible, None).len(), 3);
    }

    #[test]
    fn zoom_invalidation_suppresses_stale_overlays() {
        let mut state = PageRenderState::default();
        assert_eq!(state, PageRenderState::Unloaded);

        state.begin_loading();
        state.loaded(PageDims::new(600.0, 800.0));
        assert!(state.is_loaded());

        state.invalidate();
        assert_eq!(state, PageRenderState::Loading);
        assert!(state.dims().is_none());

        // A page that never started loading stays Unloaded.
        let mut untouched = PageRenderState::Unloaded;
        untouched.invalidate();
        assert_eq!(untouched, PageRenderState::Unloaded);
    }

    #[test]
    fn region_rects_scale_with_zoom() {
        let page = page_from_json(PAGE);
        let state = PageRenderState::Loaded(PageDims::new(600.0, 800.0));

        let regions = compose_page(&page, state, 2.0, &all_visible(), None);
        let table = regions
            .iter()
            .find(|r| r.block.block_type == "table")
            .expect("table region expected");
        assert_eq!(table.rect.x, 0.0);
        assert_eq!(table.rect.width, 800.0);
        assert_eq!(table.rect.height, 600.0);
        assert_eq!(table.ordinal, Some(4.0));

        // Relative bbox resolves against rendered dims before scaling.
        let image = regions
            .iter()
            .find(|r| r.block.block_type == "image")
            .expect("image region expected");
        assert_eq!(image.rect.x, 600.0 * 0.5 * 2.0);
        assert_eq!(image.rect.y, 800.0 * 0.5 * 2.0);
    }

    #[test]
    fn hidden_categories_are_filtered_out() {
        let page = page_from_json(PAGE);
        let state = PageRenderState::Loaded(PageDims::new(600.0, 800.0));

        let visible: HashSet<String> = std::iter::once("image".to_owned()).collect();
        let regions = compose_page(&page, state, 1.0, &visible, None);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].block.block_type, "image");
    }

    #[test]
    fn selection_flag_uses_block_identity() {
        let page = page_from_json(PAGE);
        let caption_id = page.para_blocks[0].blocks[0].id;
        let state = PageRenderState::Loaded(PageDims::new(600.0, 800.0));

        let regions = compose_page(&page, state, 1.0, &all_visible(), Some(caption_id));
        let selected: Vec<_> = regions.iter().filter(|r| r.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id(), caption_id);
        assert_eq!(selected[0].label(), "Table Cap");
    }

    #[test]
    fn hit_test_returns_the_topmost_region() {
        let page = page_from_json(PAGE);
        let state = PageRenderState::Loaded(PageDims::new(600.0, 800.0));
        let regions = compose_page(&page, state, 1.0, &all_visible(), None);

        // (20, 20) is inside both the table and its caption; the caption
        // paints later (smaller area) so it is on top.
        let hit = hit_test(&regions, 20.0, 20.0).expect("hit expected");
        assert_eq!(hit.block.block_type, "table_caption");

        // (390, 290) only hits the table.
        let hit = hit_test(&regions, 390.0, 290.0).expect("hit expected");
        assert_eq!(hit.block.block_type, "table");

        assert!(hit_test(&regions, 5000.0, 5000.0).is_none());
    }
}
