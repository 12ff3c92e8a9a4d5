//! Layout Inspector Core Library
//!
//! Annotation-to-geometry mapping and layer compositing: block-tree
//! normalization, coordinate-space resolution, deterministic stacking
//! order, visibility filtering, and the session state machine.

pub mod filter;
pub mod normalize;
pub mod overlay;
pub mod session;
pub mod style;

pub use filter::{effective_category, is_visible, SHOW_ALL};
pub use normalize::{flatten_page, normalize_page, PageDims, PaintableBlock};
pub use overlay::{compose_page, hit_test, OverlayRegion, PageRenderState, ScreenRect};
pub use session::{ParseOutcome, SessionState, MAX_SCALE, MIN_SCALE, RESET_SCALE, SCALE_STEP};
pub use style::{resolve, BlockStyle, Color, KNOWN_CATEGORIES};
