//! Document/session state
//!
//! Owns the loaded annotation document, the current selection, the
//! visible category set, and the zoom scale, and wires user actions to
//! their re-derivations. Parse results arrive asynchronously and are
//! applied last-write-wins via a generation counter.

use std::collections::HashSet;

use layout_inspector_model::{Block, BlockId, Document, FormatError};
use log::{info, warn};

use crate::style::KNOWN_CATEGORIES;

/// Zoom scale bounds and step.
pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;
pub const SCALE_STEP: f32 = 0.1;
/// Scale applied by the reset control.
pub const RESET_SCALE: f32 = 1.0;
/// Scale a fresh session starts at.
const DEFAULT_SCALE: f32 = 1.2;

/// Outcome of applying an asynchronous parse result.
#[derive(Debug)]
pub enum ParseOutcome {
    /// The document was applied; selection was cleared.
    Applied { pages: usize },
    /// The result belonged to a superseded request and was discarded.
    Stale,
    /// The payload was rejected; the previous document is untouched.
    Failed(FormatError),
}

/// Top-level session state.
///
/// Created empty at startup; loading a new document clears the selection
/// so a stale block reference from a previous document can never remain
/// selectable.
pub struct SessionState {
    document: Option<Document>,
    selected: Option<BlockId>,
    visible: HashSet<String>,
    scale: f32,
    parse_generation: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            document: None,
            selected: None,
            visible: KNOWN_CATEGORIES.iter().map(|k| (*k).to_owned()).collect(),
            scale: DEFAULT_SCALE,
            parse_generation: 0,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn selected(&self) -> Option<BlockId> {
        self.selected
    }

    /// The currently selected block, if it exists in the loaded document.
    pub fn selected_block(&self) -> Option<&Block> {
        let id = self.selected?;
        self.document.as_ref()?.find_block(id)
    }

    pub fn visible(&self) -> &HashSet<String> {
        &self.visible
    }

    pub fn is_category_visible(&self, key: &str) -> bool {
        self.visible.contains(key)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn select_block(&mut self, id: Option<BlockId>) {
        self.selected = id;
    }

    /// Symmetric add/remove of a category key from the visible set.
    pub fn toggle_category(&mut self, key: &str) {
        if !self.visible.remove(key) {
            self.visible.insert(key.to_owned());
        }
    }

    /// All-or-nothing layer shortcut, keyed off current membership count:
    /// if every known category is visible the set is cleared, otherwise
    /// it becomes the full known vocabulary.
    pub fn toggle_all(&mut self) {
        if self.visible.len() == KNOWN_CATEGORIES.len() {
            self.visible.clear();
        } else {
            self.visible = KNOWN_CATEGORIES.iter().map(|k| (*k).to_owned()).collect();
        }
    }

    pub fn all_categories_visible(&self) -> bool {
        self.visible.len() == KNOWN_CATEGORIES.len()
    }

    /// Set the zoom scale, clamped to `[MIN_SCALE, MAX_SCALE]`. Returns
    /// the scale actually applied.
    pub fn set_scale(&mut self, scale: f32) -> f32 {
        self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        self.scale
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set_scale(self.scale + SCALE_STEP)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set_scale(self.scale - SCALE_STEP)
    }

    pub fn reset_zoom(&mut self) -> f32 {
        self.set_scale(RESET_SCALE)
    }

    /// Start a new parse request and return its generation. Only the
    /// result carrying the most recently issued generation will be
    /// applied; anything older is discarded on arrival.
    pub fn begin_parse(&mut self) -> u64 {
        self.parse_generation += 1;
        self.parse_generation
    }

    /// Apply an asynchronous parse result, last-write-wins.
    pub fn apply_parse(
        &mut self,
        generation: u64,
        result: Result<Document, FormatError>,
    ) -> ParseOutcome {
        if generation != self.parse_generation {
            warn!(
                "discarding stale parse result (generation {generation}, current {})",
                self.parse_generation
            );
            return ParseOutcome::Stale;
        }

        match result {
            Ok(document) => {
                let pages = document.page_count();
                info!("annotation document loaded: {pages} page(s)");
                self.document = Some(document);
                self.selected = None;
                ParseOutcome::Applied { pages }
            }
            Err(err) => {
                warn!("annotation document rejected: {err}");
                ParseOutcome::Failed(err)
            }
        }
    }

    /// Drop the loaded document and selection (e.g. on session reset).
    pub fn clear_document(&mut self) {
        self.document = None;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_PAGE: &str =
        r#"{ "pdf_info": [ { "page_idx": 0, "page_size": [600, 800], "para_blocks": [] } ] }"#;

    fn load(session: &mut SessionState, json: &str) {
        let generation = session.begin_parse();
        let outcome = session.apply_parse(generation, Document::from_json_str(json));
        assert!(matches!(outcome, ParseOutcome::Applied { .. }));
    }

    #[test]
    fn toggle_category_is_its_own_inverse() {
        let mut session = SessionState::new();

        for key in KNOWN_CATEGORIES {
            let before: Vec<String> = {
                let mut v: Vec<String> = session.visible().iter().cloned().collect();
                v.sort();
                v
            };
            session.toggle_category(key);
            session.toggle_category(key);
            let mut after: Vec<String> = session.visible().iter().cloned().collect();
            after.sort();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn toggle_all_clears_when_everything_is_visible() {
        let mut session = SessionState::new();
        assert!(session.all_categories_visible());

        session.toggle_all();
        assert!(session.visible().is_empty());

        session.toggle_all();
        assert!(session.all_categories_visible());
    }

    #[test]
    fn toggle_all_from_partial_set_restores_everything() {
        let mut session = SessionState::new();
        session.toggle_category("table");
        session.toggle_category("title");
        assert!(!session.all_categories_visible());

        session.toggle_all();
        assert!(session.all_categories_visible());
    }

    #[test]
    fn scale_is_clamped_and_reset_is_documented() {
        let mut session = SessionState::new();

        assert_eq!(session.set_scale(10.0), MAX_SCALE);
        assert_eq!(session.set_scale(0.01), MIN_SCALE);

        session.set_scale(2.95);
        assert_eq!(session.zoom_in(), MAX_SCALE);
        assert_eq!(session.reset_zoom(), RESET_SCALE);

        session.set_scale(0.55);
        assert_eq!(session.zoom_out(), MIN_SCALE);
    }

    #[test]
    fn round_trip_single_page_payload() {
        let mut session = SessionState::new();
        load(&mut session, ONE_PAGE);

        let document = session.document().expect("document expected");
        assert_eq!(document.page_count(), 1);
        let page = document.page_by_index(0).expect("page 0 expected");
        assert!(crate::normalize::normalize_page(page, None).is_empty());
    }

    #[test]
    fn loading_a_new_document_clears_the_selection() {
        let mut session = SessionState::new();
        load(
            &mut session,
            r#"{ "pdf_info": [ { "page_idx": 0, "page_size": [600, 800], "para_blocks": [
                { "bbox": [0, 0, 10, 10], "type": "text" }
            ] } ] }"#,
        );

        let id = session.document().unwrap().pdf_info[0].para_blocks[0].id;
        session.select_block(Some(id));
        assert!(session.selected_block().is_some());

        load(&mut session, ONE_PAGE);
        assert!(session.selected().is_none());
        assert!(session.selected_block().is_none());
    }

    #[test]
    fn failed_parse_leaves_previous_document_and_selection() {
        let mut session = SessionState::new();
        load(
            &mut session,
            r#"{ "pdf_info": [ { "page_idx": 0, "page_size": [600, 800], "para_blocks": [
                { "bbox": [0, 0, 10, 10], "type": "text" }
            ] } ] }"#,
        );
        let id = session.document().unwrap().pdf_info[0].para_blocks[0].id;
        session.select_block(Some(id));

        let generation = session.begin_parse();
        let outcome = session.apply_parse(generation, Document::from_json_str("{ bad"));
        assert!(matches!(outcome, ParseOutcome::Failed(_)));
        assert!(session.document().is_some());
        assert_eq!(session.selected(), Some(id));
    }

    #[test]
    fn stale_parse_results_are_discarded() {
        let mut session = SessionState::new();

        let first = session.begin_parse();
        let second = session.begin_parse();

        // The slower, older request finishes after a newer one started.
        let outcome = session.apply_parse(first, Document::from_json_str(ONE_PAGE));
        assert!(matches!(outcome, ParseOutcome::Stale));
        assert!(session.document().is_none());

        let outcome = session.apply_parse(second, Document::from_json_str(ONE_PAGE));
        assert!(matches!(outcome, ParseOutcome::Applied { pages: 1 }));
    }

    #[test]
    fn selected_block_resolves_through_the_document() {
        let mut session = SessionState::new();
        load(
            &mut session,
            r#"{ "pdf_info": [ { "page_idx": 0, "page_size": [600, 800], "para_blocks": [
                { "bbox": [0, 0, 100, 50], "type": "table", "blocks": [
                    { "bbox": [0, 0, 100, 10], "type": "table_caption" }
                ] }
            ] } ] }"#,
        );

        let caption_id = session.document().unwrap().pdf_info[0].para_blocks[0].blocks[0].id;
        session.select_block(Some(caption_id));
        assert_eq!(
            session.selected_block().map(|b| b.block_type.as_str()),
            Some("table_caption")
        );
    }
}
