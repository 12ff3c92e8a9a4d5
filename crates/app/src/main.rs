//! Layout Inspector - egui-based UI
//!
//! Renders a PDF with pdfium and paints a layout-analysis backend's block
//! annotations over each page: toggleable category layers, click-to-select
//! overlay regions, and an inspector panel for the selected block.

use eframe::egui;
use layout_inspector_core::{
    compose_page, hit_test, resolve, Color, PageDims, PageRenderState, ParseOutcome, SessionState,
    KNOWN_CATEGORIES,
};
use layout_inspector_model::{Block, BlockId, Document, FormatError};
use layout_inspector_render::PdfDocument;
use log::{error, info};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// Vertical gap between stacked pages in the viewport.
const PAGE_SPACING: f32 = 16.0;

fn main() -> eframe::Result {
    let _ = simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Layout Inspector"),
        ..Default::default()
    };

    eframe::run_native(
        "Layout Inspector",
        options,
        Box::new(|cc| Ok(Box::new(InspectorApp::new(cc)))),
    )
}

/// Page texture cache key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct PageTextureKey {
    page: usize,
    zoom_percent: u32,
}

/// Result of one asynchronous JSON parse, tagged with its generation.
struct ParseMessage {
    generation: u64,
    result: Result<Document, FormatError>,
}

struct InspectorApp {
    // Session (annotation document, selection, layers, zoom)
    session: SessionState,

    // Rendered PDF state
    pdf: Option<PdfDocument>,
    pdf_path: Option<PathBuf>,
    page_count: usize,

    // Per-page compositor state (renderer-reported dimensions)
    page_states: Vec<PageRenderState>,

    // Page texture cache: (page, zoom) -> texture
    textures: HashMap<PageTextureKey, egui::TextureHandle>,

    // Pages that failed to rasterize at a given zoom; not retried
    failed_textures: HashSet<PageTextureKey>,

    // Async JSON parse plumbing
    parse_tx: Sender<ParseMessage>,
    parse_rx: Receiver<ParseMessage>,
    json_path: Option<PathBuf>,

    // Dialogs
    error_dialog: Option<String>,
}

impl InspectorApp {
    fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (parse_tx, parse_rx) = channel();

        Self {
            session: SessionState::new(),
            pdf: None,
            pdf_path: None,
            page_count: 0,
            page_states: Vec::new(),
            textures: HashMap::new(),
            failed_textures: HashSet::new(),
            parse_tx,
            parse_rx,
            json_path: None,
            error_dialog: None,
        }
    }

    fn show_error(&mut self, message: impl Into<String>) {
        self.error_dialog = Some(message.into());
    }

    /// Open a PDF file using the file picker
    fn open_pdf_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PDF", &["pdf"])
            .pick_file()
        {
            self.load_pdf(path);
        }
    }

    /// Open an analysis JSON file using the file picker
    fn open_json_dialog(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            self.load_json(ctx, path);
        }
    }

    /// Load a PDF from path, replacing any previously loaded document.
    ///
    /// Dropping the previous `PdfDocument` releases its per-load
    /// resources; all derived caches are cleared with it.
    fn load_pdf(&mut self, path: PathBuf) {
        match PdfDocument::open(&path) {
            Ok(pdf) => {
                self.page_count = pdf.page_count() as usize;
                self.page_states = vec![PageRenderState::default(); self.page_count];
                self.textures.clear();
                self.failed_textures.clear();
                self.pdf = Some(pdf);
                self.pdf_path = Some(path);
                info!("PDF loaded: {} page(s)", self.page_count);
            }
            Err(e) => {
                self.show_error(format!("Failed to open PDF: {}", e));
            }
        }
    }

    /// Read and parse an analysis JSON on a worker thread.
    ///
    /// The session hands out a generation per request; whichever parse
    /// finishes carrying the latest generation wins, results from
    /// superseded requests are discarded on arrival.
    fn load_json(&mut self, ctx: &egui::Context, path: PathBuf) {
        let generation = self.session.begin_parse();
        let tx = self.parse_tx.clone();
        let repaint_ctx = ctx.clone();
        let worker_path = path.clone();

        thread::spawn(move || {
            let result = std::fs::read_to_string(&worker_path)
                .map_err(FormatError::from)
                .and_then(|text| Document::from_json_str(&text));
            let _ = tx.send(ParseMessage { generation, result });
            repaint_ctx.request_repaint();
        });

        self.json_path = Some(path);
    }

    fn poll_parse_results(&mut self) {
        while let Ok(message) = self.parse_rx.try_recv() {
            match self.session.apply_parse(message.generation, message.result) {
                ParseOutcome::Applied { pages } => {
                    info!("analysis JSON linked: {} page(s) of annotations", pages);
                }
                ParseOutcome::Failed(err) => {
                    self.show_error(format!("Failed to load analysis JSON: {}", err));
                }
                ParseOutcome::Stale => {}
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });

        for path in dropped {
            match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("pdf") => self.load_pdf(path),
                Some(ext) if ext.eq_ignore_ascii_case("json") => self.load_json(ctx, path),
                _ => {}
            }
        }
    }

    /// Apply a zoom mutation; a changed scale invalidates every page's
    /// reported dimensions and drops the texture cache, so stale overlays
    /// never paint while pages re-render.
    fn apply_zoom(&mut self, change: impl FnOnce(&mut SessionState) -> f32) {
        let before = self.session.scale();
        let after = change(&mut self.session);

        if before != after {
            for state in &mut self.page_states {
                state.invalidate();
            }
            self.textures.clear();
            self.failed_textures.clear();
        }
    }

    fn zoom_percent(&self) -> u32 {
        (self.session.scale() * 100.0).round() as u32
    }

    /// Ensure the texture for `page` at the current zoom exists, driving
    /// the page's render state machine along the way.
    fn ensure_page_texture(&mut self, ctx: &egui::Context, page: usize) -> Option<PageTextureKey> {
        let key = PageTextureKey {
            page,
            zoom_percent: self.zoom_percent(),
        };

        if self.textures.contains_key(&key) {
            return Some(key);
        }
        if self.failed_textures.contains(&key) {
            return None;
        }

        let pdf = self.pdf.as_ref()?;
        self.page_states[page].begin_loading();

        match pdf.render_page_at_scale(page as u16, self.session.scale(), ctx.pixels_per_point()) {
            Ok(rendered) => {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [rendered.width_px as usize, rendered.height_px as usize],
                    &rendered.rgba,
                );
                let handle = ctx.load_texture(
                    format!("page_{}_{}", page, key.zoom_percent),
                    image,
                    egui::TextureOptions::LINEAR,
                );
                self.textures.insert(key, handle);
                self.page_states[page]
                    .loaded(PageDims::new(rendered.base_width, rendered.base_height));
                Some(key)
            }
            Err(e) => {
                error!("failed to render page {}: {}", page, e);
                self.failed_textures.insert(key);
                self.show_error(format!("Failed to render PDF: {}", e));
                None
            }
        }
    }
}

impl eframe::App for InspectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_parse_results();
        self.handle_dropped_files(ctx);
        self.draw_toolbar(ctx);
        self.draw_sidebar(ctx);
        self.draw_viewport(ctx);
        self.draw_error_dialog(ctx);
    }
}

fn color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

fn file_label(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "none".to_owned())
}

impl InspectorApp {
    fn draw_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add_space(8.0);

                let pages_text = if self.page_count > 0 {
                    format!("{} Pages", self.page_count)
                } else {
                    "No PDF loaded".to_owned()
                };
                ui.label(pages_text);

                if self.session.document().is_some() {
                    ui.label(
                        egui::RichText::new("JSON Linked")
                            .small()
                            .color(egui::Color32::from_rgb(0x15, 0x80, 0x3d)),
                    );
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.add_space(8.0);
                    if ui.button("⛶").on_hover_text("Reset Zoom").clicked() {
                        self.apply_zoom(|s| s.reset_zoom());
                    }
                    ui.separator();
                    if ui.button("+").on_hover_text("Zoom In").clicked() {
                        self.apply_zoom(|s| s.zoom_in());
                    }
                    ui.label(format!("{}%", self.zoom_percent()));
                    if ui.button("−").on_hover_text("Zoom Out").clicked() {
                        self.apply_zoom(|s| s.zoom_out());
                    }
                });
            });
        });
    }

    fn draw_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.heading("Layout Inspector");
                ui.weak("Layout analysis audit tool");
                ui.separator();

                ui.strong("Input Files");
                ui.add_space(4.0);
                if ui.button("📂 1. Open PDF document…").clicked() {
                    self.open_pdf_dialog();
                }
                ui.weak(file_label(&self.pdf_path));
                ui.add_space(4.0);
                if ui.button("📄 2. Open analysis JSON…").clicked() {
                    self.open_json_dialog(ctx);
                }
                ui.weak(file_label(&self.json_path));

                if let Some(doc) = self.session.document() {
                    let backend = doc.backend.clone();
                    let version = doc.version_name.clone();
                    if backend.is_some() || version.is_some() {
                        ui.weak(format!(
                            "backend: {} {}",
                            backend.unwrap_or_else(|| "unknown".to_owned()),
                            version.unwrap_or_default()
                        ));
                    }
                }

                ui.separator();
                self.draw_layer_controls(ui);
                ui.separator();

                ui.strong("Inspector");
                ui.add_space(4.0);
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.draw_inspector_body(ui);
                    });
            });
    }

    fn draw_layer_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.strong("Layers");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if self.session.all_categories_visible() {
                    "Hide All"
                } else {
                    "Show All"
                };
                if ui.small_button(label).clicked() {
                    self.session.toggle_all();
                }
            });
        });
        ui.add_space(4.0);

        for pair in KNOWN_CATEGORIES.chunks(2) {
            ui.horizontal(|ui| {
                for &key in pair {
                    self.layer_toggle(ui, key);
                }
            });
        }
    }

    fn layer_toggle(&mut self, ui: &mut egui::Ui, key: &str) {
        let style = resolve(key);
        let visible = self.session.is_category_visible(key);

        let dot = egui::RichText::new("●").color(color32(style.outline));
        let name = key.replace('_', " ");
        let name = if visible {
            egui::RichText::new(name)
        } else {
            egui::RichText::new(name).weak()
        };

        ui.scope(|ui| {
            ui.spacing_mut().item_spacing.x = 4.0;
            let response = ui.selectable_label(visible, dot);
            let clicked = response.clicked() | ui.selectable_label(visible, name).clicked();
            if clicked {
                self.session.toggle_category(key);
            }
        });
    }

    fn draw_inspector_body(&self, ui: &mut egui::Ui) {
        let Some(block) = self.session.selected_block() else {
            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                ui.weak("Select a block on the PDF");
                ui.weak("to inspect details");
            });
            return;
        };

        let style = resolve(&block.block_type);
        ui.label(
            egui::RichText::new(&block.block_type)
                .strong()
                .color(color32(style.text))
                .background_color(color32(style.fill)),
        );
        ui.add_space(4.0);

        if let Some(bbox) = block.bbox {
            egui::Grid::new("bbox_grid").num_columns(2).show(ui, |ui| {
                ui.monospace(format!("x: {:.0}", bbox.x_min()));
                ui.monospace(format!("y: {:.0}", bbox.y_min()));
                ui.end_row();
                ui.monospace(format!("w: {:.0}", bbox.width()));
                ui.monospace(format!("h: {:.0}", bbox.height()));
                ui.end_row();
            });
        } else {
            ui.weak("no bounding box");
        }

        let text = block.text();
        if !text.is_empty() {
            ui.add_space(8.0);
            ui.strong("Content");
            ui.label(egui::RichText::new(text).small());
        }

        if let Some(html) = block.extra.get("html").and_then(Value::as_str) {
            ui.add_space(8.0);
            ui.strong("HTML Preview");
            ui.label(egui::RichText::new(html).small().monospace());
        }

        ui.add_space(8.0);
        ui.separator();
        ui.weak("Raw Data");
        ui.label(
            egui::RichText::new(raw_block_json(block))
                .small()
                .monospace(),
        );
    }

    fn draw_viewport(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.pdf.is_none() {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.4);
                    ui.heading("Ready to Visualize");
                    ui.weak(
                        "Open a PDF document and its analysis JSON \
                         to start auditing the layout detection.",
                    );
                });
                return;
            }

            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        for page in 0..self.page_count {
                            self.show_page(ctx, ui, page);
                            ui.add_space(PAGE_SPACING);
                        }
                    });
                });
        });
    }

    /// Paint one page: the rasterized texture, then its overlay regions in
    /// stacking order, then hover labels; route clicks to selection.
    fn show_page(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, page: usize) {
        let Some(key) = self.ensure_page_texture(ctx, page) else {
            return;
        };
        let Some(texture) = self.textures.get(&key) else {
            return;
        };
        let state = self.page_states[page];
        let Some(dims) = state.dims() else {
            return;
        };

        let scale = self.session.scale();
        let size = egui::vec2(dims.width * scale, dims.height * scale);
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
        let painter = ui.painter();

        painter.image(
            texture.id(),
            rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        // Selection change is applied after the region borrow ends.
        let mut clicked: Option<Option<BlockId>> = None;

        if let Some(page_info) = self
            .session
            .document()
            .and_then(|doc| doc.page_by_index(page))
        {
            let regions = compose_page(
                page_info,
                state,
                scale,
                self.session.visible(),
                self.session.selected(),
            );

            for region in &regions {
                let region_rect = egui::Rect::from_min_size(
                    rect.min + egui::vec2(region.rect.x, region.rect.y),
                    egui::vec2(region.rect.width, region.rect.height),
                );
                let stroke_width = if region.selected { 2.0 } else { 1.0 };

                painter.rect_filled(region_rect, 0.0, color32(region.style.fill));
                painter.rect_stroke(
                    region_rect,
                    0.0,
                    egui::Stroke::new(stroke_width, color32(region.style.outline)),
                    egui::StrokeKind::Inside,
                );
            }

            let hovered = response
                .hover_pos()
                .map(|pos| pos - rect.min)
                .and_then(|rel| hit_test(&regions, rel.x, rel.y));

            // Label the hovered region and the selected one.
            for region in &regions {
                let is_hovered = hovered.is_some_and(|hit| hit.id() == region.id());
                if !is_hovered && !region.selected {
                    continue;
                }

                let anchor = rect.min + egui::vec2(region.rect.x, region.rect.y);
                painter.text(
                    anchor,
                    egui::Align2::LEFT_BOTTOM,
                    region.label(),
                    egui::FontId::proportional(10.0),
                    color32(region.style.text),
                );
                if let Some(ordinal) = region.ordinal {
                    painter.text(
                        anchor + egui::vec2(region.rect.width, 0.0),
                        egui::Align2::RIGHT_TOP,
                        format!("#{}", ordinal),
                        egui::FontId::proportional(8.0),
                        egui::Color32::GRAY,
                    );
                }
            }

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let rel = pos - rect.min;
                    // Topmost region wins; a miss is a background click,
                    // which clears the selection.
                    clicked = Some(hit_test(&regions, rel.x, rel.y).map(|hit| hit.id()));
                }
            }
        }

        if let Some(selection) = clicked {
            self.session.select_block(selection);
        }
    }

    fn draw_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error_dialog.clone() else {
            return;
        };

        let mut should_close = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&message);
                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.button("OK").clicked() {
                        should_close = true;
                    }
                });
            });

        if should_close {
            self.error_dialog = None;
        }
    }
}

/// Selected block as pretty-printed JSON for the raw-data panel, with the
/// (potentially huge) line array elided.
fn raw_block_json(block: &Block) -> String {
    let mut value = serde_json::to_value(block).unwrap_or(Value::Null);
    if let Value::Object(map) = &mut value {
        if map.contains_key("lines") {
            map.insert("lines".to_owned(), Value::String("[...]".to_owned()));
        }
    }
    serde_json::to_string_pretty(&value).unwrap_or_default()
}
