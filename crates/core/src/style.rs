//! Block style resolution
//!
//! Maps a block's type string to a visual style descriptor and a short
//! human label. Resolution is a pure, total function: any input, however
//! malformed, resolves to a deterministic style.

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with a different alpha
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Derived visual style for a block type.
///
/// Never stored on blocks; recomputed on demand from the type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockStyle {
    /// Outline (border) color of the overlay region.
    pub outline: Color,
    /// Translucent interior fill.
    pub fill: Color,
    /// Color for the label text.
    pub text: Color,
    /// Short label shown on hover and in the inspector badge.
    pub label: &'static str,
}

/// Overlay fill alpha, roughly 10% opacity.
const FILL_ALPHA: u8 = 26;

const fn style(outline: Color, text: Color, label: &'static str) -> BlockStyle {
    BlockStyle {
        outline,
        fill: outline.with_alpha(FILL_ALPHA),
        text,
        label,
    }
}

const TITLE: BlockStyle = style(Color::rgb(0xef, 0x44, 0x44), Color::rgb(0xb9, 0x1c, 0x1c), "Title");
const TEXT: BlockStyle = style(Color::rgb(0x3b, 0x82, 0xf6), Color::rgb(0x1d, 0x4e, 0xd8), "Text");
const LIST: BlockStyle = style(Color::rgb(0xf9, 0x73, 0x16), Color::rgb(0xc2, 0x41, 0x0c), "List");
const TABLE: BlockStyle = style(Color::rgb(0x22, 0xc5, 0x5e), Color::rgb(0x15, 0x80, 0x3d), "Table");
const IMAGE: BlockStyle = style(Color::rgb(0xa8, 0x55, 0xf7), Color::rgb(0x7e, 0x22, 0xce), "Image");
const HEADER: BlockStyle =
    style(Color::rgb(0x9c, 0xa3, 0xaf), Color::rgb(0x4b, 0x55, 0x63), "Header");
const FOOTER: BlockStyle =
    style(Color::rgb(0x9c, 0xa3, 0xaf), Color::rgb(0x4b, 0x55, 0x63), "Footer");
const PAGE_NUMBER: BlockStyle =
    style(Color::rgb(0xec, 0x48, 0x99), Color::rgb(0xbe, 0x18, 0x5d), "Page Num");
const EQUATION: BlockStyle =
    style(Color::rgb(0x14, 0xb8, 0xa6), Color::rgb(0x0f, 0x76, 0x6e), "Equation");
const CAPTION: BlockStyle =
    style(Color::rgb(0x63, 0x66, 0xf1), Color::rgb(0x43, 0x38, 0xca), "Caption");
const UNKNOWN: BlockStyle =
    style(Color::rgb(0xea, 0xb3, 0x08), Color::rgb(0xa1, 0x62, 0x07), "Unknown");

/// Canonical top-level categories, in display order.
///
/// This is the closed vocabulary the visibility filter and the layer
/// toggle list operate on; raw type strings are an open vocabulary.
pub const KNOWN_CATEGORIES: [&str; 10] = [
    "title",
    "text",
    "list",
    "table",
    "image",
    "header",
    "footer",
    "page_number",
    "equation",
    "caption",
];

/// Resolve a block type string to its visual style.
///
/// Composite categories (`table*`, `image*`) keep the category's base
/// colors and refine only the label from the type suffix. Other types are
/// matched by substring in a fixed priority order (header, footer,
/// caption, page_number) before the exact-match table; a type string
/// containing several keywords resolves to the first-listed keyword's
/// style. That tie-break is fixed policy, relied on by tests.
pub fn resolve(block_type: &str) -> BlockStyle {
    let normalized = block_type.to_ascii_lowercase();

    if let Some(suffix) = normalized.strip_prefix("table") {
        return refine(TABLE, suffix, "Table", "Table Cap", "Table Body", "Table Note");
    }
    if let Some(suffix) = normalized.strip_prefix("image") {
        return refine(IMAGE, suffix, "Image", "Img Cap", "Img Body", "Img Note");
    }

    if normalized.contains("header") {
        return HEADER;
    }
    if normalized.contains("footer") {
        return FOOTER;
    }
    if normalized.contains("caption") {
        return CAPTION;
    }
    if normalized.contains("page_number") {
        return PAGE_NUMBER;
    }

    match normalized.as_str() {
        "title" => TITLE,
        "text" => TEXT,
        "list" => LIST,
        "table" => TABLE,
        "image" => IMAGE,
        "header" => HEADER,
        "footer" => FOOTER,
        "page_number" => PAGE_NUMBER,
        "equation" => EQUATION,
        "caption" => CAPTION,
        _ => UNKNOWN,
    }
}

fn refine(
    base: BlockStyle,
    suffix: &str,
    bare: &'static str,
    caption: &'static str,
    body: &'static str,
    footnote: &'static str,
) -> BlockStyle {
    let label = if suffix.contains("caption") {
        caption
    } else if suffix.contains("body") {
        body
    } else if suffix.contains("footnote") {
        footnote
    } else {
        bare
    };

    BlockStyle { label, ..base }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_resolve_to_their_own_labels() {
        assert_eq!(resolve("title").label, "Title");
        assert_eq!(resolve("text").label, "Text");
        assert_eq!(resolve("list").label, "List");
        assert_eq!(resolve("equation").label, "Equation");
        assert_eq!(resolve("page_number").label, "Page Num");
    }

    #[test]
    fn table_subtypes_keep_table_colors_and_refine_labels() {
        let base = resolve("table");
        assert_eq!(base.label, "Table");

        for (block_type, label) in [
            ("table_caption", "Table Cap"),
            ("table_body", "Table Body"),
            ("table_footnote", "Table Note"),
        ] {
            let resolved = resolve(block_type);
            assert_eq!(resolved.label, label);
            assert_eq!(resolved.outline, base.outline);
            assert_eq!(resolved.fill, base.fill);
        }
    }

    #[test]
    fn image_subtypes_keep_image_colors_and_refine_labels() {
        let base = resolve("image");

        assert_eq!(resolve("image_caption").label, "Img Cap");
        assert_eq!(resolve("image_body").label, "Img Body");
        assert_eq!(resolve("image_footnote").label, "Img Note");
        assert_eq!(resolve("image_caption").outline, base.outline);
    }

    #[test]
    fn unrecognized_types_fall_back_to_unknown() {
        assert_eq!(resolve("banana").label, "Unknown");
        assert_eq!(resolve("").label, "Unknown");
        assert_eq!(resolve("???").label, "Unknown");
    }

    #[test]
    fn resolution_is_case_insensitive() {
        assert_eq!(resolve("Title").label, "Title");
        assert_eq!(resolve("TABLE_FOOTNOTE").label, "Table Note");
    }

    #[test]
    fn substring_priority_is_fixed_policy() {
        // header wins over footer, footer over caption, caption over
        // page_number; multi-keyword types resolve to the first listed.
        assert_eq!(resolve("page_header"), HEADER);
        assert_eq!(resolve("footer_caption"), FOOTER);
        assert_eq!(resolve("caption_page_number"), CAPTION);
        assert_eq!(resolve("header_footer"), HEADER);
    }

    #[test]
    fn fill_is_translucent_outline() {
        let resolved = resolve("text");
        assert_eq!(resolved.fill.r, resolved.outline.r);
        assert_eq!(resolved.fill.a, 26);
        assert_eq!(resolved.outline.a, 255);
    }
}
