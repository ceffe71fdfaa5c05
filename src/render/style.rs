use once_cell::sync::OnceCell;
use plotters::style::RGBColor;

/// Process-wide font presets, in pixels at 100 dpi.
#[derive(Clone, Copy, Debug)]
pub struct FontSizes {
    pub small: u32,  // tick labels, legends
    pub medium: u32, // axis labels, captions
    pub large: u32,  // figure titles
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            small: 13,
            medium: 15,
            large: 18,
        }
    }
}

static FONT_SIZES: OnceCell<FontSizes> = OnceCell::new();

/// Install the font presets once at startup. Later calls are ignored.
pub fn set_fontsizes(sizes: FontSizes) {
    let _ = FONT_SIZES.set(sizes);
}

pub fn fontsizes() -> FontSizes {
    FONT_SIZES.get().copied().unwrap_or_default()
}

/// Scale a 100 dpi font size to the figure dpi.
pub fn scaled(size: u32, dpi: u32) -> u32 {
    ((size * dpi) as f32 / 100.0).round().max(1.0) as u32
}

/// Series cycle applied per axes; a lone trace always takes the first entry.
pub const SERIES_CYCLE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

/// Arrival-time overlay colors: direct wave, then first and second
/// reflections.
pub const DIRECT_WAVE: RGBColor = RGBColor(0xED, 0x21, 0x7C);
pub const FIRST_REFLECTIONS: RGBColor = RGBColor(0xDF, 0xA0, 0x6E);
pub const SECOND_REFLECTIONS: RGBColor = RGBColor(0x1B, 0x99, 0x8B);
