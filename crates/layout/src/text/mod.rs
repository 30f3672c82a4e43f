//! Deterministic text measurement.
//!
//! Widths come from Helvetica advance widths (1/1000 em), which is also the
//! face the PDF text layer is drawn in, so measured lines match printed ones.

mod wrapper;

pub use wrapper::wrap_lines;

use crate::config::LayoutConfig;

/// Helvetica-Bold runs roughly this much wider than the regular face.
const BOLD_WIDTH_FACTOR: f32 = 1.06;

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    line_height: f32,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

impl TextMetrics {
    pub fn new(config: &LayoutConfig) -> Self {
        Self { line_height: config.line_height }
    }

    /// Height of one line box at `size`.
    pub fn line_height(&self, size: f32) -> f32 {
        size * self.line_height
    }

    /// Distance from the top of a line box to the baseline.
    pub fn baseline_offset(&self, size: f32) -> f32 {
        let half_leading = (self.line_height(size) - size) / 2.0;
        half_leading + size * 0.8
    }

    pub fn char_width(&self, ch: char, size: f32, bold: bool) -> f32 {
        let units = advance_units(ch) as f32;
        let factor = if bold { BOLD_WIDTH_FACTOR } else { 1.0 };
        units / 1000.0 * size * factor
    }

    pub fn text_width(&self, text: &str, size: f32, bold: bool, tracking: f32) -> f32 {
        text.chars()
            .map(|c| self.char_width(c, size, bold) + tracking)
            .sum()
    }

    /// Height of `text` wrapped to `max_width`.
    pub fn block_height(&self, text: &str, size: f32, bold: bool, tracking: f32, max_width: f32) -> f32 {
        let lines = wrap_lines(self, text, size, bold, tracking, max_width);
        lines.len().max(1) as f32 * self.line_height(size)
    }
}

fn advance_units(ch: char) -> u16 {
    match ch {
        ' ' => 278,
        'i' | 'j' | 'l' => 222,
        'f' | 't' | 'I' | '!' | '\'' | ',' | '.' | ':' | ';' | '/' | '\\' | '[' | ']' => 278,
        'r' | '(' | ')' | '-' | '`' => 333,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' | '"' => 500,
        'm' => 833,
        'w' => 722,
        'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' | '0'..='9' | '$' | '_' | '#' => 556,
        'M' => 833,
        'W' => 944,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' => 722,
        'G' | 'O' | 'Q' => 778,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' | '&' => 667,
        'F' | 'T' | 'Z' => 611,
        'L' => 556,
        '%' => 889,
        '@' => 1015,
        '+' | '=' | '<' | '>' | '~' | '^' => 584,
        '*' => 389,
        '|' => 260,
        _ => 556,
    }
}
