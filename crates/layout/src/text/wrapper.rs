use super::TextMetrics;

/// Greedy line breaking on whitespace.
///
/// Explicit newlines start a new line (pre-wrap), words wider than the
/// line are broken between characters. Always returns at least one line.
pub fn wrap_lines(
    metrics: &TextMetrics,
    text: &str,
    size: f32,
    bold: bool,
    tracking: f32,
    max_width: f32,
) -> Vec<String> {
    let width_of = |s: &str| metrics.text_width(s, size, bold, tracking);
    let space = width_of(" ");
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0f32;

        for word in paragraph.split_whitespace() {
            let word_width = width_of(word);

            if word_width > max_width {
                // Flush, then hard-break the word across lines.
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                for ch in word.chars() {
                    let w = metrics.char_width(ch, size, bold) + tracking;
                    if current_width + w > max_width && !current.is_empty() {
                        lines.push(std::mem::take(&mut current));
                        current_width = 0.0;
                    }
                    current.push(ch);
                    current_width += w;
                }
                continue;
            }

            let needed = if current.is_empty() { word_width } else { current_width + space + word_width };
            if needed > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_width = word_width;
            } else {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
                current_width = needed;
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
