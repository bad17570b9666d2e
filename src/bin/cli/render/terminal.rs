use studycards_lib::flashcards::Phase;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap text in a color when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Shorten text to `width` characters, ending in "..." when cut
pub fn truncate(text: &str, width: usize) -> String {
    let text = text.replace('\n', " ");
    if text.chars().count() <= width {
        return text;
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Display width for a column: the longest value, bounded
pub fn column_width<'a, I>(values: I, min: usize, max: usize) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(min)
        .clamp(min, max)
}

/// Horizontal rule for table headers
pub fn rule(width: usize) -> String {
    "\u{2500}".repeat(width)
}

/// Colored label for a learning phase
pub fn phase_label(phase: Option<Phase>, use_color: bool) -> String {
    match phase {
        Some(Phase::New) => paint("new", Color::BLUE, use_color),
        Some(Phase::Learning) => paint("learning", Color::YELLOW, use_color),
        Some(Phase::Review) => paint("review", Color::GREEN, use_color),
        None => paint("invalid", Color::RED, use_color),
    }
}
