use lingocards_lib::{ProgressSummary, WordPair, WordView};

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const DIM: &'static str = "\x1b[2m";
    pub const RED: &'static str = "\x1b[31m";
    pub const GREEN: &'static str = "\x1b[32m";
    pub const YELLOW: &'static str = "\x1b[33m";
}

fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

const BAR_WIDTH: usize = 30;

/// Front of the card: the English word and where it comes from
pub fn render_card_front(word: &WordView, use_color: bool) -> String {
    let mut out = String::new();
    if word.deck_reset {
        out.push_str(&paint(
            "You learned the whole deck! Starting over.\n",
            Color::YELLOW,
            use_color,
        ));
    }
    out.push_str(&paint(&word.english, Color::BOLD, use_color));
    out.push_str(&paint(
        &format!("  ({} level {})", word.language, word.level),
        Color::DIM,
        use_color,
    ));
    out
}

/// Back of the card
pub fn render_card_back(word: &WordView, use_color: bool) -> String {
    format!("  → {}", paint(&word.translation, Color::GREEN, use_color))
}

pub fn render_summary(summary: &ProgressSummary, use_color: bool) -> String {
    let filled = (summary.known_percent / 100.0 * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let bar = format!(
        "[{}{}]",
        paint(&"#".repeat(filled), Color::GREEN, use_color),
        "-".repeat(BAR_WIDTH - filled)
    );

    format!(
        "{}\n{} {:.0}% known\nKnown:   {}\nUnknown: {}\nTotal:   {}",
        paint("Progress", Color::BOLD, use_color),
        bar,
        summary.known_percent,
        paint(&summary.known.to_string(), Color::GREEN, use_color),
        paint(&summary.unknown.to_string(), Color::RED, use_color),
        summary.total,
    )
}

pub fn render_word_pairs(title: &str, pairs: &[WordPair], color: &str, use_color: bool) -> String {
    let mut lines = vec![paint(title, color, use_color)];
    if pairs.is_empty() {
        lines.push("  (none)".to_string());
    }
    for pair in pairs {
        lines.push(format!("  {} - {}", pair.english, pair.translation));
    }
    lines.join("\n")
}
