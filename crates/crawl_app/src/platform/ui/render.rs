use std::fmt::Write;
use std::time::Duration;

use crawl_core::{format_duration, AppViewModel, BadgeStyle, TableBody};

const BAR_WIDTH: usize = 20;

/// Renders the whole view as terminal text.
pub fn render(view: &AppViewModel, elapsed: Option<Duration>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "==================== crawl ====================");
    let _ = writeln!(
        out,
        "keywords: {} | pages: {} | save: {}",
        display_or_dash(&view.keywords_input),
        display_or_dash(&view.max_pages_input),
        if view.persist { "on" } else { "off" }
    );
    let _ = writeln!(
        out,
        "[start] {}  [cancel] {}",
        enabled_label(view.submit_enabled),
        enabled_label(view.cancel_enabled)
    );
    if let Some(label) = &view.current_task_label {
        let _ = writeln!(out, "{label}");
    }

    let _ = write!(
        out,
        "{} {:>4}  {}",
        progress_bar(view.progress),
        view.progress_label,
        badge(&view.badge.label, view.badge.style)
    );
    if let Some(elapsed) = elapsed {
        let _ = write!(out, "  elapsed {}", format_duration(elapsed.as_secs_f64()));
    }
    out.push('\n');

    let _ = writeln!(out, "--- logs ---");
    let _ = writeln!(out, "{}", view.log_text);

    let _ = writeln!(out, "--- {} ---", view.results.count_label);
    match &view.results.body {
        TableBody::Placeholder(text) => {
            let _ = writeln!(out, "{text}");
        }
        TableBody::Rows(rows) => {
            for (index, row) in rows.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:>3}. [{}] {} | {} | views {} | favs {} | {} | {} | {}",
                    index + 1,
                    row.link.label,
                    row.title,
                    row.up_name,
                    row.views,
                    row.favorites,
                    row.tags,
                    row.subject,
                    row.link.href
                );
            }
        }
    }

    if let Some(url) = &view.opened_url {
        let _ = writeln!(out, "opened: {url}");
    }
    out
}

fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn badge(label: &str, style: BadgeStyle) -> String {
    match style {
        BadgeStyle::Active => format!("<{}>", label.to_uppercase()),
        BadgeStyle::Muted => format!("({label})"),
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}

fn display_or_dash(text: &str) -> &str {
    if text.trim().is_empty() {
        "-"
    } else {
        text
    }
}
