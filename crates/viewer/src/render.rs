use futuna_core::domain::analysis::RecommendationTone;
use futuna_core::view::filter::{ColumnField, DisplayRow, Tab, View};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const ORANGE: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

pub struct Frame<'a> {
    pub date: Option<chrono::NaiveDate>,
    pub tabs: &'a [Tab],
    pub active: &'a Tab,
    pub search: &'a str,
    pub notice: Option<&'a str>,
    pub view: &'a View,
    pub sources: &'a [String],
}

pub fn render(frame: &Frame<'_>, color: bool) -> String {
    let mut out = String::new();

    let date = frame
        .date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!("Date: {date}"));
    if !frame.search.is_empty() {
        out.push_str(&format!("    Search Ticker: {}", frame.search));
    }
    out.push('\n');

    let tabs: Vec<String> = frame
        .tabs
        .iter()
        .map(|tab| {
            if tab == frame.active {
                format!("[{tab}]")
            } else {
                tab.to_string()
            }
        })
        .collect();
    out.push_str(&tabs.join("  "));
    out.push('\n');

    if let Some(notice) = frame.notice {
        out.push_str(&format!("! {notice}\n"));
    }
    out.push('\n');

    render_table(&mut out, frame.view, color);

    if !frame.sources.is_empty() {
        out.push_str("\nSources:\n");
        for source in frame.sources {
            out.push_str(&format!("  - {source}\n"));
        }
    }

    out
}

fn render_table(out: &mut String, view: &View, color: bool) {
    let cells: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| view.columns.iter().map(|c| cell_text(row, c.field)).collect())
        .collect();

    let widths: Vec<usize> = view
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.title.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = view
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c.title, w = *w))
        .collect();
    out.push_str(header.join(" | ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    if view.rows.is_empty() {
        out.push_str("(no rows)\n");
        return;
    }

    for (row, texts) in view.rows.iter().zip(&cells) {
        let line: Vec<String> = view
            .columns
            .iter()
            .zip(texts)
            .zip(&widths)
            .map(|((c, text), w)| {
                let padded = format!("{text:<w$}", w = *w);
                match (color, row.tone(c.field)) {
                    (true, Some(tone)) => format!("{}{padded}{RESET}", tone_color(tone)),
                    _ => padded,
                }
            })
            .collect();
        out.push_str(line.join(" | ").trim_end());
        out.push('\n');
    }
}

fn cell_text(row: &DisplayRow, field: ColumnField) -> String {
    let value = row.cell(field);
    match row.confidence(field) {
        Some(conf) if !value.is_empty() => format!("{value} ({conf}%)"),
        Some(conf) => format!("({conf}%)"),
        None => value.to_string(),
    }
}

fn tone_color(tone: RecommendationTone) -> &'static str {
    match tone {
        RecommendationTone::Positive => GREEN,
        RecommendationTone::Negative => RED,
        RecommendationTone::Neutral => ORANGE,
    }
}
