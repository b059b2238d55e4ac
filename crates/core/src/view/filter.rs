use crate::domain::analysis::{AnalysisRow, RecommendationTone};
use serde::Serialize;
use std::fmt;

pub const ALL_TAB: &str = "All";

/// The tab currently selected: every row, or one strategy's rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    All,
    Strategy(String),
}

impl Tab {
    pub fn from_name(name: &str) -> Self {
        if name == ALL_TAB {
            Self::All
        } else {
            Self::Strategy(name.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::All => ALL_TAB,
            Self::Strategy(name) => name,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnField {
    Ticker,
    ShortTerm,
    ShortReason,
    LongTerm,
    LongReason,
    Overall,
    StrategyStance,
    StrategyNote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub title: &'static str,
    pub field: ColumnField,
}

const BASE_COLUMNS: [ColumnSpec; 6] = [
    ColumnSpec { title: "Ticker", field: ColumnField::Ticker },
    ColumnSpec { title: "Short Term", field: ColumnField::ShortTerm },
    ColumnSpec { title: "Short Details", field: ColumnField::ShortReason },
    ColumnSpec { title: "Long Term", field: ColumnField::LongTerm },
    ColumnSpec { title: "Long Term Details", field: ColumnField::LongReason },
    ColumnSpec { title: "Overall", field: ColumnField::Overall },
];

const STRATEGY_COLUMNS: [ColumnSpec; 2] = [
    ColumnSpec { title: "Stance", field: ColumnField::StrategyStance },
    ColumnSpec { title: "Note", field: ColumnField::StrategyNote },
];

/// A row as shown in the grid. The strategy fields are set only on strategy tabs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow {
    #[serde(flatten)]
    pub row: AnalysisRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_stance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_note: Option<String>,
}

impl DisplayRow {
    pub fn cell(&self, field: ColumnField) -> &str {
        match field {
            ColumnField::Ticker => &self.row.ticker,
            ColumnField::ShortTerm => &self.row.short_term.recommendation,
            ColumnField::ShortReason => &self.row.short_term.reason,
            ColumnField::LongTerm => &self.row.long_term.recommendation,
            ColumnField::LongReason => &self.row.long_term.reason,
            ColumnField::Overall => &self.row.overall.recommendation,
            ColumnField::StrategyStance => self.strategy_stance.as_deref().unwrap_or_default(),
            ColumnField::StrategyNote => self.strategy_note.as_deref().unwrap_or_default(),
        }
    }

    /// Confidence attached to a rated column, if the backend sent one.
    pub fn confidence(&self, field: ColumnField) -> Option<f64> {
        match field {
            ColumnField::ShortTerm => self.row.confidences.short,
            ColumnField::LongTerm => self.row.confidences.long,
            ColumnField::Overall => self.row.confidences.overall,
            _ => None,
        }
    }

    /// Tone of a rated column; `None` for unrated columns.
    pub fn tone(&self, field: ColumnField) -> Option<RecommendationTone> {
        match field {
            ColumnField::ShortTerm | ColumnField::LongTerm | ColumnField::Overall => {
                Some(RecommendationTone::of(self.cell(field)))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub rows: Vec<DisplayRow>,
    pub columns: Vec<ColumnSpec>,
}

pub fn columns_for(tab: &Tab) -> Vec<ColumnSpec> {
    let mut columns = BASE_COLUMNS.to_vec();
    if matches!(tab, Tab::Strategy(_)) {
        columns.extend_from_slice(&STRATEGY_COLUMNS);
    }
    columns
}

/// Derive the rows and columns to display for a tab and a ticker search.
///
/// The search is a case-insensitive substring match on the ticker. On a strategy tab, rows
/// without an opinion from that strategy are dropped. Row order is preserved.
pub fn compute_view(rows: &[AnalysisRow], tab: &Tab, search_text: &str) -> View {
    let needle = search_text.to_lowercase();
    let matching = rows
        .iter()
        .filter(|row| needle.is_empty() || row.ticker.to_lowercase().contains(&needle));

    let display_rows = match tab {
        Tab::All => matching
            .map(|row| DisplayRow {
                row: row.clone(),
                strategy_stance: None,
                strategy_note: None,
            })
            .collect(),
        Tab::Strategy(name) => matching
            .filter_map(|row| {
                let opinion = row.strategies.iter().find(|s| &s.name == name)?;
                Some(DisplayRow {
                    row: row.clone(),
                    strategy_stance: Some(opinion.stance.clone()),
                    strategy_note: Some(opinion.note.clone()),
                })
            })
            .collect(),
    };

    View {
        rows: display_rows,
        columns: columns_for(tab),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::normalize::normalize_batch;
    use crate::ingest::types::RawRecord;
    use serde_json::json;

    fn rows(v: serde_json::Value) -> Vec<AnalysisRow> {
        let raw: Vec<RawRecord> = serde_json::from_value(v).unwrap();
        normalize_batch(&raw)
    }

    fn tickers(view: &View) -> Vec<&str> {
        view.rows.iter().map(|r| r.row.ticker.as_str()).collect()
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let rows = rows(json!([{"ticker": "VCI"}, {"ticker": "FPT"}, {"ticker": "SVC"}]));
        assert_eq!(tickers(&compute_view(&rows, &Tab::All, "vci")), vec!["VCI"]);
        assert_eq!(tickers(&compute_view(&rows, &Tab::All, "vc")), vec!["VCI", "SVC"]);
        assert_eq!(tickers(&compute_view(&rows, &Tab::All, "P")), vec!["FPT"]);
        assert!(compute_view(&rows, &Tab::All, "xyz").rows.is_empty());
    }

    #[test]
    fn empty_search_keeps_all_rows_in_order() {
        let rows = rows(json!([{"ticker": "B"}, {"ticker": "A"}, {"ticker": "C"}]));
        let view = compute_view(&rows, &Tab::All, "");
        assert_eq!(tickers(&view), vec!["B", "A", "C"]);
        assert_eq!(view.columns.len(), 6);
        assert!(view.rows.iter().all(|r| r.strategy_stance.is_none()));
    }

    #[test]
    fn strategy_tab_drops_rows_without_opinion() {
        let rows = rows(json!([
            {"ticker": "A", "strategies": [{"name": "Momentum", "stance": "bullish", "note": "n1"}]},
            {"ticker": "B", "strategies": [{"name": "Value", "stance": "neutral", "note": "n2"}]},
            {"ticker": "C", "strategies": "[{\"name\":\"Momentum\",\"stance\":\"bearish\",\"note\":\"n3\"}]"},
        ]));
        let view = compute_view(&rows, &Tab::Strategy("Momentum".to_string()), "");
        assert_eq!(tickers(&view), vec!["A", "C"]);
        assert_eq!(view.rows[1].strategy_stance.as_deref(), Some("bearish"));
        assert_eq!(view.rows[1].cell(ColumnField::StrategyNote), "n3");

        let titles: Vec<_> = view.columns.iter().map(|c| c.title).collect();
        assert_eq!(
            titles,
            vec![
                "Ticker",
                "Short Term",
                "Short Details",
                "Long Term",
                "Long Term Details",
                "Overall",
                "Stance",
                "Note",
            ]
        );
    }

    #[test]
    fn unknown_strategy_yields_empty_view() {
        let rows = rows(json!([{"ticker": "A", "strategies": [{"name": "Value"}]}]));
        let view = compute_view(&rows, &Tab::Strategy("Growth".to_string()), "");
        assert!(view.rows.is_empty());
        assert_eq!(view.columns.len(), 8);
    }

    #[test]
    fn search_applies_before_projection() {
        let rows = rows(json!([
            {"ticker": "VCI", "strategies": [{"name": "Momentum", "stance": "bullish"}]},
            {"ticker": "FPT", "strategies": [{"name": "Momentum", "stance": "bearish"}]},
        ]));
        let view = compute_view(&rows, &Tab::Strategy("Momentum".to_string()), "fp");
        assert_eq!(tickers(&view), vec!["FPT"]);
    }

    #[test]
    fn end_to_end_momentum_tab() {
        let rows = rows(json!([{
            "ticker": "VCI",
            "short_term": "ACCUMULATE - strong fundamentals",
            "strategies": "[{\"name\":\"Momentum\",\"stance\":\"bullish\",\"note\":\"n\"}]",
        }]));
        let view = compute_view(&rows, &Tab::from_name("Momentum"), "");
        assert_eq!(view.rows.len(), 1);
        let row = &view.rows[0];
        assert_eq!(row.row.short_term.recommendation, "ACCUMULATE");
        assert_eq!(row.row.short_term.reason, "strong fundamentals");
        assert_eq!(row.strategy_stance.as_deref(), Some("bullish"));
        assert_eq!(row.strategy_note.as_deref(), Some("n"));
        assert_eq!(
            row.tone(ColumnField::ShortTerm),
            Some(RecommendationTone::Positive)
        );
        assert_eq!(row.tone(ColumnField::Ticker), None);
    }

    #[test]
    fn confidence_maps_to_rated_columns() {
        let rows = rows(json!([{"ticker": "A", "long_confidence": 70}]));
        let view = compute_view(&rows, &Tab::All, "");
        assert_eq!(view.rows[0].confidence(ColumnField::LongTerm), Some(70.0));
        assert_eq!(view.rows[0].confidence(ColumnField::ShortTerm), None);
        assert_eq!(view.rows[0].confidence(ColumnField::LongReason), None);
    }

    #[test]
    fn tab_names_round_trip() {
        assert_eq!(Tab::from_name("All"), Tab::All);
        assert_eq!(Tab::from_name("Value"), Tab::Strategy("Value".to_string()));
        assert_eq!(Tab::Strategy("Value".to_string()).to_string(), "Value");
    }
}
