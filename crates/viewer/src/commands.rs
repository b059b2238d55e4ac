use anyhow::Context;
use chrono::NaiveDate;
use futuna_core::view::filter::Tab;

pub const HELP: &str = "\
commands:
  date YYYY-MM-DD   select an analysis date
  tab NAME          show one strategy (or All)
  search TEXT       filter tickers (empty clears)
  dates             list available dates
  show              redraw
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Date(NaiveDate),
    Tab(Tab),
    Search(String),
    Dates,
    Show,
    Help,
    Quit,
}

/// Parse one interactive input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> anyhow::Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "date" => {
            let date = NaiveDate::parse_from_str(rest, "%Y-%m-%d")
                .with_context(|| format!("invalid date {rest:?}, expected YYYY-MM-DD"))?;
            Command::Date(date)
        }
        "tab" => {
            anyhow::ensure!(!rest.is_empty(), "tab requires a name");
            Command::Tab(Tab::from_name(rest))
        }
        "search" => Command::Search(rest.to_string()),
        "dates" => Command::Dates,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => anyhow::bail!("unknown command {other:?}; type help"),
    };
    Ok(Some(cmd))
}
