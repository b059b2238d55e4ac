use anyhow::Context;
use clap::Parser;
use futuna_core::ingest::provider::{load_batch, load_dates, AnalysisSource, HttpAnalysisSource};
use futuna_core::session::ViewSession;
use futuna_core::time::date_set::local_today;
use futuna_core::view::filter::{Tab, ALL_TAB};
use std::io::{BufRead, IsTerminal, Write};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

use commands::{parse_command, Command, HELP};

#[derive(Debug, Parser)]
#[command(name = "futuna_viewer")]
struct Args {
    /// Analysis date (YYYY-MM-DD). Defaults to the most recent available date.
    #[arg(long)]
    date: Option<String>,

    /// Tab to show: "All" or a strategy name.
    #[arg(long, default_value = ALL_TAB)]
    tab: String,

    /// Case-insensitive ticker filter.
    #[arg(long, default_value = "")]
    search: String,

    /// Print the available dates and exit.
    #[arg(long)]
    list_dates: bool,

    /// Print the view as JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Read commands from stdin after the first render.
    #[arg(long)]
    interactive: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = futuna_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let source = HttpAnalysisSource::from_settings(&settings)?;
    let mut session = ViewSession::new();

    let dates = load_dates(&source).await;
    if args.list_dates {
        for date in &dates {
            println!("{date}");
        }
        return Ok(());
    }
    session.set_available_dates(&dates, local_today());

    if let Some(s) = args.date.as_deref() {
        let candidate = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid --date {s:?}, expected YYYY-MM-DD"))?;
        if let Err(rejected) = session.request_date(candidate, chrono::Utc::now()) {
            tracing::warn!(error = %rejected, kept = ?rejected.kept, "date request rejected");
        }
    }
    session.select_tab(Tab::from_name(&args.tab));
    session.set_search(args.search.clone());

    refresh(&source, &mut session).await;
    draw(&mut session, args.json)?;

    if args.interactive {
        if let Err(err) = run_interactive(&source, &mut session, args.json).await {
            sentry_anyhow::capture_anyhow(&err);
            return Err(err);
        }
    }

    Ok(())
}

async fn refresh(source: &dyn AnalysisSource, session: &mut ViewSession) {
    let ticket = session.begin_fetch();
    let raw = load_batch(source, ticket.date).await;
    if session.apply_batch(ticket, &raw) {
        tracing::info!(
            date = ?ticket.date,
            rows = session.rows().len(),
            strategies = session.strategies().len(),
            "analysis batch applied"
        );
    }
}

fn draw(session: &mut ViewSession, json: bool) -> anyhow::Result<()> {
    let view = session.view();
    let mut stdout = std::io::stdout().lock();

    if json {
        serde_json::to_writer_pretty(&mut stdout, &view).context("failed to write view JSON")?;
        writeln!(stdout)?;
        return Ok(());
    }

    let notice = session.notice(chrono::Utc::now()).map(|n| n.message);
    let tabs = session.tabs();
    let frame = render::Frame {
        date: session.selected_date(),
        tabs: &tabs,
        active: session.active_tab(),
        search: session.search(),
        notice,
        view: &view,
        sources: session.sources(),
    };
    let color = stdout.is_terminal();
    write!(stdout, "{}", render::render(&frame, color))?;
    stdout.flush()?;
    Ok(())
}

async fn run_interactive(
    source: &dyn AnalysisSource,
    session: &mut ViewSession,
    json: bool,
) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    eprintln!("{HELP}");
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        let cmd = match parse_command(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("{err:#}");
                continue;
            }
        };

        match cmd {
            Command::Date(candidate) => {
                match session.request_date(candidate, chrono::Utc::now()) {
                    Ok(()) => refresh(source, session).await,
                    Err(rejected) => {
                        tracing::warn!(error = %rejected, "date request rejected");
                    }
                }
            }
            Command::Tab(tab) => {
                if tab != Tab::All && !session.strategies().iter().any(|s| s == tab.name()) {
                    eprintln!("no strategy named {:?} in this batch", tab.name());
                }
                session.select_tab(tab);
            }
            Command::Search(text) => session.set_search(text),
            Command::Dates => {
                for date in session.dates().available() {
                    println!("{date}");
                }
                continue;
            }
            Command::Show => {}
            Command::Help => {
                eprintln!("{HELP}");
                continue;
            }
            Command::Quit => break,
        }

        draw(session, json)?;
    }
    Ok(())
}

fn init_sentry(settings: &futuna_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
