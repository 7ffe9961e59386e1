mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{AppCommand, AppError, AppModel, HomePayload};
use crate::cli::CliInvocation;
use crate::domain::{SessionDetail, SessionSource, SearchResult, UsageDetail, UsageSummary};
use crate::infra::{
    DEFAULT_SERVER, SessionStore, load_preferences, resolve_state_dir, save_preferences,
};
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::path::Path;
use std::sync::mpsc::{Sender, channel};
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Cli(#[from] crate::cli::CliRunError),
}

/// Responses from store worker threads, tagged with the request sequence
/// issued by the model.
#[derive(Debug)]
enum StoreSignal {
    HomeLoaded {
        seq: u64,
        result: Result<HomePayload, String>,
    },
    SearchLoaded {
        seq: u64,
        query: String,
        result: Result<Vec<SearchResult>, String>,
    },
    DetailLoaded {
        seq: u64,
        result: Result<SessionDetail, String>,
    },
    UsageSummaryLoaded {
        seq: u64,
        source: SessionSource,
        result: Result<UsageSummary, String>,
    },
    UsageDetailLoaded {
        seq: u64,
        result: Result<UsageDetail, String>,
    },
    ContextLoaded {
        seq: u64,
        result: Result<String, String>,
    },
}

fn main() {
    if let Err(error) = run_main() {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Tui { server, source } => Ok(run_tui(server, source)?),
        CliInvocation::Command { server, command } => {
            let store = SessionStore::new(&resolve_server(server));
            crate::cli::run(command, &store)?;
            Ok(())
        }
    }
}

fn print_help() {
    let text = format!(
        "{name} — browse recorded AI-assistant sessions from a session store\n\
         \n\
         USAGE:\n\
         \x20 {name} [--server URL] [--source NAME]        Start the TUI\n\
         \x20 {name} projects                              List projects\n\
         \x20 {name} sessions [project-path]               List sessions\n\
         \x20 {name} search <query>                        Search session content\n\
         \x20 {name} usage [--days N]                      Token usage summary\n\
         \x20 {name} context <session-id>                  Print compacted context\n\
         \x20 {name} --help | --version\n\
         \n\
         FLAGS:\n\
         \x20 --server URL   Session store base URL (default: {server}; env: CCVIEW_SERVER)\n\
         \x20 --source NAME  Source tag: claude|codex|gemini (default: claude)\n\
         \x20 --limit N      Max rows to print (sessions/search)\n\
         \x20 --offset N     Skip first N rows (sessions)\n\
         \x20 --days N       Day window for usage detail (default: 30)\n\
         \n\
         OUTPUT:\n\
         \x20 projects: name<TAB>path<TAB>session_count\n\
         \x20 sessions: updated_at<TAB>session_id<TAB>message_count<TAB>title\n\
         \x20 search:   timestamp<TAB>session_id<TAB>message_type<TAB>matched_content\n",
        name = env!("CARGO_PKG_NAME"),
        server = DEFAULT_SERVER,
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

fn resolve_server(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("CCVIEW_SERVER").ok())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string())
}

fn run_tui(server: Option<String>, source: Option<SessionSource>) -> Result<(), AppError> {
    let state_dir = resolve_state_dir()?;
    let mut prefs = load_preferences(&state_dir);
    if let Some(source) = source {
        prefs.source = source;
    }

    let store = SessionStore::new(&resolve_server(server));
    let mut model = AppModel::new(prefs);

    let (signal_tx, signal_rx) = channel::<StoreSignal>();
    let initial = model.initial_commands(SystemTime::now());
    let _ = execute_commands(initial, &store, &signal_tx, &mut model, &state_dir);

    let mut terminal = setup_terminal()?;
    let result = run_loop(
        &mut terminal,
        &mut model,
        &store,
        &signal_tx,
        &signal_rx,
        &state_dir,
    );
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), AppError> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut AppModel,
    store: &SessionStore,
    signal_tx: &Sender<StoreSignal>,
    signal_rx: &std::sync::mpsc::Receiver<StoreSignal>,
    state_dir: &Path,
) -> Result<(), AppError> {
    loop {
        while let Ok(signal) = signal_rx.try_recv() {
            apply_signal(model, signal);
        }
        model.tick(Instant::now());

        terminal.draw(|frame| ui::render(frame, model))?;

        if !event::poll(Duration::from_millis(120))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let today = OffsetDateTime::now_utc().date();
                let commands = model.handle_key(key, today, SystemTime::now());
                if execute_commands(commands, store, signal_tx, model, state_dir) {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
}

fn apply_signal(model: &mut AppModel, signal: StoreSignal) {
    let today = OffsetDateTime::now_utc().date();
    match signal {
        StoreSignal::HomeLoaded { seq, result } => model.apply_home_loaded(seq, result, today),
        StoreSignal::SearchLoaded { seq, query, result } => {
            model.apply_search_loaded(seq, query, result)
        }
        StoreSignal::DetailLoaded { seq, result } => model.apply_detail_loaded(seq, result),
        StoreSignal::UsageSummaryLoaded {
            seq,
            source,
            result,
        } => model.apply_usage_summary_loaded(seq, source, result, SystemTime::now()),
        StoreSignal::UsageDetailLoaded { seq, result } => {
            model.apply_usage_detail_loaded(seq, result)
        }
        StoreSignal::ContextLoaded { seq, result } => {
            // Clipboard writes happen on the main thread; a fetch or copy
            // failure becomes the same inline indicator.
            let copied = result.and_then(|context| {
                crate::infra::copy_text(&context).map_err(|error| error.to_string())
            });
            model.apply_context_copied(seq, copied, Instant::now());
        }
    }
}

/// Executes model commands: fetches run on short-lived worker threads that
/// report back over the signal channel. Returns true when the app should
/// quit.
fn execute_commands(
    commands: Vec<AppCommand>,
    store: &SessionStore,
    signal_tx: &Sender<StoreSignal>,
    model: &mut AppModel,
    state_dir: &Path,
) -> bool {
    for command in commands {
        match command {
            AppCommand::Quit => return true,
            AppCommand::SavePreferences => {
                if let Err(error) = save_preferences(state_dir, model.prefs) {
                    model.set_transient_notice(error.to_string(), Instant::now());
                }
            }
            AppCommand::CopyMessage { uuid, text } => {
                let result =
                    crate::infra::copy_text(&text).map_err(|error| error.to_string());
                model.apply_message_copied(uuid, result, Instant::now());
            }
            AppCommand::FetchHome {
                seq,
                project,
                source,
            } => {
                let store = store.clone();
                let tx = signal_tx.clone();
                thread::spawn(move || {
                    let result = store
                        .list_sessions(project.as_deref(), source)
                        .and_then(|sessions| {
                            let projects = store.projects(source)?;
                            Ok(HomePayload { sessions, projects })
                        })
                        .map_err(|error| error.to_string());
                    let _ = tx.send(StoreSignal::HomeLoaded { seq, result });
                });
            }
            AppCommand::FetchSearch { seq, query, source } => {
                let store = store.clone();
                let tx = signal_tx.clone();
                thread::spawn(move || {
                    let result = store
                        .search(&query, source)
                        .map_err(|error| error.to_string());
                    let _ = tx.send(StoreSignal::SearchLoaded { seq, query, result });
                });
            }
            AppCommand::FetchSessionDetail { seq, id, source } => {
                let store = store.clone();
                let tx = signal_tx.clone();
                thread::spawn(move || {
                    let result = store
                        .session_detail(&id, source)
                        .map_err(|error| error.to_string());
                    let _ = tx.send(StoreSignal::DetailLoaded { seq, result });
                });
            }
            AppCommand::FetchUsageSummary { seq, source } => {
                let store = store.clone();
                let tx = signal_tx.clone();
                thread::spawn(move || {
                    let result = store
                        .usage_summary(source)
                        .map_err(|error| error.to_string());
                    let _ = tx.send(StoreSignal::UsageSummaryLoaded {
                        seq,
                        source,
                        result,
                    });
                });
            }
            AppCommand::FetchUsageDetail { seq, days, source } => {
                let store = store.clone();
                let tx = signal_tx.clone();
                thread::spawn(move || {
                    let result = store
                        .usage_detail(days, source)
                        .map_err(|error| error.to_string());
                    let _ = tx.send(StoreSignal::UsageDetailLoaded { seq, result });
                });
            }
            AppCommand::FetchContext { seq, session_id } => {
                let store = store.clone();
                let tx = signal_tx.clone();
                thread::spawn(move || {
                    let result = store
                        .session_context(&session_id)
                        .map_err(|error| error.to_string());
                    let _ = tx.send(StoreSignal::ContextLoaded { seq, result });
                });
            }
        }
    }
    false
}
