use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crawl_core::{update, AppState, ClientPhase, Effect, Msg};
use crawl_logging::{crawl_info, crawl_warn};

use super::config::ClientConfig;
use super::effects::EffectRunner;
use super::ui::input::{parse_command, Command, HELP};
use super::ui::render::render;
use crate::cli::Cli;

/// Everything the main loop reacts to.
#[derive(Debug)]
pub enum AppEvent {
    Msg(Msg),
    Help,
    Quit,
    Rejected(String),
    /// Stdin reached end of file.
    InputClosed,
}

pub fn run(cli: &Cli, config: &ClientConfig) -> anyhow::Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(config.engine_settings(), event_tx.clone())?;
    spawn_stdin_reader(event_tx)?;

    let mut app = App::new(runner);
    for msg in prefill(cli) {
        app.dispatch(msg);
    }
    app.print_view();
    if cli.start {
        app.dispatch(Msg::SubmitClicked);
    } else {
        println!("type `help` for commands");
    }

    let mut input_closed = false;
    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Msg(msg) => app.dispatch(msg),
            AppEvent::Help => println!("{HELP}"),
            AppEvent::Rejected(reason) => println!("{reason}"),
            AppEvent::Quit => break,
            AppEvent::InputClosed => {
                crawl_info!("stdin closed; exiting once the current task settles");
                input_closed = true;
            }
        }
        if input_closed && app.is_settled() {
            break;
        }
    }

    app.runner.shutdown();
    Ok(())
}

fn prefill(cli: &Cli) -> Vec<Msg> {
    let mut msgs = Vec::new();
    if let Some(keywords) = &cli.keywords {
        msgs.push(Msg::KeywordsChanged(keywords.clone()));
    }
    if let Some(pages) = &cli.pages {
        msgs.push(Msg::MaxPagesChanged(pages.clone()));
    }
    if cli.save {
        msgs.push(Msg::PersistToggled(true));
    }
    msgs
}

fn spawn_stdin_reader(event_tx: mpsc::Sender<AppEvent>) -> anyhow::Result<()> {
    // Not joined: the thread may sit in a blocking read when the app quits.
    thread::Builder::new()
        .name("crawl-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                let event = match parse_command(&line) {
                    Ok(Command::Msg(msg)) => AppEvent::Msg(msg),
                    Ok(Command::Help) => AppEvent::Help,
                    Ok(Command::Quit) => AppEvent::Quit,
                    Ok(Command::Blank) => continue,
                    Err(err) => AppEvent::Rejected(err.to_string()),
                };
                if event_tx.send(event).is_err() {
                    return;
                }
            }
            let _ = event_tx.send(AppEvent::InputClosed);
        })
        .context("failed to spawn the stdin reader")?;
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    started: Option<Instant>,
    finished: Option<Duration>,
    awaiting_results: bool,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            started: None,
            finished: None,
            awaiting_results: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        if matches!(msg, Msg::ResultsReceived { .. } | Msg::ResultsFailed { .. }) {
            self.awaiting_results = false;
        }
        let before = self.state.phase();
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        if self.state.phase() != before {
            log_transition(before, self.state.phase());
        }

        for effect in &effects {
            match effect {
                Effect::CreateTask { .. } => {
                    self.started = Some(Instant::now());
                    self.finished = None;
                    self.awaiting_results = false;
                }
                Effect::FetchResults { .. } => self.awaiting_results = true,
                _ => {}
            }
        }
        self.runner.enqueue(effects);

        if !self.state.phase().is_busy() && self.finished.is_none() {
            self.finished = self.started.map(|started| started.elapsed());
        }
        if self.state.consume_dirty() {
            self.print_view();
        }
    }

    fn elapsed(&self) -> Option<Duration> {
        self.finished
            .or_else(|| self.started.map(|started| started.elapsed()))
    }

    /// Nothing is outstanding that would still change the screen.
    fn is_settled(&self) -> bool {
        !self.state.phase().is_busy() && !self.awaiting_results
    }

    fn print_view(&self) {
        let view = self.state.view();
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", render(&view, self.elapsed()));
        let _ = stdout.flush();
    }
}

fn log_transition(from: ClientPhase, to: ClientPhase) {
    match to {
        ClientPhase::Failed | ClientPhase::Cancelled => {
            crawl_warn!("task ended as {:?}", to);
        }
        _ => crawl_info!("phase {:?} -> {:?}", from, to),
    }
}
