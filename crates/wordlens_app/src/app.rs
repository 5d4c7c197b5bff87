use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use wordlens_core::{update, AppState, Effect, FileHandle, Msg};
use wordlens_logging::{wl_info, wl_warn};

use crate::cli::{Cli, Command, DictAction};
use crate::config::ClientConfig;
use crate::effects::EffectRunner;
use crate::input::{self, Input};
use crate::logging;
use crate::render;

const INPUT_POLL: Duration = Duration::from_millis(20);
/// Quiet period after stdin closed before a finished session exits.
const SETTLE: Duration = Duration::from_secs(2);

pub fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::load(cli.global.config.as_deref())?;
    config.apply_overrides(&cli.global);
    logging::initialize(config.log_destination, logging::level_for(cli.global.verbose));
    wl_info!("Using analysis service at {}", config.base_url);

    let runner = EffectRunner::new(config.engine_settings())?;
    let state = AppState::with_settings(config.page_size, config.min_length);
    let mut session = Session::new(state, runner);

    match cli.command {
        Command::Analyze { file, query, sort } => {
            session.state = std::mem::take(&mut session.state).with_query(query, sort);
            session.analyze(&file)
        }
        Command::Dict { action } => session.dictionary(action, config.reply_timeout()),
    }
}

/// Inspects `path` for upload. `None` when it is not a readable regular file.
pub fn file_handle(path: &Path) -> Option<FileHandle> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(err) => {
            wl_warn!("Cannot read {:?}: {}", path, err);
            return None;
        }
    };
    if !meta.is_file() {
        wl_warn!("{:?} is not a regular file", path);
        return None;
    }
    let name = path.file_name()?.to_string_lossy().into_owned();
    Some(FileHandle {
        path: path.to_path_buf(),
        name,
        len: meta.len(),
    })
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    last_frame: Vec<String>,
    alerted: bool,
}

impl Session {
    fn new(state: AppState, runner: EffectRunner) -> Self {
        Self {
            state,
            runner,
            last_frame: Vec::new(),
            alerted: false,
        }
    }

    /// Runs `msg` through `update`, executes its effects and redraws when
    /// the state changed. Returns how many effects were issued.
    fn dispatch(&mut self, msg: Msg) -> usize {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        let issued = effects.len();
        self.runner.run(effects);
        if self.state.consume_dirty() {
            self.redraw();
        }
        issued
    }

    fn redraw(&mut self) {
        let view = self.state.view();
        let frame = render::render(&view);
        if frame != self.last_frame {
            for line in &frame {
                println!("{line}");
            }
            self.last_frame = frame;
        }

        if view.alert.is_some() || view.notice.is_some() {
            self.alerted |= view.alert.is_some();
            // Shown once; the next frame drops them.
            let state = std::mem::take(&mut self.state);
            let (mut state, _) = update(state, Msg::AlertDismissed);
            state.consume_dirty();
            self.state = state;
        }
    }

    fn drain_engine(&mut self) {
        while let Some(msg) = self.runner.try_next() {
            self.dispatch(msg);
        }
    }

    fn job_settled(&self) -> bool {
        self.state
            .job_phase()
            .map_or(true, |phase| phase.is_terminal())
    }

    fn analyze(mut self, file: &Path) -> Result<()> {
        self.dispatch(Msg::UploadRequested(file_handle(file)));
        if self.state.active_ticket().is_none() {
            bail!("nothing to analyse at {}", file.display());
        }

        let lines = spawn_input_reader();
        let mut input_open = true;
        loop {
            self.drain_engine();

            if !input_open {
                match self.runner.next_timeout(SETTLE) {
                    Some(msg) => {
                        self.dispatch(msg);
                    }
                    None if self.job_settled() => break,
                    None => {}
                }
                continue;
            }

            match lines.recv_timeout(INPUT_POLL) {
                Ok(line) => match input::parse_line(&line) {
                    Ok(Some(Input::Quit)) => break,
                    Ok(Some(Input::Help)) => println!("{}", input::HELP),
                    Ok(Some(Input::Open(path))) => {
                        self.dispatch(Msg::UploadRequested(file_handle(&path)));
                    }
                    Ok(Some(Input::Dispatch(msg))) => {
                        self.dispatch(msg);
                    }
                    Ok(None) => {}
                    Err(message) => eprintln!("{message}"),
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => input_open = false,
            }
        }

        self.runner.run(vec![Effect::StopPolling]);
        Ok(())
    }

    fn dictionary(mut self, action: DictAction, reply_timeout: Duration) -> Result<()> {
        let msg = match action {
            DictAction::List => Msg::WordsRequested,
            DictAction::Add { word } => Msg::AddWordRequested(word),
            DictAction::Remove { word, yes } => {
                self.dispatch(Msg::RemoveWordRequested(word));
                if yes || confirm()? {
                    Msg::RemoveWordConfirmed
                } else {
                    self.dispatch(Msg::RemoveWordCancelled);
                    println!("cancelled");
                    return Ok(());
                }
            }
            DictAction::Download { path } => Msg::DictionaryDownloadRequested(path),
            DictAction::Upload { path } => Msg::DictionaryReplaceRequested(file_handle(&path)),
        };

        if self.dispatch(msg) > 0 {
            match self.runner.next_timeout(reply_timeout) {
                Some(reply) => {
                    self.dispatch(reply);
                }
                None => bail!("no reply from the analysis service"),
            }
        }
        if self.alerted {
            bail!("dictionary command failed");
        }
        Ok(())
    }
}

fn confirm() -> Result<bool> {
    print!("[y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn spawn_input_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
