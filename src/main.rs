use std::cell::RefCell;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

use morimori::app::{Analytics, LogAnalytics, NoopAnalytics, Router};
use morimori::destroyable::Destroyable;
use morimori::events::Channel;
use morimori::game::game_engine::{InputOutcome, SessionContext};
use morimori::game::scheduler::Scheduler;
use morimori::game::settings::Settings;
use morimori::game::stats_manager::{FileStorage, ScoreStore};
use morimori::model::{Feedback, GameEvent, PlayerInput, Route};
use morimori::ui::console::PrintLinkShareTarget;
use morimori::ui::{share_result, ConsolePresenter, Notice, SharePayload};

#[derive(Debug, Parser)]
#[command(name = "morimori", version)]
#[command(about = "Short brain-training mini games in the terminal")]
struct Args {
    /// Where to start, e.g. `#/games` or `#/play/color-find/hard`
    #[arg(default_value = "#/")]
    route: String,

    /// Directory holding settings and scores
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Fixed seed for every play-through (MORIMORI_SEED also works)
    #[arg(long)]
    seed: Option<u64>,

    /// Do not log analytics events
    #[arg(long)]
    no_analytics: bool,
}

const HELP: &str = "\
Commands: home | games | play <game> [easy|normal|hard] | quit
In a game: #<n> picks a card/cell/option, digits type an answer, < deletes, = submits,
anything else is a word.";

fn init_logging() {
    let default_level = if Settings::is_debug_mode() { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn print_event(event: &GameEvent) {
    match event {
        GameEvent::SessionStarted {
            game_id,
            difficulty,
            ..
        } => println!("--- {} ({}) ---", game_id.title(), difficulty.label()),
        GameEvent::RoundStarted {
            round_index,
            total_rounds,
            prompt,
        } => {
            match total_rounds {
                Some(total) => println!("[{round_index}/{total}]"),
                None => println!("[{round_index}]"),
            }
            println!("{prompt}");
        }
        GameEvent::RoundUpdated { prompt } => println!("{prompt}"),
        GameEvent::Feedback(Feedback::Success(message)) => println!("{message}"),
        GameEvent::Feedback(Feedback::Error { message, .. }) => println!("{message}"),
        GameEvent::Feedback(Feedback::Rejected(message)) => println!("({message})"),
        GameEvent::TimerTick(_) | GameEvent::Finished(_) => {}
    }
}

/// A bare number longer than one digit is typed digit by digit.
fn parse_inputs(line: &str) -> Vec<PlayerInput> {
    if line.len() > 1 && line.bytes().all(|b| b.is_ascii_digit()) {
        return line.bytes().map(|b| PlayerInput::Digit(b - b'0')).collect();
    }
    line.parse().map(|input| vec![input]).unwrap_or_default()
}

struct Shell {
    router: Rc<RefCell<Router>>,
    presenter: Rc<ConsolePresenter>,
    scheduler: Scheduler,
    settings: Settings,
}

impl Shell {
    fn go(&self, location: &str) {
        self.presenter.clear();
        let route = self.router.borrow_mut().navigate(location);
        if !matches!(route, Route::Play { .. }) {
            println!("{}", self.router.borrow().screen());
        }
    }

    fn result_command(&self, line: &str) -> bool {
        match line {
            "r" | "x" => {
                let Some(card) = self.presenter.take_card() else {
                    return false;
                };
                if line == "r" {
                    card.replay();
                } else {
                    card.exit();
                }
                self.scheduler.run_due();
                if !matches!(self.router.borrow().route(), Route::Play { .. }) {
                    println!("{}", self.router.borrow().screen());
                }
                true
            }
            "s" => {
                let Some(outcome) = self.presenter.outcome() else {
                    return false;
                };
                let payload = SharePayload::for_outcome(&outcome, &self.settings.share_base_url);
                match share_result(&PrintLinkShareTarget, &payload) {
                    Some(Notice::Info(message)) | Some(Notice::Error(message)) => {
                        println!("{message}")
                    }
                    None => {}
                }
                true
            }
            _ => false,
        }
    }

    /// Returns false when the player asked to quit.
    fn handle_line(&self, line: &str) -> bool {
        let mut words = line.split_whitespace();
        match words.next() {
            None => {}
            Some("quit" | "q") => return false,
            Some("help" | "?") => println!("{HELP}"),
            Some("home") => self.go("#/"),
            Some("games") => self.go("#/games"),
            Some("play") => {
                let slug = words.next().unwrap_or_default();
                let tier = words
                    .next()
                    .map(str::to_string)
                    .unwrap_or_else(|| self.settings.default_difficulty.to_string());
                self.go(&format!("#/play/{slug}/{tier}"));
            }
            Some(location) if location.starts_with("#/") => self.go(location),
            Some(_) if self.result_command(line) => {}
            Some(_) => self.play(line),
        }
        true
    }

    fn play(&self, line: &str) {
        let inputs = parse_inputs(line);
        if inputs.is_empty() {
            println!("{HELP}");
            return;
        }
        for input in inputs {
            let outcome = self.router.borrow().dispatch(input);
            debug!(target: "ui", "Input outcome: {outcome:?}");
            match outcome {
                InputOutcome::Ignored => {
                    if self.router.borrow().current_game().is_none() {
                        println!("{HELP}");
                    }
                    break;
                }
                InputOutcome::Unrecognized => {
                    println!("That doesn't work in this game.");
                    break;
                }
                InputOutcome::Classified(_) => {}
            }
        }
        self.settle();
    }

    // runs delayed transitions until the game takes input again or shows its result
    fn settle(&self) {
        self.scheduler.run_while(|| {
            self.router
                .borrow()
                .current_game()
                .is_some_and(|game| game.is_input_locked() && !game.is_finished())
        });
    }
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let settings_dir = match args.data_dir.clone() {
        Some(dir) => dir,
        None => Settings::default_dir().context("locating the data directory")?,
    };
    let settings = Settings::load(&settings_dir);
    let state_dir = settings.state_dir(&settings_dir);
    info!(target: "settings", "Using state in {}", state_dir.display());
    let store = ScoreStore::load(Box::new(FileStorage::in_dir(&state_dir)));

    let seed = args.seed.or_else(Settings::seed_from_env);
    let scheduler = Scheduler::system();
    let presenter = Rc::new(ConsolePresenter::new(seed.unwrap_or_else(rand::random)));
    let (events, observer) = Channel::new();
    let _printer = observer.subscribe(print_event);
    let analytics: Rc<dyn Analytics> = if args.no_analytics || !settings.analytics_enabled {
        Rc::new(NoopAnalytics)
    } else {
        Rc::new(LogAnalytics)
    };
    let context = SessionContext {
        scheduler: scheduler.clone(),
        store: Rc::new(RefCell::new(store)),
        presenter: presenter.clone(),
        events,
        seed,
    };
    let shell = Shell {
        router: Router::new(context, &observer, analytics),
        presenter,
        scheduler,
        settings,
    };

    shell.go(&args.route);
    for line in io::stdin().lock().lines() {
        let line = line.context("reading input")?;
        if !shell.handle_line(line.trim()) {
            break;
        }
    }
    shell.router.borrow_mut().destroy();
    Ok(())
}
