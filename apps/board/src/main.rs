//! Minimal task-board host: business actions mutate the board through the
//! store, controls render slices of it to stdout.

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use viewsync::{Config, Control, Dispatcher, FaultPolicy, Store};

#[derive(Parser, Debug)]
struct Args {
    /// Optional TOML file with flat scalar settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Keep rendering past a failing control instead of aborting the pass.
    #[arg(long)]
    isolate_faults: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
enum Filter {
    #[default]
    All,
    Open,
    Done,
}

#[derive(Debug, Clone, Serialize)]
struct Task {
    title: String,
    done: bool,
}

#[derive(Debug, Default, Serialize)]
struct Board {
    items: Vec<Task>,
    filter: Filter,
    error: String,
}

impl Board {
    fn visible(&self) -> Vec<&Task> {
        self.items
            .iter()
            .filter(|task| match self.filter {
                Filter::All => true,
                Filter::Open => !task.done,
                Filter::Done => task.done,
            })
            .collect()
    }
}

/// Renders the visible tasks whenever the list or the filter changes.
struct TaskList;

impl Control<Board> for TaskList {
    fn shard(&self, store: &Board) -> Result<Option<Value>> {
        let slice = serde_json::to_value((&store.visible(), store.filter))?;
        Ok(Some(slice))
    }

    fn update(&mut self, store: &Board, _shard: Option<&Value>) -> Result<()> {
        let visible = store.visible();
        if visible.is_empty() {
            println!("  (no tasks)");
        }
        for (index, task) in visible.iter().enumerate() {
            let mark = if task.done { "x" } else { " " };
            println!("  {index}. [{mark}] {}", task.title);
        }
        Ok(())
    }
}

/// One-line open/done tally, re-rendered only when the counts move.
struct Summary;

impl Control<Board> for Summary {
    fn shard(&self, store: &Board) -> Result<Option<Value>> {
        let open = store.items.iter().filter(|task| !task.done).count();
        let done = store.items.len() - open;
        Ok(Some(serde_json::to_value((open, done))?))
    }

    fn update(&mut self, store: &Board, _shard: Option<&Value>) -> Result<()> {
        let open = store.items.iter().filter(|task| !task.done).count();
        println!("-- {open} open / {} done --", store.items.len() - open);
        Ok(())
    }
}

/// Prints the error field when it changes, prefixed per configuration.
struct ErrorBanner {
    prefix: String,
}

impl Control<Board> for ErrorBanner {
    fn init(&mut self, _store: &Board, config: &Config) -> Result<()> {
        self.prefix = config.get_or("error_prefix", "!!").to_string();
        Ok(())
    }

    fn shard(&self, store: &Board) -> Result<Option<Value>> {
        Ok(Some(Value::from(store.error.clone())))
    }

    fn update(&mut self, store: &Board, _shard: Option<&Value>) -> Result<()> {
        if !store.error.is_empty() {
            println!("{} {}", self.prefix, store.error);
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    Add(String),
    Done(usize),
    Remove(usize),
    SetFilter(Filter),
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (verb, rest) = match line.split_once(' ') {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    match verb {
        "add" if !rest.is_empty() => Command::Add(rest.to_string()),
        "done" => match rest.parse() {
            Ok(index) => Command::Done(index),
            Err(_) => Command::Unknown(line.to_string()),
        },
        "rm" => match rest.parse() {
            Ok(index) => Command::Remove(index),
            Err(_) => Command::Unknown(line.to_string()),
        },
        "filter" => match rest {
            "all" => Command::SetFilter(Filter::All),
            "open" => Command::SetFilter(Filter::Open),
            "done" => Command::SetFilter(Filter::Done),
            _ => Command::Unknown(line.to_string()),
        },
        "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line.to_string()),
    }
}

fn run_command(store: &mut Store<Board>, command: Command) -> Result<bool> {
    match command {
        Command::Add(title) => {
            store.apply(|board| {
                board.error.clear();
                board.items.push(Task { title, done: false });
            })?;
        }
        Command::Done(index) => {
            store.apply(|board| match board.items.get_mut(index) {
                Some(task) => {
                    board.error.clear();
                    task.done = true;
                }
                None => board.error = format!("no task at index {index}"),
            })?;
        }
        Command::Remove(index) => {
            store.apply(|board| {
                if index < board.items.len() {
                    board.error.clear();
                    board.items.remove(index);
                } else {
                    board.error = format!("no task at index {index}");
                }
            })?;
        }
        Command::SetFilter(filter) => {
            store.apply(|board| {
                board.error.clear();
                board.filter = filter;
            })?;
        }
        Command::Unknown(line) => {
            store.apply(|board| {
                board.error = format!("unrecognized command: '{line}'");
            })?;
        }
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            Config::from_toml_str(&raw)?
        }
        None => Config::default(),
    };
    Ok(config.with_env_overrides("BOARD"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let config = load_config(&args)?;

    let mut dispatcher = Dispatcher::new(config);
    if args.isolate_faults {
        dispatcher = dispatcher.with_policy(FaultPolicy::Isolate);
    }
    dispatcher.register("task_list", Box::new(TaskList))?;
    dispatcher.register("summary", Box::new(Summary))?;
    dispatcher.register(
        "error_banner",
        Box::new(ErrorBanner {
            prefix: String::new(),
        }),
    )?;

    let mut store = Store::new(Board::default(), dispatcher);
    store.initialize()?;
    println!("commands: add <title> | done <n> | rm <n> | filter all|open|done | quit");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if !run_command(&mut store, parse_command(&line))? {
            break;
        }
    }
    Ok(())
}
