//! End-to-end acceptance: a small task-board state wired through the store,
//! with sharded and shard-less controls observing dispatch passes.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use viewsync::{Config, Control, Dispatcher, Store};

#[derive(Debug, Default, Serialize)]
struct Board {
    items: Vec<Task>,
    error: String,
}

#[derive(Debug, Clone, Serialize)]
struct Task {
    title: String,
    done: bool,
}

#[derive(Default)]
struct Rendered {
    lists: Vec<Value>,
    banners: Vec<Value>,
    status_passes: u32,
}

struct TaskList {
    out: Rc<RefCell<Rendered>>,
}

impl Control<Board> for TaskList {
    fn shard(&self, store: &Board) -> Result<Option<Value>> {
        Ok(Some(serde_json::to_value(&store.items)?))
    }

    fn update(&mut self, _store: &Board, shard: Option<&Value>) -> Result<()> {
        self.out
            .borrow_mut()
            .lists
            .push(shard.cloned().unwrap_or(Value::Null));
        Ok(())
    }
}

struct ErrorBanner {
    prefix: String,
    out: Rc<RefCell<Rendered>>,
}

impl Control<Board> for ErrorBanner {
    fn init(&mut self, _store: &Board, config: &Config) -> Result<()> {
        self.prefix = config.get_or("error_prefix", "error:").to_string();
        Ok(())
    }

    fn shard(&self, store: &Board) -> Result<Option<Value>> {
        Ok(Some(Value::from(store.error.clone())))
    }

    fn update(&mut self, store: &Board, _shard: Option<&Value>) -> Result<()> {
        self.out
            .borrow_mut()
            .banners
            .push(json!(format!("{} {}", self.prefix, store.error)));
        Ok(())
    }
}

struct StatusLine {
    out: Rc<RefCell<Rendered>>,
}

impl Control<Board> for StatusLine {
    fn update(&mut self, _store: &Board, _shard: Option<&Value>) -> Result<()> {
        self.out.borrow_mut().status_passes += 1;
        Ok(())
    }
}

fn build_store(config: Config) -> (Store<Board>, Rc<RefCell<Rendered>>) {
    let out = Rc::new(RefCell::new(Rendered::default()));
    let mut dispatcher = Dispatcher::new(config);
    dispatcher
        .register("task_list", Box::new(TaskList { out: Rc::clone(&out) }))
        .expect("register task_list");
    dispatcher
        .register(
            "error_banner",
            Box::new(ErrorBanner {
                prefix: String::new(),
                out: Rc::clone(&out),
            }),
        )
        .expect("register error_banner");
    dispatcher
        .register("status_line", Box::new(StatusLine { out: Rc::clone(&out) }))
        .expect("register status_line");
    (Store::new(Board::default(), dispatcher), out)
}

#[test]
fn initial_pass_renders_every_control_once() {
    let (mut store, out) = build_store(Config::default());
    let report = store.initialize().expect("initialize");

    assert_eq!(
        report.updated,
        vec![
            "task_list".to_string(),
            "error_banner".to_string(),
            "status_line".to_string()
        ]
    );
    let rendered = out.borrow();
    assert_eq!(rendered.lists, vec![json!([])]);
    assert_eq!(rendered.banners.len(), 1);
    assert_eq!(rendered.status_passes, 1);
}

#[test]
fn actions_re_render_only_affected_controls() {
    let (mut store, out) = build_store(Config::default());
    store.initialize().expect("initialize");

    let (_, report) = store
        .apply(|board| {
            board.items.push(Task {
                title: "ship it".into(),
                done: false,
            })
        })
        .expect("apply");

    // The item list changed; the error banner did not. The status line has
    // no shard and fires regardless.
    assert_eq!(
        report.updated,
        vec!["task_list".to_string(), "status_line".to_string()]
    );
    assert_eq!(report.unchanged, vec!["error_banner".to_string()]);

    let rendered = out.borrow();
    assert_eq!(rendered.lists.len(), 2);
    assert_eq!(rendered.banners.len(), 1);
    assert_eq!(rendered.status_passes, 2);
}

#[test]
fn refresh_without_mutation_is_quiet_for_sharded_controls() {
    let (mut store, out) = build_store(Config::default());
    store.initialize().expect("initialize");
    store.refresh().expect("refresh");
    store.refresh().expect("refresh");

    let rendered = out.borrow();
    assert_eq!(rendered.lists.len(), 1);
    assert_eq!(rendered.banners.len(), 1);
    // Shard-less status line still ticks every pass.
    assert_eq!(rendered.status_passes, 3);
}

#[test]
fn init_reads_configured_template() {
    let config = Config::from_pairs([("error_prefix", "[board]")]);
    let (mut store, out) = build_store(config);
    store.initialize().expect("initialize");
    store
        .apply(|board| board.error = "disk full".into())
        .expect("apply");

    let rendered = out.borrow();
    assert_eq!(rendered.banners.last(), Some(&json!("[board] disk full")));
}

#[test]
fn state_reads_go_through_the_store() {
    let (mut store, _out) = build_store(Config::default());
    store.initialize().expect("initialize");
    store
        .apply(|board| {
            board.items.push(Task {
                title: "only one".into(),
                done: true,
            })
        })
        .expect("apply");
    assert_eq!(store.state().items.len(), 1);
    assert!(store.state().items[0].done);
}
