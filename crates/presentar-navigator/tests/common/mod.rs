//! Shared fixtures for presentar-navigator integration tests.

#![allow(dead_code)]

use presentar_navigator::{
    Installable, Navigator, PopDisposition, Poppable, Route, RouteId, RouteInfo, RouteKind, RouteSettings,
};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

pub type Log = Rc<RefCell<Vec<String>>>;

/// Send navigator traces to the test output when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// Drain and return everything logged so far.
pub fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

fn label(info: Option<&RouteInfo>) -> String {
    info.and_then(RouteInfo::name).unwrap_or("null").to_string()
}

/// Route that writes every hook it receives to a shared log as
/// `"<name>: <hook>"`.
pub struct RecordingRoute {
    settings: RouteSettings,
    kind: RouteKind,
    log: Log,
    declines_pop: bool,
    will_pop: Option<PopDisposition>,
}

impl RecordingRoute {
    pub fn page(name: &str, log: &Log) -> Self {
        Self::new(name, RouteKind::page(), log)
    }

    pub fn new(name: &str, kind: RouteKind, log: &Log) -> Self {
        Self {
            settings: RouteSettings::named(name),
            kind,
            log: Rc::clone(log),
            declines_pop: false,
            will_pop: None,
        }
    }

    /// `did_pop` returns `false`.
    pub fn declining_pop(mut self) -> Self {
        self.declines_pop = true;
        self
    }

    pub fn with_will_pop(mut self, disposition: PopDisposition) -> Self {
        self.will_pop = Some(disposition);
        self
    }

    pub fn boxed(self) -> Box<dyn Route> {
        Box::new(self)
    }

    fn record(&self, hook: &str) {
        let name = self.settings.name().unwrap_or_default();
        self.log.borrow_mut().push(format!("{name}: {hook}"));
    }
}

impl Installable for RecordingRoute {
    fn install(&mut self, _info: &RouteInfo) {
        self.record("install");
    }

    fn dispose(&mut self, _info: &RouteInfo) {
        self.record("dispose");
    }
}

impl Poppable for RecordingRoute {
    fn will_pop(&self, _info: &RouteInfo, is_first: bool) -> PopDisposition {
        match self.will_pop {
            Some(disposition) => disposition,
            None if is_first => PopDisposition::Bubble,
            None => PopDisposition::Pop,
        }
    }

    fn did_pop(&mut self, _info: &RouteInfo, _result: Option<&Value>) -> bool {
        self.record("didPop");
        !self.declines_pop
    }
}

impl Route for RecordingRoute {
    fn settings(&self) -> &RouteSettings {
        &self.settings
    }

    fn kind(&self) -> RouteKind {
        self.kind
    }

    fn did_add(&mut self, _info: &RouteInfo) {
        self.record("didAdd");
    }

    fn did_push(&mut self, _info: &RouteInfo) {
        self.record("didPush");
    }

    fn did_replace(&mut self, _info: &RouteInfo, old: Option<&RouteInfo>) {
        self.record(&format!("didReplace {}", label(old)));
    }

    fn did_change_next(&mut self, _info: &RouteInfo, next: Option<&RouteInfo>) {
        self.record(&format!("didChangeNext {}", label(next)));
    }

    fn did_pop_next(&mut self, _info: &RouteInfo, popped: &RouteInfo) {
        self.record(&format!("didPopNext {}", label(Some(popped))));
    }
}

/// Navigator holding `names` as settled pages, plus the route ids bottom to
/// top. The log is drained before returning.
pub fn navigator_with(names: &[&str], log: &Log) -> (Navigator, Vec<RouteId>) {
    init_tracing();
    let mut navigator = Navigator::default();
    let mut ids = Vec::new();
    for name in names {
        ids.push(navigator.add(RecordingRoute::page(name, log).boxed()).id);
    }
    navigator.settle().expect("settle");
    take(log);
    (navigator, ids)
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}
