//! Integration tests for stack operations and the hooks they fire.

mod common;

use common::{log, navigator_with, strings, take, Log, RecordingRoute};
use presentar_navigator::{
    LocalHistoryEntry, NavigatorError, NavigatorObserver, PopDisposition, PopOutcome, RouteInfo, RouteLifecycle,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

/// Observer writing `"observer: <event> <route> <other>"` lines.
struct RecordingObserver {
    log: Log,
}

fn name(info: Option<&RouteInfo>) -> &str {
    info.and_then(RouteInfo::name).unwrap_or("null")
}

impl NavigatorObserver for RecordingObserver {
    fn did_push(&mut self, route: &RouteInfo, previous: Option<&RouteInfo>) {
        let line = format!("observer: didPush {} {}", name(Some(route)), name(previous));
        self.log.borrow_mut().push(line);
    }

    fn did_pop(&mut self, route: &RouteInfo, previous: Option<&RouteInfo>) {
        let line = format!("observer: didPop {} {}", name(Some(route)), name(previous));
        self.log.borrow_mut().push(line);
    }

    fn did_remove(&mut self, route: &RouteInfo, previous: Option<&RouteInfo>) {
        let line = format!("observer: didRemove {} {}", name(Some(route)), name(previous));
        self.log.borrow_mut().push(line);
    }

    fn did_replace(&mut self, new: Option<&RouteInfo>, old: Option<&RouteInfo>) {
        let line = format!("observer: didReplace {} {}", name(new), name(old));
        self.log.borrow_mut().push(line);
    }
}

fn observe(navigator: &mut presentar_navigator::Navigator, log: &Log) {
    navigator.add_observer(Rc::new(RefCell::new(RecordingObserver { log: Rc::clone(log) })));
}

// =============================================================================
// Push / Pop / Replace
// =============================================================================

#[test]
fn test_push_event_order() {
    let log = log();
    let (mut navigator, _) = navigator_with(&["initial"], &log);

    navigator.push(RecordingRoute::page("second", &log).boxed());
    assert_eq!(
        take(&log),
        strings(&[
            "second: install",
            "second: didPush",
            "second: didChangeNext null",
            "initial: didChangeNext second",
        ])
    );
}

#[test]
fn test_pop_event_order_and_deferred_dispose() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["initial", "second"], &log);

    assert_eq!(navigator.pop(None), Ok(PopOutcome::Popped(ids[1])));
    assert_eq!(take(&log), strings(&["second: didPop", "initial: didPopNext second"]));
    assert_eq!(navigator.lifecycle(ids[1]), Some(RouteLifecycle::PoppedPending));

    navigator.settle().unwrap();
    assert_eq!(take(&log), strings(&["second: dispose"]));
    assert_eq!(navigator.route_ids(), &[ids[0]]);
}

#[test]
fn test_replace_event_order() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["initial", "second", "third"], &log);

    let two = navigator
        .replace(ids[1], RecordingRoute::page("two", &log).boxed())
        .unwrap();
    assert_eq!(
        take(&log),
        strings(&[
            "two: install",
            "two: didReplace second",
            "two: didChangeNext third",
            "initial: didChangeNext two",
            "second: dispose",
        ])
    );
    assert_eq!(navigator.route_ids(), &[ids[0], two.id, ids[2]]);
    assert_eq!(navigator.lifecycle(ids[1]), Some(RouteLifecycle::Disposed));
    assert!(!navigator.needs_frame());
}

#[test]
fn test_replace_continues_old_primary() {
    let log = log();
    let (mut navigator, _) = navigator_with(&["initial"], &log);
    let second = navigator.push(RecordingRoute::page("second", &log).boxed());
    for _ in 0..6 {
        navigator.tick(std::time::Duration::from_millis(16));
    }
    let before = navigator.info(second.id).and_then(|i| i.primary).unwrap();
    let value = navigator.animations().value(before);

    let two = navigator
        .replace(second.id, RecordingRoute::page("two", &log).boxed())
        .unwrap();
    let after = navigator.info(two.id).and_then(|i| i.primary).unwrap();
    assert_eq!(navigator.animations().value(after), value);
    assert!(navigator.animations().is_animating(after));
}

#[test]
fn test_replace_route_below() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["initial", "second"], &log);
    let below = navigator
        .replace_route_below(ids[1], RecordingRoute::page("root", &log).boxed())
        .unwrap();
    assert_eq!(navigator.route_ids(), &[below.id, ids[1]]);
    assert_eq!(
        take(&log),
        strings(&[
            "root: install",
            "root: didReplace initial",
            "root: didChangeNext second",
            "initial: dispose",
        ])
    );
}

// =============================================================================
// Removal
// =============================================================================

#[test]
fn test_remove_route_notifies_neighbours() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["initial", "second", "third"], &log);
    observe(&mut navigator, &log);

    navigator.remove_route(ids[1]).unwrap();
    assert_eq!(
        take(&log),
        strings(&[
            "initial: didChangeNext third",
            "observer: didRemove second initial",
            "second: dispose",
        ])
    );
    assert_eq!(navigator.route_ids(), &[ids[0], ids[2]]);
}

#[test]
fn test_remove_route_below() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["initial", "second"], &log);
    navigator.remove_route_below(ids[1]).unwrap();
    assert_eq!(navigator.route_ids(), &[ids[1]]);
    assert_eq!(take(&log), strings(&["initial: dispose"]));
    assert_eq!(
        navigator.remove_route_below(ids[1]),
        Err(NavigatorError::NoRouteBelow(ids[1]))
    );
}

#[test]
fn test_push_replacement_retires_old_route() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["initial", "second"], &log);
    observe(&mut navigator, &log);

    let third = navigator
        .push_replacement(RecordingRoute::page("third", &log).boxed(), None)
        .unwrap();
    assert_eq!(
        take(&log),
        strings(&[
            "third: install",
            "third: didPush",
            "third: didChangeNext null",
            "initial: didChangeNext third",
            "observer: didReplace third second",
        ])
    );
    assert_eq!(navigator.route_ids(), &[ids[0], third.id]);
    assert_eq!(navigator.exiting(), &[ids[1]]);

    navigator.settle().unwrap();
    assert_eq!(take(&log), strings(&["second: dispose"]));
}

#[test]
fn test_push_and_remove_until() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["a", "b", "c"], &log);
    observe(&mut navigator, &log);

    let d = navigator.push_and_remove_until(RecordingRoute::page("d", &log).boxed(), |info| {
        info.name() == Some("a")
    });
    assert_eq!(
        take(&log),
        strings(&[
            "d: install",
            "d: didPush",
            "d: didChangeNext null",
            "a: didChangeNext d",
            "observer: didPush d a",
            "observer: didRemove c a",
            "observer: didRemove b a",
        ])
    );
    assert_eq!(navigator.route_ids(), &[ids[0], d.id]);

    navigator.settle().unwrap();
    assert_eq!(take(&log), strings(&["c: dispose", "b: dispose"]));
}

// =============================================================================
// pop_until / maybe_pop
// =============================================================================

#[test]
fn test_pop_until_satisfied_predicate_is_silent() {
    let log = log();
    let (mut navigator, _) = navigator_with(&["a", "b"], &log);
    observe(&mut navigator, &log);

    assert_eq!(navigator.pop_until(|_| true), Ok(0));
    assert!(take(&log).is_empty());
    assert_eq!(navigator.len(), 2);
}

#[test]
fn test_pop_until_named_route() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["a", "b", "c"], &log);
    assert_eq!(navigator.pop_until(|info| info.name() == Some("a")), Ok(2));
    assert_eq!(navigator.route_ids(), &[ids[0]]);
    assert_eq!(navigator.pop_until(|info| info.name() == Some("a")), Ok(0));
}

#[test]
fn test_pop_until_stops_at_last_route() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["a", "b"], &log);
    assert_eq!(navigator.pop_until(|_| false), Ok(1));
    assert_eq!(navigator.route_ids(), &[ids[0]]);
}

#[test]
fn test_pop_until_stops_at_declining_route() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["a"], &log);
    let b = navigator.push(RecordingRoute::page("b", &log).declining_pop().boxed());
    navigator.settle().unwrap();
    take(&log);

    assert_eq!(navigator.pop_until(|info| info.name() == Some("a")), Ok(1));
    assert_eq!(take(&log), strings(&["b: didPop"]));
    assert_eq!(navigator.route_ids(), &[ids[0], b.id]);
}

#[test]
fn test_pop_until_drains_local_history_first() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["a", "b"], &log);
    navigator.add_local_history_entry(ids[1], LocalHistoryEntry::new()).unwrap();
    navigator.add_local_history_entry(ids[1], LocalHistoryEntry::new()).unwrap();

    assert_eq!(navigator.pop_until(|info| info.name() == Some("a")), Ok(3));
    assert_eq!(navigator.route_ids(), &[ids[0]]);
}

#[test]
fn test_maybe_pop_dispositions() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["a"], &log);
    assert_eq!(navigator.maybe_pop(None), Ok(false));

    let stubborn = navigator.push(
        RecordingRoute::page("stubborn", &log)
            .with_will_pop(PopDisposition::DoNotPop)
            .boxed(),
    );
    assert_eq!(navigator.maybe_pop(None), Ok(true));
    assert!(navigator.is_current(stubborn.id));

    navigator.remove_route(stubborn.id).unwrap();
    navigator.push(RecordingRoute::page("b", &log).boxed());
    assert_eq!(navigator.maybe_pop(None), Ok(true));
    assert_eq!(navigator.route_ids(), &[ids[0]]);
}

// =============================================================================
// Local history
// =============================================================================

#[test]
fn test_local_history_absorbs_pops_in_lifo_order() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["a", "b"], &log);
    for entry in ["first", "second", "third"] {
        let sink = Rc::clone(&log);
        navigator
            .add_local_history_entry(
                ids[1],
                LocalHistoryEntry::new().with_on_remove(move || sink.borrow_mut().push(format!("removed {entry}"))),
            )
            .unwrap();
    }
    assert!(navigator.can_pop());

    for _ in 0..3 {
        assert_eq!(navigator.pop(None), Ok(PopOutcome::HandledInternally(ids[1])));
    }
    assert_eq!(
        take(&log),
        strings(&["removed third", "removed second", "removed first"])
    );
    assert_eq!(navigator.pop(None), Ok(PopOutcome::Popped(ids[1])));
}

#[test]
fn test_local_history_on_single_route() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["a"], &log);
    assert!(!navigator.can_pop());
    let handle = navigator.add_local_history_entry(ids[0], LocalHistoryEntry::new()).unwrap();
    assert!(navigator.can_pop());
    assert_eq!(navigator.maybe_pop(None), Ok(true));
    assert!(!handle.is_attached());
    assert_eq!(navigator.pop(None), Err(NavigatorError::CannotPopLastRoute));
}

#[test]
fn test_local_history_handle_after_dispose() {
    let log = log();
    let (mut navigator, ids) = navigator_with(&["a", "b"], &log);
    let fired = Rc::new(RefCell::new(false));
    let sink = Rc::clone(&fired);
    let handle = navigator
        .add_local_history_entry(
            ids[0],
            LocalHistoryEntry::new().with_on_remove(move || *sink.borrow_mut() = true),
        )
        .unwrap();

    navigator.remove_route(ids[0]).unwrap();
    assert!(!handle.remove());
    assert!(!*fired.borrow());
    assert_eq!(
        navigator.add_local_history_entry(ids[0], LocalHistoryEntry::new()).err(),
        Some(NavigatorError::RouteDisposed(ids[0]))
    );
}

// =============================================================================
// Observers
// =============================================================================

#[test]
fn test_observer_sees_push_and_pop() {
    let log = log();
    let (mut navigator, _) = navigator_with(&["a"], &log);
    observe(&mut navigator, &log);

    navigator.push(RecordingRoute::page("b", &log).boxed());
    navigator.pop(None).unwrap();
    let events: Vec<String> = take(&log)
        .into_iter()
        .filter(|line| line.starts_with("observer"))
        .collect();
    assert_eq!(events, strings(&["observer: didPush b a", "observer: didPop b a"]));
}

// =============================================================================
// Completion
// =============================================================================

#[test]
fn test_completion_results() {
    use futures::executor::block_on;

    let log = log();
    let (mut navigator, _) = navigator_with(&["a"], &log);

    let mut popped = navigator.push(RecordingRoute::page("b", &log).boxed());
    assert_eq!(popped.completion.try_result(), None);
    navigator.pop(Some(json!({"saved": true}))).unwrap();
    assert_eq!(block_on(popped.completion), Some(json!({"saved": true})));

    let replaced = navigator.push(RecordingRoute::page("c", &log).boxed());
    navigator
        .push_replacement(RecordingRoute::page("d", &log).boxed(), Some(json!("handoff")))
        .unwrap();
    assert_eq!(block_on(replaced.completion), Some(json!("handoff")));

    let removed = navigator.push(RecordingRoute::page("e", &log).boxed());
    navigator.remove_route(removed.id).unwrap();
    assert_eq!(block_on(removed.completion), None);
}
