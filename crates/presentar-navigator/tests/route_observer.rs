//! Integration tests for `RouteObserver` subscriptions driven by a navigator.

mod common;

use common::init_tracing;
use presentar_navigator::{
    BasicRoute, Navigator, RouteAware, RouteFilter, RouteLifecycle, RouteObserver, RouteSettings,
    SharedRouteAware,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Listener {
    events: Vec<&'static str>,
}

impl RouteAware for Listener {
    fn did_push(&mut self) {
        self.events.push("didPush");
    }

    fn did_pop(&mut self) {
        self.events.push("didPop");
    }

    fn did_push_next(&mut self) {
        self.events.push("didPushNext");
    }

    fn did_pop_next(&mut self) {
        self.events.push("didPopNext");
    }
}

fn listener() -> (Rc<RefCell<Listener>>, SharedRouteAware) {
    let concrete = Rc::new(RefCell::new(Listener::default()));
    let shared: SharedRouteAware = concrete.clone();
    (concrete, shared)
}

fn observed_navigator(filter: RouteFilter) -> (Navigator, Rc<RefCell<RouteObserver>>) {
    init_tracing();
    let observer = Rc::new(RefCell::new(RouteObserver::new().with_filter(filter)));
    let navigator = Navigator::default().with_observer(observer.clone());
    (navigator, observer)
}

fn page(name: &str) -> Box<dyn presentar_navigator::Route> {
    BasicRoute::page(RouteSettings::named(name)).boxed()
}

// =============================================================================
// Subscription table
// =============================================================================

#[test]
fn test_late_subscriber_receives_push() {
    let (mut navigator, observer) = observed_navigator(RouteFilter::Pages);
    let home = navigator.add(page("/")).id;
    navigator.settle().unwrap();

    let (events, shared) = listener();
    assert!(observer.borrow_mut().subscribe(&shared, home));
    assert_eq!(events.borrow().events, vec!["didPush"]);
    assert!(!observer.borrow_mut().subscribe(&shared, home));
    assert_eq!(events.borrow().events.len(), 1);
}

#[test]
fn test_unsubscribe_clears_every_route() {
    let (mut navigator, observer) = observed_navigator(RouteFilter::Pages);
    let a = navigator.add(page("/a")).id;
    let b = navigator.push(page("/b")).id;

    let (_first, first) = listener();
    let (_second, second) = listener();
    {
        let mut observer = observer.borrow_mut();
        observer.subscribe(&first, a);
        observer.subscribe(&first, b);
        observer.subscribe(&second, b);
    }

    let mut observer = observer.borrow_mut();
    assert_eq!(observer.unsubscribe(&first), 2);
    assert_eq!(observer.observed_routes(), vec![b]);
    assert_eq!(observer.subscriber_count(b), 1);
    assert_eq!(observer.unsubscribe(&second), 1);
    assert!(observer.observed_routes().is_empty());
    assert_eq!(observer.unsubscribe(&second), 0);
}

// =============================================================================
// Navigator events
// =============================================================================

#[test]
fn test_push_and_pop_reach_subscribers() {
    let (mut navigator, observer) = observed_navigator(RouteFilter::Pages);
    let home = navigator.add(page("/")).id;
    let (below, below_shared) = listener();
    observer.borrow_mut().subscribe(&below_shared, home);

    let details = navigator.push(page("/details")).id;
    let (above, above_shared) = listener();
    observer.borrow_mut().subscribe(&above_shared, details);

    navigator.pop(None).unwrap();
    assert_eq!(below.borrow().events, vec!["didPush", "didPushNext", "didPopNext"]);
    assert_eq!(above.borrow().events, vec!["didPush", "didPop"]);
}

#[test]
fn test_popups_filtered_by_default() {
    let (mut navigator, observer) = observed_navigator(RouteFilter::Pages);
    let home = navigator.add(page("/")).id;
    let (events, shared) = listener();
    observer.borrow_mut().subscribe(&shared, home);

    navigator.push(BasicRoute::popup(RouteSettings::named("/menu")).boxed());
    navigator.pop(None).unwrap();
    assert_eq!(events.borrow().events, vec!["didPush"]);
}

#[test]
fn test_any_filter_reports_popups() {
    let (mut navigator, observer) = observed_navigator(RouteFilter::Any);
    let home = navigator.add(page("/")).id;
    let (events, shared) = listener();
    observer.borrow_mut().subscribe(&shared, home);

    navigator.push(BasicRoute::popup(RouteSettings::named("/menu")).boxed());
    navigator.pop(None).unwrap();
    assert_eq!(events.borrow().events, vec!["didPush", "didPushNext", "didPopNext"]);
}

#[test]
fn test_dropped_listener_stops_counting() {
    let (mut navigator, observer) = observed_navigator(RouteFilter::Pages);
    let home = navigator.add(page("/")).id;
    {
        let (_events, shared) = listener();
        observer.borrow_mut().subscribe(&shared, home);
        assert!(observer.borrow().is_observing(home));
    }
    assert!(!observer.borrow().is_observing(home));
    assert!(observer.borrow().observed_routes().is_empty());

    navigator.push(page("/next"));
    assert_eq!(observer.borrow().subscriber_count(home), 0);
}

#[test]
fn test_removed_route_leaves_the_table() {
    let (mut navigator, observer) = observed_navigator(RouteFilter::Pages);
    navigator.add(page("/"));
    let b = navigator.push(page("/b")).id;
    navigator.push(page("/c"));
    {
        let (_events, shared) = listener();
        observer.borrow_mut().subscribe(&shared, b);
    }

    navigator.remove_route(b).unwrap();
    navigator.settle().unwrap();
    assert_eq!(navigator.lifecycle(b), Some(RouteLifecycle::Disposed));
    assert!(!observer.borrow().is_observing(b));
    assert!(observer.borrow().observed_routes().is_empty());
}

#[test]
fn test_replaced_route_leaves_the_table() {
    let (mut navigator, observer) = observed_navigator(RouteFilter::Pages);
    let home = navigator.add(page("/")).id;
    let b = navigator.push(page("/b")).id;
    let (_home_events, home_shared) = listener();
    let (_b_events, b_shared) = listener();
    observer.borrow_mut().subscribe(&home_shared, home);
    observer.borrow_mut().subscribe(&b_shared, b);

    navigator.replace(b, page("/other")).unwrap();
    assert!(!observer.borrow().is_observing(b));
    assert_eq!(observer.borrow().observed_routes(), vec![home]);
}
