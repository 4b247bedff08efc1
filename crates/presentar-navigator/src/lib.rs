//! Stack-based route navigation for Presentar.
//!
//! A [`Navigator`] keeps a stack of [`Route`]s and animates the hand-over
//! between neighbours:
//! - Stack operations: push, pop, replace, remove and their named variants
//! - Transitions: each animated route's primary animation drives its own
//!   entrance and exit, its secondary follows the route above, switching
//!   trains smoothly when that route changes mid-flight
//! - Local history: entries that absorb back requests before the route pops
//! - Observers: [`NavigatorObserver`] for stack changes and [`RouteObserver`]
//!   for per-route [`RouteAware`] subscriptions
//!
//! Nothing is drawn here. The host drives time with [`Navigator::tick`] and
//! renders [`Navigator::frames`].
//!
//! ```
//! use presentar_navigator::{BasicRoute, Navigator, RouteSettings};
//!
//! let mut navigator = Navigator::default();
//! navigator.add(BasicRoute::page(RouteSettings::named("/")).boxed());
//! let details = navigator.push(BasicRoute::page(RouteSettings::named("/details")).boxed());
//! navigator.settle().unwrap();
//!
//! navigator.pop(Some(serde_json::json!("done"))).unwrap();
//! navigator.settle().unwrap();
//! assert_eq!(navigator.len(), 1);
//! assert_eq!(
//!     futures::executor::block_on(details.completion),
//!     Some(serde_json::json!("done"))
//! );
//! ```

mod completion;
mod config;
mod error;
mod factory;
mod local_history;
mod navigator;
mod observer;
mod overlay;
mod route;
mod settings;
mod transition;

pub use completion::RouteCompletion;
pub use config::NavigatorConfig;
pub use error::{ConfigError, NavigatorError};
pub use factory::{initial_route_names, RouteFactory};
pub use local_history::{HasLocalHistory, LocalHistory, LocalHistoryEntry, LocalHistoryHandle};
pub use navigator::{ExitReason, Navigator, PushedRoute, RouteFrame};
pub use observer::{
    NavigatorObserver, RouteAware, RouteFilter, RouteObserver, SharedNavigatorObserver, SharedRouteAware,
};
pub use overlay::{EntryRole, Overlay, OverlayEntry, OverlayEntryId};
pub use route::{
    Animated, BasicRoute, Installable, PopDisposition, PopOutcome, Poppable, Route, RouteId, RouteInfo,
    RouteKind, RouteLifecycle,
};
pub use settings::RouteSettings;
pub use transition::{Secondary, TransitionSpec, TransitionState};

pub use presentar_animation as animation;
