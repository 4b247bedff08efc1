//! Error types for presentar-navigator.

use crate::route::RouteId;
use thiserror::Error;

/// Errors returned by stack operations on a [`Navigator`](crate::Navigator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigatorError {
    /// The navigator holds no routes.
    #[error("navigator has no routes")]
    EmptyStack,

    /// Popping would leave the stack empty.
    #[error("cannot pop the last route")]
    CannotPopLastRoute,

    /// Removing would leave the stack empty.
    #[error("cannot remove the last route")]
    CannotRemoveLastRoute,

    /// The route exists but is not one of the present routes.
    #[error("{0} is not on the stack")]
    RouteNotInStack(RouteId),

    /// The route has already been disposed.
    #[error("{0} has been disposed")]
    RouteDisposed(RouteId),

    /// The anchor is the bottom route.
    #[error("no route below {0}")]
    NoRouteBelow(RouteId),

    /// Neither factory produced a route for this name.
    #[error("no route named {0:?}")]
    UnknownRoute(String),

    /// A named operation was used without a route factory.
    #[error("no route factory configured")]
    NoRouteFactory,

    /// Animations were still running after the frame limit.
    #[error("navigator did not settle within {0} frames")]
    DidNotSettle(u32),
}

/// Errors loading a [`NavigatorConfig`](crate::NavigatorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}
