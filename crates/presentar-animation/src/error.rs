//! Error types for presentar-animation.

use crate::arena::AnimationId;
use thiserror::Error;

/// Errors raised by [`AnimationArena`](crate::AnimationArena) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    /// The id was never allocated or has been released.
    #[error("unknown animation {0}")]
    UnknownAnimation(AnimationId),

    /// A controller operation was aimed at a derived node.
    #[error("animation {0} is not a controller")]
    NotAController(AnimationId),

    /// A parent was set on something other than a proxy.
    #[error("animation {0} is not a proxy")]
    NotAProxy(AnimationId),

    /// The new parent already reads through the proxy.
    #[error("parenting {proxy} to {parent} would form a cycle")]
    WouldCycle {
        proxy: AnimationId,
        parent: AnimationId,
    },
}
