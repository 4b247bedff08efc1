//! Animation primitives for Presentar navigation.
//!
//! This crate provides the values route transitions are drawn from:
//! - Linear controllers: [`Controller`] with [`AnimationStatus`]
//! - Easing curves: [`Easing`]
//! - An owning arena: [`AnimationArena`] holding controllers, constants,
//!   proxies and [`TrainHopping`] composites addressed by [`AnimationId`]
//!
//! Nothing here reads a clock. The host advances time with
//! [`AnimationArena::tick`] and listeners are notified synchronously.

mod arena;
mod controller;
mod easing;
mod error;
mod train_hopping;

pub use arena::{AnimationArena, AnimationId, AnimationKind, ListenerId, StatusListener, ValueListener};
pub use controller::{AnimationStatus, Controller, Direction};
pub use easing::Easing;
pub use error::AnimationError;
pub use train_hopping::{HopMode, TrainHopping};
