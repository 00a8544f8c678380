// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Actors, outbound domain events and the bus they are published on.
//!
//! The workflow core guarantees *what* is published and *when*. Delivery is
//! the concern of whoever consumes the bus.

mod bus;
mod event;

#[cfg(test)]
mod tests;

pub use bus::{EventBus, RecordingEventBus, TracingEventBus};
pub use event::{DomainEvent, ResourceKind, ResourceRef};

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
/// This could be a user or a system process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "user", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// Creates an actor for a directory user.
    #[must_use]
    pub fn user(uid: &str) -> Self {
        Self::new(uid.to_string(), String::from("user"))
    }

    /// The actor used for changes driven by the workflow itself.
    #[must_use]
    pub fn system() -> Self {
        Self::new(String::from("system"), String::from("system"))
    }

    /// Returns the user identifier recorded in history, `None` for the system.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        (self.actor_type == "user").then_some(self.id.as_str())
    }
}
