// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::event::DomainEvent;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Outbound channel for domain events.
///
/// Publishing is fire-and-forget: the caller neither waits for nor depends
/// on delivery.
pub trait EventBus: Send + Sync {
    /// Publishes one event.
    fn publish(&self, event: DomainEvent);
}

/// A bus that keeps every published event in memory.
///
/// Used by tests to assert exactly which events were published, and by the
/// server to expose recent events.
#[derive(Debug, Default)]
pub struct RecordingEventBus {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingEventBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every event published so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drains the recorded events.
    pub fn take(&self) -> Vec<DomainEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventBus for RecordingEventBus {
    fn publish(&self, event: DomainEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// A bus that writes every event to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventBus;

impl EventBus for TracingEventBus {
    fn publish(&self, event: DomainEvent) {
        info!(kind = event.kind(), event = ?event, "Domain event published");
    }
}

impl<T: EventBus + ?Sized> EventBus for std::sync::Arc<T> {
    fn publish(&self, event: DomainEvent) {
        (**self).publish(event);
    }
}
