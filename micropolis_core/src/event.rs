// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::{Arc, Condvar, Mutex};

// Maximum number of outstanding dependencies a single wait list can carry
pub const MAX_WAIT_EVENTS: usize = 16;

struct EventState {
    name: &'static str,
    signaled: Mutex<bool>,
    condvar: Condvar,
}

/// Read side of a readiness signal.
///
/// A null event (the default) is always complete. Cloning an event shares the
/// underlying signal, so every clone observes the same completion.
#[derive(Clone, Default)]
pub struct Event(Option<Arc<EventState>>);

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(state) => write!(f, "Event({:?}, complete: {})", state.name, self.is_complete()),
            None => write!(f, "Event(null)"),
        }
    }
}

impl Event {
    pub fn null() -> Self {
        Self(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    pub fn name(&self) -> &'static str {
        match &self.0 {
            Some(state) => state.name,
            None => "null",
        }
    }

    pub fn is_complete(&self) -> bool {
        match &self.0 {
            Some(state) => *lock_signaled(state),
            None => true,
        }
    }

    pub fn wait(&self) {
        if let Some(state) = &self.0 {
            let mut signaled = lock_signaled(state);
            while !*signaled {
                signaled = match state.condvar.wait(signaled) {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
            }
        }
    }

    pub fn same_signal(&self, other: &Event) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

fn lock_signaled(state: &EventState) -> std::sync::MutexGuard<'_, bool> {
    // A panicking signaller can't leave the flag half-written, it's a plain bool
    match state.signaled.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Write side of a readiness signal, owned by whoever produces the data.
pub struct UserEvent {
    event: Event,
}

impl UserEvent {
    pub fn new(name: &'static str) -> Self {
        Self {
            event: Event(Some(Arc::new(EventState {
                name,
                signaled: Mutex::new(false),
                condvar: Condvar::new(),
            }))),
        }
    }

    pub fn event(&self) -> Event {
        self.event.clone()
    }

    pub fn signal(&self) {
        if let Some(state) = &self.event.0 {
            let mut signaled = lock_signaled(state);
            *signaled = true;
            state.condvar.notify_all();
        }
    }
}

impl Drop for UserEvent {
    fn drop(&mut self) {
        // Dropping the producer must never leave a consumer waiting forever
        if !self.event.is_complete() {
            log::trace!("user event {:?} dropped unsignaled", self.event.name());
            self.signal();
        }
    }
}

/// Fixed capacity set of events, complete when every member is complete.
#[derive(Clone, Default, Debug)]
pub struct WaitList {
    events: [Event; MAX_WAIT_EVENTS],
    count: usize,
}

impl WaitList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_event(event: &Event) -> Self {
        let mut wait_list = Self::new();
        wait_list.push(event);
        wait_list
    }

    pub fn and(mut self, event: &Event) -> Self {
        self.push(event);
        self
    }

    pub fn push(&mut self, event: &Event) {
        if event.is_complete() || self.contains(event) {
            return;
        }

        if self.count == MAX_WAIT_EVENTS {
            self.retire_complete();
        }
        if self.count == MAX_WAIT_EVENTS {
            // Still full, so block on the oldest dependency to free its slot
            log::trace!("wait list full, waiting on {:?}", self.events[0].name());
            self.events[0].wait();
            self.retire_complete();
        }

        self.events[self.count] = event.clone();
        self.count += 1;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_complete(&self) -> bool {
        self.events[..self.count].iter().all(|event| event.is_complete())
    }

    pub fn wait(&self) {
        for event in &self.events[..self.count] {
            event.wait();
        }
    }

    fn contains(&self, event: &Event) -> bool {
        self.events[..self.count].iter().any(|e| e.same_signal(event))
    }

    fn retire_complete(&mut self) {
        let mut write = 0;
        for read in 0..self.count {
            if !self.events[read].is_complete() {
                self.events.swap(write, read);
                write += 1;
            }
        }
        for event in &mut self.events[write..self.count] {
            *event = Event::null();
        }
        self.count = write;
    }
}

impl From<&Event> for WaitList {
    fn from(event: &Event) -> Self {
        Self::from_event(event)
    }
}
