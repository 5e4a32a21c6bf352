//! Shared helpers for the CLI crate's integration tests.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Messages of every event emitted while the returned subscriber is active.
#[derive(Clone, Default)]
pub struct RunLog {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RunLog {
    pub fn install() -> (Self, impl tracing::Subscriber + Send + Sync) {
        let log = RunLog::default();
        let subscriber = Registry::default().with(log.clone());
        (log, subscriber)
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.messages().iter().filter(|m| m.contains(needle)).count()
    }

    pub fn saw(&self, needle: &str) -> bool {
        self.count(needle) > 0
    }
}

struct MessageField(Option<String>);

impl Visit for MessageField {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for RunLog {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageField(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.messages.lock().unwrap().push(message);
        }
    }
}
