use std::sync::Arc;

use docsafe_gate::SafeError;
use serde_json::Value;
use tracing::error;

use crate::notify::{Notification, NotificationSink};

pub type ReadyCallback = Box<dyn FnOnce() + Send + 'static>;
pub type ErrorCallback = Box<dyn FnOnce(SafeError) + Send + 'static>;

/// Handlers for a subscription's first outcome.
#[derive(Default)]
pub struct SubscriptionCallbacks {
    pub on_ready: Option<ReadyCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl SubscriptionCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks with only a ready handler.
    pub fn ready<F>(on_ready: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::new().on_ready(on_ready)
    }

    pub fn on_ready<F>(mut self, on_ready: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_ready = Some(Box::new(on_ready));
        self
    }

    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: FnOnce(SafeError) + Send + 'static,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }
}

/// The framework's publish/subscribe primitive.
pub trait SubscriptionTransport {
    /// Handle returned to the caller, e.g. to stop the subscription.
    type Handle;

    fn subscribe(
        &self,
        name: &str,
        args: Vec<Value>,
        callbacks: SubscriptionCallbacks,
    ) -> Self::Handle;
}

/// Subscribe to `name`, surfacing any subscription error as a logged,
/// user-visible notification before the caller's own `on_error` runs.
pub fn subscribe<T>(
    transport: &T,
    sink: Arc<dyn NotificationSink>,
    name: &str,
    args: Vec<Value>,
    callbacks: SubscriptionCallbacks,
) -> T::Handle
where
    T: SubscriptionTransport + ?Sized,
{
    let SubscriptionCallbacks { on_ready, on_error } = callbacks;
    let subscription = name.to_string();

    let wrapped = SubscriptionCallbacks {
        on_ready: Some(Box::new(move || {
            if let Some(on_ready) = on_ready {
                on_ready();
            }
        })),
        on_error: Some(Box::new(move |err: SafeError| {
            error!(subscription = %subscription, error = %err, "subscription failed");
            sink.notify(Notification::failure(
                "Subscription Error",
                format!("Failed to subscribe to '{subscription}'"),
            ));
            if let Some(on_error) = on_error {
                on_error(err);
            }
        })),
    };

    transport.subscribe(name, args, wrapped)
}
