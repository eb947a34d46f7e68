//! Wrappers around a host framework's method-call and subscription
//! primitives, plus completion strategies for mutating methods.
//!
//! The host supplies an [`RpcTransport`], a [`SubscriptionTransport`] and a
//! [`NotificationSink`]; the composition root picks [`TrustedHandler`] or
//! [`UserFacingHandler`] depending on where the code runs.

pub mod call;
pub mod handler;
pub mod notify;
pub mod subscribe;

#[cfg(test)]
mod testing;

pub use call::{call, RpcCallback, RpcTransport};
#[cfg(feature = "async")]
pub use call::call_async;
pub use handler::{
    ErrorTarget, MethodResult, OkHandler, SuccessCallback, TrustedHandler, UserFacingHandler,
};
pub use notify::{Feeling, LogSink, Notification, NotificationSink};
pub use subscribe::{
    subscribe, ErrorCallback, ReadyCallback, SubscriptionCallbacks, SubscriptionTransport,
};
