use std::sync::{Arc, Mutex, PoisonError};

use docsafe_gate::Result;
use serde_json::Value;
use tracing::{debug, warn};

/// Completion callback for a remote method: the error or the method result.
pub type RpcCallback = Box<dyn FnOnce(Result<Value>) + Send + 'static>;

/// The framework's remote method invocation primitive.
pub trait RpcTransport {
    /// Start a call of `name`. The transport reports failures either by
    /// running `callback` with an error or by returning `Err` right away.
    fn call(&self, name: &str, args: Vec<Value>, callback: RpcCallback) -> Result<()>;
}

impl<T: RpcTransport + ?Sized> RpcTransport for Arc<T> {
    fn call(&self, name: &str, args: Vec<Value>, callback: RpcCallback) -> Result<()> {
        (**self).call(name, args, callback)
    }
}

type CallbackSlot = Arc<Mutex<Option<RpcCallback>>>;

/// Call `name` and deliver every outcome through `callback`.
///
/// An error the transport returns synchronously is routed into `callback`
/// instead of propagating. `callback` runs at most once even if the transport
/// both invokes it and returns an error.
pub fn call<T, F>(transport: &T, name: &str, args: Vec<Value>, callback: F)
where
    T: RpcTransport + ?Sized,
    F: FnOnce(Result<Value>) + Send + 'static,
{
    let slot: CallbackSlot = Arc::new(Mutex::new(Some(Box::new(callback) as RpcCallback)));
    let forwarded = Arc::clone(&slot);

    debug!(method = name, "calling method");
    let started = transport.call(
        name,
        args,
        Box::new(move |outcome| {
            if let Some(callback) = take(&forwarded) {
                callback(outcome);
            }
        }),
    );

    if let Err(err) = started {
        warn!(method = name, error = %err, "method call failed before dispatch");
        if let Some(callback) = take(&slot) {
            callback(Err(err));
        }
    }
}

/// Call `name` and await its outcome.
#[cfg(feature = "async")]
pub async fn call_async<T>(transport: &T, name: &str, args: Vec<Value>) -> Result<Value>
where
    T: RpcTransport + ?Sized,
{
    let (tx, rx) = tokio::sync::oneshot::channel();
    call(transport, name, args, move |outcome| {
        let _ = tx.send(outcome);
    });
    rx.await.unwrap_or_else(|_| {
        Err(docsafe_gate::SafeError::Transport(format!(
            "method '{name}' completed without a result"
        )))
    })
}

fn take(slot: &CallbackSlot) -> Option<RpcCallback> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}
