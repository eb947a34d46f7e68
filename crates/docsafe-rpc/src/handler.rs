use std::sync::Arc;

use docsafe_gate::{FieldErrorMap, Result, SafeError, CODE_INTERNAL_ERROR};
use serde_json::Value;
use tracing::error;

use crate::notify::{Notification, NotificationSink};

const FAILURE_TITLE: &str = "Operation Failed";

pub type SuccessCallback = Box<dyn Fn(&Value) + Send + Sync + 'static>;

/// Lenient view of a mutating method's result: `{ok, errors?, ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodResult {
    pub ok: bool,
    pub errors: Option<FieldErrorMap>,
    pub value: Value,
}

impl MethodResult {
    /// Read `ok` by truthiness and `errors` when it is a non-empty object.
    /// Non-string error messages are kept as their JSON text.
    pub fn from_value(value: Value) -> Self {
        let ok = value.get("ok").is_some_and(truthy);
        let errors = value
            .get("errors")
            .and_then(Value::as_object)
            .filter(|errors| !errors.is_empty())
            .map(|errors| {
                errors
                    .iter()
                    .map(|(field, message)| {
                        let message = match message {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        (field.clone(), message)
                    })
                    .collect()
            });
        Self { ok, errors, value }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Renders field errors next to the inputs that caused them.
pub trait ErrorTarget: Send + Sync {
    fn on_error(&self, errors: &FieldErrorMap);
}

/// Completion strategy for a method call.
pub trait OkHandler: Send + Sync {
    fn handle(&self, outcome: Result<Value>) -> Result<()>;
}

/// Handler for trusted contexts: failures are logged and raised.
#[derive(Default)]
pub struct TrustedHandler {
    on_success: Option<SuccessCallback>,
}

impl TrustedHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, on_success: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.on_success = Some(Box::new(on_success));
        self
    }
}

impl OkHandler for TrustedHandler {
    fn handle(&self, outcome: Result<Value>) -> Result<()> {
        let value = match outcome {
            Ok(value) => value,
            Err(err) => {
                error!(code = err.code(), details = ?err.details(), "method failed");
                return Err(err);
            }
        };

        let result = MethodResult::from_value(value);
        if !result.ok {
            let rendered = result.value.to_string();
            error!(result = %rendered, "method reported not ok");
            return Err(SafeError::method(
                CODE_INTERNAL_ERROR,
                "operation reported not ok",
                Some(rendered),
            ));
        }

        if let Some(on_success) = &self.on_success {
            on_success(&result.value);
        }
        Ok(())
    }
}

/// Handler for user-facing contexts: failures become notifications or
/// field errors and are never raised.
pub struct UserFacingHandler {
    sink: Arc<dyn NotificationSink>,
    target: Option<Arc<dyn ErrorTarget>>,
    on_success: Option<SuccessCallback>,
}

impl UserFacingHandler {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            target: None,
            on_success: None,
        }
    }

    pub fn with_target(mut self, target: Arc<dyn ErrorTarget>) -> Self {
        self.target = Some(target);
        self
    }

    pub fn on_success<F>(mut self, on_success: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.on_success = Some(Box::new(on_success));
        self
    }

    /// Adapt into a callback for [`crate::call`].
    pub fn into_callback(self) -> impl FnOnce(Result<Value>) + Send + 'static {
        move |outcome| {
            let _ = self.handle(outcome);
        }
    }

    fn report(&self, description: impl Into<String>) {
        self.sink
            .notify(Notification::failure(FAILURE_TITLE, description));
    }

    fn report_field_errors(&self, errors: &FieldErrorMap) {
        error!(?errors, "validation failed");
        match &self.target {
            Some(target) => target.on_error(errors),
            None => self.report("Validation error"),
        }
    }
}

impl OkHandler for UserFacingHandler {
    fn handle(&self, outcome: Result<Value>) -> Result<()> {
        let value = match outcome {
            Ok(value) => value,
            Err(SafeError::ValidationFailed { details, .. }) => {
                self.report_field_errors(&details);
                return Ok(());
            }
            Err(err) => {
                error!(code = err.code(), error = %err, "method failed");
                let details = err.details().unwrap_or_default();
                self.report(format!("{}, {}", err.reason(), details));
                return Ok(());
            }
        };

        let result = MethodResult::from_value(value);
        if let Some(errors) = &result.errors {
            self.report_field_errors(errors);
        } else if !result.ok {
            error!(result = %result.value, "method reported not ok");
            self.report("Bad result");
        } else if let Some(on_success) = &self.on_success {
            on_success(&result.value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::testing::{RecordingSink, RecordingTarget};

    fn successes() -> (Arc<Mutex<Vec<Value>>>, impl Fn(&Value) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |value: &Value| sink.lock().unwrap().push(value.clone()))
    }

    fn field_errors(pairs: &[(&str, &str)]) -> FieldErrorMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn method_result_reads_truthiness() {
        assert!(MethodResult::from_value(json!({"ok": true})).ok);
        assert!(MethodResult::from_value(json!({"ok": 1})).ok);
        assert!(MethodResult::from_value(json!({"ok": "yes"})).ok);
        assert!(!MethodResult::from_value(json!({"ok": 0})).ok);
        assert!(!MethodResult::from_value(json!({"ok": ""})).ok);
        assert!(!MethodResult::from_value(json!({})).ok);
        assert!(!MethodResult::from_value(json!(null)).ok);
    }

    #[test]
    fn method_result_reads_errors() {
        let result = MethodResult::from_value(json!({"ok": false, "errors": {"a": "bad", "b": 3}}));
        assert_eq!(result.errors, Some(field_errors(&[("a", "bad"), ("b", "3")])));

        assert_eq!(MethodResult::from_value(json!({"errors": {}})).errors, None);
        assert_eq!(MethodResult::from_value(json!({"errors": "x"})).errors, None);
    }

    #[test]
    fn trusted_runs_success_callback() {
        let (seen, on_success) = successes();
        let handler = TrustedHandler::new().on_success(on_success);

        assert_eq!(handler.handle(Ok(json!({"ok": true, "id": 4}))), Ok(()));
        assert_eq!(*seen.lock().unwrap(), vec![json!({"ok": true, "id": 4})]);
    }

    #[test]
    fn trusted_reraises_errors() {
        let handler = TrustedHandler::new();
        assert_eq!(
            handler.handle(Err(SafeError::forbidden("no"))),
            Err(SafeError::forbidden("no"))
        );
    }

    #[test]
    fn trusted_raises_internal_error_when_not_ok() {
        let (seen, on_success) = successes();
        let handler = TrustedHandler::new().on_success(on_success);

        let err = handler.handle(Ok(json!({"ok": false}))).unwrap_err();
        assert_eq!(err.code(), "internal-error");
        assert_eq!(err.reason(), "operation reported not ok");
        assert_eq!(err.details().as_deref(), Some(r#"{"ok":false}"#));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn user_facing_runs_success_callback() {
        let sink = Arc::new(RecordingSink::default());
        let (seen, on_success) = successes();
        let handler = UserFacingHandler::new(sink.clone()).on_success(on_success);

        assert_eq!(handler.handle(Ok(json!({"ok": true}))), Ok(()));
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(sink.notifications().is_empty());
    }

    #[test]
    fn user_facing_notifies_other_errors() {
        let sink = Arc::new(RecordingSink::default());
        let handler = UserFacingHandler::new(sink.clone());

        assert_eq!(
            handler.handle(Err(SafeError::forbidden("You must be logged in"))),
            Ok(())
        );
        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "Operation Failed");
        assert_eq!(notifications[0].description, "Forbidden, You must be logged in");
    }

    #[test]
    fn user_facing_routes_validation_errors_to_target() {
        let sink = Arc::new(RecordingSink::default());
        let target = Arc::new(RecordingTarget::default());
        let handler = UserFacingHandler::new(sink.clone()).with_target(target.clone());
        let errors = field_errors(&[("title", "title is required")]);

        handler
            .handle(Err(SafeError::validation_failed(errors.clone())))
            .unwrap();
        handler
            .handle(Ok(json!({"ok": false, "errors": {"title": "title is required"}})))
            .unwrap();

        assert_eq!(target.rendered(), vec![errors.clone(), errors]);
        assert!(sink.notifications().is_empty());
    }

    #[test]
    fn user_facing_without_target_sends_one_generic_notification() {
        let sink = Arc::new(RecordingSink::default());
        let handler = UserFacingHandler::new(sink.clone());

        handler
            .handle(Ok(json!({"ok": false, "errors": {"a": "x", "b": "y"}})))
            .unwrap();

        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].description, "Validation error");
    }

    #[test]
    fn user_facing_validation_error_without_target_notifies_once() {
        let sink = Arc::new(RecordingSink::default());
        let handler = UserFacingHandler::new(sink.clone());
        let errors = field_errors(&[("title", "title is required"), ("views", "bad")]);

        assert_eq!(
            handler.handle(Err(SafeError::validation_failed(errors))),
            Ok(())
        );

        let notifications = sink.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "Operation Failed");
        assert_eq!(notifications[0].description, "Validation error");
    }

    #[test]
    fn user_facing_reports_bad_result() {
        let sink = Arc::new(RecordingSink::default());
        let (seen, on_success) = successes();
        let handler = UserFacingHandler::new(sink.clone()).on_success(on_success);

        handler.handle(Ok(json!({"ok": false}))).unwrap();

        assert_eq!(sink.notifications()[0].description, "Bad result");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn user_facing_handler_plugs_into_call() {
        struct Reply;
        impl crate::RpcTransport for Reply {
            fn call(&self, _: &str, _: Vec<Value>, callback: crate::RpcCallback) -> Result<()> {
                callback(Ok(json!({"ok": 0})));
                Ok(())
            }
        }

        let sink = Arc::new(RecordingSink::default());
        crate::call(
            &Reply,
            "tasks.insert",
            vec![],
            UserFacingHandler::new(sink.clone()).into_callback(),
        );
        assert_eq!(sink.notifications()[0].description, "Bad result");
    }
}
