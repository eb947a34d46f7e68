use std::sync::Mutex;

use docsafe_gate::FieldErrorMap;

use crate::handler::ErrorTarget;
use crate::notify::{Notification, NotificationSink};

#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) seen: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub(crate) struct RecordingTarget {
    pub(crate) seen: Mutex<Vec<FieldErrorMap>>,
}

impl RecordingTarget {
    pub(crate) fn rendered(&self) -> Vec<FieldErrorMap> {
        self.seen.lock().unwrap().clone()
    }
}

impl ErrorTarget for RecordingTarget {
    fn on_error(&self, errors: &FieldErrorMap) {
        self.seen.lock().unwrap().push(errors.clone());
    }
}
