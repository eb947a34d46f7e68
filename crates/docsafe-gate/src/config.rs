/// How the gate delivers a validation failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Raise `SafeError::ValidationFailed` carrying the field errors.
    #[default]
    Raise,
    /// Return the field errors as a value. Kept for callers written against
    /// the older return-value convention.
    Return,
}

/// Controls [`crate::ValidationGate`] behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateConfig {
    pub failure_mode: FailureMode,
}
