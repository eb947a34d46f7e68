use crate::error::{Result, SafeError};

/// Details attached to the error raised for anonymous callers.
pub const LOGIN_REQUIRED: &str = "You must be logged in";

/// Access to the identity of the caller of the current method or
/// subscription.
pub trait IdentityContext {
    /// Authenticated user id, if any.
    fn user_id(&self) -> Option<&str>;
}

/// Plain call context carrying an optional authenticated user id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    pub user_id: Option<String>,
}

impl CallContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }
}

impl IdentityContext for CallContext {
    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

/// Raise [`SafeError::Forbidden`] unless the caller is authenticated.
pub fn check_logged_in<C: IdentityContext + ?Sized>(ctx: &C) -> Result<()> {
    require_user(ctx).map(|_| ())
}

/// The authenticated user id, or [`SafeError::Forbidden`].
pub fn require_user<C: IdentityContext + ?Sized>(ctx: &C) -> Result<&str> {
    ctx.user_id()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SafeError::forbidden(LOGIN_REQUIRED))
}
