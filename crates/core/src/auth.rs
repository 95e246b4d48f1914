use serde::{Deserialize, Serialize};

use crate::UserId;

/// Authenticated caller attached to every protected request.
///
/// Authentication happens upstream; the identity collaborator only hands over
/// the stable user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: UserId,
}

impl UserIdentity {
    /// Creates a user identity for an authenticated user id.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
