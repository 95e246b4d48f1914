use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Structured payload describing a denied quota check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitDecision {
    /// Quota dimension that was evaluated.
    pub limit_key: String,
    /// Storage value of the plan the decision was made against.
    pub plan: String,
    /// Finite ceiling for the plan and key.
    pub limit: u64,
    /// Usage observed before the request.
    pub current: u64,
    /// Units the request tried to consume.
    pub requested_amount: u64,
}

impl Display for LimitDecision {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "'{}' on plan '{}' allows {} (current {}, requested {})",
            self.limit_key, self.plan, self.limit, self.current, self.requested_amount
        )
    }
}
