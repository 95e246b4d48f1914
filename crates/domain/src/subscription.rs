use std::str::FromStr;

use brandroom_core::{AppError, WorkspaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Plan;

/// Billing status as written by the billing collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid and current.
    Active,
    /// Inside a trial period.
    Trialing,
    /// Payment failed, still in grace.
    PastDue,
    /// Cancelled; entitlements last until the period ends.
    Canceled,
    /// Checkout never completed.
    Incomplete,
    /// Dunning exhausted.
    Unpaid,
}

impl SubscriptionStatus {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
            Self::Unpaid => "unpaid",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "trialing" => Ok(Self::Trialing),
            "past_due" => Ok(Self::PastDue),
            "canceled" => Ok(Self::Canceled),
            "incomplete" => Ok(Self::Incomplete),
            "unpaid" => Ok(Self::Unpaid),
            _ => Err(AppError::Validation(format!(
                "unknown subscription status '{value}'"
            ))),
        }
    }
}

/// Subscription row of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Purchased tier.
    pub plan: Plan,
    /// Billing status.
    pub status: SubscriptionStatus,
    /// Start of the current billing period.
    pub period_start: Option<DateTime<Utc>>,
    /// End of the current billing period.
    pub period_end: Option<DateTime<Utc>>,
    /// Scheduled cancellation instant.
    pub cancel_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Creates the subscription every new workspace starts with.
    #[must_use]
    pub fn free(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            plan: Plan::Free,
            status: SubscriptionStatus::Active,
            period_start: None,
            period_end: None,
            cancel_at: None,
        }
    }

    /// Returns the plan whose ceilings apply at `now`.
    ///
    /// A cancelled subscription keeps its plan until `period_end` (or
    /// `cancel_at` when no period is recorded); every lapsed state falls back
    /// to the free tier.
    #[must_use]
    pub fn effective_plan(&self, now: DateTime<Utc>) -> Plan {
        if let Some(cancel_at) = self.cancel_at
            && cancel_at <= now
        {
            return Plan::Free;
        }

        match self.status {
            SubscriptionStatus::Active
            | SubscriptionStatus::Trialing
            | SubscriptionStatus::PastDue => self.plan,
            SubscriptionStatus::Canceled => {
                let paid_until = self.period_end.or(self.cancel_at);
                match paid_until {
                    Some(until) if until > now => self.plan,
                    _ => Plan::Free,
                }
            }
            SubscriptionStatus::Incomplete | SubscriptionStatus::Unpaid => Plan::Free,
        }
    }
}
