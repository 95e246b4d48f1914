//! Subscription-tier quota enforcement.
//!
//! [`LimitEnforcer`] is the pure decision; [`LimitService`] resolves the plan
//! and usage around it; [`EnforcementGuard`] adapts both to request handling.
//!
//! The check is not atomic with the write that consumes the quota. Two
//! concurrent requests can both pass and exceed a ceiling by one. Folding the
//! count and the insert into one serializable transaction would close that
//! window; it is not done here.

mod enforcer;
mod guard;
mod ports;
mod service;

pub use enforcer::{LimitCheck, LimitEnforcer, LimitOutcome};
pub use guard::{
    DefaultLimitContext, EnforcementGuard, LimitContext, LimitContextResolver, LimitScope,
};
pub use ports::{SubscriptionRepository, UsageCounter};
pub use service::{CheckLimitInput, LimitService, LimitUsage, UsageReport};
