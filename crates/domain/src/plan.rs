use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::num::NonZeroU64;
use std::str::FromStr;

use brandroom_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Subscription tier of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    /// Default tier; also used when no subscription row exists.
    Free,
    /// Paid tier for small teams.
    Pro,
    /// Paid tier for agencies.
    Business,
    /// Contracted tier without ceilings.
    Enterprise,
}

impl Plan {
    /// Returns all plans from lowest to highest tier.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Plan] = &[Plan::Free, Plan::Pro, Plan::Business, Plan::Enterprise];

        ALL
    }

    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Business => "business",
            Self::Enterprise => "enterprise",
        }
    }
}

impl Display for Plan {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "business" => Ok(Self::Business),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(AppError::Validation(format!("unknown plan '{value}'"))),
        }
    }
}

/// Identifier of one quota dimension, e.g. `brand.maxCount`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LimitKey(String);

impl LimitKey {
    /// Maximum number of brands in a workspace.
    pub const BRAND_MAX_COUNT: &'static str = "brand.maxCount";
    /// Maximum number of social accounts connected to one brand.
    pub const SOCIAL_ACCOUNT_MAX_COUNT_PER_BRAND: &'static str = "socialAccount.maxCountPerBrand";
    /// Maximum number of workspace members.
    pub const MEMBER_MAX_COUNT: &'static str = "member.maxCount";
    /// Maximum number of posts waiting to be published.
    pub const POST_MAX_SCHEDULED: &'static str = "post.maxScheduled";

    /// Creates a limit key from its transport value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() || value.starts_with('.') {
            return Err(AppError::Validation(format!(
                "invalid limit key '{value}'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the stable string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the usage resource this key counts: the segment before the first `.`.
    #[must_use]
    pub fn resource_key(&self) -> &str {
        self.0.split('.').next().unwrap_or(self.0.as_str())
    }
}

impl Display for LimitKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Ceiling for one plan and limit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitValue {
    /// A finite, positive ceiling.
    Limited(NonZeroU64),
    /// No ceiling; never compared numerically.
    Unlimited,
}

impl LimitValue {
    /// Creates a finite ceiling, rejecting zero.
    pub fn limited(value: u64) -> AppResult<Self> {
        NonZeroU64::new(value)
            .map(Self::Limited)
            .ok_or_else(|| AppError::Validation("plan limits must be positive".to_owned()))
    }

    /// Returns whether this is the unlimited sentinel.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Returns the finite ceiling, `None` standing for unbounded.
    #[must_use]
    pub fn numeric(&self) -> Option<NonZeroU64> {
        match self {
            Self::Limited(value) => Some(*value),
            Self::Unlimited => None,
        }
    }

    /// Returns whether consuming `amount` more units on top of `current` stays within the ceiling.
    #[must_use]
    pub fn admits(&self, current: u64, amount: u64) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(limit) => current.saturating_add(amount) <= limit.get(),
        }
    }
}

const fn limited(value: u64) -> LimitValue {
    match NonZeroU64::new(value) {
        Some(value) => LimitValue::Limited(value),
        None => panic!("standard plan limits must be positive"),
    }
}

const UNLIMITED: LimitValue = LimitValue::Unlimited;

/// Ceilings per plan in `Plan::all()` order: free, pro, business, enterprise.
const STANDARD_LIMITS: &[(&str, [LimitValue; 4])] = &[
    (
        LimitKey::BRAND_MAX_COUNT,
        [limited(1), limited(5), limited(25), UNLIMITED],
    ),
    (
        LimitKey::SOCIAL_ACCOUNT_MAX_COUNT_PER_BRAND,
        [limited(3), limited(10), limited(25), UNLIMITED],
    ),
    (
        LimitKey::MEMBER_MAX_COUNT,
        [limited(1), limited(5), limited(20), UNLIMITED],
    ),
    (
        LimitKey::POST_MAX_SCHEDULED,
        [limited(10), limited(500), UNLIMITED, UNLIMITED],
    ),
];

/// One ordered row of a plan's limit table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLimitEntry {
    /// Quota dimension.
    pub key: LimitKey,
    /// Ceiling for the dimension.
    pub value: LimitValue,
}

/// Immutable mapping of subscription tier to quota ceilings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    tables: HashMap<Plan, Vec<PlanLimitEntry>>,
    known_keys: BTreeSet<String>,
}

impl PlanCatalog {
    /// Builds a catalog from explicit per-plan tables.
    pub fn new(tables: Vec<(Plan, Vec<PlanLimitEntry>)>) -> AppResult<Self> {
        let mut by_plan = HashMap::new();
        let mut known_keys = BTreeSet::new();

        for (plan, entries) in tables {
            let mut seen = HashSet::new();
            for entry in &entries {
                if !seen.insert(entry.key.as_str().to_owned()) {
                    return Err(AppError::Validation(format!(
                        "plan '{plan}' declares limit '{}' more than once",
                        entry.key
                    )));
                }
                known_keys.insert(entry.key.as_str().to_owned());
            }

            if by_plan.insert(plan, entries).is_some() {
                return Err(AppError::Validation(format!(
                    "plan '{plan}' is declared more than once"
                )));
            }
        }

        Ok(Self {
            tables: by_plan,
            known_keys,
        })
    }

    /// Returns the catalog shipped with the product.
    #[must_use]
    pub fn standard() -> Self {
        let mut tables: HashMap<Plan, Vec<PlanLimitEntry>> = HashMap::new();
        let mut known_keys = BTreeSet::new();

        for (key, values) in STANDARD_LIMITS {
            known_keys.insert((*key).to_owned());
            for (plan, value) in Plan::all().iter().zip(values.iter()) {
                tables.entry(*plan).or_default().push(PlanLimitEntry {
                    key: LimitKey((*key).to_owned()),
                    value: *value,
                });
            }
        }

        Self { tables, known_keys }
    }

    /// Returns the ceiling for a plan and key.
    ///
    /// A key the plan does not declare is unlimited, so introducing a new key
    /// never blocks existing workspaces.
    #[must_use]
    pub fn limit(&self, plan: Plan, key: &str) -> LimitValue {
        self.tables
            .get(&plan)
            .and_then(|entries| entries.iter().find(|entry| entry.key.as_str() == key))
            .map(|entry| entry.value)
            .unwrap_or(LimitValue::Unlimited)
    }

    /// Returns whether the plan has no ceiling for the key.
    #[must_use]
    pub fn is_unlimited(&self, plan: Plan, key: &str) -> bool {
        self.limit(plan, key).is_unlimited()
    }

    /// Returns the finite ceiling for the key, `None` standing for unbounded.
    #[must_use]
    pub fn numeric_limit(&self, plan: Plan, key: &str) -> Option<NonZeroU64> {
        self.limit(plan, key).numeric()
    }

    /// Returns whether any plan declares the key.
    #[must_use]
    pub fn knows_key(&self, key: &str) -> bool {
        self.known_keys.contains(key)
    }

    /// Returns every key declared by at least one plan, sorted.
    pub fn known_keys(&self) -> impl Iterator<Item = &str> {
        self.known_keys.iter().map(String::as_str)
    }

    /// Returns the ordered limit table of a plan.
    #[must_use]
    pub fn limits_for(&self, plan: Plan) -> &[PlanLimitEntry] {
        self.tables
            .get(&plan)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{LimitKey, LimitValue, Plan, PlanCatalog, PlanLimitEntry};

    #[test]
    fn every_known_limit_is_positive_or_unbounded() {
        let catalog = PlanCatalog::standard();

        for plan in Plan::all() {
            for key in catalog.known_keys() {
                match catalog.numeric_limit(*plan, key) {
                    Some(limit) => assert!(limit.get() > 0),
                    None => assert!(catalog.is_unlimited(*plan, key)),
                }
            }
        }
    }

    #[test]
    fn free_plan_allows_one_brand() {
        let catalog = PlanCatalog::standard();
        let limit = catalog.numeric_limit(Plan::Free, LimitKey::BRAND_MAX_COUNT);

        assert_eq!(limit.map(|value| value.get()), Some(1));
    }

    #[test]
    fn enterprise_plan_is_unlimited_for_every_key() {
        let catalog = PlanCatalog::standard();
        assert!(
            catalog
                .known_keys()
                .all(|key| catalog.is_unlimited(Plan::Enterprise, key))
        );
    }

    #[test]
    fn unknown_key_defaults_to_unlimited() {
        let catalog = PlanCatalog::standard();

        assert!(!catalog.knows_key("storage.maxBytes"));
        assert_eq!(
            catalog.limit(Plan::Free, "storage.maxBytes"),
            LimitValue::Unlimited
        );
    }

    #[test]
    fn plan_table_keeps_declaration_order() {
        let catalog = PlanCatalog::standard();
        let keys = catalog
            .limits_for(Plan::Pro)
            .iter()
            .map(|entry| entry.key.as_str())
            .collect::<Vec<_>>();

        assert_eq!(
            keys,
            vec![
                LimitKey::BRAND_MAX_COUNT,
                LimitKey::SOCIAL_ACCOUNT_MAX_COUNT_PER_BRAND,
                LimitKey::MEMBER_MAX_COUNT,
                LimitKey::POST_MAX_SCHEDULED,
            ]
        );
    }

    #[test]
    fn custom_catalog_rejects_duplicate_keys() {
        let key = LimitKey::new("brand.maxCount").unwrap_or_else(|_| panic!("valid key"));
        let value = LimitValue::limited(2).unwrap_or_else(|_| panic!("positive limit"));
        let catalog = PlanCatalog::new(vec![(
            Plan::Free,
            vec![
                PlanLimitEntry {
                    key: key.clone(),
                    value,
                },
                PlanLimitEntry { key, value },
            ],
        )]);

        assert!(catalog.is_err());
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert!(LimitValue::limited(0).is_err());
    }

    #[test]
    fn resource_key_is_prefix_segment() {
        let key = LimitKey::new("socialAccount.maxCountPerBrand")
            .unwrap_or_else(|_| panic!("valid key"));
        assert_eq!(key.resource_key(), "socialAccount");
    }

    proptest! {
        #[test]
        fn unlimited_admits_any_amount(current in any::<u64>(), amount in any::<u64>()) {
            prop_assert!(LimitValue::Unlimited.admits(current, amount));
        }

        #[test]
        fn limited_admits_exactly_up_to_ceiling(
            limit in 1_u64..10_000,
            current in 0_u64..20_000,
            amount in 0_u64..20_000,
        ) {
            let value = LimitValue::limited(limit).unwrap_or(LimitValue::Unlimited);
            prop_assert_eq!(value.admits(current, amount), current + amount <= limit);
        }
    }
}
