use std::collections::HashSet;
use std::str::FromStr;

use brandroom_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Stable permission key values recognised by the standard registry.
pub mod permission_keys {
    /// Allows editing workspace settings.
    pub const WORKSPACE_SETTINGS_MANAGE: &str = "workspace.settings.manage";
    /// Allows inviting, re-roling and removing workspace members.
    pub const WORKSPACE_MEMBER_MANAGE: &str = "workspace.member.manage";
    /// Allows managing the workspace subscription.
    pub const BILLING_MANAGE: &str = "billing.manage";
    /// Allows reading brands.
    pub const BRAND_VIEW: &str = "brand.view";
    /// Allows creating, updating and deleting brands.
    pub const BRAND_MANAGE: &str = "brand.manage";
    /// Allows reading connected social accounts.
    pub const SOCIAL_ACCOUNT_VIEW: &str = "social_account.view";
    /// Allows connecting and disconnecting social accounts.
    pub const SOCIAL_ACCOUNT_MANAGE: &str = "social_account.manage";
    /// Allows drafting content.
    pub const CONTENT_CREATE: &str = "content.create";
    /// Allows publishing or scheduling content.
    pub const CONTENT_PUBLISH: &str = "content.publish";
}

use permission_keys::{
    BILLING_MANAGE, BRAND_MANAGE, BRAND_VIEW, CONTENT_CREATE, CONTENT_PUBLISH,
    SOCIAL_ACCOUNT_MANAGE, SOCIAL_ACCOUNT_VIEW, WORKSPACE_MEMBER_MANAGE,
    WORKSPACE_SETTINGS_MANAGE,
};

const STANDARD_PERMISSIONS: &[(&str, &str)] = &[
    (WORKSPACE_SETTINGS_MANAGE, "Manage workspace settings"),
    (WORKSPACE_MEMBER_MANAGE, "Invite and manage workspace members"),
    (BILLING_MANAGE, "Manage the workspace subscription"),
    (BRAND_VIEW, "View brands"),
    (BRAND_MANAGE, "Create and manage brands"),
    (SOCIAL_ACCOUNT_VIEW, "View connected social accounts"),
    (SOCIAL_ACCOUNT_MANAGE, "Connect and manage social accounts"),
    (CONTENT_CREATE, "Draft content"),
    (CONTENT_PUBLISH, "Publish and schedule content"),
];

const ADMIN_PERMISSION_KEYS: &[&str] = &[
    WORKSPACE_SETTINGS_MANAGE,
    BRAND_VIEW,
    CONTENT_CREATE,
    CONTENT_PUBLISH,
];

const MEMBER_PERMISSION_KEYS: &[&str] = &[BRAND_VIEW, SOCIAL_ACCOUNT_VIEW];

/// One catalog entry of the permission registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    key: String,
    description: String,
}

impl PermissionDefinition {
    /// Creates a permission definition.
    #[must_use]
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
        }
    }

    /// Returns the stable permission key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the human readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }
}

/// Immutable, ordered catalog of every recognised permission key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRegistry {
    definitions: Vec<PermissionDefinition>,
}

impl PermissionRegistry {
    /// Builds a registry from explicit definitions, keeping their order.
    pub fn new(definitions: Vec<PermissionDefinition>) -> AppResult<Self> {
        let mut seen = HashSet::new();

        for definition in &definitions {
            if definition.key.trim().is_empty() {
                return Err(AppError::Validation(
                    "permission key must not be empty".to_owned(),
                ));
            }

            if !seen.insert(definition.key.as_str()) {
                return Err(AppError::Validation(format!(
                    "duplicate permission key '{}'",
                    definition.key
                )));
            }
        }

        Ok(Self { definitions })
    }

    /// Returns the registry shipped with the product.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            definitions: STANDARD_PERMISSIONS
                .iter()
                .map(|(key, description)| PermissionDefinition::new(*key, *description))
                .collect(),
        }
    }

    /// Returns all definitions in stable order.
    #[must_use]
    pub fn definitions(&self) -> &[PermissionDefinition] {
        self.definitions.as_slice()
    }

    /// Returns every permission key in stable order.
    #[must_use]
    pub fn all_permission_keys(&self) -> Vec<&str> {
        self.definitions
            .iter()
            .map(PermissionDefinition::key)
            .collect()
    }

    /// Returns whether the key is part of the registry.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.definitions.iter().any(|definition| definition.key == key)
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Permission grant policy of a built-in role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionSubset {
    /// Every key in the registry.
    All,
    /// A fixed list of named keys.
    Named(&'static [&'static str]),
}

/// Roles materialised for every workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltInRole {
    /// Full control over the workspace.
    Owner,
    /// Day-to-day administration.
    Admin,
    /// Read-mostly collaborator.
    Member,
}

impl BuiltInRole {
    /// Returns all built-in roles in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[BuiltInRole] = &[BuiltInRole::Owner, BuiltInRole::Admin, BuiltInRole::Member];

        ALL
    }

    /// Returns the role key stored on the workspace role row.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Owner => "workspace-owner",
            Self::Admin => "workspace-admin",
            Self::Member => "workspace-member",
        }
    }

    /// Returns the display name stored on the role row.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Admin => "Admin",
            Self::Member => "Member",
        }
    }

    /// Returns the description stored on the role row.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Owner => "Full access to the workspace, billing included",
            Self::Admin => "Manages settings and publishes content",
            Self::Member => "Views brands and connected accounts",
        }
    }

    /// Returns the sort order of the role row.
    #[must_use]
    pub fn order(&self) -> i32 {
        match self {
            Self::Owner => 0,
            Self::Admin => 1,
            Self::Member => 2,
        }
    }

    /// Returns the grant policy for this role.
    #[must_use]
    pub fn permission_subset(&self) -> PermissionSubset {
        match self {
            Self::Owner => PermissionSubset::All,
            Self::Admin => PermissionSubset::Named(ADMIN_PERMISSION_KEYS),
            Self::Member => PermissionSubset::Named(MEMBER_PERMISSION_KEYS),
        }
    }
}

/// Role stored on a workspace membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkspaceRole {
    /// Workspace owner.
    Owner,
    /// Workspace administrator.
    Admin,
    /// Regular member.
    Member,
}

impl WorkspaceRole {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
        }
    }

    /// Returns the key of the role row this membership role resolves to.
    ///
    /// The key is derived as `workspace-` followed by the lowercase storage
    /// value. Resolution against stored rows is by this string only.
    #[must_use]
    pub fn role_key(&self) -> String {
        format!("workspace-{}", self.as_str().to_lowercase())
    }
}

impl FromStr for WorkspaceRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "MEMBER" => Ok(Self::Member),
            _ => Err(AppError::Validation(format!(
                "unknown workspace role '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{
        BuiltInRole, PermissionDefinition, PermissionRegistry, PermissionSubset, WorkspaceRole,
    };

    #[test]
    fn standard_registry_keeps_declaration_order() {
        let registry = PermissionRegistry::standard();
        let keys = registry.all_permission_keys();

        assert_eq!(keys.first().copied(), Some("workspace.settings.manage"));
        assert_eq!(keys.last().copied(), Some("content.publish"));
        assert_eq!(keys.len(), registry.definitions().len());
    }

    #[test]
    fn registry_rejects_duplicate_keys() {
        let registry = PermissionRegistry::new(vec![
            PermissionDefinition::new("brand.view", "View brands"),
            PermissionDefinition::new("brand.view", "View brands again"),
        ]);

        assert!(registry.is_err());
    }

    #[test]
    fn registry_rejects_blank_keys() {
        let registry = PermissionRegistry::new(vec![PermissionDefinition::new("  ", "blank")]);
        assert!(registry.is_err());
    }

    #[test]
    fn named_subsets_only_reference_standard_keys() {
        let registry = PermissionRegistry::standard();

        for role in BuiltInRole::all() {
            if let PermissionSubset::Named(keys) = role.permission_subset() {
                assert!(keys.iter().all(|key| registry.contains(key)));
            }
        }
    }

    #[test]
    fn membership_role_maps_to_built_in_role_key() {
        for (membership_role, built_in) in [
            (WorkspaceRole::Owner, BuiltInRole::Owner),
            (WorkspaceRole::Admin, BuiltInRole::Admin),
            (WorkspaceRole::Member, BuiltInRole::Member),
        ] {
            assert_eq!(membership_role.role_key(), built_in.key());
        }
    }

    #[test]
    fn workspace_role_parses_storage_value() {
        assert_eq!(
            WorkspaceRole::from_str("ADMIN").ok(),
            Some(WorkspaceRole::Admin)
        );
        assert!(WorkspaceRole::from_str("admin").is_err());
    }
}
