use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A coarse administrative ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ListBuckets,
    CreateBuckets,
    DeleteBuckets,
    ManageUsers,
    ManagePolicies,
    Admin,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::ListBuckets,
        Capability::CreateBuckets,
        Capability::DeleteBuckets,
        Capability::ManageUsers,
        Capability::ManagePolicies,
        Capability::Admin,
    ];

    /// The key this capability is known by on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ListBuckets => "canListBuckets",
            Capability::CreateBuckets => "canCreateBuckets",
            Capability::DeleteBuckets => "canDeleteBuckets",
            Capability::ManageUsers => "canManageUsers",
            Capability::ManagePolicies => "canManagePolicies",
            Capability::Admin => "isAdmin",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// The derived set of capabilities of one identity.
///
/// Every capability is always present and defaults to `false`. Missing keys
/// in a serialized set deserialize as `false` too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermissionSet {
    pub can_list_buckets: bool,
    pub can_create_buckets: bool,
    pub can_delete_buckets: bool,
    pub can_manage_users: bool,
    pub can_manage_policies: bool,
    pub is_admin: bool,
}

impl PermissionSet {
    /// A set with every capability denied.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ListBuckets => self.can_list_buckets,
            Capability::CreateBuckets => self.can_create_buckets,
            Capability::DeleteBuckets => self.can_delete_buckets,
            Capability::ManageUsers => self.can_manage_users,
            Capability::ManagePolicies => self.can_manage_policies,
            Capability::Admin => self.is_admin,
        }
    }

    /// Grant the bucket capability group.
    ///
    /// Create/delete are assumed to follow from the ability to list buckets.
    pub(crate) fn grant_bucket_group(&mut self) {
        self.can_list_buckets = true;
        self.can_create_buckets = true;
        self.can_delete_buckets = true;
    }

    /// Grant the administrative capability group.
    pub(crate) fn grant_admin_group(&mut self) {
        self.can_manage_users = true;
        self.can_manage_policies = true;
        self.is_admin = true;
    }

    pub fn granted(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.allows(*c))
    }
}
