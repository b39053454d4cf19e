//! User domain model.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{RoostError, RoostResult};

/// Permission tier a user may hold. Tiers are additive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Guest,
    Host,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "Guest",
            Role::Host => "Host",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Guest" => Ok(Role::Guest),
            "Host" => Ok(Role::Host),
            "Admin" => Ok(Role::Admin),
            other => Err(RoostError::validation(format!("unknown role: {other}"))),
        }
    }
}

/// The set of roles held by a user.
///
/// Always contains [`Role::Guest`]. Roles are only ever added through
/// this type; there is no removal operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<Role>")]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    /// Insert a role. Returns `false` if it was already present.
    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Role names in stable order, as persisted.
    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(|r| r.as_str().to_string()).collect()
    }

    /// Parse persisted role names, collapsing duplicates.
    pub fn from_strings<I, S>(names: I) -> RoostResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for name in names {
            set.insert(name.as_ref().parse()?);
        }
        Ok(set)
    }
}

impl Default for RoleSet {
    fn default() -> Self {
        Self(BTreeSet::from([Role::Guest]))
    }
}

impl From<Vec<Role>> for RoleSet {
    fn from(roles: Vec<Role>) -> Self {
        roles.into_iter().collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        let mut set = Self::default();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountStatus {
    Pending,
    Active,
    Blocked,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "Pending",
            AccountStatus::Active => "Active",
            AccountStatus::Blocked => "Blocked",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = RoostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(AccountStatus::Pending),
            "Active" => Ok(AccountStatus::Active),
            "Blocked" => Ok(AccountStatus::Blocked),
            other => Err(RoostError::validation(format!(
                "unknown account status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Display name shown next to reviews.
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub roles: RoleSet,
    pub verified: bool,
    pub status: AccountStatus,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_host(&self) -> bool {
        self.roles.contains(Role::Host)
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(Role::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    /// Raw password (hashed with Argon2id before storage).
    pub password: String,
}

impl CreateUser {
    pub fn validate(&self, min_password_length: usize) -> RoostResult<()> {
        if self.name.trim().is_empty() {
            return Err(RoostError::validation("name must not be empty"));
        }
        if !is_plausible_email(&self.email) {
            return Err(RoostError::validation(format!(
                "invalid email address: {}",
                self.email
            )));
        }
        if self.password.chars().count() < min_password_length {
            return Err(RoostError::validation(format!(
                "password must be at least {min_password_length} characters"
            )));
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub roles: Option<RoleSet>,
    pub verified: Option<bool>,
    pub status: Option<AccountStatus>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub phone: Option<Option<String>>,
    pub profile_picture: Option<Option<String>>,
}
