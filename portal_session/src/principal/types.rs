use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::NormalizeError;

/// Portal role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Doctor,
    Patient,
    Coordinator,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Doctor,
        Role::Patient,
        Role::Coordinator,
        Role::Admin,
        Role::SuperAdmin,
    ];

    /// Roles that own a storage namespace. `SuperAdmin` lives under `Admin`.
    pub const NAMESPACES: [Role; 4] = [Role::Doctor, Role::Patient, Role::Coordinator, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
            Role::Coordinator => "coordinator",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// The storage namespace this role's sessions live in.
    pub fn namespace(self) -> Role {
        match self {
            Role::SuperAdmin => Role::Admin,
            role => role,
        }
    }

    pub fn shares_namespace(self, other: Role) -> bool {
        self.namespace() == other.namespace()
    }

    /// Whether a principal holding `self` may open views that require `required`.
    ///
    /// Admin views accept super admins; super admin views accept only super admins.
    pub fn satisfies(self, required: Role) -> bool {
        match required {
            Role::SuperAdmin => self == Role::SuperAdmin,
            Role::Admin => matches!(self, Role::Admin | Role::SuperAdmin),
            other => self == other,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            "coordinator" => Ok(Role::Coordinator),
            "admin" => Ok(Role::Admin),
            "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            _ => Err(NormalizeError::UnknownRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    PendingVerification,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::PendingVerification => "pending_verification",
            AccountStatus::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "active" => Ok(AccountStatus::Active),
            "pending_verification" | "pending" => Ok(AccountStatus::PendingVerification),
            "suspended" => Ok(AccountStatus::Suspended),
            _ => Err(NormalizeError::UnknownStatus(s.to_string())),
        }
    }
}

/// Lower-cases an enum-like token and converts camelCase, dashes and spaces
/// to snake_case: "pendingVerification" and "Pending-Verification" both
/// become "pending_verification".
pub(crate) fn normalize_token(s: &str) -> String {
    super::normalize::to_snake_case(s.trim()).replace([' ', '-'], "_")
}

/// Normalized identity of an authenticated portal user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub account_status: AccountStatus,
    /// Doctors only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    /// Patients only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uhid: Option<String>,
    /// Coordinators only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Backend fields without a dedicated slot, keyed in snake_case.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            name: None,
            email: None,
            phone: None,
            account_status: AccountStatus::Active,
            specialty: None,
            uhid: None,
            hospital_id: None,
            hospital_name: None,
            created_at: None,
            extra: Map::new(),
        }
    }

    /// Name to greet the user with, falling back to email and then id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }

    pub fn is_active(&self) -> bool {
        self.account_status == AccountStatus::Active
    }
}
