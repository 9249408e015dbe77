//! Team members and revenue goals.

use super::{EntityId, EntityKind, Record};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Member role. Serialized with the product's role names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamRole {
    #[serde(rename = "owner")]
    Owner,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "vendedor")]
    Sales,
    #[serde(rename = "atendimento")]
    Support,
    #[serde(rename = "financeiro")]
    Finance,
}

impl TeamRole {
    /// Default permission set granted when a member is created.
    pub fn default_permissions(self) -> Vec<String> {
        let permissions: &[&str] = match self {
            Self::Owner | Self::Admin => &[
                "clients", "deals", "tasks", "omnichannel", "reports", "settings", "team",
            ],
            Self::Sales => &["clients", "deals", "tasks", "omnichannel"],
            Self::Support => &["clients", "tasks", "omnichannel"],
            Self::Finance => &["clients", "deals", "reports"],
        };
        permissions.iter().map(|value| value.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: EntityId,
    pub tenant_id: String,
    /// Display name; deals and clients reference owners by this value.
    pub name: String,
    pub email: String,
    pub role: TeamRole,
    pub status: MemberStatus,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

impl Record for TeamMember {
    const KIND: EntityKind = EntityKind::TeamMember;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamMember {
    pub name: String,
    pub email: String,
    pub role: TeamRole,
    /// `None` grants the role defaults.
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamMemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<TeamRole>,
    pub status: Option<MemberStatus>,
    pub permissions: Option<Vec<String>>,
}

impl TeamMemberPatch {
    pub(crate) fn apply(self, member: &mut TeamMember) {
        if let Some(value) = self.name {
            member.name = value;
        }
        if let Some(value) = self.email {
            member.email = value;
        }
        if let Some(value) = self.role {
            member.role = value;
        }
        if let Some(value) = self.status {
            member.status = value;
        }
        if let Some(value) = self.permissions {
            member.permissions = value;
        }
    }
}

/// Monthly revenue target for one member.
///
/// Realized revenue is not stored; see [`crate::view::dashboard::goal_progress`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: EntityId,
    pub member_id: EntityId,
    /// Calendar month, `1..=12`.
    pub month: u32,
    pub year: i32,
    pub target: Decimal,
}

impl Record for Goal {
    const KIND: EntityKind = EntityKind::Goal;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub member_id: EntityId,
    pub month: u32,
    pub year: i32,
    pub target: Decimal,
}
