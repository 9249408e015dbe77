//! Client record.
//!
//! # Invariants
//! - `score` is kept within `0..=100`.
//! - `status` moves lead → negotiation → active as deals progress; the store
//!   owns those transitions, this module only defines the shape.

use super::{EntityId, EntityKind, Record};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound of the manual lead score.
pub const MAX_SCORE: u8 = 100;

/// Legal classification of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientKind {
    /// Pessoa física (individual).
    #[serde(rename = "PF")]
    Individual,
    /// Pessoa jurídica (company).
    #[serde(rename = "PJ")]
    Company,
}

/// Client lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Lead,
    Negotiation,
    Active,
    Inactive,
    Lost,
}

impl ClientStatus {
    pub const ALL: [ClientStatus; 5] = [
        Self::Lead,
        Self::Negotiation,
        Self::Active,
        Self::Inactive,
        Self::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Negotiation => "negotiation",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Lost => "lost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: EntityId,
    pub tenant_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub kind: ClientKind,
    /// CPF or CNPJ, free text.
    pub document: Option<String>,
    pub company: Option<String>,
    pub status: ClientStatus,
    /// Owner name (team member display name).
    pub assigned_to: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub score: u8,
    pub estimated_value: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Client {
    const KIND: EntityKind = EntityKind::Client;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Input for creating a client; the store stamps id, tenant and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "type")]
    pub kind: ClientKind,
    pub document: Option<String>,
    pub company: Option<String>,
    pub status: ClientStatus,
    pub assigned_to: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub score: u8,
    pub estimated_value: Decimal,
}

impl NewClient {
    /// Minimal lead with empty optional fields.
    pub fn lead(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            kind: ClientKind::Individual,
            document: None,
            company: None,
            status: ClientStatus::Lead,
            assigned_to: String::new(),
            tags: Vec::new(),
            notes: String::new(),
            score: 0,
            estimated_value: Decimal::ZERO,
        }
    }

    pub(crate) fn into_client(
        self,
        id: EntityId,
        tenant_id: String,
        now: DateTime<Utc>,
    ) -> Client {
        Client {
            id,
            tenant_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            kind: self.kind,
            document: self.document,
            company: self.company,
            status: self.status,
            assigned_to: self.assigned_to,
            tags: self.tags,
            notes: self.notes,
            score: self.score.min(MAX_SCORE),
            estimated_value: self.estimated_value,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial client update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ClientKind>,
    pub document: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub status: Option<ClientStatus>,
    pub assigned_to: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub score: Option<u8>,
    pub estimated_value: Option<Decimal>,
}

impl ClientPatch {
    pub fn status(status: ClientStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, client: &mut Client) {
        if let Some(value) = self.name {
            client.name = value;
        }
        if let Some(value) = self.email {
            client.email = value;
        }
        if let Some(value) = self.phone {
            client.phone = value;
        }
        if let Some(value) = self.kind {
            client.kind = value;
        }
        if let Some(value) = self.document {
            client.document = value;
        }
        if let Some(value) = self.company {
            client.company = value;
        }
        if let Some(value) = self.status {
            client.status = value;
        }
        if let Some(value) = self.assigned_to {
            client.assigned_to = value;
        }
        if let Some(value) = self.tags {
            client.tags = value;
        }
        if let Some(value) = self.notes {
            client.notes = value;
        }
        if let Some(value) = self.score {
            client.score = value.min(MAX_SCORE);
        }
        if let Some(value) = self.estimated_value {
            client.estimated_value = value;
        }
    }
}
