//! Deal record and pipeline stage identifiers.
//!
//! # Invariants
//! - `history` is append-only; entries are never rewritten.
//! - `probability` is kept within `0..=100`.

use super::{EntityId, EntityKind, Record};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const MAX_PROBABILITY: u8 = 100;

/// Pipeline stage id a deal occupies.
///
/// The six built-in stages drive lifecycle rules; user-created stages are
/// carried as `Custom` and behave like open stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DealStage {
    New,
    Qualified,
    Proposal,
    Negotiation,
    Closed,
    Lost,
    Custom(String),
}

impl DealStage {
    pub const BUILT_IN: [DealStage; 6] = [
        Self::New,
        Self::Qualified,
        Self::Proposal,
        Self::Negotiation,
        Self::Closed,
        Self::Lost,
    ];

    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "new" => Self::New,
            "qualified" => Self::Qualified,
            "proposal" => Self::Proposal,
            "negotiation" => Self::Negotiation,
            "closed" => Self::Closed,
            "lost" => Self::Lost,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "new",
            Self::Qualified => "qualified",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::Closed => "closed",
            Self::Lost => "lost",
            Self::Custom(value) => value.as_str(),
        }
    }

    /// Whether the deal is still being worked (neither won nor lost).
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Closed | Self::Lost)
    }
}

impl From<String> for DealStage {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<DealStage> for String {
    fn from(value: DealStage) -> Self {
        value.as_str().to_string()
    }
}

impl Display for DealStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the stage transition log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageChange {
    /// `None` for the entry written at creation.
    pub from: Option<DealStage>,
    pub to: DealStage,
    pub changed_at: DateTime<Utc>,
    pub changed_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: EntityId,
    pub tenant_id: String,
    pub title: String,
    pub client_id: EntityId,
    pub value: Decimal,
    pub stage: DealStage,
    pub probability: u8,
    pub expected_close_date: NaiveDate,
    pub assigned_to: String,
    pub notes: String,
    pub history: Vec<StageChange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deal {
    /// `value × probability / 100`.
    pub fn weighted_value(&self) -> Decimal {
        self.value * Decimal::from(self.probability) / Decimal::ONE_HUNDRED
    }
}

impl Record for Deal {
    const KIND: EntityKind = EntityKind::Deal;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeal {
    pub title: String,
    pub client_id: EntityId,
    pub value: Decimal,
    pub stage: DealStage,
    pub probability: u8,
    pub expected_close_date: NaiveDate,
    pub assigned_to: String,
    pub notes: String,
}

impl NewDeal {
    pub(crate) fn into_deal(
        self,
        id: EntityId,
        tenant_id: String,
        now: DateTime<Utc>,
        actor: &str,
    ) -> Deal {
        let history = vec![StageChange {
            from: None,
            to: self.stage.clone(),
            changed_at: now,
            changed_by: actor.to_string(),
        }];
        Deal {
            id,
            tenant_id,
            title: self.title,
            client_id: self.client_id,
            value: self.value,
            stage: self.stage,
            probability: self.probability.min(MAX_PROBABILITY),
            expected_close_date: self.expected_close_date,
            assigned_to: self.assigned_to,
            notes: self.notes,
            history,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial deal update. Stage changes go through
/// [`crate::CrmStore::move_deal_stage`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DealPatch {
    pub title: Option<String>,
    pub client_id: Option<EntityId>,
    pub value: Option<Decimal>,
    pub probability: Option<u8>,
    pub expected_close_date: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
}

impl DealPatch {
    pub(crate) fn apply(self, deal: &mut Deal) {
        if let Some(value) = self.title {
            deal.title = value;
        }
        if let Some(value) = self.client_id {
            deal.client_id = value;
        }
        if let Some(value) = self.value {
            deal.value = value;
        }
        if let Some(value) = self.probability {
            deal.probability = value.min(MAX_PROBABILITY);
        }
        if let Some(value) = self.expected_close_date {
            deal.expected_close_date = value;
        }
        if let Some(value) = self.assigned_to {
            deal.assigned_to = value;
        }
        if let Some(value) = self.notes {
            deal.notes = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DealStage;

    #[test]
    fn stage_parse_keeps_custom_ids() {
        assert_eq!(DealStage::parse("closed"), DealStage::Closed);
        assert_eq!(
            DealStage::parse("follow_up"),
            DealStage::Custom("follow_up".to_string())
        );
        assert_eq!(DealStage::Custom("x".to_string()).as_str(), "x");
    }

    #[test]
    fn only_closed_and_lost_are_terminal() {
        let open: Vec<_> = DealStage::BUILT_IN
            .iter()
            .filter(|stage| stage.is_open())
            .collect();
        assert_eq!(open.len(), 4);
    }
}
