//! Deal modal.

use super::{into_result, require_some, require_text, FieldErrors, FormError, FormMode, FormResult};
use crate::model::deal::{Deal, DealPatch, DealStage, NewDeal, MAX_PROBABILITY};
use crate::store::{CrmStore, Prefill, StoreError};
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealForm {
    pub mode: FormMode,
    pub title: String,
    pub client_id: String,
    pub value: Option<Decimal>,
    pub stage: DealStage,
    pub probability: u8,
    pub expected_close_date: Option<NaiveDate>,
    pub assigned_to: String,
    pub notes: String,
}

impl DealForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            client_id: String::new(),
            value: None,
            stage: DealStage::New,
            probability: 10,
            expected_close_date: None,
            assigned_to: String::new(),
            notes: String::new(),
        }
    }

    /// Create-mode form seeded from another page.
    pub fn from_prefill(prefill: &Prefill) -> Self {
        let mut form = Self::create();
        if let Some(client_id) = prefill.client_id.as_ref() {
            form.client_id = client_id.clone();
        }
        if let Some(title) = prefill.title.as_ref() {
            form.title = title.clone();
        }
        form.value = prefill.value;
        form
    }

    pub fn edit(deal: &Deal) -> Self {
        Self {
            mode: FormMode::Edit(deal.id.clone()),
            title: deal.title.clone(),
            client_id: deal.client_id.clone(),
            value: Some(deal.value),
            stage: deal.stage.clone(),
            probability: deal.probability,
            expected_close_date: Some(deal.expected_close_date),
            assigned_to: deal.assigned_to.clone(),
            notes: deal.notes.clone(),
        }
    }

    pub fn validate(&self) -> FormResult<()> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "title", &self.title, "Título é obrigatório");
        require_text(&mut errors, "client_id", &self.client_id, "Cliente é obrigatório");
        require_some(&mut errors, "value", &self.value, "Valor é obrigatório");
        require_some(
            &mut errors,
            "expected_close_date",
            &self.expected_close_date,
            "Data de fechamento é obrigatória",
        );
        into_result(errors)
    }

    /// Validates, then creates or updates the deal and closes the modal.
    ///
    /// In edit mode a changed stage goes through the stage-move rules after
    /// the field update, so each is undone separately.
    pub fn submit(self, store: &mut CrmStore) -> FormResult<Deal> {
        self.validate()?;
        let (Some(value), Some(expected_close_date)) = (self.value, self.expected_close_date)
        else {
            return Err(FormError::Invalid(FieldErrors::new()));
        };
        if !store
            .pipeline_stages()
            .iter()
            .any(|stage| stage.id == self.stage)
        {
            return Err(StoreError::UnknownPipelineStage(self.stage.to_string()).into());
        }

        let deal = match self.mode {
            FormMode::Create => store.add_deal(NewDeal {
                title: self.title.trim().to_string(),
                client_id: self.client_id.trim().to_string(),
                value,
                stage: self.stage,
                probability: self.probability.min(MAX_PROBABILITY),
                expected_close_date,
                assigned_to: self.assigned_to,
                notes: self.notes,
            })?,
            FormMode::Edit(id) => {
                let updated = store.update_deal(
                    &id,
                    DealPatch {
                        title: Some(self.title.trim().to_string()),
                        client_id: Some(self.client_id.trim().to_string()),
                        value: Some(value),
                        probability: Some(self.probability),
                        expected_close_date: Some(expected_close_date),
                        assigned_to: Some(self.assigned_to),
                        notes: Some(self.notes),
                    },
                )?;
                if updated.stage != self.stage {
                    store.move_deal_stage(&id, self.stage)?.deal
                } else {
                    updated
                }
            }
        };
        store.close_modal();
        Ok(deal)
    }
}
