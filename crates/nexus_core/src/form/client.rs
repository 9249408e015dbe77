//! Client modal.

use super::{into_result, optional_text, require_text, FieldErrors, FormMode, FormResult};
use crate::model::client::{Client, ClientKind, ClientPatch, ClientStatus, NewClient, MAX_SCORE};
use crate::store::CrmStore;
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientForm {
    pub mode: FormMode,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub kind: ClientKind,
    pub document: String,
    pub company: String,
    pub status: ClientStatus,
    pub assigned_to: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub score: u8,
    pub estimated_value: Decimal,
}

impl ClientForm {
    /// Blank form for a new lead.
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            kind: ClientKind::Individual,
            document: String::new(),
            company: String::new(),
            status: ClientStatus::Lead,
            assigned_to: String::new(),
            tags: Vec::new(),
            notes: String::new(),
            score: 0,
            estimated_value: Decimal::ZERO,
        }
    }

    pub fn edit(client: &Client) -> Self {
        Self {
            mode: FormMode::Edit(client.id.clone()),
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            kind: client.kind,
            document: client.document.clone().unwrap_or_default(),
            company: client.company.clone().unwrap_or_default(),
            status: client.status,
            assigned_to: client.assigned_to.clone(),
            tags: client.tags.clone(),
            notes: client.notes.clone(),
            score: client.score,
            estimated_value: client.estimated_value,
        }
    }

    pub fn validate(&self) -> FormResult<()> {
        let mut errors = FieldErrors::new();
        require_text(&mut errors, "name", &self.name, "Nome é obrigatório");
        require_text(&mut errors, "email", &self.email, "E-mail é obrigatório");
        require_text(&mut errors, "phone", &self.phone, "Telefone é obrigatório");
        into_result(errors)
    }

    /// Validates, then creates or updates the client and closes the modal.
    pub fn submit(self, store: &mut CrmStore) -> FormResult<Client> {
        self.validate()?;
        let client = match self.mode.clone() {
            FormMode::Create => store.add_client(self.into_new_client()),
            FormMode::Edit(id) => store.update_client(&id, self.into_patch())?,
        };
        store.close_modal();
        Ok(client)
    }

    fn into_new_client(self) -> NewClient {
        NewClient {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            kind: self.kind,
            document: optional_text(&self.document),
            company: optional_text(&self.company),
            status: self.status,
            assigned_to: self.assigned_to,
            tags: self.tags,
            notes: self.notes,
            score: self.score.min(MAX_SCORE),
            estimated_value: self.estimated_value,
        }
    }

    fn into_patch(self) -> ClientPatch {
        ClientPatch {
            name: Some(self.name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            phone: Some(self.phone.trim().to_string()),
            kind: Some(self.kind),
            document: Some(optional_text(&self.document)),
            company: Some(optional_text(&self.company)),
            status: Some(self.status),
            assigned_to: Some(self.assigned_to),
            tags: Some(self.tags),
            notes: Some(self.notes),
            score: Some(self.score.min(MAX_SCORE)),
            estimated_value: Some(self.estimated_value),
        }
    }
}
