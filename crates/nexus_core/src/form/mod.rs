//! Modal form state, validation and submission.
//!
//! # Responsibility
//! - Hold editable field values for the client, deal and task modals.
//! - Validate required fields synchronously, reporting one message per field.
//! - Submit through the store's `add_*` / `update_*` mutators.
//!
//! # Invariants
//! - An invalid form never reaches the store.
//! - A successful submit closes the modal, which clears the prefill slot.

pub mod client;
pub mod deal;
pub mod task;

use crate::model::EntityId;
use crate::store::StoreError;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use client::ClientForm;
pub use deal::DealForm;
pub use task::TaskForm;

/// Field name → user-facing message.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Whether submit creates a record or updates the one being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(EntityId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// One or more fields failed validation.
    Invalid(FieldErrors),
    /// The store rejected the submit.
    Store(StoreError),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => {
                let fields: Vec<&str> = errors.keys().copied().collect();
                write!(f, "invalid fields: {}", fields.join(", "))
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FormError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for FormError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub type FormResult<T> = Result<T, FormError>;

pub(crate) fn require_text(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message.to_string());
    }
}

pub(crate) fn require_some<T>(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &Option<T>,
    message: &str,
) {
    if value.is_none() {
        errors.insert(field, message.to_string());
    }
}

pub(crate) fn into_result(errors: FieldErrors) -> FormResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        log::info!(
            "event=form_validate module=form status=error fields={}",
            errors.len()
        );
        Err(FormError::Invalid(errors))
    }
}

/// Trimmed text, or `None` when blank.
pub(crate) fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
