use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Invalid principal: {0:?}")]
    InvalidPrincipal(String),
}

/// Form fields that carry client-side validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    DisplayName,
    Age,
    Photos,
    Nickname,
    Brand,
    Last4,
    ExpiryMonth,
    ExpiryYear,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::DisplayName => "displayName",
            Field::Age => "age",
            Field::Photos => "photos",
            Field::Nickname => "nickname",
            Field::Brand => "brand",
            Field::Last4 => "last4",
            Field::ExpiryMonth => "expiryMonth",
            Field::ExpiryYear => "expiryYear",
        }
    }
}

/// Per-field validation failures collected before any remote call.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("Validation failed: {}", summary(.errors))]
pub struct ValidationError {
    pub errors: BTreeMap<Field, String>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn summary(errors: &BTreeMap<Field, String>) -> String {
    errors
        .iter()
        .map(|(field, msg)| format!("{}: {msg}", field.as_str()))
        .collect::<Vec<_>>()
        .join("; ")
}
