//! Saved payment methods: list, add, edit, remove and default selection.

use chrono::{Datelike, Utc};
use parking_lot::Mutex;

use kindred_shared::constants::EXPIRY_YEARS_AHEAD;
use kindred_shared::validate::{format_expiry, is_valid_last4, sanitize_last4, split_expiry};
use kindred_shared::{CardBrand, Field, PaymentMethod, PaymentMethodInput, ValidationError};

use crate::app::App;
use crate::error::{ClientError, Result};
use crate::queries::payments::{
    AddPaymentMethod, DefaultPaymentMethod, PaymentMethods, RemovePaymentMethod,
    SetDefaultPaymentMethod, UpdatePaymentMethod,
};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// `("01", "01 - January")` through `("12", "12 - December")`.
pub fn month_options() -> Vec<(String, String)> {
    MONTH_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let value = format!("{:02}", i + 1);
            let label = format!("{value} - {name}");
            (value, label)
        })
        .collect()
}

/// The given year and the following `EXPIRY_YEARS_AHEAD - 1`.
pub fn year_options(current_year: i32) -> Vec<i32> {
    (current_year..current_year + EXPIRY_YEARS_AHEAD).collect()
}

/// Year options starting at today's year.
pub fn current_year_options() -> Vec<i32> {
    year_options(Utc::now().year())
}

/// Stable sort placing the record whose id equals `default` first. Without
/// a default, or with a default that is not in the list, order is kept.
pub fn sort_by_default(mut methods: Vec<PaymentMethod>, default: Option<&str>) -> Vec<PaymentMethod> {
    if let Some(default) = default {
        methods.sort_by_key(|m| m.id != default);
    }
    methods
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentForm {
    pub nickname: String,
    pub brand: Option<CardBrand>,
    last4: String,
    pub expiry_month: Option<u8>,
    pub expiry_year: Option<i32>,
}

impl PaymentForm {
    /// Prefill from a stored record.
    pub fn from_method(method: &PaymentMethod) -> Self {
        let expiry = split_expiry(&method.expiry);
        Self {
            nickname: method.nickname.clone(),
            brand: CardBrand::from_label(&method.brand),
            last4: sanitize_last4(&method.last4),
            expiry_month: expiry.map(|(m, _)| m),
            expiry_year: expiry.map(|(_, y)| y),
        }
    }

    /// Typed input is stripped of non-digits and capped at four characters.
    pub fn set_last4(&mut self, input: &str) {
        self.last4 = sanitize_last4(input);
    }

    pub fn last4(&self) -> &str {
        &self.last4
    }

    pub fn validate(&self) -> std::result::Result<PaymentMethodInput, ValidationError> {
        let mut errors = ValidationError::new();
        let nickname = self.nickname.trim();
        if nickname.is_empty() {
            errors.add(Field::Nickname, "Nickname is required");
        }
        if self.brand.is_none() {
            errors.add(Field::Brand, "Card brand is required");
        }
        if !is_valid_last4(&self.last4) {
            errors.add(Field::Last4, "Last 4 digits must be exactly 4 numbers");
        }
        if self.expiry_month.is_none() {
            errors.add(Field::ExpiryMonth, "Expiry month is required");
        }
        if self.expiry_year.is_none() {
            errors.add(Field::ExpiryYear, "Expiry year is required");
        }

        match (self.brand, self.expiry_month, self.expiry_year) {
            (Some(brand), Some(month), Some(year)) if errors.is_empty() => Ok(PaymentMethodInput {
                nickname: nickname.to_string(),
                last4: self.last4.clone(),
                brand: brand.as_str().to_string(),
                expiry: format_expiry(month, year),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Closed,
    Adding,
    Editing(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRow {
    pub method: PaymentMethod,
    pub is_default: bool,
    /// Offered only for non-default records.
    pub can_set_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethodsState {
    Loading,
    Error(String),
    Ready {
        rows: Vec<MethodRow>,
        mode: FormMode,
        form: PaymentForm,
        /// Per-field messages from the last rejected submit.
        errors: ValidationError,
        /// Record awaiting removal confirmation.
        confirming_remove: Option<String>,
        pending: bool,
    },
}

struct Local {
    mode: FormMode,
    form: PaymentForm,
    errors: ValidationError,
    confirming_remove: Option<String>,
    pending: bool,
}

pub struct PaymentMethodsView {
    app: App,
    local: Mutex<Local>,
}

impl PaymentMethodsView {
    pub fn new(app: App) -> Self {
        Self {
            app,
            local: Mutex::new(Local {
                mode: FormMode::Closed,
                form: PaymentForm::default(),
                errors: ValidationError::new(),
                confirming_remove: None,
                pending: false,
            }),
        }
    }

    pub async fn enter(&self) -> Result<()> {
        let methods = self.app.queries.ensure(&PaymentMethods).await.map(|_| ());
        let default = self.app.queries.ensure(&DefaultPaymentMethod).await.map(|_| ());
        methods.and(default)
    }

    pub fn state(&self) -> PaymentMethodsState {
        let methods = self.app.queries.state(&PaymentMethods);
        if methods.is_loading() {
            return PaymentMethodsState::Loading;
        }
        let Some(list) = methods.data else {
            return match methods.error {
                Some(e) => PaymentMethodsState::Error(e.to_string()),
                None => PaymentMethodsState::Loading,
            };
        };
        let default = self.app.queries.data(&DefaultPaymentMethod);
        let default = default.as_deref().and_then(|d| d.as_deref());

        let rows = sort_by_default(list.to_vec(), default)
            .into_iter()
            .map(|method| {
                let is_default = default == Some(method.id.as_str());
                MethodRow {
                    method,
                    is_default,
                    can_set_default: !is_default,
                }
            })
            .collect();
        let local = self.local.lock();
        PaymentMethodsState::Ready {
            rows,
            mode: local.mode.clone(),
            form: local.form.clone(),
            errors: local.errors.clone(),
            confirming_remove: local.confirming_remove.clone(),
            pending: local.pending,
        }
    }

    pub fn open_add(&self) {
        let mut local = self.local.lock();
        local.mode = FormMode::Adding;
        local.form = PaymentForm::default();
        local.errors = ValidationError::new();
    }

    /// Open the editor prefilled from the cached record.
    pub fn open_edit(&self, id: &str) -> bool {
        let Some(methods) = self.app.queries.data(&PaymentMethods) else {
            return false;
        };
        let Some(method) = methods.iter().find(|m| m.id == id) else {
            return false;
        };
        let mut local = self.local.lock();
        local.form = PaymentForm::from_method(method);
        local.errors = ValidationError::new();
        local.mode = FormMode::Editing(id.to_string());
        true
    }

    pub fn close_form(&self) {
        let mut local = self.local.lock();
        local.mode = FormMode::Closed;
        local.form = PaymentForm::default();
        local.errors = ValidationError::new();
    }

    pub fn edit(&self, f: impl FnOnce(&mut PaymentForm)) {
        f(&mut self.local.lock().form);
    }

    /// Validate and submit the open form. Validation messages are kept for
    /// display; the form survives any failure so the user can retry.
    pub async fn submit(&self) -> Result<bool> {
        let (mode, input) = {
            let mut local = self.local.lock();
            if local.pending || local.mode == FormMode::Closed {
                return Ok(false);
            }
            match local.form.validate() {
                Ok(input) => {
                    local.errors = ValidationError::new();
                    (local.mode.clone(), input)
                }
                Err(errors) => {
                    local.errors = errors.clone();
                    return Err(ClientError::Validation(errors));
                }
            }
        };

        let outcome = match mode {
            FormMode::Closed => return Ok(false),
            FormMode::Adding => {
                self.begin();
                let outcome = self.app.queries.mutate(&AddPaymentMethod { input }).await;
                self.report(
                    outcome.map(|_| ()),
                    "Payment method added successfully",
                    "Failed to add payment method",
                )
            }
            FormMode::Editing(id) => {
                self.begin();
                let outcome = self.app.queries.mutate(&UpdatePaymentMethod { id, input }).await;
                self.report(
                    outcome,
                    "Payment method updated successfully",
                    "Failed to update payment method",
                )
            }
        };
        if outcome.is_ok() {
            self.close_form();
            self.refresh().await;
        }
        outcome.map(|()| true)
    }

    pub fn request_remove(&self, id: &str) {
        self.local.lock().confirming_remove = Some(id.to_string());
    }

    pub fn cancel_remove(&self) {
        self.local.lock().confirming_remove = None;
    }

    pub async fn confirm_remove(&self) -> Result<bool> {
        let id = {
            let mut local = self.local.lock();
            if local.pending {
                return Ok(false);
            }
            match local.confirming_remove.take() {
                Some(id) => id,
                None => return Ok(false),
            }
        };
        self.begin();
        let outcome = self.app.queries.mutate(&RemovePaymentMethod { id }).await;
        self.report(
            outcome,
            "Payment method removed successfully",
            "Failed to remove payment method",
        )?;
        self.refresh().await;
        Ok(true)
    }

    pub async fn set_default(&self, id: &str) -> Result<bool> {
        let current = self.app.queries.data(&DefaultPaymentMethod);
        if current.as_deref().and_then(|d| d.as_deref()) == Some(id) {
            return Ok(false);
        }
        {
            let mut local = self.local.lock();
            if local.pending {
                return Ok(false);
            }
            local.pending = true;
        }
        let outcome = self
            .app
            .queries
            .mutate(&SetDefaultPaymentMethod { id: id.to_string() })
            .await;
        self.report(
            outcome,
            "Default payment method updated",
            "Failed to set default payment method",
        )?;
        self.refresh().await;
        Ok(true)
    }

    fn begin(&self) {
        self.local.lock().pending = true;
    }

    fn report(&self, outcome: Result<()>, ok: &str, failed: &str) -> Result<()> {
        self.local.lock().pending = false;
        match outcome {
            Ok(()) => {
                self.app.notifier.success(ok);
                Ok(())
            }
            Err(e) => {
                self.app.notifier.error(failed, e.to_string());
                Err(e)
            }
        }
    }

    async fn refresh(&self) {
        if let Err(e) = self.enter().await {
            tracing::debug!(error = %e, "Payment methods refresh failed");
        }
    }
}
