//! Contact form model: fields, validation, and the submit lifecycle.
//!
//! The form never touches the network itself.  [`ContactForm::begin_submit`]
//! decides what should happen and hands back a payload; the caller performs
//! the POST and reports the outcome through [`ContactForm::finish_submit`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::transport::ContactError;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

pub const MSG_NOT_CONFIGURED: &str =
    "Contact form endpoint is not configured. Please set LOCUS_CONTACT_ENDPOINT.";
pub const MSG_FAILED: &str = "Something went wrong. Please try again or email us directly.";
pub const MSG_NETWORK: &str = "Network error. Please check your connection and try again.";

/// Simple shape check: something, `@`, something, `.`, something.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

// ───────────────────────────────────────── fields ────────────

/// User-editable fields, in tab order.  The honeypot is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Organization,
    Message,
}

impl Field {
    pub const ALL: &[Field] = &[Field::Name, Field::Email, Field::Organization, Field::Message];

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Organization => "Organization",
            Field::Message => "Message",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Name => "Your name",
            Field::Email => "you@company.com",
            Field::Organization => "Company or organization",
            Field::Message => "Tell us about your project...",
        }
    }

    pub fn required(self) -> bool {
        !matches!(self, Field::Organization)
    }

    pub fn multiline(self) -> bool {
        matches!(self, Field::Message)
    }
}

pub type FieldErrors = BTreeMap<Field, &'static str>;

/// JSON body of the contact POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactPayload {
    pub name: String,
    pub email: String,
    pub organization: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Success,
    Error(String),
}

/// What the caller should do after pressing "Send message".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    /// Honeypot filled: drop silently.
    Discarded,
    /// Already waiting on a response.
    Busy,
    /// Validation failed; errors are on the form.
    Rejected,
    /// No endpoint to send to; the form shows an error.
    Misconfigured,
    Send(ContactPayload),
}

// ───────────────────────────────────────── form ──────────────

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub organization: String,
    pub message: String,
    /// Hidden `_gotcha` field.  Humans never see it.
    pub honeypot: String,
    errors: FieldErrors,
    submitting: bool,
    state: SubmitState,
}

impl ContactForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Organization => &self.organization,
            Field::Message => &self.message,
        }
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Organization => &mut self.organization,
            Field::Message => &mut self.message,
        }
    }

    /// Replace a field's value.  Editing a field clears its error.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.value_mut(field) = value.into();
        self.errors.remove(&field);
    }

    pub fn push_char(&mut self, field: Field, c: char) {
        self.value_mut(field).push(c);
        self.errors.remove(&field);
    }

    pub fn pop_char(&mut self, field: Field) {
        self.value_mut(field).pop();
        self.errors.remove(&field);
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errs = FieldErrors::new();
        if self.name.trim().is_empty() {
            errs.insert(Field::Name, "Name is required");
        }
        if self.email.trim().is_empty() {
            errs.insert(Field::Email, "Email is required");
        } else if !is_valid_email(&self.email) {
            errs.insert(Field::Email, "Please enter a valid email");
        }
        if self.message.trim().is_empty() {
            errs.insert(Field::Message, "Message is required");
        }
        errs
    }

    /// Run the pre-flight checks in order: honeypot, in-flight guard,
    /// validation, endpoint.
    pub fn begin_submit(&mut self, endpoint_configured: bool) -> SubmitAction {
        if !self.honeypot.is_empty() {
            tracing::info!("contact submission discarded by honeypot");
            return SubmitAction::Discarded;
        }
        if self.submitting {
            return SubmitAction::Busy;
        }

        let errs = self.validate();
        if !errs.is_empty() {
            tracing::debug!(count = errs.len(), "contact form rejected");
            self.errors = errs;
            return SubmitAction::Rejected;
        }

        self.errors.clear();
        self.state = SubmitState::Idle;

        if !endpoint_configured {
            self.state = SubmitState::Error(MSG_NOT_CONFIGURED.to_string());
            return SubmitAction::Misconfigured;
        }

        self.submitting = true;
        SubmitAction::Send(ContactPayload {
            name: self.name.clone(),
            email: self.email.clone(),
            organization: self.organization.clone(),
            message: self.message.clone(),
        })
    }

    /// Apply the transport outcome.  Returns `true` on success.
    pub fn finish_submit(&mut self, result: Result<(), ContactError>) -> bool {
        self.submitting = false;
        match result {
            Ok(()) => {
                self.name.clear();
                self.email.clear();
                self.organization.clear();
                self.message.clear();
                self.state = SubmitState::Success;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "contact submission failed");
                let msg = match err {
                    ContactError::Network(_) => MSG_NETWORK,
                    ContactError::NotConfigured => MSG_NOT_CONFIGURED,
                    ContactError::Status(_) => MSG_FAILED,
                };
                self.state = SubmitState::Error(msg.to_string());
                false
            }
        }
    }

    /// "Send another message".
    pub fn reset_after_success(&mut self) {
        if self.state == SubmitState::Success {
            self.state = SubmitState::Idle;
        }
    }
}
