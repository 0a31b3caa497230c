use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationSubmission, CategoryParseError, EmploymentStatus, LoanPurpose};

const MIN_NAME_CHARS: usize = 3;
const MIN_PHONE_CHARS: usize = 10;

/// Form fields checked before a submission reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    FullName,
    Email,
    Phone,
    LoanAmount,
    Purpose,
    EmploymentStatus,
    AnnualIncome,
}

impl FormField {
    pub const fn key(self) -> &'static str {
        match self {
            FormField::FullName => "fullName",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::LoanAmount => "loanAmount",
            FormField::Purpose => "purpose",
            FormField::EmploymentStatus => "employmentStatus",
            FormField::AnnualIncome => "annualIncome",
        }
    }
}

/// Per-field messages collected from a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<FormField, &'static str>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure; the first message for a field wins.
    pub fn add(&mut self, field: FormField, message: &'static str) {
        self.fields.entry(field).or_insert(message);
    }

    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.fields.get(&field).copied()
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &'static str)> + '_ {
        self.fields.iter().map(|(field, message)| (*field, *message))
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.key(), message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub const NAME_TOO_SHORT: &str = "Name must be at least 3 characters";
pub const INVALID_EMAIL: &str = "Invalid email address";
pub const PHONE_TOO_SHORT: &str = "Phone number must be at least 10 digits";
pub const LOAN_AMOUNT_NOT_POSITIVE: &str = "Loan amount must be positive";
pub const PURPOSE_REQUIRED: &str = "Loan purpose is required";
pub const EMPLOYMENT_REQUIRED: &str = "Employment status is required";
pub const INCOME_NOT_POSITIVE: &str = "Annual income must be positive";

/// Checks every field of a submission and reports all failures together.
///
/// Purpose and employment status are closed enums on [`ApplicationSubmission`], so they
/// cannot be empty here; callers parsing raw text report those through
/// [`PURPOSE_REQUIRED`] and [`EMPLOYMENT_REQUIRED`].
pub fn validate(submission: &ApplicationSubmission) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if submission.full_name.trim().chars().count() < MIN_NAME_CHARS {
        errors.add(FormField::FullName, NAME_TOO_SHORT);
    }

    if !is_valid_email(&submission.email) {
        errors.add(FormField::Email, INVALID_EMAIL);
    }

    if submission.phone.trim().chars().count() < MIN_PHONE_CHARS {
        errors.add(FormField::Phone, PHONE_TOO_SHORT);
    }

    if !is_positive(submission.loan_amount) {
        errors.add(FormField::LoanAmount, LOAN_AMOUNT_NOT_POSITIVE);
    }

    if !is_positive(submission.annual_income) {
        errors.add(FormField::AnnualIncome, INCOME_NOT_POSITIVE);
    }

    errors.into_result()
}

pub const UNKNOWN_PURPOSE: &str =
    "Loan purpose must be one of home, car, education, business, personal, other";
pub const UNKNOWN_EMPLOYMENT: &str =
    "Employment status must be one of fulltime, parttime, selfemployed, unemployed, retired";

/// Raw form values with the categories still as free text.
///
/// Missing fields deserialize as empty or zero so they surface as field errors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub loan_amount: f64,
    pub purpose: String,
    pub employment_status: String,
    pub annual_income: f64,
}

impl FormInput {
    /// Parse the categories and validate every field, reporting all failures at once.
    pub fn into_submission(self) -> Result<ApplicationSubmission, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let purpose = match self.purpose.parse::<LoanPurpose>() {
            Ok(purpose) => Some(purpose),
            Err(CategoryParseError::Empty) => {
                errors.add(FormField::Purpose, PURPOSE_REQUIRED);
                None
            }
            Err(CategoryParseError::Unknown(_)) => {
                errors.add(FormField::Purpose, UNKNOWN_PURPOSE);
                None
            }
        };

        let employment_status = match self.employment_status.parse::<EmploymentStatus>() {
            Ok(status) => Some(status),
            Err(CategoryParseError::Empty) => {
                errors.add(FormField::EmploymentStatus, EMPLOYMENT_REQUIRED);
                None
            }
            Err(CategoryParseError::Unknown(_)) => {
                errors.add(FormField::EmploymentStatus, UNKNOWN_EMPLOYMENT);
                None
            }
        };

        // Placeholders let the remaining fields be checked when a category is missing.
        let submission = ApplicationSubmission {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            loan_amount: self.loan_amount,
            purpose: purpose.unwrap_or(LoanPurpose::Other),
            employment_status: employment_status.unwrap_or(EmploymentStatus::Unemployed),
            annual_income: self.annual_income,
        };

        if let Err(field_errors) = validate(&submission) {
            for (field, message) in field_errors.iter() {
                errors.add(field, message);
            }
        }

        errors.into_result().map(|()| submission)
    }
}

impl From<ApplicationSubmission> for FormInput {
    fn from(submission: ApplicationSubmission) -> Self {
        Self {
            full_name: submission.full_name,
            email: submission.email,
            phone: submission.phone,
            loan_amount: submission.loan_amount,
            purpose: submission.purpose.key().to_string(),
            employment_status: submission.employment_status.key().to_string(),
            annual_income: submission.annual_income,
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Structural check: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_valid_email(raw: &str) -> bool {
    let email = raw.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let valid_labels = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld_ok = labels
        .last()
        .map(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);

    valid_labels && tld_ok
}
