use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub(crate) fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ApplicationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Raised when a raw category value does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryParseError {
    #[error("value is required")]
    Empty,
    #[error("unknown value '{0}'")]
    Unknown(String),
}

/// What the borrower intends to use the loan for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanPurpose {
    Home,
    Car,
    Education,
    Business,
    Personal,
    Other,
}

impl LoanPurpose {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Home,
            Self::Car,
            Self::Education,
            Self::Business,
            Self::Personal,
            Self::Other,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Car => "car",
            Self::Education => "education",
            Self::Business => "business",
            Self::Personal => "personal",
            Self::Other => "other",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Home Purchase",
            Self::Car => "Vehicle Purchase",
            Self::Education => "Education",
            Self::Business => "Business",
            Self::Personal => "Personal",
            Self::Other => "Other",
        }
    }
}

impl FromStr for LoanPurpose {
    type Err = CategoryParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        if value.is_empty() {
            return Err(CategoryParseError::Empty);
        }
        Self::ordered()
            .into_iter()
            .find(|purpose| purpose.key() == value)
            .ok_or(CategoryParseError::Unknown(value))
    }
}

/// Applicant's employment situation as captured on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmploymentStatus {
    Fulltime,
    Parttime,
    Selfemployed,
    Unemployed,
    Retired,
}

impl EmploymentStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Fulltime,
            Self::Parttime,
            Self::Selfemployed,
            Self::Unemployed,
            Self::Retired,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Fulltime => "fulltime",
            Self::Parttime => "parttime",
            Self::Selfemployed => "selfemployed",
            Self::Unemployed => "unemployed",
            Self::Retired => "retired",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fulltime => "Full-time",
            Self::Parttime => "Part-time",
            Self::Selfemployed => "Self-employed",
            Self::Unemployed => "Unemployed",
            Self::Retired => "Retired",
        }
    }
}

impl FromStr for EmploymentStatus {
    type Err = CategoryParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        if value.is_empty() {
            return Err(CategoryParseError::Empty);
        }
        Self::ordered()
            .into_iter()
            .find(|status| status.key() == value)
            .ok_or(CategoryParseError::Unknown(value))
    }
}

/// Lifecycle state of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }
}

/// Review outcome accepted by a status update; `pending` is never a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusDecision {
    Approved,
    Rejected,
}

impl StatusDecision {
    pub const fn status(self) -> ApplicationStatus {
        match self {
            StatusDecision::Approved => ApplicationStatus::Approved,
            StatusDecision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

impl FromStr for StatusDecision {
    type Err = CategoryParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Err(CategoryParseError::Empty),
            "approved" | "approve" => Ok(StatusDecision::Approved),
            "rejected" | "reject" => Ok(StatusDecision::Rejected),
            other => Err(CategoryParseError::Unknown(other.to_string())),
        }
    }
}

/// Applicant-provided data; the store assigns id, status, and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSubmission {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub loan_amount: f64,
    pub purpose: LoanPurpose,
    pub employment_status: EmploymentStatus,
    pub annual_income: f64,
}

/// One submitted loan request, as persisted and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: ApplicationId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub loan_amount: f64,
    pub purpose: LoanPurpose,
    pub employment_status: EmploymentStatus,
    pub annual_income: f64,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl LoanApplication {
    pub(crate) fn from_submission(
        id: ApplicationId,
        submission: ApplicationSubmission,
        created_at: DateTime<Utc>,
    ) -> Self {
        let ApplicationSubmission {
            full_name,
            email,
            phone,
            loan_amount,
            purpose,
            employment_status,
            annual_income,
        } = submission;

        Self {
            id,
            full_name,
            email,
            phone,
            loan_amount,
            purpose,
            employment_status,
            annual_income,
            status: ApplicationStatus::Pending,
            created_at,
        }
    }
}
