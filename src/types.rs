/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a stored or submitted enum label is not in the allow-list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Ownership model of a university
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UniversityType {
    #[default]
    Public,
    Private,
    #[serde(rename = "Semi_Public", alias = "SemiPublic", alias = "Semi Public")]
    SemiPublic,
}

impl UniversityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniversityType::Public => "Public",
            UniversityType::Private => "Private",
            UniversityType::SemiPublic => "Semi_Public",
        }
    }
}

impl FromStr for UniversityType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Public" => Ok(UniversityType::Public),
            "Private" => Ok(UniversityType::Private),
            "Semi_Public" | "SemiPublic" | "Semi Public" => Ok(UniversityType::SemiPublic),
            other => Err(UnknownVariant {
                kind: "university type",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for UniversityType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for UniversityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow state of an agent-submitted admission application.
///
/// The set is closed, but no transition graph is enforced: any authorized
/// update may move an application to any state. Labels are the human-readable
/// strings persisted in the `status` column; the misspelled labels written by
/// earlier deployments are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Review")]
    Review,
    #[serde(rename = "Commission Paid")]
    CommissionPaid,
    #[serde(rename = "Rejected")]
    Rejected,
    #[serde(rename = "Conditional Offer")]
    ConditionalOffer,
    #[serde(rename = "Unconditional Offer")]
    UnconditionalOffer,
    #[serde(rename = "CAS Documents Pending")]
    CasDocumentPending,
    #[serde(rename = "CAS Interview Pending", alias = "CAS InterView Pending")]
    CasInterviewPending,
    #[serde(rename = "CAS Interview Passed", alias = "CAS InterView Passed")]
    CasInterviewPassed,
    #[serde(rename = "CAS Received")]
    CasReceived,
    #[serde(rename = "Apply For Visa")]
    ApplyForVisa,
    #[serde(rename = "Visa Received")]
    VisaReceived,
    #[serde(rename = "Enrollment Pending", alias = "Enrollement Pending")]
    EnrollmentPending,
    #[serde(rename = "Enrollment Complete", alias = "Enrollement Complete")]
    EnrollmentComplete,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 14] = [
        ApplicationStatus::New,
        ApplicationStatus::Review,
        ApplicationStatus::CommissionPaid,
        ApplicationStatus::Rejected,
        ApplicationStatus::ConditionalOffer,
        ApplicationStatus::UnconditionalOffer,
        ApplicationStatus::CasDocumentPending,
        ApplicationStatus::CasInterviewPending,
        ApplicationStatus::CasInterviewPassed,
        ApplicationStatus::CasReceived,
        ApplicationStatus::ApplyForVisa,
        ApplicationStatus::VisaReceived,
        ApplicationStatus::EnrollmentPending,
        ApplicationStatus::EnrollmentComplete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::New => "New",
            ApplicationStatus::Review => "Review",
            ApplicationStatus::CommissionPaid => "Commission Paid",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::ConditionalOffer => "Conditional Offer",
            ApplicationStatus::UnconditionalOffer => "Unconditional Offer",
            ApplicationStatus::CasDocumentPending => "CAS Documents Pending",
            ApplicationStatus::CasInterviewPending => "CAS Interview Pending",
            ApplicationStatus::CasInterviewPassed => "CAS Interview Passed",
            ApplicationStatus::CasReceived => "CAS Received",
            ApplicationStatus::ApplyForVisa => "Apply For Visa",
            ApplicationStatus::VisaReceived => "Visa Received",
            ApplicationStatus::EnrollmentPending => "Enrollment Pending",
            ApplicationStatus::EnrollmentComplete => "Enrollment Complete",
        }
    }

    /// Rejected and EnrollmentComplete end the workflow
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::EnrollmentComplete
        )
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let legacy = match s {
            "CAS InterView Pending" => Some(ApplicationStatus::CasInterviewPending),
            "CAS InterView Passed" => Some(ApplicationStatus::CasInterviewPassed),
            "Enrollement Pending" => Some(ApplicationStatus::EnrollmentPending),
            "Enrollement Complete" => Some(ApplicationStatus::EnrollmentComplete),
            _ => None,
        };

        legacy
            .or_else(|| Self::ALL.iter().copied().find(|status| status.as_str() == s))
            .ok_or_else(|| UnknownVariant {
                kind: "application status",
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role derived from the user row on every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Agent,
}
