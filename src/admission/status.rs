use tracing::{info, warn};

use super::AdmissionError;
use crate::types::ApplicationStatus;

/// How a status update relates to the current state.
///
/// Every move is permitted; the classification only decides how loudly it is
/// logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Allowed,
    /// Moves an application out of Rejected or EnrollmentComplete
    LeavesTerminal,
}

impl Transition {
    pub fn classify(from: ApplicationStatus, to: ApplicationStatus) -> Self {
        if from == to {
            Transition::Unchanged
        } else if from.is_terminal() {
            Transition::LeavesTerminal
        } else {
            Transition::Allowed
        }
    }
}

/// Parse a status label from a query string or form field
pub fn parse_status(raw: &str) -> Result<ApplicationStatus, AdmissionError> {
    raw.trim().parse::<ApplicationStatus>().map_err(|_| {
        let allowed: Vec<&str> = ApplicationStatus::ALL.iter().map(|s| s.as_str()).collect();
        AdmissionError::invalid(format!(
            "Unknown status '{}'; expected one of: {}",
            raw,
            allowed.join(", ")
        ))
    })
}

/// Log a status change before it is written
pub fn record_transition(
    application_id: i32,
    from: ApplicationStatus,
    to: ApplicationStatus,
) -> Transition {
    let transition = Transition::classify(from, to);
    match transition {
        Transition::Unchanged => {}
        Transition::Allowed => {
            info!(application_id, %from, %to, "application status changed");
        }
        Transition::LeavesTerminal => {
            warn!(
                application_id,
                %from,
                %to,
                "application reopened from a terminal status"
            );
        }
    }
    transition
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_status_may_follow_any_other() {
        for from in ApplicationStatus::ALL {
            for to in ApplicationStatus::ALL {
                let transition = Transition::classify(from, to);
                match (from == to, from.is_terminal()) {
                    (true, _) => assert_eq!(transition, Transition::Unchanged),
                    (false, true) => assert_eq!(transition, Transition::LeavesTerminal),
                    (false, false) => assert_eq!(transition, Transition::Allowed),
                }
            }
        }
    }

    #[test]
    fn reopening_a_rejected_application_is_flagged() {
        assert_eq!(
            record_transition(1, ApplicationStatus::Rejected, ApplicationStatus::Review),
            Transition::LeavesTerminal
        );
        assert_eq!(
            record_transition(1, ApplicationStatus::New, ApplicationStatus::EnrollmentComplete),
            Transition::Allowed
        );
    }

    #[test]
    fn parse_status_lists_allowed_values_on_error() {
        assert_eq!(
            parse_status(" Visa Received ").unwrap(),
            ApplicationStatus::VisaReceived
        );
        match parse_status("Archived") {
            Err(AdmissionError::InvalidRequest(message)) => {
                assert!(message.contains("Archived"));
                assert!(message.contains("Commission Paid"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
