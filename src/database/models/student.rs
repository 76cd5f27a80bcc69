use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Admission enquiry submitted directly by a student, without an agent.
///
/// The preferred university is a required reference and cascades; the
/// country and course are free text checked against the catalog on write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StudentApplication {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub preferred_university_id: i32,
    pub residence_country: String,
    pub interest_country: String,
    pub intake_interest: String,
    pub last_graduation: String,
    pub interested_course: String,
    pub current_stage: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudentApplication {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub preferred_university_id: i32,
    pub residence_country: String,
    pub interest_country: String,
    pub intake_interest: String,
    pub last_graduation: String,
    pub interested_course: String,
    #[serde(default)]
    pub current_stage: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentApplicationPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub preferred_university_id: Option<i32>,
    pub residence_country: Option<String>,
    pub interest_country: Option<String>,
    pub intake_interest: Option<String>,
    pub last_graduation: Option<String>,
    pub interested_course: Option<String>,
    pub current_stage: Option<String>,
}

impl StudentApplicationPatch {
    pub fn touches_preference(&self) -> bool {
        self.preferred_university_id.is_some()
            || self.interest_country.is_some()
            || self.interested_course.is_some()
    }

    pub fn apply(&self, application: &mut StudentApplication) {
        if let Some(v) = &self.name {
            application.name = v.clone();
        }
        if let Some(v) = &self.phone {
            application.phone = v.clone();
        }
        if let Some(v) = &self.email {
            application.email = Some(v.clone());
        }
        if let Some(v) = self.preferred_university_id {
            application.preferred_university_id = v;
        }
        if let Some(v) = &self.residence_country {
            application.residence_country = v.clone();
        }
        if let Some(v) = &self.interest_country {
            application.interest_country = v.clone();
        }
        if let Some(v) = &self.intake_interest {
            application.intake_interest = v.clone();
        }
        if let Some(v) = &self.last_graduation {
            application.last_graduation = v.clone();
        }
        if let Some(v) = &self.interested_course {
            application.interested_course = v.clone();
        }
        if let Some(v) = &self.current_stage {
            application.current_stage = Some(v.clone());
        }
    }
}
