use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::ApplicationStatus;

/// Admission application submitted by an agent on behalf of a student.
///
/// Every foreign key is nullable: deleting the agent, the course, the country
/// or any of the selected universities nulls the reference instead of
/// removing the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AgentApplication {
    pub id: i32,
    pub agent_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub passport_no: String,
    pub course_id: Option<i32>,
    pub university_one_id: Option<i32>,
    pub university_two_id: Option<i32>,
    pub university_three_id: Option<i32>,
    pub country_id: Option<i32>,
    pub last_graduation: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl AgentApplication {
    pub fn university_slots(&self) -> [Option<i32>; 3] {
        [
            self.university_one_id,
            self.university_two_id,
            self.university_three_id,
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAgentApplication {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub passport_no: String,
    #[serde(default)]
    pub course_id: Option<i32>,
    #[serde(default)]
    pub university_one_id: Option<i32>,
    #[serde(default)]
    pub university_two_id: Option<i32>,
    #[serde(default)]
    pub university_three_id: Option<i32>,
    #[serde(default)]
    pub country_id: Option<i32>,
    #[serde(default)]
    pub last_graduation: Option<String>,
}

impl NewAgentApplication {
    pub fn university_slots(&self) -> [Option<i32>; 3] {
        [
            self.university_one_id,
            self.university_two_id,
            self.university_three_id,
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentApplicationPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub passport_no: Option<String>,
    pub course_id: Option<i32>,
    pub university_one_id: Option<i32>,
    pub university_two_id: Option<i32>,
    pub university_three_id: Option<i32>,
    pub country_id: Option<i32>,
    pub last_graduation: Option<String>,
    pub status: Option<ApplicationStatus>,
}

impl AgentApplicationPatch {
    /// Whether the patch changes anything the selection rules look at
    pub fn touches_selection(&self) -> bool {
        self.course_id.is_some()
            || self.university_one_id.is_some()
            || self.university_two_id.is_some()
            || self.university_three_id.is_some()
            || self.country_id.is_some()
    }

    /// University slots after the patch is laid over the stored row
    pub fn merged_slots(&self, current: &AgentApplication) -> [Option<i32>; 3] {
        [
            self.university_one_id.or(current.university_one_id),
            self.university_two_id.or(current.university_two_id),
            self.university_three_id.or(current.university_three_id),
        ]
    }

    pub fn apply(&self, application: &mut AgentApplication) {
        if let Some(v) = &self.first_name {
            application.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            application.last_name = v.clone();
        }
        if let Some(v) = &self.email {
            application.email = v.clone();
        }
        if let Some(v) = &self.phone {
            application.phone = v.clone();
        }
        if let Some(v) = &self.passport_no {
            application.passport_no = v.clone();
        }
        if self.course_id.is_some() {
            application.course_id = self.course_id;
        }
        let [one, two, three] = self.merged_slots(application);
        application.university_one_id = one;
        application.university_two_id = two;
        application.university_three_id = three;
        if self.country_id.is_some() {
            application.country_id = self.country_id;
        }
        if let Some(v) = &self.last_graduation {
            application.last_graduation = Some(v.clone());
        }
        if let Some(status) = self.status {
            application.status = status;
        }
    }
}

/// List filter: admins pass no agent, agents are pinned to their own id.
///
/// `university_id` matches any of the three slots.
#[derive(Debug, Clone, Default)]
pub struct AgentApplicationFilter {
    pub agent_id: Option<i32>,
    pub status: Option<ApplicationStatus>,
    pub university_id: Option<i32>,
    pub course_id: Option<i32>,
}

impl AgentApplicationFilter {
    pub fn matches(&self, application: &AgentApplication) -> bool {
        self.agent_id.map_or(true, |id| application.agent_id == Some(id))
            && self.status.map_or(true, |s| application.status == s)
            && self.university_id.map_or(true, |id| {
                application.university_slots().contains(&Some(id))
            })
            && self.course_id.map_or(true, |id| application.course_id == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> AgentApplication {
        AgentApplication {
            id: 1,
            agent_id: Some(4),
            first_name: "Nadia".to_string(),
            last_name: "Rahman".to_string(),
            email: "nadia@example.com".to_string(),
            phone: "+8801700000000".to_string(),
            passport_no: "BX0123456".to_string(),
            course_id: None,
            university_one_id: Some(10),
            university_two_id: None,
            university_three_id: None,
            country_id: Some(3),
            last_graduation: None,
            status: ApplicationStatus::New,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn graduation_only_patch_does_not_touch_selection() {
        let patch: AgentApplicationPatch =
            serde_json::from_str(r#"{"last_graduation": "BSc"}"#).unwrap();
        assert!(!patch.touches_selection());

        let mut application = stored();
        patch.apply(&mut application);
        assert_eq!(application.last_graduation.as_deref(), Some("BSc"));
        assert_eq!(application.university_slots(), [Some(10), None, None]);
        assert_eq!(application.country_id, Some(3));
    }

    #[test]
    fn merged_slots_fall_back_to_stored_values() {
        let patch = AgentApplicationPatch {
            university_two_id: Some(11),
            ..Default::default()
        };
        assert!(patch.touches_selection());
        assert_eq!(patch.merged_slots(&stored()), [Some(10), Some(11), None]);
    }

    #[test]
    fn filter_pins_agent_and_status() {
        let application = stored();
        let own = AgentApplicationFilter {
            agent_id: Some(4),
            ..Default::default()
        };
        let other = AgentApplicationFilter {
            agent_id: Some(5),
            ..Default::default()
        };
        let review = AgentApplicationFilter {
            status: Some(ApplicationStatus::Review),
            ..Default::default()
        };
        assert!(own.matches(&application));
        assert!(!other.matches(&application));
        assert!(!review.matches(&application));
    }

    #[test]
    fn filter_matches_any_university_slot() {
        let application = stored();
        for (id, expected) in [(10, true), (11, false)] {
            let filter = AgentApplicationFilter {
                university_id: Some(id),
                ..Default::default()
            };
            assert_eq!(filter.matches(&application), expected, "university {}", id);
        }
        let course = AgentApplicationFilter {
            course_id: Some(77),
            ..Default::default()
        };
        assert!(!course.matches(&application));
    }
}
