// Catalog entities: Country -> University -> Course.
// Each level owns the next; deleting a parent cascades to its children.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::UniversityType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Country {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCountry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CountryPatch {
    pub fn apply(&self, country: &mut Country) {
        if let Some(name) = &self.name {
            country.name = name.clone();
        }
        if let Some(description) = &self.description {
            country.description = Some(description.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct University {
    pub id: i32,
    pub country_id: i32,
    #[sqlx(try_from = "String")]
    pub university_type: UniversityType,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUniversity {
    pub country_id: i32,
    #[serde(default, alias = "varsity_type")]
    pub university_type: UniversityType,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UniversityPatch {
    pub country_id: Option<i32>,
    #[serde(alias = "varsity_type")]
    pub university_type: Option<UniversityType>,
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl UniversityPatch {
    pub fn apply(&self, university: &mut University) {
        if let Some(country_id) = self.country_id {
            university.country_id = country_id;
        }
        if let Some(university_type) = self.university_type {
            university.university_type = university_type;
        }
        if let Some(name) = &self.name {
            university.name = name.clone();
        }
        if let Some(location) = &self.location {
            university.location = location.clone();
        }
        if let Some(description) = &self.description {
            university.description = Some(description.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i32,
    pub university_id: i32,
    pub name: String,
    pub course_type: Option<String>,
    pub fee: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub university_id: i32,
    pub name: String,
    #[serde(default)]
    pub course_type: Option<String>,
    #[serde(default)]
    pub fee: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoursePatch {
    pub university_id: Option<i32>,
    pub name: Option<String>,
    pub course_type: Option<String>,
    pub fee: Option<i32>,
    pub description: Option<String>,
}

impl CoursePatch {
    pub fn apply(&self, course: &mut Course) {
        if let Some(university_id) = self.university_id {
            course.university_id = university_id;
        }
        if let Some(name) = &self.name {
            course.name = name.clone();
        }
        if let Some(course_type) = &self.course_type {
            course.course_type = Some(course_type.clone());
        }
        if let Some(fee) = self.fee {
            course.fee = Some(fee);
        }
        if let Some(description) = &self.description {
            course.description = Some(description.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn university_payload_accepts_legacy_type_field() {
        let payload: NewUniversity = serde_json::from_value(serde_json::json!({
            "country_id": 1,
            "varsity_type": "Private",
            "name": "Monash",
            "location": "Kuala Lumpur"
        }))
        .unwrap();
        assert_eq!(payload.university_type, UniversityType::Private);
        assert!(payload.description.is_none());
    }

    #[test]
    fn course_patch_only_touches_supplied_fields() {
        let mut course = Course {
            id: 1,
            university_id: 2,
            name: "MSc Data Science".to_string(),
            course_type: Some("Masters".to_string()),
            fee: Some(12_000),
            description: None,
            image: None,
        };
        let patch: CoursePatch = serde_json::from_str(r#"{"fee": 15000, "name": null}"#).unwrap();
        patch.apply(&mut course);
        assert_eq!(course.fee, Some(15_000));
        assert_eq!(course.name, "MSc Data Science");
        assert_eq!(course.university_id, 2);
    }
}
