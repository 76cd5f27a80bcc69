use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::types::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_admin: bool,
    pub is_verified: bool,
}

impl User {
    pub fn role(&self) -> Role {
        if self.is_admin {
            Role::Admin
        } else {
            Role::Agent
        }
    }
}

/// Insert payload; the password is already hashed by the caller
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Agent profile, one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: i32,
    pub user_id: i32,
    pub full_name: String,
    pub phone: String,
    pub whatsapp: String,
    pub address: String,
    pub occupation: String,
    pub experience: bool,
    pub exp_description: Option<String>,
    pub initial_referrer: String,
    pub no_of_deal: i32,
    pub office: bool,
    pub office_address: Option<String>,
    pub student_country: String,
    pub student_destination_country: String,
    pub special_service: Option<String>,
    pub nid_passport_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
    pub full_name: String,
    pub phone: String,
    pub whatsapp: String,
    pub address: String,
    pub occupation: String,
    pub experience: bool,
    #[serde(default)]
    pub exp_description: Option<String>,
    #[serde(alias = "initial_refffer")]
    pub initial_referrer: String,
    #[serde(default)]
    pub no_of_deal: i32,
    #[serde(default)]
    pub office: bool,
    #[serde(default)]
    pub office_address: Option<String>,
    pub student_country: String,
    pub student_destination_country: String,
    #[serde(default)]
    pub special_service: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub experience: Option<bool>,
    pub exp_description: Option<String>,
    #[serde(alias = "initial_refffer")]
    pub initial_referrer: Option<String>,
    pub no_of_deal: Option<i32>,
    pub office: Option<bool>,
    pub office_address: Option<String>,
    pub student_country: Option<String>,
    pub student_destination_country: Option<String>,
    pub special_service: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.whatsapp.is_none()
            && self.address.is_none()
            && self.occupation.is_none()
            && self.experience.is_none()
            && self.exp_description.is_none()
            && self.initial_referrer.is_none()
            && self.no_of_deal.is_none()
            && self.office.is_none()
            && self.office_address.is_none()
            && self.student_country.is_none()
            && self.student_destination_country.is_none()
            && self.special_service.is_none()
    }

    pub fn apply(&self, profile: &mut UserProfile) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if let Some(v) = value {
                *target = Some(v.clone());
            }
        }

        set(&mut profile.full_name, &self.full_name);
        set(&mut profile.phone, &self.phone);
        set(&mut profile.whatsapp, &self.whatsapp);
        set(&mut profile.address, &self.address);
        set(&mut profile.occupation, &self.occupation);
        set(&mut profile.experience, &self.experience);
        set_opt(&mut profile.exp_description, &self.exp_description);
        set(&mut profile.initial_referrer, &self.initial_referrer);
        set(&mut profile.no_of_deal, &self.no_of_deal);
        set(&mut profile.office, &self.office);
        set_opt(&mut profile.office_address, &self.office_address);
        set(&mut profile.student_country, &self.student_country);
        set(&mut profile.student_destination_country, &self.student_destination_country);
        set_opt(&mut profile.special_service, &self.special_service);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_never_serializes() {
        let user = User {
            id: 7,
            username: "agent7".to_string(),
            email: "agent7@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            is_admin: false,
            is_verified: true,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(user.role(), Role::Agent);
    }

    #[test]
    fn empty_profile_patch_is_detected() {
        let patch: ProfilePatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
        let patch: ProfilePatch = serde_json::from_str(r#"{"office": true}"#).unwrap();
        assert!(!patch.is_empty());
    }
}
