use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::models::{
    AgentApplication, AgentApplicationFilter, AgentApplicationPatch, AgentDocumentField,
    AgentDocuments, Commission, CommissionPatch, Country, CountryPatch, Course, CoursePatch,
    NewAgentApplication, NewCountry, NewCourse, NewProfile, NewStudentApplication, NewUniversity,
    NewUser, ProfilePatch, StudentApplication, StudentApplicationPatch, StudentDocumentField,
    StudentDocuments, University, UniversityPatch, User, UserProfile,
};
use crate::database::store::{Store, StoreError, StoreResult};
use crate::types::ApplicationStatus;

/// Store kept entirely in process memory.
///
/// Used by the test suite and by `serve --memory`. A single lock guards all
/// tables so cascades and unique checks are atomic, the same guarantee the
/// database gives through constraints.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i32) -> T) -> T {
        self.next_id += 1;
        let row = build(self.next_id);
        self.rows.insert(self.next_id, row.clone());
        row
    }

    fn get(&self, id: i32) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn get_mut(&mut self, id: i32, entity: &'static str) -> StoreResult<&mut T> {
        self.rows.get_mut(&id).ok_or(StoreError::NotFound(entity))
    }

    fn contains(&self, id: i32) -> bool {
        self.rows.contains_key(&id)
    }

    fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.values().find(|row| predicate(row)).cloned()
    }

    fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| predicate(row)).cloned().collect()
    }

    fn remove(&mut self, id: i32, entity: &'static str) -> StoreResult<T> {
        self.rows.remove(&id).ok_or(StoreError::NotFound(entity))
    }

    fn retain(&mut self, keep: impl Fn(&T) -> bool) {
        self.rows.retain(|_, row| keep(row));
    }
}

#[derive(Default)]
struct Tables {
    countries: Table<Country>,
    universities: Table<University>,
    courses: Table<Course>,
    users: Table<User>,
    profiles: Table<UserProfile>,
    agent_applications: Table<AgentApplication>,
    commissions: Table<Commission>,
    agent_documents: Table<AgentDocuments>,
    student_applications: Table<StudentApplication>,
    student_documents: Table<StudentDocuments>,
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl Tables {
    fn require_country(&self, id: i32) -> StoreResult<()> {
        match self.countries.contains(id) {
            true => Ok(()),
            false => Err(StoreError::InvalidReference(format!("country {}", id))),
        }
    }

    fn require_university(&self, id: i32) -> StoreResult<()> {
        match self.universities.contains(id) {
            true => Ok(()),
            false => Err(StoreError::InvalidReference(format!("university {}", id))),
        }
    }

    fn require_course(&self, id: i32) -> StoreResult<()> {
        match self.courses.contains(id) {
            true => Ok(()),
            false => Err(StoreError::InvalidReference(format!("course {}", id))),
        }
    }

    fn require_user(&self, id: i32) -> StoreResult<()> {
        match self.users.contains(id) {
            true => Ok(()),
            false => Err(StoreError::InvalidReference(format!("user {}", id))),
        }
    }

    fn require_agent_application(&self, id: i32) -> StoreResult<()> {
        match self.agent_applications.contains(id) {
            true => Ok(()),
            false => Err(StoreError::InvalidReference(format!("agent application {}", id))),
        }
    }

    fn require_student_application(&self, id: i32) -> StoreResult<()> {
        match self.student_applications.contains(id) {
            true => Ok(()),
            false => Err(StoreError::InvalidReference(format!("student application {}", id))),
        }
    }

    /// Every optional reference an agent application carries must resolve
    fn require_selection(
        &self,
        course_id: Option<i32>,
        universities: [Option<i32>; 3],
        country_id: Option<i32>,
    ) -> StoreResult<()> {
        if let Some(id) = course_id {
            self.require_course(id)?;
        }
        for id in universities.into_iter().flatten() {
            self.require_university(id)?;
        }
        if let Some(id) = country_id {
            self.require_country(id)?;
        }
        Ok(())
    }

    fn remove_country(&mut self, id: i32) -> StoreResult<()> {
        self.countries.remove(id, "country")?;
        let universities: Vec<i32> = self
            .universities
            .filter(|u| u.country_id == id)
            .into_iter()
            .map(|u| u.id)
            .collect();
        for university_id in universities {
            self.remove_university(university_id)?;
        }
        for application in self.agent_applications.rows.values_mut() {
            if application.country_id == Some(id) {
                application.country_id = None;
            }
        }
        Ok(())
    }

    fn remove_university(&mut self, id: i32) -> StoreResult<()> {
        self.universities.remove(id, "university")?;
        let courses: Vec<i32> = self
            .courses
            .filter(|c| c.university_id == id)
            .into_iter()
            .map(|c| c.id)
            .collect();
        for course_id in courses {
            self.remove_course(course_id)?;
        }
        let students: Vec<i32> = self
            .student_applications
            .filter(|s| s.preferred_university_id == id)
            .into_iter()
            .map(|s| s.id)
            .collect();
        for student_id in students {
            self.remove_student_application(student_id)?;
        }
        for application in self.agent_applications.rows.values_mut() {
            for slot in [
                &mut application.university_one_id,
                &mut application.university_two_id,
                &mut application.university_three_id,
            ] {
                if *slot == Some(id) {
                    *slot = None;
                }
            }
        }
        Ok(())
    }

    fn remove_course(&mut self, id: i32) -> StoreResult<()> {
        self.courses.remove(id, "course")?;
        for application in self.agent_applications.rows.values_mut() {
            if application.course_id == Some(id) {
                application.course_id = None;
            }
        }
        Ok(())
    }

    fn remove_user(&mut self, id: i32) -> StoreResult<()> {
        self.users.remove(id, "user")?;
        self.profiles.retain(|p| p.user_id != id);
        for application in self.agent_applications.rows.values_mut() {
            if application.agent_id == Some(id) {
                application.agent_id = None;
            }
        }
        Ok(())
    }

    fn remove_agent_application(&mut self, id: i32) -> StoreResult<()> {
        self.agent_applications.remove(id, "agent application")?;
        self.commissions.retain(|c| c.application_id != id);
        self.agent_documents.retain(|d| d.application_id != id);
        Ok(())
    }

    fn remove_student_application(&mut self, id: i32) -> StoreResult<()> {
        self.student_applications.remove(id, "student application")?;
        self.student_documents.retain(|d| d.application_id != id);
        Ok(())
    }

    fn profile_mut(&mut self, user_id: i32) -> StoreResult<&mut UserProfile> {
        self.profiles
            .rows
            .values_mut()
            .find(|p| p.user_id == user_id)
            .ok_or(StoreError::NotFound("profile"))
    }

    fn commission_mut(&mut self, application_id: i32) -> StoreResult<&mut Commission> {
        self.commissions
            .rows
            .values_mut()
            .find(|c| c.application_id == application_id)
            .ok_or(StoreError::NotFound("commission"))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_country(&self, new: NewCountry) -> StoreResult<Country> {
        let mut tables = self.tables.write().await;
        Ok(tables.countries.insert_with(|id| Country {
            id,
            name: new.name,
            description: new.description,
        }))
    }

    async fn get_country(&self, id: i32) -> StoreResult<Option<Country>> {
        Ok(self.tables.read().await.countries.get(id))
    }

    async fn find_country_by_name(&self, name: &str) -> StoreResult<Option<Country>> {
        Ok(self.tables.read().await.countries.find(|c| same_name(&c.name, name)))
    }

    async fn list_countries(&self) -> StoreResult<Vec<Country>> {
        Ok(self.tables.read().await.countries.filter(|_| true))
    }

    async fn update_country(&self, id: i32, patch: &CountryPatch) -> StoreResult<Country> {
        let mut tables = self.tables.write().await;
        let country = tables.countries.get_mut(id, "country")?;
        patch.apply(country);
        Ok(country.clone())
    }

    async fn delete_country(&self, id: i32) -> StoreResult<()> {
        self.tables.write().await.remove_country(id)
    }

    async fn create_university(&self, new: NewUniversity) -> StoreResult<University> {
        let mut tables = self.tables.write().await;
        tables.require_country(new.country_id)?;
        Ok(tables.universities.insert_with(|id| University {
            id,
            country_id: new.country_id,
            university_type: new.university_type,
            name: new.name,
            location: new.location,
            description: new.description,
            image: None,
        }))
    }

    async fn get_university(&self, id: i32) -> StoreResult<Option<University>> {
        Ok(self.tables.read().await.universities.get(id))
    }

    async fn list_universities(&self, country_id: Option<i32>) -> StoreResult<Vec<University>> {
        let tables = self.tables.read().await;
        Ok(tables
            .universities
            .filter(|u| country_id.map_or(true, |id| u.country_id == id)))
    }

    async fn update_university(&self, id: i32, patch: &UniversityPatch) -> StoreResult<University> {
        let mut tables = self.tables.write().await;
        if let Some(country_id) = patch.country_id {
            tables.require_country(country_id)?;
        }
        let university = tables.universities.get_mut(id, "university")?;
        patch.apply(university);
        Ok(university.clone())
    }

    async fn set_university_image(&self, id: i32, path: &str) -> StoreResult<University> {
        let mut tables = self.tables.write().await;
        let university = tables.universities.get_mut(id, "university")?;
        university.image = Some(path.to_string());
        Ok(university.clone())
    }

    async fn delete_university(&self, id: i32) -> StoreResult<()> {
        self.tables.write().await.remove_university(id)
    }

    async fn create_course(&self, new: NewCourse) -> StoreResult<Course> {
        let mut tables = self.tables.write().await;
        tables.require_university(new.university_id)?;
        Ok(tables.courses.insert_with(|id| Course {
            id,
            university_id: new.university_id,
            name: new.name,
            course_type: new.course_type,
            fee: new.fee,
            description: new.description,
            image: None,
        }))
    }

    async fn get_course(&self, id: i32) -> StoreResult<Option<Course>> {
        Ok(self.tables.read().await.courses.get(id))
    }

    async fn list_courses(&self, university_id: Option<i32>) -> StoreResult<Vec<Course>> {
        let tables = self.tables.read().await;
        Ok(tables
            .courses
            .filter(|c| university_id.map_or(true, |id| c.university_id == id)))
    }

    async fn find_courses_by_name(&self, name: &str) -> StoreResult<Vec<Course>> {
        Ok(self.tables.read().await.courses.filter(|c| same_name(&c.name, name)))
    }

    async fn update_course(&self, id: i32, patch: &CoursePatch) -> StoreResult<Course> {
        let mut tables = self.tables.write().await;
        if let Some(university_id) = patch.university_id {
            tables.require_university(university_id)?;
        }
        let course = tables.courses.get_mut(id, "course")?;
        patch.apply(course);
        Ok(course.clone())
    }

    async fn set_course_image(&self, id: i32, path: &str) -> StoreResult<Course> {
        let mut tables = self.tables.write().await;
        let course = tables.courses.get_mut(id, "course")?;
        course.image = Some(path.to_string());
        Ok(course.clone())
    }

    async fn delete_course(&self, id: i32) -> StoreResult<()> {
        self.tables.write().await.remove_course(id)
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.find(|u| u.username == new.username).is_some() {
            return Err(StoreError::Conflict("users_username_key".to_string()));
        }
        if tables.users.find(|u| u.email == new.email).is_some() {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }
        Ok(tables.users.insert_with(|id| User {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            is_admin: new.is_admin,
            is_verified: false,
        }))
    }

    async fn get_user(&self, id: i32) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.find(|u| u.username == username))
    }

    async fn list_users(&self, is_admin: Option<bool>) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .filter(|u| is_admin.map_or(true, |admin| u.is_admin == admin)))
    }

    async fn set_user_verified(&self, id: i32, verified: bool) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(id, "user")?;
        user.is_verified = verified;
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i32) -> StoreResult<()> {
        self.tables.write().await.remove_user(id)
    }

    async fn create_profile(&self, user_id: i32, new: NewProfile) -> StoreResult<UserProfile> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;
        if tables.profiles.find(|p| p.user_id == user_id).is_some() {
            return Err(StoreError::Conflict("user_profiles_user_id_key".to_string()));
        }
        Ok(tables.profiles.insert_with(|id| UserProfile {
            id,
            user_id,
            full_name: new.full_name,
            phone: new.phone,
            whatsapp: new.whatsapp,
            address: new.address,
            occupation: new.occupation,
            experience: new.experience,
            exp_description: new.exp_description,
            initial_referrer: new.initial_referrer,
            no_of_deal: new.no_of_deal,
            office: new.office,
            office_address: new.office_address,
            student_country: new.student_country,
            student_destination_country: new.student_destination_country,
            special_service: new.special_service,
            nid_passport_file: None,
        }))
    }

    async fn get_profile(&self, user_id: i32) -> StoreResult<Option<UserProfile>> {
        Ok(self.tables.read().await.profiles.find(|p| p.user_id == user_id))
    }

    async fn update_profile(&self, user_id: i32, patch: &ProfilePatch) -> StoreResult<UserProfile> {
        let mut tables = self.tables.write().await;
        let profile = tables.profile_mut(user_id)?;
        patch.apply(profile);
        Ok(profile.clone())
    }

    async fn set_profile_file(&self, user_id: i32, path: Option<&str>) -> StoreResult<UserProfile> {
        let mut tables = self.tables.write().await;
        let profile = tables.profile_mut(user_id)?;
        profile.nid_passport_file = path.map(str::to_string);
        Ok(profile.clone())
    }

    async fn delete_profile(&self, user_id: i32) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let id = tables.profile_mut(user_id)?.id;
        tables.profiles.remove(id, "profile").map(|_| ())
    }

    async fn create_agent_application(
        &self,
        agent_id: i32,
        new: NewAgentApplication,
    ) -> StoreResult<AgentApplication> {
        let mut tables = self.tables.write().await;
        tables.require_user(agent_id)?;
        tables.require_selection(new.course_id, new.university_slots(), new.country_id)?;
        Ok(tables.agent_applications.insert_with(|id| AgentApplication {
            id,
            agent_id: Some(agent_id),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            phone: new.phone,
            passport_no: new.passport_no,
            course_id: new.course_id,
            university_one_id: new.university_one_id,
            university_two_id: new.university_two_id,
            university_three_id: new.university_three_id,
            country_id: new.country_id,
            last_graduation: new.last_graduation,
            status: ApplicationStatus::New,
            created_at: Utc::now(),
        }))
    }

    async fn get_agent_application(&self, id: i32) -> StoreResult<Option<AgentApplication>> {
        Ok(self.tables.read().await.agent_applications.get(id))
    }

    async fn list_agent_applications(
        &self,
        filter: &AgentApplicationFilter,
    ) -> StoreResult<Vec<AgentApplication>> {
        Ok(self.tables.read().await.agent_applications.filter(|a| filter.matches(a)))
    }

    async fn update_agent_application(
        &self,
        id: i32,
        patch: &AgentApplicationPatch,
    ) -> StoreResult<AgentApplication> {
        let mut tables = self.tables.write().await;
        tables.require_selection(
            patch.course_id,
            [
                patch.university_one_id,
                patch.university_two_id,
                patch.university_three_id,
            ],
            patch.country_id,
        )?;
        let application = tables.agent_applications.get_mut(id, "agent application")?;
        patch.apply(application);
        Ok(application.clone())
    }

    async fn delete_agent_application(&self, id: i32) -> StoreResult<()> {
        self.tables.write().await.remove_agent_application(id)
    }

    async fn get_commission(&self, application_id: i32) -> StoreResult<Option<Commission>> {
        let tables = self.tables.read().await;
        Ok(tables.commissions.find(|c| c.application_id == application_id))
    }

    async fn insert_commission(&self, application_id: i32) -> StoreResult<Commission> {
        let mut tables = self.tables.write().await;
        tables.require_agent_application(application_id)?;
        if tables.commissions.find(|c| c.application_id == application_id).is_some() {
            return Err(StoreError::Conflict("commissions_application_id_key".to_string()));
        }
        Ok(tables.commissions.insert_with(|id| Commission {
            id,
            application_id,
            student_fee: 0,
            commission: 0,
            commission_rate: 0,
        }))
    }

    async fn update_commission(
        &self,
        application_id: i32,
        patch: &CommissionPatch,
    ) -> StoreResult<Commission> {
        let mut tables = self.tables.write().await;
        let commission = tables.commission_mut(application_id)?;
        patch.apply(commission);
        Ok(commission.clone())
    }

    async fn get_agent_documents(&self, application_id: i32) -> StoreResult<Option<AgentDocuments>> {
        let tables = self.tables.read().await;
        Ok(tables.agent_documents.find(|d| d.application_id == application_id))
    }

    async fn insert_agent_documents(&self, application_id: i32) -> StoreResult<AgentDocuments> {
        let mut tables = self.tables.write().await;
        tables.require_agent_application(application_id)?;
        if tables.agent_documents.find(|d| d.application_id == application_id).is_some() {
            return Err(StoreError::Conflict("agent_documents_application_id_key".to_string()));
        }
        Ok(tables.agent_documents.insert_with(|id| AgentDocuments {
            id,
            ..AgentDocuments::empty(application_id)
        }))
    }

    async fn set_agent_document(
        &self,
        application_id: i32,
        field: AgentDocumentField,
        path: &str,
    ) -> StoreResult<AgentDocuments> {
        let mut tables = self.tables.write().await;
        let documents = tables
            .agent_documents
            .rows
            .values_mut()
            .find(|d| d.application_id == application_id)
            .ok_or(StoreError::NotFound("agent documents"))?;
        *documents.slot_mut(field) = Some(path.to_string());
        Ok(documents.clone())
    }

    async fn create_student_application(
        &self,
        new: NewStudentApplication,
    ) -> StoreResult<StudentApplication> {
        let mut tables = self.tables.write().await;
        tables.require_university(new.preferred_university_id)?;
        Ok(tables.student_applications.insert_with(|id| StudentApplication {
            id,
            name: new.name,
            phone: new.phone,
            email: new.email,
            preferred_university_id: new.preferred_university_id,
            residence_country: new.residence_country,
            interest_country: new.interest_country,
            intake_interest: new.intake_interest,
            last_graduation: new.last_graduation,
            interested_course: new.interested_course,
            current_stage: new.current_stage,
            created_at: Utc::now(),
        }))
    }

    async fn get_student_application(&self, id: i32) -> StoreResult<Option<StudentApplication>> {
        Ok(self.tables.read().await.student_applications.get(id))
    }

    async fn list_student_applications(&self) -> StoreResult<Vec<StudentApplication>> {
        Ok(self.tables.read().await.student_applications.filter(|_| true))
    }

    async fn list_student_applications_for_university(
        &self,
        university_id: i32,
    ) -> StoreResult<Vec<StudentApplication>> {
        Ok(self
            .tables
            .read()
            .await
            .student_applications
            .filter(|a| a.preferred_university_id == university_id))
    }

    async fn update_student_application(
        &self,
        id: i32,
        patch: &StudentApplicationPatch,
    ) -> StoreResult<StudentApplication> {
        let mut tables = self.tables.write().await;
        if let Some(university_id) = patch.preferred_university_id {
            tables.require_university(university_id)?;
        }
        let application = tables.student_applications.get_mut(id, "student application")?;
        patch.apply(application);
        Ok(application.clone())
    }

    async fn delete_student_application(&self, id: i32) -> StoreResult<()> {
        self.tables.write().await.remove_student_application(id)
    }

    async fn get_student_documents(
        &self,
        application_id: i32,
    ) -> StoreResult<Option<StudentDocuments>> {
        let tables = self.tables.read().await;
        Ok(tables.student_documents.find(|d| d.application_id == application_id))
    }

    async fn insert_student_documents(&self, application_id: i32) -> StoreResult<StudentDocuments> {
        let mut tables = self.tables.write().await;
        tables.require_student_application(application_id)?;
        if tables.student_documents.find(|d| d.application_id == application_id).is_some() {
            return Err(StoreError::Conflict("student_documents_application_id_key".to_string()));
        }
        Ok(tables.student_documents.insert_with(|id| StudentDocuments {
            id,
            ..StudentDocuments::empty(application_id)
        }))
    }

    async fn set_student_document(
        &self,
        application_id: i32,
        field: StudentDocumentField,
        path: &str,
    ) -> StoreResult<StudentDocuments> {
        let mut tables = self.tables.write().await;
        let documents = tables
            .student_documents
            .rows
            .values_mut()
            .find(|d| d.application_id == application_id)
            .ok_or(StoreError::NotFound("student documents"))?;
        *documents.slot_mut(field) = Some(path.to_string());
        Ok(documents.clone())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UniversityType;

    async fn seed_university(store: &MemoryStore, country: &str, name: &str) -> (Country, University) {
        let country = match store.find_country_by_name(country).await.unwrap() {
            Some(existing) => existing,
            None => store
                .create_country(NewCountry {
                    name: country.to_string(),
                    description: None,
                })
                .await
                .unwrap(),
        };
        let university = store
            .create_university(NewUniversity {
                country_id: country.id,
                university_type: UniversityType::Public,
                name: name.to_string(),
                location: "Capital".to_string(),
                description: None,
            })
            .await
            .unwrap();
        (country, university)
    }

    async fn seed_agent(store: &MemoryStore) -> User {
        store
            .create_user(NewUser {
                username: "agent".to_string(),
                email: "agent@example.com".to_string(),
                password_hash: "hash".to_string(),
                is_admin: false,
            })
            .await
            .unwrap()
    }

    fn application(university: &University, course: Option<&Course>) -> NewAgentApplication {
        NewAgentApplication {
            first_name: "Rafi".to_string(),
            last_name: "Hasan".to_string(),
            email: "rafi@example.com".to_string(),
            phone: "0123".to_string(),
            passport_no: "P1".to_string(),
            course_id: course.map(|c| c.id),
            university_one_id: Some(university.id),
            university_two_id: None,
            university_three_id: None,
            country_id: Some(university.country_id),
            last_graduation: None,
        }
    }

    #[tokio::test]
    async fn deleting_a_country_cascades_to_universities_and_courses() {
        let store = MemoryStore::new();
        let (country, university) = seed_university(&store, "United Kingdom", "Leeds").await;
        let (_, other) = seed_university(&store, "Canada", "McGill").await;
        let course = store
            .create_course(NewCourse {
                university_id: university.id,
                name: "BSc Computing".to_string(),
                course_type: None,
                fee: Some(18_000),
                description: None,
            })
            .await
            .unwrap();

        store.delete_country(country.id).await.unwrap();

        assert!(store.get_university(university.id).await.unwrap().is_none());
        assert!(store.get_course(course.id).await.unwrap().is_none());
        assert!(store.get_university(other.id).await.unwrap().is_some());
        assert!(matches!(
            store.delete_country(country.id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn deleting_references_nulls_agent_application_fields() {
        let store = MemoryStore::new();
        let agent = seed_agent(&store).await;
        let (_, university) = seed_university(&store, "Germany", "TU Munich").await;
        let course = store
            .create_course(NewCourse {
                university_id: university.id,
                name: "MSc Informatics".to_string(),
                course_type: None,
                fee: None,
                description: None,
            })
            .await
            .unwrap();
        let created = store
            .create_agent_application(agent.id, application(&university, Some(&course)))
            .await
            .unwrap();

        store.delete_course(course.id).await.unwrap();
        let after_course = store.get_agent_application(created.id).await.unwrap().unwrap();
        assert_eq!(after_course.course_id, None);
        assert_eq!(after_course.university_one_id, Some(university.id));

        store.delete_university(university.id).await.unwrap();
        store.delete_user(agent.id).await.unwrap();
        let after = store.get_agent_application(created.id).await.unwrap().unwrap();
        assert_eq!(after.university_slots(), [None, None, None]);
        assert_eq!(after.agent_id, None);
        assert_eq!(after.first_name, "Rafi");
    }

    #[tokio::test]
    async fn deleting_a_university_removes_student_applications_and_documents() {
        let store = MemoryStore::new();
        let (_, university) = seed_university(&store, "India", "IIT Delhi").await;
        let student = store
            .create_student_application(NewStudentApplication {
                name: "Anika".to_string(),
                phone: "0199".to_string(),
                email: None,
                preferred_university_id: university.id,
                residence_country: "Bangladesh".to_string(),
                interest_country: "India".to_string(),
                intake_interest: "Fall".to_string(),
                last_graduation: "HSC".to_string(),
                interested_course: "BTech".to_string(),
                current_stage: None,
            })
            .await
            .unwrap();
        store.insert_student_documents(student.id).await.unwrap();

        store.delete_university(university.id).await.unwrap();

        assert!(store.get_student_application(student.id).await.unwrap().is_none());
        assert!(store.get_student_documents(student.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unique_constraints_report_conflict() {
        let store = MemoryStore::new();
        let agent = seed_agent(&store).await;
        let duplicate = store
            .create_user(NewUser {
                username: "agent".to_string(),
                email: "other@example.com".to_string(),
                password_hash: "hash".to_string(),
                is_admin: false,
            })
            .await;
        assert!(matches!(duplicate, Err(StoreError::Conflict(_))));

        let (_, university) = seed_university(&store, "Japan", "Kyoto").await;
        let created = store
            .create_agent_application(agent.id, application(&university, None))
            .await
            .unwrap();
        store.insert_commission(created.id).await.unwrap();
        assert!(matches!(
            store.insert_commission(created.id).await,
            Err(StoreError::Conflict(_))
        ));
        assert!(matches!(
            store.insert_commission(created.id + 100).await,
            Err(StoreError::InvalidReference(_))
        ));
    }

    #[tokio::test]
    async fn deleting_an_application_cascades_to_commission_and_documents() {
        let store = MemoryStore::new();
        let agent = seed_agent(&store).await;
        let (_, university) = seed_university(&store, "Australia", "Monash").await;
        let created = store
            .create_agent_application(agent.id, application(&university, None))
            .await
            .unwrap();
        store.insert_commission(created.id).await.unwrap();
        store.insert_agent_documents(created.id).await.unwrap();

        store.delete_agent_application(created.id).await.unwrap();

        assert!(store.get_commission(created.id).await.unwrap().is_none());
        assert!(store.get_agent_documents(created.id).await.unwrap().is_none());
    }
}
