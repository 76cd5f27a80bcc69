use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::models::{
    AgentApplication, AgentApplicationFilter, AgentApplicationPatch, AgentDocumentField,
    AgentDocuments, Commission, CommissionPatch, Country, CountryPatch, Course, CoursePatch,
    DocumentField, NewAgentApplication, NewCountry, NewCourse, NewProfile, NewStudentApplication,
    NewUniversity, NewUser, ProfilePatch, StudentApplication, StudentApplicationPatch,
    StudentDocumentField, StudentDocuments, University, UniversityPatch, User, UserProfile,
};
use crate::database::store::{Store, StoreError, StoreResult};

const COUNTRY_COLUMNS: &str = "id, name, description";
const UNIVERSITY_COLUMNS: &str =
    "id, country_id, university_type, name, location, description, image";
const COURSE_COLUMNS: &str = "id, university_id, name, course_type, fee, description, image";
const USER_COLUMNS: &str = "id, username, email, password_hash, is_admin, is_verified";
const PROFILE_COLUMNS: &str = "id, user_id, full_name, phone, whatsapp, address, occupation,
    experience, exp_description, initial_referrer, no_of_deal, office, office_address,
    student_country, student_destination_country, special_service, nid_passport_file";
const AGENT_APPLICATION_COLUMNS: &str = "id, agent_id, first_name, last_name, email, phone,
    passport_no, course_id, university_one_id, university_two_id, university_three_id,
    country_id, last_graduation, status, created_at";
const COMMISSION_COLUMNS: &str = "id, application_id, student_fee, commission, commission_rate";
const AGENT_DOCUMENT_COLUMNS: &str = "id, application_id, passport, masters_certificate,
    masters_transcript, honers_certificate, honers_transcript, hsc_certificate, hsc_transcript,
    ssc_certificate, ssc_transcript, ielts_certificate, cv, resume, lor, job_letter, others";
const STUDENT_APPLICATION_COLUMNS: &str = "id, name, phone, email, preferred_university_id,
    residence_country, interest_country, intake_interest, last_graduation, interested_course,
    current_stage, created_at";
const STUDENT_DOCUMENT_COLUMNS: &str = "id, application_id, passport, last_graduation_certificate";

/// PostgreSQL-backed store; referential policies live in the schema
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn delete_by(&self, table: &str, key: &str, id: i32, entity: &'static str) -> StoreResult<()> {
        let sql = format!("DELETE FROM {} WHERE {} = $1", table, key);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(entity));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_country(&self, new: NewCountry) -> StoreResult<Country> {
        let sql = format!(
            "INSERT INTO countries (name, description) VALUES ($1, $2) RETURNING {}",
            COUNTRY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Country>(&sql)
            .bind(new.name)
            .bind(new.description)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_country(&self, id: i32) -> StoreResult<Option<Country>> {
        let sql = format!("SELECT {} FROM countries WHERE id = $1", COUNTRY_COLUMNS);
        Ok(sqlx::query_as::<_, Country>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_country_by_name(&self, name: &str) -> StoreResult<Option<Country>> {
        let sql = format!(
            "SELECT {} FROM countries WHERE lower(name) = lower($1) ORDER BY id LIMIT 1",
            COUNTRY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Country>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_countries(&self) -> StoreResult<Vec<Country>> {
        let sql = format!("SELECT {} FROM countries ORDER BY id", COUNTRY_COLUMNS);
        Ok(sqlx::query_as::<_, Country>(&sql).fetch_all(&self.pool).await?)
    }

    async fn update_country(&self, id: i32, patch: &CountryPatch) -> StoreResult<Country> {
        let sql = format!(
            "UPDATE countries SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1 RETURNING {}",
            COUNTRY_COLUMNS
        );
        sqlx::query_as::<_, Country>(&sql)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("country"))
    }

    async fn delete_country(&self, id: i32) -> StoreResult<()> {
        self.delete_by("countries", "id", id, "country").await
    }

    async fn create_university(&self, new: NewUniversity) -> StoreResult<University> {
        let sql = format!(
            "INSERT INTO universities (country_id, university_type, name, location, description)
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            UNIVERSITY_COLUMNS
        );
        Ok(sqlx::query_as::<_, University>(&sql)
            .bind(new.country_id)
            .bind(new.university_type.as_str())
            .bind(new.name)
            .bind(new.location)
            .bind(new.description)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_university(&self, id: i32) -> StoreResult<Option<University>> {
        let sql = format!("SELECT {} FROM universities WHERE id = $1", UNIVERSITY_COLUMNS);
        Ok(sqlx::query_as::<_, University>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_universities(&self, country_id: Option<i32>) -> StoreResult<Vec<University>> {
        let sql = format!(
            "SELECT {} FROM universities
             WHERE ($1::int IS NULL OR country_id = $1)
             ORDER BY id",
            UNIVERSITY_COLUMNS
        );
        Ok(sqlx::query_as::<_, University>(&sql)
            .bind(country_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_university(&self, id: i32, patch: &UniversityPatch) -> StoreResult<University> {
        let sql = format!(
            "UPDATE universities SET
                country_id = COALESCE($2, country_id),
                university_type = COALESCE($3, university_type),
                name = COALESCE($4, name),
                location = COALESCE($5, location),
                description = COALESCE($6, description)
             WHERE id = $1 RETURNING {}",
            UNIVERSITY_COLUMNS
        );
        sqlx::query_as::<_, University>(&sql)
            .bind(id)
            .bind(patch.country_id)
            .bind(patch.university_type.map(|t| t.as_str()))
            .bind(&patch.name)
            .bind(&patch.location)
            .bind(&patch.description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("university"))
    }

    async fn set_university_image(&self, id: i32, path: &str) -> StoreResult<University> {
        let sql = format!(
            "UPDATE universities SET image = $2 WHERE id = $1 RETURNING {}",
            UNIVERSITY_COLUMNS
        );
        sqlx::query_as::<_, University>(&sql)
            .bind(id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("university"))
    }

    async fn delete_university(&self, id: i32) -> StoreResult<()> {
        self.delete_by("universities", "id", id, "university").await
    }

    async fn create_course(&self, new: NewCourse) -> StoreResult<Course> {
        let sql = format!(
            "INSERT INTO courses (university_id, name, course_type, fee, description)
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COURSE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(new.university_id)
            .bind(new.name)
            .bind(new.course_type)
            .bind(new.fee)
            .bind(new.description)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_course(&self, id: i32) -> StoreResult<Option<Course>> {
        let sql = format!("SELECT {} FROM courses WHERE id = $1", COURSE_COLUMNS);
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_courses(&self, university_id: Option<i32>) -> StoreResult<Vec<Course>> {
        let sql = format!(
            "SELECT {} FROM courses
             WHERE ($1::int IS NULL OR university_id = $1)
             ORDER BY id",
            COURSE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(university_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_courses_by_name(&self, name: &str) -> StoreResult<Vec<Course>> {
        let sql = format!(
            "SELECT {} FROM courses WHERE lower(name) = lower($1) ORDER BY id",
            COURSE_COLUMNS
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(name)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_course(&self, id: i32, patch: &CoursePatch) -> StoreResult<Course> {
        let sql = format!(
            "UPDATE courses SET
                university_id = COALESCE($2, university_id),
                name = COALESCE($3, name),
                course_type = COALESCE($4, course_type),
                fee = COALESCE($5, fee),
                description = COALESCE($6, description)
             WHERE id = $1 RETURNING {}",
            COURSE_COLUMNS
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(patch.university_id)
            .bind(&patch.name)
            .bind(&patch.course_type)
            .bind(patch.fee)
            .bind(&patch.description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("course"))
    }

    async fn set_course_image(&self, id: i32, path: &str) -> StoreResult<Course> {
        let sql = format!("UPDATE courses SET image = $2 WHERE id = $1 RETURNING {}", COURSE_COLUMNS);
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("course"))
    }

    async fn delete_course(&self, id: i32) -> StoreResult<()> {
        self.delete_by("courses", "id", id, "course").await
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, is_admin)
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(new.username)
            .bind(new.email)
            .bind(new.password_hash)
            .bind(new.is_admin)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_user(&self, id: i32) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self, is_admin: Option<bool>) -> StoreResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE ($1::bool IS NULL OR is_admin = $1) ORDER BY id",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(is_admin)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn set_user_verified(&self, id: i32, verified: bool) -> StoreResult<User> {
        let sql = format!("UPDATE users SET is_verified = $2 WHERE id = $1 RETURNING {}", USER_COLUMNS);
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(verified)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("user"))
    }

    async fn delete_user(&self, id: i32) -> StoreResult<()> {
        self.delete_by("users", "id", id, "user").await
    }

    async fn create_profile(&self, user_id: i32, new: NewProfile) -> StoreResult<UserProfile> {
        let sql = format!(
            "INSERT INTO user_profiles (user_id, full_name, phone, whatsapp, address, occupation,
                experience, exp_description, initial_referrer, no_of_deal, office, office_address,
                student_country, student_destination_country, special_service)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {}",
            PROFILE_COLUMNS
        );
        Ok(sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .bind(new.full_name)
            .bind(new.phone)
            .bind(new.whatsapp)
            .bind(new.address)
            .bind(new.occupation)
            .bind(new.experience)
            .bind(new.exp_description)
            .bind(new.initial_referrer)
            .bind(new.no_of_deal)
            .bind(new.office)
            .bind(new.office_address)
            .bind(new.student_country)
            .bind(new.student_destination_country)
            .bind(new.special_service)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_profile(&self, user_id: i32) -> StoreResult<Option<UserProfile>> {
        let sql = format!("SELECT {} FROM user_profiles WHERE user_id = $1", PROFILE_COLUMNS);
        Ok(sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_profile(&self, user_id: i32, patch: &ProfilePatch) -> StoreResult<UserProfile> {
        let sql = format!(
            "UPDATE user_profiles SET
                full_name = COALESCE($2, full_name),
                phone = COALESCE($3, phone),
                whatsapp = COALESCE($4, whatsapp),
                address = COALESCE($5, address),
                occupation = COALESCE($6, occupation),
                experience = COALESCE($7, experience),
                exp_description = COALESCE($8, exp_description),
                initial_referrer = COALESCE($9, initial_referrer),
                no_of_deal = COALESCE($10, no_of_deal),
                office = COALESCE($11, office),
                office_address = COALESCE($12, office_address),
                student_country = COALESCE($13, student_country),
                student_destination_country = COALESCE($14, student_destination_country),
                special_service = COALESCE($15, special_service)
             WHERE user_id = $1 RETURNING {}",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .bind(&patch.full_name)
            .bind(&patch.phone)
            .bind(&patch.whatsapp)
            .bind(&patch.address)
            .bind(&patch.occupation)
            .bind(patch.experience)
            .bind(&patch.exp_description)
            .bind(&patch.initial_referrer)
            .bind(patch.no_of_deal)
            .bind(patch.office)
            .bind(&patch.office_address)
            .bind(&patch.student_country)
            .bind(&patch.student_destination_country)
            .bind(&patch.special_service)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("profile"))
    }

    async fn set_profile_file(&self, user_id: i32, path: Option<&str>) -> StoreResult<UserProfile> {
        let sql = format!(
            "UPDATE user_profiles SET nid_passport_file = $2 WHERE user_id = $1 RETURNING {}",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("profile"))
    }

    async fn delete_profile(&self, user_id: i32) -> StoreResult<()> {
        self.delete_by("user_profiles", "user_id", user_id, "profile").await
    }

    async fn create_agent_application(
        &self,
        agent_id: i32,
        new: NewAgentApplication,
    ) -> StoreResult<AgentApplication> {
        let sql = format!(
            "INSERT INTO agent_applications (agent_id, first_name, last_name, email, phone,
                passport_no, course_id, university_one_id, university_two_id, university_three_id,
                country_id, last_graduation)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {}",
            AGENT_APPLICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, AgentApplication>(&sql)
            .bind(agent_id)
            .bind(new.first_name)
            .bind(new.last_name)
            .bind(new.email)
            .bind(new.phone)
            .bind(new.passport_no)
            .bind(new.course_id)
            .bind(new.university_one_id)
            .bind(new.university_two_id)
            .bind(new.university_three_id)
            .bind(new.country_id)
            .bind(new.last_graduation)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_agent_application(&self, id: i32) -> StoreResult<Option<AgentApplication>> {
        let sql = format!(
            "SELECT {} FROM agent_applications WHERE id = $1",
            AGENT_APPLICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, AgentApplication>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_agent_applications(
        &self,
        filter: &AgentApplicationFilter,
    ) -> StoreResult<Vec<AgentApplication>> {
        let sql = format!(
            "SELECT {} FROM agent_applications
             WHERE ($1::int IS NULL OR agent_id = $1)
               AND ($2::text IS NULL OR status = $2)
               AND ($3::int IS NULL
                    OR $3 IN (university_one_id, university_two_id, university_three_id))
               AND ($4::int IS NULL OR course_id = $4)
             ORDER BY id",
            AGENT_APPLICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, AgentApplication>(&sql)
            .bind(filter.agent_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.university_id)
            .bind(filter.course_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_agent_application(
        &self,
        id: i32,
        patch: &AgentApplicationPatch,
    ) -> StoreResult<AgentApplication> {
        let sql = format!(
            "UPDATE agent_applications SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                passport_no = COALESCE($6, passport_no),
                course_id = COALESCE($7, course_id),
                university_one_id = COALESCE($8, university_one_id),
                university_two_id = COALESCE($9, university_two_id),
                university_three_id = COALESCE($10, university_three_id),
                country_id = COALESCE($11, country_id),
                last_graduation = COALESCE($12, last_graduation),
                status = COALESCE($13, status)
             WHERE id = $1 RETURNING {}",
            AGENT_APPLICATION_COLUMNS
        );
        sqlx::query_as::<_, AgentApplication>(&sql)
            .bind(id)
            .bind(&patch.first_name)
            .bind(&patch.last_name)
            .bind(&patch.email)
            .bind(&patch.phone)
            .bind(&patch.passport_no)
            .bind(patch.course_id)
            .bind(patch.university_one_id)
            .bind(patch.university_two_id)
            .bind(patch.university_three_id)
            .bind(patch.country_id)
            .bind(&patch.last_graduation)
            .bind(patch.status.map(|s| s.as_str()))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("agent application"))
    }

    async fn delete_agent_application(&self, id: i32) -> StoreResult<()> {
        self.delete_by("agent_applications", "id", id, "agent application").await
    }

    async fn get_commission(&self, application_id: i32) -> StoreResult<Option<Commission>> {
        let sql = format!(
            "SELECT {} FROM commissions WHERE application_id = $1",
            COMMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Commission>(&sql)
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_commission(&self, application_id: i32) -> StoreResult<Commission> {
        let sql = format!(
            "INSERT INTO commissions (application_id) VALUES ($1) RETURNING {}",
            COMMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Commission>(&sql)
            .bind(application_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_commission(
        &self,
        application_id: i32,
        patch: &CommissionPatch,
    ) -> StoreResult<Commission> {
        let sql = format!(
            "UPDATE commissions SET
                student_fee = COALESCE($2, student_fee),
                commission = COALESCE($3, commission),
                commission_rate = COALESCE($4, commission_rate)
             WHERE application_id = $1 RETURNING {}",
            COMMISSION_COLUMNS
        );
        sqlx::query_as::<_, Commission>(&sql)
            .bind(application_id)
            .bind(patch.student_fee)
            .bind(patch.commission)
            .bind(patch.commission_rate)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("commission"))
    }

    async fn get_agent_documents(&self, application_id: i32) -> StoreResult<Option<AgentDocuments>> {
        let sql = format!(
            "SELECT {} FROM agent_documents WHERE application_id = $1",
            AGENT_DOCUMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, AgentDocuments>(&sql)
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_agent_documents(&self, application_id: i32) -> StoreResult<AgentDocuments> {
        let sql = format!(
            "INSERT INTO agent_documents (application_id) VALUES ($1) RETURNING {}",
            AGENT_DOCUMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, AgentDocuments>(&sql)
            .bind(application_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn set_agent_document(
        &self,
        application_id: i32,
        field: AgentDocumentField,
        path: &str,
    ) -> StoreResult<AgentDocuments> {
        // Column names come from a closed enum, never from the request
        let sql = format!(
            "UPDATE agent_documents SET {} = $2 WHERE application_id = $1 RETURNING {}",
            field.column(),
            AGENT_DOCUMENT_COLUMNS
        );
        sqlx::query_as::<_, AgentDocuments>(&sql)
            .bind(application_id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("agent documents"))
    }

    async fn create_student_application(
        &self,
        new: NewStudentApplication,
    ) -> StoreResult<StudentApplication> {
        let sql = format!(
            "INSERT INTO student_applications (name, phone, email, preferred_university_id,
                residence_country, interest_country, intake_interest, last_graduation,
                interested_course, current_stage)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {}",
            STUDENT_APPLICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, StudentApplication>(&sql)
            .bind(new.name)
            .bind(new.phone)
            .bind(new.email)
            .bind(new.preferred_university_id)
            .bind(new.residence_country)
            .bind(new.interest_country)
            .bind(new.intake_interest)
            .bind(new.last_graduation)
            .bind(new.interested_course)
            .bind(new.current_stage)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn get_student_application(&self, id: i32) -> StoreResult<Option<StudentApplication>> {
        let sql = format!(
            "SELECT {} FROM student_applications WHERE id = $1",
            STUDENT_APPLICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, StudentApplication>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_student_applications(&self) -> StoreResult<Vec<StudentApplication>> {
        let sql = format!(
            "SELECT {} FROM student_applications ORDER BY id",
            STUDENT_APPLICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, StudentApplication>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_student_applications_for_university(
        &self,
        university_id: i32,
    ) -> StoreResult<Vec<StudentApplication>> {
        let sql = format!(
            "SELECT {} FROM student_applications WHERE preferred_university_id = $1 ORDER BY id",
            STUDENT_APPLICATION_COLUMNS
        );
        Ok(sqlx::query_as::<_, StudentApplication>(&sql)
            .bind(university_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_student_application(
        &self,
        id: i32,
        patch: &StudentApplicationPatch,
    ) -> StoreResult<StudentApplication> {
        let sql = format!(
            "UPDATE student_applications SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                preferred_university_id = COALESCE($5, preferred_university_id),
                residence_country = COALESCE($6, residence_country),
                interest_country = COALESCE($7, interest_country),
                intake_interest = COALESCE($8, intake_interest),
                last_graduation = COALESCE($9, last_graduation),
                interested_course = COALESCE($10, interested_course),
                current_stage = COALESCE($11, current_stage)
             WHERE id = $1 RETURNING {}",
            STUDENT_APPLICATION_COLUMNS
        );
        sqlx::query_as::<_, StudentApplication>(&sql)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.phone)
            .bind(&patch.email)
            .bind(patch.preferred_university_id)
            .bind(&patch.residence_country)
            .bind(&patch.interest_country)
            .bind(&patch.intake_interest)
            .bind(&patch.last_graduation)
            .bind(&patch.interested_course)
            .bind(&patch.current_stage)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("student application"))
    }

    async fn delete_student_application(&self, id: i32) -> StoreResult<()> {
        self.delete_by("student_applications", "id", id, "student application").await
    }

    async fn get_student_documents(
        &self,
        application_id: i32,
    ) -> StoreResult<Option<StudentDocuments>> {
        let sql = format!(
            "SELECT {} FROM student_documents WHERE application_id = $1",
            STUDENT_DOCUMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, StudentDocuments>(&sql)
            .bind(application_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_student_documents(&self, application_id: i32) -> StoreResult<StudentDocuments> {
        let sql = format!(
            "INSERT INTO student_documents (application_id) VALUES ($1) RETURNING {}",
            STUDENT_DOCUMENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, StudentDocuments>(&sql)
            .bind(application_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn set_student_document(
        &self,
        application_id: i32,
        field: StudentDocumentField,
        path: &str,
    ) -> StoreResult<StudentDocuments> {
        let sql = format!(
            "UPDATE student_documents SET {} = $2 WHERE application_id = $1 RETURNING {}",
            field.column(),
            STUDENT_DOCUMENT_COLUMNS
        );
        sqlx::query_as::<_, StudentDocuments>(&sql)
            .bind(application_id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("student documents"))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
