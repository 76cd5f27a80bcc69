use tracing::debug;

use super::AdmissionError;
use crate::config::AdmissionConfig;
use crate::database::models::{
    AgentApplication, AgentApplicationFilter, AgentApplicationPatch, Country, Course, CoursePatch,
    NewAgentApplication, NewStudentApplication, StudentApplication, StudentApplicationPatch,
    University, UniversityPatch,
};
use crate::database::Store;

/// Catalog reads, optionally seeing one university or course as it will be
/// after a pending edit.
#[derive(Clone, Copy)]
struct CatalogView<'a> {
    store: &'a dyn Store,
    university: Option<&'a University>,
    course: Option<&'a Course>,
}

impl<'a> CatalogView<'a> {
    fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            university: None,
            course: None,
        }
    }

    async fn university(&self, id: i32) -> Result<Option<University>, AdmissionError> {
        match self.university {
            Some(pending) if pending.id == id => Ok(Some(pending.clone())),
            _ => Ok(self.store.get_university(id).await?),
        }
    }

    async fn course(&self, id: i32) -> Result<Option<Course>, AdmissionError> {
        match self.course {
            Some(pending) if pending.id == id => Ok(Some(pending.clone())),
            _ => Ok(self.store.get_course(id).await?),
        }
    }

    async fn courses_named(&self, name: &str) -> Result<Vec<Course>, AdmissionError> {
        let mut courses = self.store.find_courses_by_name(name).await?;
        if let Some(pending) = self.course {
            courses.retain(|c| c.id != pending.id);
            if same_name(&pending.name, name) {
                courses.push(pending.clone());
            }
        }
        Ok(courses)
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// The catalog references an agent application carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub universities: [Option<i32>; 3],
    pub course_id: Option<i32>,
    pub country_id: Option<i32>,
}

impl Selection {
    /// Number of filled university slots
    pub fn count(&self) -> usize {
        self.universities.iter().flatten().count()
    }

    /// The patch laid over the stored row; omitted fields keep stored values
    pub fn merged(current: &AgentApplication, patch: &AgentApplicationPatch) -> Self {
        Self {
            universities: patch.merged_slots(current),
            course_id: patch.course_id.or(current.course_id),
            country_id: patch.country_id.or(current.country_id),
        }
    }
}

impl From<&AgentApplication> for Selection {
    fn from(stored: &AgentApplication) -> Self {
        Self {
            universities: stored.university_slots(),
            course_id: stored.course_id,
            country_id: stored.country_id,
        }
    }
}

impl From<&NewAgentApplication> for Selection {
    fn from(new: &NewAgentApplication) -> Self {
        Self {
            universities: new.university_slots(),
            course_id: new.course_id,
            country_id: new.country_id,
        }
    }
}

/// Resolved form of a valid selection
#[derive(Debug, Clone, Default)]
pub struct ValidatedSelection {
    /// The country every selected university belongs to, when any is selected
    pub country: Option<Country>,
    pub universities: Vec<University>,
}

fn is_restricted(rules: &AdmissionConfig, country: &Country) -> bool {
    let name = country.name.trim();
    rules
        .restricted_countries
        .iter()
        .any(|restricted| restricted.eq_ignore_ascii_case(name))
}

/// Check the university selection of an agent application.
///
/// Every filled slot must resolve, all resolved universities must share one
/// country, and that country caps the count: one for restricted countries,
/// `max_universities` otherwise. A set course must belong to one of the
/// selected universities and a set country must be the shared one.
pub async fn validate_agent_application(
    store: &dyn Store,
    rules: &AdmissionConfig,
    selection: &Selection,
) -> Result<ValidatedSelection, AdmissionError> {
    check_selection(CatalogView::new(store), rules, selection).await
}

async fn check_selection(
    catalog: CatalogView<'_>,
    rules: &AdmissionConfig,
    selection: &Selection,
) -> Result<ValidatedSelection, AdmissionError> {
    let mut universities = Vec::with_capacity(3);
    for id in selection.universities.into_iter().flatten() {
        let university = catalog
            .university(id)
            .await?
            .ok_or_else(|| AdmissionError::not_found(format!("University {} not found", id)))?;
        universities.push(university);
    }

    let mut country_ids: Vec<i32> = universities.iter().map(|u| u.country_id).collect();
    country_ids.sort_unstable();
    country_ids.dedup();
    if country_ids.len() > 1 {
        return Err(AdmissionError::invalid(
            "All selected universities must belong to the same country",
        ));
    }

    let country = match country_ids.first() {
        Some(&id) => Some(
            catalog
                .store
                .get_country(id)
                .await?
                .ok_or_else(|| AdmissionError::not_found(format!("Country {} not found", id)))?,
        ),
        None => None,
    };

    let count = selection.count();
    if let Some(country) = &country {
        if is_restricted(rules, country) && count > 1 {
            return Err(AdmissionError::invalid(format!(
                "Only one university can be selected for {}",
                country.name
            )));
        }
    }
    if count > rules.max_universities {
        return Err(AdmissionError::invalid(format!(
            "At most {} universities can be selected",
            rules.max_universities
        )));
    }

    if let Some(course_id) = selection.course_id {
        let course = catalog
            .course(course_id)
            .await?
            .ok_or_else(|| AdmissionError::not_found(format!("Course {} not found", course_id)))?;
        if !universities.is_empty() && !universities.iter().any(|u| u.id == course.university_id) {
            return Err(AdmissionError::invalid(
                "Course does not belong to any selected university",
            ));
        }
    }

    if let Some(country_id) = selection.country_id {
        let declared = catalog
            .store
            .get_country(country_id)
            .await?
            .ok_or_else(|| AdmissionError::not_found(format!("Country {} not found", country_id)))?;
        if let Some(shared) = &country {
            if shared.id != declared.id {
                return Err(AdmissionError::invalid(format!(
                    "Country {} does not match the selected universities",
                    declared.name
                )));
            }
        }
    }

    debug!(
        count,
        country = country.as_ref().map(|c| c.name.as_str()),
        "university selection accepted"
    );
    Ok(ValidatedSelection {
        country,
        universities,
    })
}

/// Re-validate a partial update only when it touches the selection.
///
/// Patches that leave every university, course and country field alone pass
/// without consulting the catalog.
pub async fn validate_agent_update(
    store: &dyn Store,
    rules: &AdmissionConfig,
    current: &AgentApplication,
    patch: &AgentApplicationPatch,
) -> Result<(), AdmissionError> {
    if !patch.touches_selection() {
        return Ok(());
    }
    let selection = Selection::merged(current, patch);
    validate_agent_application(store, rules, &selection).await?;
    Ok(())
}

/// The three fields of a student application that must agree with the catalog
#[derive(Debug, Clone, Copy)]
pub struct StudentChoice<'a> {
    pub preferred_university_id: i32,
    pub interest_country: &'a str,
    pub interested_course: &'a str,
}

impl<'a> From<&'a NewStudentApplication> for StudentChoice<'a> {
    fn from(new: &'a NewStudentApplication) -> Self {
        Self {
            preferred_university_id: new.preferred_university_id,
            interest_country: &new.interest_country,
            interested_course: &new.interested_course,
        }
    }
}

impl<'a> From<&'a StudentApplication> for StudentChoice<'a> {
    fn from(stored: &'a StudentApplication) -> Self {
        Self {
            preferred_university_id: stored.preferred_university_id,
            interest_country: &stored.interest_country,
            interested_course: &stored.interested_course,
        }
    }
}

impl<'a> StudentChoice<'a> {
    pub fn merged(current: &'a StudentApplication, patch: &'a StudentApplicationPatch) -> Self {
        Self {
            preferred_university_id: patch
                .preferred_university_id
                .unwrap_or(current.preferred_university_id),
            interest_country: patch
                .interest_country
                .as_deref()
                .unwrap_or(&current.interest_country),
            interested_course: patch
                .interested_course
                .as_deref()
                .unwrap_or(&current.interested_course),
        }
    }
}

/// Check that the preferred university lies in the declared country and
/// offers the named course. Course names are not unique; any course with the
/// name at the preferred university satisfies the rule.
pub async fn validate_student_application(
    store: &dyn Store,
    choice: StudentChoice<'_>,
) -> Result<(), AdmissionError> {
    check_student(CatalogView::new(store), choice).await
}

async fn check_student(
    catalog: CatalogView<'_>,
    choice: StudentChoice<'_>,
) -> Result<(), AdmissionError> {
    let country = catalog
        .store
        .find_country_by_name(choice.interest_country.trim())
        .await?
        .ok_or_else(|| {
            AdmissionError::not_found(format!("Country {} not found", choice.interest_country))
        })?;

    let university = catalog
        .university(choice.preferred_university_id)
        .await?
        .ok_or_else(|| {
            AdmissionError::not_found(format!(
                "University {} not found",
                choice.preferred_university_id
            ))
        })?;

    if university.country_id != country.id {
        return Err(AdmissionError::invalid(format!(
            "{} is not located in {}",
            university.name, country.name
        )));
    }

    let courses = catalog
        .courses_named(choice.interested_course.trim())
        .await?;
    if courses.is_empty() {
        return Err(AdmissionError::not_found(format!(
            "Course {} not found",
            choice.interested_course
        )));
    }
    if !courses.iter().any(|c| c.university_id == university.id) {
        return Err(AdmissionError::invalid(format!(
            "{} is not offered by {}",
            choice.interested_course, university.name
        )));
    }

    Ok(())
}

/// Partial-update counterpart: omitted fields fall back to stored values
pub async fn validate_student_update(
    store: &dyn Store,
    current: &StudentApplication,
    patch: &StudentApplicationPatch,
) -> Result<(), AdmissionError> {
    if !patch.touches_preference() {
        return Ok(());
    }
    validate_student_application(store, StudentChoice::merged(current, patch)).await
}

/// Outcome of re-checking one stored application against a pending edit
enum Dependent {
    Holds,
    /// The application already failed before the edit
    AlreadyStale,
    Broken(AdmissionError),
}

impl Dependent {
    fn classify<T>(
        before: Result<T, AdmissionError>,
        after: Result<T, AdmissionError>,
    ) -> Result<Self, AdmissionError> {
        match (before, after) {
            (Err(AdmissionError::Store(e)), _) | (_, Err(AdmissionError::Store(e))) => {
                Err(e.into())
            }
            (Err(_), _) => Ok(Dependent::AlreadyStale),
            (Ok(_), Ok(_)) => Ok(Dependent::Holds),
            (Ok(_), Err(e)) => Ok(Dependent::Broken(e)),
        }
    }

    fn reject(self, kind: &str, id: i32) -> Result<(), AdmissionError> {
        match self {
            Dependent::Holds | Dependent::AlreadyStale => Ok(()),
            Dependent::Broken(reason) => Err(AdmissionError::invalid(format!(
                "{} application {} would become inconsistent: {}",
                kind, id, reason
            ))),
        }
    }
}

async fn recheck_agent_applications(
    store: &dyn Store,
    rules: &AdmissionConfig,
    edited: CatalogView<'_>,
    filter: &AgentApplicationFilter,
) -> Result<(), AdmissionError> {
    for application in store.list_agent_applications(filter).await? {
        let selection = Selection::from(&application);
        let before = check_selection(CatalogView::new(store), rules, &selection).await;
        let after = check_selection(edited, rules, &selection).await;
        Dependent::classify(before, after)?.reject("Agent", application.id)?;
    }
    Ok(())
}

async fn recheck_student_applications(
    store: &dyn Store,
    edited: CatalogView<'_>,
    applications: Vec<StudentApplication>,
) -> Result<(), AdmissionError> {
    for application in &applications {
        let choice = StudentChoice::from(application);
        let before = check_student(CatalogView::new(store), choice).await;
        let after = check_student(edited, choice).await;
        Dependent::classify(before, after)?.reject("Student", application.id)?;
    }
    Ok(())
}

/// Reject a university edit that would break an application selecting it.
///
/// Only a country move can do that. Applications that were already
/// inconsistent before the edit do not block it.
pub async fn validate_university_change(
    store: &dyn Store,
    rules: &AdmissionConfig,
    current: &University,
    patch: &UniversityPatch,
) -> Result<(), AdmissionError> {
    if patch.country_id.map_or(true, |id| id == current.country_id) {
        return Ok(());
    }
    let mut moved = current.clone();
    patch.apply(&mut moved);
    let edited = CatalogView {
        university: Some(&moved),
        ..CatalogView::new(store)
    };

    let filter = AgentApplicationFilter {
        university_id: Some(current.id),
        ..Default::default()
    };
    recheck_agent_applications(store, rules, edited, &filter).await?;

    let students = store
        .list_student_applications_for_university(current.id)
        .await?;
    recheck_student_applications(store, edited, students).await?;

    debug!(university_id = current.id, country_id = moved.country_id, "university move accepted");
    Ok(())
}

/// Reject a course edit that would break an application naming it.
///
/// Agent applications reference the course by id and only care about a move
/// to another university. Student applications name it, so a rename counts too.
pub async fn validate_course_change(
    store: &dyn Store,
    rules: &AdmissionConfig,
    current: &Course,
    patch: &CoursePatch,
) -> Result<(), AdmissionError> {
    let moves = patch
        .university_id
        .map_or(false, |id| id != current.university_id);
    let renames = patch
        .name
        .as_deref()
        .map_or(false, |name| !same_name(name, &current.name));
    if !moves && !renames {
        return Ok(());
    }
    let mut edited_course = current.clone();
    patch.apply(&mut edited_course);
    let edited = CatalogView {
        course: Some(&edited_course),
        ..CatalogView::new(store)
    };

    if moves {
        let filter = AgentApplicationFilter {
            course_id: Some(current.id),
            ..Default::default()
        };
        recheck_agent_applications(store, rules, edited, &filter).await?;
    }

    let students: Vec<StudentApplication> = store
        .list_student_applications_for_university(current.university_id)
        .await?
        .into_iter()
        .filter(|a| same_name(&a.interested_course, &current.name))
        .collect();
    recheck_student_applications(store, edited, students).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewCountry, NewCourse, NewUniversity, NewUser};
    use crate::database::MemoryStore;
    use crate::types::UniversityType;

    struct Catalog {
        store: MemoryStore,
        rules: AdmissionConfig,
    }

    impl Catalog {
        fn new() -> Self {
            Self {
                store: MemoryStore::new(),
                rules: AdmissionConfig::default(),
            }
        }

        async fn country(&self, name: &str) -> Country {
            self.store
                .create_country(NewCountry {
                    name: name.to_string(),
                    description: None,
                })
                .await
                .unwrap()
        }

        async fn university(&self, country: &Country, name: &str) -> University {
            self.store
                .create_university(NewUniversity {
                    country_id: country.id,
                    university_type: UniversityType::Private,
                    name: name.to_string(),
                    location: "Main campus".to_string(),
                    description: None,
                })
                .await
                .unwrap()
        }

        async fn universities(&self, country: &Country, n: usize) -> Vec<University> {
            let mut out = Vec::new();
            for i in 0..n {
                out.push(self.university(country, &format!("{} U{}", country.name, i)).await);
            }
            out
        }

        async fn course(&self, university: &University, name: &str) -> i32 {
            self.store
                .create_course(NewCourse {
                    university_id: university.id,
                    name: name.to_string(),
                    course_type: None,
                    fee: None,
                    description: None,
                })
                .await
                .unwrap()
                .id
        }

        async fn check(&self, selection: Selection) -> Result<ValidatedSelection, AdmissionError> {
            validate_agent_application(&self.store, &self.rules, &selection).await
        }

        async fn application(&self, selection: Selection) -> AgentApplication {
            let tag = selection.universities[0].unwrap_or_default();
            let agent = self
                .store
                .create_user(NewUser {
                    username: format!("agent{}", tag),
                    email: format!("agent{}@example.com", tag),
                    password_hash: "x".into(),
                    is_admin: false,
                })
                .await
                .unwrap();
            let [one, two, three] = selection.universities;
            self.store
                .create_agent_application(
                    agent.id,
                    NewAgentApplication {
                        first_name: "Sadia".into(),
                        last_name: "Karim".into(),
                        email: "sadia@example.com".into(),
                        phone: "015".into(),
                        passport_no: "B7".into(),
                        course_id: selection.course_id,
                        university_one_id: one,
                        university_two_id: two,
                        university_three_id: three,
                        country_id: selection.country_id,
                        last_graduation: None,
                    },
                )
                .await
                .unwrap()
        }
    }

    fn slots(universities: &[University]) -> Selection {
        let mut selection = Selection::default();
        for (slot, university) in selection.universities.iter_mut().zip(universities) {
            *slot = Some(university.id);
        }
        selection
    }

    #[tokio::test]
    async fn unrestricted_country_accepts_up_to_three() {
        let catalog = Catalog::new();
        let uk = catalog.country("United Kingdom").await;
        let universities = catalog.universities(&uk, 3).await;

        for n in 0..=3 {
            let result = catalog.check(slots(&universities[..n])).await;
            assert!(result.is_ok(), "{} universities should pass", n);
        }
        let accepted = catalog.check(slots(&universities)).await.unwrap();
        assert_eq!(accepted.country.map(|c| c.id), Some(uk.id));
        assert_eq!(accepted.universities.len(), 3);
    }

    #[tokio::test]
    async fn count_above_configured_cap_is_rejected() {
        let mut catalog = Catalog::new();
        catalog.rules.max_universities = 2;
        let uk = catalog.country("United Kingdom").await;
        let universities = catalog.universities(&uk, 3).await;

        assert!(catalog.check(slots(&universities[..2])).await.is_ok());
        assert!(matches!(
            catalog.check(slots(&universities)).await,
            Err(AdmissionError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn restricted_countries_accept_a_single_university() {
        let catalog = Catalog::new();
        for name in ["Malaysia", "Cyprus", "malaysia "] {
            let country = catalog.country(name).await;
            let universities = catalog.universities(&country, 3).await;

            for n in 0..=3 {
                let result = catalog.check(slots(&universities[..n])).await;
                if n <= 1 {
                    assert!(result.is_ok(), "{}: {} should pass", name, n);
                } else {
                    assert!(
                        matches!(result, Err(AdmissionError::InvalidRequest(_))),
                        "{}: {} should fail",
                        name,
                        n
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn mixed_countries_are_rejected_regardless_of_count() {
        let catalog = Catalog::new();
        let canada = catalog.country("Canada").await;
        let germany = catalog.country("Germany").await;
        let malaysia = catalog.country("Malaysia").await;
        let a = catalog.university(&canada, "Toronto").await;
        let b = catalog.university(&germany, "Heidelberg").await;
        let c = catalog.university(&malaysia, "Taylor's").await;

        for pair in [[&a, &b], [&a, &c], [&c, &b]] {
            let selection = slots(&[pair[0].clone(), pair[1].clone()]);
            assert!(matches!(
                catalog.check(selection).await,
                Err(AdmissionError::InvalidRequest(_))
            ));
        }
        // gaps between slots do not matter
        let selection = Selection {
            universities: [Some(a.id), None, Some(b.id)],
            ..Default::default()
        };
        assert!(matches!(
            catalog.check(selection).await,
            Err(AdmissionError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn unknown_university_is_not_found() {
        let catalog = Catalog::new();
        let selection = Selection {
            universities: [Some(999), None, None],
            ..Default::default()
        };
        assert!(matches!(
            catalog.check(selection).await,
            Err(AdmissionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn course_and_country_must_agree_with_selection() {
        let catalog = Catalog::new();
        let australia = catalog.country("Australia").await;
        let japan = catalog.country("Japan").await;
        let monash = catalog.university(&australia, "Monash").await;
        let deakin = catalog.university(&australia, "Deakin").await;
        let kyoto = catalog.university(&japan, "Kyoto").await;
        let monash_course = catalog.course(&monash, "MBA").await;
        let kyoto_course = catalog.course(&kyoto, "MEng").await;

        let mut selection = slots(&[monash.clone(), deakin.clone()]);
        selection.course_id = Some(monash_course);
        selection.country_id = Some(australia.id);
        assert!(catalog.check(selection).await.is_ok());

        selection.course_id = Some(kyoto_course);
        assert!(matches!(
            catalog.check(selection).await,
            Err(AdmissionError::InvalidRequest(_))
        ));

        selection.course_id = Some(monash_course);
        selection.country_id = Some(japan.id);
        assert!(matches!(
            catalog.check(selection).await,
            Err(AdmissionError::InvalidRequest(_))
        ));

        selection.country_id = Some(12345);
        assert!(matches!(
            catalog.check(selection).await,
            Err(AdmissionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn graduation_only_update_skips_selection_rules() {
        let catalog = Catalog::new();
        let malaysia = catalog.country("Malaysia").await;
        let universities = catalog.universities(&malaysia, 2).await;
        let agent = catalog
            .store
            .create_user(NewUser {
                username: "agent".into(),
                email: "agent@example.com".into(),
                password_hash: "x".into(),
                is_admin: false,
            })
            .await
            .unwrap();

        // Stored before the restricted list was tightened: two Malaysian slots
        let stored = catalog
            .store
            .create_agent_application(
                agent.id,
                NewAgentApplication {
                    first_name: "Tania".into(),
                    last_name: "Akter".into(),
                    email: "tania@example.com".into(),
                    phone: "017".into(),
                    passport_no: "A1".into(),
                    course_id: None,
                    university_one_id: Some(universities[0].id),
                    university_two_id: Some(universities[1].id),
                    university_three_id: None,
                    country_id: Some(malaysia.id),
                    last_graduation: None,
                },
            )
            .await
            .unwrap();

        let patch: AgentApplicationPatch =
            serde_json::from_str(r#"{"last_graduation": "BSc"}"#).unwrap();
        validate_agent_update(&catalog.store, &catalog.rules, &stored, &patch)
            .await
            .unwrap();

        let updated = catalog
            .store
            .update_agent_application(stored.id, &patch)
            .await
            .unwrap();
        assert_eq!(updated.last_graduation.as_deref(), Some("BSc"));
        assert_eq!(updated.university_slots(), stored.university_slots());
        assert_eq!(updated.country_id, stored.country_id);
        assert_eq!(updated.first_name, stored.first_name);
        assert_eq!(updated.status, stored.status);

        // touching a slot validates the merged state
        let patch = AgentApplicationPatch {
            university_one_id: Some(universities[0].id),
            ..Default::default()
        };
        assert!(matches!(
            validate_agent_update(&catalog.store, &catalog.rules, &stored, &patch).await,
            Err(AdmissionError::InvalidRequest(_))
        ));
    }

    async fn student_catalog() -> (Catalog, University, University) {
        let catalog = Catalog::new();
        let india = catalog.country("India").await;
        catalog.country("Bangladesh").await;
        let delhi = catalog.university(&india, "University of Delhi").await;
        let mumbai = catalog.university(&india, "University of Mumbai").await;
        catalog.course(&delhi, "BBA").await;
        catalog.course(&mumbai, "LLB").await;
        (catalog, delhi, mumbai)
    }

    #[tokio::test]
    async fn student_country_must_match_preferred_university() {
        let (catalog, delhi, _) = student_catalog().await;

        let result = validate_student_application(
            &catalog.store,
            StudentChoice {
                preferred_university_id: delhi.id,
                interest_country: "Bangladesh",
                interested_course: "BBA",
            },
        )
        .await;
        assert!(matches!(result, Err(AdmissionError::InvalidRequest(_))));

        validate_student_application(
            &catalog.store,
            StudentChoice {
                preferred_university_id: delhi.id,
                interest_country: "india",
                interested_course: "bba",
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn student_lookups_report_not_found() {
        let (catalog, delhi, _) = student_catalog().await;
        let choice = StudentChoice {
            preferred_university_id: delhi.id,
            interest_country: "Nepal",
            interested_course: "BBA",
        };
        assert!(matches!(
            validate_student_application(&catalog.store, choice).await,
            Err(AdmissionError::NotFound(_))
        ));

        let choice = StudentChoice {
            interest_country: "India",
            interested_course: "Astrophysics",
            ..choice
        };
        assert!(matches!(
            validate_student_application(&catalog.store, choice).await,
            Err(AdmissionError::NotFound(_))
        ));

        let choice = StudentChoice {
            preferred_university_id: 4040,
            interested_course: "BBA",
            ..choice
        };
        assert!(matches!(
            validate_student_application(&catalog.store, choice).await,
            Err(AdmissionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn student_course_must_be_offered_by_preferred_university() {
        let (catalog, delhi, _) = student_catalog().await;
        let choice = StudentChoice {
            preferred_university_id: delhi.id,
            interest_country: "India",
            interested_course: "LLB",
        };
        assert!(matches!(
            validate_student_application(&catalog.store, choice).await,
            Err(AdmissionError::InvalidRequest(_))
        ));

        // a second course with the same name at the preferred university resolves
        catalog.course(&delhi, "LLB").await;
        validate_student_application(&catalog.store, choice).await.unwrap();
    }

    #[tokio::test]
    async fn student_update_falls_back_to_stored_values() {
        let (catalog, delhi, mumbai) = student_catalog().await;
        let stored = catalog
            .store
            .create_student_application(NewStudentApplication {
                name: "Mitu".into(),
                phone: "018".into(),
                email: None,
                preferred_university_id: delhi.id,
                residence_country: "Bangladesh".into(),
                interest_country: "India".into(),
                intake_interest: "Spring".into(),
                last_graduation: "HSC".into(),
                interested_course: "BBA".into(),
                current_stage: None,
            })
            .await
            .unwrap();

        // only the university changes; the stored course BBA is not offered there
        let patch = StudentApplicationPatch {
            preferred_university_id: Some(mumbai.id),
            ..Default::default()
        };
        assert!(matches!(
            validate_student_update(&catalog.store, &stored, &patch).await,
            Err(AdmissionError::InvalidRequest(_))
        ));

        let patch = StudentApplicationPatch {
            preferred_university_id: Some(mumbai.id),
            interested_course: Some("LLB".into()),
            ..Default::default()
        };
        validate_student_update(&catalog.store, &stored, &patch)
            .await
            .unwrap();

        let patch = StudentApplicationPatch {
            phone: Some("019".into()),
            ..Default::default()
        };
        validate_student_update(&catalog.store, &stored, &patch)
            .await
            .unwrap();
    }

    fn move_to(country: &Country) -> UniversityPatch {
        UniversityPatch {
            country_id: Some(country.id),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn moving_a_selected_university_to_another_country_is_rejected() {
        let catalog = Catalog::new();
        let uk = catalog.country("United Kingdom").await;
        let malaysia = catalog.country("Malaysia").await;
        let leeds = catalog.university(&uk, "Leeds").await;
        let york = catalog.university(&uk, "York").await;
        let durham = catalog.university(&uk, "Durham").await;
        let mut selection = slots(&[leeds.clone(), york.clone()]);
        selection.country_id = Some(uk.id);
        catalog.application(selection).await;

        let result = validate_university_change(
            &catalog.store,
            &catalog.rules,
            &york,
            &move_to(&malaysia),
        )
        .await;
        assert!(matches!(result, Err(AdmissionError::InvalidRequest(_))));

        // nothing selects Durham, and renaming York moves nothing
        let moved = move_to(&malaysia);
        validate_university_change(&catalog.store, &catalog.rules, &durham, &moved)
            .await
            .unwrap();
        let rename = UniversityPatch {
            name: Some("University of York".into()),
            ..Default::default()
        };
        validate_university_change(&catalog.store, &catalog.rules, &york, &rename)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn applications_already_out_of_line_do_not_block_a_move() {
        let catalog = Catalog::new();
        let malaysia = catalog.country("Malaysia").await;
        let uk = catalog.country("United Kingdom").await;
        let universities = catalog.universities(&malaysia, 2).await;
        // two slots in a restricted country, stored before the rule existed
        catalog.application(slots(&universities)).await;

        let moved = move_to(&uk);
        validate_university_change(&catalog.store, &catalog.rules, &universities[1], &moved)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn moving_a_student_choice_abroad_is_rejected() {
        let (catalog, delhi, _) = student_catalog().await;
        let bangladesh = catalog
            .store
            .find_country_by_name("Bangladesh")
            .await
            .unwrap()
            .unwrap();
        catalog
            .store
            .create_student_application(NewStudentApplication {
                name: "Rumana".into(),
                phone: "016".into(),
                email: None,
                preferred_university_id: delhi.id,
                residence_country: "Bangladesh".into(),
                interest_country: "India".into(),
                intake_interest: "Fall".into(),
                last_graduation: "HSC".into(),
                interested_course: "BBA".into(),
                current_stage: None,
            })
            .await
            .unwrap();

        let moved = move_to(&bangladesh);
        let result =
            validate_university_change(&catalog.store, &catalog.rules, &delhi, &moved).await;
        assert!(matches!(result, Err(AdmissionError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn course_edits_recheck_dependent_applications() {
        let (catalog, delhi, mumbai) = student_catalog().await;
        catalog
            .store
            .create_student_application(NewStudentApplication {
                name: "Rumana".into(),
                phone: "016".into(),
                email: None,
                preferred_university_id: delhi.id,
                residence_country: "Bangladesh".into(),
                interest_country: "India".into(),
                intake_interest: "Fall".into(),
                last_graduation: "HSC".into(),
                interested_course: "bba".into(),
                current_stage: None,
            })
            .await
            .unwrap();
        let bba = catalog.store.find_courses_by_name("BBA").await.unwrap().remove(0);
        let llb = catalog.store.find_courses_by_name("LLB").await.unwrap().remove(0);

        let to_mumbai = CoursePatch {
            university_id: Some(mumbai.id),
            ..Default::default()
        };
        let rename = CoursePatch {
            name: Some("BBA (Hons)".into()),
            ..Default::default()
        };
        for patch in [&to_mumbai, &rename] {
            assert!(matches!(
                validate_course_change(&catalog.store, &catalog.rules, &bba, patch).await,
                Err(AdmissionError::InvalidRequest(_))
            ));
        }

        // an agent application pins the course by id alongside Mumbai
        let mut selection = slots(&[mumbai.clone()]);
        selection.course_id = Some(llb.id);
        catalog.application(selection).await;
        let to_delhi = CoursePatch {
            university_id: Some(delhi.id),
            ..Default::default()
        };
        assert!(matches!(
            validate_course_change(&catalog.store, &catalog.rules, &llb, &to_delhi).await,
            Err(AdmissionError::InvalidRequest(_))
        ));

        // a second BBA at Delhi keeps the student covered
        catalog.course(&delhi, "BBA").await;
        validate_course_change(&catalog.store, &catalog.rules, &bba, &to_mumbai)
            .await
            .unwrap();
        let fee_only = CoursePatch {
            fee: Some(9000),
            ..Default::default()
        };
        validate_course_change(&catalog.store, &catalog.rules, &llb, &fee_only)
            .await
            .unwrap();
    }
}
