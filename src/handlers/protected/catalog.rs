// handlers/protected/catalog.rs - Admin catalog management and image uploads

use axum::{
    extract::{Multipart, Path, State},
    Extension,
};
use serde_json::{json, Value};

use crate::admission;
use crate::database::models::{
    Country, CountryPatch, Course, CoursePatch, NewCountry, NewCourse, NewUniversity, University,
    UniversityPatch,
};
use crate::error::ApiError;
use crate::handlers::{JsonBody, UploadForm};
use crate::media::{MediaKind, MediaStorage};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::routes::AppState;

fn require_name(name: &str, entity: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        Err(ApiError::validation_error(format!("{} name is required", entity), None))
    } else {
        Ok(())
    }
}

/// Best effort: a replaced image that cannot be removed is only logged
async fn discard_previous(media: &MediaStorage, previous: Option<String>) {
    if let Some(path) = previous {
        if let Err(e) = media.remove(&path).await {
            tracing::warn!("Could not remove replaced image {}: {}", path, e);
        }
    }
}

/// POST /country - Add a destination country
pub async fn country_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<NewCountry>,
) -> ApiResult<Country> {
    user.require_admin()?;
    require_name(&payload.name, "Country")?;

    let country = state.store.create_country(payload).await?;
    tracing::info!(country_id = country.id, "Created country {}", country.name);
    Ok(ApiResponse::created(country))
}

/// PATCH /country/:id - Rename or describe a country
pub async fn country_patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    JsonBody(patch): JsonBody<CountryPatch>,
) -> ApiResult<Country> {
    user.require_admin()?;
    if let Some(name) = &patch.name {
        require_name(name, "Country")?;
    }
    let country = state.store.update_country(id, &patch).await?;
    Ok(ApiResponse::success(country))
}

/// DELETE /country/:id - Remove a country with its universities and courses
pub async fn country_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    user.require_admin()?;
    state.store.delete_country(id).await?;
    tracing::info!(country_id = id, "Deleted country");
    Ok(ApiResponse::success(json!({ "detail": "Country deleted." })))
}

/// POST /university - Add a university to a country
pub async fn university_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<NewUniversity>,
) -> ApiResult<University> {
    user.require_admin()?;
    require_name(&payload.name, "University")?;
    if state.store.get_country(payload.country_id).await?.is_none() {
        return Err(ApiError::not_found("Country not found."));
    }

    let university = state.store.create_university(payload).await?;
    tracing::info!(university_id = university.id, "Created university {}", university.name);
    Ok(ApiResponse::created(university))
}

/// PATCH /university/:id - Update university details
///
/// Moving a university to another country is refused while an application
/// selecting it would stop agreeing with the catalog.
pub async fn university_patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    JsonBody(patch): JsonBody<UniversityPatch>,
) -> ApiResult<University> {
    user.require_admin()?;
    if let Some(name) = &patch.name {
        require_name(name, "University")?;
    }
    let store = state.store.as_ref();
    let current = store
        .get_university(id)
        .await?
        .ok_or_else(|| ApiError::not_found("University not found."))?;
    if let Some(country_id) = patch.country_id {
        if store.get_country(country_id).await?.is_none() {
            return Err(ApiError::not_found("Country not found."));
        }
    }

    admission::validate_university_change(store, &state.admission, &current, &patch).await?;
    let university = store.update_university(id, &patch).await?;
    Ok(ApiResponse::success(university))
}

/// DELETE /university/:id - Remove a university, its courses and student applications
pub async fn university_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    user.require_admin()?;
    state.store.delete_university(id).await?;
    tracing::info!(university_id = id, "Deleted university");
    Ok(ApiResponse::success(json!({ "detail": "University deleted." })))
}

/// POST /university/:id/upload-image - Replace the university picture
pub async fn university_image_upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<University> {
    user.require_admin()?;
    let current = state
        .store
        .get_university(id)
        .await?
        .ok_or_else(|| ApiError::not_found("University not found."))?;

    let file = UploadForm::read(multipart).await?.single_file("university_image")?;
    let path = state
        .media
        .save(MediaKind::Image, "university_image", &file)
        .await?;
    let university = state.store.set_university_image(id, &path).await?;

    discard_previous(&state.media, current.image).await;
    Ok(ApiResponse::success(university))
}

/// POST /course - Add a course to a university
pub async fn course_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<NewCourse>,
) -> ApiResult<Course> {
    user.require_admin()?;
    require_name(&payload.name, "Course")?;
    if state.store.get_university(payload.university_id).await?.is_none() {
        return Err(ApiError::not_found("University not found."));
    }

    let course = state.store.create_course(payload).await?;
    tracing::info!(course_id = course.id, "Created course {}", course.name);
    Ok(ApiResponse::created(course))
}

/// PATCH /course/:id - Update course details
pub async fn course_patch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    JsonBody(patch): JsonBody<CoursePatch>,
) -> ApiResult<Course> {
    user.require_admin()?;
    if let Some(name) = &patch.name {
        require_name(name, "Course")?;
    }
    let store = state.store.as_ref();
    let current = store
        .get_course(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found."))?;
    if let Some(university_id) = patch.university_id {
        if store.get_university(university_id).await?.is_none() {
            return Err(ApiError::not_found("University not found."));
        }
    }

    admission::validate_course_change(store, &state.admission, &current, &patch).await?;
    let course = store.update_course(id, &patch).await?;
    Ok(ApiResponse::success(course))
}

/// DELETE /course/:id - Remove a course
pub async fn course_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Value> {
    user.require_admin()?;
    state.store.delete_course(id).await?;
    tracing::info!(course_id = id, "Deleted course");
    Ok(ApiResponse::success(json!({ "detail": "Course deleted." })))
}

/// POST /course/:id/upload-image - Replace the course picture
pub async fn course_image_upload(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> ApiResult<Course> {
    user.require_admin()?;
    let current = state
        .store
        .get_course(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found."))?;

    let file = UploadForm::read(multipart).await?.single_file("course_image")?;
    let path = state.media.save(MediaKind::Image, "course_image", &file).await?;
    let course = state.store.set_course_image(id, &path).await?;

    discard_previous(&state.media, current.image).await;
    Ok(ApiResponse::success(course))
}
