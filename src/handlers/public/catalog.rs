// handlers/public/catalog.rs - Read-only catalog: countries, universities, courses

use axum::extract::{Path, State};
use serde::Serialize;

use crate::database::models::{Country, Course, University};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::routes::AppState;

/// Empty collections answer 404 rather than an empty list
fn non_empty<T: Serialize>(items: Vec<T>, message: &str) -> ApiResult<Vec<T>> {
    if items.is_empty() {
        Err(ApiError::not_found(message))
    } else {
        Ok(ApiResponse::success(items))
    }
}

/// GET /country - All countries
pub async fn country_list(State(state): State<AppState>) -> ApiResult<Vec<Country>> {
    let countries = state.store.list_countries().await?;
    non_empty(countries, "No countries found.")
}

/// GET /country/:id - One country
pub async fn country_get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Country> {
    state
        .store
        .get_country(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("Country not found."))
}

/// GET /country/:id/university - Universities located in a country
pub async fn country_universities(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<University>> {
    if state.store.get_country(id).await?.is_none() {
        return Err(ApiError::not_found("Country not found!"));
    }
    let universities = state.store.list_universities(Some(id)).await?;
    Ok(ApiResponse::success(universities))
}

/// GET /university - All universities
pub async fn university_list(State(state): State<AppState>) -> ApiResult<Vec<University>> {
    let universities = state.store.list_universities(None).await?;
    non_empty(universities, "No universities found.")
}

/// GET /university/:id - One university
pub async fn university_get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<University> {
    state
        .store
        .get_university(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("University not found."))
}

/// GET /university/:id/course - Courses a university offers
pub async fn university_courses(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<Course>> {
    if state.store.get_university(id).await?.is_none() {
        return Err(ApiError::not_found("University not found!"));
    }
    let courses = state.store.list_courses(Some(id)).await?;
    Ok(ApiResponse::success(courses))
}

/// GET /course - All courses
pub async fn course_list(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    let courses = state.store.list_courses(None).await?;
    non_empty(courses, "No courses found.")
}

/// GET /course/:id - One course
pub async fn course_get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Course> {
    state
        .store
        .get_course(id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("Course not found."))
}
