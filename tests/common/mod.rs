#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use abroad_admission_api::auth::hash_password;
use abroad_admission_api::config::AppConfig;
use abroad_admission_api::database::models::{
    Country, Course, NewCountry, NewCourse, NewUniversity, NewUser, University, User,
};
use abroad_admission_api::database::{MemoryStore, Store};
use abroad_admission_api::types::UniversityType;
use abroad_admission_api::{app, AppState};

const BOUNDARY: &str = "X-ADMISSION-TEST-BOUNDARY";

/// In-process application over a fresh in-memory store
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub media_root: PathBuf,
}

/// One part of a multipart request body
pub enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

pub fn pdf<'a>(file_name: &'a str) -> Part<'a> {
    Part::File {
        name: "files",
        file_name,
        content_type: "application/pdf",
        data: b"%PDF-1.4 test",
    }
}

pub fn field_names(value: &str) -> Part<'_> {
    Part::Text {
        name: "field_names",
        value,
    }
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::development();
        config.security.bcrypt_cost = 4;
        config.server.enable_request_logging = false;
        let media_root =
            std::env::temp_dir().join(format!("admission-it-{}", uuid::Uuid::new_v4()));
        config.media.root = media_root.to_string_lossy().into_owned();

        let store = Arc::new(MemoryStore::new());
        let shared: Arc<dyn Store> = store.clone();
        let state = AppState::new(&config, shared).expect("development config signs tokens");
        let router = app(state.clone(), &config);

        Self {
            router,
            store,
            state,
            media_root,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, token, None).await
    }

    pub async fn multipart(
        &self,
        uri: &str,
        token: Option<&str>,
        parts: &[Part<'_>],
    ) -> Result<(StatusCode, Value)> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match part {
                Part::File {
                    name,
                    file_name,
                    content_type,
                    data,
                } => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                            name, file_name, content_type
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                }
                Part::Text { name, value } => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}", name, value)
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body))?).await
    }

    /// Raw response for non-JSON endpoints such as `/media`
    pub async fn get_raw(&self, uri: &str) -> Result<(StatusCode, Vec<u8>)> {
        let request = Request::builder().uri(uri).body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, bytes.to_vec()))
    }

    async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok((status, body))
    }

    pub async fn user(&self, username: &str, is_admin: bool, verified: bool) -> Result<User> {
        let user = self
            .store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: hash_password("pass-1234", 4)?,
                is_admin,
            })
            .await?;
        if verified {
            return Ok(self.store.set_user_verified(user.id, true).await?);
        }
        Ok(user)
    }

    pub fn token_for(&self, user: &User) -> Result<String> {
        Ok(self.state.tokens.issue(user)?)
    }

    pub async fn admin_token(&self) -> Result<String> {
        let admin = self.user("admin", true, true).await?;
        self.token_for(&admin)
    }

    /// A verified agent and their token
    pub async fn agent(&self, username: &str) -> Result<(User, String)> {
        let agent = self.user(username, false, true).await?;
        let token = self.token_for(&agent)?;
        Ok((agent, token))
    }

    pub async fn country(&self, name: &str) -> Result<Country> {
        Ok(self
            .store
            .create_country(NewCountry {
                name: name.to_string(),
                description: None,
            })
            .await?)
    }

    pub async fn university(&self, country: &Country, name: &str) -> Result<University> {
        Ok(self
            .store
            .create_university(NewUniversity {
                country_id: country.id,
                university_type: UniversityType::Public,
                name: name.to_string(),
                location: format!("{} campus", name),
                description: None,
            })
            .await?)
    }

    pub async fn course(&self, university: &University, name: &str) -> Result<Course> {
        Ok(self
            .store
            .create_course(NewCourse {
                university_id: university.id,
                name: name.to_string(),
                course_type: Some("Masters".to_string()),
                fee: Some(12_000),
                description: None,
            })
            .await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

/// Body of an agent application naming the given university slots
pub fn agent_application(universities: &[i32]) -> Value {
    json!({
        "first_name": "Nadia",
        "last_name": "Rahman",
        "email": "nadia@example.com",
        "phone": "+8801700000000",
        "passport_no": "BX0123456",
        "university_one_id": universities.first(),
        "university_two_id": universities.get(1),
        "university_three_id": universities.get(2),
    })
}
