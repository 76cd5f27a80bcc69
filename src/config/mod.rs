use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub media: MediaConfig,
    pub admission: AdmissionConfig,
    pub superuser: SuperuserConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection string; `None` means the server needs `--memory`
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub access_token_expire_minutes: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub root: String,
    pub max_image_mb: usize,
    pub max_document_mb: usize,
    pub max_profile_file_mb: usize,
    /// Cap on a whole upload request, which may carry several files
    pub max_request_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Countries where an agent application may name a single university only
    pub restricted_countries: Vec<String>,
    pub max_universities: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperuserConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|url| !url.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ALGORITHM") {
            self.security.jwt_algorithm = v;
        }
        if let Ok(v) = env::var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.security.access_token_expire_minutes =
                v.parse().unwrap_or(self.security.access_token_expire_minutes);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        // Media overrides
        if let Ok(v) = env::var("MEDIA_ROOT") {
            self.media.root = v;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_IMAGE_MB") {
            self.media.max_image_mb = v.parse().unwrap_or(self.media.max_image_mb);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_DOCUMENT_MB") {
            self.media.max_document_mb = v.parse().unwrap_or(self.media.max_document_mb);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_PROFILE_MB") {
            self.media.max_profile_file_mb = v.parse().unwrap_or(self.media.max_profile_file_mb);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_REQUEST_MB") {
            self.media.max_request_mb = v.parse().unwrap_or(self.media.max_request_mb);
        }

        // Admission rules
        if let Ok(v) = env::var("RESTRICTED_COUNTRIES") {
            self.admission.restricted_countries = split_list(&v);
        }

        // Bootstrap admin
        if let Ok(v) = env::var("SUPERUSER_USERNAME") {
            self.superuser.username = v;
        }
        if let Ok(v) = env::var("SUPERUSER_EMAIL") {
            self.superuser.email = v;
        }
        if let Ok(v) = env::var("SUPERUSER_PASSWORD") {
            self.superuser.password = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 8000,
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                jwt_secret: "devds98ds902m00a013jk".to_string(),
                jwt_algorithm: "HS256".to_string(),
                access_token_expire_minutes: 60,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            media: MediaConfig::default(),
            admission: AdmissionConfig::default(),
            superuser: SuperuserConfig {
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
                password: "adminpassword".to_string(),
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config.security.jwt_secret = String::new();
        config.superuser.password = String::new();
        config
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8000,
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
                // Must come from SECRET_KEY; an empty secret refuses to sign tokens
                jwt_secret: String::new(),
                jwt_algorithm: "HS256".to_string(),
                access_token_expire_minutes: 60,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            media: MediaConfig::default(),
            admission: AdmissionConfig::default(),
            superuser: SuperuserConfig {
                username: "admin".to_string(),
                email: "admin@example.com".to_string(),
                password: String::new(),
            },
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: "media".to_string(),
            max_image_mb: 5,
            max_document_mb: 5,
            max_profile_file_mb: 4,
            max_request_mb: 64,
        }
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            restricted_countries: vec!["Malaysia".to_string(), "Cyprus".to_string()],
            max_universities: 3,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
