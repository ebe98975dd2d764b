#![allow(dead_code)]

use tempfile::TempDir;

use tenant_crm::db::{DbPool, establish_connection_pool, run_pending_migrations};
use tenant_crm::domain::auth::AuthenticatedUser;
use tenant_crm::domain::types::{UserEmail, UserName};
use tenant_crm::domain::user::{NewUser, User};
use tenant_crm::jwt;
use tenant_crm::models::config::AuthConfig;
use tenant_crm::repository::{DieselRepository, UserWriter};

/// Migrated SQLite database living in a temporary directory.
pub struct TestDb {
    pool: DbPool,
    _dir: TempDir,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("create pool");
        run_pending_migrations(&pool).expect("run migrations");
        Self { pool, _dir: dir }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

pub fn create_user(repo: &DieselRepository, email: &str, name: &str) -> User {
    let new_user = NewUser::new(
        UserEmail::new(email).expect("valid email"),
        UserName::new(name).expect("valid name"),
    );
    repo.get_or_create_user(&new_user).expect("create user")
}

pub const SECRET: &str = "test-secret";

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        secret: SECRET.to_string(),
        token_ttl_seconds: 3600,
    }
}

/// Token as minted by the identity provider: identity only.
pub fn token(email: &str, name: &str) -> String {
    let claims = AuthenticatedUser {
        sub: email.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        is_superuser: false,
        is_staff: false,
        organization_id: None,
        profile_type: None,
        permissions: Vec::new(),
        exp: jwt::expiration(3600),
    };
    jwt::encode_token(&claims, SECRET).expect("encode token")
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (actix_web::http::header::AUTHORIZATION, format!("Bearer {token}"))
}

/// Initializes the API against the given repository.
#[macro_export]
macro_rules! test_app {
    ($repo:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($repo.clone()))
                .app_data(actix_web::web::Data::new($crate::common::auth_config()))
                .configure(tenant_crm::routes::configure),
        )
        .await
    };
}
