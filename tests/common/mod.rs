use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{anyhow, ensure, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use diesel::prelude::*;
use http_body_util::BodyExt;
use serde::Serialize;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tower::util::ServiceExt;

use amw_backend::auth::jwt::JwtService;
use amw_backend::auth::password;
use amw_backend::config::AppConfig;
use amw_backend::db;
use amw_backend::models::{NewUser, NewVehicle, User};
use amw_backend::notify::{EmailMessage, Notifier};
use amw_backend::routes;
use amw_backend::schema::{users, vehicles};
use amw_backend::state::AppState;

#[derive(Default)]
pub struct FakeNotifier {
    messages: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let mut guard = self.messages.lock().await;
        guard.push(message.clone());
        Ok(())
    }
}

impl FakeNotifier {
    #[allow(dead_code)]
    pub async fn messages(&self) -> Vec<EmailMessage> {
        self.messages.lock().await.clone()
    }
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
    notifier: Arc<FakeNotifier>,
    _db_file: NamedTempFile,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_holidays(&[])
    }

    pub fn with_holidays(holidays: &[NaiveDate]) -> Result<Self> {
        let db_file = NamedTempFile::new()?;
        let database_url = db_file
            .path()
            .to_str()
            .ok_or_else(|| anyhow!("temp db path is not utf-8"))?
            .to_string();

        let config = AppConfig {
            database_url: database_url.clone(),
            database_max_pool_size: db::DEFAULT_MAX_POOL_SIZE,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: "test-issuer".to_string(),
            jwt_audience: "test-audience".to_string(),
            jwt_expiry_minutes: 60,
            walk_in_capacity: 2,
            authenticated_capacity: 3,
            public_holidays: holidays.iter().copied().collect::<HashSet<_>>(),
            mail_relay_endpoint: None,
            mail_from: "bookings@test.example".to_string(),
            mail_timeout_secs: 1,
        };

        let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
        {
            let mut conn = pool.get()?;
            db::run_migrations(&mut conn)?;
        }

        let notifier = Arc::new(FakeNotifier::default());
        let notifier_for_state: Arc<dyn Notifier> = notifier.clone();
        let jwt = JwtService::from_config(&config)?;
        let state = AppState::new(pool, config, notifier_for_state, jwt);
        let router = routes::create_router(state.clone());

        Ok(Self {
            state,
            router,
            notifier,
            _db_file: db_file,
        })
    }

    #[allow(dead_code)]
    pub fn notifier(&self) -> Arc<FakeNotifier> {
        self.notifier.clone()
    }

    pub fn insert_user(
        &self,
        first_name: &str,
        phone: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<i32> {
        let mut conn = self.state.db().map_err(|err| anyhow!("{err:?}"))?;
        let password_hash = password::hash_password(password)?;
        let user: User = diesel::insert_into(users::table)
            .values(NewUser {
                first_name: first_name.to_string(),
                last_name: "Tester".to_string(),
                phone: phone.to_string(),
                email: email.to_string(),
                password_hash,
                role: role.to_string(),
            })
            .get_result(&mut conn)?;
        Ok(user.id)
    }

    pub fn insert_vehicle(&self, registration: &str, user_id: i32) -> Result<()> {
        let mut conn = self.state.db().map_err(|err| anyhow!("{err:?}"))?;
        diesel::insert_into(vehicles::table)
            .values(NewVehicle {
                registration: registration.to_string(),
                user_id,
                make: "Toyota".to_string(),
                model: "Corolla".to_string(),
                year: 2019,
                colour: "Blue".to_string(),
                last_service_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            })
            .execute(&mut conn)?;
        Ok(())
    }

    pub async fn login_token(&self, email: &str, password: &str) -> Result<String> {
        #[derive(Serialize)]
        struct LoginPayload<'a> {
            email: &'a str,
            password: &'a str,
        }

        let response = self
            .post_json("/api/auth/login", &LoginPayload { email, password }, None)
            .await?;

        ensure!(
            response.status() == StatusCode::OK,
            "login failed with status {}",
            response.status()
        );

        let body = body_to_vec(response.into_body()).await?;
        #[derive(serde::Deserialize)]
        struct LoginResponse {
            access_token: String,
        }
        let parsed: LoginResponse = serde_json::from_slice(&body)?;
        Ok(parsed.access_token)
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    #[allow(dead_code)]
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let mut builder = Request::builder()
            .method(Method::PUT)
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    #[allow(dead_code)]
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        let mut builder = Request::builder().method(Method::DELETE).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

/// Spawned notification tasks race the assertions; poll briefly instead of
/// sleeping a fixed amount.
#[allow(dead_code)]
pub async fn wait_for_messages(notifier: &FakeNotifier, expected: usize) -> Vec<EmailMessage> {
    for _ in 0..50 {
        let messages = notifier.messages().await;
        if messages.len() >= expected {
            return messages;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    notifier.messages().await
}
