//! Shared harness for integration tests: a router over a fresh in-memory
//! store, driven without binding a socket.

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use taskmind::{app::build_app, state::AppState};
use tower::ServiceExt;

pub struct TestApp {
    app: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response should be JSON")
    }

    /// Value of the `session` cookie from Set-Cookie, if one was set.
    pub fn session_cookie(&self) -> Option<String> {
        let raw = self.set_cookie_raw()?;
        let pair = raw.split(';').next()?;
        Some(pair.strip_prefix("session=")?.to_string())
    }

    pub fn set_cookie_raw(&self) -> Option<&str> {
        self.headers.get(header::SET_COOKIE)?.to_str().ok()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION)?.to_str().ok()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            app: build_app(AppState::fake()),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        session: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = session {
            builder = builder.header(header::COOKIE, format!("session={token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).expect("utf8 body"),
        }
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Signs up and returns the session cookie value.
    pub async fn signup_session(&self, name: &str, email: &str) -> String {
        let response = self.signup(name, email, "hunter22").await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.session_cookie().expect("session cookie")
    }
}
