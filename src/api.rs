use gloo_net::http::{Request, RequestBuilder, Response};
use leptos::logging::error;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::error::ClientError;
use crate::model::{
    AuthResponse, LeaderboardEntry, LoginRequest, Olympiad, Problem, RegisterRequest,
    RegistrationStatus, SubmissionRequest, SubmissionResult, User,
};
use crate::session::Session;

/// Paths of the judge API endpoints.
pub mod paths {
    pub const REGISTER: &str = "/api/register";
    pub const LOGIN: &str = "/api/login";
    pub const ME: &str = "/api/me";
    pub const PROBLEMS: &str = "/api/problems";
    pub const OLYMPIADS: &str = "/api/olympiads";

    pub fn problem(id: &str) -> String {
        format!("{}/{}", PROBLEMS, id)
    }

    pub fn problem_submit(id: &str) -> String {
        format!("{}/{}/submit", PROBLEMS, id)
    }

    pub fn olympiad(id: &str) -> String {
        format!("{}/{}", OLYMPIADS, id)
    }

    pub fn olympiad_problems(id: &str) -> String {
        format!("{}/{}/problems", OLYMPIADS, id)
    }

    pub fn olympiad_submit(id: &str) -> String {
        format!("{}/{}/submit", OLYMPIADS, id)
    }

    pub fn olympiad_register(id: &str) -> String {
        format!("{}/{}/register", OLYMPIADS, id)
    }

    pub fn olympiad_registration(id: &str) -> String {
        format!("{}/{}/check-registration", OLYMPIADS, id)
    }

    pub fn olympiad_leaderboard(id: &str) -> String {
        format!("{}/{}/leaderboard", OLYMPIADS, id)
    }
}

/// Typed access to the judge API. Attaches the session's bearer token to every request and drops
/// the session when the server answers 401.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    session: Session,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: Session) -> Self {
        ApiClient { config, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.send(self.post(paths::REGISTER).json(request)?).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.send(self.post(paths::LOGIN).json(request)?).await
    }

    /// The user owning the current token.
    pub async fn me(&self) -> Result<User, ClientError> {
        self.send(self.get(paths::ME).build()?).await
    }

    pub async fn problems(&self) -> Result<Vec<Problem>, ClientError> {
        self.send(self.get(paths::PROBLEMS).build()?).await
    }

    pub async fn problem(&self, id: &str) -> Result<Problem, ClientError> {
        self.send(self.get(&paths::problem(id)).build()?).await
    }

    pub async fn submit_problem(
        &self,
        id: &str,
        submission: &SubmissionRequest,
    ) -> Result<SubmissionResult, ClientError> {
        self.require_token()?;
        self.send(self.post(&paths::problem_submit(id)).json(submission)?)
            .await
    }

    pub async fn olympiads(&self) -> Result<Vec<Olympiad>, ClientError> {
        self.send(self.get(paths::OLYMPIADS).build()?).await
    }

    pub async fn olympiad(&self, id: &str) -> Result<Olympiad, ClientError> {
        self.send(self.get(&paths::olympiad(id)).build()?).await
    }

    pub async fn olympiad_problems(&self, id: &str) -> Result<Vec<Problem>, ClientError> {
        self.send(self.get(&paths::olympiad_problems(id)).build()?)
            .await
    }

    /// Submits a solution to one problem of an olympiad. The problem is named in the body.
    pub async fn submit_olympiad(
        &self,
        id: &str,
        submission: &SubmissionRequest,
    ) -> Result<SubmissionResult, ClientError> {
        self.require_token()?;
        self.send(self.post(&paths::olympiad_submit(id)).json(submission)?)
            .await
    }

    pub async fn register_for_olympiad(&self, id: &str) -> Result<(), ClientError> {
        self.require_token()?;
        let request = self
            .post(&paths::olympiad_register(id))
            .json(&serde_json::json!({}))?;
        let response = request.send().await?;
        if response.ok() {
            return Ok(());
        }
        Err(self.reject_response(response).await)
    }

    pub async fn check_registration(&self, id: &str) -> Result<RegistrationStatus, ClientError> {
        self.require_token()?;
        self.send(self.get(&paths::olympiad_registration(id)).build()?)
            .await
    }

    pub async fn leaderboard(&self, id: &str) -> Result<Vec<LeaderboardEntry>, ClientError> {
        self.send(self.get(&paths::olympiad_leaderboard(id)).build()?)
            .await
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(Request::get(&self.config.url(path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(Request::post(&self.config.url(path)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => builder.header("Authorization", &bearer(&token)),
            None => builder,
        }
    }

    fn require_token(&self) -> Result<String, ClientError> {
        self.session.token().ok_or(ClientError::NotAuthenticated)
    }

    async fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T, ClientError> {
        let url = request.url();
        let response = request.send().await.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            ClientError::from(e)
        })?;
        if !response.ok() {
            return Err(self.reject_response(response).await);
        }
        response.json::<T>().await.map_err(|e| {
            error!("Could not decode response from {}: {}", url, e);
            ClientError::from(e)
        })
    }

    async fn reject_response(&self, response: Response) -> ClientError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!("{} answered {}: {}", response.url(), status, body);
        self.reject(status, &body)
    }

    /// Turns a failed status into an error. A 401 also ends the session.
    fn reject(&self, status: u16, body: &str) -> ClientError {
        let err = ClientError::from_status(status, body);
        if matches!(err, ClientError::Unauthorized(_)) {
            self.session.clear();
        }
        err
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Serializes a request body the way the client sends it. Used to log what is about to be
/// submitted without the source code itself.
pub fn describe_submission<T: Serialize>(body: &T) -> String {
    match serde_json::to_value(body) {
        Ok(serde_json::Value::Object(mut fields)) => {
            if let Some(code) = fields.get_mut("code") {
                let len = code.as_str().map(str::len).unwrap_or_default();
                *code = serde_json::Value::String(format!("<{} bytes>", len));
            }
            serde_json::Value::Object(fields).to_string()
        }
        Ok(other) => other.to_string(),
        Err(e) => e.to_string(),
    }
}
