//! REST API client for the EduLearn learning endpoints.
//!
//! [`LearningApi`] is the seam between the learning flow and the server;
//! [`EduLearnApi`] implements it over HTTP using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use edulearn_core::models::{
    AccessToken, Certificate, Course, CourseFilter, CourseSummary, Enrollment, EnrollmentCreate,
    LessonProgress, ProgressUpdate,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// The endpoints the learning flow depends on.
#[async_trait]
pub trait LearningApi: Send + Sync {
    /// `GET /courses`, filtered by title search, category and level.
    async fn list_courses(&self, filter: &CourseFilter) -> ClientResult<Vec<CourseSummary>>;

    /// `GET /courses/{id}`, lessons embedded.
    async fn get_course(&self, course_id: &str) -> ClientResult<Course>;

    /// `GET /enrollments/me`.
    async fn my_enrollments(&self) -> ClientResult<Vec<Enrollment>>;

    /// `POST /enrollments`. The server refuses unpublished courses and
    /// repeat enrollments with 400.
    async fn enroll(&self, course_id: &str) -> ClientResult<Enrollment>;

    /// `GET /enrollments/{id}/progress`.
    async fn get_progress(&self, enrollment_id: &str) -> ClientResult<Vec<LessonProgress>>;

    /// `POST /enrollments/{id}/progress`. Returns the updated enrollment.
    async fn update_progress(
        &self,
        enrollment_id: &str,
        update: &ProgressUpdate,
    ) -> ClientResult<Enrollment>;

    /// `GET /enrollments/{id}/certificate`. The server rejects this until
    /// the enrollment is completed.
    async fn get_certificate(&self, enrollment_id: &str) -> ClientResult<Certificate>;
}

/// HTTP client for one EduLearn API deployment.
pub struct EduLearnApi {
    client: reqwest::Client,
    api_url: String,
    session: Session,
}

impl EduLearnApi {
    /// Create a client from loaded configuration and an explicit session.
    pub fn new(config: &ClientConfig, session: Session) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config.api_url.clone(), session))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, session: Session) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replace the session, e.g. after logging in again.
    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    /// Exchange credentials for a token at `POST /auth/token` and switch
    /// to an authenticated session.
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<()> {
        let response = self
            .client
            .post(self.url("auth/token"))
            .form(&[("username", email), ("password", password)])
            .send()
            .await?;
        let token: AccessToken = Self::parse_response(response).await?;
        tracing::info!(email, "Logged in to EduLearn API");
        self.session = Session::with_token(token.access_token);
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.client.post(self.url(path)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, turning anything
    /// else into [`ClientError::Upstream`] with the server's detail.
    async fn ensure_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let detail = extract_detail(&body);
            tracing::warn!(status = status.as_u16(), detail = %detail, "EduLearn API request rejected");
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<T> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl LearningApi for EduLearnApi {
    async fn list_courses(&self, filter: &CourseFilter) -> ClientResult<Vec<CourseSummary>> {
        let response = self.get("courses").query(filter).send().await?;
        Self::parse_response(response).await
    }

    async fn get_course(&self, course_id: &str) -> ClientResult<Course> {
        let response = self.get(&format!("courses/{course_id}")).send().await?;
        Self::parse_response(response).await
    }

    async fn my_enrollments(&self) -> ClientResult<Vec<Enrollment>> {
        let response = self.get("enrollments/me").send().await?;
        Self::parse_response(response).await
    }

    async fn enroll(&self, course_id: &str) -> ClientResult<Enrollment> {
        let body = EnrollmentCreate {
            course_id: course_id.to_string(),
        };
        let response = self.post("enrollments").json(&body).send().await?;
        Self::parse_response(response).await
    }

    async fn get_progress(&self, enrollment_id: &str) -> ClientResult<Vec<LessonProgress>> {
        let response = self
            .get(&format!("enrollments/{enrollment_id}/progress"))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update_progress(
        &self,
        enrollment_id: &str,
        update: &ProgressUpdate,
    ) -> ClientResult<Enrollment> {
        let response = self
            .post(&format!("enrollments/{enrollment_id}/progress"))
            .json(update)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn get_certificate(&self, enrollment_id: &str) -> ClientResult<Certificate> {
        let response = self
            .get(&format!("enrollments/{enrollment_id}/certificate"))
            .send()
            .await?;
        Self::parse_response(response).await
    }
}

/// Pull a human-readable message out of an error body.
///
/// The API answers errors as `{"detail": "..."}`; validation failures
/// carry a list of `{"msg": "..."}` objects instead. Anything else is
/// returned as the raw body.
pub fn extract_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    match value.get("detail") {
        Some(serde_json::Value::String(detail)) => detail.clone(),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                body.trim().to_string()
            } else {
                messages.join("; ")
            }
        }
        _ => body.trim().to_string(),
    }
}
