//! `edulearn-client` -- command-line view of a learner's courses.
//!
//! Logs the student dashboard, then either the course catalog (no
//! `COURSE_ID`) or one course's lesson outline with gating state. Once
//! every lesson of that course is complete it can write the certificate's
//! drawing instructions as JSON.
//!
//! # Environment variables
//!
//! | Variable                        | Required | Default                        | Description                                |
//! |---------------------------------|----------|--------------------------------|--------------------------------------------|
//! | `EDULEARN_API_URL`              | no       | `http://localhost:8000/api/v1` | REST API base URL                          |
//! | `EDULEARN_TOKEN`                | no*      | --                             | Bearer token of the student                |
//! | `EDULEARN_EMAIL`                | no*      | --                             | Login email, used when no token is set     |
//! | `EDULEARN_PASSWORD`             | no*      | --                             | Login password                             |
//! | `EDULEARN_REQUEST_TIMEOUT_SECS` | no       | `30`                           | HTTP request timeout                       |
//! | `COURSE_ID`                     | no       | --                             | Course to load; catalog listed if unset    |
//! | `ENROLL`                        | no       | `false`                        | Enroll when not yet enrolled               |
//! | `CERTIFICATE_OUT`               | no       | --                             | Path for the certificate JSON output       |
//!
//! \* Either `EDULEARN_TOKEN` or both `EDULEARN_EMAIL` and `EDULEARN_PASSWORD`.

use chrono::{Local, Offset};
use edulearn_client::api::EduLearnApi;
use edulearn_client::config::ClientConfig;
use edulearn_client::error::ClientError;
use edulearn_client::learning::{CourseView, LearningService};
use edulearn_client::session::Session;
use edulearn_core::certificate::CertificateDocumentBuilder;
use edulearn_core::models::CourseFilter;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edulearn_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        std::process::exit(1);
    });

    let course_id = std::env::var("COURSE_ID").ok().filter(|v| !v.trim().is_empty());
    let enroll = std::env::var("ENROLL")
        .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);
    let certificate_out = std::env::var("CERTIFICATE_OUT").ok();

    tracing::info!(api_url = %config.api_url, course_id = ?course_id, "Starting edulearn-client");

    let session = config
        .token
        .clone()
        .map(Session::with_token)
        .unwrap_or_default();
    let mut api = EduLearnApi::new(&config, session).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build HTTP client");
        std::process::exit(1);
    });

    if !api.session().is_authenticated() {
        let Some((email, password)) = config.credentials() else {
            tracing::error!("Set EDULEARN_TOKEN or EDULEARN_EMAIL and EDULEARN_PASSWORD");
            std::process::exit(1);
        };
        if let Err(e) = api.login(email, password).await {
            tracing::error!(error = %e, "Login failed");
            std::process::exit(1);
        }
    }

    let service = LearningService::new(api);
    let options = RunOptions {
        course_id: course_id.as_deref(),
        enroll,
        certificate_out: certificate_out.as_deref(),
    };

    if let Err(e) = run(&service, options).await {
        if e.is_unauthorized() {
            tracing::error!("Session token was rejected; log in again");
        } else {
            tracing::error!(error = %e, "edulearn-client failed");
        }
        std::process::exit(1);
    }
}

struct RunOptions<'a> {
    course_id: Option<&'a str>,
    enroll: bool,
    certificate_out: Option<&'a str>,
}

async fn run(
    service: &LearningService<EduLearnApi>,
    options: RunOptions<'_>,
) -> Result<(), ClientError> {
    let dashboard = service.dashboard().await?;
    tracing::info!(
        total = dashboard.summary.total,
        active = dashboard.summary.active,
        completed = dashboard.summary.completed,
        completion_rate = dashboard.summary.completion_rate_pct,
        "Enrollments",
    );
    for row in &dashboard.enrollments {
        tracing::info!(
            course_id = %row.course_id,
            status = row.status.as_str(),
            percent = row.progress_pct,
            certificate = row.certificate_available,
            "Enrollment",
        );
    }

    let Some(course_id) = options.course_id else {
        for course in service.catalog(&CourseFilter::default()).await? {
            tracing::info!(
                course_id = %course.id,
                title = %course.title,
                level = course.level.as_str(),
                enrollments = course.enrollment_count,
                "Catalog course",
            );
        }
        return Ok(());
    };

    let view = match service.load_course(course_id).await {
        Err(ClientError::NotEnrolled { .. }) if options.enroll => {
            service.enroll(course_id).await?
        }
        other => other?,
    };
    log_course(&view)?;

    let Some(path) = options.certificate_out else {
        return Ok(());
    };

    let builder =
        CertificateDocumentBuilder::default().with_utc_offset(Local::now().offset().fix());
    let document = service.certificate_document(&view, &builder).await?;
    let json = serde_json::to_vec_pretty(&document)?;
    tokio::fs::write(path, json).await?;

    tracing::info!(path, file_name = %document.file_name, "Certificate written");
    Ok(())
}

fn log_course(view: &CourseView) -> Result<(), ClientError> {
    let progress = view.course_progress();
    tracing::info!(
        course = %view.course.title,
        completed = progress.completed_count,
        total = progress.total_count,
        percent = progress.percent,
        "Course progress",
    );

    for entry in view.outline()? {
        tracing::info!(
            lesson = entry.sequence_number,
            title = %entry.title,
            state = ?entry.state,
            blocked_by = ?entry.blocking_lesson_id,
            "Lesson",
        );
    }
    Ok(())
}
