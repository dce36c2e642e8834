pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_request_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/job-description",
            post(handlers::handle_submit_job_description).get(handlers::handle_get_job_description),
        )
        .route("/api/v1/evaluations", post(handlers::handle_evaluate))
        .route("/api/v1/candidates", get(handlers::handle_get_candidates))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, Response, StatusCode};
    use docx_rs::{Docx, Paragraph, Run};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::testing::FakeModel;
    use crate::llm_client::GenerationClient;
    use crate::screening::handlers::SESSION_HEADER;
    use crate::session::SessionStore;

    const BOUNDARY: &str = "screener-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, Vec<u8>),
    }

    fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, filename, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(&data);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn docx_with(text: &str) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
            .build()
            .pack(&mut cursor)
            .unwrap();
        cursor.into_inner()
    }

    fn test_app() -> (Router, Arc<FakeModel>) {
        let model = Arc::new(FakeModel::new(|prompt| {
            if prompt.contains("raw JSON format") {
                let score = prompt
                    .split("SCORE=")
                    .nth(1)
                    .and_then(|rest| rest.split_whitespace().next())
                    .unwrap_or("0");
                Ok(format!(
                    "```json\n{{\"score\": {score}, \"missing_skills\": [\"Kafka\"], \"remarks\": \"ok\"}}\n```"
                ))
            } else if prompt.contains("interview invitation") {
                Ok("Invite".to_string())
            } else if prompt.contains("rejection email") {
                Ok("Reject".to_string())
            } else {
                Ok("Generated JD text".to_string())
            }
        }));
        let state = AppState {
            llm: GenerationClient::new(model.clone()),
            sessions: Arc::new(SessionStore::new()),
            config: Config::for_tests(),
        };
        (build_router(state), model)
    }

    fn multipart_request(uri: &str, session: Option<&str>, parts: Vec<Part<'_>>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(id) = session {
            builder = builder.header(SESSION_HEADER, id);
        }
        builder.body(Body::from(multipart_body(parts))).unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn submit_text_jd(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(multipart_request(
                "/api/v1/job-description",
                None,
                vec![Part::Text("jd_text", "Backend engineer, Rust and Kafka")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let header_id = response
            .headers()
            .get(SESSION_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = json_body(response).await;
        assert_eq!(body["session_id"], header_id.as_str());
        assert_eq!(body["source"], "text");
        header_id
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_evaluate_without_job_description_is_rejected() {
        let (app, model) = test_app();
        let response = app
            .oneshot(multipart_request(
                "/api/v1/evaluations",
                None,
                vec![Part::File("resumes", "a.docx", docx_with("SCORE=50"))],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
        let body = json_body(response).await;
        assert_eq!(
            body["error"]["message"],
            "Please provide a job description first."
        );
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_job_description_requires_a_source() {
        let (app, _) = test_app();
        let response = app
            .oneshot(multipart_request(
                "/api/v1/job-description",
                None,
                vec![Part::Text("job_title", "Engineer")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_structured_fields_generate_job_description() {
        let (app, model) = test_app();
        let response = app
            .oneshot(multipart_request(
                "/api/v1/job-description",
                None,
                vec![
                    Part::Text("job_title", "SRE"),
                    Part::Text("skills", "Linux, Terraform"),
                    Part::Text("location", "Berlin"),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["source"], "generated");
        assert_eq!(body["job_description"], "Generated JD text");
        assert!(model.prompts()[0].contains("Location: Berlin"));
    }

    #[tokio::test]
    async fn test_uploaded_file_wins_over_text() {
        let (app, _) = test_app();
        let response = app
            .oneshot(multipart_request(
                "/api/v1/job-description",
                None,
                vec![
                    Part::Text("jd_text", "typed description"),
                    Part::File("jd_file", "role.docx", docx_with("Uploaded description")),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["source"], "upload");
        assert_eq!(body["job_description"], "Uploaded description\n");
    }

    #[tokio::test]
    async fn test_full_evaluation_flow() {
        let (app, model) = test_app();
        let session = submit_text_jd(&app).await;

        let response = app
            .clone()
            .oneshot(multipart_request(
                "/api/v1/evaluations",
                Some(&session),
                vec![
                    Part::File("resumes", "low.docx", docx_with("SCORE=30 Alice")),
                    Part::File("resumes", "high.docx", docx_with("SCORE=90 Bob")),
                    Part::File("resumes", "notes.txt", b"SCORE=99 ignored".to_vec()),
                ],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let candidates = body["candidates"].as_array().unwrap();
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0]["filename"], "high.docx");
        assert_eq!(candidates[0]["score"], 90);
        assert_eq!(candidates[0]["email"], "Invite");
        assert_eq!(candidates[1]["filename"], "low.docx");
        assert_eq!(candidates[1]["email"], "Reject");
        assert_eq!(candidates[2]["filename"], "notes.txt");
        assert_eq!(candidates[2]["score"], 0);
        assert_eq!(candidates[2]["email"], "Reject");

        // 3 evaluations + 1 invite + 2 rejections
        assert_eq!(model.prompts().len(), 6);

        let response = app
            .oneshot(
                Request::get("/api/v1/candidates")
                    .header(SESSION_HEADER, &session)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["candidates"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_evaluation_requires_files() {
        let (app, _) = test_app();
        let session = submit_text_jd(&app).await;
        let response = app
            .oneshot(multipart_request(
                "/api/v1/evaluations",
                Some(&session),
                vec![Part::Text("note", "no files")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_session_header_is_rejected() {
        let (app, _) = test_app();
        let response = app
            .oneshot(
                Request::get("/api/v1/candidates")
                    .header(SESSION_HEADER, "not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_job_description_session_is_created_or_reused() {
        let (app, _) = test_app();
        let session = submit_text_jd(&app).await;

        let stray = uuid::Uuid::new_v4().to_string();
        let mut returned = Vec::new();
        for id in [session.as_str(), stray.as_str()] {
            let response = app
                .clone()
                .oneshot(multipart_request(
                    "/api/v1/job-description",
                    Some(id),
                    vec![Part::Text("jd_text", "Data analyst")],
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = json_body(response).await;
            returned.push(body["session_id"].as_str().unwrap().to_string());
        }

        assert_eq!(returned[0], session);
        assert_ne!(returned[1], stray);
        assert_ne!(returned[1], session);
    }
}
