pub mod analysis;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit();

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/analyses", post(analysis::handle_analyze))
        .route("/api/v1/requirements", post(analysis::handle_extract))
        .route("/api/v1/documents", post(analysis::handle_ingest))
        .route("/api/v1/sessions/:id", get(analysis::handle_session_view))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::skills::SkillLexicon;

    const BOUNDARY: &str = "analyzer-test-boundary";

    const JD: &str = "Backend Engineer\n\
        Must have: Rust, PostgreSQL\n\
        Nice to have: Kubernetes";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str),
    }

    fn multipart_body(parts: &[Part<'_>]) -> String {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match part {
                Part::Text(name, value) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                    ));
                }
                Part::File(filename, content) => {
                    body.push_str(&format!(
                        "Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n\
                         Content-Type: text/plain\r\n\r\n{content}\r\n"
                    ));
                }
            }
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn app() -> (Router, AppState) {
        let state = AppState::new(Config::default(), SkillLexicon::builtin());
        (build_router(state.clone()), state)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app();
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["scorer"], "keyword");
    }

    #[tokio::test]
    async fn test_analyze_ranks_uploaded_resumes() {
        let (router, _) = app();
        let request = multipart_request(
            "/api/v1/analyses",
            &[
                Part::Text("job_description", JD),
                Part::File("partial.txt", "Rust services"),
                Part::File("full.txt", "Rust, Postgres and K8s in production"),
            ],
        );
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["filename"], "full.txt");
        assert_eq!(results[0]["score"], 100.0);
        assert_eq!(results[1]["unmet_mandatory"], json!(["postgresql"]));
        assert_eq!(results[1]["capped"], false);
        assert!(body["failures"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_empty_job_description() {
        let (router, _) = app();
        let request = multipart_request(
            "/api/v1/analyses",
            &[Part::Text("job_description", "   "), Part::File("a.txt", "Rust")],
        );
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_INPUT");
    }

    #[tokio::test]
    async fn test_analyze_without_files() {
        let (router, _) = app();
        let request =
            multipart_request("/api/v1/analyses", &[Part::Text("job_description", JD)]);
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_analyze_with_no_ingestible_files() {
        let (router, _) = app();
        let request = multipart_request(
            "/api/v1/analyses",
            &[
                Part::Text("job_description", JD),
                Part::File("photo.jpg", "not a resume"),
            ],
        );
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "NO_DOCUMENTS");
        assert_eq!(body["error"]["failures"][0]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_session_view_tracks_last_analysis() {
        let (router, state) = app();
        let request = multipart_request(
            "/api/v1/analyses",
            &[
                Part::Text("session_id", "panel-1"),
                Part::Text("job_description", JD),
                Part::File("cv.txt", "Rust and PostgreSQL"),
            ],
        );
        let (status, _) = send(router.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(state.sessions.view("panel-1").is_some());

        let request = Request::builder()
            .uri("/api/v1/sessions/panel-1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["submissions"], 1);
        assert_eq!(body["staged_files"], 1);
        assert_eq!(body["status"]["state"], "completed");
        assert_eq!(body["status"]["results"], 1);

        let request = Request::builder()
            .uri("/api/v1/sessions/unknown")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_requirements_preview() {
        let (router, _) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/requirements")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "jd_text": JD }).to_string()))
            .unwrap();
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        let requirements = body["requirements"].as_array().unwrap();
        let terms: Vec<&str> = requirements
            .iter()
            .map(|r| r["term"].as_str().unwrap())
            .collect();
        assert_eq!(terms, vec!["rust", "postgresql", "kubernetes"]);
        assert_eq!(requirements[0]["mandatory"], true);
        assert_eq!(requirements[2]["importance"], "preferred");
    }

    #[tokio::test]
    async fn test_requirements_preview_rejects_blank_text() {
        let (router, _) = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/requirements")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "jd_text": "" }).to_string()))
            .unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_INPUT");
    }

    #[tokio::test]
    async fn test_documents_preview() {
        let (router, _) = app();
        let request = multipart_request(
            "/api/v1/documents",
            &[
                Part::File("dev.txt", "Senior Software Engineer\nReactJS and Docker, 2018 - 2022"),
                Part::File("cv.exe", "MZ"),
            ],
        );
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        let document = &body["documents"][0];
        assert_eq!(document["filename"], "dev.txt");
        assert_eq!(document["format"], "text");
        assert_eq!(document["title"], "Senior Software Engineer");
        assert_eq!(document["years_of_experience"], 4);
        assert_eq!(document["skills"][0]["name"], "react");
        assert!(document.get("tokens").is_none());
        assert_eq!(body["failures"][0]["filename"], "cv.exe");
    }
}
