//! The analyze-face handler: multipart in, provider relay, parsed report
//! out.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use image::ImageFormat;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::error::AnalyzeError;
use super::AppState;
use crate::extract::{percent, AncestryDatum};

/// Success payload. Field names match the JSON the web client consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis: String,
    pub ancestry_data: Vec<AncestryDatum>,
}

pub async fn analyze_face(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    let mut photo: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AnalyzeError::Internal(e.to_string()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AnalyzeError::Internal(e.to_string()))?;
            photo = Some(bytes.to_vec());
        }
    }

    let photo = photo.filter(|p| !p.is_empty()).ok_or(AnalyzeError::NoFile)?;
    let mime = sniff_mime(&photo)?;

    let analysis = state.provider.analyze_image(&photo, mime).await?;
    let ancestry_data = percent::extract_ancestry(&analysis);
    if ancestry_data.is_empty() {
        warn!("no ancestry percentages found in completion");
    }
    info!("analysis complete: {} regions", ancestry_data.len());

    Ok(Json(AnalyzeResponse {
        analysis,
        ancestry_data,
    }))
}

/// The data-URL MIME is taken from the actual bytes, not the file name.
fn sniff_mime(photo: &[u8]) -> Result<&'static str, AnalyzeError> {
    match image::guess_format(photo) {
        Ok(ImageFormat::Png) => Ok("image/png"),
        Ok(ImageFormat::Jpeg) => Ok("image/jpeg"),
        Ok(ImageFormat::Gif) => Ok("image/gif"),
        Ok(ImageFormat::WebP) => Ok("image/webp"),
        _ => Err(AnalyzeError::UnsupportedImage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::router;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const COMPLETION: &str = "\
Here is a breakdown of the observed traits.

**Comprehensive Ancestry Percentage Breakdown:**
- **West African:** 40%
- **Northern European:** 35%

### SUMMARY TABLE

| Region/Group | Estimated Percentage | Key Traits & Justification |
|--------------|---------------------|---------------------------|
| West African | 40% | Broad nasal bridge |
| Northern European | 35% | Light eye pigmentation |

**Conclusion:**
A predominantly West African reading.
";

    /// Serve a canned completion (or error) on an ephemeral port and return
    /// the base URL.
    async fn spawn_upstream(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(move || async move { (status, axum::Json(body)) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn test_router(api_base: String) -> Router {
        let config = Config {
            port: 0,
            api_key: "test-key".into(),
            api_base,
        };
        router(crate::server::AppState::new(&config))
    }

    fn tiny_png() -> Vec<u8> {
        use image::{DynamicImage, RgbImage};
        let mut buf = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([120, 90, 60])))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    const BOUNDARY: &str = "rootlens-test-boundary";

    fn multipart_request(file: Option<&[u8]>) -> Request<Body> {
        let mut body = Vec::new();
        if let Some(bytes) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                     name=\"file\"; filename=\"face.png\"\r\n\
                     Content-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/analyze-face")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn valid_photo_yields_ancestry_data() {
        let upstream = spawn_upstream(
            StatusCode::OK,
            json!({ "choices": [ { "message": { "content": COMPLETION } } ] }),
        )
        .await;
        let app = test_router(upstream);

        let response = app
            .oneshot(multipart_request(Some(&tiny_png())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let parsed: AnalyzeResponse = serde_json::from_value(body).unwrap();
        assert!(!parsed.analysis.is_empty());
        assert_eq!(parsed.ancestry_data.len(), 2);
        assert_eq!(parsed.ancestry_data[0].region, "West African");
        assert_eq!(parsed.ancestry_data[0].percent, 40);
    }

    #[tokio::test]
    async fn upstream_failure_surfaces_as_500() {
        let upstream =
            spawn_upstream(StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "quota" })).await;
        let app = test_router(upstream);

        let response = app
            .oneshot(multipart_request(Some(&tiny_png())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_completion_is_500() {
        let upstream = spawn_upstream(
            StatusCode::OK,
            json!({ "choices": [ { "message": { "content": "" } } ] }),
        )
        .await;
        let app = test_router(upstream);

        let response = app
            .oneshot(multipart_request(Some(&tiny_png())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn missing_file_is_400() {
        // Upstream must never be reached; any base works.
        let app = test_router("http://127.0.0.1:9".into());

        let response = app.oneshot(multipart_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "no file uploaded");
    }

    #[tokio::test]
    async fn non_image_bytes_are_400() {
        let app = test_router("http://127.0.0.1:9".into());

        let response = app
            .oneshot(multipart_request(Some(b"plain text, not pixels")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn mime_sniffing_reads_magic_bytes() {
        assert_eq!(sniff_mime(&tiny_png()).unwrap(), "image/png");
        assert!(sniff_mime(b"definitely not an image").is_err());
    }
}
