//! Image upload handler.
//!
//! ```text
//! POST /api/v1/upload   multipart/form-data, single `image` field, ≤ 5 MiB
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, post, web};
use futures_util::TryStreamExt;
use serde_json::json;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Upload size cap.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepted image extensions (lowercased).
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

fn image_extension(filename: &str) -> Option<&str> {
    let ext = filename.rsplit_once('.')?.1;
    IMAGE_EXTENSIONS
        .iter()
        .find(|allowed| allowed.eq_ignore_ascii_case(ext))
        .copied()
}

/// Store an image and return its public URL.
#[utoipa::path(
    post,
    path = "/api/v1/upload",
    responses(
        (status = 200, description = "Image stored"),
        (status = 400, description = "Missing, oversized, or non-image payload", body = crate::inbound::http::error::ApiError)
    ),
    tags = ["uploads"],
    operation_id = "uploadImage"
)]
#[post("/upload")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    mut payload: Multipart,
) -> ApiResult<HttpResponse> {
    session.require_resident()?;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|err| Error::invalid_request(format!("malformed multipart payload: {err}")))?
    {
        let Some(disposition) = field.content_disposition() else {
            continue;
        };
        if disposition.get_name() != Some("image") {
            continue;
        }
        let filename = disposition
            .get_filename()
            .map(str::to_owned)
            .ok_or_else(|| Error::invalid_request("image filename is required"))?;
        let extension = image_extension(&filename)
            .ok_or_else(|| {
                Error::invalid_request("images only (jpg, jpeg, png, gif, webp)")
            })?
            .to_lowercase();
        let is_image_mime = field
            .content_type()
            .is_some_and(|mime| mime.type_().as_str() == "image");
        if !is_image_mime {
            return Err(Error::invalid_request("images only (jpg, jpeg, png, gif, webp)").into());
        }

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(|err| {
            Error::invalid_request(format!("failed to read upload: {err}"))
        })? {
            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(Error::invalid_request("image exceeds the 5 MiB limit").into());
            }
            bytes.extend_from_slice(&chunk);
        }

        let store = state.uploads.clone();
        let image_url = web::block(move || store.save_image(&extension, &bytes))
            .await
            .map_err(|err| Error::internal(format!("upload task failed: {err}")))?
            .map_err(|err| Error::internal(format!("failed to store image: {err}")))?;

        return Ok(HttpResponse::Ok().json(json!({ "imageUrl": image_url })));
    }

    Err(Error::invalid_request("no file uploaded").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{memory_state, signup_resident};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

    fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(
        cookie: actix_web::cookie::Cookie<'static>,
        body: Vec<u8>,
    ) -> actix_http::Request {
        actix_test::TestRequest::post()
            .uri("/api/v1/upload")
            .cookie(cookie)
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_request()
    }

    #[rstest]
    #[actix_web::test]
    async fn stores_an_image_and_returns_its_url() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);
        let cookie = signup_resident(&app, "a-101", "asha@example.com").await;

        let body = multipart_body("image", "photo.png", "image/png", b"fake-png-bytes");
        let res = actix_test::call_service(&app, upload_request(cookie, body)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let value: Value = actix_test::read_body_json(res).await;
        let url = value["imageUrl"].as_str().expect("url");
        assert!(url.starts_with("/uploads/image-"));
        assert!(url.ends_with(".png"));
    }

    #[rstest]
    #[actix_web::test]
    async fn rejects_non_image_uploads() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);
        let cookie = signup_resident(&app, "a-101", "asha@example.com").await;

        let body = multipart_body("image", "notes.txt", "text/plain", b"hello");
        let res = actix_test::call_service(&app, upload_request(cookie, body)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn rejects_oversized_uploads() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);
        let cookie = signup_resident(&app, "a-101", "asha@example.com").await;

        let oversized = vec![0u8; MAX_IMAGE_BYTES + 1];
        let body = multipart_body("image", "big.png", "image/png", &oversized);
        let res = actix_test::call_service(&app, upload_request(cookie, body)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn rejects_missing_image_field() {
        let harness = memory_state();
        let app = crate::test_app!(harness.state);
        let cookie = signup_resident(&app, "a-101", "asha@example.com").await;

        let body = multipart_body("document", "photo.png", "image/png", b"bytes");
        let res = actix_test::call_service(&app, upload_request(cookie, body)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
