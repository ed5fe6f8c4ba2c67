//! Cloudinary REST client

use bytes::Bytes;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::signer::Signer;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, thiserror::Error)]
pub enum CloudinaryError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("[{status}] {message}")]
    Api { status: u16, message: String },
}

/// Subset of the upload response the catalog needs
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub public_id: String,
    pub secure_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestroyResponse {
    pub result: String,
}

impl DestroyResponse {
    pub fn is_ok(&self) -> bool {
        self.result == "ok"
    }

    pub fn is_not_found(&self) -> bool {
        self.result == "not found"
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Cloudinary client
#[derive(Debug, Clone)]
pub struct Client {
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Point the client at a different API host
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Endpoint for an image action, e.g. `upload` or `destroy`
    pub fn get_image_url(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.api_base, self.cloud_name, action)
    }

    fn timestamp() -> String {
        Utc::now().timestamp().to_string()
    }

    /// Upload image bytes under `folder/public_id`, replacing any existing asset
    pub async fn upload_image(
        &self,
        data: Bytes,
        file_name: &str,
        public_id: &str,
        folder: &str,
    ) -> Result<UploadResponse, CloudinaryError> {
        let signer = Signer::new()
            .param("folder", folder)
            .param("overwrite", "true")
            .param("public_id", public_id)
            .param("timestamp", Self::timestamp());
        let signature = signer.get_signature(&self.api_secret);

        let mime_type = mime_guess::from_path(file_name).first_or_octet_stream();
        let file_part = Part::bytes(data.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime_type.as_ref())?;

        let mut form = Form::new().part("file", file_part);
        for (k, v) in signer.params() {
            form = form.text(k.clone(), v.clone());
        }
        form = form
            .text("api_key", self.api_key.clone())
            .text("signature", signature);

        let resp = self
            .http
            .post(self.get_image_url("upload"))
            .multipart(form)
            .send()
            .await?;

        Self::decode(resp).await
    }

    /// Delete an image by public id
    pub async fn destroy_image(&self, public_id: &str) -> Result<DestroyResponse, CloudinaryError> {
        let signer = Signer::new()
            .param("public_id", public_id)
            .param("timestamp", Self::timestamp());
        let signature = signer.get_signature(&self.api_secret);

        let mut form: Vec<(String, String)> = signer
            .params()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        form.push(("api_key".to_string(), self.api_key.clone()));
        form.push(("signature".to_string(), signature));

        let resp = self
            .http
            .post(self.get_image_url("destroy"))
            .form(&form)
            .send()
            .await?;

        Self::decode(resp).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, CloudinaryError> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return Err(CloudinaryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| CloudinaryError::Api {
            status: status.as_u16(),
            message: format!("unexpected response body: {}", e),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    /// Serve `router` on an ephemeral port and return its base URL
    pub(crate) async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    pub(crate) fn replying(action: &str, status: StatusCode, body: serde_json::Value) -> Router {
        Router::new().route(
            &format!("/demo/image/{}", action),
            post(move |_body: axum::body::Bytes| async move { (status, Json(body)) }),
        )
    }

    #[test]
    fn test_image_urls() {
        let client = Client::new("demo", "key", "secret");
        assert_eq!(
            client.get_image_url("upload"),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );

        let client = client.with_api_base("http://127.0.0.1:9000/");
        assert_eq!(client.get_image_url("destroy"), "http://127.0.0.1:9000/demo/image/destroy");
    }

    #[tokio::test]
    async fn test_upload_success() {
        let router = replying(
            "upload",
            StatusCode::OK,
            json!({"public_id": "wardrobe/hat", "secure_url": "https://res.example/wardrobe/hat.png"}),
        );
        let client = Client::new("demo", "key", "secret").with_api_base(serve(router).await);

        let res = client
            .upload_image(Bytes::from_static(b"img"), "hat.png", "hat", "wardrobe")
            .await
            .unwrap();
        assert_eq!(res.public_id, "wardrobe/hat");
        assert_eq!(res.secure_url, "https://res.example/wardrobe/hat.png");
    }

    #[tokio::test]
    async fn test_error_body_is_decoded() {
        let router = replying(
            "upload",
            StatusCode::UNAUTHORIZED,
            json!({"error": {"message": "Invalid Signature"}}),
        );
        let client = Client::new("demo", "key", "secret").with_api_base(serve(router).await);

        let err = client
            .upload_image(Bytes::from_static(b"img"), "hat.png", "hat", "wardrobe")
            .await
            .unwrap_err();
        match err {
            CloudinaryError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid Signature");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_destroy_result() {
        let ok: DestroyResponse = serde_json::from_str(r#"{"result":"ok"}"#).unwrap();
        assert!(ok.is_ok());
        let missing: DestroyResponse = serde_json::from_str(r#"{"result":"not found"}"#).unwrap();
        assert!(missing.is_not_found());
    }
}
