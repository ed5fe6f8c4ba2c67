pub mod closet;
pub mod outfit;

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::metadata::tests::RecordingAssets;
    use crate::metadata::MetadataStore;
    use crate::services::stylist::tests::ScriptedClient;
    use crate::{create_router, AppState};

    const BOUNDARY: &str = "wardrobe-test-boundary";

    struct TestApp {
        router: Router,
        assets: Arc<RecordingAssets>,
        completion: Arc<ScriptedClient>,
        _dir: tempfile::TempDir,
    }

    fn test_app(reply: &str) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let assets = Arc::new(RecordingAssets::default());
        let completion = Arc::new(ScriptedClient::replying(reply));

        let state = AppState {
            config: Arc::new(Config::default()),
            metadata: Arc::new(MetadataStore::new(dir.path().join("metadata.csv"))),
            assets: assets.clone(),
            completion: completion.clone(),
        };

        TestApp {
            router: create_router(state),
            assets,
            completion,
            _dir: dir,
        }
    }

    fn multipart_body(file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some((name, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                     Content-Type: image/png\r\n\r\n",
                    BOUNDARY, name
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
        send(router, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn upload(router: &Router, file: Option<(&str, &[u8])>, tags: [&str; 3]) -> (StatusCode, Value) {
        let body = multipart_body(
            file,
            &[("category", tags[0]), ("color", tags[1]), ("season", tags[2])],
        );
        let request = Request::post("/api/v1/items")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        send(router, request).await
    }

    async fn suggest(router: &Router, occasion: &str) -> (StatusCode, Value) {
        let request = Request::post("/api/v1/outfits/suggest")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::json!({ "occasion": occasion }).to_string()))
            .unwrap();
        send(router, request).await
    }

    async fn delete(router: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        send(router, request).await
    }

    #[tokio::test]
    async fn test_options_lists_presets() {
        let app = test_app("[]");
        let (status, json) = get(&app.router, "/api/v1/options").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["categories"][0], "Hats");
        assert_eq!(json["data"]["seasons"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_upload_then_browse() {
        let app = test_app("[]");

        let (status, json) = upload(
            &app.router,
            Some(("shirt.png", &b"fake-png"[..])),
            ["Shirts", "Blue", "Summer"],
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", json);
        assert_eq!(json["data"]["position"], 0);
        assert_eq!(json["data"]["asset_id"], "wardrobe/shirt");

        upload(&app.router, Some(("jeans.jpg", &b"fake-jpg"[..])), ["Pants", "Black", "All"]).await;

        let (status, json) = get(&app.router, "/api/v1/closet?colors=Black").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["total"], 2);
        assert_eq!(json["data"]["shown"], 1);
        assert_eq!(json["data"]["items"][0]["position"], 1);
        assert_eq!(json["data"]["label"], "1 item in your wardrobe");
        assert_eq!(json["data"]["facets"]["colors"], serde_json::json!(["Blue", "Black"]));
    }

    #[tokio::test]
    async fn test_upload_requires_image() {
        let app = test_app("[]");
        let (status, json) = upload(&app.router, None, ["Shirts", "Blue", "Summer"]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Please upload an image first.");
        assert!(app.assets.uploaded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let app = test_app("[]");
        upload(&app.router, Some(("a.png", &b"a"[..])), ["Shirts", "Blue", "Summer"]).await;

        let (status, _) = delete(&app.router, "/api/v1/items/0?asset_id=wardrobe/other").await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, json) = delete(&app.router, "/api/v1/items/7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Nothing to delete at that position");

        let (status, json) = delete(&app.router, "/api/v1/items/0?asset_id=wardrobe/a").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Item deleted");
        assert_eq!(*app.assets.deleted.lock().unwrap(), vec!["wardrobe/a".to_string()]);

        let (_, json) = get(&app.router, "/api/v1/closet").await;
        assert_eq!(json["data"]["total"], 0);
    }

    #[tokio::test]
    async fn test_suggest_validation_and_empty_closet() {
        let app = test_app("[]");

        let (status, _) = suggest(&app.router, "  ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = suggest(&app.router, "formal dinner").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["closet_empty"], true);
        assert!(app.completion.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_suggest_unparseable_returns_raw_text() {
        let app = test_app("Sorry, I can't help with that.");
        upload(&app.router, Some(("a.png", &b"a"[..])), ["Shirts", "Blue", "Summer"]).await;

        let (status, json) = suggest(&app.router, "formal dinner").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["data"]["raw"], "Sorry, I can't help with that.");
    }

    #[tokio::test]
    async fn test_suggest_returns_outfits() {
        let app = test_app("```json\n[[\"https://x/wardrobe/a.png\"]]\n```");
        upload(&app.router, Some(("a.png", &b"a"[..])), ["Shirts", "Blue", "Summer"]).await;

        let (status, json) = suggest(&app.router, "casual brunch").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["count"], 1);
        assert_eq!(json["data"]["heading"], "1 Outfit Suggested");
        assert_eq!(json["data"]["outfits"][0]["pieces"][0], "https://x/wardrobe/a.png");
    }
}
