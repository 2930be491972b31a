//! Ingest endpoint tests

#[cfg(feature = "ssr")]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use openfield_collect::backend::create_app;
    use openfield_collect::backend::ingest::db;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    async fn server() -> (TestServer, SqlitePool) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::init_schema(&pool).await.unwrap();
        let server = TestServer::new(create_app(pool.clone())).unwrap();
        (server, pool)
    }

    fn offline_submission(client_uuid: &str) -> Value {
        json!({
            "submission": {
                "client_uuid": client_uuid,
                "client_created_at": "2026-01-05T10:00:00.000Z",
                "sync_source": "offline_queue",
                "enumerator_name": "A",
                "services": ["anc", "pnc"]
            }
        })
    }

    #[tokio::test]
    async fn test_submission_stored() {
        let (server, pool) = server().await;

        let response = server
            .post("/api/sync/submissions")
            .json(&offline_submission("0c6f7f64-4c1e-4b43-8f0e-7d2f1f6d7a10"))
            .await;
        response.assert_status_ok();
        let ack: Value = response.json();
        assert_eq!(ack["ok"], json!(true));
        assert!(ack.get("duplicate").is_none());

        let stored = db::find_by_client_uuid(&pool, "0c6f7f64-4c1e-4b43-8f0e-7d2f1f6d7a10")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.sync_source.as_deref(), Some("offline_queue"));
        let payload: Value = serde_json::from_str(&stored.payload).unwrap();
        assert_eq!(payload["services"], json!(["anc", "pnc"]));
    }

    #[tokio::test]
    async fn test_repeated_client_uuid_acknowledged_once() {
        let (server, pool) = server().await;
        let body = offline_submission("5d1c2a8e-5b7a-4a39-9a3e-2f0b4c6d8e11");

        let first: Value = server.post("/api/sync/submissions").json(&body).await.json();
        let second: Value = server.post("/api/sync/submissions").json(&body).await.json();

        assert_eq!(second["ok"], json!(true));
        assert_eq!(second["duplicate"], json!(true));
        assert_eq!(second["submission_id"], first["submission_id"]);
        assert_eq!(db::count_submissions(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_client_uuid_rejected() {
        let (server, pool) = server().await;

        let response = server
            .post("/api/sync/submissions")
            .json(&json!({ "submission": { "enumerator_name": "A" } }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let ack: Value = response.json();
        assert_eq!(ack["ok"], json!(false));
        assert_eq!(ack["error"], json!("Missing client_uuid"));
        assert_eq!(db::count_submissions(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let (server, _pool) = server().await;

        let response = server.post("/api/sync/submissions").text("not json").await;
        assert!(response.status_code().is_client_error());
        let ack: Value = response.json();
        assert_eq!(ack["ok"], json!(false));
    }

    #[tokio::test]
    async fn test_health() {
        let (server, _pool) = server().await;
        let response = server.get("/api/health").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "ok": true }));
    }
}
