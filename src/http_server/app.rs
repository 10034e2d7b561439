use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use color_eyre::eyre::{Context, eyre};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{
    database::Database,
    http_server::{graphql, state::AppState},
};

async fn root() -> &'static str {
    "podcast-api is running"
}

pub struct HttpServerConfig {
    pub port: u16,
    pub database: Database,
    pub identity_header: String,
}

pub fn router(app_state: Arc<AppState>) -> Router {
    let schema = graphql::create_schema(app_state.clone());

    #[cfg(debug_assertions)]
    let cors_layer = CorsLayer::permissive();

    #[cfg(not(debug_assertions))]
    let cors_layer = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/", get(root))
        .route(
            "/graphql",
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(Extension(schema)),
        )
        .with_state(app_state)
}

pub async fn start(config: HttpServerConfig) -> color_eyre::Result<()> {
    let HttpServerConfig {
        port,
        database,
        identity_header,
    } = config;

    log::info!("Resolving callers from the '{}' header", identity_header);
    let app_state = Arc::new(AppState {
        db: Arc::new(database),
        identity_header,
    });

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", port))?;
    log::info!("Listening on http://0.0.0.0:{}/graphql", port);
    axum::serve(listener, app)
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use super::*;
    use crate::entities::user::UserRole;
    use crate::test_utils::{insert_user, test_db};

    fn app(db: Arc<Database>) -> Router {
        router(Arc::new(AppState {
            db,
            identity_header: "x-user-id".to_string(),
        }))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_is_alive() {
        let response = app(test_db().await)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_graphql_post_uses_identity_header() {
        let db = test_db().await;
        let user = insert_user(&db, "me@example.com", UserRole::Listener).await;
        let body = serde_json::json!({ "query": "{ me { email role } }" }).to_string();

        let response = app(db)
            .oneshot(
                Request::post("/graphql")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header("x-user-id", user.id.to_string())
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["me"]["email"], "me@example.com");
        assert_eq!(json["data"]["me"]["role"], "LISTENER");
    }

    #[tokio::test]
    async fn test_graphql_post_without_header_is_anonymous() {
        let body = serde_json::json!({ "query": "{ me { email } }" }).to_string();

        let response = app(test_db().await)
            .oneshot(
                Request::post("/graphql")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = body_json(response).await;
        assert!(json["data"]["me"].is_null());
    }
}
