use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    error::AppResult,
    filter::{self, FilterParams},
    insights, templates,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(visualizations))
        .route("/filter", get(filter_movies))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn visualizations(State(state): State<Arc<AppState>>) -> Html<String> {
    let sections = insights::dashboard(state.db.as_ref(), state.config.top_movies_limit).await;
    Html(templates::visualizations_page(&sections))
}

pub async fn filter_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> AppResult<Html<String>> {
    let outcome = filter::run(state.db.as_ref(), &params).await?;
    Ok(Html(templates::filter_page(&params, &outcome)))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, db::testing};

    fn state(db: Option<sea_orm::DatabaseConnection>) -> Arc<AppState> {
        let config = Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: "sqlite::memory:".to_string(),
            top_movies_limit: 10,
            migrate_on_start: false,
        };
        Arc::new(AppState { config: Arc::new(config), db })
    }

    async fn get_page(state: Arc<AppState>, uri: &str) -> (StatusCode, String) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn visualizations_page_lists_every_section() {
        let (status, body) = get_page(state(Some(testing::catalogue().await)), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Genre Distribution"));
        assert!(body.contains("Correlation Analysis"));
        assert!(body.contains("Lost Map"));
        assert!(body.contains("<svg"));
        assert!(!body.contains("Error -&gt;"));
    }

    #[tokio::test]
    async fn broken_sections_become_inline_warnings() {
        let (status, body) = get_page(state(Some(testing::empty().await)), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.matches("Error -&gt;").count(), 10);
        assert!(body.contains("no such table"));
    }

    #[tokio::test]
    async fn filter_shows_count_and_rows() {
        let db = testing::catalogue().await;
        let (status, body) = get_page(
            state(Some(db)),
            "/filter?genre=Action&min_rating=7.0&duration=2-3h&votes=1001-10000",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("count - 1"), "{body}");
        assert!(body.contains("Heat Wave"));
        assert!(body.contains("2.10 (2h 10m)"));
        assert!(!body.contains("Edge Case"));
    }

    #[tokio::test]
    async fn filter_without_matches_says_so() {
        let db = testing::catalogue().await;
        let (_, body) = get_page(
            state(Some(db)),
            "/filter?genre=Comedy&min_rating=9.0&duration=2-3h&votes=over-10000",
        )
        .await;
        assert!(body.contains("No Result Found"));
    }

    #[tokio::test]
    async fn incomplete_filter_shows_only_the_form() {
        let db = testing::catalogue().await;
        let (status, body) =
            get_page(state(Some(db)), "/filter?genre=Action&min_rating=7.0&duration=&votes=").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Select Filters"));
        assert!(!body.contains("count -"));
        assert!(!body.contains("No Result Found"));
        assert!(!body.contains("role=\"alert\""));
    }

    #[tokio::test]
    async fn filter_form_keeps_the_current_selection() {
        let db = testing::catalogue().await;
        let (_, body) =
            get_page(state(Some(db)), "/filter?genre=Crime&min_rating=6.5&votes=over-10000").await;

        assert!(body.contains(r#"value="Crime" checked"#), "{body}");
        assert!(body.contains(r#"value="over-10000" selected"#));
        assert!(body.contains(r#"value="6.5""#));
    }

    #[tokio::test]
    async fn invalid_filter_values_render_an_error_page() {
        let db = testing::catalogue().await;
        let (_, body) = get_page(
            state(Some(db)),
            "/filter?genre=Western&min_rating=7.0&duration=2-3h&votes=upto-1000",
        )
        .await;
        assert!(body.contains("unknown genre"));
    }

    #[tokio::test]
    async fn disconnected_filter_is_disabled() {
        let (status, body) = get_page(
            state(None),
            "/filter?genre=Action&min_rating=7.0&duration=2-3h&votes=1001-10000",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Database connection is stopped"));
        assert!(!body.contains("Select Filters"));
    }
}
