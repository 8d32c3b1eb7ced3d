/// Shared handler state.
pub mod app;

/// Request handlers.
pub mod handler;

/// Response shapes for each record.
pub mod views;

use axum::routing::{get, post};
use axum::Router;
use log::*;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::database::Database;
use crate::interface::{
    app::{App, AppState},
    handler::{
        create_appearance_handler, delete_episode_handler, get_episode_handler,
        list_episodes_handler, list_guests_handler,
    },
};

/// Build the router for every endpoint.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/episodes", get(list_episodes_handler))
        .route(
            "/episodes/:id",
            get(get_episode_handler).delete(delete_episode_handler),
        )
        .route("/guests", get(list_guests_handler))
        .route("/appearances", post(create_appearance_handler))
        .with_state(state)
}

/// Open the database and serve until ctrl-c.
pub async fn run(config: &Config) -> eyre::Result<()> {
    let db = Database::open(&config.database_url)?;
    let app = routes(App::new(db));

    let listener = TcpListener::bind(config.socket_addr()).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    let res = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Err(e) = &res {
        error!("Server quit unexpectedly: {e:?}");
    }
    info!("Server stopped");
    Ok(res?)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for ctrl-c: {}", err);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_db;
    use crate::models::{NewEpisode, NewGuest};
    use crate::store::db;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn seeded() -> (tempfile::NamedTempFile, Database) {
        let (file, database) = test_db();
        {
            let mut ctx = database.connection().unwrap();
            db::create_episode(
                &mut ctx,
                &NewEpisode {
                    date: "1/11/99",
                    number: 1,
                },
            )
            .unwrap();
            db::create_episode(
                &mut ctx,
                &NewEpisode {
                    date: "1/12/99",
                    number: 2,
                },
            )
            .unwrap();
            db::create_guest(
                &mut ctx,
                &NewGuest {
                    name: "Michael J. Fox",
                    occupation: "actor",
                },
            )
            .unwrap();
        }
        (file, database)
    }

    async fn send(database: &Database, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = routes(App::new(database.clone()))
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn lists_episodes_and_guests() {
        let (_file, database) = seeded();

        let (status, body) = send(&database, Method::GET, "/episodes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"id": 1, "date": "1/11/99", "number": 1},
                {"id": 2, "date": "1/12/99", "number": 2},
            ])
        );

        let (status, body) = send(&database, Method::GET, "/guests", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"id": 1, "name": "Michael J. Fox", "occupation": "actor"}])
        );
    }

    #[tokio::test]
    async fn creates_appearance() {
        let (_file, database) = seeded();

        let (status, body) = send(
            &database,
            Method::POST,
            "/appearances",
            Some(json!({"rating": 4, "episode_id": 1, "guest_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["rating"], json!(4));
        assert_eq!(body["episode_id"], json!(1));
        assert_eq!(body["guest_id"], json!(1));
        assert_eq!(body["episode"]["date"], json!("1/11/99"));
        assert_eq!(body["guest"]["name"], json!("Michael J. Fox"));

        let (status, body) = send(&database, Method::GET, "/episodes/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["appearances"].as_array().unwrap().len(), 1);
        assert_eq!(body["appearances"][0]["guest"]["occupation"], json!("actor"));
    }

    #[tokio::test]
    async fn rejects_out_of_range_rating() {
        let (_file, database) = seeded();

        let (status, body) = send(
            &database,
            Method::POST,
            "/appearances",
            Some(json!({"rating": 6, "episode_id": 1, "guest_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"errors": ["Rating must be between 1 and 5"]}));

        let (_, body) = send(&database, Method::GET, "/episodes/1", None).await;
        assert_eq!(body["appearances"], json!([]));
    }

    #[tokio::test]
    async fn rejects_missing_fields_and_unknown_records() {
        let (_file, database) = seeded();

        let (status, body) = send(
            &database,
            Method::POST,
            "/appearances",
            Some(json!({"rating": 3, "episode_id": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"errors": ["Missing required fields"]}));

        let (status, body) = send(
            &database,
            Method::POST,
            "/appearances",
            Some(json!({"rating": 3, "episode_id": 1, "guest_id": 9})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"errors": ["Episode or Guest not found"]}));
    }

    #[tokio::test]
    async fn missing_episode_is_404() {
        let (_file, database) = seeded();

        for method in [Method::GET, Method::DELETE] {
            let (status, body) = send(&database, method, "/episodes/99", None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body, json!({"error": "Episode not found"}));
        }
    }

    #[tokio::test]
    async fn unparseable_episode_ids_are_404() {
        let (_file, database) = seeded();

        for uri in ["/episodes/99999999999", "/episodes/abc"] {
            for method in [Method::GET, Method::DELETE] {
                let (status, body) = send(&database, method, uri, None).await;
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, json!({"error": "Episode not found"}));
            }
        }
    }

    #[tokio::test]
    async fn wide_integers_follow_the_usual_errors() {
        let (_file, database) = seeded();

        let cases = [
            (
                json!({"rating": 99999999999i64, "episode_id": 1, "guest_id": 1}),
                "Rating must be between 1 and 5",
            ),
            (
                json!({"rating": 4, "episode_id": 99999999999i64, "guest_id": 1}),
                "Episode or Guest not found",
            ),
            (
                json!({"rating": "x", "episode_id": 999, "guest_id": 1}),
                "Episode or Guest not found",
            ),
        ];
        for (request, message) in cases {
            let (status, body) =
                send(&database, Method::POST, "/appearances", Some(request)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, json!({ "errors": [message] }));
        }
    }

    #[tokio::test]
    async fn deletes_episode_with_appearances() {
        let (_file, database) = seeded();
        for rating in [2, 5] {
            let (status, _) = send(
                &database,
                Method::POST,
                "/appearances",
                Some(json!({"rating": rating, "episode_id": 1, "guest_id": 1})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&database, Method::DELETE, "/episodes/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Episode deleted successfully"}));

        let (status, _) = send(&database, Method::GET, "/episodes/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let mut ctx = database.connection().unwrap();
        assert_eq!(db::count_appearances(&mut ctx).unwrap(), 0);
    }
}
