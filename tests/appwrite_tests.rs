// Appwrite client tests against a mock server

use chrono::Weekday;
use mockito::{Matcher, Server};
use pantry_finder::services::{AppwriteClient, AppwriteError};
use serde_json::json;

const DOCUMENTS_PATH: &str = "/databases/test_db/collections/pantries/documents";

fn client_for(server: &Server) -> AppwriteClient {
    AppwriteClient::new(
        server.url(),
        "test_key".to_string(),
        "test_project".to_string(),
        "test_db".to_string(),
        "pantries".to_string(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_list_pantries_skips_malformed_documents() {
    let mut server = Server::new_async().await;

    let body = json!({
        "total": 3,
        "documents": [
            {
                "$id": "p1",
                "name": "Mission Pantry",
                "latitude": 37.7599,
                "longitude": -122.4148,
                "schedule": {"monday": {"open": "09:00", "close": "17:00"}},
                "categories": ["Produce", "Dairy"]
            },
            {
                "$id": "p2",
                "name": "Broken Pantry"
            },
            {
                "$id": "p3",
                "name": "Civic Pantry",
                "latitude": 37.7793,
                "longitude": -122.4193,
                "offersDelivery": true
            }
        ]
    });

    let mock = server
        .mock("GET", DOCUMENTS_PATH)
        .match_query(Matcher::Any)
        .match_header("x-appwrite-key", "test_key")
        .match_header("x-appwrite-project", "test_project")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let pantries = client_for(&server).list_pantries().await.unwrap();

    mock.assert_async().await;
    assert_eq!(pantries.len(), 2);
    assert_eq!(pantries[0].id, "p1");
    assert!(pantries[0].schedule.has_hours_on(Weekday::Mon));
    assert!(pantries[1].offers_delivery);
}

#[tokio::test]
async fn test_get_pantry_not_found() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", format!("{}/missing", DOCUMENTS_PATH).as_str())
        .with_status(404)
        .with_body(r#"{"message": "Document not found", "code": 404}"#)
        .create_async()
        .await;

    let pantry = client_for(&server).get_pantry("missing").await.unwrap();

    mock.assert_async().await;
    assert!(pantry.is_none());
}

#[tokio::test]
async fn test_get_pantry_found() {
    let mut server = Server::new_async().await;

    let body = json!({
        "$id": "p9",
        "name": "Sunset Pantry",
        "latitude": 37.7534,
        "longitude": -122.4944,
        "rating": 4.5
    });

    let _mock = server
        .mock("GET", format!("{}/p9", DOCUMENTS_PATH).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let pantry = client_for(&server).get_pantry("p9").await.unwrap().unwrap();

    assert_eq!(pantry.name, "Sunset Pantry");
    assert_eq!(pantry.rating, Some(4.5));
}

#[tokio::test]
async fn test_unauthorized() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", DOCUMENTS_PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;

    let result = client_for(&server).list_pantries().await;

    assert!(matches!(result, Err(AppwriteError::Unauthorized)));
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", DOCUMENTS_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let result = client_for(&server).list_pantries().await;

    assert!(matches!(result, Err(AppwriteError::ApiError(_))));
}
