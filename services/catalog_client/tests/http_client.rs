//! Drives `HttpResourceClient` against a local mock backend.

use std::sync::Arc;

use book_catalog_core::domain::{NewBook, NewReadingList, NewReview, ReadingListUpdate};
use book_catalog_core::ports::{Operation, PortError, ResourceClient};
use catalog_client::adapters::{HttpResourceClient, MockIdentityProvider};
use catalog_client::SessionResolver;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn anonymous_client(server: &MockServer) -> HttpResourceClient {
    let identity = Arc::new(MockIdentityProvider::new());
    HttpResourceClient::new(server.uri(), SessionResolver::new(identity)).unwrap()
}

/// Returns a client whose identity provider holds an active session, plus its token.
async fn signed_in_client(server: &MockServer) -> (HttpResourceClient, String) {
    let identity = Arc::new(
        MockIdentityProvider::new()
            .with_account("a@b.com", "pw", "Ada")
            .signed_in_as("a@b.com"),
    );
    let token = identity.active_token().await.unwrap();
    let client = HttpResourceClient::new(server.uri(), SessionResolver::new(identity)).unwrap();
    (client, token)
}

fn reading_list_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "userId": "u-1",
        "name": name,
        "description": "",
        "bookIds": ["1"],
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-02T00:00:00Z"
    })
}

//=========================================================================================
// Books
//=========================================================================================

#[tokio::test]
async fn test_list_books_decodes_envelope_twice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": "[{\"id\":\"1\",\"title\":\"Dune\",\"author\":\"Frank Herbert\"}]"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let books = anonymous_client(&server).list_books().await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, "1");
    assert_eq!(books[0].title, "Dune");
}

#[tokio::test]
async fn test_list_books_is_sent_without_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "body": "[]" })))
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server).await;
    assert!(client.list_books().await.unwrap().is_empty());

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_list_books_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = anonymous_client(&server).list_books().await.unwrap_err();
    assert_eq!(
        err,
        PortError::ServerError {
            operation: Operation::ListBooks,
            status: 500,
            detail: "boom".to_string(),
        }
    );
    assert!(err.to_string().starts_with("Failed to fetch books"));
}

#[tokio::test]
async fn test_get_book_not_found_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/404id"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let book = anonymous_client(&server).get_book("404id").await.unwrap();
    assert_eq!(book, None);
}

#[tokio::test]
async fn test_get_book_other_failures_are_errors_not_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/books/secret"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = anonymous_client(&server);
    assert!(matches!(
        client.get_book("broken").await,
        Err(PortError::ServerError { status: 503, .. })
    ));
    assert!(matches!(
        client.get_book("secret").await,
        Err(PortError::Unauthorized { status: 403, .. })
    ));
}

#[tokio::test]
async fn test_get_book_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "1", "title": "Dune" })),
        )
        .mount(&server)
        .await;

    let book = anonymous_client(&server).get_book("1").await.unwrap().unwrap();
    assert_eq!(book.title, "Dune");
}

#[tokio::test]
async fn test_create_book_carries_bearer_token() {
    let server = MockServer::start().await;
    let (client, token) = signed_in_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/books"))
        .and(header("authorization", format!("Bearer {}", token)))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "title": "Neuromancer",
            "author": "William Gibson",
            "genre": "Cyberpunk",
            "description": ""
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "42",
            "title": "Neuromancer",
            "author": "William Gibson",
            "genre": "Cyberpunk"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let book = client
        .create_book(NewBook {
            title: "Neuromancer".to_string(),
            author: "William Gibson".to_string(),
            genre: "Cyberpunk".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(book.id, "42");
}

#[tokio::test]
async fn test_create_book_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = anonymous_client(&server)
        .create_book(NewBook {
            title: "Neuromancer".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PortError::Unauthorized {
            operation: Operation::CreateBook,
            status: 401,
        }
    );
}

#[tokio::test]
async fn test_delete_book_twice() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/books/7"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/books/7"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server).await;
    client.delete_book("7").await.unwrap();
    assert_eq!(
        client.delete_book("7").await,
        Err(PortError::NotFound {
            operation: Operation::DeleteBook
        })
    );
}

#[tokio::test]
async fn test_empty_id_is_rejected_before_sending() {
    let server = MockServer::start().await;
    let client = anonymous_client(&server);

    assert!(matches!(
        client.delete_book("  ").await,
        Err(PortError::Validation { operation: Operation::DeleteBook, .. })
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    let identity = Arc::new(MockIdentityProvider::new());
    let client =
        HttpResourceClient::new("http://127.0.0.1:1", SessionResolver::new(identity)).unwrap();

    assert!(matches!(
        client.list_books().await,
        Err(PortError::Transport { operation: Operation::ListBooks, .. })
    ));
}

//=========================================================================================
// Recommendations
//=========================================================================================

#[tokio::test]
async fn test_recommendations_unwrap_field() {
    let server = MockServer::start().await;
    let (client, token) = signed_in_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/recommendations"))
        .and(header("authorization", format!("Bearer {}", token)))
        .and(body_json(json!({ "query": "sci-fi" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recommendations": [
                { "title": "Dune", "author": "Frank Herbert", "reason": "Classic space opera" }
            ]
        })))
        .mount(&server)
        .await;

    let recs = client.get_recommendations("sci-fi").await.unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].title, "Dune");
    assert_eq!(recs[0].reason, "Classic space opera");
}

#[tokio::test]
async fn test_recommendations_keep_every_item_as_sent() {
    let server = MockServer::start().await;
    let items = json!([
        { "title": "Dune", "author": "Frank Herbert", "reason": "Sand", "matchScore": 0.8 },
        { "author": "Ann Leckie", "reason": "Ships" }
    ]);
    Mock::given(method("POST"))
        .and(path("/recommendations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "recommendations": items.clone() })),
        )
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server).await;
    let recs = client.get_recommendations("space").await.unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].extra["matchScore"], 0.8);
    assert_eq!(recs[1].title, "");
    assert_eq!(recs[1].author, "Ann Leckie");
}

//=========================================================================================
// Reading Lists
//=========================================================================================

#[tokio::test]
async fn test_create_reading_list_without_session_still_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reading-lists"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reading_list_json("rl-1", "Summer")),
        )
        .mount(&server)
        .await;

    let list = anonymous_client(&server)
        .create_reading_list(NewReadingList {
            user_id: "u-1".to_string(),
            name: "Summer".to_string(),
            description: String::new(),
            book_ids: vec!["1".to_string()],
        })
        .await
        .unwrap();
    assert_eq!(list.id, "rl-1");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert_eq!(
        requests[0].headers.get("content-type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_create_reading_list_with_session_carries_bearer() {
    let server = MockServer::start().await;
    let (client, token) = signed_in_client(&server).await;
    Mock::given(method("POST"))
        .and(path("/reading-lists"))
        .and(header("authorization", format!("Bearer {}", token)))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(reading_list_json("rl-9", "Autumn")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let list = client
        .create_reading_list(NewReadingList {
            name: "Autumn".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(list.id, "rl-9");
}

#[tokio::test]
async fn test_list_reading_lists_with_session() {
    let server = MockServer::start().await;
    let (client, token) = signed_in_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/reading-lists"))
        .and(header("authorization", format!("Bearer {}", token)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            reading_list_json("rl-1", "Summer"),
            reading_list_json("rl-2", "Winter")
        ])))
        .mount(&server)
        .await;

    let lists = client.list_reading_lists().await.unwrap();
    assert_eq!(lists.len(), 2);
    assert_eq!(lists[1].name, "Winter");
}

#[tokio::test]
async fn test_update_reading_list_sends_only_present_fields() {
    let server = MockServer::start().await;
    let (client, token) = signed_in_client(&server).await;
    Mock::given(method("PUT"))
        .and(path("/reading-lists/rl-1"))
        .and(header("authorization", format!("Bearer {}", token)))
        .and(body_json(json!({ "name": "Renamed" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reading_list_json("rl-1", "Renamed")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let list = client
        .update_reading_list(
            "rl-1",
            ReadingListUpdate {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(list.name, "Renamed");
}

#[tokio::test]
async fn test_delete_reading_list_with_session() {
    let server = MockServer::start().await;
    let (client, token) = signed_in_client(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/reading-lists/rl-1"))
        .and(header("authorization", format!("Bearer {}", token)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_reading_list("rl-1").await.unwrap();
}

#[tokio::test]
async fn test_delete_reading_list_failure() {
    let server = MockServer::start().await;
    let (client, token) = signed_in_client(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/reading-lists/rl-1"))
        .and(header("authorization", format!("Bearer {}", token)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.delete_reading_list("rl-1").await.unwrap_err();
    assert!(matches!(err, PortError::ServerError { status: 500, .. }));
    assert_eq!(err.operation(), Operation::DeleteReadingList);
    assert!(err.to_string().starts_with("Failed to delete reading list"));
}

//=========================================================================================
// Reviews
//=========================================================================================

#[tokio::test]
async fn test_reviews_round_trip() {
    let server = MockServer::start().await;
    let (client, token) = signed_in_client(&server).await;
    let review = json!({
        "id": "r-1",
        "bookId": "1",
        "userId": "u-1",
        "rating": 4,
        "comment": "Dense but rewarding",
        "createdAt": "2024-03-01T12:00:00Z"
    });
    Mock::given(method("GET"))
        .and(path("/books/1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([review.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/books/1/reviews"))
        .and(header("authorization", format!("Bearer {}", token)))
        .and(body_json(json!({ "rating": 4, "comment": "Dense but rewarding" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(review))
        .mount(&server)
        .await;

    let created = client
        .create_review(
            "1",
            NewReview {
                rating: 4,
                comment: "Dense but rewarding".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.book_id, "1");

    let reviews = client.list_reviews("1").await.unwrap();
    assert_eq!(reviews, vec![created]);
}

#[tokio::test]
async fn test_review_validation_error_from_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/books/1/reviews"))
        .respond_with(ResponseTemplate::new(422).set_body_string("comment too long"))
        .mount(&server)
        .await;

    let (client, _) = signed_in_client(&server).await;
    let err = client
        .create_review(
            "1",
            NewReview {
                rating: 3,
                comment: "x".repeat(10),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PortError::Validation {
            operation: Operation::CreateReview,
            detail: "comment too long".to_string(),
        }
    );
}
