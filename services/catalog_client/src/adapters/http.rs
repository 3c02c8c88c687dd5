//! services/catalog_client/src/adapters/http.rs
//!
//! The live implementation of the `ResourceClient` port. Every call is a single
//! request against the catalog backend; there is no caching and no retry.

use async_trait::async_trait;
use book_catalog_core::domain::{
    Book, BookRecommendation, NewBook, NewReadingList, NewReview, ReadingList,
    ReadingListUpdate, Review,
};
use book_catalog_core::ports::{Operation, PortError, PortResult, ResourceClient};
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapters::envelope::decode_enveloped;
use crate::session::SessionResolver;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// HTTP client for the catalog backend.
pub struct HttpResourceClient {
    client: Client,
    base_url: String,
    session: SessionResolver,
}

impl HttpResourceClient {
    /// Creates a new client against `base_url` (e.g. `https://api.example.com/prod`).
    pub fn new(
        base_url: impl Into<String>,
        session: SessionResolver,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url, session))
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        session: SessionResolver,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Public catalog reads go out bare; everything else carries the session headers.
    async fn headers_for(&self, operation: Operation) -> HeaderMap {
        if operation.requires_auth() {
            self.session.auth_headers().await
        } else {
            HeaderMap::new()
        }
    }

    /// Resolves headers, then sends. The header lookup always finishes first.
    async fn send(&self, operation: Operation, request: RequestBuilder) -> PortResult<Response> {
        let headers = self.headers_for(operation).await;
        request.headers(headers).send().await.map_err(|e| {
            warn!("{}: request did not complete: {}", operation, e);
            PortError::Transport {
                operation,
                detail: e.to_string(),
            }
        })
    }

    /// Turns any non-success status into the matching `PortError`.
    async fn ensure_success(operation: Operation, response: Response) -> PortResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!("{}: backend responded {}: {}", operation, status, body);
        Err(PortError::from_status(operation, status.as_u16(), body))
    }

    async fn read_bytes(operation: Operation, response: Response) -> PortResult<(u16, Vec<u8>)> {
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| PortError::Transport {
            operation,
            detail: e.to_string(),
        })?;
        Ok((status, bytes.to_vec()))
    }

    async fn read_json<T: DeserializeOwned>(
        operation: Operation,
        response: Response,
    ) -> PortResult<T> {
        let (status, bytes) = Self::read_bytes(operation, response).await?;
        serde_json::from_slice(&bytes).map_err(|e| PortError::ServerError {
            operation,
            status,
            detail: format!("unexpected response body: {}", e),
        })
    }

    fn require_id(operation: Operation, id: &str) -> PortResult<String> {
        let id = id.trim();
        if id.is_empty() {
            return Err(PortError::validation(operation, "id must not be empty"));
        }
        Ok(urlencoding::encode(id).into_owned())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        path: &str,
    ) -> PortResult<T> {
        debug!("GET {}", path);
        let response = self.send(operation, self.client.get(self.url(path))).await?;
        let response = Self::ensure_success(operation, response).await?;
        Self::read_json(operation, response).await
    }

    async fn send_json<B, T>(
        &self,
        operation: Operation,
        request: RequestBuilder,
        body: &B,
    ) -> PortResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(operation, request.json(body)).await?;
        let response = Self::ensure_success(operation, response).await?;
        Self::read_json(operation, response).await
    }

    async fn delete(&self, operation: Operation, path: &str) -> PortResult<()> {
        debug!("DELETE {}", path);
        let response = self.send(operation, self.client.delete(self.url(path))).await?;
        Self::ensure_success(operation, response).await?;
        Ok(())
    }
}

//=========================================================================================
// Wire Payloads
//=========================================================================================

#[derive(Serialize)]
struct RecommendationQuery<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct RecommendationsResponse {
    recommendations: Vec<BookRecommendation>,
}

//=========================================================================================
// `ResourceClient` Trait Implementation
//=========================================================================================

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn list_books(&self) -> PortResult<Vec<Book>> {
        let operation = Operation::ListBooks;
        debug!("GET /books");
        let response = self.send(operation, self.client.get(self.url("/books"))).await?;
        let response = Self::ensure_success(operation, response).await?;
        let (_, bytes) = Self::read_bytes(operation, response).await?;
        decode_enveloped(operation, &bytes)
    }

    async fn get_book(&self, id: &str) -> PortResult<Option<Book>> {
        let operation = Operation::GetBook;
        let path = format!("/books/{}", Self::require_id(operation, id)?);
        debug!("GET {}", path);
        let response = self.send(operation, self.client.get(self.url(&path))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("Book {} not found", id);
            return Ok(None);
        }
        let response = Self::ensure_success(operation, response).await?;
        Self::read_json(operation, response).await.map(Some)
    }

    async fn create_book(&self, book: NewBook) -> PortResult<Book> {
        let operation = Operation::CreateBook;
        if book.title.trim().is_empty() {
            return Err(PortError::validation(operation, "title must not be empty"));
        }
        debug!("POST /books");
        self.send_json(operation, self.client.post(self.url("/books")), &book)
            .await
    }

    async fn delete_book(&self, id: &str) -> PortResult<()> {
        let operation = Operation::DeleteBook;
        let path = format!("/books/{}", Self::require_id(operation, id)?);
        self.delete(operation, &path).await
    }

    async fn get_recommendations(&self, query: &str) -> PortResult<Vec<BookRecommendation>> {
        let operation = Operation::GetRecommendations;
        if query.trim().is_empty() {
            return Err(PortError::validation(operation, "query must not be empty"));
        }
        debug!("POST /recommendations");
        let response: RecommendationsResponse = self
            .send_json(
                operation,
                self.client.post(self.url("/recommendations")),
                &RecommendationQuery { query },
            )
            .await?;
        Ok(response.recommendations)
    }

    async fn list_reading_lists(&self) -> PortResult<Vec<ReadingList>> {
        self.get_json(Operation::ListReadingLists, "/reading-lists")
            .await
    }

    async fn create_reading_list(&self, list: NewReadingList) -> PortResult<ReadingList> {
        let operation = Operation::CreateReadingList;
        if list.name.trim().is_empty() {
            return Err(PortError::validation(operation, "name must not be empty"));
        }
        debug!("POST /reading-lists");
        self.send_json(operation, self.client.post(self.url("/reading-lists")), &list)
            .await
    }

    async fn update_reading_list(
        &self,
        id: &str,
        update: ReadingListUpdate,
    ) -> PortResult<ReadingList> {
        let operation = Operation::UpdateReadingList;
        let path = format!("/reading-lists/{}", Self::require_id(operation, id)?);
        debug!("PUT {}", path);
        self.send_json(operation, self.client.put(self.url(&path)), &update)
            .await
    }

    async fn delete_reading_list(&self, id: &str) -> PortResult<()> {
        let operation = Operation::DeleteReadingList;
        let path = format!("/reading-lists/{}", Self::require_id(operation, id)?);
        self.delete(operation, &path).await
    }

    async fn list_reviews(&self, book_id: &str) -> PortResult<Vec<Review>> {
        let operation = Operation::ListReviews;
        let path = format!("/books/{}/reviews", Self::require_id(operation, book_id)?);
        self.get_json(operation, &path).await
    }

    async fn create_review(&self, book_id: &str, review: NewReview) -> PortResult<Review> {
        let operation = Operation::CreateReview;
        let path = format!("/books/{}/reviews", Self::require_id(operation, book_id)?);
        if !review.has_valid_rating() {
            return Err(PortError::validation(
                operation,
                format!(
                    "rating must be between {} and {}",
                    NewReview::MIN_RATING,
                    NewReview::MAX_RATING
                ),
            ));
        }
        debug!("POST {}", path);
        self.send_json(operation, self.client.post(self.url(&path)), &review)
            .await
    }
}
