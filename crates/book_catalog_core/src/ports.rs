//! crates/book_catalog_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client is built around.
//! These traits are the boundary between the auth/resource logic and the concrete
//! identity provider and catalog backend, so a live and a mock implementation can be
//! swapped at composition time.

use async_trait::async_trait;
use std::fmt;

use crate::domain::{
    Book, BookRecommendation, NewBook, NewReadingList, NewReview, ReadingList,
    ReadingListUpdate, Review,
};

//=========================================================================================
// Resource Operations
//=========================================================================================

/// Names every operation the resource client can perform.
///
/// The `Display` form is the user-facing failure message for that operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListBooks,
    GetBook,
    CreateBook,
    DeleteBook,
    GetRecommendations,
    ListReadingLists,
    CreateReadingList,
    UpdateReadingList,
    DeleteReadingList,
    ListReviews,
    CreateReview,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::ListBooks => "Failed to fetch books",
            Operation::GetBook => "Failed to fetch book",
            Operation::CreateBook => "Failed to create book",
            Operation::DeleteBook => "Failed to delete book",
            Operation::GetRecommendations => "Failed to get recommendations",
            Operation::ListReadingLists => "Failed to fetch reading lists",
            Operation::CreateReadingList => "Failed to create reading list",
            Operation::UpdateReadingList => "Failed to update reading list",
            Operation::DeleteReadingList => "Failed to delete reading list",
            Operation::ListReviews => "Failed to fetch reviews",
            Operation::CreateReview => "Failed to create review",
        }
    }

    /// Whether the operation must carry the session's authorization header.
    pub fn requires_auth(self) -> bool {
        !matches!(
            self,
            Operation::ListBooks | Operation::GetBook | Operation::ListReviews
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.failure_message())
    }
}

//=========================================================================================
// Port Error and Result Types
//=========================================================================================

/// The closed set of failures a resource operation can produce.
/// Every variant names the operation that failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("{operation}: not found")]
    NotFound { operation: Operation },

    #[error("{operation}: unauthorized (status {status})")]
    Unauthorized { operation: Operation, status: u16 },

    /// The request never completed.
    #[error("{operation}: {detail}")]
    Transport { operation: Operation, detail: String },

    #[error("{operation}: server responded with status {status}")]
    ServerError {
        operation: Operation,
        status: u16,
        detail: String,
    },

    #[error("{operation}: {detail}")]
    Validation { operation: Operation, detail: String },
}

impl PortError {
    pub fn operation(&self) -> Operation {
        match self {
            PortError::NotFound { operation }
            | PortError::Unauthorized { operation, .. }
            | PortError::Transport { operation, .. }
            | PortError::ServerError { operation, .. }
            | PortError::Validation { operation, .. } => *operation,
        }
    }

    /// Maps a non-success HTTP status onto the error taxonomy.
    pub fn from_status(operation: Operation, status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            401 | 403 => PortError::Unauthorized { operation, status },
            404 => PortError::NotFound { operation },
            400 | 409 | 422 => PortError::Validation { operation, detail },
            _ => PortError::ServerError {
                operation,
                status,
                detail,
            },
        }
    }

    pub fn validation(operation: Operation, detail: impl Into<String>) -> Self {
        PortError::Validation {
            operation,
            detail: detail.into(),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Failures reported by the identity provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IdentityError {
    #[error("No signed-in user")]
    NotAuthenticated,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Account already exists: {0}")]
    AlreadyExists(String),
    #[error("Identity provider error: {0}")]
    Provider(String),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

//=========================================================================================
// Identity Port
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignInOutcome {
    pub is_signed_in: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub name: String,
}

/// The identity provider's view of the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub user_id: String,
    pub login_id: Option<String>,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentitySession {
    pub id_token: Option<String>,
}

/// The external authentication provider. Treated as an opaque capability.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, username: &str, password: &str) -> IdentityResult<SignInOutcome>;

    async fn sign_out(&self) -> IdentityResult<()>;

    async fn sign_up(&self, request: SignUpRequest) -> IdentityResult<()>;

    async fn current_user(&self) -> IdentityResult<IdentityUser>;

    /// Fetches the current session, whose id token authorizes backend calls.
    async fn fetch_session(&self) -> IdentityResult<IdentitySession>;
}

//=========================================================================================
// Resource Port
//=========================================================================================

/// CRUD and query operations against the catalog backend.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    // --- Books ---
    async fn list_books(&self) -> PortResult<Vec<Book>>;

    /// Returns `Ok(None)` when the book does not exist.
    async fn get_book(&self, id: &str) -> PortResult<Option<Book>>;

    async fn create_book(&self, book: NewBook) -> PortResult<Book>;

    async fn delete_book(&self, id: &str) -> PortResult<()>;

    // --- Recommendations ---
    async fn get_recommendations(&self, query: &str) -> PortResult<Vec<BookRecommendation>>;

    // --- Reading Lists ---
    async fn list_reading_lists(&self) -> PortResult<Vec<ReadingList>>;

    async fn create_reading_list(&self, list: NewReadingList) -> PortResult<ReadingList>;

    async fn update_reading_list(
        &self,
        id: &str,
        update: ReadingListUpdate,
    ) -> PortResult<ReadingList>;

    async fn delete_reading_list(&self, id: &str) -> PortResult<()>;

    // --- Reviews ---
    async fn list_reviews(&self, book_id: &str) -> PortResult<Vec<Review>>;

    async fn create_review(&self, book_id: &str, review: NewReview) -> PortResult<Review>;
}
