//! services/catalog_client/src/adapters/mock.rs
//!
//! An in-memory implementation of the `ResourceClient` port.
//!
//! It mirrors the backend's observable behavior: ids and timestamps are assigned here,
//! a missing book reads as `None`, and deleting or updating an unknown id fails with
//! `NotFound`. Calls that need a session are made on behalf of the identity provider's
//! current user; reading lists are scoped to that user.

use async_trait::async_trait;
use book_catalog_core::domain::{
    Book, BookRecommendation, NewBook, NewReadingList, NewReview, ReadingList,
    ReadingListUpdate, Review,
};
use book_catalog_core::ports::{
    IdentityProvider, Operation, PortError, PortResult, ResourceClient,
};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Default)]
struct Catalog {
    books: BTreeMap<String, Book>,
    reading_lists: BTreeMap<String, ReadingList>,
    reviews: Vec<Review>,
}

/// Who authenticated calls are made as.
enum Caller {
    /// Every call runs as this user id, signed in or not.
    Fixed(String),
    /// The identity provider's current user; no user means no session.
    Session(Arc<dyn IdentityProvider>),
}

/// In-memory catalog backend.
pub struct MockResourceClient {
    catalog: RwLock<Catalog>,
    caller: Caller,
    call_count: AtomicU32,
}

impl Default for MockResourceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResourceClient {
    /// Creates an empty catalog whose calls all run as `"mock-user"`.
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Catalog::default()),
            caller: Caller::Fixed("mock-user".to_string()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Creates a catalog pre-filled with a handful of books.
    pub fn seeded() -> Self {
        let mut client = Self::new();
        for (id, title, author, genre, description, year) in SAMPLE_BOOKS {
            let book = NewBook {
                title: title.to_string(),
                author: author.to_string(),
                genre: genre.to_string(),
                description: description.to_string(),
                published_year: Some(*year),
                ..Default::default()
            }
            .into_book(*id);
            client.catalog.get_mut().books.insert(id.to_string(), book);
        }
        client
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.caller = Caller::Fixed(user_id.into());
        self
    }

    /// Runs authenticated calls as the identity provider's current user.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.caller = Caller::Session(identity);
        self
    }

    /// Number of port operations served so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    fn record_call(&self, operation: Operation) {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        debug!("mock catalog: {:?}", operation);
    }

    /// The user id the backend would read off the bearer token.
    async fn caller_id(&self, operation: Operation) -> PortResult<String> {
        match &self.caller {
            Caller::Fixed(user_id) => Ok(user_id.clone()),
            Caller::Session(identity) => match identity.current_user().await {
                Ok(user) => Ok(user.user_id),
                Err(e) => {
                    warn!("{}: no session for mock catalog call: {}", operation, e);
                    Err(PortError::Unauthorized {
                        operation,
                        status: 401,
                    })
                }
            },
        }
    }

    fn require_id(operation: Operation, id: &str) -> PortResult<String> {
        let id = id.trim();
        if id.is_empty() {
            return Err(PortError::validation(operation, "id must not be empty"));
        }
        Ok(id.to_string())
    }
}

const SAMPLE_BOOKS: &[(&str, &str, &str, &str, &str, i32)] = &[
    (
        "1",
        "Dune",
        "Frank Herbert",
        "Science Fiction",
        "A desert planet, a noble family, and the spice that controls the universe.",
        1965,
    ),
    (
        "2",
        "The Left Hand of Darkness",
        "Ursula K. Le Guin",
        "Science Fiction",
        "An envoy on a winter world whose people have no fixed sex.",
        1969,
    ),
    (
        "3",
        "Pride and Prejudice",
        "Jane Austen",
        "Classic",
        "Manners, marriage, and misjudgement in Regency England.",
        1813,
    ),
    (
        "4",
        "The Hobbit",
        "J.R.R. Tolkien",
        "Fantasy",
        "A reluctant hobbit joins a company of dwarves to reclaim their mountain home.",
        1937,
    ),
    (
        "5",
        "Gone Girl",
        "Gillian Flynn",
        "Mystery",
        "A wife vanishes on her fifth anniversary and her husband becomes the suspect.",
        2012,
    ),
];

/// Scores a book against lower-cased query terms. Zero means no match.
fn match_score(book: &Book, terms: &[String]) -> usize {
    let haystack = format!(
        "{} {} {} {}",
        book.title, book.author, book.genre, book.description
    )
    .to_lowercase();
    terms.iter().filter(|term| haystack.contains(term.as_str())).count()
}

#[async_trait]
impl ResourceClient for MockResourceClient {
    async fn list_books(&self) -> PortResult<Vec<Book>> {
        self.record_call(Operation::ListBooks);
        Ok(self.catalog.read().await.books.values().cloned().collect())
    }

    async fn get_book(&self, id: &str) -> PortResult<Option<Book>> {
        let operation = Operation::GetBook;
        self.record_call(operation);
        let id = Self::require_id(operation, id)?;
        Ok(self.catalog.read().await.books.get(&id).cloned())
    }

    async fn create_book(&self, book: NewBook) -> PortResult<Book> {
        let operation = Operation::CreateBook;
        self.record_call(operation);
        if book.title.trim().is_empty() {
            return Err(PortError::validation(operation, "title must not be empty"));
        }
        self.caller_id(operation).await?;
        let book = book.into_book(Uuid::new_v4().to_string());
        self.catalog
            .write()
            .await
            .books
            .insert(book.id.clone(), book.clone());
        Ok(book)
    }

    async fn delete_book(&self, id: &str) -> PortResult<()> {
        let operation = Operation::DeleteBook;
        self.record_call(operation);
        let id = Self::require_id(operation, id)?;
        self.caller_id(operation).await?;
        let mut catalog = self.catalog.write().await;
        catalog
            .books
            .remove(&id)
            .ok_or(PortError::NotFound { operation })?;
        catalog.reviews.retain(|r| r.book_id != id);
        Ok(())
    }

    async fn get_recommendations(&self, query: &str) -> PortResult<Vec<BookRecommendation>> {
        let operation = Operation::GetRecommendations;
        self.record_call(operation);
        let terms: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();
        if terms.is_empty() {
            return Err(PortError::validation(operation, "query must not be empty"));
        }
        self.caller_id(operation).await?;

        let catalog = self.catalog.read().await;
        let mut scored: Vec<(usize, &Book)> = catalog
            .books
            .values()
            .map(|book| (match_score(book, &terms), book))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.title.cmp(&b.1.title)));

        Ok(scored
            .into_iter()
            .map(|(score, book)| BookRecommendation {
                title: book.title.clone(),
                author: book.author.clone(),
                reason: format!("Matches \"{}\"", query.trim()),
                genre: Some(book.genre.clone()),
                confidence: Some(score as f32 / terms.len() as f32),
                ..Default::default()
            })
            .collect())
    }

    async fn list_reading_lists(&self) -> PortResult<Vec<ReadingList>> {
        let operation = Operation::ListReadingLists;
        self.record_call(operation);
        let owner = self.caller_id(operation).await?;
        Ok(self
            .catalog
            .read()
            .await
            .reading_lists
            .values()
            .filter(|list| list.user_id == owner)
            .cloned()
            .collect())
    }

    async fn create_reading_list(&self, list: NewReadingList) -> PortResult<ReadingList> {
        let operation = Operation::CreateReadingList;
        self.record_call(operation);
        if list.name.trim().is_empty() {
            return Err(PortError::validation(operation, "name must not be empty"));
        }
        let owner = self.caller_id(operation).await?;
        let now = Utc::now();
        let created = ReadingList {
            id: Uuid::new_v4().to_string(),
            user_id: owner,
            name: list.name,
            description: list.description,
            book_ids: list.book_ids,
            created_at: now,
            updated_at: now,
        };
        self.catalog
            .write()
            .await
            .reading_lists
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_reading_list(
        &self,
        id: &str,
        update: ReadingListUpdate,
    ) -> PortResult<ReadingList> {
        let operation = Operation::UpdateReadingList;
        self.record_call(operation);
        let id = Self::require_id(operation, id)?;
        let owner = self.caller_id(operation).await?;
        let mut catalog = self.catalog.write().await;
        let list = catalog
            .reading_lists
            .get_mut(&id)
            .filter(|list| list.user_id == owner)
            .ok_or(PortError::NotFound { operation })?;
        update.apply_to(list, Utc::now());
        Ok(list.clone())
    }

    async fn delete_reading_list(&self, id: &str) -> PortResult<()> {
        let operation = Operation::DeleteReadingList;
        self.record_call(operation);
        let id = Self::require_id(operation, id)?;
        let owner = self.caller_id(operation).await?;
        let mut catalog = self.catalog.write().await;
        let owned = catalog
            .reading_lists
            .get(&id)
            .is_some_and(|list| list.user_id == owner);
        if !owned {
            return Err(PortError::NotFound { operation });
        }
        catalog.reading_lists.remove(&id);
        Ok(())
    }

    async fn list_reviews(&self, book_id: &str) -> PortResult<Vec<Review>> {
        let operation = Operation::ListReviews;
        self.record_call(operation);
        let book_id = Self::require_id(operation, book_id)?;
        let catalog = self.catalog.read().await;
        if !catalog.books.contains_key(&book_id) {
            return Err(PortError::NotFound { operation });
        }
        Ok(catalog
            .reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn create_review(&self, book_id: &str, review: NewReview) -> PortResult<Review> {
        let operation = Operation::CreateReview;
        self.record_call(operation);
        let book_id = Self::require_id(operation, book_id)?;
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
        let author = self.caller_id(operation).await?;
        let mut catalog = self.catalog.write().await;
        if !catalog.books.contains_key(&book_id) {
            return Err(PortError::NotFound { operation });
        }
        let created = Review {
            id: Uuid::new_v4().to_string(),
            book_id,
            user_id: author,
            rating: review.rating,
            comment: review.comment,
            created_at: Utc::now(),
        };
        catalog.reviews.push(created.clone());
        Ok(created)
    }
}
