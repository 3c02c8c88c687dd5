//! crates/book_catalog_core/src/domain.rs
//!
//! Defines the core data structures shared by every part of the client.
//! The field names on the wire are camelCase, which is what the catalog backend speaks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

//=========================================================================================
// Users
//=========================================================================================

/// The role a signed-in user holds. Everyone starts out as a plain `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// The currently signed-in user, held only in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Books
//=========================================================================================

/// A book in the catalog. `id` is assigned by the server on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    /// Fields the backend sends that this client has no name for.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The payload for creating a book: a `Book` without its id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
}

impl NewBook {
    /// Attaches a server-assigned id, producing the stored `Book`.
    pub fn into_book(self, id: impl Into<String>) -> Book {
        Book {
            id: id.into(),
            title: self.title,
            author: self.author,
            genre: self.genre,
            description: self.description,
            cover_image: self.cover_image,
            rating: self.rating,
            published_year: self.published_year,
            extra: Map::new(),
        }
    }
}

/// A recommendation derived from a free-text query. Never stored client-side.
///
/// Every field is optional on the wire so that a sparse item never fails the
/// whole response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecommendation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

//=========================================================================================
// Reading Lists
//=========================================================================================

/// A user's reading list. Entries reference books by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingList {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub book_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The payload for creating a reading list: no id and no timestamps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReadingList {
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub book_ids: Vec<String>,
}

/// A partial update. Fields left as `None` are omitted from the request body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_ids: Option<Vec<String>>,
}

impl ReadingListUpdate {
    /// Applies the present fields onto `list` and bumps its `updated_at`.
    pub fn apply_to(self, list: &mut ReadingList, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            list.name = name;
        }
        if let Some(description) = self.description {
            list.description = description;
        }
        if let Some(book_ids) = self.book_ids {
            list.book_ids = book_ids;
        }
        list.updated_at = now;
    }
}

//=========================================================================================
// Reviews
//=========================================================================================

/// A review ties exactly one user to exactly one book, by id reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub book_id: String,
    pub user_id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// The payload for posting a review on a book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    pub fn has_valid_rating(&self) -> bool {
        (Self::MIN_RATING..=Self::MAX_RATING).contains(&self.rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_decodes_with_only_required_fields() {
        let book: Book = serde_json::from_str(r#"{"id":"1","title":"Dune"}"#).unwrap();
        assert_eq!(book.id, "1");
        assert_eq!(book.author, "");
        assert_eq!(book.published_year, None);
        assert!(book.extra.is_empty());
    }

    #[test]
    fn test_unknown_book_fields_survive_a_round_trip() {
        let raw = serde_json::json!({
            "id": "1",
            "title": "Dune",
            "isbn": "978-0441013593",
            "tags": ["desert"]
        });
        let book: Book = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(book.extra["isbn"], "978-0441013593");
        assert_eq!(serde_json::to_value(&book).unwrap(), {
            let mut expected = raw;
            expected["author"] = "".into();
            expected["genre"] = "".into();
            expected["description"] = "".into();
            expected
        });
    }

    #[test]
    fn test_sparse_recommendation_still_decodes() {
        let recs: Vec<BookRecommendation> = serde_json::from_str(
            r#"[{"author":"Ann Leckie","score":0.9},{"title":"Dune","reason":"desert"}]"#,
        )
        .unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].title, "");
        assert_eq!(recs[0].author, "Ann Leckie");
        assert_eq!(recs[0].extra["score"], 0.9);
        assert_eq!(recs[1].title, "Dune");
        assert!(recs[1].extra.is_empty());
    }

    #[test]
    fn test_reading_list_update_omits_absent_fields() {
        let update = ReadingListUpdate {
            name: Some("Summer".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Summer" }));
    }

    #[test]
    fn test_reading_list_update_applies_present_fields_only() {
        let created = Utc::now();
        let mut list = ReadingList {
            id: "rl-1".to_string(),
            user_id: "u-1".to_string(),
            name: "Old".to_string(),
            description: "keep me".to_string(),
            book_ids: vec!["b-1".to_string()],
            created_at: created,
            updated_at: created,
        };
        let later = created + chrono::Duration::seconds(5);
        ReadingListUpdate {
            name: Some("New".to_string()),
            ..Default::default()
        }
        .apply_to(&mut list, later);

        assert_eq!(list.name, "New");
        assert_eq!(list.description, "keep me");
        assert_eq!(list.created_at, created);
        assert_eq!(list.updated_at, later);
    }

    #[test]
    fn test_role_wire_format_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_review_rating_bounds() {
        let mut review = NewReview { rating: 5, comment: String::new() };
        assert!(review.has_valid_rating());
        review.rating = 0;
        assert!(!review.has_valid_rating());
        review.rating = 6;
        assert!(!review.has_valid_rating());
    }
}
