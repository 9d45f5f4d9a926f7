use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// Comment document in the `comments` collection. `email` identifies the
/// author and is immutable after creation; `text` is the only mutable field.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub movie_id: ObjectId,
    pub text: String,
    pub date: DateTime,
}

impl Comment {
    /// New comment stamped with the current time; the id is assigned by the
    /// store on insert.
    pub fn new(email: impl Into<String>, movie_id: ObjectId, text: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            movie_id,
            text: text.into(),
            date: DateTime::from_millis(chrono::Utc::now().timestamp_millis()),
        }
    }
}

/// Aggregation projection pairing an author email with a comment count.
/// Never persisted - it only exists as the most-active-commenters result
/// shape, where the group key lands in `_id`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Critic {
    #[serde(rename = "_id")]
    pub email: String,
    pub count: i64,
}
