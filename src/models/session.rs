use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Session document in the `sessions` collection. `user_id` matches a User's
/// email; `jwt` is an opaque token stored as-is, verified upstream.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Session {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub jwt: String,
}
