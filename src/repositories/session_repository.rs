use crate::{database::MongoDB, models::Session, utils::error::RepoError};
use mongodb::bson::doc;
use mongodb::Collection;

const COLLECTION: &str = "sessions";

/// Access to the `sessions` collection. One session per user identity; the
/// token itself is opaque here.
#[derive(Clone)]
pub struct SessionRepository {
    pub(crate) sessions: Collection<Session>,
}

impl SessionRepository {
    pub fn new(db: &MongoDB) -> Self {
        Self {
            sessions: db.collection::<Session>(COLLECTION),
        }
    }

    /// Upserts the session for `user_id`: replaces the token if a session
    /// already exists, inserts a new record otherwise. Write failures are
    /// logged and reported as `false`, never raised - the caller treats
    /// session creation as retryable.
    pub async fn create_user_session(&self, user_id: &str, jwt: &str) -> bool {
        log::debug!("create_user_session: user_id: {}", user_id);
        let filter = doc! { "user_id": user_id };
        let update = doc! { "$set": { "jwt": jwt } };
        match self.sessions.update_one(filter, update).upsert(true).await {
            Ok(_) => true,
            Err(e) => {
                log::error!("Session creation for user {} failed: {}", user_id, e);
                false
            }
        }
    }

    /// Point lookup by user identity. `None` means "not authenticated", not
    /// an error.
    pub async fn get_user_session(&self, user_id: &str) -> Result<Option<Session>, RepoError> {
        let session = self.sessions.find_one(doc! { "user_id": user_id }).await?;
        Ok(session)
    }

    /// Removes the session record(s) for `user_id`. Idempotent: deleting a
    /// non-existent session is success. Boolean because the user-delete
    /// cascade gates on it.
    pub async fn delete_user_sessions(&self, user_id: &str) -> bool {
        log::debug!("delete_user_sessions: user_id: {}", user_id);
        match self.sessions.delete_many(doc! { "user_id": user_id }).await {
            Ok(_) => true,
            Err(e) => {
                log::error!("Sessions of user {} were not deleted: {}", user_id, e);
                false
            }
        }
    }
}
