use crate::{
    database::MongoDB,
    models::User,
    repositories::SessionRepository,
    utils::error::RepoError,
};
use mongodb::bson::{doc, Document};
use mongodb::options::{CollectionOptions, WriteConcern};
use mongodb::Collection;
use std::collections::HashMap;

const COLLECTION: &str = "users";

/// Access to the `users` collection. Holds the session repository so account
/// deletion can cascade through it.
#[derive(Clone)]
pub struct UserRepository {
    pub(crate) users: Collection<User>,
    pub(crate) sessions: SessionRepository,
}

impl UserRepository {
    /// The collection handle is configured once here (majority write concern,
    /// so account writes survive a primary failover) and shared read-only
    /// afterwards.
    pub fn new(db: &MongoDB, sessions: SessionRepository) -> Self {
        let options = CollectionOptions::builder()
            .write_concern(WriteConcern::majority())
            .build();
        Self {
            users: db.collection_with_options::<User>(COLLECTION, options),
            sessions,
        }
    }

    /// Inserts a new account. Any write rejection - a duplicate email
    /// included, the unique index makes that a store error - surfaces as
    /// `OperationFailed` naming the account. No retry; that is the caller's
    /// call.
    pub async fn add_user(&self, user: &User) -> Result<(), RepoError> {
        log::debug!("add_user: {}", user.email);
        self.users.insert_one(user).await.map_err(|e| {
            RepoError::OperationFailed(format!("user {} wasn't added: {}", user.email, e))
        })?;
        Ok(())
    }

    /// Point lookup by email. Absence is an ordinary outcome.
    pub async fn get_user(&self, email: &str) -> Result<Option<User>, RepoError> {
        let user = self.users.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    /// Merges `preferences` into the stored preference map: keys present in
    /// the argument overwrite, keys absent are preserved. The merge runs as a
    /// single store-side update with one `preferences.<key>` path per entry,
    /// so concurrent merges to the same account cannot drop each other's
    /// keys.
    pub async fn update_user_preferences(
        &self,
        email: &str,
        preferences: Option<&HashMap<String, String>>,
    ) -> Result<bool, RepoError> {
        log::debug!("update_user_preferences: {}", email);
        let preferences = preferences
            .ok_or_else(|| RepoError::InvalidArgument("preferences map is missing".to_string()))?;

        let Some(update) = merge_update(preferences)? else {
            // Nothing to merge, but an unknown account must still be reported.
            return match self.get_user(email).await? {
                Some(_) => Ok(true),
                None => Err(not_found(email)),
            };
        };

        let result = self.users.update_one(doc! { "email": email }, update).await?;
        if result.matched_count == 0 {
            return Err(not_found(email));
        }
        Ok(true)
    }

    /// Removes the account, cascading through its sessions first. If the
    /// sessions cannot be cleared the account is left intact and `Ok(false)`
    /// returned - removing it would orphan live tokens.
    pub async fn delete_user(&self, email: &str) -> Result<bool, RepoError> {
        log::debug!("delete_user: {}", email);
        if !self.sessions.delete_user_sessions(email).await {
            log::error!("Sessions of user with email {} were not deleted", email);
            return Ok(false);
        }
        let result = self.users.delete_one(doc! { "email": email }).await?;
        Ok(result.deleted_count > 0)
    }
}

fn not_found(email: &str) -> RepoError {
    RepoError::NotFound(format!("user by email {} not found", email))
}

/// Builds the `$set` document for a preference merge, one
/// `preferences.<key>` path per entry. `None` for an empty map - an empty
/// `$set` is an invalid update document.
fn merge_update(preferences: &HashMap<String, String>) -> Result<Option<Document>, RepoError> {
    if preferences.is_empty() {
        return Ok(None);
    }
    let mut set = Document::new();
    for (key, value) in preferences {
        // Dots nest and a leading dollar is an operator in update paths
        if key.contains('.') || key.starts_with('$') {
            return Err(RepoError::InvalidArgument(format!(
                "preference key {:?} would be misread as a path or operator",
                key
            )));
        }
        set.insert(format!("preferences.{}", key), value.clone());
    }
    Ok(Some(doc! { "$set": set }))
}
