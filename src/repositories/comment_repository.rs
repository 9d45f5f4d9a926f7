use crate::{
    database::MongoDB,
    models::{Comment, Critic},
    utils::error::RepoError,
};
use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::{CollectionOptions, ReadConcern};
use mongodb::Collection;

const COLLECTION: &str = "comments";

/// At most this many rows come back from the activity ranking.
const MOST_ACTIVE_LIMIT: i32 = 20;

/// Access to the `comments` collection. Edits and deletes are scoped to the
/// authoring email inside the store filter itself.
#[derive(Clone)]
pub struct CommentRepository {
    pub(crate) comments: Collection<Comment>,
    // Same collection at majority read concern, used only by the ranking
    // aggregation so it never counts rollback-prone writes.
    comments_majority: Collection<Comment>,
}

impl CommentRepository {
    pub fn new(db: &MongoDB) -> Self {
        let majority = CollectionOptions::builder()
            .read_concern(ReadConcern::majority())
            .build();
        Self {
            comments: db.collection::<Comment>(COLLECTION),
            comments_majority: db.collection_with_options::<Comment>(COLLECTION, majority),
        }
    }

    fn parse_id(id: &str) -> Result<ObjectId, RepoError> {
        ObjectId::parse_str(id)
            .map_err(|_| RepoError::InvalidArgument(format!("invalid comment id {:?}", id)))
    }

    /// Point lookup by generated id. `None` when nothing matches.
    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>, RepoError> {
        let oid = Self::parse_id(id)?;
        let comment = self.comments.find_one(doc! { "_id": oid }).await?;
        Ok(comment)
    }

    /// Inserts `comment`, then re-reads it by the freshly assigned id and
    /// returns the canonical stored form - the store may normalize fields on
    /// insert, and the re-read is what callers get to trust.
    pub async fn add_comment(&self, comment: Comment) -> Result<Comment, RepoError> {
        log::debug!("add_comment: author {}", comment.email);
        let result = self.comments.insert_one(&comment).await.map_err(|e| {
            RepoError::OperationFailed(format!(
                "comment by {} wasn't added: {}",
                comment.email, e
            ))
        })?;
        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            RepoError::OperationFailed("insert did not yield an ObjectId".to_string())
        })?;
        match self.comments.find_one(doc! { "_id": id }).await? {
            Some(stored) => Ok(stored),
            None => Err(RepoError::OperationFailed(format!(
                "comment {} vanished after insert",
                id
            ))),
        }
    }

    /// Updates the text of the comment matching both `id` and the authoring
    /// `email`. One combined filter enforces ownership and existence
    /// atomically: a comment deleted or owned by someone else simply fails to
    /// match, which is `Ok(false)` - distinct from a store failure.
    pub async fn update_comment(
        &self,
        id: &str,
        text: &str,
        email: &str,
    ) -> Result<bool, RepoError> {
        log::debug!("update_comment: id: {}, author: {}", id, email);
        let oid = Self::parse_id(id)?;
        let filter = doc! { "_id": oid, "email": email };
        let update = doc! { "$set": { "text": text } };
        let result = self.comments.update_one(filter, update).await?;
        Ok(result.modified_count > 0)
    }

    /// Deletes the comment matching both `id` and the authoring `email` in
    /// one operation. True only if a document was actually removed - an
    /// acknowledged matched-zero delete reports false.
    pub async fn delete_comment(&self, id: &str, email: &str) -> Result<bool, RepoError> {
        log::debug!("delete_comment: id: {}, author: {}", id, email);
        let oid = Self::parse_id(id)?;
        let result = self
            .comments
            .delete_one(doc! { "_id": oid, "email": email })
            .await?;
        Ok(result.deleted_count != 0)
    }

    /// Ranks authors by number of comments, most active first, capped at 20.
    /// Equal counts tie-break on ascending email (the group `_id`) so the
    /// order is deterministic.
    pub async fn most_active_commenters(&self) -> Result<Vec<Critic>, RepoError> {
        let pipeline = vec![
            doc! { "$group": { "_id": "$email", "count": { "$sum": 1 } } },
            doc! { "$sort": { "count": -1, "_id": 1 } },
            doc! { "$limit": MOST_ACTIVE_LIMIT },
        ];

        let mut cursor = self.comments_majority.aggregate(pipeline).await?;
        let mut critics = Vec::new();
        while let Some(row) = cursor.next().await {
            let critic: Critic = mongodb::bson::from_document(row?)
                .map_err(|e| RepoError::OperationFailed(format!("bad critic row: {}", e)))?;
            critics.push(critic);
        }
        Ok(critics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> CommentRepository {
        dotenv::dotenv().ok();
        let _ = env_logger::builder().is_test(true).try_init();
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017/cinelog_test".to_string());
        let db = MongoDB::new(&uri).await.expect("test database");
        CommentRepository::new(&db)
    }

    fn fresh_email() -> String {
        format!("{}@comment-test.local", ObjectId::new().to_hex())
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_add_comment_returns_canonical_stored_form() {
        let repo = repo().await;
        let email = fresh_email();

        let stored = repo
            .add_comment(Comment::new(email.as_str(), ObjectId::new(), "great movie"))
            .await
            .unwrap();
        let id = stored.id.expect("store-assigned id").to_hex();

        let found = repo.get_comment(&id).await.unwrap().unwrap();
        assert_eq!(found.email, email);
        assert_eq!(found.text, "great movie");

        assert!(repo.delete_comment(&id, &email).await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_get_comment_absence_and_bad_id() {
        let repo = repo().await;

        let missing = repo.get_comment(&ObjectId::new().to_hex()).await.unwrap();
        assert!(missing.is_none());

        let err = repo.get_comment("not-an-object-id").await.unwrap_err();
        assert!(matches!(err, RepoError::InvalidArgument(_)));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_update_comment_is_ownership_scoped() {
        let repo = repo().await;
        let owner = fresh_email();

        let stored = repo
            .add_comment(Comment::new(owner.as_str(), ObjectId::new(), "first cut"))
            .await
            .unwrap();
        let id = stored.id.unwrap().to_hex();

        // wrong author: no-op, reported as not successful
        assert!(!repo
            .update_comment(&id, "hijacked", "other@comment-test.local")
            .await
            .unwrap());
        let unchanged = repo.get_comment(&id).await.unwrap().unwrap();
        assert_eq!(unchanged.text, "first cut");

        // right author: applied and visible
        assert!(repo.update_comment(&id, "final cut", &owner).await.unwrap());
        let updated = repo.get_comment(&id).await.unwrap().unwrap();
        assert_eq!(updated.text, "final cut");

        assert!(repo.delete_comment(&id, &owner).await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_delete_comment_true_exactly_once() {
        let repo = repo().await;
        let owner = fresh_email();

        let stored = repo
            .add_comment(Comment::new(owner.as_str(), ObjectId::new(), "gone soon"))
            .await
            .unwrap();
        let id = stored.id.unwrap().to_hex();

        // wrong author never deletes
        assert!(!repo
            .delete_comment(&id, "other@comment-test.local")
            .await
            .unwrap());

        assert!(repo.delete_comment(&id, &owner).await.unwrap());
        assert!(!repo.delete_comment(&id, &owner).await.unwrap());
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB and a scratch database (wipes `comments`)
    async fn test_most_active_commenters_ranking() {
        let repo = repo().await;
        repo.comments
            .delete_many(doc! {})
            .await
            .expect("scratch database");

        let heavy = fresh_email();
        let light = fresh_email();
        for i in 0..3 {
            repo.add_comment(Comment::new(heavy.as_str(), ObjectId::new(), format!("take {}", i)))
                .await
                .unwrap();
        }
        repo.add_comment(Comment::new(light.as_str(), ObjectId::new(), "just one"))
            .await
            .unwrap();

        let critics = repo.most_active_commenters().await.unwrap();
        assert!(critics.len() <= 20);
        assert_eq!(critics[0].email, heavy);
        assert_eq!(critics[0].count, 3);
        assert_eq!(critics[1].email, light);
        assert_eq!(critics[1].count, 1);
        assert!(critics.windows(2).all(|w| w[0].count >= w[1].count));
    }
}
