use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::services::episode::find_episode;
use crate::services::user::Caller;
use crate::services::{ServiceError, ServiceResult, is_unique_violation};

pub struct PlaybackService {
    db: Arc<Database>,
}

impl PlaybackService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Record that the listener played the episode and return how many users have
    /// played it. Marking the same episode again is not an error.
    #[instrument(skip(self, listener), fields(user_id = listener.id))]
    pub async fn mark_as_played(&self, listener: &Caller, episode_id: i32) -> ServiceResult<u64> {
        find_episode(&self.db.conn, episode_id).await?;

        if !self.has_seen(listener.id, episode_id).await? {
            let row = entities::episode_seen_user::ActiveModel {
                episode_id: Set(episode_id),
                user_id: Set(listener.id),
                ..entities::episode_seen_user::ActiveModel::new()
            };

            match row.insert(&self.db.conn).await {
                Ok(_) => log::debug!("User {} played episode {}", listener.id, episode_id),
                // Lost a race with a concurrent mark; the row is there either way
                Err(e) if is_unique_violation(&e) => {}
                Err(e) => return Err(ServiceError::Database(e)),
            }
        }

        self.seen_count(episode_id).await
    }

    pub async fn seen_count(&self, episode_id: i32) -> ServiceResult<u64> {
        let count = entities::episode_seen_user::Entity::find()
            .filter(entities::episode_seen_user::Column::EpisodeId.eq(episode_id))
            .count(&self.db.conn)
            .await?;

        Ok(count)
    }

    pub async fn has_seen(&self, user_id: i32, episode_id: i32) -> ServiceResult<bool> {
        let row = entities::episode_seen_user::Entity::find_by_id((episode_id, user_id))
            .one(&self.db.conn)
            .await?;

        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use crate::test_utils::{caller, insert_episode, insert_podcast, insert_user, test_db};

    #[tokio::test]
    async fn test_mark_as_played_is_idempotent() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        let listener = insert_user(&db, "l@example.com", UserRole::Listener).await;
        let podcast = insert_podcast(&db, host.id, "Show", "Tech").await;
        let episode = insert_episode(&db, podcast.id, "Pilot").await;

        let service = PlaybackService::new(db);
        let me = caller(&listener);

        assert_eq!(service.mark_as_played(&me, episode.id).await.unwrap(), 1);
        assert_eq!(service.mark_as_played(&me, episode.id).await.unwrap(), 1);
        assert!(service.has_seen(listener.id, episode.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_seen_count_per_episode() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        let alice = insert_user(&db, "alice@example.com", UserRole::Listener).await;
        let bob = insert_user(&db, "bob@example.com", UserRole::Listener).await;
        let podcast = insert_podcast(&db, host.id, "Show", "Tech").await;
        let first = insert_episode(&db, podcast.id, "One").await;
        let second = insert_episode(&db, podcast.id, "Two").await;

        let service = PlaybackService::new(db);
        service.mark_as_played(&caller(&alice), first.id).await.unwrap();
        let count = service.mark_as_played(&caller(&bob), first.id).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(service.seen_count(second.id).await.unwrap(), 0);
        assert!(!service.has_seen(alice.id, second.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_mark_missing_episode() {
        let db = test_db().await;
        let listener = insert_user(&db, "l@example.com", UserRole::Listener).await;

        let service = PlaybackService::new(db);
        let err = service
            .mark_as_played(&caller(&listener), 8)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Episode with id 8 not found");
    }
}
