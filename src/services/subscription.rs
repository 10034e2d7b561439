use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, Set, sea_query::SelectStatement,
};
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::http_server::graphql::query_builder::{Page, PageRequest, apply_pagination};
use crate::services::episode::{self, EpisodeWithPodcast, fetch_episode_page};
use crate::services::podcast::{PodcastWithHost, fetch_podcast_page, find_podcast};
use crate::services::user::Caller;
use crate::services::ServiceResult;

pub struct SubscriptionService {
    db: Arc<Database>,
}

impl SubscriptionService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Flip the caller's membership in the podcast's listener set.
    /// Returns a message naming the podcast and the new state.
    #[instrument(skip(self, listener), fields(user_id = listener.id))]
    pub async fn toggle(&self, listener: &Caller, podcast_id: i32) -> ServiceResult<String> {
        let podcast = find_podcast(&self.db.conn, podcast_id).await?;

        let existing = entities::podcast_listener::Entity::find_by_id((podcast_id, listener.id))
            .one(&self.db.conn)
            .await?;

        if existing.is_some() {
            entities::podcast_listener::Entity::delete_by_id((podcast_id, listener.id))
                .exec(&self.db.conn)
                .await?;
            log::info!("User {} unsubscribed from podcast {}", listener.id, podcast_id);
            Ok(format!("Unsubscribed podcast: {}.", podcast.title))
        } else {
            let row = entities::podcast_listener::ActiveModel {
                podcast_id: Set(podcast_id),
                user_id: Set(listener.id),
                ..entities::podcast_listener::ActiveModel::new()
            };
            row.insert(&self.db.conn).await?;
            log::info!("User {} subscribed to podcast {}", listener.id, podcast_id);
            Ok(format!("Subscribed podcast: {}.", podcast.title))
        }
    }

    /// Podcasts the listener subscribes to, ordered by title.
    pub async fn list_subscriptions(
        &self,
        listener: &Caller,
        request: PageRequest,
    ) -> ServiceResult<Page<PodcastWithHost>> {
        let query = entities::podcast::Entity::find()
            .filter(entities::podcast::Column::Id.in_subquery(subscribed_podcast_ids(listener.id)))
            .order_by_asc(entities::podcast::Column::Title)
            .order_by_asc(entities::podcast::Column::Id);

        fetch_podcast_page(&self.db.conn, query, request, false).await
    }

    /// Episodes of every subscribed podcast, newest first.
    pub async fn feed(
        &self,
        listener: &Caller,
        request: PageRequest,
    ) -> ServiceResult<Page<EpisodeWithPodcast>> {
        let query = episode::newest_first(entities::episode::Entity::find().filter(
            entities::episode::Column::PodcastId.in_subquery(subscribed_podcast_ids(listener.id)),
        ));

        fetch_episode_page(&self.db.conn, query, request).await
    }

    pub async fn list_listeners(
        &self,
        podcast_id: i32,
        request: PageRequest,
    ) -> ServiceResult<Page<entities::user::Model>> {
        find_podcast(&self.db.conn, podcast_id).await?;

        let listener_ids = entities::podcast_listener::Entity::find()
            .select_only()
            .column(entities::podcast_listener::Column::UserId)
            .filter(entities::podcast_listener::Column::PodcastId.eq(podcast_id))
            .into_query();

        let query = entities::user::Entity::find()
            .filter(entities::user::Column::Id.in_subquery(listener_ids))
            .order_by_asc(entities::user::Column::Id);

        let total_count = query.clone().count(&self.db.conn).await?;
        let users = apply_pagination(query, request).all(&self.db.conn).await?;

        Ok(Page::new(users, total_count, request))
    }

    pub async fn listener_count(&self, podcast_id: i32) -> ServiceResult<u64> {
        let count = entities::podcast_listener::Entity::find()
            .filter(entities::podcast_listener::Column::PodcastId.eq(podcast_id))
            .count(&self.db.conn)
            .await?;

        Ok(count)
    }

    pub async fn is_subscribed(&self, user_id: i32, podcast_id: i32) -> ServiceResult<bool> {
        let row = entities::podcast_listener::Entity::find_by_id((podcast_id, user_id))
            .one(&self.db.conn)
            .await?;

        Ok(row.is_some())
    }
}

/// Subquery selecting the ids of every podcast the user subscribes to.
fn subscribed_podcast_ids(user_id: i32) -> SelectStatement {
    entities::podcast_listener::Entity::find()
        .select_only()
        .column(entities::podcast_listener::Column::PodcastId)
        .filter(entities::podcast_listener::Column::UserId.eq(user_id))
        .into_query()
}
