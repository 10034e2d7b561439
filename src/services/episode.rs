use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::http_server::graphql::query_builder::{Page, PageRequest, apply_pagination};
use crate::services::authorization::{is_episode_owner, is_podcast_owner};
use crate::services::podcast::find_podcast;
use crate::services::user::Caller;
use crate::services::{ServiceError, ServiceResult};

#[derive(Debug)]
pub struct EpisodeWithPodcast {
    pub episode: entities::episode::Model,
    pub podcast: entities::podcast::Model,
    pub host: entities::user::Model,
}

#[derive(Debug, Clone)]
pub struct NewEpisode {
    pub podcast_id: i32,
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub play_length: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct EpisodeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub url: Option<String>,
    pub play_length: Option<i32>,
}

pub struct EpisodeService {
    db: Arc<Database>,
}

impl EpisodeService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, host, input), fields(host_id = host.id, podcast_id = input.podcast_id))]
    pub async fn create(&self, host: &Caller, input: NewEpisode) -> ServiceResult<i32> {
        find_podcast(&self.db.conn, input.podcast_id).await?;
        if !is_podcast_owner(&self.db.conn, host, input.podcast_id).await {
            return Err(ServiceError::NotOwner);
        }

        let episode = entities::episode::ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            category: Set(input.category),
            url: Set(input.url),
            play_length: Set(input.play_length),
            podcast_id: Set(input.podcast_id),
            ..entities::episode::ActiveModel::new()
        };

        let model = episode.insert(&self.db.conn).await?;
        log::info!(
            "Episode created: '{}' (ID: {}) in podcast {}",
            model.title,
            model.id,
            model.podcast_id
        );
        Ok(model.id)
    }

    /// Fetch an episode, checking that it belongs to `podcast_id`.
    pub async fn get(&self, podcast_id: i32, episode_id: i32) -> ServiceResult<EpisodeWithPodcast> {
        let episode = find_episode_in(&self.db.conn, podcast_id, episode_id).await?;
        let mut items = hydrate_episodes(&self.db.conn, vec![episode]).await?;
        items.pop().ok_or(ServiceError::EpisodeNotFound(episode_id))
    }

    pub async fn list_for_podcast(
        &self,
        podcast_id: i32,
        request: PageRequest,
    ) -> ServiceResult<Page<EpisodeWithPodcast>> {
        find_podcast(&self.db.conn, podcast_id).await?;

        let query = newest_first(
            entities::episode::Entity::find()
                .filter(entities::episode::Column::PodcastId.eq(podcast_id)),
        );
        fetch_episode_page(&self.db.conn, query, request).await
    }

    pub async fn list_recent(&self, request: PageRequest) -> ServiceResult<Page<EpisodeWithPodcast>> {
        let query = newest_first(entities::episode::Entity::find());
        fetch_episode_page(&self.db.conn, query, request).await
    }

    #[instrument(skip(self, host, changes), fields(host_id = host.id))]
    pub async fn update(
        &self,
        host: &Caller,
        podcast_id: i32,
        episode_id: i32,
        changes: EpisodeChanges,
    ) -> ServiceResult<()> {
        let episode = find_episode_in(&self.db.conn, podcast_id, episode_id).await?;
        if !is_episode_owner(&self.db.conn, host, episode_id).await {
            return Err(ServiceError::NotOwner);
        }

        let mut active: entities::episode::ActiveModel = episode.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = changes.category {
            active.category = Set(category);
        }
        if let Some(url) = changes.url {
            active.url = Set(Some(url));
        }
        if let Some(play_length) = changes.play_length {
            active.play_length = Set(Some(play_length));
        }
        active.update(&self.db.conn).await?;

        log::info!("Episode updated (ID: {})", episode_id);
        Ok(())
    }

    #[instrument(skip(self, host), fields(host_id = host.id))]
    pub async fn delete(&self, host: &Caller, podcast_id: i32, episode_id: i32) -> ServiceResult<()> {
        find_episode_in(&self.db.conn, podcast_id, episode_id).await?;
        if !is_episode_owner(&self.db.conn, host, episode_id).await {
            return Err(ServiceError::NotOwner);
        }

        entities::episode::Entity::delete_by_id(episode_id)
            .exec(&self.db.conn)
            .await?;

        log::info!("Episode deleted (ID: {})", episode_id);
        Ok(())
    }
}

pub(crate) fn newest_first(
    query: Select<entities::episode::Entity>,
) -> Select<entities::episode::Entity> {
    query
        .order_by_desc(entities::episode::Column::CreatedAt)
        .order_by_desc(entities::episode::Column::Id)
}

pub(crate) async fn find_episode(
    conn: &DatabaseConnection,
    episode_id: i32,
) -> ServiceResult<entities::episode::Model> {
    entities::episode::Entity::find_by_id(episode_id)
        .one(conn)
        .await?
        .ok_or(ServiceError::EpisodeNotFound(episode_id))
}

async fn find_episode_in(
    conn: &DatabaseConnection,
    podcast_id: i32,
    episode_id: i32,
) -> ServiceResult<entities::episode::Model> {
    let episode = find_episode(conn, episode_id).await?;
    if episode.podcast_id != podcast_id {
        return Err(ServiceError::EpisodeNotInPodcast {
            episode_id,
            podcast_id,
        });
    }
    Ok(episode)
}

pub(crate) async fn fetch_episode_page(
    conn: &DatabaseConnection,
    query: Select<entities::episode::Entity>,
    request: PageRequest,
) -> ServiceResult<Page<EpisodeWithPodcast>> {
    let total_count = query.clone().count(conn).await?;
    let episodes = apply_pagination(query, request).all(conn).await?;
    let items = hydrate_episodes(conn, episodes).await?;
    Ok(Page::new(items, total_count, request))
}

/// Attach parent podcast and host to each episode, preserving order.
pub(crate) async fn hydrate_episodes(
    conn: &DatabaseConnection,
    episodes: Vec<entities::episode::Model>,
) -> ServiceResult<Vec<EpisodeWithPodcast>> {
    if episodes.is_empty() {
        return Ok(Vec::new());
    }

    let mut podcast_ids: Vec<i32> = episodes.iter().map(|e| e.podcast_id).collect();
    podcast_ids.sort_unstable();
    podcast_ids.dedup();

    let podcasts = entities::podcast::Entity::find()
        .filter(entities::podcast::Column::Id.is_in(podcast_ids))
        .find_also_related(entities::user::Entity)
        .all(conn)
        .await?;

    let mut result = Vec::with_capacity(episodes.len());
    for episode in episodes {
        let parent = podcasts
            .iter()
            .find(|(podcast, _)| podcast.id == episode.podcast_id);

        match parent {
            Some((podcast, Some(host))) => result.push(EpisodeWithPodcast {
                podcast: podcast.clone(),
                host: host.clone(),
                episode,
            }),
            _ => log::error!("Episode {} has no parent podcast or host", episode.id),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use crate::test_utils::{caller, insert_episode, insert_podcast, insert_user, test_db};

    fn new_episode(podcast_id: i32, title: &str) -> NewEpisode {
        NewEpisode {
            podcast_id,
            title: title.into(),
            category: "Tech".into(),
            description: Some("Episode notes".into()),
            url: Some("https://cdn.example.com/ep.mp3".into()),
            play_length: Some(3600),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        let podcast = insert_podcast(&db, host.id, "Show", "Tech").await;

        let service = EpisodeService::new(db);
        let id = service
            .create(&caller(&host), new_episode(podcast.id, "Pilot"))
            .await
            .unwrap();

        let found = service.get(podcast.id, id).await.unwrap();
        assert_eq!(found.episode.title, "Pilot");
        assert_eq!(found.episode.play_length, Some(3600));
        assert_eq!(found.podcast.id, podcast.id);
        assert_eq!(found.host.id, host.id);
    }

    #[tokio::test]
    async fn test_create_requires_podcast_owner() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        let other = insert_user(&db, "other@example.com", UserRole::Host).await;
        let podcast = insert_podcast(&db, host.id, "Show", "Tech").await;

        let service = EpisodeService::new(db);
        let err = service
            .create(&caller(&other), new_episode(podcast.id, "Sneaky"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotOwner));

        let err = service
            .create(&caller(&host), new_episode(999, "Orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PodcastNotFound(999)));
    }

    #[tokio::test]
    async fn test_get_with_wrong_podcast() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        let first = insert_podcast(&db, host.id, "First", "Tech").await;
        let second = insert_podcast(&db, host.id, "Second", "Tech").await;
        let episode = insert_episode(&db, first.id, "Pilot").await;

        let service = EpisodeService::new(db);
        let err = service.get(second.id, episode.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("This episode doesn't belong to podcast id: {}", second.id)
        );
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let db = test_db().await;
        let service = EpisodeService::new(db);

        let err = service.get(1, 5).await.unwrap_err();
        assert_eq!(err.to_string(), "Episode with id 5 not found");
    }

    #[tokio::test]
    async fn test_list_for_podcast_newest_first() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        let podcast = insert_podcast(&db, host.id, "Show", "Tech").await;
        let other = insert_podcast(&db, host.id, "Other", "Tech").await;
        insert_episode(&db, podcast.id, "Ep 1").await;
        insert_episode(&db, podcast.id, "Ep 2").await;
        insert_episode(&db, other.id, "Elsewhere").await;

        let service = EpisodeService::new(db);
        let page = service
            .list_for_podcast(podcast.id, PageRequest::new(None, None))
            .await
            .unwrap();

        assert_eq!(page.total_count, 2);
        let titles: Vec<_> = page.items.iter().map(|e| e.episode.title.as_str()).collect();
        assert_eq!(titles, vec!["Ep 2", "Ep 1"]);
    }

    #[tokio::test]
    async fn test_list_recent_spans_podcasts() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        let a = insert_podcast(&db, host.id, "A", "Tech").await;
        let b = insert_podcast(&db, host.id, "B", "Tech").await;
        insert_episode(&db, a.id, "A1").await;
        insert_episode(&db, b.id, "B1").await;
        insert_episode(&db, a.id, "A2").await;

        let service = EpisodeService::new(db);
        let page = service
            .list_recent(PageRequest::new(Some(1), Some(2)))
            .await
            .unwrap();

        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_page, 2);
        assert_eq!(page.items[0].episode.title, "A2");
        assert_eq!(page.items[0].podcast.title, "A");
        assert_eq!(page.items[1].episode.title, "B1");
        assert_eq!(page.items[1].podcast.title, "B");
    }

    #[tokio::test]
    async fn test_update_merges_and_checks_parent() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        let podcast = insert_podcast(&db, host.id, "Show", "Tech").await;
        let other = insert_podcast(&db, host.id, "Other", "Tech").await;
        let episode = insert_episode(&db, podcast.id, "Before").await;

        let service = EpisodeService::new(db);
        let err = service
            .update(&caller(&host), other.id, episode.id, EpisodeChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EpisodeNotInPodcast { .. }));

        service
            .update(
                &caller(&host),
                podcast.id,
                episode.id,
                EpisodeChanges {
                    url: Some("https://cdn.example.com/new.mp3".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = service.get(podcast.id, episode.id).await.unwrap().episode;
        assert_eq!(updated.title, "Before");
        assert_eq!(updated.url.as_deref(), Some("https://cdn.example.com/new.mp3"));
        assert_eq!(updated.play_length, Some(1800));
    }

    #[tokio::test]
    async fn test_update_not_owner() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        let other = insert_user(&db, "other@example.com", UserRole::Host).await;
        let podcast = insert_podcast(&db, host.id, "Show", "Tech").await;
        let episode = insert_episode(&db, podcast.id, "Mine").await;

        let service = EpisodeService::new(db);
        let err = service
            .update(
                &caller(&other),
                podcast.id,
                episode.id,
                EpisodeChanges {
                    title: Some("Theirs".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotOwner));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        let other = insert_user(&db, "other@example.com", UserRole::Host).await;
        let podcast = insert_podcast(&db, host.id, "Show", "Tech").await;
        let sibling = insert_podcast(&db, host.id, "Sibling", "Tech").await;
        let episode = insert_episode(&db, podcast.id, "Short lived").await;

        let service = EpisodeService::new(db);
        assert!(matches!(
            service.delete(&caller(&other), podcast.id, episode.id).await,
            Err(ServiceError::NotOwner)
        ));
        let err = service
            .delete(&caller(&host), sibling.id, episode.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::EpisodeNotInPodcast { podcast_id, .. } if podcast_id == sibling.id
        ));
        assert!(service.get(podcast.id, episode.id).await.is_ok());

        service
            .delete(&caller(&host), podcast.id, episode.id)
            .await
            .unwrap();
        assert!(matches!(
            service.get(podcast.id, episode.id).await,
            Err(ServiceError::EpisodeNotFound(_))
        ));
    }
}
