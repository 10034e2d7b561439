use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::entities::user::UserRole;
use crate::http_server::graphql::query_builder::{
    Page, PageRequest, apply_pagination, apply_text_search,
};
use crate::services::authorization::is_podcast_owner;
use crate::services::user::Caller;
use crate::services::{ServiceError, ServiceResult};

#[derive(Debug)]
pub struct PodcastWithHost {
    pub podcast: entities::podcast::Model,
    pub host: entities::user::Model,
    /// Subscribed user ids, when the query loaded them
    pub listener_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone)]
pub struct NewPodcast {
    pub title: String,
    pub category: String,
    pub description: String,
    pub thumbnail: Option<String>,
}

/// Fields to overwrite on an existing podcast. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct PodcastChanges {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

pub struct PodcastService {
    db: Arc<Database>,
}

impl PodcastService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, host, input), fields(host_id = host.id))]
    pub async fn create(&self, host: &Caller, input: NewPodcast) -> ServiceResult<i32> {
        let podcast = entities::podcast::ActiveModel {
            title: Set(input.title),
            category: Set(input.category),
            description: Set(input.description),
            thumbnail: Set(input.thumbnail),
            host_id: Set(host.id),
            ..entities::podcast::ActiveModel::new()
        };

        let model = podcast.insert(&self.db.conn).await?;
        log::info!("Podcast created: '{}' (ID: {})", model.title, model.id);
        Ok(model.id)
    }

    /// Fetch a podcast with its host and listener ids.
    pub async fn get(&self, id: i32) -> ServiceResult<PodcastWithHost> {
        let (podcast, host) = entities::podcast::Entity::find_by_id(id)
            .find_also_related(entities::user::Entity)
            .one(&self.db.conn)
            .await?
            .ok_or(ServiceError::PodcastNotFound(id))?;

        let mut items = hydrate_podcasts(&self.db.conn, vec![(podcast, host)], true).await?;
        items.pop().ok_or(ServiceError::PodcastNotFound(id))
    }

    pub async fn list_all(&self, request: PageRequest) -> ServiceResult<Page<PodcastWithHost>> {
        let query =
            entities::podcast::Entity::find().order_by_asc(entities::podcast::Column::Id);
        self.fetch_page(query, request, false).await
    }

    pub async fn list_recent(&self, request: PageRequest) -> ServiceResult<Page<PodcastWithHost>> {
        let query = newest_first(entities::podcast::Entity::find());
        self.fetch_page(query, request, true).await
    }

    pub async fn list_by_category(
        &self,
        category: &str,
        request: PageRequest,
    ) -> ServiceResult<Page<PodcastWithHost>> {
        let query = newest_first(
            entities::podcast::Entity::find()
                .filter(entities::podcast::Column::Category.eq(category)),
        );
        self.fetch_page(query, request, true).await
    }

    pub async fn search_by_title(
        &self,
        title: &str,
        request: PageRequest,
    ) -> ServiceResult<Page<PodcastWithHost>> {
        let query = apply_text_search(
            entities::podcast::Entity::find(),
            entities::podcast::Column::Title,
            title,
            self.db.search_dialect,
        )
        .order_by_asc(entities::podcast::Column::Id);
        self.fetch_page(query, request, false).await
    }

    /// All podcasts hosted by the caller, newest first.
    pub async fn list_for_host(&self, host: &Caller) -> ServiceResult<Vec<PodcastWithHost>> {
        if host.role != UserRole::Host {
            return Err(ServiceError::NotHost);
        }

        let pairs = newest_first(
            entities::podcast::Entity::find()
                .filter(entities::podcast::Column::HostId.eq(host.id)),
        )
        .find_also_related(entities::user::Entity)
        .all(&self.db.conn)
        .await?;

        hydrate_podcasts(&self.db.conn, pairs, false).await
    }

    #[instrument(skip(self, host, changes), fields(host_id = host.id))]
    pub async fn update(
        &self,
        host: &Caller,
        podcast_id: i32,
        changes: PodcastChanges,
    ) -> ServiceResult<()> {
        let podcast = find_podcast(&self.db.conn, podcast_id).await?;
        if !is_podcast_owner(&self.db.conn, host, podcast_id).await {
            return Err(ServiceError::NotOwner);
        }

        let mut active: entities::podcast::ActiveModel = podcast.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(category) = changes.category {
            active.category = Set(category);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(thumbnail) = changes.thumbnail {
            active.thumbnail = Set(Some(thumbnail));
        }
        active.update(&self.db.conn).await?;

        log::info!("Podcast updated (ID: {})", podcast_id);
        Ok(())
    }

    /// Delete a podcast. Episodes, reviews and subscriptions go with it.
    #[instrument(skip(self, host), fields(host_id = host.id))]
    pub async fn delete(&self, host: &Caller, podcast_id: i32) -> ServiceResult<()> {
        find_podcast(&self.db.conn, podcast_id).await?;
        if !is_podcast_owner(&self.db.conn, host, podcast_id).await {
            return Err(ServiceError::NotOwner);
        }

        entities::podcast::Entity::delete_by_id(podcast_id)
            .exec(&self.db.conn)
            .await?;

        log::info!("Podcast deleted (ID: {})", podcast_id);
        Ok(())
    }

    async fn fetch_page(
        &self,
        query: Select<entities::podcast::Entity>,
        request: PageRequest,
        with_listeners: bool,
    ) -> ServiceResult<Page<PodcastWithHost>> {
        fetch_podcast_page(&self.db.conn, query, request, with_listeners).await
    }
}

pub(crate) fn newest_first(
    query: Select<entities::podcast::Entity>,
) -> Select<entities::podcast::Entity> {
    query
        .order_by_desc(entities::podcast::Column::CreatedAt)
        .order_by_desc(entities::podcast::Column::Id)
}

pub(crate) async fn find_podcast(
    conn: &DatabaseConnection,
    podcast_id: i32,
) -> ServiceResult<entities::podcast::Model> {
    entities::podcast::Entity::find_by_id(podcast_id)
        .one(conn)
        .await?
        .ok_or(ServiceError::PodcastNotFound(podcast_id))
}

/// Count the filtered query, then fetch the requested page with hosts joined.
pub(crate) async fn fetch_podcast_page(
    conn: &DatabaseConnection,
    query: Select<entities::podcast::Entity>,
    request: PageRequest,
    with_listeners: bool,
) -> ServiceResult<Page<PodcastWithHost>> {
    let total_count = query.clone().count(conn).await?;

    let pairs = apply_pagination(query, request)
        .find_also_related(entities::user::Entity)
        .all(conn)
        .await?;

    let items = hydrate_podcasts(conn, pairs, with_listeners).await?;
    Ok(Page::new(items, total_count, request))
}

pub(crate) async fn hydrate_podcasts(
    conn: &DatabaseConnection,
    pairs: Vec<(entities::podcast::Model, Option<entities::user::Model>)>,
    with_listeners: bool,
) -> ServiceResult<Vec<PodcastWithHost>> {
    let mut listeners_by_podcast: Option<HashMap<i32, Vec<i32>>> = None;
    if with_listeners && !pairs.is_empty() {
        let podcast_ids: Vec<i32> = pairs.iter().map(|(podcast, _)| podcast.id).collect();
        let rows = entities::podcast_listener::Entity::find()
            .filter(entities::podcast_listener::Column::PodcastId.is_in(podcast_ids))
            .all(conn)
            .await?;

        let mut grouped: HashMap<i32, Vec<i32>> = HashMap::new();
        for row in rows {
            grouped.entry(row.podcast_id).or_default().push(row.user_id);
        }
        listeners_by_podcast = Some(grouped);
    }

    let mut result = Vec::with_capacity(pairs.len());
    for (podcast, host) in pairs {
        // host_id is a non-null foreign key, so the join always finds a row
        let Some(host) = host else {
            log::error!("Podcast {} has no host row", podcast.id);
            continue;
        };
        let listener_ids = listeners_by_podcast
            .as_ref()
            .map(|grouped| grouped.get(&podcast.id).cloned().unwrap_or_default());

        result.push(PodcastWithHost {
            podcast,
            host,
            listener_ids,
        });
    }

    Ok(result)
}
