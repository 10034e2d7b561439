use async_graphql::{ComplexObject, Context, Enum, SimpleObject};
use chrono::{DateTime, Utc};

use crate::entities;
use crate::http_server::graphql::context::{get_app_state, get_caller};
use crate::http_server::graphql_error::GraphqlResult;
use crate::http_server::graphql::envelope::to_int;
use crate::services::episode::EpisodeWithPodcast;
use crate::services::playback::PlaybackService;
use crate::services::podcast::PodcastWithHost;
use crate::services::review::{ReviewService, ReviewWithReviewer};
use crate::services::subscription::SubscriptionService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum UserRole {
    Host,
    Listener,
}

impl From<entities::user::UserRole> for UserRole {
    fn from(role: entities::user::UserRole) -> Self {
        match role {
            entities::user::UserRole::Host => UserRole::Host,
            entities::user::UserRole::Listener => UserRole::Listener,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub role: UserRole,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Podcast {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub host_id: i32,
    pub host: User,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[graphql(skip)]
    pub listener_ids: Option<Vec<i32>>,
}

#[ComplexObject]
impl Podcast {
    async fn listener_count(&self, ctx: &Context<'_>) -> GraphqlResult<i32> {
        if let Some(ids) = &self.listener_ids {
            return Ok(to_int(ids.len() as u64));
        }

        let db = &get_app_state(ctx)?.db;
        let count = SubscriptionService::new(db.clone())
            .listener_count(self.id)
            .await?;
        Ok(to_int(count))
    }

    /// Whether the caller subscribes to this podcast. Always false for anonymous requests.
    async fn is_on_subscribe(&self, ctx: &Context<'_>) -> GraphqlResult<bool> {
        let Some(caller) = get_caller(ctx) else {
            return Ok(false);
        };
        if let Some(ids) = &self.listener_ids {
            return Ok(ids.contains(&caller.id));
        }

        let db = &get_app_state(ctx)?.db;
        let subscribed = SubscriptionService::new(db.clone())
            .is_subscribed(caller.id, self.id)
            .await?;
        Ok(subscribed)
    }

    /// Whether the caller already reviewed this podcast.
    async fn reviewed(&self, ctx: &Context<'_>) -> GraphqlResult<bool> {
        let Some(caller) = get_caller(ctx) else {
            return Ok(false);
        };

        let db = &get_app_state(ctx)?.db;
        let reviewed = ReviewService::new(db.clone())
            .has_reviewed(caller.id, self.id)
            .await?;
        Ok(reviewed)
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Episode {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub url: Option<String>,
    /// Seconds
    pub play_length: Option<i32>,
    pub podcast_id: i32,
    pub podcast: Podcast,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[ComplexObject]
impl Episode {
    async fn seen_count(&self, ctx: &Context<'_>) -> GraphqlResult<i32> {
        let db = &get_app_state(ctx)?.db;
        let count = PlaybackService::new(db.clone()).seen_count(self.id).await?;
        Ok(to_int(count))
    }

    async fn have_seen(&self, ctx: &Context<'_>) -> GraphqlResult<bool> {
        let Some(caller) = get_caller(ctx) else {
            return Ok(false);
        };

        let db = &get_app_state(ctx)?.db;
        let seen = PlaybackService::new(db.clone())
            .has_seen(caller.id, self.id)
            .await?;
        Ok(seen)
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Review {
    pub id: i32,
    pub content: String,
    pub rating: i32,
    pub podcast_id: i32,
    pub reviewer: User,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn map_user(user: entities::user::Model) -> User {
    User {
        id: user.id,
        email: user.email,
        role: user.role.into(),
        verified: user.verified,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn map_podcast_model(
    podcast: entities::podcast::Model,
    host: entities::user::Model,
    listener_ids: Option<Vec<i32>>,
) -> Podcast {
    Podcast {
        id: podcast.id,
        title: podcast.title,
        category: podcast.category,
        description: podcast.description,
        thumbnail: podcast.thumbnail,
        host_id: podcast.host_id,
        host: map_user(host),
        created_at: podcast.created_at,
        updated_at: podcast.updated_at,
        listener_ids,
    }
}

pub(crate) fn map_podcast(pwh: PodcastWithHost) -> Podcast {
    map_podcast_model(pwh.podcast, pwh.host, pwh.listener_ids)
}

pub(crate) fn map_episode(ewp: EpisodeWithPodcast) -> Episode {
    let episode = ewp.episode;
    Episode {
        id: episode.id,
        title: episode.title,
        description: episode.description,
        category: episode.category,
        url: episode.url,
        play_length: episode.play_length,
        podcast_id: episode.podcast_id,
        podcast: map_podcast_model(ewp.podcast, ewp.host, None),
        created_at: episode.created_at,
        updated_at: episode.updated_at,
    }
}

pub(crate) fn map_review(rwr: ReviewWithReviewer) -> Review {
    Review {
        id: rwr.review.id,
        content: rwr.review.content,
        rating: rwr.review.rating,
        podcast_id: rwr.review.podcast_id,
        reviewer: map_user(rwr.reviewer),
        created_at: rwr.review.created_at,
        updated_at: rwr.review.updated_at,
    }
}
