use async_graphql::{Context, InputObject, Object};

use crate::entities::user::UserRole;
use crate::http_server::graphql::context::{get_app_state, require_caller};
use crate::http_server::graphql::envelope::{CoreOutput, output, respond, to_int};
use crate::http_server::graphql::episode_queries::EpisodesSearchInput;
use crate::http_server::graphql::guard::RoleGuard;
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::episode::{EpisodeChanges, EpisodeService, NewEpisode};
use crate::services::playback::PlaybackService;

#[derive(Debug, Clone, InputObject)]
pub struct CreateEpisodeInput {
    pub podcast_id: i32,
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Seconds
    pub play_length: Option<i32>,
}

impl From<CreateEpisodeInput> for NewEpisode {
    fn from(input: CreateEpisodeInput) -> Self {
        Self {
            podcast_id: input.podcast_id,
            title: input.title,
            category: input.category,
            description: input.description,
            url: input.url,
            play_length: input.play_length,
        }
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct UpdateEpisodeInput {
    pub podcast_id: i32,
    pub episode_id: i32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub url: Option<String>,
    pub play_length: Option<i32>,
}

impl From<UpdateEpisodeInput> for EpisodeChanges {
    fn from(input: UpdateEpisodeInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            category: input.category,
            url: input.url,
            play_length: input.play_length,
        }
    }
}

output!(CreateEpisodeOutput { id: i32 });

output!(MarkEpisodeAsPlayedOutput { count: i32 });

#[derive(Default)]
pub struct EpisodeMutation;

#[Object]
impl EpisodeMutation {
    #[graphql(guard = "RoleGuard::new(UserRole::Host)")]
    async fn create_episode(
        &self,
        ctx: &Context<'_>,
        input: CreateEpisodeInput,
    ) -> GraphqlResult<CreateEpisodeOutput> {
        let db = &get_app_state(ctx)?.db;
        let host = require_caller(ctx)?;
        let service = EpisodeService::new(db.clone());

        let result = service.create(host, input.into()).await;
        Ok(respond(result, |id| CreateEpisodeOutput {
            ok: true,
            id: Some(id),
            ..Default::default()
        }))
    }

    #[graphql(guard = "RoleGuard::new(UserRole::Host)")]
    async fn update_episode(
        &self,
        ctx: &Context<'_>,
        input: UpdateEpisodeInput,
    ) -> GraphqlResult<CoreOutput> {
        let db = &get_app_state(ctx)?.db;
        let host = require_caller(ctx)?;
        let service = EpisodeService::new(db.clone());

        let (podcast_id, episode_id) = (input.podcast_id, input.episode_id);
        let result = service
            .update(host, podcast_id, episode_id, input.into())
            .await;
        Ok(respond(result, |_| CoreOutput::success()))
    }

    #[graphql(guard = "RoleGuard::new(UserRole::Host)")]
    async fn delete_episode(
        &self,
        ctx: &Context<'_>,
        input: EpisodesSearchInput,
    ) -> GraphqlResult<CoreOutput> {
        let db = &get_app_state(ctx)?.db;
        let host = require_caller(ctx)?;
        let service = EpisodeService::new(db.clone());

        let result = service
            .delete(host, input.podcast_id, input.episode_id)
            .await;
        Ok(respond(result, |_| CoreOutput::success()))
    }

    /// Record a play. Repeating it for the same episode keeps the count unchanged.
    #[graphql(guard = "RoleGuard::new(UserRole::Listener)")]
    async fn mark_episode_as_played(
        &self,
        ctx: &Context<'_>,
        episode_id: i32,
    ) -> GraphqlResult<MarkEpisodeAsPlayedOutput> {
        let db = &get_app_state(ctx)?.db;
        let listener = require_caller(ctx)?;
        let service = PlaybackService::new(db.clone());

        let result = service.mark_as_played(listener, episode_id).await;
        Ok(respond(result, |count| MarkEpisodeAsPlayedOutput {
            ok: true,
            count: Some(to_int(count)),
            ..Default::default()
        }))
    }
}
