use async_graphql::{Context, InputObject, Object};

use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql::envelope::{output, paginated_output, respond};
use crate::http_server::graphql::query_builder::{PageRequest, PaginationInput};
use crate::http_server::graphql::types::{Episode, map_episode};
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::episode::EpisodeService;

/// Addresses one episode. The episode must belong to `podcast_id`.
#[derive(Debug, Clone, InputObject)]
pub struct EpisodesSearchInput {
    pub podcast_id: i32,
    pub episode_id: i32,
}

output!(EpisodeOutput { episode: Episode });

paginated_output!(EpisodesOutput { episodes: Episode });

paginated_output!(GetRecentlyEpisodesOutput { episodes: Episode });

#[derive(Default)]
pub struct EpisodeQuery;

#[Object]
impl EpisodeQuery {
    async fn get_episode(
        &self,
        ctx: &Context<'_>,
        input: EpisodesSearchInput,
    ) -> GraphqlResult<EpisodeOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = EpisodeService::new(db.clone());

        let result = service.get(input.podcast_id, input.episode_id).await;
        Ok(respond(result, |episode| EpisodeOutput {
            ok: true,
            episode: Some(map_episode(episode)),
            ..Default::default()
        }))
    }

    async fn get_episodes(
        &self,
        ctx: &Context<'_>,
        podcast_id: i32,
        pagination: Option<PaginationInput>,
    ) -> GraphqlResult<EpisodesOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = EpisodeService::new(db.clone());

        let result = service
            .list_for_podcast(podcast_id, PageRequest::from(pagination))
            .await;
        Ok(respond(result, |page| page.map(map_episode).into()))
    }

    async fn get_recently_episode(
        &self,
        ctx: &Context<'_>,
        pagination: Option<PaginationInput>,
    ) -> GraphqlResult<GetRecentlyEpisodesOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = EpisodeService::new(db.clone());

        let result = service.list_recent(PageRequest::from(pagination)).await;
        Ok(respond(result, |page| page.map(map_episode).into()))
    }
}
