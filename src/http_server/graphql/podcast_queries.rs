use async_graphql::{Context, Object};

use crate::http_server::graphql::context::{get_app_state, require_caller};
use crate::http_server::graphql::envelope::{output, paginated_output, respond};
use crate::http_server::graphql::guard::RoleGuard;
use crate::http_server::graphql::query_builder::{PageRequest, PaginationInput};
use crate::http_server::graphql::types::{Podcast, map_podcast};
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::podcast::PodcastService;

output!(PodcastOutput { podcast: Podcast });

output!(MyPodcastsOutput {
    podcasts: Vec<Podcast>
});

paginated_output!(GetAllPodcastsOutput { podcasts: Podcast });

paginated_output!(GetRecentlyPodcastOutput { podcasts: Podcast });

paginated_output!(GetPodcastsByCategoryOutput { podcasts: Podcast });

paginated_output!(SearchPodcastsOutput { podcasts: Podcast });

#[derive(Default)]
pub struct PodcastQuery;

#[Object]
impl PodcastQuery {
    async fn get_all_podcasts(
        &self,
        ctx: &Context<'_>,
        pagination: Option<PaginationInput>,
    ) -> GraphqlResult<GetAllPodcastsOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = PodcastService::new(db.clone());

        let result = service.list_all(PageRequest::from(pagination)).await;
        Ok(respond(result, |page| page.map(map_podcast).into()))
    }

    async fn get_podcast(&self, ctx: &Context<'_>, id: i32) -> GraphqlResult<PodcastOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = PodcastService::new(db.clone());

        let result = service.get(id).await;
        Ok(respond(result, |podcast| PodcastOutput {
            ok: true,
            podcast: Some(map_podcast(podcast)),
            ..Default::default()
        }))
    }

    async fn get_recently_podcast(
        &self,
        ctx: &Context<'_>,
        pagination: Option<PaginationInput>,
    ) -> GraphqlResult<GetRecentlyPodcastOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = PodcastService::new(db.clone());

        let result = service.list_recent(PageRequest::from(pagination)).await;
        Ok(respond(result, |page| page.map(map_podcast).into()))
    }

    async fn get_podcasts_by_category(
        &self,
        ctx: &Context<'_>,
        category: String,
        pagination: Option<PaginationInput>,
    ) -> GraphqlResult<GetPodcastsByCategoryOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = PodcastService::new(db.clone());

        let result = service
            .list_by_category(&category, PageRequest::from(pagination))
            .await;
        Ok(respond(result, |page| page.map(map_podcast).into()))
    }

    /// Case-insensitive substring match on podcast titles.
    async fn search_podcast_by_title(
        &self,
        ctx: &Context<'_>,
        title: String,
        pagination: Option<PaginationInput>,
    ) -> GraphqlResult<SearchPodcastsOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = PodcastService::new(db.clone());

        let result = service
            .search_by_title(&title, PageRequest::from(pagination))
            .await;
        Ok(respond(result, |page| page.map(map_podcast).into()))
    }

    #[graphql(guard = "RoleGuard::any()")]
    async fn get_my_podcasts(&self, ctx: &Context<'_>) -> GraphqlResult<MyPodcastsOutput> {
        let db = &get_app_state(ctx)?.db;
        let caller = require_caller(ctx)?;
        let service = PodcastService::new(db.clone());

        let result = service.list_for_host(caller).await;
        Ok(respond(result, |podcasts| MyPodcastsOutput {
            ok: true,
            podcasts: Some(podcasts.into_iter().map(map_podcast).collect()),
            ..Default::default()
        }))
    }
}
