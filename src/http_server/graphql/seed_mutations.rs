use async_graphql::{Context, InputObject, Object};

use crate::entities::user::UserRole;
use crate::http_server::graphql::context::get_app_state;
use crate::http_server::graphql::envelope::{output, respond, to_int};
use crate::http_server::graphql::guard::RoleGuard;
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::seed::SeedService;
use crate::services::seed::faker::FakerDataSource;

#[derive(Debug, Clone, InputObject)]
pub struct SeedPodcastAndEpisodeInput {
    #[graphql(validator(minimum = 0, maximum = 1000))]
    pub num_podcast: i32,
    #[graphql(validator(minimum = 0, maximum = 100))]
    pub min_episode: i32,
    #[graphql(validator(minimum = 0, maximum = 100))]
    pub max_episode: i32,
}

output!(SeedUsersOutput { created: i32 });

output!(SeedPodcastAndEpisodeOutput {
    podcasts: i32,
    episodes: i32,
});

output!(SeedReviewsOutput { created: i32 });

#[derive(Default)]
pub struct SeedMutation;

#[Object]
impl SeedMutation {
    #[graphql(guard = "RoleGuard::new(UserRole::Host)")]
    async fn seed_users(
        &self,
        ctx: &Context<'_>,
        #[graphql(validator(minimum = 0, maximum = 1000))] num_users: i32,
    ) -> GraphqlResult<SeedUsersOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = SeedService::new(db.clone(), FakerDataSource);

        let result = service.seed_users(num_users as u32).await;
        Ok(respond(result, |created| SeedUsersOutput {
            ok: true,
            created: Some(to_int(created)),
            ..Default::default()
        }))
    }

    #[graphql(guard = "RoleGuard::new(UserRole::Host)")]
    async fn seed_podcast_and_episode(
        &self,
        ctx: &Context<'_>,
        input: SeedPodcastAndEpisodeInput,
    ) -> GraphqlResult<SeedPodcastAndEpisodeOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = SeedService::new(db.clone(), FakerDataSource);

        let result = service
            .seed_podcasts_and_episodes(
                input.num_podcast as u32,
                input.min_episode as u32,
                input.max_episode as u32,
            )
            .await;
        Ok(respond(result, |summary| SeedPodcastAndEpisodeOutput {
            ok: true,
            podcasts: Some(to_int(summary.podcasts)),
            episodes: Some(to_int(summary.episodes)),
            ..Default::default()
        }))
    }

    #[graphql(guard = "RoleGuard::new(UserRole::Host)")]
    async fn seed_reviews(&self, ctx: &Context<'_>) -> GraphqlResult<SeedReviewsOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = SeedService::new(db.clone(), FakerDataSource);

        let result = service.seed_reviews().await;
        Ok(respond(result, |created| SeedReviewsOutput {
            ok: true,
            created: Some(to_int(created)),
            ..Default::default()
        }))
    }
}
