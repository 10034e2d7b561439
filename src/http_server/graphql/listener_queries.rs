use async_graphql::{Context, Object};

use crate::entities::user::UserRole;
use crate::http_server::graphql::context::{get_app_state, get_caller, require_caller};
use crate::http_server::graphql::envelope::{paginated_output, respond};
use crate::http_server::graphql::guard::RoleGuard;
use crate::http_server::graphql::query_builder::{PageRequest, PaginationInput};
use crate::http_server::graphql::types::{
    Episode, Podcast, Review, User, map_episode, map_podcast, map_review, map_user,
};
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::review::ReviewService;
use crate::services::subscription::SubscriptionService;
use crate::services::user::UserService;

paginated_output!(SeeSubscriptionsOutput { podcasts: Podcast });

paginated_output!(GetFeedsOutput { episodes: Episode });

paginated_output!(PodcastListenersOutput { listeners: User });

paginated_output!(SeePodcastReviewsOutput { reviews: Review });

#[derive(Default)]
pub struct ListenerQuery;

#[Object]
impl ListenerQuery {
    /// The caller, or null for anonymous requests.
    async fn me(&self, ctx: &Context<'_>) -> GraphqlResult<Option<User>> {
        let Some(caller) = get_caller(ctx) else {
            return Ok(None);
        };

        let db = &get_app_state(ctx)?.db;
        let user = UserService::new(db.clone()).find(caller.id).await?;
        Ok(user.map(map_user))
    }

    #[graphql(guard = "RoleGuard::new(UserRole::Listener)")]
    async fn see_subscriptions(
        &self,
        ctx: &Context<'_>,
        pagination: Option<PaginationInput>,
    ) -> GraphqlResult<SeeSubscriptionsOutput> {
        let db = &get_app_state(ctx)?.db;
        let listener = require_caller(ctx)?;
        let service = SubscriptionService::new(db.clone());

        let result = service
            .list_subscriptions(listener, PageRequest::from(pagination))
            .await;
        Ok(respond(result, |page| page.map(map_podcast).into()))
    }

    /// Newest episodes across the caller's subscriptions.
    #[graphql(guard = "RoleGuard::new(UserRole::Listener)")]
    async fn get_my_feeds(
        &self,
        ctx: &Context<'_>,
        pagination: Option<PaginationInput>,
    ) -> GraphqlResult<GetFeedsOutput> {
        let db = &get_app_state(ctx)?.db;
        let listener = require_caller(ctx)?;
        let service = SubscriptionService::new(db.clone());

        let result = service.feed(listener, PageRequest::from(pagination)).await;
        Ok(respond(result, |page| page.map(map_episode).into()))
    }

    async fn get_podcast_listeners(
        &self,
        ctx: &Context<'_>,
        podcast_id: i32,
        pagination: Option<PaginationInput>,
    ) -> GraphqlResult<PodcastListenersOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = SubscriptionService::new(db.clone());

        let result = service
            .list_listeners(podcast_id, PageRequest::from(pagination))
            .await;
        Ok(respond(result, |page| page.map(map_user).into()))
    }

    async fn see_podcast_reviews(
        &self,
        ctx: &Context<'_>,
        podcast_id: i32,
        pagination: Option<PaginationInput>,
    ) -> GraphqlResult<SeePodcastReviewsOutput> {
        let db = &get_app_state(ctx)?.db;
        let service = ReviewService::new(db.clone());

        let result = service
            .list_for_podcast(podcast_id, PageRequest::from(pagination))
            .await;
        Ok(respond(result, |page| page.map(map_review).into()))
    }
}
