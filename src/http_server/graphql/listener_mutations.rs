use async_graphql::{Context, InputObject, Object};

use crate::entities::user::UserRole;
use crate::http_server::graphql::context::{get_app_state, require_caller};
use crate::http_server::graphql::envelope::{output, respond};
use crate::http_server::graphql::guard::RoleGuard;
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::review::{NewReview, ReviewService};
use crate::services::subscription::SubscriptionService;

#[derive(Debug, Clone, InputObject)]
pub struct ReviewPodcastInput {
    pub podcast_id: i32,
    pub content: String,
    /// 1 to 5
    pub rating: i32,
}

impl From<ReviewPodcastInput> for NewReview {
    fn from(input: ReviewPodcastInput) -> Self {
        Self {
            podcast_id: input.podcast_id,
            content: input.content,
            rating: input.rating,
        }
    }
}

output!(ToggleSubscriptionOutput { result: String });

output!(ReviewPodcastOutput { id: i32 });

#[derive(Default)]
pub struct ListenerMutation;

#[Object]
impl ListenerMutation {
    /// Subscribe when not subscribed, unsubscribe otherwise.
    #[graphql(guard = "RoleGuard::new(UserRole::Listener)")]
    async fn toggle_subscription(
        &self,
        ctx: &Context<'_>,
        podcast_id: i32,
    ) -> GraphqlResult<ToggleSubscriptionOutput> {
        let db = &get_app_state(ctx)?.db;
        let listener = require_caller(ctx)?;
        let service = SubscriptionService::new(db.clone());

        let result = service.toggle(listener, podcast_id).await;
        Ok(respond(result, |message| ToggleSubscriptionOutput {
            ok: true,
            result: Some(message),
            ..Default::default()
        }))
    }

    #[graphql(guard = "RoleGuard::new(UserRole::Listener)")]
    async fn review_podcast(
        &self,
        ctx: &Context<'_>,
        input: ReviewPodcastInput,
    ) -> GraphqlResult<ReviewPodcastOutput> {
        let db = &get_app_state(ctx)?.db;
        let reviewer = require_caller(ctx)?;
        let service = ReviewService::new(db.clone());

        let result = service.create(reviewer, input.into()).await;
        Ok(respond(result, |id| ReviewPodcastOutput {
            ok: true,
            id: Some(id),
            ..Default::default()
        }))
    }
}
