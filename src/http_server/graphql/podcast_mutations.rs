use async_graphql::{Context, InputObject, Object};

use crate::entities::user::UserRole;
use crate::http_server::graphql::context::{get_app_state, require_caller};
use crate::http_server::graphql::envelope::{CoreOutput, output, respond};
use crate::http_server::graphql::guard::RoleGuard;
use crate::http_server::graphql_error::GraphqlResult;
use crate::services::podcast::{NewPodcast, PodcastChanges, PodcastService};

#[derive(Debug, Clone, InputObject)]
pub struct CreatePodcastInput {
    pub title: String,
    pub category: String,
    pub description: String,
    pub thumbnail: Option<String>,
}

impl From<CreatePodcastInput> for NewPodcast {
    fn from(input: CreatePodcastInput) -> Self {
        Self {
            title: input.title,
            category: input.category,
            description: input.description,
            thumbnail: input.thumbnail,
        }
    }
}

#[derive(Debug, Clone, InputObject)]
pub struct UpdatePodcastInput {
    pub podcast_id: i32,
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

impl From<UpdatePodcastInput> for PodcastChanges {
    fn from(input: UpdatePodcastInput) -> Self {
        Self {
            title: input.title,
            category: input.category,
            description: input.description,
            thumbnail: input.thumbnail,
        }
    }
}

output!(CreatePodcastOutput { id: i32 });

#[derive(Default)]
pub struct PodcastMutation;

#[Object]
impl PodcastMutation {
    #[graphql(guard = "RoleGuard::new(UserRole::Host)")]
    async fn create_podcast(
        &self,
        ctx: &Context<'_>,
        input: CreatePodcastInput,
    ) -> GraphqlResult<CreatePodcastOutput> {
        let db = &get_app_state(ctx)?.db;
        let host = require_caller(ctx)?;
        let service = PodcastService::new(db.clone());

        let result = service.create(host, input.into()).await;
        Ok(respond(result, |id| CreatePodcastOutput {
            ok: true,
            id: Some(id),
            ..Default::default()
        }))
    }

    /// Overwrite the provided fields of a podcast the caller hosts.
    #[graphql(guard = "RoleGuard::new(UserRole::Host)")]
    async fn update_podcast(
        &self,
        ctx: &Context<'_>,
        input: UpdatePodcastInput,
    ) -> GraphqlResult<CoreOutput> {
        let db = &get_app_state(ctx)?.db;
        let host = require_caller(ctx)?;
        let service = PodcastService::new(db.clone());

        let podcast_id = input.podcast_id;
        let result = service.update(host, podcast_id, input.into()).await;
        Ok(respond(result, |_| CoreOutput::success()))
    }

    #[graphql(guard = "RoleGuard::new(UserRole::Host)")]
    async fn delete_podcast(&self, ctx: &Context<'_>, id: i32) -> GraphqlResult<CoreOutput> {
        let db = &get_app_state(ctx)?.db;
        let host = require_caller(ctx)?;
        let service = PodcastService::new(db.clone());

        let result = service.delete(host, id).await;
        Ok(respond(result, |_| CoreOutput::success()))
    }
}
