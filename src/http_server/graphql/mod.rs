use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptySubscription, MergedObject, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use axum::Extension;

use crate::http_server::state::AppState;
use crate::services::user::{Caller, UserService};

mod context;
pub mod envelope;
pub mod episode_mutations;
pub mod episode_queries;
mod guard;
pub mod listener_mutations;
pub mod listener_queries;
pub mod podcast_mutations;
pub mod podcast_queries;
pub mod query_builder;
pub mod seed_mutations;
pub mod types;

use episode_mutations::EpisodeMutation;
use episode_queries::EpisodeQuery;
use listener_mutations::ListenerMutation;
use listener_queries::ListenerQuery;
use podcast_mutations::PodcastMutation;
use podcast_queries::PodcastQuery;
use seed_mutations::SeedMutation;

#[derive(Default, MergedObject)]
pub struct Query(PodcastQuery, EpisodeQuery, ListenerQuery);

#[derive(Default, MergedObject)]
pub struct Mutation(PodcastMutation, EpisodeMutation, ListenerMutation, SeedMutation);

pub type AppSchema = Schema<Query, Mutation, EmptySubscription>;

pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

pub fn create_schema(app_state: Arc<AppState>) -> AppSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(app_state)
        .finish()
}

/// Execute a GraphQL request on behalf of the user named by the identity header.
pub async fn graphql_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(schema): Extension<AppSchema>,
    headers: HeaderMap,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let Some(caller) = resolve_caller(&app_state, &headers).await {
        request = request.data(caller);
    }

    schema.execute(request).await.into()
}

/// Missing, malformed or unknown ids leave the request anonymous.
async fn resolve_caller(app_state: &AppState, headers: &HeaderMap) -> Option<Caller> {
    let raw = headers.get(app_state.identity_header.as_str())?;
    let user_id = match raw.to_str().ok().and_then(|v| v.trim().parse::<i32>().ok()) {
        Some(id) => id,
        None => {
            log::debug!("Ignoring malformed {} header", app_state.identity_header);
            return None;
        }
    };

    match UserService::new(app_state.db.clone()).find_caller(user_id).await {
        Ok(caller) => caller,
        Err(e) => {
            log::error!("Failed to resolve caller {}: {:?}", user_id, e);
            None
        }
    }
}
