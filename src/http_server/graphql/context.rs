use std::sync::Arc;

use async_graphql::Context;

use crate::http_server::{graphql_error::GraphqlError, state::AppState};
use crate::services::user::Caller;

pub fn get_app_state<'a>(ctx: &Context<'a>) -> Result<&'a Arc<AppState>, GraphqlError> {
    ctx.data::<Arc<AppState>>()
        .map_err(|_| GraphqlError::FailedToGetAppState)
}

/// The user the request was made on behalf of, if any.
pub fn get_caller<'a>(ctx: &Context<'a>) -> Option<&'a Caller> {
    ctx.data_opt::<Caller>()
}

/// Like [`get_caller`], for resolvers that cannot run anonymously.
pub fn require_caller<'a>(ctx: &Context<'a>) -> Result<&'a Caller, GraphqlError> {
    get_caller(ctx).ok_or(GraphqlError::LoginRequired)
}
