//! Ownership checks.
//!
//! A failed lookup never surfaces as an error here: a missing podcast or episode
//! (or a store failure) simply means the caller does not own it. Callers that need
//! to distinguish "not found" from "not owner" look the target up first.

use sea_orm::{DatabaseConnection, EntityTrait};

use crate::entities;
use crate::services::user::Caller;

pub async fn is_podcast_owner(conn: &DatabaseConnection, caller: &Caller, podcast_id: i32) -> bool {
    match entities::podcast::Entity::find_by_id(podcast_id).one(conn).await {
        Ok(Some(podcast)) => podcast.host_id == caller.id,
        Ok(None) => false,
        Err(e) => {
            log::warn!("Ownership lookup for podcast {} failed: {}", podcast_id, e);
            false
        }
    }
}

/// An episode is owned by the host of its parent podcast.
pub async fn is_episode_owner(conn: &DatabaseConnection, caller: &Caller, episode_id: i32) -> bool {
    let lookup = entities::episode::Entity::find_by_id(episode_id)
        .find_also_related(entities::podcast::Entity)
        .one(conn)
        .await;

    match lookup {
        Ok(Some((_, Some(podcast)))) => podcast.host_id == caller.id,
        Ok(_) => false,
        Err(e) => {
            log::warn!("Ownership lookup for episode {} failed: {}", episode_id, e);
            false
        }
    }
}
