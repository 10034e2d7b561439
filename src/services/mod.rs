pub mod authorization;
pub mod episode;
pub mod playback;
pub mod podcast;
pub mod review;
pub mod seed;
pub mod subscription;
pub mod user;

use sea_orm::{DbErr, SqlErr};

/// Failures a service method can report to its caller.
///
/// Everything except [`ServiceError::Database`] is a business-rule failure whose
/// message is safe to show to API clients. Database failures always render as a
/// generic message; the underlying error is only logged.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Podcast with id {0} not found")]
    PodcastNotFound(i32),
    #[error("Episode with id {0} not found")]
    EpisodeNotFound(i32),
    #[error("This episode doesn't belong to podcast id: {podcast_id}")]
    EpisodeNotInPodcast { episode_id: i32, podcast_id: i32 },
    #[error("You are not owner of this")]
    NotOwner,
    #[error("You are not a host. Cannot fetch podcast.")]
    NotHost,
    #[error("Already reviewed this podcast.")]
    AlreadyReviewed,
    #[error("Rating must be between 1 and 5")]
    InvalidRating(i32),
    #[error("No hosts. Cannot seed podcast")]
    NoHosts,
    #[error("No listeners. Cannot seed {0}")]
    NoListeners(&'static str),
    #[error("No podcasts. Cannot seed reviews")]
    NoPodcasts,
    #[error("minEpisode ({min}) must not be greater than maxEpisode ({max})")]
    InvalidSeedRange { min: u32, max: u32 },
    #[error("Internal server error occurred.")]
    Database(#[from] DbErr),
}

impl ServiceError {
    pub fn is_internal(&self) -> bool {
        matches!(self, ServiceError::Database(_))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// True when the store rejected a write because of a unique constraint.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
