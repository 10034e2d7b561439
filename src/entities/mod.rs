pub mod episode;
pub mod episode_seen_user;
pub mod podcast;
pub mod podcast_listener;
pub mod review;
pub mod user;
