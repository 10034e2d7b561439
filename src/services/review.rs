use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::http_server::graphql::query_builder::{Page, PageRequest, apply_pagination};
use crate::services::podcast::find_podcast;
use crate::services::user::Caller;
use crate::services::{ServiceError, ServiceResult, is_unique_violation};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone)]
pub struct NewReview {
    pub podcast_id: i32,
    pub content: String,
    pub rating: i32,
}

pub struct ReviewWithReviewer {
    pub review: entities::review::Model,
    pub reviewer: entities::user::Model,
}

pub fn validate_rating(rating: i32) -> ServiceResult<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ServiceError::InvalidRating(rating))
    }
}

pub struct ReviewService {
    db: Arc<Database>,
}

impl ReviewService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a review. A listener reviews each podcast at most once; a second
    /// attempt fails and leaves the first review untouched.
    #[instrument(skip(self, reviewer, input), fields(reviewer_id = reviewer.id, podcast_id = input.podcast_id))]
    pub async fn create(&self, reviewer: &Caller, input: NewReview) -> ServiceResult<i32> {
        find_podcast(&self.db.conn, input.podcast_id).await?;
        validate_rating(input.rating)?;

        if self.has_reviewed(reviewer.id, input.podcast_id).await? {
            return Err(ServiceError::AlreadyReviewed);
        }

        let review = entities::review::ActiveModel {
            content: Set(input.content),
            rating: Set(input.rating),
            podcast_id: Set(input.podcast_id),
            reviewer_id: Set(reviewer.id),
            ..entities::review::ActiveModel::new()
        };

        // The unique index catches a concurrent duplicate that slipped past the check above
        let model = review.insert(&self.db.conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::AlreadyReviewed
            } else {
                ServiceError::Database(e)
            }
        })?;

        log::info!(
            "Review {} stored for podcast {} by user {}",
            model.id,
            model.podcast_id,
            model.reviewer_id
        );
        Ok(model.id)
    }

    pub async fn list_for_podcast(
        &self,
        podcast_id: i32,
        request: PageRequest,
    ) -> ServiceResult<Page<ReviewWithReviewer>> {
        find_podcast(&self.db.conn, podcast_id).await?;

        let query = entities::review::Entity::find()
            .filter(entities::review::Column::PodcastId.eq(podcast_id))
            .order_by_desc(entities::review::Column::CreatedAt)
            .order_by_desc(entities::review::Column::Id);

        let total_count = query.clone().count(&self.db.conn).await?;
        let rows = apply_pagination(query, request)
            .find_also_related(entities::user::Entity)
            .all(&self.db.conn)
            .await?;

        let items = rows
            .into_iter()
            .filter_map(|(review, reviewer)| {
                reviewer.map(|reviewer| ReviewWithReviewer { review, reviewer })
            })
            .collect();

        Ok(Page::new(items, total_count, request))
    }

    pub async fn has_reviewed(&self, user_id: i32, podcast_id: i32) -> ServiceResult<bool> {
        let count = entities::review::Entity::find()
            .filter(entities::review::Column::PodcastId.eq(podcast_id))
            .filter(entities::review::Column::ReviewerId.eq(user_id))
            .count(&self.db.conn)
            .await?;

        Ok(count > 0)
    }
}
