//! Demo data generation.
//!
//! Every seeding run happens in a single transaction. Values that would violate a
//! unique constraint (a repeated email, a second review of the same podcast by the
//! same listener) are skipped rather than failing the run.

pub mod faker;

use std::collections::HashSet;
use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::database::Database;
use crate::entities;
use crate::entities::user::UserRole;
use crate::ports::fake_data::FakeDataSource;
use crate::services::{ServiceError, ServiceResult};

pub const CATEGORIES: &[&str] = &[
    "Book",
    "Design",
    "Fashion",
    "Food",
    "Careers",
    "Management",
    "Marketing",
    "Non-Profit",
    "Comedy",
    "Stand-up",
    "Courses",
    "Education",
    "Howto",
    "Language",
    "Fiction",
    "Drama",
    "History",
    "Health&Fitness",
    "Medicine",
    "Mental Health",
    "Sexuality",
    "Education for kids",
    "Parenting",
    "Music",
    "Animation",
    "Video Games",
    "Politics",
    "Tech",
    "Sports",
    "Science",
    "Nature",
    "Physics",
    "Social Science",
    "Baseball",
    "Basketball",
    "Film History",
    "Film Reviews",
    "Technology",
];

pub const THUMBNAIL_BASE_URL: &str = "https://static.podcast-api.dev/thumbnails/";

const MAX_LISTENERS_PER_PODCAST: u32 = 30;
const MAX_SEEN_USERS_PER_EPISODE: u32 = 20;
const MAX_PLAY_LENGTH_SECS: u32 = 60 * 60 * 3;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub podcasts: u64,
    pub episodes: u64,
}

pub struct SeedService<F: FakeDataSource> {
    db: Arc<Database>,
    faker: F,
}

impl<F: FakeDataSource> SeedService<F> {
    pub fn new(db: Arc<Database>, faker: F) -> Self {
        Self { db, faker }
    }

    /// Create up to `num_users` users with a random role. Returns how many were stored.
    #[instrument(skip(self))]
    pub async fn seed_users(&self, num_users: u32) -> ServiceResult<u64> {
        let txn = self.db.conn.begin().await?;

        let existing: Vec<String> = entities::user::Entity::find()
            .select_only()
            .column(entities::user::Column::Email)
            .into_tuple()
            .all(&txn)
            .await?;
        let mut emails: HashSet<String> = existing.into_iter().collect();

        let mut created = 0;
        for _ in 0..num_users {
            let email = self.faker.email();
            if !emails.insert(email.clone()) {
                log::debug!("Skipping duplicate seed email {}", email);
                continue;
            }

            let role = if self.faker.coin_flip() {
                UserRole::Host
            } else {
                UserRole::Listener
            };

            let user = entities::user::ActiveModel {
                email: Set(email),
                password: Set(hash_password(&self.faker.password())),
                role: Set(role),
                ..entities::user::ActiveModel::new()
            };
            user.insert(&txn).await?;
            created += 1;
        }

        txn.commit().await?;
        log::info!("Seeded {} users", created);
        Ok(created)
    }

    /// Create `num_podcasts` podcasts, each with between `min_episodes` and
    /// `max_episodes` episodes, random listeners and random seen users.
    #[instrument(skip(self))]
    pub async fn seed_podcasts_and_episodes(
        &self,
        num_podcasts: u32,
        min_episodes: u32,
        max_episodes: u32,
    ) -> ServiceResult<SeedSummary> {
        if min_episodes > max_episodes {
            return Err(ServiceError::InvalidSeedRange {
                min: min_episodes,
                max: max_episodes,
            });
        }

        let hosts = users_with_role(&self.db.conn, UserRole::Host).await?;
        if hosts.is_empty() {
            return Err(ServiceError::NoHosts);
        }
        let listeners = users_with_role(&self.db.conn, UserRole::Listener).await?;
        if listeners.is_empty() {
            return Err(ServiceError::NoListeners("podcast"));
        }

        let txn = self.db.conn.begin().await?;

        let mut summary = SeedSummary::default();
        for _ in 0..num_podcasts {
            let host = &hosts[self.pick(hosts.len())];
            let podcast = entities::podcast::ActiveModel {
                title: Set(self.faker.words(3, 10)),
                category: Set(self.category()),
                description: Set(self.faker.paragraph(4, 8)),
                thumbnail: Set(Some(format!(
                    "{}podcast{}.jpg",
                    THUMBNAIL_BASE_URL,
                    self.faker.number_between(1, 30)
                ))),
                host_id: Set(host.id),
                ..entities::podcast::ActiveModel::new()
            }
            .insert(&txn)
            .await?;
            summary.podcasts += 1;

            let amount = self.faker.number_between(1, MAX_LISTENERS_PER_PODCAST) as usize;
            for idx in self.faker.sample_indices(listeners.len(), amount) {
                entities::podcast_listener::ActiveModel {
                    podcast_id: Set(podcast.id),
                    user_id: Set(listeners[idx].id),
                    ..entities::podcast_listener::ActiveModel::new()
                }
                .insert(&txn)
                .await?;
            }

            let num_episodes = self.faker.number_between(min_episodes, max_episodes);
            for _ in 0..num_episodes {
                self.seed_episode(&txn, podcast.id, &listeners).await?;
                summary.episodes += 1;
            }
        }

        txn.commit().await?;
        log::info!(
            "Seeded {} podcasts with {} episodes",
            summary.podcasts,
            summary.episodes
        );
        Ok(summary)
    }

    /// Give every podcast reviews from a random set of distinct listeners.
    #[instrument(skip(self))]
    pub async fn seed_reviews(&self) -> ServiceResult<u64> {
        let listeners = users_with_role(&self.db.conn, UserRole::Listener).await?;
        if listeners.is_empty() {
            return Err(ServiceError::NoListeners("reviews"));
        }
        let podcasts = entities::podcast::Entity::find()
            .order_by_asc(entities::podcast::Column::Id)
            .all(&self.db.conn)
            .await?;
        if podcasts.is_empty() {
            return Err(ServiceError::NoPodcasts);
        }

        let txn = self.db.conn.begin().await?;

        let existing: Vec<(i32, i32)> = entities::review::Entity::find()
            .select_only()
            .column(entities::review::Column::PodcastId)
            .column(entities::review::Column::ReviewerId)
            .into_tuple()
            .all(&txn)
            .await?;
        let mut reviewed: HashSet<(i32, i32)> = existing.into_iter().collect();

        let mut created = 0;
        for podcast in &podcasts {
            let amount = self.faker.number_between(1, listeners.len() as u32) as usize;
            for idx in self.faker.sample_indices(listeners.len(), amount) {
                let reviewer = &listeners[idx];
                if !reviewed.insert((podcast.id, reviewer.id)) {
                    continue;
                }

                entities::review::ActiveModel {
                    content: Set(self.faker.lines(1, 3)),
                    rating: Set(self.faker.number_between(1, 5) as i32),
                    podcast_id: Set(podcast.id),
                    reviewer_id: Set(reviewer.id),
                    ..entities::review::ActiveModel::new()
                }
                .insert(&txn)
                .await?;
                created += 1;
            }
        }

        txn.commit().await?;
        log::info!("Seeded {} reviews across {} podcasts", created, podcasts.len());
        Ok(created)
    }

    async fn seed_episode(
        &self,
        txn: &DatabaseTransaction,
        podcast_id: i32,
        listeners: &[entities::user::Model],
    ) -> ServiceResult<()> {
        let episode = entities::episode::ActiveModel {
            title: Set(self.faker.words(3, 10)),
            description: Set(Some(self.faker.paragraph(3, 4))),
            category: Set(self.category()),
            url: Set(None),
            play_length: Set(Some(self.faker.number_between(30, MAX_PLAY_LENGTH_SECS) as i32)),
            podcast_id: Set(podcast_id),
            ..entities::episode::ActiveModel::new()
        }
        .insert(txn)
        .await?;

        let amount = self.faker.number_between(1, MAX_SEEN_USERS_PER_EPISODE) as usize;
        for idx in self.faker.sample_indices(listeners.len(), amount) {
            entities::episode_seen_user::ActiveModel {
                episode_id: Set(episode.id),
                user_id: Set(listeners[idx].id),
                ..entities::episode_seen_user::ActiveModel::new()
            }
            .insert(txn)
            .await?;
        }

        Ok(())
    }

    fn pick(&self, len: usize) -> usize {
        let last = len.saturating_sub(1) as u32;
        (self.faker.number_between(0, last) as usize).min(len.saturating_sub(1))
    }

    fn category(&self) -> String {
        CATEGORIES[self.pick(CATEGORIES.len())].to_string()
    }
}

async fn users_with_role(
    conn: &DatabaseConnection,
    role: UserRole,
) -> ServiceResult<Vec<entities::user::Model>> {
    let users = entities::user::Entity::find()
        .filter(entities::user::Column::Role.eq(role))
        .order_by_asc(entities::user::Column::Id)
        .all(conn)
        .await?;
    Ok(users)
}

/// Seeded accounts are not meant for signing in; the stored value only has to
/// look like a digest.
fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use sea_orm::PaginatorTrait;

    use super::*;
    use crate::ports::fake_data::MockFakeDataSource;
    use crate::test_utils::{insert_podcast, insert_user, test_db};

    /// A mock that always picks the lowest value and every index it is offered.
    fn predictable_faker() -> MockFakeDataSource {
        let counter = AtomicU32::new(0);
        let mut faker = MockFakeDataSource::new();
        faker.expect_email().returning(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            format!("seed{}@example.com", n)
        });
        faker.expect_password().returning(|| "hunter22".to_string());
        faker
            .expect_words()
            .returning(|min, _| vec!["lorem"; min].join(" "));
        faker
            .expect_paragraph()
            .returning(|_, _| "Lorem ipsum dolor sit amet.".to_string());
        faker
            .expect_lines()
            .returning(|_, _| "Nice show.".to_string());
        faker.expect_number_between().returning(|min, _| min);
        faker
            .expect_sample_indices()
            .returning(|len, amount| (0..amount.min(len)).collect());
        faker
    }

    #[tokio::test]
    async fn test_seed_users_alternates_roles() {
        let db = test_db().await;
        let mut faker = predictable_faker();
        let flips = AtomicU32::new(0);
        faker
            .expect_coin_flip()
            .returning(move || flips.fetch_add(1, Ordering::SeqCst) % 2 == 0);

        let service = SeedService::new(db.clone(), faker);
        let created = service.seed_users(4).await.unwrap();
        assert_eq!(created, 4);

        let hosts = users_with_role_count(&db, UserRole::Host).await;
        let listeners = users_with_role_count(&db, UserRole::Listener).await;
        assert_eq!(hosts, 2);
        assert_eq!(listeners, 2);

        let user = entities::user::Entity::find().one(&db.conn).await.unwrap().unwrap();
        assert_eq!(user.password, hash_password("hunter22"));
        assert_ne!(user.password, "hunter22");
    }

    #[tokio::test]
    async fn test_seed_users_skips_duplicate_emails() {
        let db = test_db().await;
        insert_user(&db, "taken@example.com", UserRole::Host).await;

        let mut faker = MockFakeDataSource::new();
        faker
            .expect_email()
            .returning(|| "taken@example.com".to_string());
        faker.expect_password().returning(|| "pw".to_string());
        faker.expect_coin_flip().returning(|| true);

        let service = SeedService::new(db.clone(), faker);
        assert_eq!(service.seed_users(3).await.unwrap(), 0);
        assert_eq!(
            entities::user::Entity::find().count(&db.conn).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_seed_podcasts_requires_hosts_and_listeners() {
        let db = test_db().await;
        let service = SeedService::new(db.clone(), predictable_faker());

        let err = service.seed_podcasts_and_episodes(1, 1, 1).await.unwrap_err();
        assert_eq!(err.to_string(), "No hosts. Cannot seed podcast");

        insert_user(&db, "host@example.com", UserRole::Host).await;
        let err = service.seed_podcasts_and_episodes(1, 1, 1).await.unwrap_err();
        assert_eq!(err.to_string(), "No listeners. Cannot seed podcast");
    }

    #[tokio::test]
    async fn test_seed_podcasts_rejects_inverted_range() {
        let db = test_db().await;
        let service = SeedService::new(db, predictable_faker());

        let err = service.seed_podcasts_and_episodes(1, 5, 2).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidSeedRange { min: 5, max: 2 }));
    }

    #[tokio::test]
    async fn test_seed_podcasts_and_episodes() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        insert_user(&db, "a@example.com", UserRole::Listener).await;
        insert_user(&db, "b@example.com", UserRole::Listener).await;

        let service = SeedService::new(db.clone(), predictable_faker());
        let summary = service.seed_podcasts_and_episodes(2, 3, 6).await.unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                podcasts: 2,
                episodes: 6
            }
        );

        let podcasts = entities::podcast::Entity::find().all(&db.conn).await.unwrap();
        assert_eq!(podcasts.len(), 2);
        assert!(podcasts.iter().all(|p| p.host_id == host.id));
        assert_eq!(podcasts[0].title, "lorem lorem lorem");
        assert_eq!(podcasts[0].category, CATEGORIES[0]);
        assert_eq!(
            podcasts[0].thumbnail.as_deref(),
            Some(format!("{}podcast1.jpg", THUMBNAIL_BASE_URL).as_str())
        );

        // number_between returns the minimum, so one listener and one seen user each
        assert_eq!(
            entities::podcast_listener::Entity::find()
                .count(&db.conn)
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            entities::episode_seen_user::Entity::find()
                .count(&db.conn)
                .await
                .unwrap(),
            6
        );
        let episode = entities::episode::Entity::find().one(&db.conn).await.unwrap().unwrap();
        assert_eq!(episode.play_length, Some(30));
    }

    #[tokio::test]
    async fn test_seed_reviews_preconditions() {
        let db = test_db().await;
        let service = SeedService::new(db.clone(), predictable_faker());

        let err = service.seed_reviews().await.unwrap_err();
        assert_eq!(err.to_string(), "No listeners. Cannot seed reviews");

        insert_user(&db, "l@example.com", UserRole::Listener).await;
        let err = service.seed_reviews().await.unwrap_err();
        assert_eq!(err.to_string(), "No podcasts. Cannot seed reviews");
    }

    #[tokio::test]
    async fn test_seed_reviews_is_repeatable() {
        let db = test_db().await;
        let host = insert_user(&db, "host@example.com", UserRole::Host).await;
        insert_user(&db, "a@example.com", UserRole::Listener).await;
        insert_podcast(&db, host.id, "One", "Tech").await;
        insert_podcast(&db, host.id, "Two", "Tech").await;

        let service = SeedService::new(db.clone(), predictable_faker());
        assert_eq!(service.seed_reviews().await.unwrap(), 2);
        // The only listener already reviewed both podcasts
        assert_eq!(service.seed_reviews().await.unwrap(), 0);

        let reviews = entities::review::Entity::find().all(&db.conn).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|r| r.rating == 1));
    }

    async fn users_with_role_count(db: &Database, role: UserRole) -> u64 {
        entities::user::Entity::find()
            .filter(entities::user::Column::Role.eq(role))
            .count(&db.conn)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_category_covers_whole_list() {
        let mut faker = MockFakeDataSource::new();
        let picks = [20u32, 999];
        let calls = AtomicU32::new(0);
        faker.expect_number_between().returning(move |_, max| {
            assert_eq!(max as usize, CATEGORIES.len() - 1);
            picks[calls.fetch_add(1, Ordering::SeqCst) as usize]
        });
        let seeder = SeedService::new(test_db().await, faker);

        assert_eq!(CATEGORIES.len(), 38);
        assert_eq!(seeder.category(), "Sexuality");
        assert_eq!(seeder.category(), "Technology");
    }
}
