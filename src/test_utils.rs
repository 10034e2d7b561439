use std::sync::Arc;

use sea_orm::{ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, Database as SeaDatabase, Set};

use crate::database::Database;
use crate::entities;
use crate::entities::user::UserRole;
use crate::services::user::Caller;

pub async fn test_db() -> Arc<Database> {
    let conn = SeaDatabase::connect("sqlite::memory:?mode=rwc")
        .await
        .unwrap();

    // Enable foreign keys
    conn.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .unwrap();

    Arc::new(Database::from_connection(conn, None).await.unwrap())
}

pub fn caller(user: &entities::user::Model) -> Caller {
    Caller::from(user.clone())
}

pub async fn insert_user(db: &Database, email: &str, role: UserRole) -> entities::user::Model {
    let user = entities::user::ActiveModel {
        email: Set(email.into()),
        password: Set("not-a-real-hash".into()),
        role: Set(role),
        ..entities::user::ActiveModel::new()
    };
    user.insert(&db.conn).await.unwrap()
}

pub async fn insert_podcast(
    db: &Database,
    host_id: i32,
    title: &str,
    category: &str,
) -> entities::podcast::Model {
    let podcast = entities::podcast::ActiveModel {
        title: Set(title.into()),
        category: Set(category.into()),
        description: Set(format!("All about {}", title)),
        thumbnail: Set(None),
        host_id: Set(host_id),
        ..entities::podcast::ActiveModel::new()
    };
    podcast.insert(&db.conn).await.unwrap()
}

pub async fn insert_episode(db: &Database, podcast_id: i32, title: &str) -> entities::episode::Model {
    let episode = entities::episode::ActiveModel {
        title: Set(title.into()),
        description: Set(None),
        category: Set("Tech".into()),
        url: Set(None),
        play_length: Set(Some(1800)),
        podcast_id: Set(podcast_id),
        ..entities::episode::ActiveModel::new()
    };
    episode.insert(&db.conn).await.unwrap()
}

pub async fn subscribe(db: &Database, podcast_id: i32, user_id: i32) {
    let row = entities::podcast_listener::ActiveModel {
        podcast_id: Set(podcast_id),
        user_id: Set(user_id),
        ..entities::podcast_listener::ActiveModel::new()
    };
    row.insert(&db.conn).await.unwrap();
}
