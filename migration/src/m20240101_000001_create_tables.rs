use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(
                        ColumnDef::new(Users::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Podcasts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Podcasts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Podcasts::Title).string().not_null())
                    .col(ColumnDef::new(Podcasts::Category).string().not_null())
                    .col(ColumnDef::new(Podcasts::Description).text().not_null())
                    .col(ColumnDef::new(Podcasts::Thumbnail).string())
                    .col(ColumnDef::new(Podcasts::HostId).integer().not_null())
                    .col(
                        ColumnDef::new(Podcasts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Podcasts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_podcasts_host_id")
                            .from(Podcasts::Table, Podcasts::HostId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Episodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Episodes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Episodes::Title).string().not_null())
                    .col(ColumnDef::new(Episodes::Description).text())
                    .col(ColumnDef::new(Episodes::Category).string().not_null())
                    .col(ColumnDef::new(Episodes::Url).string())
                    .col(ColumnDef::new(Episodes::PlayLength).integer())
                    .col(ColumnDef::new(Episodes::PodcastId).integer().not_null())
                    .col(
                        ColumnDef::new(Episodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Episodes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_episodes_podcast_id")
                            .from(Episodes::Table, Episodes::PodcastId)
                            .to(Podcasts::Table, Podcasts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::Content).text().not_null())
                    .col(ColumnDef::new(Reviews::Rating).integer().not_null())
                    .col(ColumnDef::new(Reviews::PodcastId).integer().not_null())
                    .col(ColumnDef::new(Reviews::ReviewerId).integer().not_null())
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reviews::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_podcast_id")
                            .from(Reviews::Table, Reviews::PodcastId)
                            .to(Podcasts::Table, Podcasts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reviews_reviewer_id")
                            .from(Reviews::Table, Reviews::ReviewerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One review per (podcast, reviewer)
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_podcast_reviewer")
                    .table(Reviews::Table)
                    .col(Reviews::PodcastId)
                    .col(Reviews::ReviewerId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PodcastListeners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PodcastListeners::PodcastId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PodcastListeners::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(PodcastListeners::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(PodcastListeners::PodcastId)
                            .col(PodcastListeners::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_podcast_listeners_podcast_id")
                            .from(PodcastListeners::Table, PodcastListeners::PodcastId)
                            .to(Podcasts::Table, Podcasts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_podcast_listeners_user_id")
                            .from(PodcastListeners::Table, PodcastListeners::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EpisodeSeenUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EpisodeSeenUsers::EpisodeId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EpisodeSeenUsers::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(EpisodeSeenUsers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EpisodeSeenUsers::EpisodeId)
                            .col(EpisodeSeenUsers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_episode_seen_users_episode_id")
                            .from(EpisodeSeenUsers::Table, EpisodeSeenUsers::EpisodeId)
                            .to(Episodes::Table, Episodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_episode_seen_users_user_id")
                            .from(EpisodeSeenUsers::Table, EpisodeSeenUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(EpisodeSeenUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PodcastListeners::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Episodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Podcasts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Password,
    Role,
    Verified,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Podcasts {
    Table,
    Id,
    Title,
    Category,
    Description,
    Thumbnail,
    HostId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Episodes {
    Table,
    Id,
    Title,
    Description,
    Category,
    Url,
    PlayLength,
    PodcastId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    Content,
    Rating,
    PodcastId,
    ReviewerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PodcastListeners {
    Table,
    PodcastId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EpisodeSeenUsers {
    Table,
    EpisodeId,
    UserId,
    CreatedAt,
}
