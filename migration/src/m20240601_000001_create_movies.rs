use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Titles repeat across genres and re-releases, so there is no key on them.
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(string(Movies::Title))
                    .col(string(Movies::Genre))
                    .col(double_null(Movies::Rating))
                    .col(big_integer_null(Movies::Votes))
                    .col(double_null(Movies::Duration))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_genre_rating")
                    .table(Movies::Table)
                    .col(Movies::Genre)
                    .col(Movies::Rating)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    #[sea_orm(iden = "Movies")]
    Table,
    #[sea_orm(iden = "Title")]
    Title,
    #[sea_orm(iden = "Genre")]
    Genre,
    #[sea_orm(iden = "Rating")]
    Rating,
    #[sea_orm(iden = "Votes")]
    Votes,
    #[sea_orm(iden = "Duration")]
    Duration,
}
