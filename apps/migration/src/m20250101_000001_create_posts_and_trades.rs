use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::UserId).uuid().not_null())
                    .col(ColumnDef::new(Posts::Title).string().not_null())
                    .col(ColumnDef::new(Posts::Description).text().not_null())
                    .col(ColumnDef::new(Posts::PhotoUrls).json_binary().not_null())
                    .col(ColumnDef::new(Posts::Tags).json_binary().not_null())
                    .col(ColumnDef::new(Posts::State).string().not_null())
                    .col(ColumnDef::new(Posts::Lat).double().not_null())
                    .col(ColumnDef::new(Posts::Lng).double().not_null())
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Posts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Trades::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Trades::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Trades::State).string().not_null())
                    .col(ColumnDef::new(Trades::BuyerPostId).uuid().not_null())
                    .col(ColumnDef::new(Trades::BuyerUserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Trades::BuyerClosed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Trades::BuyerPostState).string().not_null())
                    .col(ColumnDef::new(Trades::SellerPostId).uuid().not_null())
                    .col(ColumnDef::new(Trades::SellerUserId).uuid().not_null())
                    .col(
                        ColumnDef::new(Trades::SellerClosed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Trades::SellerPostState).string().not_null())
                    .col(
                        ColumnDef::new(Trades::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Trades::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trades_buyer_post")
                            .from(Trades::Table, Trades::BuyerPostId)
                            .to(Posts::Table, Posts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trades_seller_post")
                            .from(Trades::Table, Trades::SellerPostId)
                            .to(Posts::Table, Posts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trades_buyer_user_state")
                    .table(Trades::Table)
                    .col(Trades::BuyerUserId)
                    .col(Trades::State)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_trades_seller_user_state")
                    .table(Trades::Table)
                    .col(Trades::SellerUserId)
                    .col(Trades::State)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Trades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    UserId,
    Title,
    Description,
    PhotoUrls,
    Tags,
    State,
    Lat,
    Lng,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Trades {
    Table,
    Id,
    State,
    BuyerPostId,
    BuyerUserId,
    BuyerClosed,
    BuyerPostState,
    SellerPostId,
    SellerUserId,
    SellerClosed,
    SellerPostState,
    CreatedAt,
    UpdatedAt,
}
