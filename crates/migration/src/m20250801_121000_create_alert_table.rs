use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alert::Table)
                    .if_not_exists()
                    .col(pk_auto(Alert::Id))
                    .col(string(Alert::BloodGroup).not_null().to_owned())
                    .col(string(Alert::Pincode).not_null().to_owned())
                    .col(string(Alert::ContactPhone).not_null().to_owned())
                    .col(integer(Alert::TriggeredBy).not_null().to_owned())
                    .col(
                        boolean(Alert::UsedFallback)
                            .default(false)
                            .not_null()
                            .to_owned(),
                    )
                    .col(integer(Alert::MatchedCount).not_null().to_owned())
                    .col(integer(Alert::EmailSent).not_null().to_owned())
                    .col(integer(Alert::EmailFailed).not_null().to_owned())
                    .col(integer(Alert::SmsSent).not_null().to_owned())
                    .col(integer(Alert::SmsFailed).not_null().to_owned())
                    .col(
                        timestamp(Alert::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null()
                            .to_owned(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alert::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Alert {
    Table,
    Id,
    BloodGroup,
    Pincode,
    ContactPhone,
    TriggeredBy,
    UsedFallback,
    MatchedCount,
    EmailSent,
    EmailFailed,
    SmsSent,
    SmsFailed,
    CreatedAt,
}
