use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(NotificationLog::Table)
                    .if_not_exists()
                    .col(pk_auto(NotificationLog::Id))
                    .col(string(NotificationLog::DonorEmail).not_null().to_owned())
                    .col(string(NotificationLog::Channel).not_null().to_owned())
                    .col(boolean(NotificationLog::Success).not_null().to_owned())
                    .col(string_null(NotificationLog::Error))
                    .col(
                        timestamp(NotificationLog::SentAt)
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
            .drop_table(Table::drop().table(NotificationLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum NotificationLog {
    Table,
    Id,
    DonorEmail,
    Channel,
    Success,
    Error,
    SentAt,
}
