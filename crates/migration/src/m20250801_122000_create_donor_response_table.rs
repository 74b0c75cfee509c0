use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DonorResponse::Table)
                    .if_not_exists()
                    .col(pk_auto(DonorResponse::Id))
                    .col(integer(DonorResponse::DonorId).not_null().to_owned())
                    .col(
                        string(DonorResponse::BloodGroupAcknowledged)
                            .not_null()
                            .to_owned(),
                    )
                    .col(
                        timestamp(DonorResponse::RespondedAt)
                            .default(Expr::current_timestamp())
                            .not_null()
                            .to_owned(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_donor_response_donor_id")
                    .table(DonorResponse::Table)
                    .col(DonorResponse::DonorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_donor_response_donor_id")
                    .table(DonorResponse::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(DonorResponse::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DonorResponse {
    Table,
    Id,
    DonorId,
    BloodGroupAcknowledged,
    RespondedAt,
}
