use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Donor::Table)
                    .if_not_exists()
                    .col(pk_auto(Donor::Id))
                    .col(string(Donor::Name).not_null().to_owned())
                    .col(string(Donor::Email).not_null().unique_key().to_owned())
                    .col(string_null(Donor::Phone))
                    .col(string(Donor::BloodGroup).not_null().to_owned())
                    .col(string(Donor::Pincode).not_null().to_owned())
                    .col(string_null(Donor::City))
                    .col(
                        boolean(Donor::Available)
                            .default(true)
                            .not_null()
                            .to_owned(),
                    )
                    .col(timestamp_null(Donor::LastDonationAt))
                    .col(timestamp_null(Donor::LastResponseAt))
                    .col(
                        timestamp(Donor::CreatedAt)
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
                    .name("idx_donor_blood_group_pincode")
                    .table(Donor::Table)
                    .col(Donor::BloodGroup)
                    .col(Donor::Pincode)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_donor_blood_group_pincode")
                    .table(Donor::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Donor::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Donor {
    Table,
    Id,
    Name,
    Email,
    Phone,
    BloodGroup,
    Pincode,
    City,
    Available,
    LastDonationAt,
    LastResponseAt,
    CreatedAt,
}
