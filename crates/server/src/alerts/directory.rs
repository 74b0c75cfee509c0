//! Donor directory queries.
//!
//! Narrow read-only seam between the dispatcher and the relational store.
//! The dispatcher only ever needs three lookups; everything else the donor
//! tables support (search, leaderboard) lives behind the HTTP handlers.

use crate::alerts::dispatch::Recipient;
use crate::compatibility::BloodGroup;
use crate::entity::donor;
use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use std::sync::Arc;

#[async_trait]
pub trait DonorDirectory: Send + Sync {
    /// Donors whose blood group and postal code both equal the criteria.
    async fn find_matching(
        &self,
        blood_group: BloodGroup,
        pincode: &str,
    ) -> Result<Vec<Recipient>, DbErr>;

    /// Every available donor with a usable contact, for the fallback
    /// broadcast.
    async fn all_contactable(&self) -> Result<Vec<Recipient>, DbErr>;

    /// Exact email lookup, used when recording an inbound response.
    async fn find_by_email(&self, email: &str) -> Result<Option<donor::Model>, DbErr>;
}

pub struct SeaOrmDonorDirectory {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmDonorDirectory {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn to_recipient(model: donor::Model) -> Option<Recipient> {
    if model.email.is_empty() {
        return None;
    }
    Some(Recipient {
        email: model.email,
        phone: model.phone.filter(|p| !p.is_empty()),
    })
}

#[async_trait]
impl DonorDirectory for SeaOrmDonorDirectory {
    #[tracing::instrument(skip(self))]
    async fn find_matching(
        &self,
        blood_group: BloodGroup,
        pincode: &str,
    ) -> Result<Vec<Recipient>, DbErr> {
        let donors = donor::Entity::find()
            .filter(donor::Column::Available.eq(true))
            .filter(donor::Column::BloodGroup.eq(blood_group.as_str()))
            .filter(donor::Column::Pincode.eq(pincode))
            .all(self.db.as_ref())
            .await?;
        Ok(donors.into_iter().filter_map(to_recipient).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn all_contactable(&self) -> Result<Vec<Recipient>, DbErr> {
        let donors = donor::Entity::find()
            .filter(donor::Column::Available.eq(true))
            .all(self.db.as_ref())
            .await?;
        Ok(donors.into_iter().filter_map(to_recipient).collect())
    }

    #[tracing::instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<donor::Model>, DbErr> {
        donor::Entity::find()
            .filter(donor::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
    }
}
