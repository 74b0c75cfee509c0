//! SeaORM entities for the donor directory and alert bookkeeping tables.

pub mod alert;
pub mod donor;
pub mod donor_response;
pub mod notification_log;
