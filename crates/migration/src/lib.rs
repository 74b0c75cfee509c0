pub use sea_orm_migration::prelude::*;

mod m20250801_120000_create_donor_table;
mod m20250801_121000_create_alert_table;
mod m20250801_122000_create_donor_response_table;
mod m20250812_090000_create_notification_log_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_120000_create_donor_table::Migration),
            Box::new(m20250801_121000_create_alert_table::Migration),
            Box::new(m20250801_122000_create_donor_response_table::Migration),
            Box::new(m20250812_090000_create_notification_log_table::Migration),
        ]
    }
}
