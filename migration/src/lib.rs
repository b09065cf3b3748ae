pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_teams_table;
mod m20240601_000002_create_provider_types_table;
mod m20240601_000003_create_provider_credentials_table;
mod m20240601_000004_create_models_table;
mod m20240601_000005_create_model_aliases_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_teams_table::Migration),
            Box::new(m20240601_000002_create_provider_types_table::Migration),
            Box::new(m20240601_000003_create_provider_credentials_table::Migration),
            Box::new(m20240601_000004_create_models_table::Migration),
            Box::new(m20240601_000005_create_model_aliases_table::Migration),
        ]
    }
}
