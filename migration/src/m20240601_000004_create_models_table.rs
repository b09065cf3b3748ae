use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Models::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Models::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Models::ProviderTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Models::ProviderModelId)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Models::UnifiedId)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Models::DisplayName).string_len(200))
                    .col(ColumnDef::new(Models::Description).text())
                    .col(ColumnDef::new(Models::ContextLength).integer())
                    .col(
                        ColumnDef::new(Models::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Models::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_models_provider_type_id")
                            .from(Models::Table, Models::ProviderTypeId)
                            .to(ProviderTypes::Table, ProviderTypes::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // (提供商, 提供商原生模型ID) 唯一，upsert 依赖该约束
        manager
            .create_index(
                Index::create()
                    .name("uq_models_provider_model")
                    .table(Models::Table)
                    .col(Models::ProviderTypeId)
                    .col(Models::ProviderModelId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Models::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Models {
    Table,
    Id,
    ProviderTypeId,
    ProviderModelId,
    UnifiedId,
    DisplayName,
    Description,
    ContextLength,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProviderTypes {
    Table,
    Id,
}
