use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProviderCredentials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProviderCredentials::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProviderCredentials::TeamId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProviderCredentials::ProviderTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProviderCredentials::ApiKey)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProviderCredentials::Name)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProviderCredentials::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(ProviderCredentials::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ProviderCredentials::Priority)
                            .integer()
                            .not_null()
                            .default(100),
                    )
                    .col(
                        ColumnDef::new(ProviderCredentials::LastSyncAt)
                            .timestamp()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProviderCredentials::LastError)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProviderCredentials::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ProviderCredentials::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_credentials_team_id")
                            .from(ProviderCredentials::Table, ProviderCredentials::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_credentials_provider_type_id")
                            .from(
                                ProviderCredentials::Table,
                                ProviderCredentials::ProviderTypeId,
                            )
                            .to(ProviderTypes::Table, ProviderTypes::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引：调度器按团队枚举活跃凭证
        manager
            .create_index(
                Index::create()
                    .name("idx_provider_credentials_team_status")
                    .table(ProviderCredentials::Table)
                    .col(ProviderCredentials::TeamId)
                    .col(ProviderCredentials::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_provider_credentials_provider")
                    .table(ProviderCredentials::Table)
                    .col(ProviderCredentials::ProviderTypeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProviderCredentials::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ProviderCredentials {
    Table,
    Id,
    TeamId,
    ProviderTypeId,
    ApiKey,
    Name,
    Status,
    IsDefault,
    Priority,
    LastSyncAt,
    LastError,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum ProviderTypes {
    Table,
    Id,
}
