use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModelAliases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModelAliases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ModelAliases::ModelId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ModelAliases::Alias)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ModelAliases::TeamId).integer().null())
                    .col(
                        ColumnDef::new(ModelAliases::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_model_aliases_model_id")
                            .from(ModelAliases::Table, ModelAliases::ModelId)
                            .to(Models::Table, Models::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_model_aliases_team_id")
                            .from(ModelAliases::Table, ModelAliases::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一范围内别名唯一；team_id 为 NULL 的全局别名之间仍会按 SQLite
        // 语义彼此放行，因此全局唯一性由查询路径的 alias_exists 预检补足
        manager
            .create_index(
                Index::create()
                    .name("uq_model_aliases_team_alias")
                    .table(ModelAliases::Table)
                    .col(ModelAliases::TeamId)
                    .col(ModelAliases::Alias)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_model_aliases_alias")
                    .table(ModelAliases::Table)
                    .col(ModelAliases::Alias)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModelAliases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ModelAliases {
    Table,
    Id,
    ModelId,
    Alias,
    TeamId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Models {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
}
