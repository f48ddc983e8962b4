use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Maximum length of a task name, mirrored by the server-side validation.
const TASK_NAME_MAX_LENGTH: u32 = 150;

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Name,
    Description,
    TaskDate,
    RegisteredAt,
    Completed,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_auto(Tasks::Id))
                    .col(string_len(Tasks::Name, TASK_NAME_MAX_LENGTH))
                    .col(text_null(Tasks::Description))
                    .col(timestamp_with_time_zone(Tasks::TaskDate))
                    .col(
                        timestamp_with_time_zone(Tasks::RegisteredAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(boolean(Tasks::Completed).default(false))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}
