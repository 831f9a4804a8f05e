use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccessTrials::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AccessTrials::TenantId).uuid().not_null())
                    .col(ColumnDef::new(AccessTrials::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(AccessTrials::TrialStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessTrials::TrialEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(AccessTrials::TenantId)
                            .col(AccessTrials::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccessSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccessSubscriptions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccessSubscriptions::TenantId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessSubscriptions::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessSubscriptions::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessSubscriptions::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessSubscriptions::AmountPaidCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessSubscriptions::Currency)
                            .string_len(3)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccessSubscriptions::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_access_subscriptions_owner")
                    .table(AccessSubscriptions::Table)
                    .col(AccessSubscriptions::TenantId)
                    .col(AccessSubscriptions::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccessSubscriptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccessTrials::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AccessTrials {
    Table,
    TenantId,
    UserId,
    TrialStart,
    TrialEnd,
}

#[derive(DeriveIden)]
enum AccessSubscriptions {
    Table,
    Id,
    TenantId,
    UserId,
    StartDate,
    EndDate,
    AmountPaidCents,
    Currency,
    Status,
}
