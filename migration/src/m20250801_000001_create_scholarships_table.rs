use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Scholarships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Scholarships::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Scholarships::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Scholarships::Description).text().not_null())
                    .col(
                        ColumnDef::new(Scholarships::Amount)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Scholarships::Deadline).date().not_null())
                    .col(ColumnDef::new(Scholarships::Eligibility).text().null())
                    .col(
                        ColumnDef::new(Scholarships::ApplicationUrl)
                            .string_len(500)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Scholarships::EligibilityCriteria)
                            .json_binary()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Scholarships::Tags)
                            .array(ColumnType::String(StringLen::N(50)))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Scholarships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Scholarships::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Scholarships::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Scholarships {
    Table,
    Id,
    Name,
    Description,
    Amount,
    Deadline,
    Eligibility,
    ApplicationUrl,
    EligibilityCriteria,
    Tags,
    CreatedAt,
    UpdatedAt,
}
