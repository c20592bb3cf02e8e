use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 通用记录表：每行保存一个逻辑表中的一条 JSON 记录
        manager
            .create_table(
                Table::create()
                    .table(TableRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TableRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TableRecords::TableName).string().not_null())
                    .col(ColumnDef::new(TableRecords::RecordId).string().null())
                    .col(ColumnDef::new(TableRecords::Record).text().not_null())
                    .col(
                        ColumnDef::new(TableRecords::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_table_records_table_name")
                    .table(TableRecords::Table)
                    .col(TableRecords::TableName)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_table_records_record_id")
                    .table(TableRecords::Table)
                    .col(TableRecords::TableName)
                    .col(TableRecords::RecordId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TableRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TableRecords {
    #[sea_orm(iden = "table_records")]
    Table,
    Id,
    TableName,
    RecordId,
    Record,
    CreatedAt,
}
