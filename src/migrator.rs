use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_items_table::Migration),
            Box::new(m20240101_000002_create_item_pictures_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Items::Collo).string().not_null())
                        .col(ColumnDef::new(Items::Codice).string().not_null())
                        .col(ColumnDef::new(Items::Descrizione).string().null())
                        // Raw form value, stored uncoerced
                        .col(ColumnDef::new(Items::Quantita).string().null())
                        .col(ColumnDef::new(Items::Locazione).string_len(16).null())
                        .col(ColumnDef::new(Items::Matricola).string().not_null())
                        .col(ColumnDef::new(Items::Note).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_locazione")
                        .table(Items::Table)
                        .col(Items::Locazione)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Items {
        Table,
        Id,
        Collo,
        Codice,
        Descrizione,
        Quantita,
        Locazione,
        Matricola,
        Note,
    }
}

mod m20240101_000002_create_item_pictures_table {

    use super::m20240101_000001_create_items_table::Items;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_item_pictures_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ItemPictures::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ItemPictures::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ItemPictures::ItemId).integer().not_null())
                        .col(ColumnDef::new(ItemPictures::FilePath).string().not_null())
                        .col(ColumnDef::new(ItemPictures::UploadDate).date().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_item_pictures_item_id")
                                .from(ItemPictures::Table, ItemPictures::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_item_pictures_item_id")
                        .table(ItemPictures::Table)
                        .col(ItemPictures::ItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ItemPictures::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ItemPictures {
        Table,
        Id,
        ItemId,
        FilePath,
        UploadDate,
    }
}
