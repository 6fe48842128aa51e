use crate::{
    db::DbPool,
    entities::{item, item_picture},
    errors::ServiceError,
    file_store::FileStore,
    services::PictureMeta,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// One uploaded file as received from the multipart form.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Service for managing item pictures and their backing files
#[derive(Clone)]
pub struct PictureService {
    db: Arc<DbPool>,
    files: Arc<FileStore>,
}

impl PictureService {
    pub fn new(db: Arc<DbPool>, files: Arc<FileStore>) -> Self {
        Self { db, files }
    }

    /// Stores uploaded files for an item and returns the item's full
    /// current picture list, not just the newly added entries.
    ///
    /// Each file is written to disk first and its row inserted second; when
    /// the insert fails the just-written file is discarded again so the two
    /// stores cannot drift apart on this path.
    #[instrument(skip(self, files))]
    pub async fn upload(
        &self,
        item_id: i32,
        files: Vec<UploadFile>,
    ) -> Result<Vec<PictureMeta>, ServiceError> {
        if files.is_empty() {
            return Err(ServiceError::InvalidInput(
                "at least one file is required".into(),
            ));
        }

        let item = item::Entity::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {}", item_id)))?;

        for file in files {
            if file.name.is_empty() {
                continue;
            }

            let rel_path = self.files.save(item.id, &file.name, file.bytes).await?;

            let row = item_picture::ActiveModel {
                item_id: Set(item.id),
                file_path: Set(rel_path.clone()),
                upload_date: Set(chrono::Local::now().date_naive()),
                ..Default::default()
            };

            if let Err(e) = row.insert(&*self.db).await {
                self.files.discard(&rel_path).await;
                return Err(e.into());
            }
            info!("Picture stored for item {}: {}", item.id, rel_path);
        }

        self.list_for_item(item.id).await
    }

    /// Deletes one picture: file first, row second, then the containing
    /// directory when it became empty. A file already missing on disk
    /// aborts before the row delete so the inconsistency stays visible.
    #[instrument(skip(self))]
    pub async fn delete(&self, picture_id: i32) -> Result<(), ServiceError> {
        let picture = item_picture::Entity::find_by_id(picture_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("picture {}", picture_id)))?;

        let rel_path = picture.file_path.clone();
        self.files.remove_file(&rel_path).await?;

        picture.delete(&*self.db).await?;
        self.files.prune_parent(&rel_path).await;

        info!("Picture deleted: {}", picture_id);
        Ok(())
    }

    /// The item's pictures in insertion order.
    pub async fn list_for_item(&self, item_id: i32) -> Result<Vec<PictureMeta>, ServiceError> {
        let pictures = item_picture::Entity::find()
            .filter(item_picture::Column::ItemId.eq(item_id))
            .order_by_asc(item_picture::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(pictures.into_iter().map(PictureMeta::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Locazione;
    use crate::migrator::Migrator;
    use crate::services::items::{ItemService, NewItem};
    use assert_matches::assert_matches;
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;
    use tempfile::TempDir;

    struct Fixture {
        items: ItemService,
        pictures: PictureService,
        files: Arc<FileStore>,
        _dir: TempDir,
    }

    async fn setup() -> Fixture {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);
        let db = Arc::new(Database::connect(opt).await.unwrap());
        Migrator::up(&*db, None).await.unwrap();

        let dir = TempDir::new().unwrap();
        let files = Arc::new(FileStore::new(dir.path()));
        Fixture {
            items: ItemService::new(db.clone(), files.clone()),
            pictures: PictureService::new(db, files.clone()),
            files,
            _dir: dir,
        }
    }

    async fn create_item(fx: &Fixture) -> i32 {
        fx.items
            .create(NewItem {
                collo: "C1".into(),
                codice: "X1".into(),
                descrizione: None,
                quantita: None,
                locazione: Some(Locazione::Magazzino1),
                matricola: "M1".into(),
                note: None,
            })
            .await
            .unwrap()
    }

    fn upload_file(name: &str) -> UploadFile {
        UploadFile {
            name: name.into(),
            bytes: b"jpeg-bytes".to_vec(),
        }
    }

    #[tokio::test]
    async fn upload_adds_exactly_n_pictures_with_relative_paths() {
        let fx = setup().await;
        let item_id = create_item(&fx).await;

        let pictures = fx
            .pictures
            .upload(item_id, vec![upload_file("a.jpg"), upload_file("b.jpg")])
            .await
            .unwrap();

        assert_eq!(pictures.len(), 2);
        for pic in &pictures {
            assert!(pic.file_path.starts_with(&format!("{}/", item_id)));
            assert!(!pic.file_path.contains('\\'));
            assert!(fx.files.resolve(&pic.file_path).is_file());
        }
    }

    #[tokio::test]
    async fn upload_returns_full_picture_list() {
        let fx = setup().await;
        let item_id = create_item(&fx).await;

        fx.pictures
            .upload(item_id, vec![upload_file("first.jpg")])
            .await
            .unwrap();
        let all = fx
            .pictures
            .upload(item_id, vec![upload_file("second.jpg")])
            .await
            .unwrap();

        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn upload_skips_files_with_empty_names() {
        let fx = setup().await;
        let item_id = create_item(&fx).await;

        let pictures = fx
            .pictures
            .upload(item_id, vec![upload_file(""), upload_file("kept.jpg")])
            .await
            .unwrap();

        assert_eq!(pictures.len(), 1);
    }

    #[tokio::test]
    async fn upload_without_files_is_invalid_input() {
        let fx = setup().await;
        let item_id = create_item(&fx).await;

        let err = fx.pictures.upload(item_id, vec![]).await.unwrap_err();
        assert_matches!(err, ServiceError::InvalidInput(_));
    }

    #[tokio::test]
    async fn upload_to_missing_item_is_not_found() {
        let fx = setup().await;
        let err = fx
            .pictures
            .upload(404, vec![upload_file("a.jpg")])
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::NotFound(_));
    }

    #[tokio::test]
    async fn deleting_last_picture_prunes_the_directory() {
        let fx = setup().await;
        let item_id = create_item(&fx).await;

        let pictures = fx
            .pictures
            .upload(item_id, vec![upload_file("a.jpg"), upload_file("b.jpg")])
            .await
            .unwrap();

        fx.pictures.delete(pictures[0].id).await.unwrap();
        assert!(
            fx.files.resolve(&item_id.to_string()).is_dir(),
            "directory kept while a sibling remains"
        );
        assert!(fx.files.resolve(&pictures[1].file_path).is_file());

        fx.pictures.delete(pictures[1].id).await.unwrap();
        assert!(!fx.files.resolve(&item_id.to_string()).exists());
    }

    #[tokio::test]
    async fn missing_backing_file_aborts_before_the_row_delete() {
        let fx = setup().await;
        let item_id = create_item(&fx).await;

        let pictures = fx
            .pictures
            .upload(item_id, vec![upload_file("a.jpg")])
            .await
            .unwrap();

        std::fs::remove_file(fx.files.resolve(&pictures[0].file_path)).unwrap();

        let err = fx.pictures.delete(pictures[0].id).await.unwrap_err();
        assert_matches!(err, ServiceError::FileMissing(_));

        // The row survives the aborted delete.
        let remaining = fx.pictures.list_for_item(item_id).await.unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[tokio::test]
    async fn item_delete_cascades_pictures_and_directory() {
        let fx = setup().await;
        let item_id = create_item(&fx).await;

        let pictures = fx
            .pictures
            .upload(item_id, vec![upload_file("a.jpg")])
            .await
            .unwrap();

        fx.items.delete(item_id).await.unwrap();

        assert!(!fx.files.resolve(&item_id.to_string()).exists());
        assert_matches!(
            fx.pictures.delete(pictures[0].id).await,
            Err(ServiceError::NotFound(_))
        );
    }
}
