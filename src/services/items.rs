use crate::{
    db::DbPool,
    entities::{item, item_picture, Locazione},
    errors::ServiceError,
    file_store::FileStore,
    services::PictureMeta,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Field set for creating an item. Required labels are required by shape
/// only; no content validation is performed and no uniqueness is enforced.
#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
    pub collo: String,
    pub codice: String,
    pub descrizione: Option<String>,
    pub quantita: Option<String>,
    pub locazione: Option<Locazione>,
    pub matricola: String,
    pub note: Option<String>,
}

/// Partial field set for updating an item. An absent field keeps the stored
/// value; fields cannot be cleared back to null through an update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemChanges {
    pub collo: Option<String>,
    pub codice: Option<String>,
    pub descrizione: Option<String>,
    pub quantita: Option<String>,
    pub locazione: Option<Locazione>,
    pub matricola: Option<String>,
    pub note: Option<String>,
}

/// One item plus its picture metadata, ready for rendering.
#[derive(Debug, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: item::Model,
    pub pictures: Vec<PictureMeta>,
}

/// All items partitioned by warehouse location. Items without a location
/// belong to neither sequence.
#[derive(Debug, Serialize)]
pub struct IndexView {
    pub magazzino_1: Vec<ItemView>,
    pub magazzino_2: Vec<ItemView>,
}

/// Service for managing items
#[derive(Clone)]
pub struct ItemService {
    db: Arc<DbPool>,
    files: Arc<FileStore>,
}

impl ItemService {
    pub fn new(db: Arc<DbPool>, files: Arc<FileStore>) -> Self {
        Self { db, files }
    }

    /// Creates a new item and returns its id.
    #[instrument(skip(self))]
    pub async fn create(&self, input: NewItem) -> Result<i32, ServiceError> {
        let model = item::ActiveModel {
            collo: Set(input.collo),
            codice: Set(input.codice),
            descrizione: Set(input.descrizione),
            quantita: Set(input.quantita),
            locazione: Set(input.locazione),
            matricola: Set(input.matricola),
            note: Set(input.note),
            ..Default::default()
        };

        let model = model.insert(&*self.db).await?;
        info!("Item created: {}", model.id);
        Ok(model.id)
    }

    /// Fetches an item by id.
    pub async fn get(&self, id: i32) -> Result<item::Model, ServiceError> {
        item::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {}", id)))
    }

    /// Applies a partial update and returns the stored item.
    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: i32, changes: ItemChanges) -> Result<item::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active: item::ActiveModel = existing.into();

        if let Some(collo) = changes.collo {
            active.collo = Set(collo);
        }
        if let Some(codice) = changes.codice {
            active.codice = Set(codice);
        }
        if let Some(descrizione) = changes.descrizione {
            active.descrizione = Set(Some(descrizione));
        }
        if let Some(quantita) = changes.quantita {
            active.quantita = Set(Some(quantita));
        }
        if let Some(locazione) = changes.locazione {
            active.locazione = Set(Some(locazione));
        }
        if let Some(matricola) = changes.matricola {
            active.matricola = Set(matricola);
        }
        if let Some(note) = changes.note {
            active.note = Set(Some(note));
        }

        let updated = active.update(&*self.db).await?;
        info!("Item updated: {}", updated.id);
        Ok(updated)
    }

    /// Deletes an item, its picture rows and its photo directory.
    ///
    /// The database delete commits first; a failure while removing the
    /// directory surfaces as a cleanup error without reversing it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;

        item_picture::Entity::delete_many()
            .filter(item_picture::Column::ItemId.eq(id))
            .exec(&*self.db)
            .await?;
        item::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        info!("Item deleted: {}", id);

        self.files.remove_item_dir(id).await
    }

    /// Loads every item, partitions by location and attaches picture
    /// metadata in insertion order.
    pub async fn index_view(&self) -> Result<IndexView, ServiceError> {
        let rows = item::Entity::find()
            .find_with_related(item_picture::Entity)
            .order_by_asc(item::Column::Id)
            .order_by_asc(item_picture::Column::Id)
            .all(&*self.db)
            .await?;

        let mut magazzino_1 = Vec::new();
        let mut magazzino_2 = Vec::new();

        for (item, pictures) in rows {
            let view = ItemView {
                pictures: pictures.into_iter().map(PictureMeta::from).collect(),
                item,
            };
            match view.item.locazione {
                Some(Locazione::Magazzino1) => magazzino_1.push(view),
                Some(Locazione::Magazzino2) => magazzino_2.push(view),
                None => {}
            }
        }

        Ok(IndexView {
            magazzino_1,
            magazzino_2,
        })
    }

    /// Items stored at one specific location, ordered by id.
    pub async fn items_at(&self, locazione: Locazione) -> Result<Vec<item::Model>, ServiceError> {
        Ok(item::Entity::find()
            .filter(item::Column::Locazione.eq(locazione))
            .order_by_asc(item::Column::Id)
            .all(&*self.db)
            .await?)
    }
}
