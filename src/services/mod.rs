pub mod items;
pub mod pictures;
pub mod report;
pub mod transfer;

use serde::Serialize;

/// Picture metadata attached to item views and returned after uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PictureMeta {
    pub id: i32,
    pub file_path: String,
}

impl From<crate::entities::item_picture::Model> for PictureMeta {
    fn from(model: crate::entities::item_picture::Model) -> Self {
        Self {
            id: model.id,
            file_path: model.file_path,
        }
    }
}
