pub mod common;
pub mod health;
pub mod items;
pub mod pictures;
pub mod reports;

use crate::{config::AppConfig, db::DbPool, file_store::FileStore};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub items: crate::services::items::ItemService,
    pub pictures: crate::services::pictures::PictureService,
    pub transfer: crate::services::transfer::TransferService,
    pub reports: crate::services::report::ReportService,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, files: Arc<FileStore>, config: &AppConfig) -> Self {
        let items = crate::services::items::ItemService::new(db.clone(), files.clone());
        let pictures = crate::services::pictures::PictureService::new(db, files);
        let transfer = crate::services::transfer::TransferService::new(
            items.clone(),
            config.transfer_recipient.clone(),
        );
        let reports = crate::services::report::ReportService::new(items.clone());

        Self {
            items,
            pictures,
            transfer,
            reports,
        }
    }
}
