use crate::{
    entities::{item, Locazione},
    errors::ServiceError,
    services::items::ItemService,
};
use chrono::Local;
use rust_xlsxwriter::Workbook;
use tracing::{info, instrument};

/// A generated report: suggested download name plus the xlsx bytes.
#[derive(Debug)]
pub struct ColliReport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// One cell of the summary sheet.
type Cell = (u32, u16, String);

/// Builds xlsx summaries of the colli stored in each warehouse
#[derive(Clone)]
pub struct ReportService {
    items: ItemService,
}

impl ReportService {
    pub fn new(items: ItemService) -> Self {
        Self { items }
    }

    /// Renders the per-warehouse summary workbook from the current item set.
    /// Items without a location are left out, matching the index view.
    #[instrument(skip(self))]
    pub async fn export_summary(&self) -> Result<ColliReport, ServiceError> {
        let magazzino_1 = self.items.items_at(Locazione::Magazzino1).await?;
        let magazzino_2 = self.items.items_at(Locazione::Magazzino2).await?;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet
            .set_name("Riepilogo Colli")
            .map_err(|e| ServiceError::ReportError(e.to_string()))?;

        for (row, col, value) in summary_cells(&magazzino_1, &magazzino_2) {
            sheet
                .write(row, col, value)
                .map_err(|e| ServiceError::ReportError(e.to_string()))?;
        }

        sheet
            .set_column_width(0, 20)
            .map_err(|e| ServiceError::ReportError(e.to_string()))?;
        sheet
            .set_column_width(1, 50)
            .map_err(|e| ServiceError::ReportError(e.to_string()))?;

        let bytes = workbook
            .save_to_buffer()
            .map_err(|e| ServiceError::ReportError(e.to_string()))?;

        let filename = format!("resoconto_colli_{}.xlsx", Local::now().format("%d-%m-%Y"));
        info!(
            "Report generated: {} ({} + {} items)",
            filename,
            magazzino_1.len(),
            magazzino_2.len()
        );

        Ok(ColliReport { filename, bytes })
    }
}

/// Lays out the sheet: one section per warehouse, each with a count line,
/// a two-column header and one row per item, separated by two blank rows.
fn summary_cells(magazzino_1: &[item::Model], magazzino_2: &[item::Model]) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut row: u32 = 0;

    for (label, items) in [("1", magazzino_1), ("2", magazzino_2)] {
        cells.push((
            row,
            0,
            format!("Oggetti in magazzino {}: {}", label, items.len()),
        ));
        row += 2;

        cells.push((row, 0, "Numero collo:".to_string()));
        cells.push((row, 1, "Descrizione:".to_string()));
        row += 1;

        for item in items {
            cells.push((row, 0, item.collo.clone()));
            cells.push((
                row,
                1,
                item.descrizione.clone().unwrap_or_default(),
            ));
            row += 1;
        }
        row += 2;
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_store::FileStore;
    use crate::migrator::Migrator;
    use crate::services::items::NewItem;
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn setup() -> (ItemService, ReportService, TempDir) {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);
        let db = Arc::new(Database::connect(opt).await.unwrap());
        Migrator::up(&*db, None).await.unwrap();

        let dir = TempDir::new().unwrap();
        let files = Arc::new(FileStore::new(dir.path()));
        let items = ItemService::new(db, files);
        let reports = ReportService::new(items.clone());
        (items, reports, dir)
    }

    fn new_item(collo: &str, descrizione: &str, locazione: Option<Locazione>) -> NewItem {
        NewItem {
            collo: collo.into(),
            codice: "X1".into(),
            descrizione: Some(descrizione.into()),
            quantita: None,
            locazione,
            matricola: "M1".into(),
            note: None,
        }
    }

    fn cell(cells: &[Cell], row: u32, col: u16) -> &str {
        cells
            .iter()
            .find(|(r, c, _)| *r == row && *c == col)
            .map(|(_, _, v)| v.as_str())
            .unwrap_or_else(|| panic!("no cell at ({}, {})", row, col))
    }

    #[tokio::test]
    async fn items_appear_under_their_own_warehouse_section() {
        let (items, reports, _dir) = setup().await;
        items
            .create(new_item("C1", "cassa grande", Some(Locazione::Magazzino1)))
            .await
            .unwrap();
        items
            .create(new_item("C2", "pedana", Some(Locazione::Magazzino2)))
            .await
            .unwrap();

        let m1 = items.items_at(Locazione::Magazzino1).await.unwrap();
        let m2 = items.items_at(Locazione::Magazzino2).await.unwrap();
        let cells = summary_cells(&m1, &m2);

        // Section 1: count, header, one item row.
        assert_eq!(cell(&cells, 0, 0), "Oggetti in magazzino 1: 1");
        assert_eq!(cell(&cells, 2, 0), "Numero collo:");
        assert_eq!(cell(&cells, 2, 1), "Descrizione:");
        assert_eq!(cell(&cells, 3, 0), "C1");
        assert_eq!(cell(&cells, 3, 1), "cassa grande");

        // Section 2 starts two rows below the first item row.
        assert_eq!(cell(&cells, 6, 0), "Oggetti in magazzino 2: 1");
        assert_eq!(cell(&cells, 9, 0), "C2");
        assert_eq!(cell(&cells, 9, 1), "pedana");
        assert!(!cells.iter().any(|(r, _, v)| *r < 6 && v == "C2"));

        let report = reports.export_summary().await.unwrap();
        assert_eq!(&report.bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn missing_descrizione_renders_as_empty_cell() {
        let m1 = vec![item::Model {
            id: 1,
            collo: "C1".into(),
            codice: "X1".into(),
            descrizione: None,
            quantita: None,
            locazione: Some(Locazione::Magazzino1),
            matricola: "M1".into(),
            note: None,
        }];
        let cells = summary_cells(&m1, &[]);

        assert_eq!(cell(&cells, 3, 0), "C1");
        assert_eq!(cell(&cells, 3, 1), "");
    }

    #[tokio::test]
    async fn report_has_dated_filename() {
        let (items, reports, _dir) = setup().await;
        items
            .create(new_item("C1", "cassa", Some(Locazione::Magazzino1)))
            .await
            .unwrap();

        let report = reports.export_summary().await.unwrap();
        assert!(report.filename.starts_with("resoconto_colli_"));
        assert!(report.filename.ends_with(".xlsx"));
    }

    #[tokio::test]
    async fn report_succeeds_with_no_items() {
        let (_items, reports, _dir) = setup().await;
        let report = reports.export_summary().await.unwrap();
        assert!(!report.bytes.is_empty());

        let cells = summary_cells(&[], &[]);
        assert_eq!(cell(&cells, 0, 0), "Oggetti in magazzino 1: 0");
        assert_eq!(cell(&cells, 5, 0), "Oggetti in magazzino 2: 0");
    }
}
