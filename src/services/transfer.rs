use crate::{errors::ServiceError, services::items::ItemService};
use serde::Serialize;
use tracing::instrument;

/// A prebuilt transfer-request email, ready to hand to a `mailto:` link.
#[derive(Debug, Serialize)]
pub struct TransferRequest {
    pub mailto: String,
}

/// Builds transfer-request emails for moving a collo between warehouses
#[derive(Clone)]
pub struct TransferService {
    items: ItemService,
    recipient: String,
}

impl TransferService {
    pub fn new(items: ItemService, recipient: impl Into<String>) -> Self {
        Self {
            items,
            recipient: recipient.into(),
        }
    }

    /// Builds the mailto URL requesting that the item be moved to the other
    /// warehouse. The destination is always the location the item is not in,
    /// so an item without a location cannot be transferred.
    #[instrument(skip(self))]
    pub async fn build_transfer_request(
        &self,
        item_id: i32,
    ) -> Result<TransferRequest, ServiceError> {
        let item = self.items.get(item_id).await?;

        let partenza = item.locazione.ok_or_else(|| {
            ServiceError::InvalidInput(format!(
                "item {} has no location, transfer destination is undefined",
                item_id
            ))
        })?;
        let destinazione = partenza.other();

        let subject = format!("Trasferimento Collo {}", item.collo);
        let body = format!(
            "\nSi richiede trasferimento da {} a {} di:\n\n\
             Collo: {}\n\
             Codice: {}\n\
             Matricola: {}\n\
             Descrizione: {}\n\
             Quantità: {}\n\
             Note: {}\n\n",
            partenza,
            destinazione,
            item.collo,
            item.codice,
            item.matricola,
            item.descrizione.as_deref().unwrap_or(""),
            item.quantita.as_deref().unwrap_or(""),
            item.note.as_deref().unwrap_or(""),
        );

        let mailto = format!(
            "mailto:{}?subject={}&body={}",
            self.recipient,
            urlencoding::encode(&subject),
            urlencoding::encode(&body),
        );

        Ok(TransferRequest { mailto })
    }
}
