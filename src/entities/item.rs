use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The two fixed warehouse locations an item may be stored at.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Locazione {
    #[sea_orm(string_value = "magazzino-1")]
    #[serde(rename = "magazzino-1")]
    Magazzino1,
    #[sea_orm(string_value = "magazzino-2")]
    #[serde(rename = "magazzino-2")]
    Magazzino2,
}

impl Locazione {
    /// The opposite warehouse, used when proposing a transfer.
    pub fn other(self) -> Self {
        match self {
            Self::Magazzino1 => Self::Magazzino2,
            Self::Magazzino2 => Self::Magazzino1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Magazzino1 => "magazzino-1",
            Self::Magazzino2 => "magazzino-2",
        }
    }
}

impl std::fmt::Display for Locazione {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub collo: String,
    pub codice: String,
    pub descrizione: Option<String>,
    /// Stored exactly as received; numeric content is not enforced.
    pub quantita: Option<String>,
    pub locazione: Option<Locazione>,
    pub matricola: String,
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::item_picture::Entity")]
    ItemPictures,
}

impl Related<super::item_picture::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemPictures.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locazione_other_flips_between_the_two_warehouses() {
        assert_eq!(Locazione::Magazzino1.other(), Locazione::Magazzino2);
        assert_eq!(Locazione::Magazzino2.other(), Locazione::Magazzino1);
    }

    #[test]
    fn locazione_serializes_to_its_wire_value() {
        assert_eq!(
            serde_json::to_string(&Locazione::Magazzino1).unwrap(),
            "\"magazzino-1\""
        );
        let parsed: Locazione = serde_json::from_str("\"magazzino-2\"").unwrap();
        assert_eq!(parsed, Locazione::Magazzino2);
    }
}
