pub mod item;
pub mod item_picture;

pub use item::Locazione;
