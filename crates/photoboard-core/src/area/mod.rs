//! Area domain: the cells of a board and the store that owns them.

pub mod model;
pub mod store;

pub use model::{
    Area, AreaCollection, AreaId, MAX_AREAS, Media, MediaKind, MediaLocator, grid_columns_for,
};
pub use store::AreaStore;
