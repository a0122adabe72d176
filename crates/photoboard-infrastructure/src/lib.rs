pub mod archive;
pub mod config_service;
pub mod dto;
pub mod media;
pub mod paths;
pub mod remote;
pub mod storage;
pub mod tiered_repository;

pub use crate::archive::ZipArchiveSink;
pub use crate::media::{InlineMediaFetcher, InlineMediaUploader, MemoryMediaHost};
pub use crate::paths::BoardPaths;
pub use crate::remote::RemoteHub;
pub use crate::tiered_repository::TieredBoardRepository;
