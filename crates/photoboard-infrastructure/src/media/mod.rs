//! Media collaborators.

mod inline;
mod memory_host;

pub use inline::{InlineMediaFetcher, InlineMediaUploader, decode_data_url, encode_data_url};
pub use memory_host::MemoryMediaHost;
