pub mod error;
pub mod feed;
mod locks;
pub mod pipeline;
pub mod repository;

pub use error::PipelineError;
pub use feed::FeedItem;
pub use pipeline::{SitePassSummary, SkippedItem, Tracker};
pub use repository::MemoryRepository;
