pub mod announcement;
pub mod checksum;
pub mod error;
pub mod fetch;
mod html;
pub mod parser;

pub use checksum::ChecksumGate;
pub use error::{ParseError, ScraperError};
pub use fetch::Fetcher;
pub use parser::{build_record, parser_for, ParsedProduct, ProductParser};
