pub mod config;
pub mod diff;
pub mod normalize;
pub mod product;
pub mod release;
pub mod repo;
pub mod site;

pub use config::AppConfig;
pub use diff::{classify, DiffOutcome, ReleaseMutation, ReleaseStatus};
pub use normalize::{normalize, normalize_all};
pub use product::{NaturalKey, OrderPeriod, ProductRecord};
pub use release::{ReleaseEntry, ReleaseHistory};
pub use repo::{RepoError, Repository, SiteFingerprint};
pub use site::{Lang, SourceSite};
