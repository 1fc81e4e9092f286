pub mod client;
pub mod types;
pub mod version;

pub use client::{PypiClient, DEFAULT_INDEX_URL};
pub use types::{DependencyReport, PackageMetadata, PackageQuery, QueryResult, VersionRecord};
pub use version::{SemverFirst, VersionOrder};
