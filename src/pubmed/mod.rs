//! PubMed search-then-fetch: query construction, the ESearch/EFetch
//! protocol, and MEDLINE record parsing.

pub mod client;
pub mod models;
pub mod parser;
pub mod query;
pub(crate) mod responses;

// Re-export public types
pub use client::PubMedClient;
pub use models::{FetchResult, PublicationRecord, SearchResult};
pub use parser::parse_fetch_response;
pub use query::{SearchCriteria, SearchParams};
