//! # pubmed-search
//!
//! An async Rust client for the NCBI PubMed E-utilities. It covers the
//! two-step search-then-fetch protocol: resolve a query to a match
//! count and PMID list, retrieve the matching MEDLINE records as XML,
//! and parse them into flat, fully-resolved publication records.
//!
//! ## Features
//!
//! - **Query building**: compose author/title/ID-set/date-range
//!   searches without hand-writing PubMed's boolean syntax
//! - **Resilient parsing**: structurally-incomplete articles degrade to
//!   partially-populated records instead of errors
//! - **Bounded retry**: transient failures retry on a fixed budget
//!   before propagating
//! - **NCBI compliance**: built-in request pacing and `tool`/`email`
//!   identity parameters
//!
//! ## Quick Start
//!
//! ```no_run
//! use pubmed_search::{PubMedClient, SearchCriteria};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PubMedClient::new();
//!
//!     let (query, params) = SearchCriteria::new()
//!         .author("Smith JA")
//!         .title("lung cancer")
//!         .results(20)
//!         .build();
//!
//!     let result = client.search_and_fetch(&query, &params).await?;
//!     println!("fetched {} of {:?} matches", result.count(), result.total_count);
//!
//!     for record in &result.publications {
//!         println!("{}: {}", record.pubmed_id, record.title);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Fetching known records
//!
//! ```no_run
//! use pubmed_search::PubMedClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PubMedClient::new();
//!
//!     if let Some(record) = client.find_first_by_pubmed_id("23645694").await? {
//!         println!("{} ({})", record.title, record.date_published);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod pubmed;
pub mod rate_limit;
pub mod retry;

// Re-export main types for convenience
pub use config::ClientConfig;
pub use error::{PubMedError, Result};
pub use pubmed::{
    FetchResult, PubMedClient, PublicationRecord, SearchCriteria, SearchParams, SearchResult,
};
pub use retry::RetryConfig;
