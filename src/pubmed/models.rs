use serde::{Deserialize, Serialize};

/// A fully-resolved MEDLINE publication record.
///
/// Every field is materialized in one parsing pass; records hold no
/// references back to the source XML. Structurally-incomplete articles
/// yield partially-populated records rather than errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublicationRecord {
    /// PubMed ID
    pub pubmed_id: String,
    /// Article title
    pub title: String,
    /// Authors as "Last Initials", comma-joined into one display string
    pub authors: String,
    /// Authors as "Last First", comma-joined into one display string
    pub full_author_names: String,
    /// Abstract text (if available)
    pub abstract_text: Option<String>,
    /// Page range from the MEDLINE pagination field
    pub pages: Option<String>,
    /// Record creation date, `YYYY-M-D` with absent parts omitted
    pub date_published: String,
    /// Whether the publication types include "Review"
    pub is_review: bool,
    /// PubMed Central identifier, when the article has one
    pub pmc_id: Option<String>,
    /// Journal volume
    pub volume: Option<String>,
    /// Journal issue
    pub issue: Option<String>,
    /// Issue publication date, space-joined `YYYY M D`
    pub issue_date: String,
    /// Journal name, title-cased, transliterated part only
    pub journal_name: String,
    /// ISO journal abbreviation
    pub journal_abbreviation: Option<String>,
}

/// Outcome of an ESearch call: the total match count plus the page of
/// IDs PubMed returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Total number of matches PubMed reports for the query
    pub count: u64,
    /// Returned PMIDs in PubMed's relevance/date order.
    ///
    /// PubMed may cap the page below `count`; no length relation between
    /// the two is guaranteed.
    pub pubmed_ids: Vec<String>,
}

impl SearchResult {
    /// The result used for blank queries and unparsable search responses.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Outcome of an EFetch call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Parsed records in document order
    pub publications: Vec<PublicationRecord>,
    /// Total match count of the search that produced the fetched IDs.
    ///
    /// Assigned once by `search_and_fetch`; may exceed [`count`](Self::count)
    /// when fewer articles were fetched than matched. `None` for direct
    /// `fetch` calls.
    pub total_count: Option<u64>,
}

impl FetchResult {
    /// Wrap a parsed record list; `total_count` starts unset.
    pub fn new(publications: Vec<PublicationRecord>) -> Self {
        Self {
            publications,
            total_count: None,
        }
    }

    /// Number of records actually fetched.
    pub fn count(&self) -> usize {
        self.publications.len()
    }
}
