//! ESearch response parsing.
//!
//! The search response is an XML document whose root exposes a `Count`
//! element and an `IdList` of matching PMIDs. Parse failures surface as
//! errors here; the client downgrades them to an empty result (the
//! fail-soft search policy), which keeps the recovery visible and
//! testable instead of hiding it in a catch-all.

use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::{PubMedError, Result};
use crate::pubmed::models::SearchResult;

#[derive(Debug, Deserialize)]
#[serde(rename = "eSearchResult")]
struct ESearchResultXml {
    #[serde(rename = "Count")]
    count: Option<String>,
    #[serde(rename = "IdList")]
    id_list: Option<IdListXml>,
}

#[derive(Debug, Deserialize)]
struct IdListXml {
    #[serde(rename = "Id", default)]
    ids: Vec<String>,
}

/// Extract the total count and ID page from an ESearch XML body.
pub(crate) fn parse_search_response(xml: &str) -> Result<SearchResult> {
    let parsed: ESearchResultXml = from_str(xml).map_err(|e| {
        PubMedError::XmlError(format!("failed to deserialize ESearch response: {e}"))
    })?;

    let count = parsed
        .count
        .ok_or_else(|| PubMedError::XmlError("ESearch response has no Count element".to_string()))?;
    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|_| PubMedError::XmlError(format!("ESearch Count is not a number: {count}")))?;

    let pubmed_ids = parsed.id_list.map(|list| list.ids).unwrap_or_default();

    Ok(SearchResult { count, pubmed_ids })
}
