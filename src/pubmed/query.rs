//! Query construction for the ESearch endpoint.
//!
//! Turns loosely-structured search criteria into PubMed's boolean query
//! syntax (`name[FAU] AND (word[ti] AND word[ti]) OR 12345[uid]`) plus
//! the auxiliary request parameters (`retmax`, `retstart`, `mindate`,
//! `maxdate`, `datetype`).

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{Local, NaiveDate};
use regex::Regex;

/// Field qualifier used when an author is given without one.
const DEFAULT_AUTHOR_FIELD: &str = "FAU";

/// Caller-supplied date layouts accepted for `mindate`/`maxdate`.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Auxiliary request parameters accompanying a search query.
///
/// Backed by an ordered map so identical criteria always produce the
/// same parameter sequence, and therefore the same request URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    params: BTreeMap<String, String>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl IntoIterator for SearchParams {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

/// Loosely-structured search criteria.
///
/// Built up with chained setters and consumed by [`build`](Self::build),
/// which produces the query string and parameter map for one search.
///
/// # Example
///
/// ```
/// use pubmed_search::SearchCriteria;
///
/// let (query, params) = SearchCriteria::new()
///     .author("Smith JA")
///     .title("lung cancer")
///     .results(20)
///     .build();
///
/// assert_eq!(query, "Smith JA[FAU] AND (lung[ti] AND cancer[ti])");
/// assert_eq!(params.get("retmax"), Some("20"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    author: Option<String>,
    author_field: Option<String>,
    title: Option<String>,
    pubmed_ids: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    results: Option<i64>,
    offset: Option<i64>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search for publications by this author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Field qualifier for the author clause (e.g. `FAU`, `AU`, `1au`).
    /// Defaults to `FAU` when an author is given without one.
    pub fn author_field(mut self, field: impl Into<String>) -> Self {
        self.author_field = Some(field.into());
        self
    }

    /// Words that must all appear in the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Free-text list of PubMed IDs; runs of non-digit characters act
    /// as separators, so mixed-delimiter input is tolerated.
    pub fn pubmed_ids(mut self, pubmed_ids: impl Into<String>) -> Self {
        self.pubmed_ids = Some(pubmed_ids.into());
        self
    }

    /// Only publications published on or after this date
    /// (`YYYY-MM-DD` or `YYYY/MM/DD`; unparsable dates are ignored).
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Only publications published on or before this date.
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// Page size. Values above 100 clamp to 100; values below 1 fall
    /// back to the default of 10.
    pub fn results(mut self, results: i64) -> Self {
        self.results = Some(results);
        self
    }

    /// Result offset for paging; negative values clamp to 0.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub(crate) fn has_author(&self) -> bool {
        matches!(self.author.as_deref().map(str::trim), Some(a) if !a.is_empty())
    }

    pub(crate) fn has_title(&self) -> bool {
        matches!(self.title.as_deref().map(str::trim), Some(t) if !t.is_empty())
    }

    pub(crate) fn has_pubmed_ids(&self) -> bool {
        matches!(self.pubmed_ids.as_deref().map(str::trim), Some(p) if !p.is_empty())
    }

    /// Build the PubMed query string and auxiliary parameters.
    ///
    /// Building is pure: the same criteria always yield the same pair.
    /// Empty criteria yield an empty query string; the caller decides
    /// whether that short-circuits the search.
    pub fn build(&self) -> (String, SearchParams) {
        let author_clause = self.author_clause();
        let title_clause = self.title_clause(!author_clause.is_empty());
        let pmid_clause =
            self.pmid_clause(!author_clause.is_empty() || !title_clause.is_empty());

        let query = format!("{author_clause}{title_clause}{pmid_clause}");
        (query, self.build_params())
    }

    fn author_clause(&self) -> String {
        match self.author.as_deref().map(str::trim) {
            Some(author) if !author.is_empty() => {
                let field = self.author_field.as_deref().unwrap_or(DEFAULT_AUTHOR_FIELD);
                format!("{author}[{field}]")
            }
            _ => String::new(),
        }
    }

    fn title_clause(&self, has_author_clause: bool) -> String {
        let title = match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title,
            _ => return String::new(),
        };

        let words = title
            .split_whitespace()
            .map(|word| format!("{word}[ti]"))
            .collect::<Vec<_>>()
            .join(" AND ");

        if has_author_clause {
            format!(" AND ({words})")
        } else {
            format!("({words})")
        }
    }

    fn pmid_clause(&self, has_author_or_title_clause: bool) -> String {
        let raw = match self.pubmed_ids.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return String::new(),
        };

        let tokens = tokenize_pubmed_ids(raw);
        if tokens.is_empty() {
            return String::new();
        }

        let joined = tokens
            .iter()
            .map(|pmid| format!("{pmid}[uid]"))
            .collect::<Vec<_>>()
            .join(" OR ");

        // The ID clause is OR-joined onto whatever precedes it, so the
        // first token gets the same prefix as the rest.
        if has_author_or_title_clause {
            format!(" OR {joined}")
        } else {
            joined
        }
    }

    fn build_params(&self) -> SearchParams {
        let mut params = SearchParams::new();
        params.set("datetype", "pdat");

        // retmax cannot exceed 100; out-of-range values fall back
        let results = self.results.unwrap_or(10);
        let retmax = if results > 100 {
            100
        } else if results < 1 {
            10
        } else {
            results
        };
        params.set("retmax", retmax.to_string());

        // retstart defaults to zero and cannot be negative
        let offset = self.offset.unwrap_or(0).max(0);
        params.set("retstart", offset.to_string());

        let mindate = self.start_date.as_deref().and_then(parse_date);
        let mut maxdate = self.end_date.as_deref().and_then(parse_date);
        // An open-ended range closes at today
        if mindate.is_some() && maxdate.is_none() {
            maxdate = Some(Local::now().date_naive());
        }
        if let Some(date) = mindate {
            params.set("mindate", format_date(date));
        }
        if let Some(date) = maxdate {
            params.set("maxdate", format_date(date));
        }

        params
    }
}

/// Split free-text PubMed IDs on runs of non-digit characters.
///
/// Mixed delimiters are tolerated; non-numeric fragments end up inside
/// the separators and are discarded.
fn tokenize_pubmed_ids(raw: &str) -> Vec<&str> {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let re = SEPARATORS
        .get_or_init(|| Regex::new(r"[^0-9]+").expect("Failed to compile separator regex"));

    re.split(raw.trim())
        .filter(|token| !token.is_empty())
        .collect()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// Fixed parameters for the EFetch endpoint: MEDLINE-format XML for the
/// given IDs.
pub(crate) fn fetch_params<S: AsRef<str>>(pubmed_ids: &[S]) -> Vec<(String, String)> {
    let ids = pubmed_ids
        .iter()
        .map(|id| id.as_ref().trim())
        .collect::<Vec<_>>()
        .join(",");

    vec![
        ("id".to_string(), ids),
        ("rettype".to_string(), "medline".to_string()),
        ("retmode".to_string(), "xml".to_string()),
        ("db".to_string(), "pubmed".to_string()),
    ]
}
