//! EFetch XML parsing: MEDLINE article nodes into publication records.
//!
//! The schema types here mirror the subset of the `PubmedArticleSet`
//! shape this crate consumes. Every intermediate node is optional and
//! every repeated element deserializes into a defaulted `Vec`, so a
//! single occurrence and a list of occurrences parse identically and a
//! structurally-incomplete article degrades to a partially-populated
//! record instead of an error.

use std::fmt;
use std::sync::OnceLock;

use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::{PubMedError, Result};
use crate::pubmed::models::PublicationRecord;

/// Parse a whole EFetch response into records, in document order.
///
/// An absent or empty article set yields an empty list. Malformed XML at
/// the document level is an error, left to the caller's retry policy.
pub fn parse_fetch_response(xml: &str) -> Result<Vec<PublicationRecord>> {
    // Inline formatting tags inside titles and abstracts break the
    // serde deserializer, so they are stripped up front.
    let cleaned_xml = strip_inline_html_tags(xml);

    let article_set: PubmedArticleSet = from_str(&cleaned_xml).map_err(|e| {
        PubMedError::XmlError(format!("failed to deserialize EFetch response: {e}"))
    })?;

    let records: Vec<PublicationRecord> = article_set
        .articles
        .into_iter()
        .map(PubmedArticleXml::into_record)
        .collect();

    debug!(records = records.len(), "assembled fetch response");
    Ok(records)
}

#[derive(Debug, Deserialize)]
#[serde(rename = "PubmedArticleSet")]
struct PubmedArticleSet {
    #[serde(rename = "PubmedArticle", default)]
    articles: Vec<PubmedArticleXml>,
}

#[derive(Debug, Deserialize)]
struct PubmedArticleXml {
    #[serde(rename = "MedlineCitation")]
    medline_citation: Option<MedlineCitationXml>,
    #[serde(rename = "PubmedData")]
    pubmed_data: Option<PubmedDataXml>,
}

impl PubmedArticleXml {
    /// Flatten one `<PubmedArticle>` node into a record, skipping any
    /// subtree that is absent.
    fn into_record(self) -> PublicationRecord {
        let mut record = PublicationRecord::default();

        record.pmc_id = self.pubmed_data.and_then(PubmedDataXml::pmc_id);

        let Some(medline) = self.medline_citation else {
            return record;
        };
        if let Some(pmid) = medline.pmid {
            record.pubmed_id = pmid.value;
        }
        if let Some(created) = medline.date_created {
            record.date_published = created.join("-");
        }

        let Some(article) = medline.article else {
            return record;
        };
        if let Some(title) = article.article_title {
            record.title = title;
        }
        if let Some(author_list) = article.author_list {
            record.authors = author_list.display_names(AuthorXml::short_name);
            record.full_author_names = author_list.display_names(AuthorXml::full_name);
        }
        record.abstract_text = article.abstract_section.and_then(AbstractXml::text);
        record.pages = article.pagination.and_then(|p| p.medline_pgn);
        record.is_review = article
            .publication_type_list
            .map_or(false, |list| list.contains("Review"));

        let Some(journal) = article.journal else {
            return record;
        };
        if let Some(raw_title) = journal.title {
            // The raw title carries the translated name after " = "
            let transliterated = raw_title.split(" = ").next().unwrap_or(&raw_title);
            record.journal_name = title_case(transliterated);
        }
        record.journal_abbreviation = journal.iso_abbreviation;

        let Some(issue) = journal.journal_issue else {
            return record;
        };
        if let Some(pub_date) = issue.pub_date {
            record.issue_date = pub_date.join(" ");
        }
        record.volume = issue.volume;
        record.issue = issue.issue;

        record
    }
}

#[derive(Debug, Deserialize)]
struct MedlineCitationXml {
    #[serde(rename = "PMID")]
    pmid: Option<PmidXml>,
    #[serde(rename = "DateCreated")]
    date_created: Option<DateXml>,
    #[serde(rename = "Article")]
    article: Option<ArticleXml>,
}

#[derive(Debug, Deserialize)]
struct PmidXml {
    #[serde(rename = "$text", default)]
    value: String,
}

/// Year/month/day triple used by both `DateCreated` and `PubDate`.
#[derive(Debug, Deserialize)]
struct DateXml {
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Month")]
    month: Option<String>,
    #[serde(rename = "Day")]
    day: Option<String>,
}

impl DateXml {
    /// Join the parts that are present with `separator`.
    fn join(&self, separator: &str) -> String {
        [
            self.year.as_deref(),
            self.month.as_deref(),
            self.day.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(separator)
    }
}

#[derive(Debug, Deserialize)]
struct ArticleXml {
    #[serde(rename = "Journal")]
    journal: Option<JournalXml>,
    #[serde(rename = "ArticleTitle")]
    article_title: Option<String>,
    #[serde(rename = "Abstract")]
    abstract_section: Option<AbstractXml>,
    #[serde(rename = "AuthorList")]
    author_list: Option<AuthorListXml>,
    #[serde(rename = "Pagination")]
    pagination: Option<PaginationXml>,
    #[serde(rename = "PublicationTypeList")]
    publication_type_list: Option<PublicationTypeListXml>,
}

#[derive(Debug, Deserialize)]
struct AbstractXml {
    #[serde(rename = "AbstractText", default)]
    sections: Vec<AbstractTextXml>,
}

impl AbstractXml {
    /// Space-join the abstract sections; `None` when there are none.
    fn text(self) -> Option<String> {
        if self.sections.is_empty() {
            None
        } else {
            Some(
                self.sections
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        }
    }
}

/// `<AbstractText>` is plain text in simple abstracts and carries a
/// `Label` attribute in structured ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AbstractTextXml {
    Simple(String),
    Labeled {
        #[serde(rename = "$text", default)]
        text: String,
        #[serde(rename = "@Label")]
        #[allow(dead_code)]
        label: Option<String>,
    },
}

impl fmt::Display for AbstractTextXml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbstractTextXml::Simple(text) => write!(f, "{text}"),
            AbstractTextXml::Labeled { text, .. } => write!(f, "{text}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthorListXml {
    #[serde(rename = "Author", default)]
    authors: Vec<AuthorXml>,
}

impl AuthorListXml {
    /// Format every author with `format` and join with `", "`.
    fn display_names(&self, format: fn(&AuthorXml) -> String) -> String {
        self.authors
            .iter()
            .map(format)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Deserialize)]
struct AuthorXml {
    #[serde(rename = "LastName")]
    last_name: Option<String>,
    #[serde(rename = "ForeName")]
    fore_name: Option<String>,
    #[serde(rename = "Initials")]
    initials: Option<String>,
}

impl AuthorXml {
    /// "Last Initials", e.g. `Doe JA`.
    fn short_name(&self) -> String {
        join_present(&[self.last_name.as_deref(), self.initials.as_deref()])
    }

    /// "Last First", e.g. `Doe John`.
    fn full_name(&self) -> String {
        join_present(&[self.last_name.as_deref(), self.fore_name.as_deref()])
    }
}

fn join_present(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
struct PaginationXml {
    #[serde(rename = "MedlinePgn")]
    medline_pgn: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PublicationTypeListXml {
    #[serde(rename = "PublicationType", default)]
    publication_types: Vec<PublicationTypeXml>,
}

impl PublicationTypeListXml {
    fn contains(&self, wanted: &str) -> bool {
        self.publication_types.iter().any(|pt| pt.text() == wanted)
    }
}

/// `<PublicationType>` text, with or without the `UI` attribute.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PublicationTypeXml {
    Simple(String),
    Attributed {
        #[serde(rename = "$text", default)]
        text: String,
        #[serde(rename = "@UI")]
        #[allow(dead_code)]
        ui: Option<String>,
    },
}

impl PublicationTypeXml {
    fn text(&self) -> &str {
        match self {
            PublicationTypeXml::Simple(text) => text,
            PublicationTypeXml::Attributed { text, .. } => text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct JournalXml {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "ISOAbbreviation")]
    iso_abbreviation: Option<String>,
    #[serde(rename = "JournalIssue")]
    journal_issue: Option<JournalIssueXml>,
}

#[derive(Debug, Deserialize)]
struct JournalIssueXml {
    #[serde(rename = "Volume")]
    volume: Option<String>,
    #[serde(rename = "Issue")]
    issue: Option<String>,
    #[serde(rename = "PubDate")]
    pub_date: Option<DateXml>,
}

#[derive(Debug, Deserialize)]
struct PubmedDataXml {
    #[serde(rename = "ArticleIdList")]
    article_id_list: Option<ArticleIdListXml>,
}

impl PubmedDataXml {
    /// First article identifier that looks like a PMC ID.
    fn pmc_id(self) -> Option<String> {
        self.article_id_list?
            .article_ids
            .into_iter()
            .map(|id| id.value)
            .find(|value| value.contains("PMC"))
    }
}

#[derive(Debug, Deserialize)]
struct ArticleIdListXml {
    #[serde(rename = "ArticleId", default)]
    article_ids: Vec<ArticleIdXml>,
}

#[derive(Debug, Deserialize)]
struct ArticleIdXml {
    #[serde(rename = "$text", default)]
    value: String,
    #[serde(rename = "@IdType")]
    #[allow(dead_code)]
    id_type: Option<String>,
}

/// Strip inline HTML-like formatting tags (`<i>`, `<sup>`, `<sub>`, …)
/// that appear inside `ArticleTitle` and `AbstractText` content.
fn strip_inline_html_tags(xml: &str) -> String {
    static INLINE_TAGS: OnceLock<Regex> = OnceLock::new();
    let re = INLINE_TAGS.get_or_init(|| {
        Regex::new(r"</?(?:i|b|u|sup|sub|em|strong)>").expect("Failed to compile inline tag regex")
    });
    re.replace_all(xml, "").into_owned()
}

/// Capitalize each whitespace-separated word, lowercasing the rest.
fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
