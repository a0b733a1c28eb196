//! The search-then-fetch orchestrator for the PubMed E-utilities.

use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{PubMedError, Result};
use crate::pubmed::models::{FetchResult, PublicationRecord, SearchResult};
use crate::pubmed::parser::parse_fetch_response;
use crate::pubmed::query::{self, SearchCriteria, SearchParams};
use crate::pubmed::responses::parse_search_response;
use crate::rate_limit::RateLimiter;
use crate::retry::{with_retry, RetryPolicy};

/// Client for the PubMed ESearch/EFetch endpoints.
///
/// Holds only transport plumbing (HTTP client, base URL, rate limiter,
/// configuration); all per-call state lives in the arguments and return
/// values, so the client is `Clone` and safe to share across tasks.
#[derive(Clone)]
pub struct PubMedClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl PubMedClient {
    /// Create a new PubMed client with default configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_search::PubMedClient;
    ///
    /// let client = PubMedClient::new();
    /// ```
    pub fn new() -> Self {
        Self::with_config(ClientConfig::new())
    }

    /// Create a new PubMed client with custom configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_search::{ClientConfig, PubMedClient};
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_email("researcher@university.edu");
    ///
    /// let client = PubMedClient::with_config(config);
    /// ```
    pub fn with_config(config: ClientConfig) -> Self {
        let rate_limiter = config.create_rate_limiter();
        let base_url = config.effective_base_url().to_string();

        let client = Client::builder()
            .user_agent(config.effective_user_agent())
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            rate_limiter,
            config,
        }
    }

    /// Create a new PubMed client around a custom `reqwest` client.
    pub fn with_client(client: Client) -> Self {
        let config = ClientConfig::new();
        let rate_limiter = config.create_rate_limiter();
        let base_url = config.effective_base_url().to_string();

        Self {
            client,
            base_url,
            rate_limiter,
            config,
        }
    }

    /// Search PubMed, returning the total match count and the page of
    /// matching PMIDs.
    ///
    /// A blank query returns an empty result without touching the
    /// network. Transport failures retry on the configured budget and
    /// then propagate; an unparsable response body is downgraded to an
    /// empty result instead of surfacing (the fail-soft search policy).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_search::{PubMedClient, SearchParams};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new();
    ///     let result = client.search("Smith JA[FAU]", &SearchParams::new()).await?;
    ///     println!("{} matches", result.count);
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self, params), fields(query = %query))]
    pub async fn search(&self, query: &str, params: &SearchParams) -> Result<SearchResult> {
        if query.trim().is_empty() {
            debug!("blank query, skipping ESearch request");
            return Ok(SearchResult::empty());
        }

        let url = self.search_url(query, params);
        // Transport failures only; response-body problems are handled
        // below, not retried.
        let body = with_retry(&self.config.retry, RetryPolicy::Transport, "ESearch", || {
            self.get(&url)
        })
        .await?;

        match parse_search_response(&body) {
            Ok(result) => {
                info!(
                    count = result.count,
                    ids = result.pubmed_ids.len(),
                    "search completed"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "unparsable ESearch response, returning empty result");
                Ok(SearchResult::empty())
            }
        }
    }

    /// Fetch full MEDLINE records for the given PMIDs, in request order.
    ///
    /// An empty ID collection returns an empty result without touching
    /// the network. Unlike [`search`](Self::search), every failure here
    /// (transport or parse) consumes the retry budget before
    /// propagating; the wider scope is inherited protocol behavior,
    /// kept for compatibility.
    #[instrument(skip(self, pubmed_ids), fields(ids = pubmed_ids.len()))]
    pub async fn fetch<S: AsRef<str>>(&self, pubmed_ids: &[S]) -> Result<FetchResult> {
        with_retry(
            &self.config.retry,
            RetryPolicy::AnyFailure,
            "EFetch",
            || async {
                // The blank-input check sits inside the retried
                // operation, mirroring the protocol it was lifted from.
                if pubmed_ids.iter().all(|id| id.as_ref().trim().is_empty()) {
                    debug!("no IDs to fetch, skipping EFetch request");
                    return Ok(FetchResult::new(Vec::new()));
                }

                let url = self.fetch_url(pubmed_ids);
                let body = self.get(&url).await?;
                let publications = parse_fetch_response(&body)?;
                info!(records = publications.len(), "fetch completed");
                Ok(FetchResult::new(publications))
            },
        )
        .await
    }

    /// Search, fetch the matching records, and carry the search's total
    /// count onto the fetch result.
    ///
    /// This is the operation most callers want: `total_count` reports
    /// how many articles matched even when fewer were fetched.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pubmed_search::{PubMedClient, SearchCriteria};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = PubMedClient::new();
    ///     let (query, params) = SearchCriteria::new().author("Smith JA").build();
    ///     let result = client.search_and_fetch(&query, &params).await?;
    ///     println!("fetched {} of {:?} matches", result.count(), result.total_count);
    ///     Ok(())
    /// }
    /// ```
    pub async fn search_and_fetch(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<FetchResult> {
        let search_result = self.search(query, params).await?;
        let mut fetch_result = self.fetch(&search_result.pubmed_ids).await?;
        fetch_result.total_count = Some(search_result.count);
        Ok(fetch_result)
    }

    /// Search-and-fetch by a full author name (`Last First M[FAU]`).
    pub async fn find_by_full_author_name(
        &self,
        name: &str,
        params: &SearchParams,
    ) -> Result<FetchResult> {
        let query = format!("{name}[FAU]");
        self.search_and_fetch(&query, params).await
    }

    /// Search-and-fetch by last and first name.
    pub async fn find_by_last_and_first_name(
        &self,
        last_name: &str,
        first_name: &str,
        params: &SearchParams,
    ) -> Result<FetchResult> {
        let query = format!("{last_name} {first_name}[FAU]");
        self.search_and_fetch(&query, params).await
    }

    /// Search-and-fetch across a set of publication aliases, OR-joined
    /// as `AU` clauses. No aliases means an empty query, which yields an
    /// empty result without a network call.
    pub async fn find_by_author_aliases<S: AsRef<str>>(
        &self,
        aliases: &[S],
        params: &SearchParams,
    ) -> Result<FetchResult> {
        let query = if aliases.is_empty() {
            String::new()
        } else {
            let clauses = aliases
                .iter()
                .map(|alias| format!("{}[AU]", alias.as_ref().trim()))
                .collect::<Vec<_>>()
                .join(" OR ");
            format!("({clauses})")
        };
        self.search_and_fetch(&query, params).await
    }

    /// Fetch a single record by PMID; `None` when PubMed returns nothing.
    pub async fn find_first_by_pubmed_id(
        &self,
        pubmed_id: &str,
    ) -> Result<Option<PublicationRecord>> {
        let result = self.fetch(&[pubmed_id]).await?;
        Ok(result.publications.into_iter().next())
    }

    /// Search an author's publications within one calendar year.
    ///
    /// Uses a raw `retmax` of 1000 to pull the whole year in one page,
    /// bypassing the criteria builder's page-size clamp.
    pub async fn search_by_author_in_year(&self, name: &str, year: i32) -> Result<SearchResult> {
        let mut params = SearchParams::new();
        params.set("retmax", "1000");
        params.set("mindate", format!("{year}/01/01"));
        params.set("maxdate", format!("{year}/12/31"));
        self.search(name, &params).await
    }

    /// Criteria-driven paginated search.
    ///
    /// Returns `Ok(None)` unless author, title, and PubMed IDs are all
    /// present; incomplete criteria are not an error.
    pub async fn paginated_search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Option<FetchResult>> {
        if !(criteria.has_author() && criteria.has_title() && criteria.has_pubmed_ids()) {
            debug!("incomplete criteria, skipping paginated search");
            return Ok(None);
        }

        let (query, params) = criteria.build();
        self.search_and_fetch(&query, &params).await.map(Some)
    }

    /// Issue one rate-limited GET, mapping non-success statuses to
    /// [`PubMedError::ApiError`].
    async fn get(&self, url: &str) -> Result<String> {
        self.rate_limiter.acquire().await;
        debug!(url = %url, "issuing GET request");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "request failed");
            return Err(PubMedError::ApiError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }

        Ok(response.text().await?)
    }

    fn search_url(&self, query: &str, params: &SearchParams) -> String {
        let mut pairs = vec![("term".to_string(), query.to_string())];
        pairs.extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        pairs.extend(self.config.build_api_params());
        format!("{}/esearch.fcgi?{}", self.base_url, encode_pairs(&pairs))
    }

    fn fetch_url<S: AsRef<str>>(&self, pubmed_ids: &[S]) -> String {
        let mut pairs = query::fetch_params(pubmed_ids);
        pairs.extend(self.config.build_api_params());
        format!("{}/efetch.fcgi?{}", self.base_url, encode_pairs(&pairs))
    }
}

impl Default for PubMedClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Percent-escape values and join as `key=value&...`.
fn encode_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
