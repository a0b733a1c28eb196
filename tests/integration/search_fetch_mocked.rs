//! Mocked end-to-end tests for the search-then-fetch protocol.
//!
//! These tests point the client at a wiremock server and verify the
//! short-circuits, the response parsing, and the count bookkeeping
//! without touching the real NCBI endpoints.

use std::time::Duration;

use pubmed_search::{ClientConfig, PubMedClient, RetryConfig, SearchCriteria, SearchParams};
use tracing_test::traced_test;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper: XML response from ESearch with a count and an ID list.
fn esearch_xml_response(count: u64, pmids: &[&str]) -> String {
    let ids: String = pmids.iter().map(|id| format!("<Id>{id}</Id>")).collect();
    format!(
        r#"<?xml version="1.0" ?>
<eSearchResult>
    <Count>{count}</Count>
    <RetMax>{}</RetMax>
    <RetStart>0</RetStart>
    <IdList>{ids}</IdList>
</eSearchResult>"#,
        pmids.len()
    )
}

/// Helper: XML response from EFetch with one minimal article per PMID.
fn efetch_xml_response(pmids: &[&str]) -> String {
    let articles: String = pmids
        .iter()
        .map(|pmid| {
            format!(
                r#"<PubmedArticle>
    <MedlineCitation>
        <PMID Version="1">{pmid}</PMID>
        <DateCreated><Year>2013</Year><Month>5</Month><Day>6</Day></DateCreated>
        <Article>
            <ArticleTitle>Article {pmid}</ArticleTitle>
            <Journal><Title>Test journal</Title></Journal>
        </Article>
    </MedlineCitation>
</PubmedArticle>"#
            )
        })
        .collect();
    format!(r#"<?xml version="1.0" ?><PubmedArticleSet>{articles}</PubmedArticleSet>"#)
}

/// Helper: create a client pointing at the mock server, with fast
/// retries and no request pacing to keep the tests quick.
fn create_test_client(base_url: &str) -> PubMedClient {
    let config = ClientConfig::new()
        .with_base_url(base_url)
        .with_rate_limit(1000.0)
        .with_retry(RetryConfig {
            max_attempts: 3,
            delay: Duration::from_millis(10),
        });
    PubMedClient::with_config(config)
}

#[tokio::test]
#[traced_test]
async fn test_blank_search_issues_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client.search("   ", &SearchParams::new()).await.unwrap();

    assert_eq!(result.count, 0);
    assert!(result.pubmed_ids.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_blank_fetch_issues_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client.fetch::<&str>(&[]).await.unwrap();

    assert_eq!(result.count(), 0);
    assert_eq!(result.total_count, None);
}

#[tokio::test]
#[traced_test]
async fn test_search_parses_count_and_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", "Smith JA[FAU]"))
        .and(query_param("tool", "dfhcc_informatics"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(esearch_xml_response(219, &["23645694", "22429397"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client
        .search("Smith JA[FAU]", &SearchParams::new())
        .await
        .unwrap();

    assert_eq!(result.count, 219);
    assert_eq!(result.pubmed_ids, vec!["23645694", "22429397"]);
}

#[tokio::test]
#[traced_test]
async fn test_search_sends_builder_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("retmax", "25"))
        .and(query_param("retstart", "50"))
        .and(query_param("datetype", "pdat"))
        .and(query_param("mindate", "2012/01/15"))
        .and(query_param("maxdate", "2013/06/30"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(esearch_xml_response(0, &[])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let (query, params) = SearchCriteria::new()
        .author("Smith JA")
        .start_date("2012-01-15")
        .end_date("2013-06-30")
        .results(25)
        .offset(50)
        .build();

    let result = client.search(&query, &params).await.unwrap();
    assert_eq!(result.count, 0);
}

#[tokio::test]
#[traced_test]
async fn test_malformed_search_response_downgrades_to_empty_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not xml"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client
        .search("cancer[ti]", &SearchParams::new())
        .await
        .unwrap();

    assert_eq!(result.count, 0);
    assert!(result.pubmed_ids.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_search_response_without_count_downgrades_to_empty_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<eSearchResult><IdList><Id>123</Id></IdList></eSearchResult>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client
        .search("cancer[ti]", &SearchParams::new())
        .await
        .unwrap();

    assert_eq!(result.count, 0);
    assert!(result.pubmed_ids.is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_fetch_requests_medline_xml_for_joined_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "111,222"))
        .and(query_param("rettype", "medline"))
        .and(query_param("retmode", "xml"))
        .and(query_param("db", "pubmed"))
        .and(query_param("tool", "dfhcc_informatics"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(efetch_xml_response(&["111", "222"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client.fetch(&["111", "222"]).await.unwrap();

    assert_eq!(result.count(), 2);
    assert_eq!(result.publications[0].pubmed_id, "111");
    assert_eq!(result.publications[0].date_published, "2013-5-6");
    assert_eq!(result.publications[1].pubmed_id, "222");
}

#[tokio::test]
#[traced_test]
async fn test_fetch_single_article_yields_one_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(efetch_xml_response(&["23645694"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client.fetch(&["23645694"]).await.unwrap();

    assert_eq!(result.count(), 1);
    assert_eq!(result.publications[0].pubmed_id, "23645694");
}

#[tokio::test]
#[traced_test]
async fn test_search_and_fetch_carries_total_count() {
    let mock_server = MockServer::start().await;

    // 250 matches, but only two IDs returned on this page
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(esearch_xml_response(250, &["111", "222"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "111,222"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(efetch_xml_response(&["111", "222"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client
        .search_and_fetch("cancer[ti]", &SearchParams::new())
        .await
        .unwrap();

    assert_eq!(result.count(), 2);
    assert_eq!(result.total_count, Some(250));
}

#[tokio::test]
#[traced_test]
async fn test_search_and_fetch_with_no_matches_skips_the_fetch_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_xml_response(0, &[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client
        .search_and_fetch("nothing matches this", &SearchParams::new())
        .await
        .unwrap();

    assert_eq!(result.count(), 0);
    assert_eq!(result.total_count, Some(0));
}

#[tokio::test]
#[traced_test]
async fn test_find_first_by_pubmed_id_returns_the_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("id", "23645694"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(efetch_xml_response(&["23645694"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let record = client.find_first_by_pubmed_id("23645694").await.unwrap();

    assert_eq!(record.unwrap().pubmed_id, "23645694");
}

#[tokio::test]
#[traced_test]
async fn test_find_by_author_aliases_builds_or_joined_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", "(Smith J[AU] OR Smith JA[AU])"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(esearch_xml_response(1, &["111"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_xml_response(&["111"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client
        .find_by_author_aliases(&["Smith J", "Smith JA"], &SearchParams::new())
        .await
        .unwrap();

    assert_eq!(result.count(), 1);
    assert_eq!(result.total_count, Some(1));
}

#[tokio::test]
#[traced_test]
async fn test_search_by_author_in_year_sends_raw_year_range() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("retmax", "1000"))
        .and(query_param("mindate", "2013/01/01"))
        .and(query_param("maxdate", "2013/12/31"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(esearch_xml_response(3, &["1", "2", "3"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let result = client
        .search_by_author_in_year("Smith JA", 2013)
        .await
        .unwrap();

    assert_eq!(result.count, 3);
    assert_eq!(result.pubmed_ids.len(), 3);
}

#[tokio::test]
#[traced_test]
async fn test_paginated_search_runs_when_criteria_are_complete() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(esearch_xml_response(1, &["12345"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_xml_response(&["12345"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server.uri());
    let criteria = SearchCriteria::new()
        .author("Smith JA")
        .title("cancer")
        .pubmed_ids("12345");

    let result = client.paginated_search(&criteria).await.unwrap();
    assert_eq!(result.unwrap().count(), 1);
}
