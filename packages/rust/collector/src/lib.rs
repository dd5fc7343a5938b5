//! Signal collection — the pipeline's scatter-gather stage.
//!
//! Three independent GET requests (RSS feed, vulnerability search, social
//! search) issued concurrently and joined all-or-nothing: a failure on any
//! one aborts the whole collection with no partial results and no retry.

pub mod feed;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use threatwire_shared::{
    Config, FeedItem, MAX_ITEMS_PER_SOURCE, Result, SignalBundle, ThreatwireError,
};

/// Fetch all three signal sources for `term` and join the results.
///
/// No ordering guarantee on which request fires first; all three must
/// complete before this returns.
#[instrument(skip_all, fields(term = %term))]
pub async fn collect(client: &Client, config: &Config, term: &str) -> Result<SignalBundle> {
    let (rss, nvd, twitter) = tokio::try_join!(
        fetch_feed(client, &config.endpoints.rss, term),
        fetch_advisories(client, &config.endpoints.nvd, term),
        fetch_social(client, &config.endpoints.twitter, &config.twitter_bearer, term),
    )?;

    let bundle = SignalBundle { rss, nvd, twitter };
    info!(
        rss = bundle.rss.len(),
        nvd = bundle.nvd.len(),
        twitter = bundle.twitter.len(),
        "collection complete"
    );
    Ok(bundle)
}

/// Fetch the RSS source and parse it as a feed channel.
async fn fetch_feed(client: &Client, url: &Url, term: &str) -> Result<Vec<FeedItem>> {
    debug!(%url, "fetching feed");
    let body = get_checked(client.get(url.clone()).query(&[("q", term)]), url)
        .await?
        .text()
        .await
        .map_err(|e| ThreatwireError::network(format!("{url}: body read failed: {e}")))?;

    let mut items = feed::parse_channel(&body);
    items.truncate(MAX_ITEMS_PER_SOURCE);
    Ok(items)
}

/// Fetch the vulnerability database keyword search.
async fn fetch_advisories(
    client: &Client,
    url: &Url,
    term: &str,
) -> Result<Vec<serde_json::Value>> {
    debug!(%url, "fetching advisories");
    let data = get_json(
        client
            .get(url.clone())
            .query(&[("keywordSearch", term), ("resultsPerPage", "100")]),
        url,
    )
    .await?;
    Ok(json_list(&data, "vulnerabilities"))
}

/// Fetch the social-media recent search (bearer auth).
async fn fetch_social(
    client: &Client,
    url: &Url,
    bearer: &str,
    term: &str,
) -> Result<Vec<serde_json::Value>> {
    debug!(%url, "fetching social search");
    let data = get_json(
        client
            .get(url.clone())
            .bearer_auth(bearer)
            .query(&[("query", term), ("max_results", "10")]),
        url,
    )
    .await?;
    Ok(json_list(&data, "data"))
}

/// Send a GET and validate the status. Any failure is a network error naming
/// the endpoint.
async fn get_checked(request: reqwest::RequestBuilder, url: &Url) -> Result<reqwest::Response> {
    let response = request
        .send()
        .await
        .map_err(|e| ThreatwireError::network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ThreatwireError::network(format!("{url}: HTTP {status}")));
    }
    Ok(response)
}

async fn get_json(request: reqwest::RequestBuilder, url: &Url) -> Result<serde_json::Value> {
    get_checked(request, url)
        .await?
        .json()
        .await
        .map_err(|e| ThreatwireError::network(format!("{url}: invalid JSON body: {e}")))
}

/// Pull a top-level array out of a source response, truncated to the
/// per-source cap. A missing or non-array key yields an empty list.
fn json_list(value: &serde_json::Value, key: &str) -> Vec<serde_json::Value> {
    let mut items = value
        .get(key)
        .and_then(serde_json::Value::as_array)
        .cloned()
        .unwrap_or_default();
    items.truncate(MAX_ITEMS_PER_SOURCE);
    items
}

#[cfg(test)]
mod collector_tests {
    use super::*;
    use threatwire_shared::Endpoints;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base: &str) -> Config {
        Config {
            openai_api_key: "test-key".into(),
            twitter_bearer: "test-bearer".into(),
            webhook_url: Url::parse("https://hooks.example.com/wh").unwrap(),
            output_dir: std::env::temp_dir(),
            endpoints: Endpoints {
                rss: Url::parse(&format!("{base}/rss")).unwrap(),
                nvd: Url::parse(&format!("{base}/nvd")).unwrap(),
                twitter: Url::parse(&format!("{base}/social")).unwrap(),
                completion_base: Url::parse(&format!("{base}/v1")).unwrap(),
            },
            model: "gpt-4o-mini".into(),
        }
    }

    const FEED_BODY: &str = r#"<rss><channel>
        <item><title>Alpha</title><link>https://f.example/1</link></item>
        <item><title>Beta</title><link>https://f.example/2</link></item>
    </channel></rss>"#;

    #[tokio::test]
    async fn collect_joins_all_three_sources() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rss"))
            .and(query_param("q", "apt29"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED_BODY))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/nvd"))
            .and(query_param("keywordSearch", "apt29"))
            .and(query_param("resultsPerPage", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "vulnerabilities": [{"cve": {"id": "CVE-2026-0001"}}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/social"))
            .and(query_param("query", "apt29"))
            .and(query_param("max_results", "10"))
            .and(header("authorization", "Bearer test-bearer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "1", "text": "ioc: 203.0.113.7"}]
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = Client::new();
        let bundle = collect(&client, &config, "apt29").await.unwrap();

        assert_eq!(bundle.rss.len(), 2);
        assert_eq!(bundle.rss[0].title, "Alpha");
        assert_eq!(bundle.nvd.len(), 1);
        assert_eq!(bundle.twitter.len(), 1);
    }

    #[tokio::test]
    async fn one_failed_source_aborts_collection() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rss"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED_BODY))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/nvd"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/social"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": []
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = Client::new();
        let err = collect(&client, &config, "apt29").await.unwrap_err();

        assert!(matches!(err, ThreatwireError::Network(_)));
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[tokio::test]
    async fn source_lists_are_capped_at_100() {
        let server = MockServer::start().await;

        let many: Vec<serde_json::Value> = (0..150)
            .map(|i| serde_json::json!({"cve": {"id": format!("CVE-2026-{i:04}")}}))
            .collect();

        Mock::given(method("GET"))
            .and(path("/rss"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED_BODY))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/nvd"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"vulnerabilities": many})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/social"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": []
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = Client::new();
        let bundle = collect(&client, &config, "apt29").await.unwrap();

        assert_eq!(bundle.nvd.len(), MAX_ITEMS_PER_SOURCE);
    }

    #[tokio::test]
    async fn missing_arrays_yield_empty_lists() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rss"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss></rss>"))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/nvd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalResults": 0
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/social"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "meta": {"result_count": 0}
            })))
            .mount(&server)
            .await;

        let config = test_config(&server.uri());
        let client = Client::new();
        let bundle = collect(&client, &config, "quiet-term").await.unwrap();

        assert!(bundle.rss.is_empty());
        assert!(bundle.nvd.is_empty());
        assert!(bundle.twitter.is_empty());
        assert_eq!(bundle.item_count(), 0);
    }
}
