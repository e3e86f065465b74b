//! Integration tests for fetching and pagination
//!
//! These tests use wiremock to serve search result pages and exercise the
//! fetch, retry, extraction and pagination cycle end-to-end.

use avito_monitor::config::ScraperConfig;
use avito_monitor::crawler::{FetchResult, Fetcher, Paginator, RetryPolicy};
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a scraper configuration pointing at the mock server
fn create_test_config(base_url: &str) -> ScraperConfig {
    ScraperConfig {
        request_timeout_secs: 5,
        max_retries: 3,
        delay_secs: 0.0,
        rotate_user_agent: false,
        base_url: base_url.to_string(),
        local_priority: true,
    }
}

/// Fetcher without any waiting between attempts
fn create_fetcher(config: &ScraperConfig, max_attempts: u32) -> Fetcher {
    Fetcher::new(config).unwrap().with_retry_policy(RetryPolicy {
        max_attempts,
        delay: Duration::ZERO,
        max_jitter: Duration::ZERO,
    })
}

fn create_paginator(base_url: &str, max_attempts: u32) -> Paginator {
    let config = create_test_config(base_url);
    let fetcher = create_fetcher(&config, max_attempts);
    Paginator::new(fetcher, &config)
        .unwrap()
        .with_page_pause(Duration::ZERO, Duration::ZERO)
}

/// Renders a results page with `count` listings numbered from `first_id`
fn results_page(first_id: usize, count: usize) -> String {
    let items: String = (first_id..first_id + count)
        .map(|id| {
            format!(
                r#"<div data-marker="item" data-item-id="{id}">
                    <a itemprop="url" href="/moskva/mebel/item_{id}"><h3 itemprop="name">Listing {id}</h3></a>
                    <p data-marker="item-price"><span>{price} ₽</span></p>
                    <span data-marker="item-location">Москва</span>
                    <p data-marker="item-date">сегодня</p>
                </div>"#,
                id = id,
                price = 1000 + id
            )
        })
        .collect();
    format!("<html><body><div data-marker=\"catalog-serp\">{items}</div></body></html>")
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/moskva"))
        .and(query_param("p", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_unrequested_page(server: &MockServer, page: &str) {
    Mock::given(method("GET"))
        .and(path("/moskva"))
        .and(query_param("p", page))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(9000, 50)))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_retries_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let fetcher = create_fetcher(&config, 3);

    let result = fetcher.fetch(&format!("{}/page", mock_server.uri())).await;
    match result {
        FetchResult::Success {
            status_code, body, ..
        } => {
            assert_eq!(status_code, 200);
            assert_eq!(body, "<html>ok</html>");
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_gives_up_after_all_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let fetcher = create_fetcher(&config, 3);

    let result = fetcher.fetch(&format!("{}/page", mock_server.uri())).await;
    match result {
        FetchResult::Failed { attempts, error } => {
            assert_eq!(attempts, 3);
            assert_eq!(error, "HTTP 503");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_sends_browser_identity() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept-language"))
        .and(header("sec-fetch-mode", "navigate"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let fetcher = create_fetcher(&config, 1);

    let result = fetcher.fetch(&format!("{}/page", mock_server.uri())).await;
    assert!(result.is_success());
}

#[tokio::test]
async fn test_paginator_stops_at_limit() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "1", results_page(0, 50)).await;
    mount_page(&mock_server, "2", results_page(50, 50)).await;
    mount_unrequested_page(&mock_server, "3").await;

    let paginator = create_paginator(&mock_server.uri(), 2);
    let records = paginator
        .collect(&format!("{}/moskva", mock_server.uri()), 70)
        .await
        .unwrap();

    assert_eq!(records.len(), 70);
    assert_eq!(records[0].id, "0");
    assert_eq!(records[69].id, "69");
}

#[tokio::test]
async fn test_paginator_stops_after_short_page() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "1", results_page(0, 50)).await;
    mount_page(&mock_server, "2", results_page(50, 20)).await;
    mount_unrequested_page(&mock_server, "3").await;

    let paginator = create_paginator(&mock_server.uri(), 2);
    let records = paginator
        .collect(&format!("{}/moskva", mock_server.uri()), 500)
        .await
        .unwrap();

    assert_eq!(records.len(), 70);
    let ids: Vec<usize> = records.iter().map(|r| r.id.parse().unwrap()).collect();
    assert_eq!(ids, (0..70).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_paginator_stops_on_empty_page() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "1", results_page(0, 50)).await;
    mount_page(
        &mock_server,
        "2",
        "<html><body><p>Ничего не найдено</p></body></html>".to_string(),
    )
    .await;
    mount_unrequested_page(&mock_server, "3").await;

    let paginator = create_paginator(&mock_server.uri(), 2);
    let records = paginator
        .collect(&format!("{}/moskva", mock_server.uri()), 500)
        .await
        .unwrap();

    assert_eq!(records.len(), 50);
}

#[tokio::test]
async fn test_paginator_returns_partial_results_on_fetch_failure() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "1", results_page(0, 50)).await;

    Mock::given(method("GET"))
        .and(path("/moskva"))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let paginator = create_paginator(&mock_server.uri(), 2);
    let records = paginator
        .collect(&format!("{}/moskva", mock_server.uri()), 500)
        .await
        .unwrap();

    assert_eq!(records.len(), 50);
}

#[tokio::test]
async fn test_paginator_query_parameters_and_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/moskva"))
        .and(query_param("q", "диван"))
        .and(query_param("localPriority", "1"))
        .and(query_param("p", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(0, 3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let paginator = create_paginator(&mock_server.uri(), 1);
    let records = paginator
        .collect(&format!("{}/moskva?q=диван&p=9", mock_server.uri()), 10)
        .await
        .unwrap();

    assert_eq!(records.len(), 3);

    let first = &records[0];
    assert_eq!(first.id, "0");
    assert_eq!(first.title, "Listing 0");
    assert_eq!(first.url, format!("{}/moskva/mebel/item_0", mock_server.uri()));
    assert_eq!(first.price, 1000.0);
    assert_eq!(first.location, "Москва");
    assert_eq!(first.date, "сегодня");
    assert_eq!(first.error, None);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let pages: Vec<_> = requests[0]
        .url
        .query_pairs()
        .filter(|(k, _)| k == "p")
        .collect();
    assert_eq!(pages.len(), 1);
}

#[tokio::test]
async fn test_paginator_rejects_invalid_url() {
    let paginator = create_paginator("https://www.avito.ru", 1);
    let result = paginator.collect("not a url", 10).await;
    assert!(result.is_err());
}
