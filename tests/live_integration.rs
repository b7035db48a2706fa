use scraperapi_http::{ClientOptions, ScrapeRequest, ScraperClient};

fn load_live_client() -> Option<ScraperClient> {
    let client = ScraperClient::from_env().ok()?;
    client
        .with_options(ClientOptions {
            max_attempts: 2,
            ..ClientOptions::default()
        })
        .ok()
}

#[tokio::test]
async fn live_account_and_batch_roundtrip() {
    let client = match load_live_client() {
        Some(client) => client,
        None => {
            eprintln!("skipping live test: SCRAPERAPI_KEY not set");
            return;
        }
    };

    let raw = client.account().await.expect("account request must succeed");
    assert!(raw.contains("requestLimit"));

    let info = client
        .account_info()
        .await
        .expect("account document must decode");
    assert!(info.concurrency_limit >= 1);

    let first = client.enqueue(ScrapeRequest::get("https://httpbin.org/ip"));
    let second = client.enqueue(ScrapeRequest::get("https://httpbin.org/headers"));
    let results = client
        .resolve_all([("ip", first), ("headers", second)])
        .await
        .expect("batch must resolve");
    assert_eq!(results.keys().collect::<Vec<_>>(), vec!["ip", "headers"]);
}
