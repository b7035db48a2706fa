use scraperapi_http::{ClientOptions, ScrapeParams, ScrapeRequest, ScraperClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = ScraperClient::from_env()?
        .with_options(ClientOptions {
            debug: true,
            ..ClientOptions::default()
        })?
        .with_default_params(ScrapeParams::new().country_code("us"));

    let response = client
        .send(ScrapeRequest::get("https://httpbin.org/ip").param("render", "true"))
        .await?;
    println!("{}", response.text());

    let account = client.account_info().await?;
    println!(
        "used {}/{} requests, {} concurrent",
        account.request_count, account.request_limit, account.concurrent_requests
    );

    Ok(())
}
