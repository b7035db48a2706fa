use scraperapi_http::{ClientOptions, ScrapeRequest, ScraperClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = ScraperClient::from_env()?.with_options(ClientOptions {
        max_attempts: 5,
        debug: true,
        ..ClientOptions::default()
    })?;

    let pages = [
        ("ip", "https://httpbin.org/ip"),
        ("headers", "https://httpbin.org/headers"),
        ("agent", "https://httpbin.org/user-agent"),
    ];
    let pending: Vec<_> = pages
        .iter()
        .map(|(name, url)| (*name, client.enqueue(ScrapeRequest::get(*url))))
        .collect();

    let results = client.resolve_all(pending).await?;
    for (name, response) in results.iter() {
        println!("{name}: {} ({} bytes)", response.status, response.body.len());
    }

    Ok(())
}
