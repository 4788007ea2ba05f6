use clap::{Parser, Subcommand};
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Management CLI for the resilient catalog service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show breaker, cache and fallback status
    Status,
    /// Close the breaker and clear the cache
    Reset,
    /// Fetch a single product by id
    Product { id: String },
    /// Fetch a page of products
    Page { page: u32 },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.as_str();

    match cli.command {
        Commands::Status => {
            let res = client.get(endpoint(base, &["admin", "status"])?).send().await?;
            print_response(res).await?;
        }
        Commands::Reset => {
            let res = client.post(endpoint(base, &["admin", "reset"])?).send().await?;
            if res.status().is_success() {
                println!("Breaker closed and cache cleared");
            } else {
                print_response(res).await?;
            }
        }
        Commands::Product { id } => {
            let res = client
                .get(endpoint(base, &["products", id.as_str()])?)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Page { page } => {
            let res = client
                .get(endpoint(base, &["products"])?)
                .query(&[("page", page)])
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Append path segments to the service URL, escaping each one.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("cannot use '{}' as a service URL", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Some(retry_after) = res.headers().get(reqwest::header::RETRY_AFTER) {
            eprintln!("Retry after: {}s", retry_after.to_str().unwrap_or("?"));
        }
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_escapes_product_id() {
        let url = endpoint("http://localhost:3000", &["products", "a/b?c#d"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/products/a%2Fb%3Fc%23d");
    }

    #[test]
    fn test_endpoint_with_trailing_slash() {
        let url = endpoint("http://localhost:3000/", &["admin", "status"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/admin/status");
    }
}
