use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "lb-cli")]
#[command(about = "Query the load balancer admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:9100")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Version and alive/total backend counts
    Status,
    /// Liveness of every backend, in round-robin order
    Backends,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let path = match cli.command {
        Commands::Status => "status",
        Commands::Backends => "backends",
    };

    let url = format!("{}/admin/{}", cli.url.trim_end_matches('/'), path);
    let json = fetch(&client, &url).await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// GET an admin endpoint; a non-success status is an error.
async fn fetch(client: &reqwest::Client, url: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let res = client.get(url).send().await?;
    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(format!("admin API returned status {}: {}", status, text.trim()).into());
    }

    Ok(res.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let base = serve(Router::new().route(
            "/admin/status",
            get(|| async { Json(serde_json::json!({"backends_total": 2})) }),
        ))
        .await;

        let json = fetch(&reqwest::Client::new(), &format!("{}/admin/status", base))
            .await
            .unwrap();
        assert_eq!(json["backends_total"], 2);
    }

    #[tokio::test]
    async fn test_fetch_error_status_fails() {
        let base = serve(Router::new().route(
            "/admin/status",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        ))
        .await;

        let err = fetch(&reqwest::Client::new(), &format!("{}/admin/status", base))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"), "{}", err);
    }

    #[tokio::test]
    async fn test_fetch_missing_route_fails() {
        let base = serve(Router::new()).await;
        assert!(fetch(&reqwest::Client::new(), &format!("{}/admin/backends", base))
            .await
            .is_err());
    }
}
