use mock_server::Config;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let config = Config::from_env();
    let listener = TcpListener::bind(&addr).await?;
    println!("mock Imagga API listening on http://{addr}/v1/ (key {})", config.api_key);
    mock_server::run_with(listener, config).await
}
