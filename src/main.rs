#[tokio::main]
async fn main() {
  if let Err(e) = bike_log::run().await {
    tracing::error!(error = %e, "Fatal error");
    eprintln!("bike-log: {}", e);
    std::process::exit(1);
  }
}
