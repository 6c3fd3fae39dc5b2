use revos_provider::{init_logging, serve, RevosProvider};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!(version = env!("CARGO_PKG_VERSION"), "starting revos provider");
    serve(RevosProvider::new()).await
}
