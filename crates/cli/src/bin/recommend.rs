use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    recommend_cli::main_entry().await
}
