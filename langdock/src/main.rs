use anyhow::Result;
use clap::Parser;
use langdock::server::{self, params::Params};

#[tokio::main]
async fn main() -> Result<()> {
    let params = Params::parse();
    server::start(params).await
}
