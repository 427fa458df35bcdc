#![deny(warnings)]

use anyhow::Result;
use business_central::args::Args;
use business_central::run;
use std::env;

fn init_logger() {
    let has_debug_flag = env::args().any(|s| s.eq("--debug") || s.eq("-d"));

    let mut builder = env_logger::Builder::from_default_env();

    if env::var("RUST_LOG").is_err() && has_debug_flag {
        builder.filter_level(log::LevelFilter::Debug);
    }

    builder.init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let args = Args::parse().await?;
    println!("{}", run(args).await?);

    Ok(())
}
