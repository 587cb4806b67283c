use std::path::Path;
use std::time::Duration;

use clap::Parser;

use hotcfg::reload::decode::decode;
use hotcfg::reload::loader::{load_from_file, load_from_url};
use hotcfg::reload::Signature;
use hotcfg::settings::schema::DEFAULT_FETCH_TIMEOUT_SECS;
use hotcfg::PayloadFormat;

#[derive(Parser)]
#[command(name = "hotcfg-check")]
#[command(about = "Fetch and decode a configuration payload without applying it", long_about = None)]
struct Cli {
    /// File path or http(s) URL of the payload.
    source: String,

    #[arg(short, long, value_enum, default_value_t = PayloadFormat::Json)]
    format: PayloadFormat,

    /// Timeout in seconds for URL sources.
    #[arg(short, long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data = if cli.source.starts_with("http://") || cli.source.starts_with("https://") {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cli.timeout))
            .build()?;
        load_from_url(&client, &cli.source).await?
    } else {
        load_from_file(Path::new(&cli.source)).await?
    };

    let entries = decode(&data, cli.format)?;

    eprintln!("signature: {}", Signature::of(&data));
    eprintln!("entries:   {}", entries.len());
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
