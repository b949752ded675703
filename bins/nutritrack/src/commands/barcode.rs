//! Barcode lookup

use super::ProductNotFound;
use anyhow::Result;
use nutritrack_cli::output::print_record;
use nutritrack_cli::progress;
use nutritrack_core::config::Config;
use nutritrack_core::observe::SharedObserver;
use nutritrack_pipeline::SearchPipeline;
use nutritrack_telemetry::Timer;

pub async fn run(config: &Config, observer: SharedObserver, code: &str, json: bool) -> Result<()> {
    let pipeline = SearchPipeline::from_config_with_observer(config, observer)?;

    let spinner = progress::spinner(&format!("Looking up {}...", code.trim()));
    let timer = Timer::start("cli.lookup_ms");
    let record = pipeline.lookup(code).await;
    timer.stop();
    progress::finish(&spinner);

    let Some(record) = record? else {
        if json {
            println!("null");
        }
        return Err(ProductNotFound(code.trim().to_string()).into());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(())
}
