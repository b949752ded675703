//! Ranked text search

use anyhow::Result;
use nutritrack_cli::output::{format_count, print_ranked, Status};
use nutritrack_cli::progress;
use nutritrack_core::config::Config;
use nutritrack_core::observe::SharedObserver;
use nutritrack_pipeline::SearchPipeline;
use nutritrack_telemetry::Timer;

/// Command line overrides for ranking
pub struct Options {
    pub limit: Option<usize>,
    pub min_score: Option<u8>,
    pub fuzzy: bool,
    pub json: bool,
}

pub async fn run(config: &Config, observer: SharedObserver, query: &str, options: Options) -> Result<()> {
    let mut config = config.clone();
    let ranking = &mut config.schema.ranking;
    if let Some(limit) = options.limit {
        ranking.max_results = limit;
    }
    if let Some(min_score) = options.min_score {
        ranking.min_relevance_score = min_score;
    }
    ranking.fuzzy_matching &= options.fuzzy;
    ranking.validate()?;

    let pipeline = SearchPipeline::from_config_with_observer(&config, observer)?;

    let spinner = progress::spinner(&format!("Searching for \"{}\"...", query.trim()));
    let timer = Timer::start("cli.search_ms");
    let results = pipeline.search(query).await;
    timer.stop();
    progress::finish(&spinner);
    let results = results?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        Status::warning(&format!("No results for \"{}\"", query.trim()));
        return Ok(());
    }

    Status::header(&format!(
        "{} for \"{}\"",
        format_count(results.len(), "result", "results"),
        query.trim()
    ));
    print_ranked(&results);
    Ok(())
}
