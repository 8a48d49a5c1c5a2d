//! # Trends Explorer CLI
//!
//! Runs one confirmed filter through the pipeline and prints the seasonal and
//! trend charts plus top queries.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use tracing::info;

use explorer::app::ranking::RankingRun;
use explorer::core::service::{DecompositionEngine, TrendsService};
use explorer::debug::{self, DebugConfig};
use explorer::services::api::ApiClient;
use explorer::services::decomposition::{DecompositionChannel, FixtureEngine, WebSocketEngine};
use explorer::ui::{ChartKind, ConsoleChart};
use explorer::{Catalog, ChartSync, DecompositionMode, Explorer, ExplorerConfig, Phase};
use shared::dto::trends::Term;

#[derive(Parser, Debug)]
#[command(name = "trends-explorer")]
#[command(about = "Seasonal and trend decomposition of search interest")]
#[command(version)]
struct Args {
    /// Terms to compare, by name, alias or entity id
    #[arg(short, long, value_delimiter = ',', default_value = "Influenza")]
    terms: Vec<String>,

    /// Region ISO code (defaults to the first catalog country)
    #[arg(short, long)]
    geo: Option<String>,

    /// Show raw interest instead of trends on the secondary chart
    #[arg(short, long)]
    merged: bool,

    /// Print the term and country catalogs and exit
    #[arg(long)]
    list_catalog: bool,

    /// Rank every catalog term against this anchor term
    #[arg(long, value_name = "TERM")]
    rank: Option<String>,

    /// Echo logs to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn resolve_term(catalog: &Catalog, query: &str) -> anyhow::Result<Term> {
    catalog
        .term_by_name(query)
        .or_else(|| catalog.term_by_entity(query.trim()))
        .cloned()
        .ok_or_else(|| anyhow!("unknown term {:?} (see --list-catalog)", query))
}

fn print_catalog(catalog: &Catalog) {
    println!("Terms:");
    for term in catalog.terms() {
        match &term.alias {
            Some(alias) => println!("  {:<22} {} ({})", term.entity, term.name, alias),
            None => println!("  {:<22} {}", term.entity, term.name),
        }
    }
    println!("Countries:");
    for geo in catalog.countries() {
        let iso = if geo.iso.is_empty() { "-" } else { geo.iso.as_str() };
        println!("  {:<4} {}", iso, geo.name);
    }
}

fn build_engine(config: &ExplorerConfig) -> anyhow::Result<Arc<dyn DecompositionEngine>> {
    let engine: Arc<dyn DecompositionEngine> = match config.decomposition_mode {
        DecompositionMode::Live => {
            let engine = Arc::new(WebSocketEngine::new(config.decomposition_url.clone()));
            if !config.keepalive_interval.is_zero() {
                let _keepalive = engine.spawn_keepalive(config.keepalive_interval);
            }
            engine
        }
        DecompositionMode::Fixture => match &config.fixture_file {
            Some(path) => Arc::new(FixtureEngine::from_file(path)?),
            None => Arc::new(FixtureEngine::echo()),
        },
    };
    Ok(engine)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut debug_config = DebugConfig::from_env();
    debug_config.log_to_stderr |= args.verbose;
    let _log_guard = debug::init(&debug_config);

    let config = ExplorerConfig::from_env().context("invalid configuration")?;
    let catalog = Catalog::builtin()?;

    if args.list_catalog {
        print_catalog(catalog);
        return Ok(());
    }

    let trends: Arc<dyn TrendsService> =
        Arc::new(ApiClient::new(config.trends_api_url.clone(), config.round_trip_timeout));
    let geo = match &args.geo {
        Some(iso) => catalog
            .country_by_iso(iso)
            .cloned()
            .ok_or_else(|| anyhow!("unknown region {:?} (see --list-catalog)", iso))?,
        None => catalog.default_geo().clone(),
    };

    if let Some(anchor) = &args.rank {
        let anchor = resolve_term(catalog, anchor)?;
        let report = RankingRun::new(trends, anchor.clone(), geo)
            .with_timeout(config.round_trip_timeout)
            .run(catalog.terms())
            .await;
        for row in &report.rows {
            println!("{} {} x {} {}", anchor.name, row.anchor_value, row.other_value, row.other);
        }
        if let Some(error) = report.error {
            bail!("ranking stopped early: {}", error);
        }
        return Ok(());
    }

    let engine = build_engine(&config)?;
    info!(engine = engine.name(), api = %config.trends_api_url, "Starting explorer");

    let seasonal_chart = Arc::new(ConsoleChart::new(ChartKind::Seasonal));
    let trend_chart = Arc::new(ConsoleChart::new(ChartKind::Trend));
    let explorer = Explorer::new(
        trends,
        DecompositionChannel::new(engine, config.round_trip_timeout),
        ChartSync::new(seasonal_chart, trend_chart.clone()),
        catalog.default_geo().clone(),
        config.settings(),
    );

    let terms = args
        .terms
        .iter()
        .map(|query| resolve_term(catalog, query))
        .collect::<anyhow::Result<Vec<_>>>()?;
    explorer.select_terms(terms)?;
    explorer.select_geo(geo);
    explorer.confirm()?;

    let phase = explorer.run_until_settled().await?;
    if phase == Phase::Failed {
        let error = explorer.state.read().last_error.clone().unwrap_or_default();
        bail!("pipeline failed: {}", error);
    }

    if args.merged {
        trend_chart.set_kind(ChartKind::Total);
        explorer.toggle_merge();
    }

    println!("\nTop queries:");
    for (term, titles) in explorer.state.read().top_query_lists() {
        println!("  {}: {}", term, titles.join(", "));
    }
    Ok(())
}
