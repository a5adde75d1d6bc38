use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::process;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;

use greenshelf_bridge::Bridge;
use greenshelf_core::{
    demo_catalog, FixedClock, GreenShelfService, InventoryStore, SimulatedSensorFeed,
    StatusColor, StatusDemandModel,
};
use greenshelf_pipeline::candidate_pipeline::{CandidatePipeline, PipelineResult};
use greenshelf_pipeline::inventory_loader::{load_batches_file, load_catalog_file, receive_all};
use greenshelf_pipeline::pipelines::markdown_digest::MarkdownDigestPipeline;
use greenshelf_pipeline::types::{DigestQuery, MarkdownCandidate, ShelfAction};

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DigestJson<'a> {
    generated_at: String,
    as_of: Option<NaiveDate>,
    shelf_filter: &'a [String],
    pipeline_ms: u128,
    layout: &'a BTreeMap<String, StatusColor>,
    actions: &'a [MarkdownCandidate],
    summary: SummaryJson,
}

#[derive(Serialize)]
struct SummaryJson {
    batches_loaded: usize,
    batches_priced: usize,
    batches_filtered_out: usize,
    actions_selected: usize,
    markdowns: usize,
    donations: usize,
    discards: usize,
    value_at_risk: f64,
}

#[derive(Serialize)]
struct OpErrorJson<'a> {
    line: usize,
    error: &'a str,
}

fn summarize(
    result: &PipelineResult<DigestQuery, MarkdownCandidate>,
    batches_loaded: usize,
) -> SummaryJson {
    let selected = &result.selected_candidates;
    let count = |action: ShelfAction| {
        selected
            .iter()
            .filter(|c| c.action == Some(action))
            .count()
    };
    SummaryJson {
        batches_loaded,
        batches_priced: result.retrieved_candidates.len(),
        batches_filtered_out: result.filtered_candidates.len(),
        actions_selected: selected.len(),
        markdowns: count(ShelfAction::Markdown),
        donations: count(ShelfAction::Donate),
        discards: count(ShelfAction::Discard),
        value_at_risk: selected.iter().filter_map(|c| c.value_at_risk).sum(),
    }
}

// ---------------------------------------------------------------------------
// Operation replay
// ---------------------------------------------------------------------------

/// Run each non-blank, non-`#` line of a JSON-lines file through the
/// bridge, printing one JSON object per line.
fn replay_ops(bridge: &mut Bridge, path: &str) -> Result<usize, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;

    let mut processed = 0;
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let printed = match bridge.handle(line) {
            Ok(response) => serde_json::to_string(&response),
            Err(e) => serde_json::to_string(&OpErrorJson {
                line: idx + 1,
                error: &e.to_string(),
            }),
        };
        match printed {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("could not serialize response for line {}: {}", idx + 1, e),
        }
        processed += 1;
    }
    Ok(processed)
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

/// Format a number with comma thousands separators and cents.
fn format_dollars(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };
    let whole = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, ch) in whole.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!(
        "{}{}.{:02}",
        sign,
        grouped.chars().rev().collect::<String>(),
        cents % 100
    )
}

fn color_icon(color: StatusColor) -> &'static str {
    match color {
        StatusColor::Green => "  ",
        StatusColor::Yellow => ". ",
        StatusColor::Orange => "! ",
        StatusColor::Red => "!!",
        StatusColor::DarkRed => "XX",
        StatusColor::Unknown => "--",
    }
}

fn print_human(
    result: &PipelineResult<DigestQuery, MarkdownCandidate>,
    layout: &BTreeMap<String, StatusColor>,
    summary: &SummaryJson,
    load_ms: u128,
    pipeline_ms: u128,
) {
    let bar = "\u{2550}".repeat(62);
    println!();
    println!("  \u{2554}{}\u{2557}", bar);
    println!("  \u{2551}{:^62}\u{2551}", "GREENSHELF \u{00b7} Morning Markdown Digest");
    println!("  \u{255a}{}\u{255d}", bar);
    println!();

    let as_of = result
        .query
        .as_of
        .map(|d| d.to_string())
        .unwrap_or_else(|| "today".into());
    println!(
        "  As of {}  \u{00b7}  {} shelves  \u{00b7}  {} batches loaded  \u{00b7}  {} priced",
        as_of,
        layout.len(),
        summary.batches_loaded,
        summary.batches_priced
    );
    println!();

    println!("  Shelf layout");
    for (shelf, color) in layout {
        println!("    {} {:28} {}", color_icon(*color), shelf, color);
    }
    println!();

    if result.selected_candidates.is_empty() {
        println!("  No markdowns, donations or discards needed today.");
    } else {
        println!(
            "  {} actions  \u{00b7}  {} markdown  \u{00b7}  {} donate  \u{00b7}  {} discard  \u{00b7}  ${} at risk",
            summary.actions_selected,
            summary.markdowns,
            summary.donations,
            summary.discards,
            format_dollars(summary.value_at_risk)
        );
        println!("  {:\u{2500}<64}", "");
        for (i, c) in result.selected_candidates.iter().enumerate() {
            let action = c.action.unwrap_or(ShelfAction::None);
            println!(
                "  {} {:>2}. {:10} {:16} {:>3} x {:28}",
                color_icon(c.status_color),
                i + 1,
                action.to_string(),
                c.instance_id,
                c.quantity,
                c.product_name,
            );
            let price = if action == ShelfAction::Markdown {
                format!(
                    "${} -> ${} ({:.0}% off)",
                    format_dollars(c.original_price),
                    format_dollars(c.discounted_price),
                    c.discount_percentage * 100.0
                )
            } else {
                format!("${}", format_dollars(c.original_price))
            };
            println!(
                "        {}  \u{00b7}  {}  \u{00b7}  {} ({} days)  \u{00b7}  {}",
                c.shelf_id, c.status, c.predicted_spoilage_date, c.days_remaining, price
            );
            println!("        {}", c.reason);
            println!();
        }
        println!("  {:\u{2500}<64}", "");
    }

    println!();
    println!(
        "  \u{23f1}  CSV loaded in {}ms \u{00b7} Pipeline ran in {}ms \u{00b7} Total {}ms",
        load_ms,
        pipeline_ms,
        load_ms + pipeline_ms
    );
    println!();
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

struct Options {
    batches_csv: String,
    catalog_csv: Option<String>,
    shelves: Vec<String>,
    top_k: usize,
    today: Option<NaiveDate>,
    seed: Option<u64>,
    simulate: bool,
    ops_file: Option<String>,
    json_output: bool,
}

fn usage() -> ! {
    eprintln!("Usage: greenshelf-server <batches.csv> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --catalog FILE     Product catalog CSV (default: built-in demo catalog)");
    eprintln!("  --shelves a,b      Comma-separated shelf IDs to include in the digest");
    eprintln!("  --top N            Number of actions to list (default: 10)");
    eprintln!("  --today DATE       Pin the clock to YYYY-MM-DD");
    eprintln!("  --seed N           Seed the simulated sensor feed and demand model");
    eprintln!("  --no-simulate      Skip the simulated sensor refresh before pricing");
    eprintln!("  --ops FILE         Replay JSON-lines bridge operations before the digest");
    eprintln!("  --json             Output as JSON instead of formatted text");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  greenshelf-server fixtures/sample_batches.csv --today 2025-06-10 --seed 7");
    eprintln!("  greenshelf-server fixtures/sample_batches.csv --ops fixtures/sample_ops.jsonl --json");
    process::exit(1);
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let batches_csv = args.get(1).ok_or("missing batches CSV")?.clone();
    let mut opts = Options {
        batches_csv,
        catalog_csv: None,
        shelves: Vec::new(),
        top_k: greenshelf_pipeline::pipelines::markdown_digest::DEFAULT_DIGEST_SIZE,
        today: None,
        seed: None,
        simulate: true,
        ops_file: None,
        json_output: false,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--catalog" => {
                opts.catalog_csv = Some(flag_value(args, i, "--catalog")?.to_string());
                i += 2;
            }
            "--shelves" => {
                opts.shelves = flag_value(args, i, "--shelves")?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                i += 2;
            }
            "--top" => {
                opts.top_k = flag_value(args, i, "--top")?
                    .parse()
                    .map_err(|_| "--top requires a positive integer".to_string())?;
                i += 2;
            }
            "--today" => {
                let raw = flag_value(args, i, "--today")?;
                opts.today = Some(
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .map_err(|e| format!("--today '{}': {}", raw, e))?,
                );
                i += 2;
            }
            "--seed" => {
                opts.seed = Some(
                    flag_value(args, i, "--seed")?
                        .parse()
                        .map_err(|_| "--seed requires an unsigned integer".to_string())?,
                );
                i += 2;
            }
            "--ops" => {
                opts.ops_file = Some(flag_value(args, i, "--ops")?.to_string());
                i += 2;
            }
            "--no-simulate" => {
                opts.simulate = false;
                i += 1;
            }
            "--json" => {
                opts.json_output = true;
                i += 1;
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(opts)
}

fn build_service(opts: &Options) -> Result<GreenShelfService, String> {
    let catalog = match &opts.catalog_csv {
        Some(path) => load_catalog_file(path)?,
        None => demo_catalog(),
    };
    let mut service = GreenShelfService::new(Arc::new(InventoryStore::new(catalog)));
    if let Some(day) = opts.today {
        service = service.with_clock(Arc::new(FixedClock::on(day)));
    }
    if let Some(seed) = opts.seed {
        service = service
            .with_sensor_feed(Arc::new(SimulatedSensorFeed::seeded(seed)))
            .with_demand_source(Arc::new(StatusDemandModel::seeded(seed)));
    }
    Ok(service)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }
    let opts = match parse_args(&args) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            usage();
        }
    };

    let service = match build_service(&opts) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Error loading catalog: {}", e);
            process::exit(1);
        }
    };

    // Load and receive batches from CSV
    let load_start = Instant::now();
    let records = match load_batches_file(&opts.batches_csv) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error loading CSV: {}", e);
            process::exit(1);
        }
    };
    let batches_loaded = match receive_all(&service, &records) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("Error receiving batches: {}", e);
            process::exit(1);
        }
    };
    let load_ms = load_start.elapsed().as_millis();
    log::info!("received {} batches from {}", batches_loaded, opts.batches_csv);

    if let Some(ref path) = opts.ops_file {
        let mut bridge = Bridge::new(Arc::clone(&service));
        match replay_ops(&mut bridge, path) {
            Ok(n) => log::info!("replayed {} operations from {}", n, path),
            Err(e) => {
                eprintln!("Error replaying operations: {}", e);
                process::exit(1);
            }
        }
    }

    let known_shelves = service.store().shelf_ids();
    let unknown: Vec<&String> = opts
        .shelves
        .iter()
        .filter(|s| !known_shelves.contains(*s))
        .collect();
    if !unknown.is_empty() {
        eprintln!("Warning: unknown shelves {:?}", unknown);
        eprintln!("  Available: {:?}", known_shelves);
    }

    // Build and run pipeline
    let pipeline_start = Instant::now();
    let pipeline = MarkdownDigestPipeline::with_size(Arc::clone(&service), opts.top_k);
    let query = DigestQuery {
        request_id: "digest-001".into(),
        shelf_ids: opts.shelves.clone(),
        as_of: opts.today,
        simulate_updates: opts.simulate,
        status_filter: None,
    };
    let result = pipeline.execute(query).await;
    let pipeline_ms = pipeline_start.elapsed().as_millis();

    let layout = service.layout_summary(false);
    let summary = summarize(&result, batches_loaded);

    if opts.json_output {
        let digest = DigestJson {
            generated_at: service.now().to_rfc3339(),
            as_of: result.query.as_of,
            shelf_filter: &opts.shelves,
            pipeline_ms,
            layout: &layout,
            actions: &result.selected_candidates,
            summary,
        };
        match serde_json::to_string_pretty(&digest) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing digest: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_human(&result, &layout, &summary, load_ms, pipeline_ms);
    }
}
