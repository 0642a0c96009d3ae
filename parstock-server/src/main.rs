use std::env;
use std::process;
use std::time::Instant;

use chrono::Utc;
use log::LevelFilter;
use serde::Serialize;

use parstock_core::{
    group_by_location, sort_for_display, stock_movers, DashboardStats, InventoryItem,
    InventoryReport, ItemFilter, LocationCatalog, StockMovement, VolatilityFilter,
};
use parstock_parser::{load_grid_file, parse_sheet, ParsedSheet};

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportJson<'a> {
    generated_at: String,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    header_row: Option<usize>,
    /// Every parsed item with stats over all of them.
    #[serde(flatten)]
    report: &'a InventoryReport,
    /// The filtered subset, present only when a filter flag was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    listed: Option<Vec<&'a InventoryItem>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    movers: Vec<StockMovement<'a>>,
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

const USAGE: &str = "\
Usage: parstock <sheet.csv|sheet.tsv|sheet.json> [options]

Options:
  --json              Output the {items, stats} report as JSON (filtered items under \"listed\")
  --locations <file>  JSON location catalog ({\"mainLocations\": [...], \"displayOrder\": [...]})
  --location <name>   Only list items in this location
  --search <text>     Only list items whose name, location or shelf contains text
  --below-par         Only list items below par
  --volatile          Only list items with high usage volatility
  --movers <N>        Week-over-week stock movers to show (default: 5, 0 to hide)
  -v, --verbose       Debug logging (otherwise RUST_LOG, default warn)

Example:
  parstock inventory.csv
  parstock inventory.json --below-par --location Basement --json";

#[derive(Debug)]
struct CliOptions {
    grid_path: String,
    json_output: bool,
    locations_path: Option<String>,
    filter: ItemFilter,
    movers: usize,
    verbose: bool,
}

fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let grid_path = args
        .get(1)
        .filter(|a| !a.starts_with('-'))
        .cloned()
        .ok_or_else(|| "missing sheet path".to_string())?;

    let mut options = CliOptions {
        grid_path,
        json_output: false,
        locations_path: None,
        filter: ItemFilter::default(),
        movers: 5,
        verbose: false,
    };

    let mut i = 2;
    while i < args.len() {
        let value = |name: &str| {
            args.get(i + 1)
                .cloned()
                .ok_or_else(|| format!("{} requires a value", name))
        };
        match args[i].as_str() {
            "--json" => options.json_output = true,
            "--below-par" => options.filter.below_par_only = true,
            "--volatile" => options.filter.volatility = VolatilityFilter::High,
            "-v" | "--verbose" => options.verbose = true,
            "--locations" => {
                options.locations_path = Some(value("--locations")?);
                i += 1;
            }
            "--location" => {
                options.filter.location = Some(value("--location")?);
                i += 1;
            }
            "--search" => {
                options.filter.search = Some(value("--search")?);
                i += 1;
            }
            "--movers" => {
                let raw = value("--movers")?;
                options.movers = raw
                    .parse()
                    .map_err(|_| format!("--movers requires a non-negative integer, got '{}'", raw))?;
                i += 1;
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(options)
}

fn configure_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Warn);
    }
    builder.format_timestamp(None).init();
}

fn load_catalog(path: Option<&str>) -> Result<LocationCatalog, String> {
    let Some(path) = path else {
        return Ok(LocationCatalog::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to open '{}': {}", path, e))?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid location catalog '{}': {}", path, e))
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

/// Format a number with comma thousands separators and at most two decimals.
fn format_number(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let rounded = (value.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let grouped: String = grouped.chars().rev().collect();

    match cents {
        0 => format!("{}{}", sign, grouped),
        c if c % 10 == 0 => format!("{}{}.{}", sign, grouped, c / 10),
        c => format!("{}{}.{:02}", sign, grouped, c),
    }
}

fn print_human(
    sheet: Option<&ParsedSheet>,
    all_items: &[InventoryItem],
    listed: &[&InventoryItem],
    stats: &DashboardStats,
    movers: &[StockMovement],
    catalog: &LocationCatalog,
    elapsed_ms: u128,
) {
    println!();
    println!("  \u{2554}{}\u{2557}", "\u{2550}".repeat(62));
    println!("  \u{2551}{:^62}\u{2551}", "PARSTOCK \u{00b7} Par-Level Inventory Digest");
    println!("  \u{255a}{}\u{255d}", "\u{2550}".repeat(62));
    println!();

    let Some(sheet) = sheet else {
        println!("  Sheet has fewer than two rows. Nothing to report.");
        println!();
        return;
    };

    println!(
        "  {} items  \u{00b7}  {} locations  \u{00b7}  header row {}  \u{00b7}  {} dated columns",
        stats.total_items,
        stats.locations.len(),
        sheet.header_row + 1,
        sheet.layout.snapshots.len()
    );
    println!(
        "  Stock as of {}  \u{00b7}  {} below par  \u{00b7}  {} units to order  \u{00b7}  {} volatile",
        stats.stock_source_date,
        stats.items_below_par,
        format_number(stats.total_order_amount),
        stats.high_volatility_items
    );
    println!();

    println!("  {:\u{2500}<64}", "");
    println!("  {:34} {:>6} {:>12} {:>9}", "Location", "Items", "Stock", "Below par");
    for (location, group) in group_by_location(all_items, catalog) {
        let below = group.iter().filter(|i| i.is_below_par).count();
        let stock = stats.stock_by_location.get(&location).copied().unwrap_or(0.0);
        println!(
            "  {:34} {:>6} {:>12} {:>9}",
            truncate(&location, 34),
            group.len(),
            format_number(stock),
            below
        );
    }
    println!("  {:\u{2500}<64}", "");
    println!();

    if listed.is_empty() {
        println!("  No items match the current filters.");
    } else {
        println!("  {} of {} items listed", listed.len(), all_items.len());
        println!();
        let mut current_location: Option<&str> = None;
        for item in listed {
            if current_location != Some(item.location.as_str()) {
                println!("  {}", item.location);
                current_location = Some(item.location.as_str());
            }
            let flag = match (item.is_below_par, item.is_high_volatility()) {
                (true, true) => "!~",
                (true, false) => "! ",
                (false, true) => " ~",
                (false, false) => "  ",
            };
            let name = match item.shelf.as_deref() {
                Some(shelf) => format!("{} [{}]", item.item_name, shelf),
                None => item.item_name.clone(),
            };
            let order = if item.needs_order {
                format!("order {}", format_number(item.order_amount))
            } else {
                String::new()
            };
            println!(
                "   {} {:40} {:>8} / {:<8} {}",
                flag,
                truncate(&name, 40),
                format_number(item.stock),
                format_number(item.par),
                order
            );
            if let (true, Some(link)) = (item.needs_order, item.order_link.as_deref()) {
                println!("      {}", link);
            }
        }
    }
    println!();

    if !movers.is_empty() {
        println!("  Week-over-week movers");
        println!("  {:\u{2500}<64}", "");
        for m in movers {
            let percent = if m.previous_stock > 0.0 {
                format!("({:+.0}%)", m.percent_change)
            } else {
                String::new()
            };
            println!(
                "  {:40} {:>8} \u{2192} {:<8} {}",
                truncate(m.item_id, 40),
                format_number(m.previous_stock),
                format_number(m.latest_stock),
                percent
            );
        }
        println!("  {:\u{2500}<64}", "");
        println!();
    }

    println!("  \u{23f1}  Parsed in {}ms", elapsed_ms);
    println!();
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('\u{2026}');
        cut
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };
    configure_logging(options.verbose);

    let catalog = match load_catalog(options.locations_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let start = Instant::now();
    let grid = match load_grid_file(&options.grid_path) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error loading sheet: {}", e);
            process::exit(1);
        }
    };

    let sheet = parse_sheet(&grid, &catalog);
    let items = sheet.as_ref().map(|s| s.items.clone()).unwrap_or_default();
    let report = InventoryReport::build(items, &catalog);

    let mut listed = options.filter.apply(&report.items);
    sort_for_display(&mut listed, &catalog);
    let movers = stock_movers(&report.items, options.movers);
    let elapsed_ms = start.elapsed().as_millis();

    if options.json_output {
        let json = ReportJson {
            generated_at: Utc::now().to_rfc3339(),
            source: &options.grid_path,
            header_row: sheet.as_ref().map(|s| s.header_row),
            report: &report,
            listed: options.filter.is_active().then_some(listed),
            movers,
        };
        match serde_json::to_string_pretty(&json) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing report: {}", e);
                process::exit(1);
            }
        }
    } else {
        print_human(
            sheet.as_ref(),
            &report.items,
            &listed,
            &report.stats,
            &movers,
            &catalog,
            elapsed_ms,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("parstock")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn flags_build_the_filter() {
        let o = parse_args(&args(&[
            "sheet.csv",
            "--below-par",
            "--location",
            "Basement",
            "--search",
            "glove",
            "--volatile",
            "--movers",
            "3",
            "--json",
        ]))
        .unwrap();
        assert_eq!(o.grid_path, "sheet.csv");
        assert!(o.json_output);
        assert!(o.filter.below_par_only);
        assert_eq!(o.filter.location.as_deref(), Some("Basement"));
        assert_eq!(o.filter.search.as_deref(), Some("glove"));
        assert_eq!(o.filter.volatility, VolatilityFilter::High);
        assert_eq!(o.movers, 3);
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["--json"])).is_err());
        assert!(parse_args(&args(&["sheet.csv", "--movers"])).is_err());
        assert!(parse_args(&args(&["sheet.csv", "--movers", "many"])).is_err());
        assert!(parse_args(&args(&["sheet.csv", "--frobnicate"])).is_err());
    }

    #[test]
    fn json_stats_cover_every_item_and_filters_go_to_listed() {
        let catalog = LocationCatalog::default();
        let items = vec![
            InventoryItem::new("Golf".into(), None, "Tees".into(), 2.0, 10.0, None, Vec::new()),
            InventoryItem::new("Golf".into(), None, "Balls".into(), 20.0, 10.0, None, Vec::new()),
            InventoryItem::new("Basement".into(), None, "Tape".into(), 1.0, 5.0, None, Vec::new()),
        ];
        let report = InventoryReport::build(items, &catalog);
        let filter = ItemFilter {
            below_par_only: true,
            ..Default::default()
        };
        let json = ReportJson {
            generated_at: String::new(),
            source: "sheet.csv",
            header_row: Some(0),
            report: &report,
            listed: filter.is_active().then(|| filter.apply(&report.items)),
            movers: Vec::new(),
        };
        let value = serde_json::to_value(&json).unwrap();
        assert_eq!(value["stats"]["totalItems"], 3);
        assert_eq!(value["items"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["listed"].as_array().map(Vec::len), Some(2));
        assert!(value.get("movers").is_none());

        let unfiltered = ReportJson {
            listed: None,
            ..json
        };
        assert!(serde_json::to_value(&unfiltered).unwrap().get("listed").is_none());
    }

    #[test]
    fn numbers_are_grouped() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1234.0), "1,234");
        assert_eq!(format_number(1234567.5), "1,234,567.5");
        assert_eq!(format_number(2.25), "2.25");
        assert_eq!(format_number(-1500.0), "-1,500");
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("Gloves", 10), "Gloves");
        assert_eq!(truncate("Hallway Storage by ADA bathrooms", 10), "Hallway S\u{2026}");
    }
}
