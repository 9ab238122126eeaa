// Catalog statistics report
//
// Prints every analytics section for the configured collection.
// `--json` prints the whole report as JSON instead.

use anyhow::Result;
use steam_catalog::catalog::api::analytics::catalog_report;
use steam_catalog::catalog::api::MongoCatalog;
use steam_catalog::catalog::config::StoreConfig;
use steam_catalog::catalog::model::{Bucket, CatalogReport, FacetCount};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let as_json = std::env::args().skip(1).any(|arg| arg == "--json");

    let config = StoreConfig::from_env()?;
    let catalog = MongoCatalog::connect(&config).await?;
    let report = catalog_report(&catalog).await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn bucket_label(bucket: &Bucket, unit: &str) -> String {
    match (bucket.lower, bucket.upper) {
        (Some(lower), Some(upper)) => format!("{}{} - {}{}", unit, lower, unit, upper),
        (Some(lower), None) => format!("{}{}+", unit, lower),
        _ => "other".to_string(),
    }
}

fn print_facets(title: &str, facets: &[FacetCount]) {
    println!("\n{}:", title);
    for facet in facets {
        println!("  {:<40} {:>8}", facet.value, facet.count);
    }
}

fn print_report(report: &CatalogReport) {
    if let Some(storage) = &report.storage {
        println!("Storage:");
        println!("  Documents:     {}", storage.documents);
        println!("  Data size:     {:.2} MB", storage.size_mb());
        println!("  Storage size:  {:.2} MB", storage.storage_mb());
        println!("  Index size:    {:.2} MB", storage.index_mb());
        println!("  Total on disk: {:.2} MB", storage.total_mb());
    }

    println!("\nPrice distribution:");
    for bucket in &report.price_buckets {
        println!("  {:<20} {:>8}", bucket_label(bucket, "$"), bucket.count);
    }

    println!("\nReleases per year:");
    for year in &report.release_years {
        println!("  {} {:>8}", year.year, year.count);
    }

    print_facets("Top developers", &report.top_developers);
    print_facets("Top genres", &report.top_genres);

    println!("\nPositive rate (games with enough reviews):");
    for bucket in &report.rating_buckets {
        println!("  {:<20} {:>8}", bucket_label(bucket, ""), bucket.count);
    }

    println!("\nPlatform support:");
    for support in &report.platform_support {
        println!("  {:<30} {:>8}", support.label(), support.count);
    }

    print_facets("Estimated owners", &report.owner_distribution);

    println!("\nMost recommended:");
    for game in &report.most_recommended {
        println!(
            "  {:<40} {:>10} recommendations, peak {}",
            game.name, game.recommendations, game.peak_ccu
        );
    }

    print_facets("Top tags", &report.top_tags);

    if !report.errors.is_empty() {
        println!("\nSections that failed:");
        for error in &report.errors {
            println!("  ✗ {}", error);
        }
    }
}
