use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use log::info;

use geomark::cli::{Cli, Commands};
use geomark::clients::nominatim::NominatimGeocoder;
use geomark::codec::{self, LoadPolicy};
use geomark::ingest::IngestReport;
use geomark::input::{self, Source};
use geomark::last_file::{load_last_file, save_last_file};
use geomark::store::{AddOutcome, DuplicatePolicy, MarkerStore, StoreHandle};
use geomark::{distance, geocoder, job, walker, AppConfig, AppError, FetchPool, Marker};

fn resolve_store_path(cli: &Cli, config: &AppConfig) -> PathBuf {
    cli.store
        .clone()
        .or_else(|| load_last_file(Path::new(&config.last_file_pointer)))
        .unwrap_or_else(|| PathBuf::from(&config.default_store))
}

/// Returns the store and how many unreadable records were left behind.
fn open_store(path: &Path, policy: LoadPolicy) -> Result<(MarkerStore, usize)> {
    if !path.exists() {
        info!("No marker file at {}, starting empty", path.display());
        return Ok((MarkerStore::new(), 0));
    }
    let loaded = codec::load_json(path, policy)?;
    for skipped in &loaded.skipped {
        println!("Skipped record {}: {}", skipped.index, skipped.reason);
    }
    if !loaded.skipped.is_empty() {
        println!(
            "Warning: saving changes to {} would drop {} unreadable record(s)",
            path.display(),
            loaded.skipped.len()
        );
    }
    Ok((MarkerStore::from_markers(loaded.markers), loaded.skipped.len()))
}

/// Set the flag on Ctrl-C so a running batch stops picking up new items.
fn cancel_on_ctrl_c() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, finishing items already in progress");
            flag.store(true, Ordering::Relaxed);
        }
    });
    cancel
}

async fn import(
    config: &AppConfig,
    store: &StoreHandle,
    sources: Vec<Source>,
    policy: DuplicatePolicy,
    cancel: Arc<AtomicBool>,
) -> Result<IngestReport> {
    let pool_config = config.clone();
    let report = job::import_batch(
        move || FetchPool::from_config(&pool_config),
        store.clone(),
        sources,
        policy,
        cancel,
    )
    .await?;

    for label in &report.no_location {
        println!("{} - No GPS Data Found", label);
    }
    for (label, error) in &report.failures {
        println!("{} - {}", label, error);
    }
    for label in &report.skipped_duplicates {
        println!("{} - Already loaded, skipped", label);
    }
    if report.cancelled > 0 {
        println!("{} item(s) cancelled", report.cancelled);
    }
    if report.new_locations() > 0 {
        println!("Added {} new location(s).", report.new_locations());
    } else {
        println!("No new GPS data added.");
    }
    Ok(report)
}

fn print_outcome(label: &str, outcome: &AddOutcome) -> bool {
    match outcome {
        AddOutcome::Added => println!("Added '{}'", label),
        AddOutcome::Overwritten => println!("Overwrote '{}'", label),
        AddOutcome::SkippedDuplicate | AddOutcome::Pending(_) => {
            println!("'{}' with those coordinates already exists", label)
        }
    }
    matches!(outcome, AddOutcome::Added | AddOutcome::Overwritten)
}

fn print_markers(markers: &[Marker]) {
    for (i, marker) in markers.iter().enumerate() {
        println!(
            "{:>3}. {} ({:.6}, {:.6})",
            i + 1,
            marker.label,
            marker.location.latitude,
            marker.location.longitude
        );
        for line in marker.description_lines() {
            println!("       {}", line);
        }
    }
    println!("Loaded Locations: {}", markers.len());
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::new()?;

    // Initialize env_logger based on config.log_level
    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    let cli = Cli::parse();
    let policy: DuplicatePolicy = cli.on_duplicate.into();
    let load_policy = if cli.strict || config.strict_load {
        LoadPolicy::Strict
    } else {
        LoadPolicy::Lenient
    };

    let store_path = resolve_store_path(&cli, &config);
    info!("Using marker file {}", store_path.display());
    let (initial, unreadable) = open_store(&store_path, load_policy)?;
    let store = StoreHandle::new(initial);
    let drop_invalid = cli.drop_invalid;

    let changed = match cli.command {
        Commands::Load { identifiers } => {
            let identifiers: Vec<String> = identifiers
                .iter()
                .flat_map(|arg| input::parse_identifiers(arg))
                .collect();
            let (sources, invalid) = input::classify_all(&identifiers);
            for item in &invalid {
                println!("{} - Invalid URL or file path", item);
            }
            if sources.is_empty() {
                println!("No valid URLs or file paths found!");
                false
            } else {
                let report = import(&config, &store, sources, policy, cancel_on_ctrl_c()).await?;
                report.new_locations() > 0
            }
        }

        Commands::Scan { folder } => {
            let cancel = cancel_on_ctrl_c();
            match walker::scan_folder(&folder, &config.allowed_extensions, &cancel)? {
                None => {
                    println!("Folder processing cancelled.");
                    false
                }
                Some(paths) if paths.is_empty() => {
                    println!("No images found in {}", folder.display());
                    false
                }
                Some(paths) => {
                    println!("Found {} image(s) in {}", paths.len(), folder.display());
                    let sources = paths.into_iter().map(Source::Local).collect();
                    let report = import(&config, &store, sources, policy, cancel).await?;
                    report.new_locations() > 0
                }
            }
        }

        Commands::Add { name, lat, lon } => {
            let marker = Marker::new(name.trim(), lat, lon)?;
            let label = marker.label.clone();
            let outcome = store.with(|s| s.add(marker, policy))?;
            print_outcome(&label, &outcome)
        }

        Commands::Geocode { address } => {
            let geocoder = NominatimGeocoder::new(&config)?;
            match geocoder::locate_address(&geocoder, &address).await {
                Ok(marker) => {
                    let label = marker.label.clone();
                    let (lat, lon) = (marker.location.latitude, marker.location.longitude);
                    let outcome = store.with(|s| s.add(marker, policy))?;
                    let changed = print_outcome(&label, &outcome);
                    if changed {
                        println!("  at {}, {}", lat, lon);
                    }
                    changed
                }
                Err(AppError::GeocodeNotFound(address)) => {
                    println!("Address not found: {}", address);
                    false
                }
                Err(e) => return Err(e.into()),
            }
        }

        Commands::Remove { label } => match store.with(|s| s.remove(&label))? {
            Some(_) => {
                println!("Removed '{}'", label);
                true
            }
            None => {
                println!("No location named '{}'", label);
                false
            }
        },

        Commands::Rename { old_label, new_label } => {
            if store.with(|s| s.rename(&old_label, &new_label))? {
                println!("Changed '{}' to '{}'", old_label, new_label);
                true
            } else {
                println!("No location named '{}'", old_label);
                false
            }
        }

        Commands::Clear => {
            let removed = store.with(|s| s.clear())?;
            if removed == 0 {
                println!("No locations loaded!");
            } else {
                println!("Removed {} location(s)", removed);
            }
            removed > 0
        }

        Commands::List => {
            print_markers(&store.snapshot()?);
            false
        }

        Commands::Distance => {
            let markers = store.snapshot()?;
            let total = distance::total_distance(&markers)?;
            for (pair, miles) in markers.windows(2).zip(distance::leg_distances(&markers)) {
                println!("{} -> {}: {:.2} miles", pair[0].label, pair[1].label, miles);
            }
            println!("Total distance: {:.2} miles", total);
            false
        }

        Commands::ExportKml { destination } => {
            let markers = store.snapshot()?;
            if markers.is_empty() {
                println!("No locations to export!");
            } else {
                codec::export_kml(&destination, &markers)?;
                println!("Locations exported to {}", destination.display());
            }
            false
        }
    };

    if changed && unreadable > 0 && !drop_invalid {
        bail!(
            "Not saving: {} has {} unreadable record(s) that would be lost; rerun with --drop-invalid to save anyway",
            store_path.display(),
            unreadable
        );
    }
    if changed {
        codec::save_json(&store_path, &store.snapshot()?)?;
        println!("Saved to {}", store_path.display());
    }
    if changed || store_path.exists() {
        save_last_file(Path::new(&config.last_file_pointer), &store_path);
    }

    Ok(())
}
