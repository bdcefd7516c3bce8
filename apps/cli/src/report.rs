use tinybatch_app::StatusSnapshot;
use tinybatch_core::{CredentialStatus, RunStats, display_timestamp};

const BAR_WIDTH: usize = 30;

pub fn print_status(snapshot: &StatusSnapshot) {
    println!();
    println!("API key usage (limit {} per key)", snapshot.limit);
    if snapshot.keys.is_empty() {
        println!("  no API keys configured");
    }
    for key in &snapshot.keys {
        print_key(key);
    }
    println!("Total compressions: {}", snapshot.total_compressions);
    println!(
        "Last run: {}",
        snapshot
            .last_run_time
            .as_deref()
            .map(display_timestamp)
            .unwrap_or_else(|| "never".to_string())
    );
    println!("Compressed files recorded: {}", snapshot.compressed_files);
    println!();
}

fn print_key(key: &CredentialStatus) {
    let marker = if key.active { "*" } else { " " };
    println!(
        "{marker} [{}] {}  {}/{} ({:.1}%)  [{}]  remaining {}",
        key.index + 1,
        key.masked,
        key.usage,
        key.limit,
        key.percent_used,
        progress_bar(key.percent_used),
        key.remaining.max(0),
    );
    if let Some(first) = &key.first_used {
        println!("      first used: {}", display_timestamp(first));
    }
    if let Some(last) = &key.last_used {
        println!("      last used:  {}", display_timestamp(last));
    }
}

pub fn print_run(stats: &RunStats) {
    println!("Run finished");
    println!("  images found:  {}", stats.total);
    println!("  compressed:    {}", stats.compressed);
    println!("  skipped:       {}", stats.skipped);
    println!("  failed:        {}", stats.failed);
    for item in &stats.failures {
        println!("    {} ({}): {}", item.path, item.kind.label(), item.message);
    }
    if stats.exhausted {
        println!("All API keys reached their limit. Add keys or wait for the quota to reset.");
    }
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64) as usize;
    format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}
