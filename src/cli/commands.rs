use crate::cache::LoadCache;
use crate::config::LoaderConfig;
use crate::dashboard::{
    build_charts, compute_kpis, filter_options, filtered_table, preview as build_preview,
    ChartData, FilterSelection, Kpis,
};
use crate::error::{Severity, SiteBwError, SiteBwResult};
use crate::excel::TableExporter;
use crate::loader::LoadOutcome;
use crate::schema::columns;
use crate::types::format_number;
use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Load once and fail on a fatal diagnostic.
fn load_checked(config: &LoaderConfig) -> SiteBwResult<LoadOutcome> {
    let outcome = config.load();
    if let Some(fatal) = outcome.fatal() {
        println!("{}", format!("❌ {}", fatal.message).bold().red());
        return Err(SiteBwError::Load(fatal.message.clone()));
    }
    Ok(outcome)
}

fn print_selection(selection: &FilterSelection) {
    if selection.is_empty() {
        return;
    }
    if !selection.bw_groups.is_empty() {
        println!("   BW Group: {}", selection.bw_groups.join(", ").bright_yellow());
    }
    if !selection.sites.is_empty() {
        println!("   Sites:    {}", selection.sites.join(", ").bright_yellow());
    }
}

fn print_diagnostics(outcome: &LoadOutcome) {
    if outcome.diagnostics.is_empty() {
        println!("{}", "✅ No warnings".green());
        return;
    }
    println!("{}", format!("⚠️  {} diagnostic(s)", outcome.diagnostics.len()).yellow());
    for diagnostic in &outcome.diagnostics {
        let line = format!("   {}", diagnostic);
        match diagnostic.severity {
            Severity::Error => println!("{}", line.red()),
            Severity::Warning => println!("{}", line.yellow()),
        }
    }
}

fn print_summary(outcome: &LoadOutcome, verbose: bool) {
    match &outcome.source {
        Some(source) => println!("   Source:  {}", source.display()),
        None => println!("   Source:  {}", "(none)".red()),
    }
    println!(
        "   Loaded:  {}",
        outcome.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if !outcome.is_fatal() {
        println!(
            "   Table:   {} rows, {} columns",
            outcome.table.row_count(),
            outcome.table.columns.len()
        );
        println!();
        println!("{}", "📋 Resolved columns".bold());
        for (canonical, header) in outcome.resolved.iter() {
            match header {
                Some(h) if h == canonical => println!("   ✅ {}", canonical.bright_blue()),
                Some(h) => println!("   ✅ {} ← {}", canonical.bright_blue(), h),
                None => println!("   ❌ {}", canonical.dimmed()),
            }
        }
    }

    if verbose || !outcome.diagnostics.is_empty() {
        println!();
        print_diagnostics(outcome);
    }
}

/// Execute the load command
pub fn load(config: &LoaderConfig, verbose: bool) -> SiteBwResult<()> {
    println!("{}", "📡 Site Bandwidth - Load".bold().green());
    if verbose {
        for candidate in &config.sources {
            println!("   Candidate: {}", candidate.display());
        }
    }

    let outcome = config.load();
    print_summary(&outcome, verbose);

    match outcome.fatal() {
        Some(fatal) => {
            println!("\n{}", "❌ Load failed".bold().red());
            Err(SiteBwError::Load(fatal.message.clone()))
        }
        None => {
            println!("\n{}", "✅ Load complete".bold().green());
            Ok(())
        }
    }
}

/// Execute the columns command
pub fn columns(config: &LoaderConfig) -> SiteBwResult<()> {
    println!("{}", "📡 Site Bandwidth - Columns".bold().green());
    let outcome = load_checked(config)?;

    for column in &outcome.table.columns {
        let canonical = outcome
            .resolved
            .iter()
            .find(|(_, header)| *header == Some(column.name.as_str()))
            .map(|(canonical, _)| canonical);
        let kind = if column.is_numeric() { "numeric" } else { "text" };
        match canonical {
            Some(c) if c != column.name => println!(
                "   {} {} (as {})",
                column.name.bright_blue(),
                format!("[{}]", kind).dimmed(),
                c
            ),
            _ => println!("   {} {}", column.name.bright_blue(), format!("[{}]", kind).dimmed()),
        }
    }

    let missing: Vec<&str> = outcome
        .resolved
        .iter()
        .filter(|(_, header)| header.is_none())
        .map(|(canonical, _)| canonical)
        .collect();
    if !missing.is_empty() {
        println!("\n{}", format!("⚠️  Missing: {}", missing.join(", ")).yellow());
    }
    Ok(())
}

/// Execute the options command
pub fn options(config: &LoaderConfig) -> SiteBwResult<()> {
    println!("{}", "📡 Site Bandwidth - Filter options".bold().green());
    let outcome = load_checked(config)?;
    let options = filter_options(&outcome.table, &outcome.resolved);

    for (label, values) in [
        (columns::BW_GROUP, &options.bw_groups),
        (columns::SITE_NAME, &options.sites),
    ] {
        match values {
            Some(values) => {
                println!("\n{} ({})", label.bold(), values.len());
                for value in values {
                    println!("   • {}", value);
                }
            }
            None => println!(
                "\n{}",
                format!("⚠️  '{}' column not found; filter unavailable", label).yellow()
            ),
        }
    }
    Ok(())
}

/// Execute the kpis command
pub fn kpis(config: &LoaderConfig, selection: &FilterSelection) -> SiteBwResult<()> {
    println!("{}", "📡 Site Bandwidth - Key metrics".bold().green());
    print_selection(selection);
    let outcome = load_checked(config)?;
    let filtered = filtered_table(&outcome, selection);
    let kpis = compute_kpis(&filtered, &outcome.resolved);

    println!();
    println!(
        "   Total Sites:            {}",
        Kpis::format_count(kpis.total_sites).bold()
    );
    println!(
        "   Avg May Usage:          {}",
        Kpis::format_mbps(kpis.avg_may_usage).bold()
    );
    println!(
        "   Avg BW Allocated:       {}",
        Kpis::format_mbps(kpis.avg_allocated).bold()
    );
    Ok(())
}

fn print_chart_status<T>(title: &str, data: &ChartData<T>, detail: impl FnOnce(&T)) {
    println!("\n{}", title.bold());
    match data {
        ChartData::Ready(inner) => detail(inner),
        _ => {
            if let Some(reason) = data.skip_reason() {
                println!("   {}", reason.yellow());
            }
        }
    }
}

/// Execute the charts command
pub fn charts(config: &LoaderConfig, selection: &FilterSelection, json: bool) -> SiteBwResult<()> {
    let outcome = load_checked(config)?;
    let filtered = filtered_table(&outcome, selection);
    let charts = build_charts(&filtered, &outcome.resolved);

    if json {
        println!("{}", serde_json::to_string_pretty(&charts)?);
        return Ok(());
    }

    println!("{}", "📡 Site Bandwidth - Charts".bold().green());
    print_selection(selection);

    print_chart_status("📈 Monthly Average Usage", &charts.monthly_usage, |rows| {
        println!("   {} points", rows.len());
        for row in rows.iter().take(12) {
            println!(
                "   {:<24} {:<6} {} Mbps",
                row.site,
                row.month,
                format_number(row.avg_mbps)
            );
        }
        if rows.len() > 12 {
            println!("   {}", format!("... {} more", rows.len() - 12).dimmed());
        }
    });

    print_chart_status("🎯 Criteria Overview", &charts.criteria, |chart| {
        println!(
            "   {} points ({} vs {}, colored by {})",
            chart.points.len(),
            chart.x_label,
            chart.y_label,
            chart.color_label
        );
    });

    print_chart_status("💰 Site Value by BW Group", &charts.site_value, |stats| {
        for s in stats {
            println!(
                "   {:<12} n={:<4} min={} q1={} median={} q3={} max={}",
                s.group.bright_blue(),
                s.count,
                format_number(s.min),
                format_number(s.q1),
                format_number(s.median),
                format_number(s.q3),
                format_number(s.max)
            );
        }
    });

    print_chart_status("🥧 Allocation Share by BW Group", &charts.allocation_share, |shares| {
        for share in shares {
            println!(
                "   {:<12} {:>10} Mbps  {:>6.2}%",
                share.group.bright_blue(),
                format_number(share.total_mbps),
                share.share_pct
            );
        }
    });

    Ok(())
}

/// Execute the preview command
pub fn preview(config: &LoaderConfig, selection: &FilterSelection, limit: usize) -> SiteBwResult<()> {
    println!("{}", "📡 Site Bandwidth - Data preview".bold().green());
    print_selection(selection);
    let outcome = load_checked(config)?;
    let filtered = filtered_table(&outcome, selection);
    let preview = build_preview(&filtered, limit);

    println!();
    println!("{}", preview.headers.join(" | ").bold());
    for row in &preview.rows {
        println!("{}", row.join(" | "));
    }
    println!("\n{}", preview.caption().dimmed());
    Ok(())
}

/// Execute the export command
pub fn export(
    config: &LoaderConfig,
    selection: &FilterSelection,
    output: PathBuf,
    verbose: bool,
) -> SiteBwResult<()> {
    println!("{}", "📡 Site Bandwidth - Excel Export".bold().green());
    println!("   Output: {}", output.display());
    print_selection(selection);

    let outcome = load_checked(config)?;
    let filtered = filtered_table(&outcome, selection);

    if verbose {
        println!(
            "   {} of {} rows after filtering",
            filtered.row_count(),
            outcome.table.row_count()
        );
    }

    TableExporter::new(&filtered).export(&output)?;

    println!("\n{}", "✅ Export Complete!".bold().green());
    println!(
        "   {} rows, {} columns written",
        filtered.row_count(),
        filtered.columns.len()
    );
    Ok(())
}

/// Execute the watch command
pub fn watch(config: &LoaderConfig, verbose: bool) -> SiteBwResult<()> {
    println!("{}", "👁️  Site Bandwidth - Watch Mode".bold().green());

    let cache = LoadCache::new();
    let outcome = cache.fetch(config);
    let source = outcome.source.clone().ok_or_else(|| {
        let message = outcome.fatal().map(|d| d.message.clone()).unwrap_or_default();
        SiteBwError::Load(message)
    })?;

    let canonical_path = source.canonicalize()?;
    let parent_dir = canonical_path
        .parent()
        .ok_or_else(|| SiteBwError::Watch("Cannot determine parent directory".to_string()))?;

    println!("   Watching: {}", canonical_path.display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(Duration::from_millis(200), tx)
        .map_err(|e| SiteBwError::Watch(format!("Failed to create file watcher: {}", e)))?;
    debouncer
        .watcher()
        .watch(parent_dir, RecursiveMode::NonRecursive)
        .map_err(|e| SiteBwError::Watch(format!("Failed to watch directory: {}", e)))?;

    println!("{}", "🔄 Initial load...".cyan());
    print_summary(&outcome, verbose);
    println!();

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events.iter().any(|event| {
                    event.kind == DebouncedEventKind::Any && is_same_file(&event.path, &canonical_path)
                });
                if !relevant {
                    continue;
                }

                println!(
                    "\n{} {}",
                    "🔄 Change detected at".cyan(),
                    chrono::Local::now().format("%H:%M:%S").to_string().cyan()
                );
                cache.invalidate(&config.sources);
                let outcome = cache.fetch(config);
                print_summary(&outcome, verbose);
                if outcome.is_fatal() {
                    println!("{}", "❌ Reload failed, waiting for the next change".bold().red());
                } else {
                    println!("{}", "✅ Reloaded".bold().green());
                }
            }
            Ok(Err(error)) => {
                eprintln!("{} Watch error: {}", "❌".red(), error);
            }
            Err(e) => {
                eprintln!("{} Channel error: {}", "❌".red(), e);
                break;
            }
        }
    }

    Ok(())
}

/// Event paths may or may not be canonical depending on the backend.
fn is_same_file(event_path: &Path, watched: &Path) -> bool {
    if let Ok(canonical) = event_path.canonicalize() {
        if canonical == watched {
            return true;
        }
    }
    event_path.file_name().is_some() && event_path.file_name() == watched.file_name()
}
