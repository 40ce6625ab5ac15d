//! One-shot downtime report for a local events file, printed to stdout.
//!
//! Usage: blackout_report <events.json> [timezone]

use chrono::{Duration, Utc};
use chrono_tz::Tz;

use blackout_stats::adapters::source::{EventSource, JsonFileSource};
use blackout_stats::app::services::ROLLING_WINDOW_DAYS;
use blackout_stats::domain::daily::allocate_daily_downtime;
use blackout_stats::domain::events::normalize_events;
use blackout_stats::domain::formatting::recent_outages;
use blackout_stats::domain::rolling::compute_rolling_average;
use blackout_stats::domain::summary::compute_summary_statistics;

const RECENT_OUTAGES_SHOWN: usize = 5;

fn main() {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: blackout_report <events.json> [timezone]");
        std::process::exit(2);
    };
    let timezone_name = args.next().unwrap_or_else(|| "UTC".to_string());

    let tz: Tz = match timezone_name.parse() {
        Ok(tz) => tz,
        Err(_) => {
            eprintln!("unknown timezone: {timezone_name}");
            std::process::exit(2);
        }
    };

    if let Err(message) = print_report(&path, tz) {
        eprintln!("report failed: {message}");
        std::process::exit(1);
    }
}

fn print_report(path: &str, tz: Tz) -> Result<(), String> {
    let source = JsonFileSource::new(path);
    let rows = source.fetch_events().map_err(|err| err.to_string())?;
    let events = normalize_events(&rows, tz).map_err(|err| err.to_string())?;

    let now = Utc::now().with_timezone(&tz);
    let daily =
        allocate_daily_downtime(&events, tz, None, None, now).map_err(|err| err.to_string())?;
    let rolling = compute_rolling_average(&daily, Duration::days(ROLLING_WINDOW_DAYS));
    let summary = compute_summary_statistics(&daily);

    println!("Downtime report for {path} ({tz})");
    println!();
    println!("  total downtime:        {:>8.1} h", summary.total_downtime);
    println!(
        "  last 7 days:           {:>8.1} h ({:.1} h/day)",
        summary.last_7_days_downtime, summary.last_7_days_avg_downtime
    );
    println!(
        "  last 30 days:          {:>8.1} h ({:.1} h/day)",
        summary.last_30_days_downtime, summary.last_30_days_avg_downtime
    );

    println!();
    println!("Last {ROLLING_WINDOW_DAYS} daily values (rolling {ROLLING_WINDOW_DAYS}d mean):");
    let tail = daily.len().saturating_sub(ROLLING_WINDOW_DAYS as usize);
    for (record, mean) in daily[tail..].iter().zip(&rolling[tail..]) {
        println!(
            "  {}  {:>6.2} h  (avg {:>6.2} h)",
            record.date.format("%Y-%m-%d"),
            record.downtime_hours,
            mean.downtime_hours
        );
    }

    println!();
    println!("Most recent outages:");
    for outage in recent_outages(&events, None, RECENT_OUTAGES_SHOWN) {
        println!(
            "  #{:<4} {}  ->  {}  [{}]",
            outage.id,
            outage.start.as_deref().unwrap_or("?"),
            outage.end.as_deref().unwrap_or("ongoing"),
            outage.duration.as_deref().unwrap_or("--:--:--")
        );
    }

    Ok(())
}
