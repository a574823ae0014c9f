//! Latency profiling of the labeling passes.
//!
//! Enable with `--features instrumentation`. Every span entered by the
//! search (`compute_next_action`, `label_alpha_beta`, `label_minimax`) is
//! timed and aggregated per span name.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;
use tracing::span;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Span name -> (calls, total nanoseconds). The search runs on a single
/// thread, so one lock is enough.
static TIMING_DATA: Lazy<Mutex<HashMap<&'static str, (u64, u64)>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

struct TimingLayer;

impl<S> Layer<S> for TimingLayer
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_enter(&self, id: &span::Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(Instant::now());
        }
    }

    fn on_exit(&self, id: &span::Id, ctx: Context<'_, S>) {
        let span = match ctx.span(id) {
            Some(span) => span,
            None => return,
        };
        let start = match span.extensions_mut().remove::<Instant>() {
            Some(start) => start,
            None => return,
        };
        let elapsed = start.elapsed().as_nanos() as u64;

        if let Ok(mut data) = TIMING_DATA.lock() {
            let entry = data.entry(span.name()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += elapsed;
        }
    }
}

/// Installs the timing layer as the global subscriber.
///
/// With `RUST_LOG` unset or `off` only timings are collected; any other
/// value also prints span events.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "off".to_string());

    let installed = if env_filter == "off" || env_filter.is_empty() {
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("trace"))
            .with(TimingLayer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        use tracing_subscriber::fmt;

        let fmt_layer = fmt::layer().with_target(false).with_level(false).compact();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(TimingLayer)
            .with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    };

    if installed.is_err() {
        log::warn!("a tracing subscriber is already installed, timings are not collected");
    }
}

/// Prints call counts, total and average time per span, slowest first.
pub fn print_timing_statistics() {
    let data = match TIMING_DATA.lock() {
        Ok(data) => data,
        Err(_) => return,
    };
    if data.is_empty() {
        eprintln!("\nNo timing data collected.");
        return;
    }

    let mut entries: Vec<_> = data.iter().map(|(name, totals)| (*name, *totals)).collect();
    entries.sort_by_key(|(_, (_, total))| std::cmp::Reverse(*total));

    eprintln!("\n{:=<80}", "");
    eprintln!("Search latency (sorted by total time)");
    eprintln!("{:=<80}", "");
    eprintln!(
        "{:<40} {:>12} {:>12} {:>12}",
        "Span", "Calls", "Total (ms)", "Avg (µs)"
    );
    eprintln!("{:-<80}", "");

    for (name, (count, total_nanos)) in entries.iter().filter(|(_, (count, _))| *count > 0) {
        eprintln!(
            "{:<40} {:>12} {:>12.2} {:>12.2}",
            name,
            count,
            *total_nanos as f64 / 1_000_000.0,
            *total_nanos as f64 / *count as f64 / 1_000.0
        );
    }
    eprintln!("{:-<80}", "");
}
