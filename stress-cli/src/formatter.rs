//! Output formatting for run progress and results

use colored::*;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;
use stress_engine::{
    peak_requests_per_second, EndpointCatalog, EngineConfig, StatsSnapshot, StopReport, WorkerPlan,
};

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopCause {
    Interrupted,
    DurationElapsed,
}

/// Everything reported at the end of a run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub config: EngineConfig,
    pub plan: WorkerPlan,
    pub stopped_by: StopCause,
    pub stats: StatsSnapshot,
    pub stop: StopReport,
}

/// Request rate over the last reporting interval
#[derive(Debug, Default)]
pub struct RecentRate {
    last_total: u64,
    last_elapsed: Duration,
}

impl RecentRate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate since the previous call, using the snapshot's own clock
    pub fn update(&mut self, snapshot: &StatsSnapshot) -> f64 {
        let requests = snapshot.total_requests.saturating_sub(self.last_total);
        let window = snapshot.elapsed.saturating_sub(self.last_elapsed);

        self.last_total = snapshot.total_requests;
        self.last_elapsed = snapshot.elapsed;

        if window.is_zero() {
            0.0
        } else {
            requests as f64 / window.as_secs_f64()
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Output formatter for the command line
pub struct OutputFormatter {
    json: bool,
}

impl OutputFormatter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn print_banner(&self) {
        if self.json {
            return;
        }
        println!("{}", "=".repeat(50));
        println!("{}", "📶 WiFi Stress Test Tool".bold());
        println!("{}", "=".repeat(50));
        println!();
    }

    /// Print a status line with a wall-clock timestamp
    pub fn print_status(&self, message: &str) {
        if self.json {
            return;
        }
        println!("[{}] {}", timestamp().dimmed(), message);
    }

    pub fn print_warning(&self, message: &str) {
        eprintln!("{} {}", "⚠".bright_yellow().bold(), message.bright_yellow());
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", "✗".bright_red().bold(), message.bright_red());
    }

    pub fn print_urls(&self, catalog: &EndpointCatalog) {
        println!("📋 Test URLs:");
        for (i, endpoint) in catalog.endpoints().iter().enumerate() {
            println!("  {}. {} {}", i + 1, endpoint.url(), format!("({})", endpoint.kind()).dimmed());
        }
    }

    pub fn print_configuration(
        &self,
        config: &EngineConfig,
        plan: &WorkerPlan,
        duration: Option<Duration>,
        request_timeout: Duration,
        endpoints: usize,
    ) {
        if self.json {
            return;
        }
        println!("{}", "📋 Test Configuration:".bold());
        for line in configuration_lines(config, plan, duration, request_timeout, endpoints) {
            println!("   • {}", line);
        }
        println!();
    }

    /// Overwrite the current terminal line with live statistics
    pub fn print_live(&self, snapshot: &StatsSnapshot, recent_rate: f64) {
        if self.json {
            return;
        }
        print!("\r{}", live_line(snapshot, recent_rate));
        let _ = io::stdout().flush();
    }

    /// Move past the live statistics line
    pub fn end_live(&self) {
        if !self.json {
            println!();
        }
    }

    pub fn print_summary(&self, summary: &RunSummary) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(summary)?);
        } else {
            println!();
            println!("{}", final_report(&summary.stats, &summary.stop));
        }
        Ok(())
    }
}

/// Settings summary shown before a run starts
pub fn configuration_lines(
    config: &EngineConfig,
    plan: &WorkerPlan,
    duration: Option<Duration>,
    request_timeout: Duration,
    endpoints: usize,
) -> Vec<String> {
    vec![
        format!("Intensity: {}%", config.intensity_percent.to_string().cyan()),
        format!("Workers:   {}", plan.worker_count.to_string().cyan()),
        format!(
            "Delay:     {}ms base, {:.0}ms effective",
            config.delay_millis,
            millis(plan.per_request_delay)
        ),
        format!(
            "Peak rate: ~{:.0} requests/second",
            peak_requests_per_second(plan)
        ),
        format!("Timeout:   {:.1}s", request_timeout.as_secs_f64()),
        format!(
            "Duration:  {}",
            duration
                .map(|d| format!("{}s", d.as_secs()))
                .unwrap_or_else(|| "Unlimited".to_string())
        ),
        format!("Targets:   {}", endpoints),
    ]
}

/// One-line live statistics
pub fn live_line(snapshot: &StatsSnapshot, recent_rate: f64) -> String {
    let (avg, min, max) = snapshot
        .latency
        .map(|l| (millis(l.average), millis(l.min), millis(l.max)))
        .unwrap_or_default();

    let errors = format!("{:>4}", snapshot.total_errors);
    let errors = if snapshot.total_errors > 0 {
        errors.red().to_string()
    } else {
        errors
    };

    format!(
        "📈 Req: {:>6} | Err: {} | Rate: {:>5.1}/s | Recent: {:>5.1}/s | Avg: {:>6.0}ms | Min: {:>6.0}ms | Max: {:>6.0}ms | Time: {:>6.1}s",
        snapshot.total_requests,
        errors,
        snapshot.requests_per_second,
        recent_rate,
        avg,
        min,
        max,
        snapshot.elapsed.as_secs_f64()
    )
}

/// Multi-line end-of-run report
pub fn final_report(snapshot: &StatsSnapshot, stop: &StopReport) -> String {
    let rule = "=".repeat(70);
    let mut lines = vec![
        rule.clone(),
        "📊 Test Results".bold().to_string(),
        rule,
        format!("Total Requests:      {}", snapshot.total_requests),
        format!("Successful:          {}", snapshot.successful_requests()),
        format!("Errors:              {}", snapshot.total_errors),
        format!("Success Rate:        {:.1}%", snapshot.success_rate_percent()),
        format!("Duration:            {:.1} seconds", snapshot.elapsed.as_secs_f64()),
        format!(
            "Average Rate:        {:.1} requests/second",
            snapshot.requests_per_second
        ),
        format!(
            "Data Received:       {:.1} KiB",
            snapshot.bytes_received as f64 / 1024.0
        ),
        String::new(),
        "📡 Response Time Statistics:".to_string(),
    ];

    match snapshot.latency {
        Some(latency) => {
            lines.push(format!("Average:             {:.0} ms", millis(latency.average)));
            lines.push(format!("Median:              {:.0} ms", millis(latency.median)));
            lines.push(format!("Minimum:             {:.0} ms", millis(latency.min)));
            lines.push(format!("Maximum:             {:.0} ms", millis(latency.max)));
            lines.push(format!("Samples:             {}", latency.samples));
        }
        None => lines.push("No successful responses".to_string()),
    }

    if snapshot.total_errors > 0 {
        lines.push(String::new());
        lines.push("⚠ Error Breakdown:".to_string());
        lines.push(format!("Timeouts:            {}", snapshot.errors.timeouts));
        lines.push(format!("Connection:          {}", snapshot.errors.connection_errors));
        lines.push(format!("HTTP status:         {}", snapshot.errors.http_errors));
        lines.push(format!("Other:               {}", snapshot.errors.unknown_errors));
    }

    if stop.workers_aborted > 0 {
        lines.push(String::new());
        lines.push(format!(
            "{} worker(s) did not stop in time and were aborted",
            stop.workers_aborted
        ));
    }

    lines.join("\n")
}
