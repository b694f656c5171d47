//! This file contains all of the code for keeping stats for a replay session

use chrono::Local;
use std::time::Instant;

use crate::coverage::{CoverageMap, CONTEXT_BITS, MAP_SIZE};
use crate::misc::format_uptime;

// Helper function to format a group of stats
fn format_group(title: &str, stats: &[(String, String)]) -> String {
    let stats_str = stats
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("\x1b[1;32m{}:\x1b[0m {}", title, stats_str)
}

#[derive(Clone, Default)]
pub struct Stats {
    pub start_str: String,          // String repr of date start
    session_start: Option<Instant>, // Start time
    pub branches: usize,            // Branches fed to the map
    pub interesting: usize,         // Branches the map flagged
    pub edges: usize,               // Non-zero trace map bytes
    pub contexts: usize,            // Context map bits set
    pub visited: usize,             // Distinct edges hit this session
}

impl Stats {
    pub fn new() -> Self {
        Stats::default()
    }

    // Start the timer
    pub fn start_session(&mut self) {
        self.start_str = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.session_start = Some(Instant::now());
    }

    // Account for one branch
    #[inline]
    pub fn update(&mut self, interesting: bool) {
        self.branches += 1;
        if interesting {
            self.interesting += 1;
        }
    }

    // Snapshot the shared map counters
    pub fn sample_map(&mut self, map: &CoverageMap) {
        self.edges = map.get_edge_count();
        self.contexts = map.get_context_count();
        self.visited = map.visited_len();
    }

    pub fn map_coverage(&self) -> f64 {
        (self.edges as f64 / MAP_SIZE as f64) * 100.0
    }

    pub fn context_density(&self) -> f64 {
        (self.contexts as f64 / CONTEXT_BITS as f64) * 100.0
    }

    pub fn interesting_rate(&self) -> f64 {
        if self.branches == 0 {
            return 0.0;
        }

        (self.interesting as f64 / self.branches as f64) * 100.0
    }

    pub fn print_stats(&self) {
        let uptime = self
            .session_start
            .map(|start| format_uptime(start.elapsed().as_secs()))
            .unwrap_or_else(|| format_uptime(0));

        println!(
            "\n\x1b[1;35m[branchmap stats (start time: {})]\x1b[0m",
            self.start_str
        );

        let replay = [
            ("uptime".to_string(), uptime),
            ("branches".to_string(), self.branches.to_string()),
            ("interesting".to_string(), self.interesting.to_string()),
            (
                "rate".to_string(),
                format!("{:.2}%", self.interesting_rate()),
            ),
        ];
        println!("{}", format_group("replay", &replay));

        let bitmap = [
            ("edges".to_string(), self.edges.to_string()),
            ("map".to_string(), format!("{:.2}%", self.map_coverage())),
            ("contexts".to_string(), self.contexts.to_string()),
            ("visited".to_string(), self.visited.to_string()),
            (
                "context map".to_string(),
                format!("{:.3}%", self.context_density()),
            ),
        ];
        println!("{}", format_group("bitmap", &bitmap));
    }
}
