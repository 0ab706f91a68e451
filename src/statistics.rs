use crate::algorithms::SearchReport;
use std::fmt;
use std::time::Duration;

/// Counters collected over one dynamic follow.
#[derive(Debug, Clone, Default)]
pub struct FollowStatistics {
    pub total_moves: usize,
    pub replans: usize,
    pub obstacles_placed: usize,
    /// Initial search plus every replan.
    pub searches: usize,
    pub search_times: Vec<Duration>,
    /// Fewest hops from start to target before any obstacle appeared.
    pub optimal_path_length: usize,
    pub route_efficiency: f64,
}

impl FollowStatistics {
    pub fn new(optimal_path_length: usize) -> Self {
        FollowStatistics {
            optimal_path_length,
            ..Default::default()
        }
    }

    pub fn record_search(&mut self, elapsed: Duration) {
        self.searches += 1;
        self.search_times.push(elapsed);
    }

    pub fn calculate_efficiency(&mut self) {
        if self.total_moves > 0 && self.optimal_path_length > 0 {
            self.route_efficiency = self.total_moves as f64 / self.optimal_path_length as f64;
        } else {
            self.route_efficiency = 0.0;
        }
    }

    pub fn average_search_time(&self) -> Duration {
        if self.search_times.is_empty() {
            Duration::ZERO
        } else {
            self.total_search_time() / self.search_times.len() as u32
        }
    }

    pub fn total_search_time(&self) -> Duration {
        self.search_times.iter().sum()
    }

    /// Moves taken beyond the obstacle-free route.
    pub fn extra_moves(&self) -> usize {
        self.total_moves.saturating_sub(self.optimal_path_length)
    }
}

impl fmt::Display for FollowStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total Moves: {}", self.total_moves)?;
        writeln!(f, "Optimal Path Length: {}", self.optimal_path_length)?;
        writeln!(f, "Obstacles Placed: {}", self.obstacles_placed)?;
        writeln!(f, "Replans: {}", self.replans)?;
        writeln!(f, "Searches: {}", self.searches)?;
        writeln!(f, "Average Search Time: {:.2?}", self.average_search_time())?;
        writeln!(f, "Route Efficiency: {:.3}", self.route_efficiency)?;

        if self.route_efficiency > 0.0 && self.extra_moves() > 0 {
            writeln!(f, "Extra moves due to obstacles: {}", self.extra_moves())?;
        }
        Ok(())
    }
}

/// One row of an algorithm comparison.
#[derive(Debug, Clone)]
pub struct SearchStatistics {
    pub algorithm: &'static str,
    pub found: bool,
    pub hops: usize,
    pub cost: f64,
    pub expanded: usize,
    pub elapsed: Duration,
    /// The run hit its step budget before finishing.
    pub cancelled: bool,
}

impl SearchStatistics {
    pub fn cancelled(algorithm: &'static str, expanded: usize, elapsed: Duration) -> Self {
        SearchStatistics {
            algorithm,
            found: false,
            hops: 0,
            cost: 0.0,
            expanded,
            elapsed,
            cancelled: true,
        }
    }

    pub fn header() -> String {
        format!(
            "{:<15} {:<8} {:<8} {:<8} {:<10} {:<12}",
            "Algorithm", "Found", "Hops", "Cost", "Expanded", "Time"
        )
    }
}

impl From<&SearchReport> for SearchStatistics {
    fn from(report: &SearchReport) -> Self {
        SearchStatistics {
            algorithm: report.algorithm,
            found: report.found,
            hops: report.path.hops(),
            cost: report.path.cost(),
            expanded: report.expanded,
            elapsed: report.elapsed,
            cancelled: false,
        }
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let found = match (self.found, self.cancelled) {
            (_, true) => "budget",
            (true, false) => "✓",
            (false, false) => "✗",
        };
        let (hops, cost) = if self.found {
            (self.hops.to_string(), format!("{:.1}", self.cost))
        } else {
            ("-".to_string(), "-".to_string())
        };
        write!(
            f,
            "{:<15} {:<8} {:<8} {:<8} {:<10} {:<12}",
            self.algorithm,
            found,
            hops,
            cost,
            self.expanded,
            format!("{:.2?}", self.elapsed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn efficiency_is_moves_over_optimal() {
        let mut stats = FollowStatistics::new(4);
        stats.total_moves = 6;
        stats.calculate_efficiency();
        assert!((stats.route_efficiency - 1.5).abs() < 1e-9);
        assert_eq!(stats.extra_moves(), 2);

        let mut idle = FollowStatistics::new(0);
        idle.calculate_efficiency();
        assert_eq!(idle.route_efficiency, 0.0);
    }

    #[test]
    fn average_search_time_handles_no_searches() {
        let mut stats = FollowStatistics::default();
        assert_eq!(stats.average_search_time(), Duration::ZERO);
        stats.record_search(Duration::from_millis(2));
        stats.record_search(Duration::from_millis(4));
        assert_eq!(stats.searches, 2);
        assert_eq!(stats.average_search_time(), Duration::from_millis(3));
    }

    #[test]
    fn cancelled_rows_show_budget() {
        let row = SearchStatistics::cancelled("iddfs", 100, Duration::from_millis(1));
        let text = row.to_string();
        assert!(text.starts_with("iddfs"));
        assert!(text.contains("budget"));
        assert!(text.contains("100"));
    }
}
