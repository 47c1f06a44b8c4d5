use crate::algorithms::{Algorithm, SearchStatus};
use crate::grid::PathCost;
use std::fmt;
use std::time::Duration;

/// Summary of one simulation run.
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub algorithm: Algorithm,
    /// `Running` when the run hit its step limit.
    pub outcome: SearchStatus,
    /// Steps across every process, replans included.
    pub total_steps: usize,
    /// Steps taken by the last process alone.
    pub final_steps: usize,
    pub replans: usize,
    pub static_walls: usize,
    pub dynamic_obstacles: usize,
    pub explored: usize,
    pub path_length: usize,
    pub path_cost: Option<PathCost>,
    /// Cheapest possible cost on the final grid, if the target is reachable.
    pub optimal_cost: Option<PathCost>,
    pub elapsed: Duration,
}

impl RunStatistics {
    pub fn success(&self) -> bool {
        self.outcome == SearchStatus::Succeeded
    }

    /// Found cost over the cheapest possible cost; 1.0 is optimal.
    pub fn cost_ratio(&self) -> Option<f64> {
        match (self.path_cost, self.optimal_cost) {
            (Some(found), Some(best)) if best > PathCost::ZERO => Some(found.as_f64() / best.as_f64()),
            _ => None,
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm: {}", self.algorithm)?;
        writeln!(f, "Outcome: {:?}", self.outcome)?;
        writeln!(f, "Total Steps: {}", self.total_steps)?;
        writeln!(f, "Steps Since Last Replan: {}", self.final_steps)?;
        writeln!(f, "Replans: {}", self.replans)?;
        writeln!(f, "Number of Walls: {}", self.static_walls)?;
        writeln!(f, "Number of Dynamic Obstacles: {}", self.dynamic_obstacles)?;
        writeln!(f, "Cells Explored: {}", self.explored)?;

        match self.path_cost {
            Some(cost) => {
                writeln!(f, "Path Length: {} cells", self.path_length)?;
                writeln!(f, "Path Cost: {cost}")?;
            }
            None => writeln!(f, "Path: none")?,
        }
        match self.optimal_cost {
            Some(cost) => writeln!(f, "Optimal Cost: {cost}")?,
            None => writeln!(f, "Optimal Cost: unreachable")?,
        }
        if let Some(ratio) = self.cost_ratio() {
            writeln!(f, "Cost Ratio: {ratio:.3}")?;
            if ratio > 1.0 {
                writeln!(f, "Note: path is {:.1}% above the optimal cost", (ratio - 1.0) * 100.0)?;
            }
        }
        writeln!(f, "Elapsed: {:.2?}", self.elapsed)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(path_cost: Option<u32>, optimal_cost: Option<u32>) -> RunStatistics {
        RunStatistics {
            algorithm: Algorithm::Bfs,
            outcome: if path_cost.is_some() {
                SearchStatus::Succeeded
            } else {
                SearchStatus::Exhausted
            },
            total_steps: 12,
            final_steps: 7,
            replans: 1,
            static_walls: 3,
            dynamic_obstacles: 2,
            explored: 9,
            path_length: 5,
            path_cost: path_cost.map(PathCost::from_tenths),
            optimal_cost: optimal_cost.map(PathCost::from_tenths),
            elapsed: Duration::from_millis(3),
        }
    }

    #[test]
    fn cost_ratio_compares_against_optimal() {
        let ratio = stats(Some(66), Some(64)).cost_ratio().unwrap();
        assert!((ratio - 66.0 / 64.0).abs() < 1e-9);
        assert_eq!(stats(None, Some(64)).cost_ratio(), None);
        assert_eq!(stats(Some(66), None).cost_ratio(), None);
    }

    #[test]
    fn display_lists_outcome_and_costs() {
        let text = stats(Some(66), Some(64)).to_string();
        assert!(text.contains("Outcome: Succeeded"));
        assert!(text.contains("Path Cost: 6.6"));
        assert!(text.contains("Optimal Cost: 6.4"));
        assert!(text.contains("Cost Ratio: 1.031"));

        let failed = stats(None, None).to_string();
        assert!(failed.contains("Path: none"));
        assert!(failed.contains("Optimal Cost: unreachable"));
        assert!(!stats(None, None).success());
    }
}
