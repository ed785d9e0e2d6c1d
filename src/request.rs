use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::common::{MultiGoalResult, Position, Termination};
use crate::error::ValidationError;
use crate::map::Grid;
use crate::solver::Problem;

/// Solve request as sent by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRequest {
    /// Rows of 0/1 cells, `1` marking a wall.
    #[serde(alias = "maze")]
    pub grid: Vec<Vec<u8>>,
    pub start: Position,
    pub goals: Vec<Position>,
    pub algorithm: Algorithm,
    #[serde(
        default,
        rename = "depthLimit",
        alias = "depth_limit",
        alias = "limit",
        skip_serializing_if = "Option::is_none"
    )]
    pub depth_limit: Option<usize>,
}

impl SolveRequest {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open request {path}"))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).with_context(|| format!("invalid request in {path}"))
    }

    pub fn into_problem(self) -> Result<Problem, ValidationError> {
        let grid = Grid::from_matrix(&self.grid)?;
        Problem::new(
            grid,
            self.start,
            self.goals,
            self.algorithm,
            self.depth_limit,
        )
    }
}

/// Wire shape of a finished solve. Every `_single` array is aligned with
/// `goals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
    pub success: bool,
    pub algorithm: Algorithm,
    pub termination: Termination,
    pub goals: Vec<Position>,
    pub solution_multiple: Vec<Position>,
    pub nodes_explored_multiple: Vec<Position>,
    pub path_length_multiple: usize,
    pub num_explored_multiple: usize,
    pub solution_single: Vec<Vec<Position>>,
    pub nodes_explored_single: Vec<Vec<Position>>,
    pub path_length_single: Vec<usize>,
    pub num_explored_single: Vec<usize>,
    pub total_path_length: usize,
    pub total_explored: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_bound: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visited_by_depth: Option<BTreeMap<usize, Vec<Position>>>,
    /// Seconds.
    pub time_taken: f64,
}

impl SolveResponse {
    pub fn from_result(algorithm: Algorithm, result: MultiGoalResult) -> Self {
        let success = result.success();
        let time_taken = result.elapsed.as_secs_f64();
        let (total_path_length, total_explored) = (result.total_path_length, result.total_explored);
        let combined = result.combined;

        let mut goals = Vec::with_capacity(result.individual.len());
        let mut solution_single = Vec::with_capacity(result.individual.len());
        let mut nodes_explored_single = Vec::with_capacity(result.individual.len());
        let mut path_length_single = Vec::with_capacity(result.individual.len());
        let mut num_explored_single = Vec::with_capacity(result.individual.len());
        for entry in result.individual {
            goals.push(entry.goal);
            path_length_single.push(entry.outcome.path_length());
            num_explored_single.push(entry.outcome.nodes_explored);
            solution_single.push(entry.outcome.path);
            nodes_explored_single.push(entry.outcome.explored_order);
        }

        SolveResponse {
            success,
            algorithm,
            termination: combined.termination,
            goals,
            path_length_multiple: combined.path_length(),
            num_explored_multiple: combined.nodes_explored,
            solution_multiple: combined.path,
            nodes_explored_multiple: combined.explored_order,
            solution_single,
            nodes_explored_single,
            path_length_single,
            num_explored_single,
            total_path_length,
            total_explored,
            final_bound: combined.final_bound,
            visited_by_depth: combined.visited_by_depth,
            time_taken,
        }
    }
}
