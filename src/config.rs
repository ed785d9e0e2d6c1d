use std::time::Duration;

use anyhow::{anyhow, bail};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::algorithm::Algorithm;
use crate::solver::SearchOptions;

#[derive(Parser, Debug, Default)]
#[command(
    name = "Maze Search",
    about = "Classical grid search strategies with explored-order traces.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to a JSON solve request", conflicts_with = "maze")]
    pub request: Option<String>,

    #[arg(long, help = "Path to a maze text file")]
    pub maze: Option<String>,

    #[arg(long, help = "Algorithm to use: bfs, dfs, gbfs, as, backtracking, depthlimited, ids, idas")]
    pub algorithm: Option<Algorithm>,

    #[arg(long, help = "Depth bound for depthlimited, ids and idas")]
    pub depth_limit: Option<usize>,

    #[arg(long, help = "Ceiling for iterative bounds (default: number of grid cells)")]
    pub max_bound: Option<usize>,

    #[arg(long, help = "Abort searches after this many milliseconds")]
    pub timeout_ms: Option<u64>,

    #[arg(long, help = "Run goal searches one after another", default_value_t = false)]
    pub sequential: bool,

    #[arg(long, help = "Path to the output file (default: stdout)")]
    pub output: Option<String>,

    #[arg(long, help = "Pretty-print the JSON response", default_value_t = false)]
    pub pretty: bool,

    #[arg(long, help = "Log filter, e.g. info or maze_search=debug")]
    pub log_level: Option<String>,

    #[arg(long, help = "List the available algorithms and exit", default_value_t = false)]
    pub list_algorithms: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub request_path: Option<String>,
    pub maze_path: Option<String>,
    pub output_path: Option<String>,
    /// Overrides the algorithm of a request file; required for maze files.
    pub algorithm: Option<Algorithm>,
    pub depth_limit: Option<usize>,
    pub max_bound: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub parallel: bool,
    pub pretty: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            request_path: None,
            maze_path: None,
            output_path: None,
            algorithm: None,
            depth_limit: None,
            max_bound: None,
            timeout_ms: None,
            parallel: true,
            pretty: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if cli.request.is_some() || cli.maze.is_some() {
            self.request_path = cli.request.clone();
            self.maze_path = cli.maze.clone();
        }
        if let Some(output) = &cli.output {
            self.output_path = Some(output.clone());
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = Some(algorithm);
        }
        if let Some(depth_limit) = cli.depth_limit {
            self.depth_limit = Some(depth_limit);
        }
        if let Some(max_bound) = cli.max_bound {
            self.max_bound = Some(max_bound);
        }
        if let Some(timeout_ms) = cli.timeout_ms {
            self.timeout_ms = Some(timeout_ms);
        }
        if cli.sequential {
            self.parallel = false;
        }
        if cli.pretty {
            self.pretty = true;
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = log_level.clone();
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        match (&self.request_path, &self.maze_path) {
            (Some(_), Some(_)) => bail!("Specify either a request file or a maze file, not both"),
            (None, None) => bail!("No input given, use --request or --maze"),
            (None, Some(_)) if self.algorithm.is_none() => {
                bail!("An algorithm is required when solving a maze file")
            }
            _ => {}
        }

        if let Some(algorithm) = self.algorithm {
            // Request files may still carry their own limit.
            if algorithm.requires_bound() && self.depth_limit.is_none() && self.maze_path.is_some()
            {
                return Err(anyhow!("Algorithm '{algorithm}' requires --depth-limit"));
            }
        }

        if self.max_bound == Some(0) {
            bail!("Max bound must be greater than 0");
        }
        if self.timeout_ms == Some(0) {
            bail!("Timeout must be greater than 0 milliseconds");
        }
        Ok(())
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_bound: self.max_bound,
            timeout: self.timeout_ms.map(Duration::from_millis),
            parallel: self.parallel,
            ..SearchOptions::default()
        }
    }
}
