use maze_search::algorithm::Algorithm;
use maze_search::config::{Cli, Config};
use maze_search::maze_file::MazeFile;
use maze_search::request::{SolveRequest, SolveResponse};
use maze_search::solver::{MultiGoalSolver, Problem};

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_algorithms {
        for algorithm in Algorithm::ALL {
            let bound = if algorithm.requires_bound() {
                " (needs --depth-limit)"
            } else {
                ""
            };
            println!("{:<14}{}{bound}", algorithm.name(), algorithm.description());
        }
        return Ok(());
    }

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        Config::default()
    }
    .override_from_command_line(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str())),
        )
        .with_writer(std::io::stderr)
        .init();

    let problem = load_problem(&config)?;
    let algorithm = problem.algorithm;
    info!(
        "solving {}x{} grid from {:?} to {} goal(s) with {algorithm}",
        problem.grid.cols(),
        problem.grid.rows(),
        problem.start,
        problem.goals.len()
    );

    let solver = MultiGoalSolver::new(problem, config.search_options())?;
    let result = solver.solve().await?;
    let response = SolveResponse::from_result(algorithm, result);

    let json = if config.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    match &config.output_path {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("cannot write output {path}"))?
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn load_problem(config: &Config) -> anyhow::Result<Problem> {
    if let Some(path) = &config.request_path {
        let mut request = SolveRequest::load_from_file(path)?;
        if let Some(algorithm) = config.algorithm {
            request.algorithm = algorithm;
        }
        if config.depth_limit.is_some() {
            request.depth_limit = config.depth_limit;
        }
        return Ok(request.into_problem()?);
    }

    let path = config
        .maze_path
        .as_ref()
        .ok_or_else(|| anyhow!("no input file configured"))?;
    let algorithm = config
        .algorithm
        .ok_or_else(|| anyhow!("an algorithm is required when solving a maze file"))?;
    let maze = MazeFile::from_file(path).with_context(|| format!("error loading maze {path}"))?;
    Ok(maze.into_problem(algorithm, config.depth_limit)?)
}
