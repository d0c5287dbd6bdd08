/*
 *  SPDX-License-Identifier: Apache-2.0 OR MIT
 *  © 2020-2022 ETH Zurich and other contributors, see AUTHORS.txt for details
 */

use std::path::{Path, PathBuf};
use std::process;

use clap::{App, Arg, ArgMatches};

use scenario_kitchen::{run_experiment, ExperimentConfig, ScenarioError};

fn is_unsigned(value: String) -> Result<(), String> {
    value
        .parse::<u64>()
        .map(|_| ())
        .map_err(|e| format!("Expected an unsigned integer: {}", e))
}

fn is_positive(value: String) -> Result<(), String> {
    match value.parse::<usize>() {
        Ok(0) => Err("Expected at least 1".to_owned()),
        Ok(_) => Ok(()),
        Err(e) => Err(format!("Expected a positive integer: {}", e)),
    }
}

fn run(matches: &ArgMatches) -> Result<(), ScenarioError> {
    let config_path = matches.value_of("config").unwrap_or("-");
    let config_dir = match config_path {
        "-" => PathBuf::from("."),
        path => Path::new(path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let working_dir = matches
        .value_of("working-dir")
        .map(PathBuf::from)
        .unwrap_or(config_dir);

    let mut overrides = matches
        .values_of("set")
        .map(|values| values.map(str::to_owned).collect::<Vec<_>>())
        .unwrap_or_default();
    if let Some(runs) = matches.value_of("runs") {
        overrides.push(format!("batch.runs={}", runs));
    }
    if let Some(seed) = matches.value_of("seed") {
        overrides.push(format!("planner.seed={}", seed));
    }
    let config = ExperimentConfig::load(config_path, overrides.iter().map(String::as_str))?;
    log::debug!("Loaded config {:?}", config);

    let plot_dir = matches.value_of("plot").map(PathBuf::from);
    let reports = run_experiment(config, &working_dir, plot_dir.as_deref())?;
    for report in &reports {
        println!("{}", serde_json::to_string(report)?);
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let matches = App::new("Kitchen planner")
        .version("1.0")
        .about("Estimates how likely a goal can be prepared in a kitchen")
        .arg(
            Arg::with_name("config")
                .required(true)
                .help("Sets config file path, - for stdin"),
        )
        .arg(
            Arg::with_name("working-dir")
                .required(false)
                .takes_value(true)
                .value_name("directory")
                .long("working-dir")
                .short("d")
                .help("Overrides the directory problem files are relative to"),
        )
        .arg(
            Arg::with_name("runs")
                .required(false)
                .takes_value(true)
                .value_name("count")
                .long("runs")
                .short("r")
                .validator(is_positive)
                .help("Overrides the number of runs"),
        )
        .arg(
            Arg::with_name("seed")
                .required(false)
                .takes_value(true)
                .value_name("seed")
                .long("seed")
                .validator(is_unsigned)
                .help("Overrides the base seed"),
        )
        .arg(
            Arg::with_name("plot")
                .required(false)
                .takes_value(true)
                .value_name("directory")
                .long("plot")
                .short("p")
                .help("Writes the search tree of each run as a dot file"),
        )
        .arg(
            Arg::with_name("set")
                .required(false)
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .short("s")
                .long("set")
                .validator(|str| {
                    if str.contains('=') {
                        Ok(())
                    } else {
                        Err("Invalid format, should be \"some.path=value\"".to_owned())
                    }
                })
                .help("Manually override a value in the config"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
