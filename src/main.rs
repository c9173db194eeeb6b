// Copyright 2021 by Michael Thies <mail@mhthies.de>
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except in compliance with
// the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

use std::fs::File;
use std::str::FromStr;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use ttgen::csp::{self, SolveStatus};
use ttgen::model::{Problem, StrategyChoice};
use ttgen::{domain, io};

// Exit codes of the driver: 0 for a completed run (schedule found, or
// provable infeasibility / timeout documented in the solution document),
// 2 for malformed input, 1 for internal errors.
const EXIT_BAD_INPUT: i32 = 2;
const EXIT_INTERNAL: i32 = 1;

fn main() {
    // Setup logging & parse command line arguments
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!(
        "This is the weekly timetable generator (ttgen), version {}",
        option_env!("CARGO_PKG_VERSION").unwrap_or("unknown")
    );
    let args = parse_cli_args();

    if args.get_one::<String>("OUTPUT").is_none() && !args.get_flag("print") {
        warn!(
            "No OUTPUT file and no --print option given. The solution document will not be \
             exported anywhere."
        );
    }

    // Open and read input file
    let inpath: &String = args.get_one("INPUT").unwrap();
    debug!("Opening input file {} ...", inpath);
    let file = File::open(inpath).unwrap_or_else(|e| {
        error!("Could not open input file {}: {}", inpath, e);
        std::process::exit(EXIT_BAD_INPUT)
    });
    let raw = io::input::read(file).unwrap_or_else(|e| {
        error!("Input document is malformed: {}", e);
        std::process::exit(EXIT_BAD_INPUT)
    });

    // Validate and resolve the problem model
    let mut problem = Problem::build(raw).unwrap_or_else(|e| {
        error!("Input document is invalid: {}", e);
        std::process::exit(EXIT_BAD_INPUT)
    });

    // Command line overrides for the config
    if let Some(strategy_raw) = args.get_one::<String>("strategy") {
        problem.config.strategy = StrategyChoice::from_str(strategy_raw).unwrap_or_else(|e| {
            error!("Could not parse --strategy: {}", e);
            std::process::exit(EXIT_BAD_INPUT)
        });
    }
    if args.get_flag("no_mrv") {
        problem.config.use_mrv = false;
    }

    // In debug build: Check consistency of the resolved model
    if cfg!(debug_assertions) {
        io::assert_model_consistency(&problem);
    }

    info!(
        "Found {} timeslots, {} rooms, {} teachers and {} events to schedule.",
        problem.slots.len(),
        problem.rooms.len(),
        problem.teachers.len(),
        problem.events.len()
    );
    debug!("Events:\n{}", io::debug_list_of_events(&problem));

    // Pre-compute the unary domains
    let domains = domain::precompute(&problem);
    let infeasible = domains.infeasible(&problem);
    if !infeasible.is_empty() {
        for diagnostic in &infeasible {
            warn!("{}", diagnostic);
        }
        warn!(
            "{} event(s) cannot be placed at all; the problem is infeasible and the search is \
             not started.",
            infeasible.len()
        );
        let document = io::output::build_document(
            &problem,
            problem.config.strategy,
            SolveStatus::Failure,
            None,
        );
        export(&args, &problem, &document, None);
        // A documented infeasibility is a completed run.
        std::process::exit(0);
    }

    let deadline = args
        .get_one::<u64>("timeout")
        .map(|seconds| Instant::now() + Duration::from_secs(*seconds));

    // Run the search (one strategy, or all of them in comparison mode)
    let (status, schedule) = match csp::engine_strategy(problem.config.strategy) {
        Some(strategy) => {
            let report = csp::solve(&problem, &domains, strategy, problem.config.use_mrv, deadline);
            info!("Finished {} search. {}", strategy, report.statistics);
            (report.status, report.schedule)
        }
        None => {
            let reports = csp::solve_all(&problem, &domains, problem.config.use_mrv, deadline);
            info!("Strategy comparison:\n{}", csp::format_comparison(&reports));
            // The document carries the first successful strategy's schedule,
            // in the fixed running order.
            let timed_out = reports.iter().any(|r| r.status == SolveStatus::Timeout);
            match reports.into_iter().find(|r| r.status == SolveStatus::Success) {
                Some(report) => (SolveStatus::Success, report.schedule),
                None if timed_out => (SolveStatus::Timeout, None),
                None => (SolveStatus::Failure, None),
            }
        }
    };

    match status {
        SolveStatus::Success => info!(
            "Found a feasible schedule for all {} events.",
            problem.events.len()
        ),
        SolveStatus::Failure => warn!(
            "The search exhausted all states without finding a feasible schedule. The problem \
             is infeasible."
        ),
        SolveStatus::Timeout => warn!("The search hit the deadline before completing."),
    }

    let document = io::output::build_document(
        &problem,
        problem.config.strategy,
        status,
        schedule.as_ref(),
    );
    export(&args, &problem, &document, schedule.as_ref());
    // Failure and timeout are documented terminations, not errors.
    std::process::exit(0);
}

/// Write the solution document to the OUTPUT file (if given) and print the
/// human readable schedule (if requested).
fn export(
    args: &clap::ArgMatches,
    problem: &Problem,
    document: &ttgen::io::output::SolutionDocument,
    schedule: Option<&ttgen::Schedule>,
) {
    if let Some(outpath) = args.get_one::<String>("OUTPUT") {
        debug!("Opening output file {} ...", outpath);
        match File::create(outpath) {
            Err(e) => {
                error!("Could not open output file {}: {}.", outpath, e);
                std::process::exit(EXIT_INTERNAL);
            }
            Ok(file) => match io::output::write(file, document) {
                Ok(_) => debug!("Solution document written to {}.", outpath),
                Err(e) => {
                    error!("Could not write solution document to {}: {}.", outpath, e);
                    std::process::exit(EXIT_INTERNAL);
                }
            },
        }
    }

    if args.get_flag("print") {
        if let Some(schedule) = schedule {
            print!("The schedule is:\n{}", io::format_schedule(problem, schedule));
        } else {
            println!("No schedule to print (status: {}).", document.meta.status);
        }
    }
}

/// Helper function to construct and execute parser for command line options
fn parse_cli_args() -> clap::ArgMatches {
    clap::command!()
        .arg(
            clap::Arg::new("strategy")
                .short('s')
                .long("strategy")
                .help(
                    "Override the search strategy from the input document's config. One of dfs, \
                     bfs, ucs, astar or all (run every strategy and compare their metrics).",
                )
                .value_name("STRATEGY"),
        )
        .arg(
            clap::Arg::new("no_mrv")
                .long("no-mrv")
                .help(
                    "Disable the minimum-remaining-values variable selection heuristic and \
                     branch on events in declaration order instead, overriding the input \
                     document's config.",
                )
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("timeout")
                .long("timeout")
                .help(
                    "Abort the search after the given number of seconds. The deadline is \
                     sampled between expansions; the run is reported as a timeout in the \
                     solution document.",
                )
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            clap::Arg::new("print")
                .short('p')
                .long("print")
                .help("Print the calculated schedule to stdout in a human readable format")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("INPUT")
                .help("Sets the input file to use")
                .required(true)
                .index(1),
        )
        .arg(
            clap::Arg::new("OUTPUT")
                .help("Sets the output file to use")
                .index(2),
        )
        .get_matches()
}
