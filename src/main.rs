#![allow(non_snake_case)]
use CompMath::Utils::config::SolverConfig;
use CompMath::Utils::logger::init_logger;
use CompMath::Utils::tables::{render_table, save_table_to_csv};
use CompMath::numerical::curve_fitting::approximation::{CurveFitSolver, best_fit};
use CompMath::numerical::linear_systems::linear_solver::{LinearMethod, LinearSystemSolver};
use CompMath::numerical::nonlinear_systems::system_solver::{NonlinearMethod, NonlinearSystemSolver};
use CompMath::numerical::quadrature::quadrature_rules::{QuadratureMethod, QuadratureSolver};
use CompMath::numerical::root_finding::root_solver::{RootMethod, RootSolver};
use std::env;
use strum::IntoEnumIterator;

/// `CompMath [config.toml] [example]`
fn main() {
    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => match SolverConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("cannot load {}: {}", path, e);
                return;
            }
        },
        None => SolverConfig::default(),
    };
    init_logger(&config.loglevel, config.log_to_file);
    let example: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(0);

    match example {
        0 => {
            // every root finder on x^3 - 2x - 5
            for method in RootMethod::iter() {
                let fx = if method == RootMethod::SimpleIteration {
                    "(2*x + 5)^(1/3)"
                } else {
                    "x**3 - 2*x - 5"
                };
                let mut solver = RootSolver::new(method, fx, 2.0, 3.0).with_config(&config);
                match solver.solve() {
                    Ok(result) => println!(
                        "{}: x = {} after {} iterations ({})",
                        result.title, result.root, result.iterations, result.state
                    ),
                    Err(e) => println!("{}: {}", method, e),
                }
            }
        }
        1 => {
            // quadrature rules against the reference integral
            for method in QuadratureMethod::iter() {
                let mut solver = QuadratureSolver::new(method, "sin(x) + x^2", 0.0, 3.0, 12).with_config(&config);
                match solver.solve() {
                    Ok(result) => {
                        println!("{}: {}", result.title, result.value);
                        if let Some(comparison) = result.comparison {
                            println!(
                                "   reference {}, |delta| = {}, {}%",
                                comparison.reference.reference, comparison.abs_delta, comparison.relative_delta
                            );
                        }
                    }
                    Err(e) => println!("{}: {}", method, e),
                }
            }
        }
        2 => {
            // the same system in three variants
            let rows = vec![vec![2.0, 7.0, 1.0], vec![9.0, 1.0, 2.0], vec![1.0, 1.0, 6.0]];
            let b = vec![10.0, 12.0, 8.0];
            for method in LinearMethod::iter() {
                let solver = match LinearSystemSolver::from_rows(method, rows.clone(), b.clone()) {
                    Ok(solver) => solver.with_config(&config),
                    Err(e) => {
                        println!("{}", e);
                        return;
                    }
                };
                match solver.solve() {
                    Ok(variants) => {
                        for variant in variants {
                            println!("{} / {}", method, variant.title);
                            println!("{}", variant.log.join("\n"));
                        }
                    }
                    Err(e) => println!("{}: {}", method, e),
                }
            }
        }
        3 => {
            // circle and line
            let equations = vec!["x^2 + y^2 - 4".to_string(), "0.5*x - y + 0.3".to_string()];
            for method in NonlinearMethod::iter() {
                let solver =
                    NonlinearSystemSolver::new(method, equations.clone(), (1.5, 1.0)).with_config(&config);
                match solver.solve() {
                    Ok(result) => {
                        println!("{}: {:?} ({})", result.title, result.solution, result.status);
                        println!("{}", render_table(&result.table));
                    }
                    Err(e) => println!("{}: {}", method, e),
                }
            }
        }
        4 => {
            // approximation, interpolation and a csv of the bisection table
            let points = [(1.0, 2.1), (2.0, 3.9), (3.0, 6.2), (4.0, 7.8), (5.0, 10.1), (6.0, 12.2)];
            let solver = match CurveFitSolver::new(&points) {
                Ok(solver) => solver.with_config(&config),
                Err(e) => {
                    println!("{}", e);
                    return;
                }
            };
            match solver.approximate_all() {
                Ok(results) => {
                    for result in &results {
                        println!("{}: S = {}, coefficient = {:?}", result.title, result.sum_diff, result.coefficient);
                    }
                    if let Some(best) = best_fit(&results) {
                        println!("best: {}", results[best].title);
                    }
                }
                Err(e) => println!("{}", e),
            }
            match solver.interpolate_all(2.5) {
                Ok(results) => {
                    for result in results {
                        println!("{}: {:?}", result.title, result.value);
                    }
                }
                Err(e) => println!("{}", e),
            }
            let mut bisection = RootSolver::new(RootMethod::Bisection, "x**3 - 2*x - 5", 2.0, 3.0);
            if let Ok(result) = bisection.solve() {
                if let Err(e) = save_table_to_csv(&result.table, "bisection.csv") {
                    println!("{}", e);
                }
            }
        }
        _ => println!("examples are numbered 0 to 4"),
    }
}
