//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads the models and q values
//! - runs the simulation pipeline once per model
//! - prints each run summary and writes the data dumps

use std::path::Path;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, SimulateArgs};
use crate::domain::{ModelProfile, QSource, SimConfig};
use crate::error::AppError;
use crate::models::ShapeRegistry;

pub mod pipeline;

/// Model name used for output files when neither the CLI nor the model file sets one.
pub const DEFAULT_MODEL_NAME: &str = "Model_1";

/// Entry point for the `shape2sas` binary.
pub fn run() -> Result<(), AppError> {
    // `shape2sas` and `shape2sas --npoints 5000` behave like `shape2sas simulate ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::setup_logging(cli.verbose, cli.quiet)?;

    let registry = ShapeRegistry::builtin();
    match cli.command {
        Command::Simulate(args) => handle_simulate(&args, &registry),
        Command::Shapes => {
            print!("{}", crate::report::format_shape_list(&registry));
            Ok(())
        }
    }
}

fn handle_simulate(args: &SimulateArgs, registry: &ShapeRegistry) -> Result<(), AppError> {
    let models = match &args.model {
        Some(path) => crate::io::read_models_json(path)?,
        None => vec![ModelProfile::default()],
    };
    let names = resolve_names(args.name.as_deref(), &models)?;
    info!(models = models.len(), "simulating");

    for (index, (model, name)) in models.into_iter().zip(names).enumerate() {
        let config = sim_config_from_args(args, model, index)?;
        let run = pipeline::run_simulation(&config, registry)
            .map_err(|e| AppError::new(e.exit_code(), format!("Model '{name}': {e}")))?;
        println!(
            "{}",
            crate::report::format_run_summary(&name, &run.model, &run.pair, &run.theory)
        );
        write_outputs(&args.output_dir, &name, &run)?;
    }
    Ok(())
}

fn write_outputs(dir: &Path, name: &str, run: &pipeline::SimulationRun) -> Result<(), AppError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::new(2, format!("Failed to create output directory '{}': {e}", dir.display()))
    })?;
    let written = [
        crate::io::write_pr(dir, name, &run.pair)?,
        crate::io::write_seff(dir, name, &run.theory)?,
        crate::io::write_iq(dir, name, &run.theory)?,
        crate::io::write_isim(dir, name, &run.simulated)?,
    ];
    for path in &written {
        info!(path = %path.display(), "wrote");
    }
    Ok(())
}

/// Output names, one per model.
///
/// A single model takes `--name`, then its own name, then `Model_1`. In a batch the
/// model's own name wins and unnamed models become `<flag>_<k>` or `Model_<k>`.
/// Names must be unique since they key the dump files.
fn resolve_names(flag: Option<&str>, models: &[ModelProfile]) -> Result<Vec<String>, AppError> {
    let names: Vec<String> = if let [model] = models {
        vec![
            flag.map(str::to_string)
                .or_else(|| model.name.clone())
                .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
        ]
    } else {
        models
            .iter()
            .enumerate()
            .map(|(i, m)| {
                m.name.clone().unwrap_or_else(|| match flag {
                    Some(prefix) => format!("{prefix}_{}", i + 1),
                    None => format!("Model_{}", i + 1),
                })
            })
            .collect()
    };

    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(AppError::new(2, format!("Model name '{name}' is used more than once.")));
        }
    }
    Ok(names)
}

/// Build the pipeline configuration for the `index`-th model of a run.
///
/// Settings stored on the model win over the flags. Each model draws from its own
/// seed, `--seed + index`.
pub fn sim_config_from_args(
    args: &SimulateArgs,
    model: ModelProfile,
    index: usize,
) -> Result<SimConfig, AppError> {
    let q = match &args.q_file {
        Some(path) => QSource::Sampled(crate::io::read_q_file(path)?),
        None => QSource::Uniform {
            qmin: args.qmin,
            qmax: args.qmax,
            n: args.qpoints,
        },
    };

    Ok(SimConfig {
        total_points: args.npoints,
        n_bins: args.prpoints,
        q,
        exposure: args.exposure,
        polydispersity: model.polydispersity.unwrap_or(args.polydispersity),
        concentration: model.concentration.unwrap_or(args.conc),
        sigma_roughness: model.sigma_roughness.unwrap_or(args.sigma_r),
        exclude_overlap: model.exclude_overlap.unwrap_or(args.exclude_overlap),
        seed: args.seed.wrapping_add(index as u64),
        structure_factor: None,
        model,
    })
}

/// Rewrite argv so a missing subcommand means `simulate`.
///
/// Rules:
/// - `shape2sas`                        -> `shape2sas simulate`
/// - `shape2sas --npoints 5000 ...`     -> `shape2sas simulate --npoints 5000 ...`
/// - `shape2sas --help/--version/-h`    -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("simulate".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "simulate" | "shapes");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "simulate".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn parse_simulate(args: &[&str]) -> SimulateArgs {
        let cli = crate::cli::Cli::parse_from(rewrite_args(argv(args)));
        match cli.command {
            Command::Simulate(a) => a,
            Command::Shapes => panic!("expected simulate"),
        }
    }

    #[test]
    fn bare_invocation_defaults_to_simulate() {
        assert_eq!(rewrite_args(argv(&["shape2sas"])), argv(&["shape2sas", "simulate"]));
        assert_eq!(
            rewrite_args(argv(&["shape2sas", "--npoints", "10"])),
            argv(&["shape2sas", "simulate", "--npoints", "10"])
        );
        assert_eq!(rewrite_args(argv(&["shape2sas", "--help"])), argv(&["shape2sas", "--help"]));
        assert_eq!(rewrite_args(argv(&["shape2sas", "shapes"])), argv(&["shape2sas", "shapes"]));
    }

    #[test]
    fn model_settings_win_over_flags() {
        let args = parse_simulate(&["shape2sas", "--exclude-overlap", "true", "--conc", "0.1"]);
        let model = ModelProfile {
            exclude_overlap: Some(false),
            sigma_roughness: Some(3.0),
            ..ModelProfile::default()
        };
        let config = sim_config_from_args(&args, model, 0).unwrap();
        assert!(!config.exclude_overlap);
        assert_eq!(config.sigma_roughness, 3.0);
        assert_eq!(config.concentration, 0.1);
        assert_eq!(config.total_points, 3000);
        assert_eq!(config.seed, 42);
        assert_eq!(
            config.q,
            QSource::Uniform {
                qmin: 0.001,
                qmax: 0.5,
                n: 400
            }
        );

        let second = sim_config_from_args(&args, ModelProfile::default(), 1).unwrap();
        assert_eq!(second.seed, 43);
    }

    #[test]
    fn output_name_prefers_flag_then_model_then_default() {
        let unnamed = ModelProfile::default();
        let named = ModelProfile {
            name: Some("rod".to_string()),
            ..ModelProfile::default()
        };
        let one = |flag, model: &ModelProfile| resolve_names(flag, std::slice::from_ref(model)).unwrap();
        assert_eq!(one(None, &unnamed), vec![DEFAULT_MODEL_NAME]);
        assert_eq!(one(None, &named), vec!["rod"]);
        assert_eq!(one(Some("mine"), &named), vec!["mine"]);
    }

    #[test]
    fn batch_names_are_numbered_and_unique() {
        let named = ModelProfile {
            name: Some("rod".to_string()),
            ..ModelProfile::default()
        };
        let batch = [named.clone(), ModelProfile::default()];
        assert_eq!(resolve_names(None, &batch).unwrap(), vec!["rod", "Model_2"]);
        assert_eq!(resolve_names(Some("run"), &batch).unwrap(), vec!["rod", "run_2"]);

        let err = resolve_names(None, &[named.clone(), named]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn simulate_writes_all_dumps() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let out_str = out.to_string_lossy().to_string();
        let args = parse_simulate(&[
            "shape2sas",
            "--npoints",
            "300",
            "--prpoints",
            "30",
            "--qpoints",
            "40",
            "--output-dir",
            &out_str,
            "--name",
            "ball",
        ]);
        handle_simulate(&args, &ShapeRegistry::builtin()).unwrap();

        for file in ["pr_ball.dat", "Sq_ball.dat", "Iq_ball.dat", "Isim_ball.dat"] {
            let text = std::fs::read_to_string(out.join(file)).unwrap();
            assert!(text.starts_with('#'), "{file}");
        }
        let iq = std::fs::read_to_string(out.join("Iq_ball.dat")).unwrap();
        assert_eq!(iq.lines().count(), 41);
        let pr = std::fs::read_to_string(out.join("pr_ball.dat")).unwrap();
        assert_eq!(pr.lines().count(), 31);
    }

    #[test]
    fn every_model_in_a_batch_gets_its_own_dumps() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("models.json");
        std::fs::write(
            &model_path,
            r#"{"models":[
                {"name":"core_shell","subunits":[
                    {"shape":"sphere","dimensions":[20],"contrast":-1.0},
                    {"shape":"sphere","dimensions":[35]}]},
                {"conc":0.05,"subunits":[{"shape":"cylinder","dimensions":[10,80]}]}
            ]}"#,
        )
        .unwrap();
        let out = dir.path().join("out");
        let model_str = model_path.to_string_lossy().to_string();
        let out_str = out.to_string_lossy().to_string();
        let args = parse_simulate(&[
            "shape2sas",
            "--model",
            &model_str,
            "--npoints",
            "400",
            "--prpoints",
            "30",
            "--qpoints",
            "40",
            "--output-dir",
            &out_str,
        ]);
        handle_simulate(&args, &ShapeRegistry::builtin()).unwrap();

        for name in ["core_shell", "Model_2"] {
            for prefix in ["pr", "Sq", "Iq", "Isim"] {
                assert!(out.join(format!("{prefix}_{name}.dat")).is_file(), "{prefix}_{name}");
            }
        }
    }
}
