//! tcscript CLI - network condition script generator.

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use tcscript::cli::*;
use tcscript::codec::{self, export, PhaseBuckets};
use tcscript::config::{init_logging, Config, LoggingConfig};
use tcscript::error::Result;
use tcscript::presets::{self, LoadOutcome, PRESETS};
use tcscript::{report, stats, VERSION};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_config = LoggingConfig {
        level: cli.log_level.clone(),
        format: cli.log_format.as_str().into(),
        color: !cli.no_color,
    };
    init_logging(&log_config)?;
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load config if specified
    let config = if let Some(ref path) = cli.config {
        Config::load(path)?
    } else if Config::default_path().exists() {
        Config::load(Config::default_path())?
    } else {
        Config::default()
    };

    // Dispatch command
    match cli.command {
        Commands::Generate(args) => run_generate(args, config),
        Commands::Inspect(args) => run_inspect(args, &config),
        Commands::Presets(args) => run_presets(args, &config),
        Commands::Export(args) => run_export(args, &config),
        Commands::Levels => run_levels(&config),
        Commands::Config(args) => run_config(args),
    }
}

/// Run scenario generation
fn run_generate(args: GenerateArgs, config: Config) -> Result<()> {
    match args.mode {
        GenerateMode::Preset { out_dir, options } => {
            let config = apply_generation_options(config, &options)?;
            let out_dir = out_dir.unwrap_or_else(|| config.generator.output_dir.clone());
            std::fs::create_dir_all(&out_dir)?;

            print_banner(&config, "preset");
            let composer = config.composer()?;
            let mut rng = make_rng(config.generator.seed);

            let batch = presets::generate_presets(&composer, &PRESETS, &out_dir, &mut rng);
            if !options.quiet {
                for script in &batch.generated {
                    report::print_phase_stats(&script.name, &stats::summarize_timeline(&script.timeline));
                }
            }
            report::print_batch_summary(&batch);

            println!(
                "{} {}/{} scenarios written to {}",
                "▶".bright_green(),
                batch.generated.len(),
                PRESETS.len(),
                out_dir.display()
            );
            Ok(())
        }
        GenerateMode::Custom {
            phases,
            output,
            name,
            options,
        } => {
            let config = apply_generation_options(config, &options)?;

            print_banner(&config, "custom");
            println!("  Phases: {}", phases.join(" -> ").bright_yellow());
            let composer = config.composer()?;
            let mut rng = make_rng(config.generator.seed);

            let script = presets::generate_custom(&composer, &phases, &output, &name, &mut rng)?;
            if !options.quiet {
                report::print_phase_stats(&script.name, &stats::summarize_timeline(&script.timeline));
            }

            println!();
            println!(
                "{} {} ({} segments)",
                "✓".green(),
                script.path.display().to_string().bright_cyan(),
                script.timeline.len()
            );
            Ok(())
        }
    }
}

/// Decode each file and print its overview
fn run_inspect(args: InspectArgs, config: &Config) -> Result<()> {
    let buckets = decode_buckets(config, &args.decode)?;

    for file in args.files {
        let name = file.display().to_string();
        let script = presets::load_named(&name, file, &buckets);
        match script.outcome {
            LoadOutcome::Loaded(ref records) => {
                report::print_script_overview(&script.name, records);
                report::print_phase_stats(&script.name, &stats::summarize_buckets(records));
            }
            _ => report::print_loaded_scripts(std::slice::from_ref(&script)),
        }
    }

    Ok(())
}

/// Decode the preset set and print bucket averages
fn run_presets(args: PresetsArgs, config: &Config) -> Result<()> {
    let dir = args
        .dir
        .unwrap_or_else(|| config.generator.output_dir.clone());
    let buckets = decode_buckets(config, &args.decode)?;

    let scripts = presets::load_presets(&PRESETS, &dir, &buckets);
    report::print_loaded_scripts(&scripts);

    let loaded = scripts.iter().filter(|s| s.records().is_some()).count();
    println!();
    println!(
        "{} {}/{} preset scripts loaded from {}",
        "▶".bright_green(),
        loaded,
        scripts.len(),
        dir.display()
    );
    Ok(())
}

/// Export chart data
fn run_export(args: ExportArgs, config: &Config) -> Result<()> {
    let buckets = decode_buckets(config, &args.decode)?;
    let records = codec::read_script(&args.file, &buckets)?;
    let scenario = scenario_name(&args.file);

    match args.format {
        ExportFormat::Json => export::export_json(&args.output, &scenario, &records)?,
        ExportFormat::Csv => export::export_csv(&args.output, &records)?,
    }

    println!(
        "{} Exported {} records to {}",
        "✓".green(),
        records.len(),
        args.output.display().to_string().bright_cyan()
    );
    Ok(())
}

/// List congestion levels
fn run_levels(config: &Config) -> Result<()> {
    let registry = config.registry()?;
    report::print_levels(&registry);
    Ok(())
}

/// Print or save example configuration
fn run_config(args: ConfigArgs) -> Result<()> {
    let config = Config::example();

    if let Some(ref path) = args.output {
        config.save(path)?;
        println!(
            "{} Configuration written to {}",
            "✓".green(),
            path.display()
        );
    } else {
        println!("{}", config.to_toml()?);
    }

    Ok(())
}

/// Fold command-line generation flags into the config and re-validate.
fn apply_generation_options(mut config: Config, options: &GenerationOptions) -> Result<Config> {
    if let Some(seed) = options.seed {
        config.generator.seed = Some(seed);
    }
    if let Some(total) = options.total_duration_ms {
        config.generator.total_duration_ms = total;
    }
    if let Some(segment) = options.segment_duration_ms {
        config.generator.segment_duration_ms = segment;
    }
    config.validate()?;
    Ok(config)
}

/// The single RNG every generation call in this process draws from.
fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => {
            info!(seed, "using fixed random seed");
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    }
}

fn decode_buckets(config: &Config, options: &DecodeOptions) -> Result<PhaseBuckets> {
    config.buckets_with(options.bucket_mode.map(Into::into), options.total_duration_ms)
}

fn scenario_name(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
}

fn print_banner(config: &Config, mode: &str) {
    let total = config.generator.total_duration_ms;
    let phase = total / tcscript::PHASE_COUNT as i64;

    println!();
    println!(
        "{}",
        format!("tcscript {VERSION} - {mode} scenario generation").bright_white().bold()
    );
    println!("{}", "─".repeat(50).bright_blue());
    println!("  Total duration:   {}s ({total}ms)", total as f64 / 1000.0);
    println!("  Phase duration:   {}s ({phase}ms)", phase as f64 / 1000.0);
    println!(
        "  Segment duration: {}s ({}ms)",
        config.generator.segment_duration_ms as f64 / 1000.0,
        config.generator.segment_duration_ms
    );
    if let Some(seed) = config.generator.seed {
        println!("  Seed:             {}", seed.to_string().bright_yellow());
    }
    println!("{}", "─".repeat(50).bright_blue());
}
