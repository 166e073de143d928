//! Polydice command line
//!
//! Rolls a notation string headlessly, runs the tray until every die settles
//! and prints the results. The browser build uses `polydice::wasm` instead.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};
    use std::process::ExitCode;
    use std::time::{SystemTime, UNIX_EPOCH};

    use clap::Parser;
    use serde::Serialize;

    use polydice::luck::LuckReport;
    use polydice::sim::Outcome;
    use polydice::{DiceCounts, DiceError, DiceTray, DieType, TraySettings};

    #[derive(Parser)]
    #[command(
        name = "polydice",
        about = "Roll physically simulated polyhedral dice and report how lucky you were"
    )]
    struct Args {
        /// Dice notation, e.g. "2d6+1d20+3" (empty rolls 2d8)
        #[arg(default_value = "", allow_hyphen_values = true)]
        notation: String,
        /// Roll seed; the same seed replays the same roll
        #[arg(long)]
        seed: Option<u64>,
        /// Settings JSON file (defaults are used if missing or invalid)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
        /// Give up after this many simulated seconds
        #[arg(long, default_value_t = 120.0)]
        max_seconds: f32,
        /// Write every die type's label atlas as PNG into this directory and exit
        #[arg(long, value_name = "DIR")]
        export_atlases: Option<PathBuf>,
    }

    #[derive(Serialize)]
    struct RollSummary<'a> {
        notation: String,
        seed: u64,
        settled: bool,
        sim_seconds: f32,
        results: &'a [Option<Outcome>],
        luck: &'a LuckReport,
    }

    pub fn run() -> ExitCode {
        env_logger::init();
        let args = Args::parse();
        match execute(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                log::error!("{err}");
                eprintln!("error: {err}");
                ExitCode::FAILURE
            }
        }
    }

    fn execute(args: &Args) -> Result<(), DiceError> {
        if let Some(dir) = &args.export_atlases {
            return export_atlases(dir);
        }

        let settings = match &args.settings {
            Some(path) => TraySettings::load_from(path).unwrap_or_else(|err| {
                log::warn!("Ignoring settings {}: {err}", path.display());
                TraySettings::default()
            }),
            None => TraySettings::load(),
        };

        let counts = DiceCounts::from_notation(&args.notation)?;
        let seed = args.seed.unwrap_or_else(clock_seed);
        let mut tray = DiceTray::new(settings, seed)?;
        let rng_state = tray.roll_with_seed(&counts, seed)?;
        let report = tray.run_until_settled(args.max_seconds);
        if !report.all_settled {
            log::warn!(
                "{} dice still moving after {:.1}s",
                report.luck.pending,
                tray.sim_time()
            );
        }

        if args.json {
            let summary = RollSummary {
                notation: tray.request().to_notation(),
                seed: rng_state.seed,
                settled: report.all_settled,
                sim_seconds: tray.sim_time(),
                results: &report.results,
                luck: &report.luck,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&tray, rng_state.seed, &report.luck);
        }
        Ok(())
    }

    fn print_summary(tray: &DiceTray, seed: u64, luck: &LuckReport) {
        println!("Roll {} (seed {seed})", tray.request());
        for kind in DieType::ALL {
            let values: Vec<String> = tray
                .results()
                .iter()
                .flatten()
                .filter(|o| o.kind == kind)
                .map(|o| o.value.to_string())
                .collect();
            if !values.is_empty() {
                println!("  {kind:>3}: {}", values.join(" "));
            }
        }
        if luck.pending > 0 {
            println!("  ({} still moving)", luck.pending);
        }
        if luck.modifier != 0 {
            println!("Total: {} ({:+})", luck.final_total, luck.modifier);
        } else {
            println!("Total: {}", luck.total);
        }
        if let Some(beats) = luck.beats {
            println!("Luckier than {beats:.2}% of rolls");
        }
        if luck.d20_total > 0 {
            println!("d20 total: {}", luck.d20_total);
        }
        if let Some(beats) = luck.d20_beats {
            println!("d20 luckier than {beats:.2}% of rolls");
        }
    }

    fn export_atlases(dir: &Path) -> Result<(), DiceError> {
        std::fs::create_dir_all(dir)?;
        for kind in DieType::ALL {
            let path = dir.join(format!("{kind}_atlas.png"));
            kind.label_atlas().save(&path)?;
            log::info!("Wrote {}", path.display());
        }
        println!("Wrote {} atlases to {}", DieType::ALL.len(), dir.display());
        Ok(())
    }

    fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is polydice::wasm::wasm_start
}
