// CLI application
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rescue_effects_cli::commands::{init_config, simulate, write_catalog, Seed, SimulateOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rrt-effects")]
#[command(about = "Crowd-interaction effect pack for Red Rescue Team")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print the effect catalog the host renders
    Catalog {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a config file with default values
    InitConfig {
        /// Destination path
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Run effect codes against simulated game memory
    Simulate {
        /// Effect codes, e.g. givemoney_250 leader_second
        codes: Vec<String>,

        /// Script with one `[viewer] code` or `wait <seconds>` per line
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Pack config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Viewer name for codes without one
        #[arg(long, default_value = "viewer")]
        viewer: String,

        #[arg(long, default_value_t = 1)]
        floor: u8,

        #[arg(long, default_value_t = 0)]
        money: u32,

        #[arg(long, default_value_t = 20)]
        hp: u8,

        #[arg(long, default_value_t = 20)]
        max_hp: u32,

        /// Readiness status byte; 0x80 and above means busy
        #[arg(long, default_value_t = 0)]
        status: u8,

        /// Start with the player unable to act (level-up will time out)
        #[arg(long)]
        busy_turn: bool,

        /// Seconds to advance after the last step
        #[arg(long, default_value_t = 0)]
        settle: u64,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog { pretty, output } => {
            write_catalog(output.as_deref(), pretty)?;
        }
        Commands::InitConfig { path, force } => {
            init_config(&path, force)?;
        }
        Commands::Simulate {
            codes,
            script,
            config,
            viewer,
            floor,
            money,
            hp,
            max_hp,
            status,
            busy_turn,
            settle,
        } => {
            let options = SimulateOptions {
                config,
                seed: Seed {
                    floor,
                    money,
                    current_hp: hp,
                    max_hp,
                    status,
                    can_go: !busy_turn,
                },
                viewer,
                codes,
                script,
                settle_secs: settle,
            };
            let steps = options.steps()?;
            let pb = create_progress_bar(steps.len() as u64);
            let report = simulate(&options, &steps, &pb)?;
            pb.finish_with_message("Simulation complete");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}
