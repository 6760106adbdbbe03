use clap::Parser;
use device_emulator::{
    init_logger, load_config, parse_level, resolve_config_path, DeviceEmulator, EmulatorError,
};
use log::{error, info, LevelFilter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "tractor_device")]
#[command(version)]
#[command(about = "Emulates a tractor's sensors over zenoh")]
#[command(long_about = None)]
struct Args {
    /// Configuration file, relative to the config directory
    #[arg(
        short = 'c',
        long = "config-file",
        visible_aliases = ["cf", "CF"],
        default_value = "default.json"
    )]
    config_file: String,

    /// Directory relative config files are looked up in
    #[arg(long, value_name = "DIR", default_value = "config")]
    config_dir: PathBuf,

    /// error, warn, info, debug or trace
    #[arg(
        short,
        long,
        short_alias = 'L',
        visible_aliases = ["L", "l"],
        default_value = "info"
    )]
    log_level: String,

    /// Shorthand for --log-level debug
    #[arg(short, long, short_alias = 'D', visible_aliases = ["D", "d"])]
    debug: bool,
}

impl Args {
    fn level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else {
            parse_level(&self.log_level)
        }
    }
}

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_logger(args.level());

    if let Err(e) = run(&args).await {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: &Args) -> Result<(), EmulatorError> {
    let path = resolve_config_path(&args.config_dir, &args.config_file);
    info!("Loading configuration from {}", path.display());
    let config = load_config(&path)?;

    let emulator = Arc::new(DeviceEmulator::launch(&config).await?);
    let cancel = CancellationToken::new();

    let runner = {
        let emulator = emulator.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { emulator.run(cancel).await })
    };

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down...");
    cancel.cancel();

    match runner.await {
        Ok(result) => result?,
        Err(e) => error!("Dispatcher task failed: {}", e),
    }
    emulator.shutdown().await;
    Ok(())
}
