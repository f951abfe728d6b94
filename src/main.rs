use clap::Parser;
use log::*;

use set_version::{Args, run};

fn initialize_logger(debug: bool) -> set_version::Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("set_version")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli_args = Args::parse();

    initialize_logger(cli_args.debug)?;

    let summary = run(&cli_args)?;

    for path in summary.rewritten.iter() {
        debug!("rewrote {}", path.display());
    }

    info!("{summary}");

    Ok(())
}
