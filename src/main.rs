use anyhow::Result;
use clap::Parser;
use env_logger::Env;

fn main() -> Result<()> {
    let cfg = rose_bloom::config::Config::parse();

    let default_level = match cfg.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    if cfg.list_devices {
        rose_bloom::source::list_input_devices()?;
        return Ok(());
    }

    rose_bloom::app::run(cfg)
}
