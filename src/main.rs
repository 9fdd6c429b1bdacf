use std::path::PathBuf;

use orrery::{config::AppConfig, flow};

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::discover(path.as_deref())?;
    flow::run(config)
}
