use std::io::{self, BufWriter, Write};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

const PROGRAM: &str = include_str!("../programs/main.horn");

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    horn::run(PROGRAM, &mut out)?;
    out.flush()?;

    Ok(())
}
