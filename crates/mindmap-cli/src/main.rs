use anyhow::Result;
use clap::Parser;
use mindmap_cli::{Args, run};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    let stdout = std::io::stdout();
    run(args, &mut stdout.lock())
}
