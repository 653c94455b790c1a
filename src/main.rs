use anyhow::Result;
use argentum::cli::Cli;
use clap::Parser;

fn main() -> Result<()> {
    let cli = Cli::parse();
    argentum::observability::init(cli.verbose);
    cli.run()
}
