mod cli;

use clap::Parser;

use cli::Cli;

fn main() -> anyhow::Result<()> {
    cli::init_logging();

    let cli = Cli::parse();
    let output = cli.run()?;
    println!("{output}");
    Ok(())
}
