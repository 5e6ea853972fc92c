mod cli;

use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};

use cli::Cli;
use ninjagen::cli_utils::{ninjagen_prefix, summary_line};
use ninjagen::{logging, Generator};

fn main() -> Result<()> {
    // Initialize structured logging
    logging::init();

    let cli = Cli::parse();

    let generator = Generator::new(&cli.directory)
        .env_file(&cli.env_file)
        .template(&cli.template)
        .output(&cli.output)
        .max_depth(cli.max_depth);

    if cli.stdout {
        let rendered = generator.render()?;
        io::stdout().write_all(rendered.text.as_bytes())?;
        return Ok(());
    }

    let summary = generator.generate()?;
    eprintln!("{} {}", ninjagen_prefix(), summary_line(&summary));

    Ok(())
}
