mod config;
mod dsp;
mod error;
mod measurement;
mod render;
mod reports;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use log::debug;

use config::RenderConfig;
use render::{set_fontsizes, FontSizes};

fn main() -> Result<()> {
    env_logger::init();
    set_fontsizes(FontSizes::default());
    let config = RenderConfig::load()?;
    debug!("config: {config:?}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!();
        println!("Which setup do you want to generate results for?");
        println!("1: Setup 1");
        println!("2: Setup 2");
        println!("3: Setup 3");
        print!("Enter number (q to quit): ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let choice = line?;
        let saved = match choice.trim() {
            "1" => reports::setup1_results(&config)?,
            "2" => reports::setup2_results(&config)?,
            "3" => reports::setup3_results(&config)?,
            "q" | "quit" => break,
            _ => {
                println!("Please type 1, 2 or 3 for their respective setups.");
                continue;
            }
        };
        for path in &saved {
            println!("  wrote {}", path.display());
        }
    }
    Ok(())
}
