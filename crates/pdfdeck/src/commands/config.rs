use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();
    println!(
        "  navigation.prev_policy  {}",
        config.prev_policy().name().cyan()
    );
    let start = config
        .start_slide()
        .map_or_else(|| "1".to_string(), |n| n.to_string());
    println!("  defaults.start_slide    {}", start.cyan());
    let surfaces = match config.surfaces() {
        pdfdeck::Surfaces::Single => "single",
        pdfdeck::Surfaces::Dual => "dual",
    };
    println!("  defaults.surfaces       {}", surfaces.cyan());
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} ({})",
        "Saved".green().bold(),
        path.display()
    );
    Ok(())
}
