use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_pdf::inspect as inspect_pdf;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// PDF file to inspect
    pub input: PathBuf,

    /// Print page geometry as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let path = PathBuf::from(cwd).join(&args.input);
    let bytes = fs::read(&path).with_context(|| format!("Cannot read {}", path.display()))?;
    let pages = inspect_pdf(&bytes).with_context(|| format!("Cannot parse {}", path.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    println!(
        "{} {} ({} pages)",
        "📄".bright_blue(),
        args.input.display().to_string().bold(),
        pages.len()
    );

    for page in &pages {
        let rotation = if page.rotation.degrees() == 0 {
            format!("{}°", page.rotation.degrees()).dimmed()
        } else {
            format!("{}°", page.rotation.degrees()).yellow()
        };
        println!(
            "  {:>4}  {:>7.1} x {:<7.1} pt  {}",
            page.index, page.width, page.height, rotation
        );
    }

    Ok(())
}
