use crate::config::Config;
use crate::save::FileSaveTarget;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::{
    Direction, EditOutcome, Editor, PageId, PageMutation, SaveCompletion, SaveOutcome, SaveTarget,
};
use folio_pdf::{LopdfBackend, LopdfRenderer};
use std::fs;
use std::path::PathBuf;

/// Page numbers are 0-based source indices, as printed by `folio inspect`.
///
/// Edits are applied in this order: script, rotations, deletions, moves,
/// reorders.
#[derive(Debug, Args)]
pub struct EditArgs {
    /// PDF file to edit (never modified)
    pub input: PathBuf,

    /// Rotate a page a quarter turn clockwise (repeat to turn further)
    #[arg(long, value_name = "PAGE")]
    pub rotate: Vec<u32>,

    /// Toggle deletion of a page
    #[arg(long, value_name = "PAGE")]
    pub delete: Vec<u32>,

    /// Swap the page at a display position with a neighbour, e.g. `2:backward`
    #[arg(long = "move", value_name = "INDEX:DIRECTION", value_parser = parse_move)]
    pub moves: Vec<(usize, Direction)>,

    /// Drop one page onto another, e.g. `3:0`
    #[arg(long, value_name = "SOURCE:TARGET", value_parser = parse_reorder)]
    pub reorder: Vec<(u32, u32)>,

    /// JSON file with an array of mutations
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Output file (overrides config and the suggested name)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Replace an existing output file
    #[arg(long)]
    pub overwrite: bool,
}

fn parse_move(value: &str) -> Result<(usize, Direction), String> {
    let (index, direction) = value
        .split_once(':')
        .ok_or_else(|| format!("expected INDEX:DIRECTION, got '{}'", value))?;
    let index = index
        .trim()
        .parse()
        .map_err(|e| format!("invalid index '{}': {}", index, e))?;
    let direction = match direction.trim() {
        "backward" | "back" | "-" => Direction::Backward,
        "forward" | "fwd" | "+" => Direction::Forward,
        other => return Err(format!("unknown direction '{}'", other)),
    };
    Ok((index, direction))
}

fn parse_reorder(value: &str) -> Result<(u32, u32), String> {
    let (source, target) = value
        .split_once(':')
        .ok_or_else(|| format!("expected SOURCE:TARGET, got '{}'", value))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid page '{}': {}", s, e))
    };
    Ok((parse(source)?, parse(target)?))
}

/// Mutations in application order
fn collect_mutations(args: &EditArgs, script: Option<&str>) -> Result<Vec<PageMutation>> {
    let mut mutations: Vec<PageMutation> = match script {
        Some(json) => serde_json::from_str(json).context("Invalid mutation script")?,
        None => Vec::new(),
    };

    mutations.extend(args.rotate.iter().map(|&page| PageMutation::Rotate {
        page: PageId::from(page),
    }));
    mutations.extend(args.delete.iter().map(|&page| PageMutation::ToggleDeleted {
        page: PageId::from(page),
    }));
    mutations.extend(
        args.moves
            .iter()
            .map(|&(index, direction)| PageMutation::Move { index, direction }),
    );
    mutations.extend(args.reorder.iter().map(|&(source, target)| PageMutation::Reorder {
        source: PageId::from(source),
        target: PageId::from(target),
        side: None,
    }));

    Ok(mutations)
}

pub async fn edit(args: EditArgs, cwd: &str, config: &Config) -> Result<()> {
    let input = PathBuf::from(cwd).join(&args.input);
    let bytes = fs::read(&input).with_context(|| format!("Cannot read {}", input.display()))?;
    let script = match &args.script {
        Some(path) => Some(
            fs::read_to_string(PathBuf::from(cwd).join(path))
                .with_context(|| format!("Cannot read script {}", path.display()))?,
        ),
        None => None,
    };
    let mutations = collect_mutations(&args, script.as_deref())?;

    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Not a file: {}", input.display()))?;

    println!("{} {}", "✏️  Editing".bright_blue().bold(), args.input.display());

    let mut editor = Editor::new(config.editor.clone());
    let session = editor.load(&LopdfRenderer::default(), name, bytes)?;
    println!("  Loaded {} pages", session.pages().len());

    for mutation in mutations {
        let result = session
            .apply(mutation)
            .with_context(|| format!("Cannot apply {}", mutation.name()))?;
        match result.outcome {
            EditOutcome::Applied => println!("  {} {}", "✓".green(), describe(&mutation)),
            EditOutcome::Ignored => println!(
                "  {} {} {}",
                "–".yellow(),
                describe(&mutation),
                "(no change)".dimmed()
            ),
        }
    }
    let kept = session.pages().kept_count();

    // Reconstruction runs off the async runtime; the session stays locked
    let ticket = editor.begin_save()?;
    let job = ticket.clone();
    let result = tokio::task::spawn_blocking(move || job.run(&LopdfBackend::new()))
        .await
        .context("Save task panicked")?;

    let document = match editor.finish_save(ticket.token, result) {
        SaveCompletion::Completed(document) => document,
        SaveCompletion::Failed(e) => return Err(e.into()),
        SaveCompletion::Stale { token } => return Err(anyhow!("Session {} was discarded", token)),
    };

    let mut target = FileSaveTarget {
        dir: config.get_out_dir(cwd, &input),
        output: args.output.as_ref().map(|o| PathBuf::from(cwd).join(o)),
        overwrite: args.overwrite || config.overwrite,
    };
    match target.save(&document.bytes, &document.suggested_name)? {
        SaveOutcome::Persisted(path) => {
            println!();
            println!(
                "{} Wrote {} pages to {}",
                "✅".green(),
                kept,
                path.display().to_string().bold()
            );
        }
        SaveOutcome::Cancelled => println!("{}", "Save cancelled".yellow()),
    }

    Ok(())
}

fn describe(mutation: &PageMutation) -> String {
    match mutation {
        PageMutation::Rotate { page } => format!("rotate {}", page),
        PageMutation::ToggleDeleted { page } => format!("toggle delete {}", page),
        PageMutation::Move { index, direction } => {
            format!("move position {} {:?}", index, direction).to_lowercase()
        }
        PageMutation::Reorder { source, target, .. } => format!("drop {} on {}", source, target),
    }
}
