use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use roster_tools::annotation::{self, CellEdit, NoteUpdate};
use roster_tools::blacklist;
use roster_tools::confirm::{AlwaysConfirm, Confirm};
use roster_tools::io::excel_read::read_workbook;
use roster_tools::io::excel_write::write_workbook;
use roster_tools::io::{TableStore, Workbook};
use roster_tools::layout::RosterLayout;
use roster_tools::model::{BlacklistHit, CellRef, RecordId, TableRange};
use roster_tools::norm;
use roster_tools::sync::{self, DeleteOutcome};
use roster_tools::{Result, RosterError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_tracing(cli.verbose).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| RosterError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let layout = match &cli.layout {
        Some(path) => RosterLayout::load(path)?,
        None => RosterLayout::default(),
    };

    match cli.command {
        Command::Delete(args) => execute_delete(args, &layout),
        Command::Blacklist(args) => execute_blacklist(args, &layout),
        Command::SetStatus(args) => execute_set_status(args, &layout),
        Command::ConvertTime(args) => execute_convert_time(args, &layout),
        Command::ClearNorm(args) => execute_clear_norm(args, &layout),
        Command::Layout => {
            println!("{}", layout.to_json()?);
            Ok(())
        }
    }
}

/// What a `delete` invocation points at.
#[derive(Debug, PartialEq)]
enum DeleteTarget {
    Id(RecordId),
    Selection(CellRef),
}

fn delete_target(args: &DeleteArgs, layout: &RosterLayout) -> Result<DeleteTarget> {
    match (&args.id, &args.cell) {
        (Some(id), _) => Ok(DeleteTarget::Id(RecordId::parse(id.as_str())?)),
        (None, Some(cell)) => Ok(DeleteTarget::Selection(resolve_cell(
            cell,
            args.sheet.as_deref(),
            &layout.schedule.range.sheet,
        )?)),
        (None, None) => Err(RosterError::PreconditionViolation(
            "pass either --id or --cell".into(),
        )),
    }
}

fn execute_delete(args: DeleteArgs, layout: &RosterLayout) -> Result<()> {
    let target = delete_target(&args, layout)?;
    let mut workbook = read_workbook(&args.target.workbook)?;
    let mut confirm = confirmer(args.yes);

    let outcome = match &target {
        DeleteTarget::Id(id) => {
            sync::delete_record_by_id(&mut workbook, layout, id, confirm.as_mut())?
        }
        DeleteTarget::Selection(selection) => {
            sync::delete_selected_record(&mut workbook, layout, selection, confirm.as_mut())?
        }
    };

    match outcome {
        DeleteOutcome::Deleted { id, offset } => {
            save(&args.target, &workbook)?;
            println!("deleted support {id} (row {})", offset + 1);
        }
        DeleteOutcome::Declined => println!("deletion cancelled"),
    }
    Ok(())
}

fn execute_blacklist(args: BlacklistArgs, layout: &RosterLayout) -> Result<()> {
    let workbook = read_workbook(&args.workbook)?;
    let id = RecordId::parse(args.id)?;
    let hits = blacklist::check_blacklists(&workbook, layout, &id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        print!("{}", render_hits(&hits));
    }
    Ok(())
}

fn render_hits(hits: &[BlacklistHit]) -> String {
    let lines: Vec<String> = hits
        .iter()
        .filter_map(|hit| {
            hit.position.map(|position| {
                format!(
                    "ID found in blacklist \"{}\" at row {position}\n",
                    hit.name
                )
            })
        })
        .collect();

    if lines.is_empty() {
        "ID not found in any blacklist\n".to_string()
    } else {
        lines.concat()
    }
}

fn execute_set_status(args: SetStatusArgs, layout: &RosterLayout) -> Result<()> {
    let mut workbook = read_workbook(&args.target.workbook)?;
    let cell = resolve_cell(&args.cell, args.sheet.as_deref(), &layout.status.range.sheet)?;

    let (edit, update) = apply_status_edit(&mut workbook, layout, cell, args.value)?;
    save(&args.target, &workbook)?;

    match update {
        Some(NoteUpdate::Set(text)) => println!("{}: {text}", edit.cell),
        Some(NoteUpdate::Clear) => println!("{}: note cleared", edit.cell),
        None => println!("{}: updated", edit.cell),
    }
    Ok(())
}

/// Writes the new value, then lets the annotation rule react to the edit.
fn apply_status_edit(
    workbook: &mut Workbook,
    layout: &RosterLayout,
    cell: CellRef,
    value: String,
) -> Result<(CellEdit, Option<NoteUpdate>)> {
    let old_value = workbook.read_cell(&cell)?;
    workbook.write_cell(&cell, &value)?;
    let edit = CellEdit {
        cell,
        old_value: Some(old_value),
        new_value: value,
    };

    let update = annotation::on_status_cell_changed(&edit, &layout.status, workbook)?;
    Ok((edit, update))
}

fn execute_convert_time(args: ConvertTimeArgs, layout: &RosterLayout) -> Result<()> {
    let mut workbook = read_workbook(&args.target.workbook)?;
    let range = if args.range.contains('!') {
        TableRange::parse(&args.range)?
    } else {
        TableRange::parse_on(layout.norm.sheet.clone(), &args.range)?
    };

    let converted = norm::convert_time_range(&mut workbook, layout, &range)?;
    save(&args.target, &workbook)?;
    println!("converted {converted} cells in {range}");
    Ok(())
}

fn execute_clear_norm(args: ClearNormArgs, layout: &RosterLayout) -> Result<()> {
    let mut workbook = read_workbook(&args.target.workbook)?;
    let mut confirm = confirmer(args.yes);

    if norm::clear_norm(&mut workbook, layout, confirm.as_mut())? {
        save(&args.target, &workbook)?;
        println!("norm cleared");
    } else {
        println!("clearing cancelled");
    }
    Ok(())
}

fn resolve_cell(cell: &str, sheet: Option<&str>, default_sheet: &str) -> Result<CellRef> {
    if cell.contains('!') {
        CellRef::parse(cell)
    } else {
        CellRef::parse_on(sheet.unwrap_or(default_sheet), cell)
    }
}

fn save(target: &WorkbookTarget, workbook: &Workbook) -> Result<()> {
    write_workbook(target.output_path(), workbook)
}

fn confirmer(assume_yes: bool) -> Box<dyn Confirm> {
    if assume_yes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(prompt_stdin)
    }
}

fn prompt_stdin(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    if io::stderr().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Maintain the support roster workbook: delete agents, check blacklists, stamp reprimands."
)]
struct Cli {
    /// Optional JSON layout overriding the built-in workbook ranges.
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Remove a support agent from the schedule, norm, and event tables.
    Delete(DeleteArgs),
    /// Check an identifier against the blacklists.
    Blacklist(BlacklistArgs),
    /// Set a status cell and update its reprimand note.
    SetStatus(SetStatusArgs),
    /// Convert "H M" time strings on the norm sheet to decimal hours.
    ConvertTime(ConvertTimeArgs),
    /// Clear the hours recorded on the norm sheet.
    ClearNorm(ClearNormArgs),
    /// Print the active layout as JSON.
    Layout,
}

#[derive(clap::Args)]
struct WorkbookTarget {
    /// Workbook to edit.
    #[arg(long)]
    workbook: PathBuf,

    /// Where to save the edited workbook. Defaults to overwriting the input.
    #[arg(long)]
    output: Option<PathBuf>,
}

impl WorkbookTarget {
    fn output_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.workbook)
    }
}

#[derive(clap::Args)]
struct DeleteArgs {
    #[command(flatten)]
    target: WorkbookTarget,

    /// Identifier of the agent to delete.
    #[arg(long, conflicts_with = "cell")]
    id: Option<String>,

    /// Selected identifier cell, e.g. P7 or Список!P7.
    #[arg(long)]
    cell: Option<String>,

    /// Sheet of the selected cell when --cell has no sheet prefix.
    #[arg(long, requires = "cell")]
    sheet: Option<String>,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}

#[derive(clap::Args)]
struct BlacklistArgs {
    /// Workbook to read.
    #[arg(long)]
    workbook: PathBuf,

    /// Identifier to look up.
    #[arg(long)]
    id: String,

    /// Print the results as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct SetStatusArgs {
    #[command(flatten)]
    target: WorkbookTarget,

    /// Edited cell, e.g. T7 or Список!T7.
    #[arg(long)]
    cell: String,

    /// Sheet of the edited cell when --cell has no sheet prefix.
    #[arg(long)]
    sheet: Option<String>,

    /// New cell value, e.g. 1/3.
    #[arg(long)]
    value: String,
}

#[derive(clap::Args)]
struct ConvertTimeArgs {
    #[command(flatten)]
    target: WorkbookTarget,

    /// Range to convert, e.g. E24:K73 or Норма!E24:K73.
    #[arg(long)]
    range: String,
}

#[derive(clap::Args)]
struct ClearNormArgs {
    #[command(flatten)]
    target: WorkbookTarget,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}
