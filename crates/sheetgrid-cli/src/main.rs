//! sheetgrid CLI - drive the grid editor from the command line

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sheetgrid::{
    column_index, column_name, CellAddress, CellPosition, CellRange, ColumnModel, GridEditor,
    GridOptions, GridWriter, RecalcMode,
};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetgrid")]
#[command(author, version, about = "Spreadsheet grid editor tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert between a 0-based column index and its letters
    Column {
        /// Column index (e.g. 27) or letters (e.g. AB)
        value: String,
    },

    /// Show how raw inputs are classified when committed
    Classify {
        /// Raw cell inputs
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Paste a TSV/CSV file into an empty grid and print the result as CSV
    Paste {
        /// Input text file
        input: PathBuf,

        /// Top-left cell of the paste
        #[arg(short, long, default_value = "A1")]
        at: String,

        /// Number of rows in the grid
        #[arg(short, long, default_value = "1000")]
        rows: u32,

        /// Number of columns in the grid
        #[arg(short, long, default_value = "26")]
        cols: u16,

        /// Re-evaluate dependent formulas as later cells land
        #[arg(long)]
        reactive: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Column { value } => convert_column(&value),
        Commands::Classify { values } => classify(&values),
        Commands::Paste {
            input,
            at,
            rows,
            cols,
            reactive,
        } => paste(&input, &at, rows, cols, reactive),
    }
}

fn convert_column(value: &str) -> Result<()> {
    match value.parse::<u32>() {
        Ok(index) => println!("{}", column_name(index)),
        Err(_) => {
            let index = column_index(value)
                .with_context(|| format!("'{}' is neither an index nor column letters", value))?;
            println!("{}", index);
        }
    }
    Ok(())
}

fn classify(values: &[String]) -> Result<()> {
    for raw in values {
        let mut editor = GridEditor::new(
            "classify",
            GridOptions::default(),
            ColumnModel::with_default_columns(1, 100.0),
        );
        if !editor.commit(0, 0, raw) {
            bail!("Failed to commit '{}'", raw);
        }
        let cell = editor.cell(0, 0);
        println!("{}\t{}", cell.data_type(), cell.display_value());
    }
    Ok(())
}

fn paste(input: &PathBuf, at: &str, rows: u32, cols: u16, reactive: bool) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;
    let anchor =
        CellAddress::parse(at).with_context(|| format!("Invalid paste anchor '{}'", at))?;

    let options = GridOptions {
        total_rows: rows,
        recalc: if reactive {
            RecalcMode::Reactive
        } else {
            RecalcMode::Snapshot
        },
        ..GridOptions::default()
    };
    let mut editor = GridEditor::new("cli", options, ColumnModel::with_default_columns(cols, 100.0));

    let written = editor
        .paste_at(CellPosition::new(anchor.row, anchor.col), &text)
        .with_context(|| format!("Failed to paste '{}'", input.display()))?;

    let Some(used) = editor.used_range() else {
        eprintln!("Nothing pasted into a {}x{} grid", rows, cols);
        return Ok(());
    };

    // Output is anchored at A1 so cell positions survive the round trip
    let grid = editor.display_grid(CellRange::from_indices(0, 0, used.end.row, used.end.col));
    let stdout = io::stdout();
    let mut out = stdout.lock();
    GridWriter::write(&grid, &mut out).context("Failed to write to stdout")?;
    out.flush().context("Failed to write to stdout")?;
    eprintln!("Pasted {} cells", written);

    Ok(())
}
