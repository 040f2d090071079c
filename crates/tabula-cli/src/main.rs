//! tab - spreadsheet conversion tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tabula::format::Locale;
use tabula::prelude::*;
use tabula::{open_workbook, save_workbook};

#[derive(Parser)]
#[command(name = "tab")]
#[command(author, version, about = "Spreadsheet conversion tool (XLSX, CSV, HTML export)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a spreadsheet; formats are chosen by file extension
    Convert {
        input: PathBuf,

        output: PathBuf,

        #[command(flatten)]
        io: IoArgs,
    },

    /// Show information about a spreadsheet
    Info {
        input: PathBuf,

        #[command(flatten)]
        io: IoArgs,
    },

    /// Print the cells of one sheet, tab separated
    Cat {
        input: PathBuf,

        /// Sheet index (0-based, default: the current sheet)
        #[arg(short, long)]
        sheet: Option<usize>,

        #[command(flatten)]
        io: IoArgs,
    },
}

#[derive(clap::Args)]
struct IoArgs {
    /// Locale for numbers and dates, e.g. en_US or de-DE
    #[arg(short, long, default_value = "en_US")]
    locale: Locale,

    /// CSV field delimiter (default: depends on the locale)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// CSV text qualifier
    #[arg(long, default_value = "\"")]
    quote: char,

    /// CSV character set
    #[arg(long, default_value = "UTF-8")]
    charset: String,

    /// How CSV dates are written and recognized
    #[arg(long, value_enum, default_value = "locale-short")]
    date_format: DateFormatArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum DateFormatArg {
    LocaleShort,
    LocaleLong,
    Iso,
}

impl IoArgs {
    fn options(&self) -> IoOptions {
        let mut options = IoOptions::default()
            .with_locale(self.locale)
            .with_text_qualifier(self.quote)
            .with_charset(self.charset.as_str())
            .with_date_format(match self.date_format {
                DateFormatArg::LocaleShort => DateFormatStyle::LocaleShort,
                DateFormatArg::LocaleLong => DateFormatStyle::LocaleLong,
                DateFormatArg::Iso => DateFormatStyle::Iso,
            });
        if let Some(delimiter) = self.delimiter {
            options = options.with_delimiter(delimiter);
        }
        options
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert { input, output, io } => convert(&input, &output, &io.options()),
        Commands::Info { input, io } => show_info(&input, &io.options()),
        Commands::Cat { input, sheet, io } => cat(&input, sheet, &io.options()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tab: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn open(input: &Path, registry: &FileTypeRegistry, options: &IoOptions) -> Result<Workbook> {
    open_workbook(registry, input, options, &mut Progress::none())
        .with_context(|| format!("Failed to open '{}'", input.display()))
}

fn convert(input: &Path, output: &Path, options: &IoOptions) -> Result<()> {
    let registry = FileTypeRegistry::with_defaults();
    if registry.for_path(output).is_none() {
        anyhow::bail!("Unsupported output format '{}'", output.display());
    }
    let workbook = open(input, &registry, options)?;
    save_workbook(&workbook, &registry, output, options, &mut Progress::none())
        .with_context(|| format!("Failed to write '{}'", output.display()))?;
    eprintln!(
        "Converted {} sheets to '{}'",
        workbook.sheet_count(),
        output.display()
    );
    Ok(())
}

fn show_info(input: &Path, options: &IoOptions) -> Result<()> {
    let registry = FileTypeRegistry::with_defaults();
    let workbook = open(input, &registry, options)?;
    let file_type = registry
        .for_path(input)
        .map_or("unknown", |t| t.description());

    println!("File: {}", input.display());
    println!("Type: {}", file_type);
    println!("Sheets: {}", workbook.sheet_count());
    println!("Styles: {}", workbook.cell_style_names().len());

    for (i, sheet) in workbook.sheets().enumerate() {
        let marker = if workbook.current_sheet() == Some(i) { " (current)" } else { "" };
        println!();
        println!("  Sheet {}: \"{}\"{}", i, sheet.name(), marker);
        if sheet.is_empty() {
            println!("    Used range: empty");
        } else {
            println!(
                "    Used range: {} rows x {} columns",
                sheet.row_count(),
                sheet.column_count()
            );
        }
        println!("    Merged regions: {}", sheet.merged_regions().len());
        if sheet.split_row() > 0 || sheet.split_col() > 0 {
            println!(
                "    Frozen: {} rows, {} columns",
                sheet.split_row(),
                sheet.split_col()
            );
        }
    }

    Ok(())
}

fn cat(input: &Path, sheet: Option<usize>, options: &IoOptions) -> Result<()> {
    let registry = FileTypeRegistry::with_defaults();
    let workbook = open(input, &registry, options)?;
    let index = sheet.or(workbook.current_sheet()).unwrap_or(0);
    let sheet = workbook.sheet(index).with_context(|| {
        format!(
            "Sheet index {} not found ({} sheets)",
            index,
            workbook.sheet_count()
        )
    })?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for row in sheet.rows() {
        let line: Vec<String> = row
            .cells()
            .map(|c| c.to_display_string(workbook.styles(), options.locale))
            .collect();
        writeln!(out, "{}", line.join("\t")).context("Failed to write to stdout")?;
    }
    Ok(())
}
