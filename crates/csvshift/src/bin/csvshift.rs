use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use csvshift::{
    Artifact, ConversionOptions, ConvertError, Converter, Delimiter, JsonShape, Orientation,
    PREVIEW_ROWS, PageSize, RawInput, TargetFormat,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "csvshift",
    version,
    about = "Convert CSV files to Excel, JSON or PDF, and recover CSV from text PDFs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a CSV file into xlsx, json or pdf.
    Convert(ConvertArgs),
    /// Recover table rows from a text PDF and write them as CSV.
    Extract(ExtractArgs),
    /// Print the first rows of a CSV or PDF as parsed.
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input CSV path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path; the format is taken from its extension unless --format is given.
    #[arg(short, long)]
    output: PathBuf,

    /// Output format: xlsx, json or pdf.
    #[arg(long)]
    format: Option<String>,

    /// Treat every row as data instead of using the first row as a header.
    #[arg(long)]
    no_header: bool,

    /// Field delimiter (comma, semicolon, tab). Detected when omitted.
    #[arg(long)]
    delimiter: Option<String>,

    /// JSON shape: objects or arrays.
    #[arg(long, default_value = "objects")]
    shape: String,

    /// Emit compact JSON without indentation.
    #[arg(long)]
    compact: bool,

    /// PDF page size: a4 or letter.
    #[arg(long, default_value = "a4")]
    page_size: String,

    /// PDF orientation: portrait or landscape. Tables wider than four columns are always landscape.
    #[arg(long, default_value = "portrait")]
    orientation: String,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output CSV path.
    #[arg(short, long)]
    output: PathBuf,

    /// Output delimiter (comma, semicolon, tab).
    #[arg(long, default_value = "comma")]
    delimiter: String,
}

#[derive(Debug, Args)]
struct PreviewArgs {
    /// Input CSV or PDF path.
    #[arg(short, long)]
    input: PathBuf,
}

fn read_input(path: &Path) -> Result<RawInput> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("input path '{}' has no file name", path.display()))?;
    Ok(RawInput::new(file_name, bytes))
}

fn parse_delimiter(value: &str) -> Result<Delimiter> {
    Delimiter::from_str(value).map_err(|error| anyhow!(error))
}

fn parse_options(args: &ConvertArgs) -> Result<ConversionOptions> {
    let delimiter = args
        .delimiter
        .as_deref()
        .map(parse_delimiter)
        .transpose()
        .context("failed to parse --delimiter")?;
    let json_shape = JsonShape::from_str(&args.shape)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --shape")?;
    let page_size = PageSize::from_str(&args.page_size)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --page-size")?;
    let orientation = Orientation::from_str(&args.orientation)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --orientation")?;

    Ok(ConversionOptions {
        has_header: !args.no_header,
        delimiter,
        json_shape,
        pretty: !args.compact,
        page_size,
        orientation,
        ..ConversionOptions::default()
    })
}

fn target_format(args: &ConvertArgs) -> Result<TargetFormat> {
    let name = match &args.format {
        Some(format) => format.clone(),
        None => args
            .output
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("cannot infer output format; pass --format"))?,
    };
    TargetFormat::from_str(&name).map_err(|error| anyhow!(error))
}

fn write_artifact(path: &Path, artifact: &Artifact) -> Result<()> {
    std::fs::write(path, &artifact.bytes)
        .with_context(|| format!("failed to write '{}'", path.display()))
}

/// Returns the number of data rows written.
fn run_convert(args: &ConvertArgs) -> Result<usize> {
    let options = parse_options(args)?;
    let format = target_format(args)?;
    let raw = read_input(&args.input)?;

    let mut converter = Converter::new(options);
    converter
        .load(&raw)
        .with_context(|| format!("failed to parse '{}'", args.input.display()))?;
    let artifact = converter
        .convert(format)
        .with_context(|| format!("failed to convert '{}' to {format}", args.input.display()))?;
    write_artifact(&args.output, &artifact)?;

    let data_rows = converter
        .table()
        .map_or(0, |table| table.data_rows(converter.options().has_header).len());
    Ok(data_rows)
}

fn run_extract(args: &ExtractArgs) -> Result<usize> {
    let delimiter = parse_delimiter(&args.delimiter).context("failed to parse --delimiter")?;
    let raw = read_input(&args.input)?;
    if !raw.has_extension("pdf") {
        return Err(ConvertError::UnsupportedExtension { expected: ".pdf" })
            .with_context(|| format!("cannot extract rows from '{}'", args.input.display()));
    }
    let options = ConversionOptions {
        delimiter: Some(delimiter),
        ..ConversionOptions::default()
    };

    let mut converter = Converter::new(options);
    let row_count = converter
        .load(&raw)
        .with_context(|| format!("failed to extract rows from '{}'", args.input.display()))?
        .row_count();
    let artifact = converter.convert(TargetFormat::Csv)?;
    write_artifact(&args.output, &artifact)?;
    Ok(row_count)
}

fn run_preview(args: &PreviewArgs) -> Result<usize> {
    let raw = read_input(&args.input)?;
    let mut converter = Converter::new(ConversionOptions::default());
    let table = converter
        .load(&raw)
        .with_context(|| format!("failed to parse '{}'", args.input.display()))?;

    if let Some(delimiter) = table.delimiter {
        println!("delimiter: {delimiter}");
    }
    println!("rows: {}", table.row_count());
    for row in table.preview(PREVIEW_ROWS) {
        println!("{}", row.join(" | "));
    }
    Ok(table.row_count())
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("csvshift=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    let outcome = match &cli.command {
        Commands::Convert(args) => run_convert(args),
        Commands::Extract(args) => run_extract(args),
        Commands::Preview(args) => run_preview(args),
    };

    match outcome {
        Ok(rows) if rows > 0 => ExitCode::SUCCESS,
        Ok(_) => {
            eprintln!("warning: no data rows were produced");
            ExitCode::from(2)
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(1)
        }
    }
}
