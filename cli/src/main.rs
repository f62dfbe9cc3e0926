//! Operator command line for the document composition stack.
//!
//! Three commands, one per output path: `sign` applies positioned signature
//! text to an existing PDF, `compose` stamps a template plus bound data
//! onto PDF pages, `validate` checks that a template file round-trips
//! through the model.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use compositor::{
    apply_instructions, apply_template, load_pdf, save_pdf, SignatureInstruction, TemplateData,
};
use editor::model::Template;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("either --instructions or --text must be given")]
    MissingOverlayText,
    #[error("invalid page list `{0}`; expected comma-separated indices like `0,2`")]
    InvalidPages(String),
    #[error("template does not round-trip: re-parsed model differs")]
    RoundTripMismatch,
    #[error("composition failed: {0}")]
    Compose(#[from] compositor::ComposeError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "doc-cli", about = "Template composition and signature overlay CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply signature text overlays to a PDF.
    Sign(SignArgs),
    /// Stamp a template plus bound data onto PDF pages.
    Compose(ComposeArgs),
    /// Check that a template file parses and round-trips.
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
struct SignArgs {
    /// Base PDF to sign.
    #[arg(long)]
    input: PathBuf,

    /// Where to write the signed PDF.
    #[arg(long)]
    output: PathBuf,

    /// JSON file holding an instruction batch. Mutually exclusive with
    /// --text.
    #[arg(long, conflicts_with = "text")]
    instructions: Option<PathBuf>,

    /// Signer text for a single overlay.
    #[arg(long)]
    text: Option<String>,

    /// Horizontal position in PDF points, from the left edge.
    #[arg(long, default_value_t = 40.0)]
    x: f64,

    /// Vertical position in PDF points, from the bottom edge.
    #[arg(long, default_value_t = 60.0)]
    y: f64,

    /// Zero-based page index.
    #[arg(long, default_value_t = 0)]
    page: u32,

    #[arg(long, default_value_t = 12.0)]
    font_size: f64,

    /// Text color as #RRGGBB.
    #[arg(long, default_value = "#000000")]
    color: String,

    /// Append signing date and time to the text.
    #[arg(long)]
    timestamp: bool,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Template JSON file (editor export format).
    #[arg(long)]
    template: PathBuf,

    /// Bound values and table rows as JSON. Defaults to an empty binding.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Base PDF to stamp.
    #[arg(long)]
    input: PathBuf,

    /// Where to write the composed PDF.
    #[arg(long)]
    output: PathBuf,

    /// Comma-separated zero-based page indices to stamp.
    #[arg(long, default_value = "0")]
    pages: String,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Template JSON file to check.
    #[arg(long)]
    template: PathBuf,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Sign(args) => run_sign(args),
        Command::Compose(args) => run_compose(args),
        Command::Validate(args) => run_validate(args),
    }
}

fn run_sign(args: SignArgs) -> Result<(), CliError> {
    let batch: Vec<SignatureInstruction> = if let Some(path) = &args.instructions {
        serde_json::from_str(&fs::read_to_string(path)?)?
    } else {
        let text = args.text.clone().ok_or(CliError::MissingOverlayText)?;
        vec![SignatureInstruction {
            signer_text: text,
            x: args.x,
            y: args.y,
            page_index: args.page,
            font_size: args.font_size,
            color: args.color.clone(),
            include_timestamp: args.timestamp,
        }]
    };

    let mut doc = load_pdf(&args.input)?;
    apply_instructions(&mut doc, &batch)?;
    save_pdf(&mut doc, &args.output)?;
    eprintln!(
        "applied {} overlay(s) to {}",
        batch.len(),
        args.output.display()
    );
    Ok(())
}

fn run_compose(args: ComposeArgs) -> Result<(), CliError> {
    let template: Template = serde_json::from_str(&fs::read_to_string(&args.template)?)?;
    let data: TemplateData = match &args.data {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => TemplateData::default(),
    };
    let pages = parse_pages(&args.pages)?;

    let mut doc = load_pdf(&args.input)?;
    apply_template(&mut doc, &template, &data, &pages)?;
    save_pdf(&mut doc, &args.output)?;
    eprintln!(
        "composed {} page(s) into {}",
        pages.len(),
        args.output.display()
    );
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    let source = fs::read_to_string(&args.template)?;
    let template: Template = serde_json::from_str(&source)?;
    let reserialized = serde_json::to_string(&template)?;
    let reparsed: Template = serde_json::from_str(&reserialized)?;
    if reparsed != template {
        return Err(CliError::RoundTripMismatch);
    }

    println!("template ok: {}", args.template.display());
    println!("  title:            {}", template.title.is_some());
    println!("  fields:           {}", template.fields.len());
    println!("  images:           {}", template.images.len());
    println!("  table enabled:    {}", template.table.enabled);
    println!("  signature fields: {}", template.signature.fields.len());
    Ok(())
}

fn parse_pages(spec: &str) -> Result<Vec<u32>, CliError> {
    spec.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .map_err(|_| CliError::InvalidPages(spec.to_owned()))
        })
        .collect()
}
