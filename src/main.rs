use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};

use metapixel::catalog::{self, MetaPixelType};
use metapixel::document::MetaPixelDocument;
use metapixel::error_codes::{find_metapixel_error, ErrorEnvelope};
use metapixel::hat_file::{open_hat, HatSession};
use metapixel::manifest::{load_manifest, HatManifest};
use metapixel::persistence::{LoadReport, SaveOptions};

#[derive(Debug, Parser)]
#[command(name = "metapixel")]
#[command(about = "Inspect and edit the metapixels stored in a 97x56 hat image")]
#[command(version = env!("METAPIXEL_LONG_VERSION"))]
struct Cli {
    /// Log decoding details to stderr.
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,
    /// Print machine-readable JSON instead of text.
    #[arg(long = "json", global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every metapixel type in the catalog.
    Types,
    /// Show the help text of one metapixel type.
    Describe {
        #[arg(value_name = "TYPE")]
        kind: String,
    },
    /// Show the metapixels stored in a hat.
    Show {
        hat: PathBuf,
    },
    /// Append a metapixel type to a hat.
    Add {
        #[command(flatten)]
        target: EditTarget,
        #[arg(value_name = "TYPE")]
        kind: String,
    },
    /// Remove a metapixel type from a hat.
    Remove {
        #[command(flatten)]
        target: EditTarget,
        #[arg(value_name = "TYPE")]
        kind: String,
    },
    /// Move a metapixel one row up, wrapping the first row to the end.
    Up {
        #[command(flatten)]
        target: EditTarget,
        #[arg(value_name = "TYPE")]
        kind: String,
    },
    /// Move a metapixel one row down, wrapping the last row to the front.
    Down {
        #[command(flatten)]
        target: EditTarget,
        #[arg(value_name = "TYPE")]
        kind: String,
    },
    /// Change the value or raw channels of a metapixel already in a hat.
    Set {
        #[command(flatten)]
        target: EditTarget,
        #[arg(value_name = "TYPE")]
        kind: String,
        #[arg(
            long = "value",
            num_args = 1..=2,
            allow_hyphen_values = true,
            conflicts_with = "colors",
            required_unless_present = "colors"
        )]
        value: Option<Vec<String>>,
        #[arg(long = "colors", num_args = 2, allow_hyphen_values = true)]
        colors: Option<Vec<String>>,
    },
    /// Replace a hat's metapixels with the ones declared in a YAML manifest.
    Apply {
        #[command(flatten)]
        target: EditTarget,
        manifest: PathBuf,
    },
    /// Print a hat's metapixels as a YAML manifest.
    Export {
        hat: PathBuf,
    },
}

#[derive(Debug, Args)]
struct EditTarget {
    hat: PathBuf,
    #[arg(short = 'o', long = "output", conflicts_with = "in_place")]
    output: Option<PathBuf>,
    /// Overwrite the input hat.
    #[arg(long = "in-place")]
    in_place: bool,
    /// Blank reserved rows past the last metapixel when saving.
    #[arg(long = "clear-trailing")]
    clear_trailing: bool,
}

impl EditTarget {
    fn destination(&self) -> Result<&Path> {
        match (&self.output, self.in_place) {
            (Some(output), _) => Ok(output),
            (None, true) => Ok(&self.hat),
            (None, false) => bail!("pass --output <PATH> or --in-place to choose where the hat is written"),
        }
    }

    fn save_options(&self) -> SaveOptions {
        SaveOptions {
            clear_trailing_rows: self.clear_trailing,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if cli.json {
                let envelope = find_metapixel_error(&error)
                    .map(|typed| typed.envelope())
                    .unwrap_or_else(|| ErrorEnvelope::generic(&error));
                match serde_json::to_string_pretty(&envelope) {
                    Ok(text) => println!("{text}"),
                    Err(_) => eprintln!("error: {error:#}"),
                }
            } else {
                eprintln!("error: {error:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Types => run_types(cli.json),
        Commands::Describe { kind } => run_describe(kind, cli.json),
        Commands::Show { hat } => run_show(hat, cli.json),
        Commands::Add { target, kind } => {
            let kind = catalog::resolve(kind)?;
            run_edit(target, cli.json, |document| {
                document.add(kind)?;
                Ok(format!("added {}", kind.name))
            })
        }
        Commands::Remove { target, kind } => {
            let kind = catalog::resolve(kind)?;
            run_edit(target, cli.json, |document| {
                Ok(match document.remove(kind.id) {
                    Some(_) => format!("removed {}", kind.name),
                    None => format!("{} was not present", kind.name),
                })
            })
        }
        Commands::Up { target, kind } => {
            let kind = catalog::resolve(kind)?;
            run_edit(target, cli.json, |document| {
                document.require_mut(kind)?;
                document.move_up(kind.id);
                Ok(format!("moved {} up", kind.name))
            })
        }
        Commands::Down { target, kind } => {
            let kind = catalog::resolve(kind)?;
            run_edit(target, cli.json, |document| {
                document.require_mut(kind)?;
                document.move_down(kind.id);
                Ok(format!("moved {} down", kind.name))
            })
        }
        Commands::Set {
            target,
            kind,
            value,
            colors,
        } => {
            let kind = catalog::resolve(kind)?;
            run_edit(target, cli.json, |document| {
                let pixel = document.require_mut(kind)?;
                match (value, colors) {
                    (Some(value), _) => {
                        let a = value.first().map(String::as_str).unwrap_or("0");
                        let b = value.get(1).map(String::as_str).unwrap_or("0");
                        pixel.set_value_text(a, b);
                    }
                    (None, Some(colors)) => {
                        let g = colors.first().map(String::as_str).unwrap_or("0");
                        let b = colors.get(1).map(String::as_str).unwrap_or("0");
                        pixel.set_colors_text(g, b);
                    }
                    (None, None) => bail!("pass --value or --colors"),
                }
                let (g, b) = pixel.colors();
                Ok(format!("set {} to g={} b={}", kind.name, g, b))
            })
        }
        Commands::Apply { target, manifest } => run_apply(target, manifest, cli.json),
        Commands::Export { hat } => run_export(hat),
    }
}

fn run_types(json: bool) -> Result<()> {
    if json {
        let types = catalog::all().iter().map(type_json).collect::<Vec<_>>();
        println!("{}", serde_json::to_string_pretty(&json!({ "types": types }))?);
        return Ok(());
    }

    println!(
        "{:>4}  {:<30} {:<15} {:<12} {:<10} {}",
        "id", "name", "value", "value color", "category", "category color"
    );
    for kind in catalog::all() {
        let value_kind = kind.domain.kind();
        println!(
            "{:>4}  {:<30} {:<15} {:<12} {:<10} {}",
            kind.id,
            kind.name,
            value_kind.name(),
            value_kind.color_name(),
            kind.category.label(),
            kind.category.color_name()
        );
    }
    Ok(())
}

fn run_describe(raw: &str, json: bool) -> Result<()> {
    let kind = catalog::resolve(raw)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&type_json(kind))?);
        return Ok(());
    }

    println!(
        "{} ({}) [{}]",
        kind.name,
        kind.id,
        kind.category.label()
    );
    println!("{}", kind.help);
    println!();
    println!("{}: {}", kind.domain.kind().name(), kind.value_help());
    Ok(())
}

fn run_show(hat: &Path, json: bool) -> Result<()> {
    let session = open_hat(hat)?;
    if json {
        let output = json!({
            "hat": hat.display().to_string(),
            "metapixels": document_json(&session.document),
            "cleared_rows": report_json(&session.report),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_document(&session.document);
    print_report(&session.report);
    Ok(())
}

fn run_edit<F>(target: &EditTarget, json: bool, edit: F) -> Result<()>
where
    F: FnOnce(&mut MetaPixelDocument) -> Result<String>,
{
    let destination = target.destination()?;
    let mut session = open_hat(&target.hat)?;
    let summary = edit(&mut session.document)
        .with_context(|| format!("failed to edit {}", target.hat.display()))?;
    finish_edit(&mut session, destination, target.save_options(), &summary, json)
}

fn run_apply(target: &EditTarget, manifest_path: &Path, json: bool) -> Result<()> {
    let destination = target.destination()?;
    let manifest = load_manifest(manifest_path)?;
    let mut session = open_hat(&target.hat)?;
    session.document = manifest.build_document()?;

    let mut options = manifest.save_options();
    options.clear_trailing_rows |= target.clear_trailing;
    let summary = format!(
        "applied {} metapixels from {}",
        session.document.len(),
        manifest_path.display()
    );
    finish_edit(&mut session, destination, options, &summary, json)
}

fn run_export(hat: &Path) -> Result<()> {
    let session = open_hat(hat)?;
    print!("{}", HatManifest::from_document(&session.document).to_yaml()?);
    Ok(())
}

fn finish_edit(
    session: &mut HatSession,
    destination: &Path,
    options: SaveOptions,
    summary: &str,
    json: bool,
) -> Result<()> {
    session.save_to(destination, options)?;

    if json {
        let output = json!({
            "ok": true,
            "summary": summary,
            "hat": destination.display().to_string(),
            "metapixels": document_json(&session.document),
            "cleared_rows": report_json(&session.report),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{summary}");
    print_report(&session.report);
    println!("Wrote {}", destination.display());
    Ok(())
}

fn print_document(document: &MetaPixelDocument) {
    if document.is_empty() {
        println!("no metapixels");
        return;
    }

    println!(
        "{:>3}  {:>4}  {:<30} {:>3} {:>3}  {}",
        "row", "id", "name", "g", "b", "value"
    );
    for (row, pixel) in document.iter().enumerate() {
        let (g, b) = pixel.colors();
        println!(
            "{:>3}  {:>4}  {:<30} {:>3} {:>3}  {}",
            row,
            pixel.id(),
            pixel.name(),
            g,
            b,
            pixel.format_components().join(", ")
        );
    }
}

fn print_report(report: &LoadReport) {
    for cleared in &report.cleared_rows {
        println!("cleared: {cleared}");
    }
}

fn type_json(kind: &MetaPixelType) -> Value {
    json!({
        "id": kind.id,
        "name": kind.name,
        "category": kind.category.label(),
        "category_color": kind.category.color_name(),
        "value_type": kind.domain.kind().name(),
        "value_color": kind.domain.kind().color_name(),
        "domain": kind.domain,
        "help": kind.help,
        "value_help": kind.value_help(),
    })
}

fn document_json(document: &MetaPixelDocument) -> Vec<Value> {
    document
        .iter()
        .enumerate()
        .map(|(row, pixel)| {
            let (g, b) = pixel.colors();
            json!({
                "row": row,
                "id": pixel.id(),
                "name": pixel.name(),
                "value_type": pixel.kind().domain.kind().name(),
                "g": g,
                "b": b,
                "value": pixel.get_value().components(),
                "help": pixel.type_help(),
                "value_help": pixel.value_help(),
            })
        })
        .collect()
}

fn report_json(report: &LoadReport) -> Vec<Value> {
    report
        .cleared_rows
        .iter()
        .map(|cleared| {
            json!({
                "code": cleared.code(),
                "message": cleared.to_string(),
            })
        })
        .collect()
}
