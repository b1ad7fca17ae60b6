use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};

use csvlayers::LogOptions;
use csvlayers::app::workflow::{ConfirmReport, ImportWorkflow};
use csvlayers::infra::config::Config;
use csvlayers::infra::layer::DelimitedTextValidator;
use csvlayers::infra::notify::LogNotifier;
use csvlayers::infra::project::ProjectTree;
use csvlayers::ui::app::{Outcome, UiApp};

/// Pick CSV/TSV files under a directory and rebuild them as grouped point layers.
#[derive(Debug, Parser)]
#[command(name = "csvlayers", version, about)]
struct Cli {
    /// Directory to scan. Defaults to the current directory.
    root: Option<PathBuf>,

    /// Confirm every file under ROOT without opening the terminal UI.
    #[arg(long)]
    headless: bool,

    /// Column holding the X (longitude) coordinate.
    #[arg(long, value_name = "FIELD")]
    x_field: Option<String>,

    /// Column holding the Y (latitude) coordinate.
    #[arg(long, value_name = "FIELD")]
    y_field: Option<String>,

    /// Uncheck the entry at this path, relative to ROOT. Repeatable.
    #[arg(long, value_name = "PATH")]
    exclude: Vec<PathBuf>,

    /// Write the accepted layer tree as JSON.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Use this config file instead of the global and workspace ones.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Append logs to this file.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    csvlayers::init(&LogOptions {
        verbosity: cli.verbose,
        file: cli.log_file.clone(),
        quiet: !cli.headless,
    })?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(x) = &cli.x_field {
        config.fields.x = x.clone();
    }
    if let Some(y) = &cli.y_field {
        config.fields.y = y.clone();
    }

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("unable to determine working directory")?,
    };
    let workflow = ImportWorkflow::from_config(&config)?;
    let validator = DelimitedTextValidator::from_config(&config);
    let mut project = ProjectTree::new();

    let report = if cli.headless {
        Some(run_headless(&cli, workflow, &validator, &root, &mut project)?)
    } else {
        run_interactive(workflow, validator, &root, &mut project)?
    };

    let Some(report) = report else {
        return Ok(());
    };
    println!("{}", project.render_text());
    for skipped in &report.skipped {
        eprintln!("skipped {}", skipped.display());
    }
    if let Some(output) = &cli.output {
        project.write_json(output)?;
        eprintln!("wrote {}", output.display());
    }
    Ok(())
}

fn run_headless(
    cli: &Cli,
    mut workflow: ImportWorkflow,
    validator: &DelimitedTextValidator,
    root: &Path,
    project: &mut ProjectTree,
) -> Result<ConfirmReport> {
    let mut notifier = LogNotifier;
    workflow.choose_root(root, &mut notifier)?;

    let fields = workflow.fields_mut();
    if let Some(x) = &cli.x_field
        && !fields.select_x(x)
    {
        bail!("no column named {x} in the header");
    }
    if let Some(y) = &cli.y_field
        && !fields.select_y(y)
    {
        bail!("no column named {y} in the header");
    }

    for excluded in &cli.exclude {
        let node = workflow
            .find(excluded)
            .with_context(|| format!("{} is not in the tree", excluded.display()))?;
        workflow.set_checked(node, false)?;
    }

    let report = workflow.confirm(validator, project, &mut notifier)?;
    Ok(report)
}

fn run_interactive(
    workflow: ImportWorkflow,
    validator: DelimitedTextValidator,
    root: &Path,
    project: &mut ProjectTree,
) -> Result<Option<ConfirmReport>> {
    let mut app = UiApp::new(workflow, validator);
    app.open(root);
    match app.run()? {
        Outcome::Confirmed(report) => {
            *project = app.project().clone();
            Ok(Some(report))
        }
        Outcome::Cancelled => Ok(None),
    }
}
