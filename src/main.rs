use anyhow::{bail, Result};
use chronicle::common::{ActivityPatch, ChronicleConfig};
use chronicle::context::build_context;
use chronicle::prompt::{ConfirmPrompt, FixedConfirm, StderrNotifier, StdinConfirm};
use chronicle::timeline::{render_insight, render_lines};
use chronicle::{DeleteOutcome, LoadSource, StateController};
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(author, version, about = "Chronicle: minimal architecture for your days", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the timeline
    List,

    /// Log a new event
    Add {
        #[arg(short, long)]
        name: String,
        /// Time of day as HH:MM (defaults to now)
        #[arg(short, long)]
        time: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Refine an existing event
    Edit {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        time: Option<String>,
        /// Pass an empty string to clear
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete an event
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Synthesize the day
    Synthesize,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ChronicleConfig::from_env()?;
    debug!("Configuration: {:?}", config);

    let confirm: Box<dyn ConfirmPrompt> = match &cli.command {
        Some(Commands::Delete { yes: true, .. }) => Box::new(FixedConfirm(true)),
        _ => Box::new(StdinConfirm),
    };
    let ctx = build_context(&config, confirm, Box::new(StderrNotifier)).await?;

    let mut controller = StateController::new(ctx);
    if controller.load_initial().await == LoadSource::Mirror {
        println!("(showing the local mirror; the remote store returned nothing)");
    }

    match cli.command.unwrap_or(Commands::List) {
        Commands::List => print_timeline(&controller),
        Commands::Add {
            name,
            time,
            description,
        } => {
            controller.open_create();
            let form = controller.form_mut();
            form.name = name;
            if let Some(time) = time {
                form.time = time;
            }
            form.description = description.unwrap_or_default();

            let saved = controller.submit_editor().await?;
            println!("Committed {} at {} [{}]", saved.name, saved.time, saved.id);
            print_timeline(&controller);
        }
        Commands::Edit {
            id,
            name,
            time,
            description,
        } => {
            if !controller.open_edit(&id) {
                bail!("no activity with id {}", id);
            }
            let patch = ActivityPatch {
                name,
                time,
                description,
            };
            if patch.is_empty() {
                bail!("nothing to change; pass --name, --time or --description");
            }

            let saved = controller.save(patch).await?;
            println!("Updated {} at {}", saved.name, saved.time);
            print_timeline(&controller);
        }
        Commands::Delete { id, .. } => {
            if controller.find(&id).is_none() {
                bail!("no activity with id {}", id);
            }
            let outcome = controller.delete(&id).await;
            println!("{}", report_delete(&id, outcome)?);
        }
        Commands::Synthesize => {
            if controller.activities().is_empty() {
                println!("The timeline is silent. Log something first.");
                return Ok(());
            }
            println!("Analyzing flow...");
            match controller.request_analysis().await {
                Some(insight) => {
                    for line in render_insight(insight) {
                        println!("{}", line);
                    }
                }
                None => println!("No synthesis available right now."),
            }
        }
    }

    Ok(())
}

fn print_timeline(controller: &StateController) {
    for line in render_lines(controller.activities()) {
        println!("{}", line);
    }
}

fn report_delete(id: &str, outcome: DeleteOutcome) -> Result<String> {
    match outcome {
        DeleteOutcome::Deleted => Ok(format!("Deleted {}", id)),
        DeleteOutcome::Cancelled => Ok(format!("Kept {}", id)),
        DeleteOutcome::Failed => bail!("could not delete {}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_delete_is_an_error() {
        let err = report_delete("a1", DeleteOutcome::Failed).unwrap_err();
        assert_eq!(err.to_string(), "could not delete a1");
    }

    #[test]
    fn deleted_and_kept_are_reported() {
        assert_eq!(report_delete("a1", DeleteOutcome::Deleted).unwrap(), "Deleted a1");
        assert_eq!(report_delete("a1", DeleteOutcome::Cancelled).unwrap(), "Kept a1");
    }
}
