use clap::Parser;
use poms_stressindex::{read_bulk, render, Error, Questionnaire};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Evaluate a CSV file of responses, one row per respondent.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    path: PathBuf,

    #[arg(long, default_value = "poms")]
    preset: String,

    /// Load the questionnaire from a JSON definition instead
    #[arg(long)]
    definition: Option<PathBuf>,

    /// Print one JSON report per line
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let loaded;
    let questionnaire = match args.definition {
        Some(ref path) => {
            loaded = Questionnaire::from_path(path)?;
            &loaded
        }
        None => Questionnaire::preset(&args.preset)?,
    };

    let reader = BufReader::new(File::open(&args.path)?);
    let (mut evaluated, mut skipped) = (0, 0);
    for (line, row) in read_bulk(questionnaire, reader).enumerate() {
        let result = row.and_then(|(id, responses)| {
            questionnaire
                .evaluate(&responses)
                .map(|report| (id, report))
        });
        match result {
            Ok((id, report)) => {
                evaluated += 1;
                if args.json {
                    let value = serde_json::json!({ "id": id, "report": report });
                    println!("{}", value);
                } else {
                    println!(
                        "id = {}, {}, bucket = {}, has_stress = {}",
                        id,
                        render::summary_line(&report),
                        report.bucket,
                        report.has_stress()
                    );
                }
            }
            Err(e) => {
                skipped += 1;
                warn!(row = line + 1, error = %e, "skipped row");
            }
        }
    }
    info!(evaluated, skipped, "bulk evaluation finished");
    Ok(())
}
