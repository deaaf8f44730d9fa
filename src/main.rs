use std::io::{self, stdin, BufRead};
use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use poms_stressindex::{render, Error, Questionnaire, RatingStore, QUESTIONNAIRES};

/// Rate each factor, then get a stress index with personalized tips.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Bundled questionnaire to run
    #[arg(long, default_value = "poms")]
    preset: String,

    /// Load the questionnaire from a JSON definition instead
    #[arg(long)]
    definition: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// List the bundled questionnaires and exit
    #[arg(long)]
    list: bool,
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list {
        for questionnaire in QUESTIONNAIRES.iter() {
            println!(
                "{:<12} {} ({} factors, {}-{})",
                questionnaire.name,
                questionnaire.title,
                questionnaire.factors.len(),
                questionnaire.scale.min,
                questionnaire.scale.max
            );
        }
        return Ok(());
    }

    let loaded;
    let questionnaire = match args.definition {
        Some(ref path) => {
            info!(path = %path.display(), "loading questionnaire definition");
            loaded = Questionnaire::from_path(path)?;
            &loaded
        }
        None => Questionnaire::preset(&args.preset)?,
    };

    let mut store = RatingStore::new(questionnaire);
    let mut lines = stdin().lock().lines();

    loop {
        ask_ratings(&mut store, &mut lines)?;
        ask_stressors(&mut store, &mut lines)?;

        let report = questionnaire.evaluate(&store.responses())?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!();
            print!("{}", render::render_text(questionnaire, &report));
        }

        println!();
        println!("Type 'reset' to start over, or press Enter to quit.");
        match next_line(&mut lines)? {
            Some(line) if line == "reset" => {
                debug!("scores reset");
                store.reset();
            }
            _ => break,
        }
    }
    Ok(())
}

fn ask_ratings<I>(store: &mut RatingStore, lines: &mut I) -> Result<(), Error>
where
    I: Iterator<Item = io::Result<String>>,
{
    let questionnaire = store.questionnaire();
    let scale = &questionnaire.scale;

    println!("{}", questionnaire.title);
    if let Some(ref instructions) = questionnaire.instructions {
        println!("{}", instructions);
    }
    for label in &scale.labels {
        print!("  {} => {}", label.score, label.text);
    }
    println!();

    while !store.is_complete() {
        let factor = &questionnaire.factors[store.offset()];
        println!();
        println!("{}: {}", factor.name, factor.description);
        println!(
            "[{}-{}, Enter = {}, 'reset' to start over]",
            scale.min, scale.max, scale.default
        );

        let line = next_line(lines)?.ok_or_else(closed_input)?;
        if line == "reset" {
            store.reset();
            println!("Scores reset.");
            continue;
        }
        let pushed = if line.is_empty() {
            store.push(scale.default)
        } else {
            line.parse::<u32>()
                .map_err(|_| Error::NotANumber {
                    factor: factor.name.clone(),
                    input: line.clone(),
                })
                .and_then(|value| store.push(value))
        };
        if let Err(e) = pushed {
            debug!(error = %e, "rejected answer");
            println!(
                "Please enter a whole number from {} to {}.",
                scale.min, scale.max
            );
        }
    }
    Ok(())
}

fn ask_stressors<I>(store: &mut RatingStore, lines: &mut I) -> Result<(), Error>
where
    I: Iterator<Item = io::Result<String>>,
{
    let questionnaire = store.questionnaire();
    if questionnaire.stressors.is_empty() {
        return Ok(());
    }

    println!();
    println!("Additional stressors:");
    for stressor in &questionnaire.stressors {
        println!("  {:<14} {}", stressor.id, stressor.label);
    }

    loop {
        println!("Select any that apply (comma separated ids, Enter for none):");
        let line = next_line(lines)?.ok_or_else(closed_input)?;
        let ids = line
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .collect::<Vec<_>>();
        if let Some(unknown) = ids.iter().find(|id| questionnaire.stressor(id).is_none()) {
            println!("Unknown stressor: {}", unknown);
            continue;
        }
        for id in ids {
            store.select_stressor(id)?;
        }
        return Ok(());
    }
}

fn next_line<I>(lines: &mut I) -> Result<Option<String>, Error>
where
    I: Iterator<Item = io::Result<String>>,
{
    Ok(lines.next().transpose()?.map(|line| line.trim().to_string()))
}

fn closed_input() -> Error {
    Error::Io(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "input closed before the questionnaire was complete",
    ))
}

#[cfg(test)]
mod test {
    use super::*;

    fn input(lines: &[&str]) -> std::vec::IntoIter<io::Result<String>> {
        lines
            .iter()
            .map(|line| Ok(line.to_string()))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_ask_ratings() {
        let lite = Questionnaire::preset("poms-lite").unwrap();
        let mut store = RatingStore::new(lite);
        let mut lines = input(&["", "9", "x", "1"]);
        ask_ratings(&mut store, &mut lines).unwrap();
        assert_eq!(store.ratings(), &[2, 1]);
        assert!(store.is_complete());
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_ask_ratings_reset() {
        let lite = Questionnaire::preset("poms-lite").unwrap();
        let mut store = RatingStore::new(lite);
        let mut lines = input(&["4", "reset", "", "-1", "0"]);
        ask_ratings(&mut store, &mut lines).unwrap();
        assert_eq!(store.ratings(), &[2, 0]);
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_ask_ratings_closed_input() {
        let lite = Questionnaire::preset("poms-lite").unwrap();
        let mut store = RatingStore::new(lite);
        match ask_ratings(&mut store, &mut input(&["1"])) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(store.offset(), 1);
    }

    #[test]
    fn test_ask_stressors() {
        let poms = Questionnaire::preset("poms").unwrap();
        let mut store = RatingStore::new(poms);
        let mut lines = input(&["exams, lottery", " health ,exams "]);
        ask_stressors(&mut store, &mut lines).unwrap();
        assert_eq!(store.responses().stressors, vec!["exams", "health"]);
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_ask_stressors_none() {
        let poms = Questionnaire::preset("poms").unwrap();
        let mut store = RatingStore::new(poms);
        ask_stressors(&mut store, &mut input(&[""])).unwrap();
        assert!(store.responses().stressors.is_empty());

        match ask_stressors(&mut store, &mut input(&[])) {
            Err(Error::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_ask_stressors_skipped_without_checklist() {
        let lite = Questionnaire::preset("poms-lite").unwrap();
        let mut store = RatingStore::new(lite);
        let mut lines = input(&["exams"]);
        ask_stressors(&mut store, &mut lines).unwrap();
        assert_eq!(lines.next().unwrap().unwrap(), "exams");
    }
}
