use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use loctool::csv::CsvFileType;
use loctool::mrkdwn::{MrkdwnFileType, MrkdwnJsonFileType};
use loctool::{Project, TranslationSet, TranslationStore};

fn cli() -> Command {
    let project = Arg::new("project")
        .long("project")
        .short('p')
        .help("Project settings file")
        .default_value("project.json");
    let files = Arg::new("files")
        .help("Source files, relative to the project root")
        .required(true)
        .num_args(1..);

    Command::new("loctool")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract and localize Slack mrkdwn message modules and delimited files")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .help("Log file-level progress")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("extract")
                .about("Extract translatable strings into a resource file")
                .arg(project.clone())
                .arg(files.clone())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Where to write the extracted resources")
                        .default_value("extracted.json"),
                ),
        )
        .subcommand(
            Command::new("localize")
                .about("Write localized copies of the source files for every target locale")
                .arg(project.clone())
                .arg(files)
                .arg(
                    Arg::new("translations")
                        .long("translations")
                        .short('t')
                        .help("Resource file holding the translations"),
                )
                .arg(
                    Arg::new("new")
                        .long("new")
                        .short('n')
                        .help("Where to write strings that still need translation")
                        .default_value("new-strings.json"),
                ),
        )
        .subcommand(
            Command::new("merge")
                .about("Merge the records of one delimited file into another")
                .arg(project)
                .arg(Arg::new("base").help("File merged into").required(true).index(1))
                .arg(Arg::new("other").help("File merged from").required(true).index(2))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Where to write the merged file (default: overwrite base)"),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_project(matches: &ArgMatches) -> Result<Project> {
    let path = matches
        .get_one::<String>("project")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("project.json"));
    if !path.exists() {
        warn!("No project file at {}, using defaults", path.display());
        return Project::new(Default::default()).context("Invalid default project settings");
    }
    Project::load(&path).with_context(|| format!("Failed to load project from {}", path.display()))
}

fn files(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn extract(matches: &ArgMatches) -> Result<()> {
    let project = load_project(matches)?;
    let mrkdwn = MrkdwnFileType::new(&project)?;
    let mrkdwn_json = MrkdwnJsonFileType::new(&project)?;
    let csv = CsvFileType::new(&project)?;

    let mut extracted = TranslationSet::new();
    for path_name in files(matches) {
        if mrkdwn.handles(&path_name) {
            let mut file = mrkdwn.new_file(path_name.as_str());
            file.extract();
            extracted.add_set(file.get_translation_set());
        } else if mrkdwn_json.handles(&path_name) {
            let mut file = mrkdwn_json.new_file(path_name.as_str());
            file.extract();
            extracted.add_set(file.get_translation_set());
        } else if csv.handles(&path_name) {
            let mut file = csv.new_file(path_name.as_str())?;
            file.extract();
            extracted.add_set(file.get_translation_set());
        } else {
            warn!("No file type handles {}, skipping", path_name);
        }
    }

    let output = matches
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or("extracted.json");
    extracted
        .save_json(Path::new(output))
        .with_context(|| format!("Failed to write {}", output))?;
    info!("Extracted {} strings into {}", extracted.size(), output);
    Ok(())
}

fn localize(matches: &ArgMatches) -> Result<()> {
    let project = load_project(matches)?;
    let mrkdwn = MrkdwnFileType::new(&project)?;
    let mrkdwn_json = MrkdwnJsonFileType::new(&project)?;
    let csv = CsvFileType::new(&project)?;

    let translations = match matches.get_one::<String>("translations") {
        Some(path) => TranslationSet::load_json(Path::new(path))
            .with_context(|| format!("Failed to load translations from {}", path))?,
        None => TranslationSet::new(),
    };
    debug!("{} translations loaded", translations.size());

    let locales = project.locales().to_vec();
    let mut new_resources = TranslationSet::new();
    let mut written = Vec::new();
    for path_name in files(matches) {
        if mrkdwn.handles(&path_name) {
            let mut file = mrkdwn.new_file(path_name.as_str());
            file.extract();
            written.extend(file.localize(&translations, &locales, &mut new_resources)?);
        } else if mrkdwn_json.handles(&path_name) {
            let mut file = mrkdwn_json.new_file(path_name.as_str());
            file.extract();
            written.extend(file.localize(&translations, &locales, &mut new_resources)?);
        } else if csv.handles(&path_name) {
            let mut file = csv.new_file(path_name.as_str())?;
            file.extract();
            written.extend(file.localize(&translations, &locales, &mut new_resources)?);
        } else {
            warn!("No file type handles {}, skipping", path_name);
        }
    }

    for path in &written {
        debug!("Wrote {}", path.display());
    }
    info!("Wrote {} localized files", written.len());

    if !new_resources.is_empty() {
        let output = matches
            .get_one::<String>("new")
            .map(String::as_str)
            .unwrap_or("new-strings.json");
        new_resources
            .save_json(Path::new(output))
            .with_context(|| format!("Failed to write {}", output))?;
        info!("{} strings need translation, see {}", new_resources.size(), output);
    }
    Ok(())
}

fn merge(matches: &ArgMatches) -> Result<()> {
    let project = load_project(matches)?;
    let csv = CsvFileType::new(&project)?;
    let (Some(base_name), Some(other_name)) =
        (matches.get_one::<String>("base"), matches.get_one::<String>("other"))
    else {
        bail!("Both a base and an other file are required");
    };
    for name in [base_name, other_name] {
        if !csv.handles(name) {
            bail!("{} is not a delimited file", name);
        }
    }

    let mut base = csv.new_file(base_name.as_str())?;
    base.extract();
    let mut other = csv.new_file(other_name.as_str())?;
    other.extract();
    base.merge(&other);

    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| project.source_path(base_name));
    std::fs::write(&output, base.write()).with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "Merged {} into {} ({} records)",
        other_name,
        output.display(),
        base.table().records().len()
    );
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("extract", sub)) => extract(sub),
        Some(("localize", sub)) => localize(sub),
        Some(("merge", sub)) => merge(sub),
        Some((name, _)) => bail!("Unknown command {}", name),
        None => bail!("A command is required"),
    }
}
