//! Command-line front end for sorting and searching clinic records
//!
//! Reads one record kind from a flat-file data directory, optionally filters
//! it with a search, sorts it on a field, and prints the result as a table
//! or as JSON.

use clap::{Arg, ArgAction, ArgMatches, Command};
use itertools::Itertools;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use meditrack_sort::{
    check_query,
    error::{RecordError, RecordResult},
    run_query,
    sample::SampleGenerator,
    FlatFileStore, QueryConfig, Record, RecordKind, SortAlgorithm, EXIT_SUCCESS,
};

/// How matching records are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
}

/// Everything the command line asks for
#[derive(Debug)]
struct CliOptions {
    data_dir: PathBuf,
    separator: Option<char>,
    format: OutputFormat,
    generate: Option<usize>,
    seed: Option<u64>,
    /// Absent when only generating sample data
    query: Option<QueryConfig>,
}

fn main() {
    init_logging();

    match run() {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("meditrack-sort: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("meditrack_sort=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn run() -> RecordResult<i32> {
    let matches = build_cli().get_matches();
    let options = parse_options(&matches)?;

    let mut store = FlatFileStore::open(&options.data_dir)?;
    if let Some(separator) = options.separator {
        store = store.with_separator(separator)?;
    }

    if let Some(patients) = options.generate {
        let summary = SampleGenerator::new(options.seed).populate(&mut store, patients)?;
        info!(
            dir = %options.data_dir.display(),
            patients = summary.patients,
            history_entries = summary.history_entries,
            appointments = summary.appointments,
            "sample data written"
        );
    }

    let Some(config) = options.query else {
        return Ok(EXIT_SUCCESS);
    };

    if config.check {
        return match check_query(&store, &config)? {
            Some(index) => Err(RecordError::not_sorted(index)),
            None => Ok(EXIT_SUCCESS),
        };
    }

    let records = run_query(&store, &config)?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_records(&mut writer, config.kind, &records, options.format)?;
    writer.flush()?;

    Ok(EXIT_SUCCESS)
}

fn build_cli() -> Command {
    Command::new("meditrack-sort")
        .version(env!("CARGO_PKG_VERSION"))
        .override_usage("meditrack-sort [OPTION]... KIND")
        .about("Sort and search clinic records")
        .long_about("Sort and search clinic records kept as delimited text files.\n\nKIND is one of: patient, doctor, appointment, prescription, medical_history, payment. Date fields sort as dates, time fields as times, and other fields as numbers when every value is numeric, otherwise as case-insensitive text.")

        .arg(Arg::new("kind")
            .help("Kind of record to query")
            .value_name("KIND")
            .required_unless_present("generate"))

        // Store options
        .arg(Arg::new("data-dir")
            .short('d')
            .long("data-dir")
            .help("Directory holding the record files")
            .value_name("DIR")
            .default_value("data"))
        .arg(Arg::new("field-separator")
            .short('t')
            .long("field-separator")
            .help("Use SEP instead of ',' between fields")
            .value_name("SEP"))

        // Sort options
        .arg(Arg::new("key")
            .short('k')
            .long("key")
            .help("Sort on FIELD")
            .value_name("FIELD"))
        .arg(Arg::new("reverse")
            .short('r')
            .long("reverse")
            .help("Sort in descending order")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("algorithm")
            .short('a')
            .long("algorithm")
            .help("Sort algorithm; defaults per kind")
            .value_name("NAME")
            .value_parser(["exchange", "bubble", "heap", "merge"]))
        .arg(Arg::new("check")
            .short('c')
            .long("check")
            .help("Check whether the records are sorted on the key; do not sort")
            .action(ArgAction::SetTrue))

        // Search options
        .arg(Arg::new("field")
            .short('f')
            .long("field")
            .help("Search in FIELD")
            .value_name("FIELD")
            .requires("query"))
        .arg(Arg::new("query")
            .short('q')
            .long("query")
            .help("Keep records whose field contains TEXT, ignoring case")
            .value_name("TEXT")
            .requires("field"))
        .arg(Arg::new("exact")
            .long("exact")
            .help("Match the whole field value instead of a substring")
            .action(ArgAction::SetTrue)
            .requires("query"))

        // Output options
        .arg(Arg::new("limit")
            .short('n')
            .long("limit")
            .help("Print at most N records")
            .value_name("N"))
        .arg(Arg::new("format")
            .long("format")
            .help("Output format")
            .value_name("FORMAT")
            .value_parser(["table", "json"])
            .default_value("table"))

        // Sample data
        .arg(Arg::new("generate")
            .long("generate")
            .help("Write N sample patients with history and appointments before querying")
            .value_name("N"))
        .arg(Arg::new("seed")
            .long("seed")
            .help("Seed for reproducible sample data")
            .value_name("SEED")
            .requires("generate"))
}

/// Parse options from command line matches
fn parse_options(matches: &ArgMatches) -> RecordResult<CliOptions> {
    let data_dir = matches
        .get_one::<String>("data-dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));

    let separator = match matches.get_one::<String>("field-separator") {
        Some(sep) => {
            let mut chars = sep.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => {
                    return Err(RecordError::invalid_option(&format!(
                        "field separator must be a single character: {sep:?}"
                    )))
                }
            }
        }
        None => None,
    };

    let format = match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    let generate = parse_number::<usize>(matches, "generate")?;
    let seed = parse_number::<u64>(matches, "seed")?;

    let query = match matches.get_one::<String>("kind") {
        Some(kind) => Some(parse_query(kind, matches)?),
        None => None,
    };

    Ok(CliOptions {
        data_dir,
        separator,
        format,
        generate,
        seed,
        query,
    })
}

fn parse_query(kind: &str, matches: &ArgMatches) -> RecordResult<QueryConfig> {
    let kind: RecordKind = kind.parse()?;
    let algorithm = matches
        .get_one::<String>("algorithm")
        .map(|name| name.parse::<SortAlgorithm>())
        .transpose()?;

    let mut config = QueryConfig::new(kind)
        .with_reverse(matches.get_flag("reverse"))
        .with_algorithm(algorithm)
        .with_exact(matches.get_flag("exact"))
        .with_check(matches.get_flag("check"))
        .with_limit(parse_number::<usize>(matches, "limit")?);

    if let Some(field) = matches.get_one::<String>("key") {
        config = config.with_sort_field(field.as_str());
    }
    config.search_field = matches.get_one::<String>("field").cloned();
    config.query = matches.get_one::<String>("query").cloned();

    config.validate()?;
    Ok(config)
}

fn parse_number<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> RecordResult<Option<T>> {
    matches
        .get_one::<String>(name)
        .map(|value| {
            value.parse::<T>().map_err(|_| {
                RecordError::invalid_option(&format!("invalid value for --{name}: {value}"))
            })
        })
        .transpose()
}

fn write_records<W: Write>(
    writer: &mut W,
    kind: RecordKind,
    records: &[Record],
    format: OutputFormat,
) -> RecordResult<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, records)?;
            writeln!(writer)?;
        }
        OutputFormat::Table => {
            let columns = kind.columns();
            writeln!(writer, "{}", columns.iter().join("\t"))?;
            for record in records {
                let row = columns.iter().map(|column| record.value(column)).join("\t");
                writeln!(writer, "{}", row)?;
            }
        }
    }
    Ok(())
}
