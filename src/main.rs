use arlington_predicates::cli::{self, CheckOptions, CheckResult, CliError, ValidateOptions};
use arlington_predicates::PdfVersion;
use arlington_predicates::output::{ast_to_value, reduction_to_value};
use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "arlpred")]
#[command(about = "Parse, reduce and validate Arlington PDF Model predicates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a predicate and print its AST
    Parse {
        /// The predicate (reads from stdin if not provided)
        predicate: Option<String>,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Reduce a predicate against a PDF object given as JSON
    Eval {
        /// The predicate (reads from stdin if not provided)
        predicate: Option<String>,

        /// PDF version to check against
        #[arg(long = "pdf-version")]
        pdf_version: Option<String>,

        /// JSON for the object stored under --key
        #[arg(short, long)]
        object: Option<String>,

        /// JSON for the dictionary or array holding the object
        #[arg(short, long)]
        container: Option<String>,

        /// JSON for the document trailer
        #[arg(short, long)]
        trailer: Option<String>,

        /// Key the object is stored under
        #[arg(short, long)]
        key: Option<String>,

        /// Supported extensions, comma separated (`*` for all)
        #[arg(short, long, value_delimiter = ',')]
        extensions: Vec<String>,

        /// Use DefaultValue for missing keys
        #[arg(long)]
        default_values: bool,

        /// Print the reduction as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Check the predicate syntax of every row of TSV grammar files
    Validate {
        /// Grammar files
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arlington_predicates=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            predicate,
            json,
            pretty,
        } => read_predicate(predicate).and_then(|predicate| {
            let options = CheckOptions {
                predicate,
                syntax_only: true,
                ..Default::default()
            };
            run_check(&options, json, pretty)
        }),
        Commands::Eval {
            predicate,
            pdf_version,
            object,
            container,
            trailer,
            key,
            extensions,
            default_values,
            json,
            pretty,
        } => read_predicate(predicate).and_then(|predicate| {
            let options = CheckOptions {
                predicate,
                object,
                container,
                trailer,
                pdf_version,
                key,
                extensions,
                default_values,
                syntax_only: false,
            };
            run_check(&options, json, pretty)
        }),
        Commands::Validate { paths } => run_validate(paths),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_predicate(predicate: Option<String>) -> Result<String, CliError> {
    match predicate {
        Some(p) => Ok(p),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer).map_err(CliError::Io)?;
            Ok(buffer.trim_end().to_string())
        }
        None => Err(CliError::NoInput),
    }
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    println!("{}", json);
    Ok(())
}

fn run_check(options: &CheckOptions, json: bool, pretty: bool) -> Result<(), CliError> {
    match cli::execute_check(options)? {
        CheckResult::Parsed(ast) if json => print_json(&ast_to_value(&ast), pretty)?,
        CheckResult::Parsed(ast) => println!("{}", ast),
        CheckResult::Reduced(reduction) if json => print_json(&reduction_to_value(&reduction), pretty)?,
        CheckResult::Reduced(reduction) => {
            match &reduction.value {
                Some(value) => println!("{}", value),
                None => println!("(does not apply)"),
            }
            if !reduction.fully_processed {
                println!("warning: reduction is not fully processed");
            }
            if reduction.deprecated {
                let version = options
                    .pdf_version
                    .clone()
                    .unwrap_or_else(|| PdfVersion::LATEST.to_string());
                println!("warning: deprecated at PDF {}", version);
            }
        }
    }
    Ok(())
}

fn run_validate(paths: Vec<PathBuf>) -> Result<(), CliError> {
    let summary = cli::execute_validate(&ValidateOptions { paths })?;
    for (grammar, report) in &summary.failures {
        println!("{}::{}", grammar, report);
    }
    println!(
        "{} file(s), {} row(s), {} invalid",
        summary.files,
        summary.rows,
        summary.failures.len()
    );
    if summary.is_ok() {
        Ok(())
    } else {
        Err(CliError::ValidationFailed(summary.failures.len()))
    }
}
