use std::fs;
use std::io::{self, Read};

use buildql::cli::{self, CheckOptions, CheckResult, CliError};
use buildql::{ParserOptions, fuzzy};
use clap::{Parser as ClapParser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "buildql")]
#[command(about = "BuildQL - A query language for filtering card collections")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of a query
    Tokens {
        /// The query to tokenize
        query: String,
    },

    /// Parse a query and print it back in canonical form
    Parse {
        /// The query to parse
        query: String,

        /// Print the syntax tree instead
        #[arg(short, long)]
        pretty: bool,

        /// Maximum nesting depth
        #[arg(long, default_value_t = ParserOptions::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Filter a JSON array of cards with a query
    Check {
        /// The query to execute
        query: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// JSON field schema file (inferred from the cards if not provided)
        #[arg(short, long)]
        fields: Option<String>,

        /// Also match the back of double-sided cards
        #[arg(long)]
        match_backs: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,

        /// Maximum nesting depth
        #[arg(long, default_value_t = ParserOptions::DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Maximum characters between words of a loose string match
        #[arg(long, default_value_t = fuzzy::DEFAULT_TOKEN_DISTANCE)]
        fuzzy_distance: usize,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'buildql docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Tokens { query } => cli::dump_tokens(&query).map(|lines| {
            for line in lines {
                println!("{}", line);
            }
        }),
        Commands::Parse {
            query,
            pretty,
            max_depth,
        } => cli::render_expression(&query, pretty, max_depth).map(|out| println!("{}", out)),
        Commands::Check {
            query,
            input,
            fields,
            match_backs,
            pretty,
            syntax_only,
            max_depth,
            fuzzy_distance,
        } => run_check(
            CheckOptions {
                query,
                input,
                fields: None,
                match_backs,
                syntax_only,
                max_depth,
                fuzzy_distance,
            },
            fields,
            pretty,
        ),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => {
            cli::get_doc_category(&category).map(|content| print!("{}", content))
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("buildql=debug"),
        _ => EnvFilter::new("buildql=trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_check(
    mut options: CheckOptions,
    fields_file: Option<String>,
    pretty: bool,
) -> Result<(), CliError> {
    if options.input.is_none() && !options.syntax_only && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        options.input = Some(buffer);
    }

    if let Some(path) = fields_file {
        options.fields = Some(fs::read_to_string(path)?);
    }

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{}", json);
        }
    }
    Ok(())
}
