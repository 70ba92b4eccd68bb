use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use spelltrie::cli::output::{self, OutputFormat};
use spelltrie::{dict, CompoundMethod, Config, SpellChecker, Trie};
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "spelltrie")]
#[command(version, about = "Compact trie dictionaries and spelling suggestions", long_about = None)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG also works
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completion: Option<Shell>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a dictionary from word lists and other dictionaries
    Build {
        /// Inputs: word lists, .trie or .trieb files, optionally gzipped
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file; the extension picks the format (.trie, .trieb, .txt, + .gz)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Check files (or standard input) for misspelled words
    Check {
        #[command(flatten)]
        dictionary: DictionaryArg,

        /// Files to check; reads standard input when empty
        #[arg(value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Exit with code 0 even if errors are found
        #[arg(long)]
        no_fail: bool,

        /// Do not accept capitalized forms of lower case words
        #[arg(long)]
        case_sensitive: bool,

        /// Pattern to ignore (regex)
        #[arg(long)]
        ignore_pattern: Vec<String>,
    },

    /// Suggest corrections for words
    Suggest {
        #[command(flatten)]
        dictionary: DictionaryArg,

        #[arg(required = true)]
        words: Vec<String>,

        /// Number of suggestions
        #[arg(short = 'n', long)]
        num: Option<usize>,

        /// Most edits a suggestion may need
        #[arg(long)]
        changes: Option<usize>,

        /// Allow suggestions made of several words
        #[arg(long, value_enum)]
        compound: Option<CompoundArg>,

        /// Keep suggestions tied with the last one
        #[arg(long)]
        ties: bool,

        /// Time limit per word in milliseconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Show the cost of each suggestion
        #[arg(long)]
        cost: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the words of a dictionary
    Words {
        #[command(flatten)]
        dictionary: DictionaryArg,

        /// Only words starting with this prefix
        #[arg(short, long, default_value = "")]
        prefix: String,
    },

    /// Write a dictionary in the text format
    Export {
        #[command(flatten)]
        dictionary: DictionaryArg,

        /// Output file; standard output when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Show dictionary statistics
    Info {
        dictionary: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(clap::Args, Debug)]
struct DictionaryArg {
    /// Dictionary file or name in the data directory; defaults to the configured one
    #[arg(short, long)]
    dictionary: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// Radix for node references (10-36)
    #[arg(long)]
    base: Option<u32>,

    /// Wrap text output at this width (0 = one line per first letter)
    #[arg(long)]
    line_width: Option<usize>,

    /// Comment to store in the header
    #[arg(long)]
    comment: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompoundArg {
    None,
    Join,
    Separate,
}

impl From<CompoundArg> for CompoundMethod {
    fn from(arg: CompoundArg) -> Self {
        match arg {
            CompoundArg::None => CompoundMethod::None,
            CompoundArg::Join => CompoundMethod::JoinWords,
            CompoundArg::Separate => CompoundMethod::SeparateWords,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "spelltrie", &mut io::stdout());
        return Ok(());
    }

    let Some(command) = cli.command else {
        anyhow::bail!("No command given. Use --help for usage information.");
    };

    handle_command(command, !cli.no_color)
}

fn handle_command(command: Commands, colored: bool) -> Result<()> {
    match command {
        Commands::Build {
            inputs,
            output: path,
            export,
        } => {
            let config = Config::load(None, Vec::new())?;
            let trie = dict::build_dictionary(&inputs, &config.trie, colored)?;
            let export = export.apply(config.export);
            let bytes = dict::save_dictionary(&trie, &path, &export)?;
            output::print_build_summary(&path, trie.num_words(), trie.size(), bytes, colored);
        }
        Commands::Check {
            dictionary,
            files,
            format,
            no_fail,
            case_sensitive,
            ignore_pattern,
        } => {
            let mut config = Config::load(dictionary.dictionary, ignore_pattern)?;
            config.case_sensitive |= case_sensitive;
            let checker = SpellChecker::new(open_dictionary(&config)?, &config);

            let mut total_errors = 0;
            let mut sources = 0;
            if files.is_empty() {
                let mut content = String::new();
                io::stdin()
                    .read_to_string(&mut content)
                    .context("Failed to read standard input")?;
                let result = checker.check_text(&content);
                output::print_errors("-", &result, colored, format)?;
                total_errors += result.error_count;
                sources += 1;
            }
            for file_path in &files {
                if !file_path.exists() {
                    log::error!("File not found: {}", file_path.display());
                    continue;
                }
                let result = checker.check_file(file_path)?;
                output::print_errors(&file_path.display().to_string(), &result, colored, format)?;
                total_errors += result.error_count;
                sources += 1;
            }

            if format == OutputFormat::Text {
                output::print_check_summary(total_errors, sources, colored);
            }
            if total_errors > 0 && !no_fail {
                std::process::exit(1);
            }
        }
        Commands::Suggest {
            dictionary,
            words,
            num,
            changes,
            compound,
            ties,
            timeout,
            cost,
            format,
        } => {
            let config = Config::load(dictionary.dictionary, Vec::new())?;
            let trie = open_dictionary(&config)?;
            let mut options = config.suggest.clone();
            if let Some(n) = num {
                options.num_suggestions = n;
            }
            if let Some(c) = changes {
                options.change_limit = c;
            }
            if let Some(c) = compound {
                options.compound_method = c.into();
            }
            if let Some(ms) = timeout {
                options.timeout = Duration::from_millis(ms);
            }
            options.include_ties |= ties;

            for word in &words {
                let suggestions = trie.suggest_with_cost(word, &options);
                output::print_suggestions(word, &suggestions, cost, colored, format)?;
            }
        }
        Commands::Words { dictionary, prefix } => {
            let config = Config::load(dictionary.dictionary, Vec::new())?;
            let trie = open_dictionary(&config)?;
            for word in trie.complete_word(&prefix) {
                println!("{}", word);
            }
        }
        Commands::Export {
            dictionary,
            output: path,
            export,
        } => {
            let config = Config::load(dictionary.dictionary, Vec::new())?;
            let trie = open_dictionary(&config)?;
            let export = export.apply(config.export.clone());
            match path {
                Some(path) => {
                    let bytes = dict::save_dictionary(&trie, &path, &export)?;
                    let (words, nodes) = (trie.num_words(), trie.size());
                    output::print_build_summary(&path, words, nodes, bytes, colored);
                }
                None => print!("{}", trie.export(&export)),
            }
        }
        Commands::Info { dictionary, format } => {
            let config = Config::load(None, Vec::new())?;
            let path = dict::resolve_dictionary(&dictionary)
                .with_context(|| format!("Dictionary not found: {}", dictionary.display()))?;
            let info = dict::dictionary_info(&path, &config.trie)?;
            output::print_dictionary_info(&info, colored, format)?;
        }
    }
    Ok(())
}

impl ExportArgs {
    fn apply(self, mut options: spelltrie::ExportOptions) -> spelltrie::ExportOptions {
        if let Some(base) = self.base {
            options.base = base;
        }
        if let Some(width) = self.line_width {
            options.line_width = width;
        }
        if let Some(comment) = self.comment {
            options.comment = comment;
        }
        options
    }
}

fn open_dictionary(config: &Config) -> Result<Trie> {
    let Some(name) = &config.dictionary else {
        anyhow::bail!(
            "No dictionary given. Use --dictionary or set `dictionary` in {}.",
            spelltrie::config::LOCAL_CONFIG_FILE
        );
    };
    let path = dict::resolve_dictionary(name)
        .with_context(|| format!("Dictionary not found: {}", name.display()))?;
    dict::load_dictionary(&path, &config.trie)
}
