use clap::{Parser, Subcommand};
use irodori::config::{self, LanguageConfig, Settings};
use irodori::language::{GrammarLoader, Readiness};
use irodori::{LanguageMode, Position, ScopeId};
use std::path::{Path, PathBuf};

/// Inspect tree-sitter highlighting, scopes and folds for a file
#[derive(Parser)]
#[command(name = "irodori")]
#[command(version)]
#[command(about = "Inspect tree-sitter highlighting, scopes and folds for a file")]
struct Cli {
    /// Settings file (default: $XDG_CONFIG_HOME/irodori/irodori.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Language name; detected from the file extension when omitted
    #[arg(long, global = true)]
    language: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every scope boundary in a row range
    Highlight {
        file: PathBuf,

        #[arg(long, default_value_t = 0)]
        start_row: usize,

        /// Last row to print (default: end of file)
        #[arg(long)]
        end_row: Option<usize>,
    },
    /// Print the scope descriptor at a position
    Scopes {
        file: PathBuf,
        row: usize,
        column: usize,

        /// Report syntax tree node types instead of highlight scopes
        #[arg(long)]
        syntax_tree: bool,
    },
    /// Print foldable ranges
    Folds {
        file: PathBuf,

        /// Only folds starting at this indent level
        #[arg(long)]
        level: Option<usize>,
    },
}

impl Commands {
    fn file(&self) -> &Path {
        match self {
            Commands::Highlight { file, .. }
            | Commands::Scopes { file, .. }
            | Commands::Folds { file, .. } => file,
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings, String> {
    match path {
        Some(path) => config::load_config_file(path).map_err(|e| e.to_string()),
        None => config::load_user_config()
            .map(Option::unwrap_or_default)
            .map_err(|e| e.to_string()),
    }
}

fn resolve_language(
    settings: &Settings,
    explicit: Option<&str>,
    file: &Path,
) -> Result<(String, LanguageConfig), String> {
    if let Some(name) = explicit {
        let config = settings.languages.get(name).cloned().unwrap_or_default();
        return Ok((name.to_string(), config));
    }
    settings
        .language_for_path(file)
        .map(|(name, config)| (name.to_string(), config.clone()))
        .ok_or_else(|| format!("No language configured for {}", file.display()))
}

async fn open_mode(cli: &Cli) -> Result<LanguageMode, String> {
    let settings = load_settings(cli.config.as_deref())?;
    let file = cli.command.file();
    let (language, language_config) = resolve_language(&settings, cli.language.as_deref(), file)?;
    let text = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;

    let mut mode = LanguageMode::new(text, language_config.scope_name_for(&language));
    mode.attach_pending(GrammarLoader::spawn(
        &language,
        language_config,
        settings.effective_search_paths(),
    ));
    let readiness = mode.wait_ready().await.clone();
    match readiness {
        Readiness::Ready => Ok(mode),
        Readiness::Failed(message) => Err(message),
        Readiness::Loading => Err(format!("Grammar for {language} never finished loading")),
    }
}

fn scope_names(mode: &LanguageMode, ids: &[ScopeId]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| mode.scope_for_id(*id).map(str::to_string))
        .collect()
}

fn print_highlights(mode: &mut LanguageMode, start_row: usize, end_row: Option<usize>) {
    let end_row = end_row.unwrap_or_else(|| mode.buffer().line_count().saturating_sub(1));
    let mut boundaries = Vec::new();
    {
        let mut iterator = mode.build_highlight_iterator();
        let containing = iterator.seek(Position::row_start(start_row), end_row);
        boundaries.push((Position::row_start(start_row), Vec::new(), containing));
        while iterator.position().row <= end_row {
            boundaries.push((
                iterator.position(),
                iterator.close_scope_ids(),
                iterator.open_scope_ids(),
            ));
            if !iterator.move_to_successor() {
                break;
            }
        }
    }

    for (index, (position, close, open)) in boundaries.into_iter().enumerate() {
        let close = scope_names(mode, &close);
        let open = scope_names(mode, &open);
        if index == 0 {
            println!("{position} open before: {}", open.join(" "));
        } else {
            println!("{position} close [{}] open [{}]", close.join(" "), open.join(" "));
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut mode = match open_mode(&cli).await {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Highlight {
            start_row, end_row, ..
        } => print_highlights(&mut mode, start_row, end_row),
        Commands::Scopes {
            row,
            column,
            syntax_tree,
            ..
        } => {
            let point = Position::new(row, column);
            let descriptor = if syntax_tree {
                mode.syntax_tree_scope_descriptor_for_position(point)
            } else {
                mode.scope_descriptor_for_position(point)
            };
            for scope in descriptor.scopes() {
                println!("{scope}");
            }
        }
        Commands::Folds { level, .. } => {
            let ranges = match level {
                Some(level) => mode.foldable_ranges_at_indent_level(level),
                None => mode.foldable_ranges(),
            };
            for range in ranges {
                println!("{range}");
            }
        }
    }
}
