//! Command-line interface for the histograph utility
//!
//! Lays out, checks, inspects and imports graph documents stored as JSON.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::colorizer::{paint_kind, paint_relationship};
use histograph::canvas::{assign_ranks, check_document};
use histograph::classifier::process_response;
use histograph::core::logging::{init_logging, LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use histograph::{
    import_into_document, layout_with_config, CanvasConfig, Direction, GraphDocument, NodeKind,
    RelationshipKind,
};

/// Histograph - lay out and inspect graphs of historical entities
#[derive(Parser)]
#[command(name = "histograph")]
#[command(about = "Lay out, check and inspect graphs of historical entities and relationships")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute node positions for a graph document
    Layout {
        /// Graph document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the laid-out document (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Layout direction; defaults to the document's own
        #[arg(long, value_enum)]
        direction: Option<DirectionChoice>,

        /// Canvas configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Report duplicate ids, dangling edges and self-loops
    Check {
        /// Graph document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Merge a classifier response into a graph document
    Import {
        /// Raw classifier response body (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Existing graph document to merge into; starts empty when omitted
        #[arg(long)]
        graph: Option<PathBuf>,

        /// Output file for the merged document (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// HTTP status the response was received with
        #[arg(long, default_value_t = 200)]
        status: u16,
    },

    /// Print nodes and edges as an aligned table
    Summary {
        /// Graph document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// When to use colors in output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },

    /// List node and relationship kinds
    Kinds {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Layout direction choices
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum DirectionChoice {
    /// Top to bottom
    Tb,
    /// Left to right
    Lr,
}

impl From<DirectionChoice> for Direction {
    fn from(value: DirectionChoice) -> Self {
        match value {
            DirectionChoice::Tb => Direction::TopToBottom,
            DirectionChoice::Lr => Direction::LeftToRight,
        }
    }
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Main CLI application
#[derive(Default)]
pub struct HistographApp;

impl HistographApp {
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Histograph v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Layout {
                input,
                output,
                direction,
                config,
            } => self.layout_command(input, output, direction, config, cli.verbose),
            Commands::Check { input } => self.check_command(input, cli.verbose),
            Commands::Import {
                input,
                graph,
                output,
                status,
            } => self.import_command(input, graph, output, status, cli.verbose),
            Commands::Summary { input, color } => self.summary_command(input, color),
            Commands::Kinds { json } => self.kinds_command(json),
        }
    }

    /// Handle the layout command
    fn layout_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        direction: Option<DirectionChoice>,
        config: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let document = self.read_document(input)?;

        let mut canvas_config = match config {
            Some(path) => {
                let raw = fs::read_to_string(&path).with_context(|| {
                    format!("Failed to read config file '{}'", path.display())
                })?;
                CanvasConfig::from_json(&raw)
                    .with_context(|| format!("Invalid config file '{}'", path.display()))?
            }
            None => CanvasConfig::default().with_direction(document.direction),
        };
        if let Some(direction) = direction {
            canvas_config.direction = direction.into();
        }

        let placed = layout_with_config(&document, &canvas_config)?;
        if verbose {
            eprintln!(
                "Laid out {} nodes ({})",
                placed.nodes.len(),
                canvas_config.direction
            );
        }

        let json = serde_json::to_string_pretty(&placed)?;
        self.write_output(output, &json)
    }

    /// Handle the check command
    fn check_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let document = self.read_document(input)?;
        let problems = check_document(&document);

        if problems.is_empty() {
            println!(
                "✓ Valid graph: {} nodes, {} edges",
                document.nodes.len(),
                document.edges.len()
            );
            return Ok(());
        }

        for problem in &problems {
            println!("✗ {}", problem);
        }
        if verbose {
            eprintln!("Checked {} nodes and {} edges", document.nodes.len(), document.edges.len());
        }
        Err(anyhow!("{} problem(s) found", problems.len()))
    }

    /// Handle the import command
    fn import_command(
        &self,
        input: Option<PathBuf>,
        graph: Option<PathBuf>,
        output: Option<PathBuf>,
        status: u16,
        verbose: bool,
    ) -> Result<()> {
        let body = self.read_input(input)?;

        // Surface upstream failures with their wire shape before touching the graph
        if let Err(err) = process_response(status, &body) {
            let wire = serde_json::to_string(&err.to_body())?;
            return Err(anyhow!("{} {}", err.status(), wire));
        }

        let document = match graph {
            Some(path) => self.read_document(Some(path))?,
            None => GraphDocument::default(),
        };
        let config = CanvasConfig::default().with_direction(document.direction);
        let (merged, summary) = import_into_document(&document, &body, &config)?;

        eprintln!(
            "Imported: {} nodes added, {} reused, {} edges added",
            summary.nodes_added, summary.nodes_reused, summary.edges_added
        );
        if verbose {
            eprintln!(
                "Skipped: {} unresolved, {} self-loops, {} duplicates",
                summary.skipped_unresolved, summary.skipped_self_loops, summary.skipped_duplicates
            );
        }

        let json = serde_json::to_string_pretty(&merged)?;
        self.write_output(output, &json)
    }

    /// Handle the summary command
    fn summary_command(&self, input: Option<PathBuf>, color: ColorChoice) -> Result<()> {
        let document = self.read_document(input)?;
        let colorize = should_colorize(color);
        let ranks = assign_ranks(&document.nodes, &document.edges)?;
        print!("{}", render_summary(&document, &ranks, colorize));
        io::stdout().flush()?;
        Ok(())
    }

    /// Handle the kinds command
    fn kinds_command(&self, json: bool) -> Result<()> {
        if json {
            let kinds = serde_json::json!({
                "node_kinds": NodeKind::ALL.iter().map(|k| k.as_str()).collect::<Vec<_>>(),
                "relationship_kinds": RelationshipKind::BUILT_IN
                    .iter()
                    .map(|k| k.as_str())
                    .collect::<Vec<_>>(),
                "dialog_choices": RelationshipKind::DIALOG_CHOICES
                    .iter()
                    .map(|choice| serde_json::json!({
                        "label": choice,
                        "type": RelationshipKind::from_dialog_choice(choice),
                    }))
                    .collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&kinds)?);
        } else {
            println!("Node kinds:");
            for kind in NodeKind::ALL {
                let marker = if kind.is_pesc_factor() { "  (PESC)" } else { "" };
                println!("  {}{}", kind, marker);
            }
            println!();
            println!("Relationship kinds:");
            for kind in RelationshipKind::BUILT_IN {
                println!("  {}", kind);
            }
            println!("  (any other tag is kept as a custom relationship)");
            println!();
            println!("Relationship dialog:");
            let width = column_width("", RelationshipKind::DIALOG_CHOICES.iter().copied());
            for choice in RelationshipKind::DIALOG_CHOICES {
                println!("  {}  {}", pad(choice, width), RelationshipKind::from_dialog_choice(choice));
            }
        }
        Ok(())
    }

    fn read_document(&self, input: Option<PathBuf>) -> Result<GraphDocument> {
        let raw = self.read_input(input)?;
        let document: GraphDocument =
            serde_json::from_str(&raw).context("Failed to parse graph document")?;
        debug!(
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            "Read graph document"
        );
        Ok(document)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, &content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

/// Determine if stdout output should be colorized
fn should_colorize(color: ColorChoice) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            crossterm::tty::IsTty::is_tty(&std::io::stdout())
        }
    }
}

/// Pad `text` with spaces to `width` terminal columns
fn pad(text: &str, width: usize) -> String {
    let used = unicode_width::UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(unicode_width::UnicodeWidthStr::width)
        .chain(std::iter::once(unicode_width::UnicodeWidthStr::width(header)))
        .max()
        .unwrap_or(0)
}

/// Render the node and edge tables
///
/// Columns are padded before colouring so escape codes never count towards
/// the width.
pub fn render_summary(document: &GraphDocument, ranks: &[usize], colorize: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Graph: {} nodes, {} edges ({})\n",
        document.nodes.len(),
        document.edges.len(),
        document.direction
    ));

    if !document.nodes.is_empty() {
        let id_w = column_width("ID", document.nodes.iter().map(|n| n.id.as_str()));
        let kind_w = column_width("KIND", document.nodes.iter().map(|n| n.kind.as_str()));
        let label_w = column_width("LABEL", document.nodes.iter().map(|n| n.label.as_str()));

        out.push('\n');
        out.push_str(&format!(
            "{}  {}  {}  RANK\n",
            pad("ID", id_w),
            pad("KIND", kind_w),
            pad("LABEL", label_w)
        ));
        for (node, rank) in document.nodes.iter().zip(ranks) {
            let kind = pad(node.kind.as_str(), kind_w);
            let kind = if colorize {
                paint_kind(node.kind, &kind)
            } else {
                kind
            };
            out.push_str(&format!(
                "{}  {}  {}  {}\n",
                pad(&node.id, id_w),
                kind,
                pad(&node.label, label_w),
                rank
            ));
        }
    }

    if !document.edges.is_empty() {
        let arrows: Vec<String> = document
            .edges
            .iter()
            .map(|e| format!("{} → {}", e.source, e.target))
            .collect();
        let edge_w = column_width("EDGE", arrows.iter().map(String::as_str));
        let kind_w = column_width("RELATIONSHIP", document.edges.iter().map(|e| e.kind.as_str()));

        out.push('\n');
        out.push_str(&format!(
            "{}  {}  LABEL\n",
            pad("EDGE", edge_w),
            pad("RELATIONSHIP", kind_w)
        ));
        for (edge, arrow) in document.edges.iter().zip(&arrows) {
            let kind = pad(edge.kind.as_str(), kind_w);
            let kind = if colorize {
                paint_relationship(&edge.kind, &kind)
            } else {
                kind
            };
            out.push_str(&format!(
                "{}  {}  {}\n",
                pad(arrow, edge_w),
                kind,
                edge.display_label()
            ));
        }
    }

    out
}
