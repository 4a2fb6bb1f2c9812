//! Clap argument definitions for the `quarry` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Faceted search query compiler and result decoder")]
pub struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Location of the catalog file, shared by every command.
#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Catalog file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub catalog: PathBuf,
}

/// A `CATEGORY=V1,V2` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    /// Filter category.
    pub category: String,
    /// Alternatives; `null` admits documents without the field.
    pub values: Vec<String>,
}

/// Parses `CATEGORY=V1,V2`.
fn parse_filter(s: &str) -> Result<FilterArg, String> {
    let (category, values) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=VALUES, got '{s}'"))?;
    if category.is_empty() {
        return Err(format!("missing category in '{s}'"));
    }
    Ok(FilterArg {
        category: category.to_string(),
        values: values.split(',').map(str::to_string).collect(),
    })
}

/// A `CATEGORY[:LIMIT]` facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetArg {
    /// Facet category.
    pub category: String,
    /// Maximum number of values to count.
    pub limit: Option<usize>,
}

/// Parses `CATEGORY[:LIMIT]`.
fn parse_facet(s: &str) -> Result<FacetArg, String> {
    let (category, limit) = match s.rsplit_once(':') {
        Some((category, limit)) => {
            let limit = limit
                .parse()
                .map_err(|_| format!("invalid facet limit '{limit}'"))?;
            (category, Some(limit))
        }
        None => (s, None),
    };
    if category.is_empty() {
        return Err(format!("missing category in '{s}'"));
    }
    Ok(FacetArg {
        category: category.to_string(),
        limit,
    })
}

/// A `GROUP=KEY` dynamic facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicFacetArg {
    /// Group or category of the dynamic family.
    pub group: String,
    /// Unencoded key, e.g. `new arrivals`.
    pub key: String,
}

/// Parses `GROUP=KEY`.
fn parse_dynamic_facet(s: &str) -> Result<DynamicFacetArg, String> {
    match s.split_once('=') {
        Some((group, key)) if !group.is_empty() && !key.is_empty() => Ok(DynamicFacetArg {
            group: group.to_string(),
            key: key.to_string(),
        }),
        _ => Err(format!("expected GROUP=KEY, got '{s}'")),
    }
}

/// Arguments for `quarry check`.
#[derive(Args, Debug, Clone)]
pub struct CheckCommand {
    #[command(flatten)]
    /// Catalog file location.
    pub catalog: CatalogArgs,

    /// File listing the engine's live field names, one per line
    #[arg(long, value_name = "FILE")]
    pub fields: Option<PathBuf>,
}

/// Arguments for `quarry compile`.
#[derive(Args, Debug, Clone)]
pub struct CompileCommand {
    #[command(flatten)]
    /// Catalog file location.
    pub catalog: CatalogArgs,

    /// Entity type to search
    #[arg(short, long)]
    pub entity: String,

    /// Free-text query; #tag tokens become tag filters
    #[arg(short, long)]
    pub query: Option<String>,

    /// Minimum-match setting, or "off" [default: 1]
    #[arg(long)]
    pub mm: Option<String>,

    /// Filter as CATEGORY=V1,V2 (can be specified multiple times)
    #[arg(short, long = "filter", value_parser = parse_filter)]
    pub filters: Vec<FilterArg>,

    /// Literal filter query; $alias is replaced by its field (can be specified multiple times)
    #[arg(long = "raw-filter")]
    pub raw_filters: Vec<String>,

    /// Facet as CATEGORY[:LIMIT] (can be specified multiple times)
    #[arg(long = "facet", value_parser = parse_facet)]
    pub facets: Vec<FacetArg>,

    /// Count every static facet
    #[arg(long)]
    pub all_facets: bool,

    /// Dynamic facet key as GROUP=KEY (can be specified multiple times)
    #[arg(long = "dynamic-facet", value_parser = parse_dynamic_facet)]
    pub dynamic_facets: Vec<DynamicFacetArg>,

    /// Sort key [default: relevance]
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Page size [default: 10]
    #[arg(short = 'n', long)]
    pub rows: Option<usize>,

    /// Page offset
    #[arg(long)]
    pub start: Option<usize>,

    /// Do not request highlighting
    #[arg(long)]
    pub no_highlight: bool,

    /// File listing the engine's live field names, one per line
    #[arg(long, value_name = "FILE")]
    pub fields: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `quarry decode`.
#[derive(Args, Debug, Clone)]
pub struct DecodeCommand {
    #[command(flatten)]
    /// Catalog file location.
    pub catalog: CatalogArgs,

    /// Entity type the response belongs to
    #[arg(short, long)]
    pub entity: String,

    /// Engine response in the engine's JSON layout
    #[arg(short, long, value_name = "FILE")]
    pub response: PathBuf,

    /// Page size the response was requested with; 0 skips spelling suggestions [default: 10]
    #[arg(short = 'n', long)]
    pub rows: Option<usize>,

    /// Document field holding the id
    #[arg(long, default_value = "id")]
    pub id_field: String,
}

/// Supported `quarry` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Load a catalog file and list what each entity declares
    Check(CheckCommand),

    /// Compile a search into engine request parameters
    Compile(CompileCommand),

    /// Decode an engine response into a typed result
    Decode(DecodeCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_values_split_on_commas() {
        let f = parse_filter("color=red,blue").unwrap();
        assert_eq!(f.category, "color");
        assert_eq!(f.values, vec!["red", "blue"]);
        assert!(parse_filter("color").is_err());
        assert!(parse_filter("=red").is_err());
    }

    #[test]
    fn facet_limit_is_optional() {
        assert_eq!(parse_facet("color").unwrap().limit, None);
        assert_eq!(parse_facet("color:5").unwrap().limit, Some(5));
        assert!(parse_facet("color:many").is_err());
        assert!(parse_facet(":5").is_err());
    }

    #[test]
    fn dynamic_facet_keeps_spaces() {
        let d = parse_dynamic_facet("tag=new arrivals").unwrap();
        assert_eq!(d.group, "tag");
        assert_eq!(d.key, "new arrivals");
        assert!(parse_dynamic_facet("tag=").is_err());
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from([
            "quarry",
            "-v",
            "compile",
            "--catalog",
            "c.toml",
            "--entity",
            "product",
            "--facet",
            "color:3",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Compile(cmd) = cli.command else {
            panic!("expected compile");
        };
        assert_eq!(cmd.facets[0].limit, Some(3));
    }
}
