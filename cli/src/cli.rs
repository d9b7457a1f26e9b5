use clap::{Parser, ValueHint};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(about, version, name = "pretty-turtle")]
/// Pretty prints RDF files as Turtle or N3
pub struct Args {
    /// File to read from
    ///
    /// If no file is given, stdin is read.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub from_file: Option<PathBuf>,
    /// The format of the file to read
    ///
    /// It can be an extension like "nt" or a MIME type like "application/n-triples".
    /// N3 input may contain formulas, variables and literal subjects.
    ///
    /// By default the format is guessed from the input file extension.
    #[arg(long, required_unless_present = "from_file")]
    pub from_format: Option<String>,
    /// Base IRI of the file to read
    #[arg(long, value_hint = ValueHint::Url)]
    pub from_base: Option<String>,
    /// File to write to
    ///
    /// If no file is given, stdout is written.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub to_file: Option<PathBuf>,
    /// The format to write, "ttl" or "n3" or their MIME types
    ///
    /// By default the format is guessed from the output file extension, or Turtle when writing
    /// to stdout.
    #[arg(long)]
    pub to_format: Option<String>,
    /// Base IRI to write IRIs relative to
    ///
    /// By default the base IRI of the input file is used.
    #[arg(long, value_hint = ValueHint::Url)]
    pub base: Option<String>,
    /// Writes an @base directive
    #[arg(long)]
    pub explicit_base: bool,
    /// Offers a prefix to the serializer, as "label=iri"
    ///
    /// Only prefixes that are actually used are declared. Can be repeated.
    #[arg(long = "prefix", value_name = "LABEL=IRI", value_parser = parse_prefix)]
    pub prefixes: Vec<(String, String)>,
    /// Do not reuse the prefixes declared in the input file
    #[arg(long)]
    pub no_input_prefixes: bool,
    /// Writes everything on a single line
    #[arg(long)]
    pub compact: bool,
    /// Sorts the output so that it does not depend on the order of the input statements
    #[arg(long)]
    pub ordered: bool,
    /// Writes log:isImpliedBy as "<=" in N3
    #[arg(long)]
    pub implied_by: bool,
    /// Verbosity of the logs written to stderr
    #[arg(long, default_value = "warn")]
    pub log_level: Level,
}

fn parse_prefix(value: &str) -> Result<(String, String), String> {
    let (label, iri) = value
        .split_once('=')
        .ok_or_else(|| format!("Expected LABEL=IRI, found '{value}'"))?;
    Ok((label.to_owned(), iri.to_owned()))
}
