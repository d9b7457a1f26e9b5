use crate::cli::Args;
use anyhow::{bail, Context};
use clap::Parser;
use oxrdfio::{RdfFormat, RdfParser};
use oxttl::n3::{N3Parser, N3Quad, N3Term};
use pretty_turtle::{TurtleFormat, TurtleSerializer};
use pretty_turtle_model::{Quad, Term};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, stdin, stdout, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info};

mod cli;

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(io::stderr)
        .init();

    let from_format = if let Some(format) = &args.from_format {
        rdf_format_from_name(format)?
    } else if let Some(file) = &args.from_file {
        rdf_format_from_path(file)?
    } else {
        bail!("The --from-format option must be set when reading from stdin")
    };
    let to_format = if let Some(format) = &args.to_format {
        format
            .parse::<TurtleFormat>()
            .with_context(|| format!("The file format '{format}' cannot be written"))?
    } else if let Some(file) = &args.to_file {
        turtle_format_from_path(file)?
    } else {
        TurtleFormat::default()
    };

    let input = match &args.from_file {
        Some(from_file) => parse_input(
            from_format,
            args.from_base.as_deref(),
            File::open(from_file)
                .with_context(|| format!("Unable to open {}", from_file.display()))?,
        )?,
        None => parse_input(from_format, args.from_base.as_deref(), stdin().lock())?,
    };
    info!(
        quads = input.quads.len(),
        prefixes = input.prefixes.len(),
        "Parsed {from_format} input"
    );

    let serializer = configure_serializer(&args, to_format, &input)?;
    match &args.to_file {
        Some(to_file) => close_file_writer(
            serializer.serialize_to_writer(input.quads, BufWriter::new(File::create(to_file)?))?,
        ),
        None => serializer
            .serialize_to_writer(input.quads, stdout().lock())?
            .flush(),
    }?;
    Ok(())
}

/// The statements of the input file with the directives found while parsing it.
struct ParsedInput {
    quads: Vec<Quad>,
    prefixes: Vec<(String, String)>,
    base_iri: Option<String>,
}

fn parse_input(
    format: RdfFormat,
    base_iri: Option<&str>,
    reader: impl Read,
) -> anyhow::Result<ParsedInput> {
    // oxrdfio rejects formulas and variables, the N3 parser keeps them
    if format == RdfFormat::N3 {
        let mut parser = N3Parser::new();
        if let Some(base_iri) = base_iri {
            parser = parser
                .with_base_iri(base_iri)
                .with_context(|| format!("Invalid base IRI {base_iri}"))?;
        }
        let mut parser = parser.for_reader(reader);
        let mut quads = Vec::new();
        for quad in &mut parser {
            quads.push(n3_quad(quad?));
        }
        return Ok(ParsedInput {
            quads,
            prefixes: collect_prefixes(parser.prefixes()),
            base_iri: parser.base_iri().map(ToOwned::to_owned),
        });
    }

    let mut parser = RdfParser::from_format(format);
    if let Some(base_iri) = base_iri {
        parser = parser
            .with_base_iri(base_iri)
            .with_context(|| format!("Invalid base IRI {base_iri}"))?;
    }
    let mut parser = parser.for_reader(reader);
    let mut quads = Vec::new();
    for quad in &mut parser {
        quads.push(Quad::from(quad?));
    }
    Ok(ParsedInput {
        quads,
        prefixes: collect_prefixes(parser.prefixes()),
        base_iri: parser.base_iri().map(ToOwned::to_owned),
    })
}

fn collect_prefixes<'a>(prefixes: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<(String, String)> {
    prefixes
        .map(|(label, iri)| (label.to_owned(), iri.to_owned()))
        .collect()
}

fn n3_quad(quad: N3Quad) -> Quad {
    Quad::new(
        n3_term(quad.subject),
        n3_term(quad.predicate),
        n3_term(quad.object),
        quad.graph_name,
    )
}

fn n3_term(term: N3Term) -> Term {
    match term {
        N3Term::NamedNode(node) => node.into(),
        N3Term::BlankNode(node) => node.into(),
        N3Term::Literal(literal) => literal.into(),
        N3Term::Triple(triple) => (*triple).into(),
        N3Term::Variable(variable) => variable.into(),
    }
}

fn configure_serializer(
    args: &Args,
    format: TurtleFormat,
    input: &ParsedInput,
) -> anyhow::Result<TurtleSerializer> {
    let mut serializer = TurtleSerializer::from_format(format);
    if !args.no_input_prefixes {
        for (prefix_name, prefix_iri) in &input.prefixes {
            serializer = serializer
                .with_prefix(prefix_name, prefix_iri)
                .with_context(|| format!("Invalid prefix {prefix_name}: {prefix_iri}"))?;
        }
    }
    for (prefix_name, prefix_iri) in &args.prefixes {
        serializer = serializer
            .with_prefix(prefix_name, prefix_iri)
            .with_context(|| format!("Invalid prefix {prefix_name}: {prefix_iri}"))?;
    }
    if let Some(base_iri) = args.base.as_deref().or(input.base_iri.as_deref()) {
        debug!(base_iri, "Relativizing IRIs");
        serializer = serializer.with_base_iri(base_iri);
        if args.explicit_base {
            serializer = serializer.with_explicit_base_iri();
        }
    }
    if args.compact {
        serializer = serializer.compact();
    }
    if args.ordered {
        serializer = serializer.ordered();
    }
    if args.implied_by {
        serializer = serializer.with_implied_by();
    }
    Ok(serializer)
}

fn format_from_path<T>(
    path: &Path,
    from_extension: impl FnOnce(&str) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    if let Some(ext) = path.extension().and_then(OsStr::to_str) {
        from_extension(ext).map_err(|e| {
            e.context(format!(
                "Not able to guess the file format from file name extension '{ext}'"
            ))
        })
    } else {
        bail!(
            "The path {} has no extension to guess a file format from",
            path.display()
        )
    }
}

fn rdf_format_from_path(path: &Path) -> anyhow::Result<RdfFormat> {
    format_from_path(path, |ext| {
        RdfFormat::from_extension(ext)
            .with_context(|| format!("The file extension '{ext}' is unknown"))
    })
}

fn turtle_format_from_path(path: &Path) -> anyhow::Result<TurtleFormat> {
    format_from_path(path, |ext| {
        TurtleFormat::from_extension(ext)
            .with_context(|| format!("The file extension '{ext}' cannot be written"))
    })
}

fn rdf_format_from_name(name: &str) -> anyhow::Result<RdfFormat> {
    if let Some(t) = RdfFormat::from_extension(name) {
        return Ok(t);
    }
    if let Some(t) = RdfFormat::from_media_type(name) {
        return Ok(t);
    }
    bail!("The file format '{name}' is unknown")
}

fn close_file_writer(writer: BufWriter<File>) -> io::Result<()> {
    let mut file = writer
        .into_inner()
        .map_err(io::IntoInnerError::into_error)?;
    file.flush()?;
    file.sync_all()
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use anyhow::Result;
    use assert_cmd::Command;
    use assert_fs::prelude::*;
    use assert_fs::NamedTempFile;
    use predicates::prelude::*;

    fn cli_command() -> Command {
        let mut command = Command::new(env!("CARGO"));
        command
            .arg("run")
            .arg("--quiet")
            .arg("--bin")
            .arg("pretty-turtle");
        command.arg("--");
        command
    }

    #[test]
    fn cli_requires_input_format_for_stdin() {
        cli_command()
            .write_stdin("")
            .assert()
            .failure()
            .stdout("")
            .stderr(predicate::str::contains("--from-format"));
    }

    #[test]
    fn cli_pretty_prints_stdin() {
        cli_command()
            .arg("--from-format")
            .arg("ttl")
            .arg("--ordered")
            .write_stdin("@prefix schema: <http://schema.org/> .\n<http://example.com/me> schema:name \"Foo Bar\"@en ; a schema:Person .")
            .assert()
            .stdout("@prefix schema: <http://schema.org/> .\n\n<http://example.com/me> a schema:Person ;\n  schema:name \"Foo Bar\"@en .\n")
            .success();
    }

    #[test]
    fn cli_convert_file_with_base() -> Result<()> {
        let input_file = NamedTempFile::new("input.nt")?;
        input_file.write_str("<http://example.com/doc#me> <http://example.com/doc#knows> <http://example.com/doc#you> .\n")?;
        let output_file = NamedTempFile::new("output.ttl")?;
        cli_command()
            .arg("--from-file")
            .arg(input_file.path())
            .arg("--to-file")
            .arg(output_file.path())
            .arg("--base")
            .arg("http://example.com/doc")
            .arg("--explicit-base")
            .assert()
            .success();
        output_file.assert("@base <http://example.com/doc> .\n\n<#me> <#knows> <#you> .\n");
        Ok(())
    }

    #[test]
    fn cli_convert_n3_formulas() {
        cli_command()
            .arg("--from-format")
            .arg("n3")
            .arg("--to-format")
            .arg("n3")
            .write_stdin("@prefix : <http://example.com/ns#> . { :a :b :c } => { :a :d :c } .")
            .assert()
            .stdout("@prefix : <http://example.com/ns#> .\n\n{\n  :a :b :c .\n} => {\n    :a :d :c .\n  } .\n")
            .success();
    }

    #[test]
    fn cli_uses_given_prefixes() {
        cli_command()
            .arg("--from-format")
            .arg("ttl")
            .arg("--no-input-prefixes")
            .arg("--prefix")
            .arg("s=http://schema.org/")
            .arg("--compact")
            .write_stdin("@prefix schema: <http://schema.org/> . schema:a schema:b schema:c .")
            .assert()
            .stdout("@prefix s: <http://schema.org/> .s:a s:b s:c .")
            .success();
    }

    #[test]
    fn cli_rejects_named_graphs_in_turtle() {
        cli_command()
            .arg("--from-format")
            .arg("trig")
            .write_stdin("<http://example.com/g> { <http://example.com/s> <http://example.com/p> <http://example.com/o> }")
            .assert()
            .failure()
            .stdout("")
            .stderr(predicate::str::contains("default graph"));
    }

    #[test]
    fn clap_debug() {
        use clap::CommandFactory;

        Args::command().debug_assert()
    }
}
