//! xmlmap CLI - bind XML documents into generic maps and print them as JSON.
//!
//! This is the main entry point for the xmlmap command-line application.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{debug, info};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use xmlmap::advance_to_sibling;
use xmlmap::prelude::*;

/// xmlmap - XML data binding tool
#[derive(Parser)]
#[command(name = "xmlmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// -v - info, -vv - debug, -vvv - trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind the document root into a generic element and print it as JSON
    Dump {
        /// Input XML file
        #[arg(env = "XMLMAP_INPUT")]
        input: PathBuf,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the namespace aliases assigned while binding a document
    Namespaces {
        /// Input XML file
        #[arg(env = "XMLMAP_INPUT")]
        input: PathBuf,
    },

    /// Print one JSON line per sibling element with the given name
    Split {
        /// Input XML file
        #[arg(env = "XMLMAP_INPUT")]
        input: PathBuf,

        /// Local name of the repeated element
        #[arg(short, long)]
        tag: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Dump { input, pretty } => {
            cmd_dump(&input, pretty)?;
        }
        Commands::Namespaces { input } => {
            cmd_namespaces(&input)?;
        }
        Commands::Split { input, tag } => {
            cmd_split(&input, &tag)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => return,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn open(path: &Path) -> Result<PullParser<BufReader<File>>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(PullParser::from_reader(BufReader::new(file)))
}

fn bind_document(path: &Path) -> Result<(GenericXml, NamespaceDictionary)> {
    let mut source = open(path)?;
    let mut dictionary = NamespaceDictionary::new();
    let mut root = GenericXml::new();

    let start = Instant::now();
    parse_element(&mut source, Some(Destination::from(&mut root)), &mut dictionary, None)
        .with_context(|| format!("Failed to bind {}", path.display()))?;
    info!("bound <{}> in {:?}", root.name(), start.elapsed());

    Ok((root, dictionary))
}

fn cmd_dump(input: &Path, pretty: bool) -> Result<()> {
    let (root, _) = bind_document(input)?;

    let mut document = serde_json::Map::new();
    document.insert(root.name().to_owned(), serde_json::to_value(&root)?);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if pretty {
        serde_json::to_writer_pretty(&mut out, &document)?;
    } else {
        serde_json::to_writer(&mut out, &document)?;
    }
    writeln!(out)?;
    out.flush()?;

    Ok(())
}

fn cmd_namespaces(input: &Path) -> Result<()> {
    let (_, dictionary) = bind_document(input)?;

    for (alias, uri) in dictionary.alias_to_uri() {
        if alias.is_empty() {
            println!("(default) {}", uri);
        } else {
            println!("{} {}", alias, uri);
        }
    }

    Ok(())
}

/// Stops the header parse at the first element with the given local name.
struct StopAtTag<'a> {
    tag: &'a str,
}

impl CustomizeParser for StopAtTag<'_> {
    fn stop_before_start_tag(&mut self, _namespace: &str, name: &str) -> bool {
        name == self.tag
    }
}

fn cmd_split(input: &Path, tag: &str) -> Result<()> {
    let mut source = open(input)?;
    let mut dictionary = NamespaceDictionary::new();

    let mut header = GenericXml::new();
    let mut stop = StopAtTag { tag };
    let outcome = parse_element(
        &mut source,
        Some(Destination::from(&mut header)),
        &mut dictionary,
        Some(&mut stop),
    )
    .context("Failed to read document header")?;
    debug!("header <{}>: {}", header.name(), Value::Element(header.clone()));

    if outcome != ParseOutcome::Stopped {
        info!("no <{}> element found", tag);
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let start = Instant::now();
    let mut count = 0usize;

    loop {
        if source.name() == tag {
            let mut element = GenericXml::new();
            parse_element(&mut source, Some(Destination::from(&mut element)), &mut dictionary, None)
                .with_context(|| format!("Failed to bind <{}> #{}", tag, count + 1))?;
            serde_json::to_writer(&mut out, &element)?;
            writeln!(out)?;
            count += 1;
        } else {
            debug!("skipping sibling <{}>", source.name());
            parse_element(&mut source, None, &mut dictionary, None)?;
        }

        if !advance_to_sibling(&mut source)? {
            break;
        }
    }
    out.flush()?;

    info!("wrote {} <{}> elements in {:?}", count, tag, start.elapsed());

    Ok(())
}
