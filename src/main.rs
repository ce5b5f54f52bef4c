//! Grammar Studio CLI
//!
//! A thin import/export collaborator around the core: reads a grammar
//! document as JSON, normalizes its geometry, and writes it back out (or
//! dumps the derived dependency graph).
//!
//! Usage:
//!   grammar-studio [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>  Geometry configuration (TOML format)
//!   -g, --graph          Output the dependency graph instead of the document
//!   -d, --debug          Print a bounds tree to stderr
//!   -h, --help           Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;

use grammar_studio::{
    build_graph, import_document, GeometryConfig, GrammarDocument, Pattern,
};

#[derive(Parser)]
#[command(name = "grammar-studio")]
#[command(about = "Geometry normalizer for document-layout grammar files")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Geometry configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output the dependency graph instead of the normalized document
    #[arg(short, long)]
    graph: bool,

    /// Debug mode: print a bounds tree to stderr
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // If no input file and stdin is a terminal (interactive), show help
    if cli.input.is_none() && io::stdin().is_terminal() {
        eprintln!("grammar-studio: pass a grammar JSON file or pipe one to stdin");
        eprintln!("Try 'grammar-studio --help' for usage.");
        return;
    }

    let config = match &cli.config {
        Some(path) => match GeometryConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => GeometryConfig::default(),
    };

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let doc = match import_document(&source, &config) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if cli.debug {
        print_bounds_tree(&doc);
    }

    let output = if cli.graph {
        serde_json::to_string_pretty(&build_graph(&doc.patterns))
            .expect("graph serialization cannot fail")
    } else {
        match doc.to_json() {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    };
    println!("{}", output);
}

fn print_bounds_tree(doc: &GrammarDocument) {
    fn print_components(
        label: &str,
        components: Option<&indexmap::IndexMap<String, grammar_studio::model::ComponentPattern>>,
    ) {
        for (key, component) in components.into_iter().flatten() {
            let target = component.pattern.as_deref().unwrap_or("<unresolved>");
            match component.location.as_ref().and_then(|l| l.as_explicit()) {
                Some(f) => eprintln!(
                    "  {} {} -> {} left={} top={} w={:.1} h={:.1}",
                    label,
                    key,
                    target,
                    f.left.as_deref().unwrap_or("?"),
                    f.top.as_deref().unwrap_or("?"),
                    f.width.unwrap_or(0.0),
                    f.height.unwrap_or(0.0),
                ),
                None => eprintln!("  {} {} -> {} <symbolic>", label, key, target),
            }
        }
    }

    eprintln!("=== Bounds Debug ===");
    for (name, pattern) in &doc.patterns {
        print_pattern(name, pattern);
        print_components("inner", pattern.inner.as_ref());
        print_components("outer", pattern.outer.as_ref());
    }
    eprintln!("====================");
}

fn print_pattern(name: &str, pattern: &Pattern) {
    match pattern.editor_bounds {
        Some(b) => eprintln!("[{}] w={:.1} h={:.1}", name, b.width, b.height),
        None => eprintln!("[{}] <no bounds>", name),
    }
}
