//! modsum CLI - Convert, merge and inspect module summary files

mod logging;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgGroup, Parser, Subcommand};
use tracing::info;

use modsum_codec::{
    encode_with, read_summary_file, write_summary_file, EncodeOptions, SummaryFileError,
};
use modsum_merge::{MergeOptions, MergedStore};
use modsum_query::{export_yaml, import_yaml, DeadTableEntry, SummaryQuery};
use modsum_summary::{ModuleSummaryStore, SymbolId};

#[derive(Parser)]
#[command(name = "modsum")]
#[command(about = "Module summary tool", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert between binary summaries and YAML
    #[command(group(ArgGroup::new("source").required(true).args(["to_yaml", "from_yaml"])))]
    Convert {
        /// Binary summary to render as YAML
        #[arg(long, value_name = "PATH")]
        to_yaml: Option<PathBuf>,
        /// YAML summary to encode as a binary summary
        #[arg(long, value_name = "PATH")]
        from_yaml: Option<PathBuf>,
        /// Output file, or `-` for stdout
        #[arg(short, long)]
        output: PathBuf,
        /// Keep debug names in the binary output
        #[arg(long)]
        embed_debug_names: bool,
    },
    /// Merge summaries and compute liveness
    Merge {
        /// Input summary files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output file for the merged summary
        #[arg(short, long)]
        output: PathBuf,
        /// Keep debug names in the merged summary
        #[arg(long)]
        embed_debug_names: bool,
        /// Explain why the given merged function name is live
        #[arg(long, value_name = "SYMBOL")]
        print_live_trace: Option<String>,
    },
    /// Show information about a summary file
    Info {
        /// Input summary file
        input: PathBuf,
        /// Dump the whole store as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            to_yaml,
            from_yaml,
            output,
            embed_debug_names,
        } => {
            if let Some(input) = to_yaml {
                cmd_to_yaml(&input, &output);
            } else if let Some(input) = from_yaml {
                cmd_from_yaml(&input, &output, embed_debug_names);
            }
        }
        Commands::Merge {
            inputs,
            output,
            embed_debug_names,
            print_live_trace,
        } => cmd_merge(&inputs, &output, embed_debug_names, print_live_trace),
        Commands::Info { input, json } => cmd_info(&input, json),
    }
}

fn cmd_to_yaml(input: &Path, output: &Path) {
    let store = load_or_exit(input);
    let yaml = match export_yaml(&store) {
        Ok(yaml) => yaml,
        Err(e) => {
            eprintln!("error: {}: {}", input.display(), e);
            process::exit(1);
        }
    };
    if let Err(e) = write_output(output, yaml.as_bytes()) {
        eprintln!("error: {}: {}", output.display(), e);
        process::exit(1);
    }
}

fn cmd_from_yaml(input: &Path, output: &Path, embed_debug_names: bool) {
    let text = match fs::read_to_string(input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: {}: {}", input.display(), e);
            process::exit(1);
        }
    };
    let store = match import_yaml(&text) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("error: {}: {}", input.display(), e);
            process::exit(1);
        }
    };
    save_or_exit(output, &store, embed_debug_names);
}

fn cmd_merge(
    inputs: &[PathBuf],
    output: &Path,
    embed_debug_names: bool,
    print_live_trace: Option<String>,
) {
    let mut all_ok = true;
    let mut stores = Vec::new();

    for input in inputs {
        match read_summary_file(input) {
            Ok(store) => {
                info!(path = %input.display(), module = store.module_name(), "loaded summary");
                stores.push(store);
            }
            Err(e) => {
                report_file_error(&e);
                all_ok = false;
            }
        }
    }

    let refs: Vec<&ModuleSummaryStore> = stores.iter().collect();
    let mut merged = MergedStore::combine(&refs);
    let options = MergeOptions {
        trace_symbol: print_live_trace,
    };
    merged.propagate_liveness(&options);

    for diagnostic in merged.diagnostics() {
        eprintln!("warning[{}]: {}", diagnostic.code(), diagnostic);
    }
    if let Some(report) = merged.trace_report() {
        print!("{}", report);
    }

    info!(
        inputs = stores.len(),
        live = merged.store().functions().filter(|f| f.is_live()).count(),
        total = merged.store().functions().count(),
        "merged summaries"
    );

    save_or_exit(output, merged.store(), embed_debug_names);
    if !all_ok {
        process::exit(1);
    }
}

fn cmd_info(input: &Path, json: bool) {
    let store = load_or_exit(input);

    if json {
        match serde_json::to_string_pretty(&store) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let query = SummaryQuery::new(&store);
    let name = |id: SymbolId| store.symbols().get(id).unwrap_or("<unknown>");
    println!("module: {}", store.module_name());
    println!("symbols: {}", store.symbols().len());
    println!("types: {}", store.types().count());

    let (Ok(dead), Ok(entries)) = (query.dead_functions(), query.dead_table_entries()) else {
        println!("functions: {}", store.functions().count());
        println!("liveness: not computed");
        return;
    };

    println!(
        "functions: {} ({} live, {} dead)",
        store.functions().count(),
        query.live_count(),
        dead.len()
    );
    for function in dead {
        println!("  dead: {}", name(function));
    }
    for entry in entries {
        match entry {
            DeadTableEntry::VtableSlot {
                ty,
                slot,
                implementation,
            } => println!(
                "  dead vtable slot: {}[{}] -> {}",
                name(ty),
                slot,
                name(implementation)
            ),
            DeadTableEntry::Witness {
                ty,
                requirement,
                implementation,
            } => println!(
                "  dead witness: {} {} -> {}",
                name(ty),
                name(requirement),
                name(implementation)
            ),
        }
    }
}

fn load_or_exit(path: &Path) -> ModuleSummaryStore {
    match read_summary_file(path) {
        Ok(store) => store,
        Err(e) => {
            report_file_error(&e);
            process::exit(1);
        }
    }
}

fn save_or_exit(path: &Path, store: &ModuleSummaryStore, embed_debug_names: bool) {
    let options = EncodeOptions { embed_debug_names };
    if path == Path::new("-") {
        if let Err(e) = write_output(path, &encode_with(store, &options)) {
            eprintln!("error: <stdout>: {}", e);
            process::exit(1);
        }
    } else if let Err(e) = write_summary_file(path, store, &options) {
        report_file_error(&e);
        process::exit(1);
    }
}

fn report_file_error(err: &SummaryFileError) {
    eprintln!("error: {}", err);
    if let SummaryFileError::Codec { source, .. } = err {
        if source.needs_regeneration() {
            eprintln!("note: regenerate this summary with the current compiler");
        }
    }
}

/// Write to a file, or to stdout when the path is `-`
fn write_output(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if path == Path::new("-") {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()
    } else {
        fs::write(path, bytes)
    }
}
