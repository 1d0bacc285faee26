use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use dvbsi::encoding::write_sections;
use dvbsi::{Base64Encodable, PsiTable, Section, load_table_config};
use log::info;

#[derive(Parser)]
#[command(name = "dvbsi")]
#[command(about = "Encode DVB/MPEG-2 PSI and SI tables into sections")]
#[command(version)]
struct Cli {
    /// JSON table description
    config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Hex)]
    format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log section splitting (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One upper-case hex line per section
    Hex,
    /// One base64 line per section
    Base64,
    /// Sections back to back, as raw bytes
    Binary,
}

fn write_output<W: Write>(sections: &[Section], format: OutputFormat, sink: &mut W) -> io::Result<()> {
    match format {
        OutputFormat::Hex => {
            for section in sections {
                writeln!(sink, "{}", section.encode_hex())?;
            }
        }
        OutputFormat::Base64 => {
            for section in sections {
                writeln!(sink, "{}", section.encode_base64())?;
            }
        }
        OutputFormat::Binary => {
            write_sections(sections, sink).map_err(|e| io::Error::other(e.to_string()))?;
        }
    }
    sink.flush()
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_module("dvbsi", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();

    let config = match load_table_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading {}: {}", cli.config.display(), e);
            process::exit(1);
        }
    };

    let table = match config.build() {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Error building table: {}", e);
            process::exit(1);
        }
    };

    let sections = match table.build_sections() {
        Ok(sections) => sections,
        Err(e) => {
            eprintln!("Error encoding table: {}", e);
            process::exit(1);
        }
    };
    info!(
        "table 0x{:02x}: {} section(s)",
        table.header().table_id(),
        sections.len()
    );

    let result = match &cli.output {
        Some(path) => File::create(path)
            .and_then(|file| write_output(&sections, cli.format, &mut BufWriter::new(file))),
        None => write_output(&sections, cli.format, &mut io::stdout().lock()),
    };

    if let Err(e) = result {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}
