use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::Parser;
use oifits::{OiFitsViewer, OutputMode, ViewerOptions};

const EXIT_SEVERE: i32 = 1;
const EXIT_IO: i32 = 2;
const EXIT_USAGE: i32 = 3;

/// Check OIFITS files and describe them as XML or as a tab-separated
/// target summary.
#[derive(Debug, Parser)]
#[command(name = "oifits-viewer", version)]
struct Cli {
    /// XML output (default).
    #[arg(short = 'x', long = "xml", conflicts_with = "tsv")]
    xml: bool,

    /// Tab-separated target summary.
    #[arg(short = 't', long = "tsv", visible_alias = "csv")]
    tsv: bool,

    /// Only print the checker report.
    #[arg(short = 'c', long = "check")]
    check: bool,

    /// Include table rows (XML) or the file preamble (TSV).
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Beautify numbers.
    #[arg(short = 'f', long = "format")]
    format: bool,

    /// Log more; repeat for trace output.
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count)]
    debug: u8,

    /// OIFITS files, optionally gzipped.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

impl Cli {
    fn options(&self) -> ViewerOptions {
        ViewerOptions {
            mode: if self.tsv { OutputMode::Tsv } else { OutputMode::Xml },
            verbose: self.verbose,
            format: self.format,
            check_only: self.check,
        }
    }
}

fn setup_logging(debug: u8) {
    let mut builder = env_logger::Builder::new();
    builder.target(env_logger::Target::Stderr);
    builder.format_target(false);
    builder.filter_level(match debug {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    });
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    // A logger may already be installed when run() is called repeatedly.
    let _ = builder.try_init();
}

/// Process every path, writing descriptions to `out`. Returns the exit code:
/// the highest of 3 (usage), 2 (unreadable file), 1 (SEVERE diagnostics)
/// and 0.
fn run<W: Write>(args: &[String], out: &mut W) -> i32 {
    let argv = std::iter::once("oifits-viewer").chain(args.iter().map(String::as_str));
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = write!(out, "{e}");
            return 0;
        }
        Err(e) => {
            eprint!("{e}");
            return EXIT_USAGE;
        }
    };
    setup_logging(cli.debug);

    let viewer = OiFitsViewer::new(cli.options());
    let mut code = 0;
    for path in &cli.paths {
        match viewer.process(path) {
            Ok(output) => {
                log::info!(
                    "{}: {} severe, {} warnings",
                    path.display(),
                    output.nb_severe,
                    output.nb_warnings
                );
                if let Err(e) = out.write_all(output.text.as_bytes()) {
                    eprintln!("Error writing output: {e}");
                    return EXIT_IO;
                }
                if output.nb_severe > 0 {
                    code = code.max(EXIT_SEVERE);
                }
            }
            Err(e) => {
                eprintln!("{e}");
                code = code.max(EXIT_IO);
            }
        }
    }
    code
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let stdout = std::io::stdout();
    let code = run(&args, &mut stdout.lock());
    process::exit(code);
}
