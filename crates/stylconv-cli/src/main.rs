use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use stylconv_codegen::{ConvertOptions, Dialect, UnsupportedPolicy};

#[derive(Parser)]
#[command(name = "stylconv")]
#[command(about = "stylconv: convert Stylus stylesheets to SCSS")]
#[command(version)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a .styl file
    Build {
        /// Input .styl file
        path: String,

        /// Target dialect
        #[arg(long, default_value = "scss")]
        to: String,

        /// Output file (`-` for stdout); defaults to the input name with the
        /// target extension
        #[arg(short, long)]
        out: Option<String>,

        /// Drop constructs that have no equivalent instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Check a .styl file for errors without writing output
    Check {
        /// Input .styl file
        path: String,

        /// Target dialect
        #[arg(long, default_value = "scss")]
        to: String,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Command::Build {
            path,
            to,
            out,
            lenient,
        } => cmd_build(&path, &to, out.as_deref(), lenient),
        Command::Check { path, to } => cmd_check(&path, &to),
    }
}

fn setup_logging(verbose_count: u8) {
    let log_level = match verbose_count {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .init();
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn options(to: &str, lenient: bool) -> ConvertOptions {
    let dialect: Dialect = match to.parse() {
        Ok(dialect) => dialect,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };
    let unsupported = if lenient {
        UnsupportedPolicy::Skip
    } else {
        UnsupportedPolicy::Error
    };
    ConvertOptions {
        dialect,
        unsupported,
    }
}

/// `<dir>/<stem>.<ext>` next to the source file.
fn default_output(path: &str, dialect: Dialect) -> PathBuf {
    let source = Path::new(path);
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    let dir = source.parent().unwrap_or(Path::new("."));
    dir.join(format!("{stem}.{}", dialect.extension()))
}

fn cmd_build(path: &str, to: &str, out: Option<&str>, lenient: bool) {
    let source = read_source(path);
    let options = options(to, lenient);
    log::info!("Converting {path} to {}", options.dialect);

    let output = match stylconv_codegen::convert(&source, &options) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error in {path}: {e}");
            std::process::exit(1);
        }
    };

    if out == Some("-") {
        println!("{output}");
        return;
    }

    let out_path = match out {
        Some(file) => PathBuf::from(file),
        None => default_output(path, options.dialect),
    };

    if let Err(e) = std::fs::write(&out_path, format!("{output}\n")) {
        eprintln!("Error writing {}: {e}", out_path.display());
        std::process::exit(1);
    }

    eprintln!("Built: {}", out_path.display());
}

fn cmd_check(path: &str, to: &str) {
    let source = read_source(path);

    let sheet = match stylconv_parser::Parser::parse(&source) {
        Ok(sheet) => sheet,
        Err(e) => {
            eprintln!("Parse error: {e}");
            std::process::exit(1);
        }
    };

    // Also run the converter to catch unsupported constructs
    if let Err(e) = stylconv_codegen::convert_stylesheet(&sheet, &options(to, false)) {
        eprintln!("Conversion error: {e}");
        std::process::exit(1);
    }

    eprintln!("OK: {path}");
}
