use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use mp3stego::report::{self, DecodeRecord, EncodeRecord, Report};
use mp3stego::stego::{file_name_parts, recover::WIDTHS};
use mp3stego::{quality, Config, Decoder, Encoder, Mp3File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mp3stego", version, about = "Hide files in MP3 frame payloads")]
struct Cli {
    /// TOML file with defaults for key, width and flags
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging, including per-trial decode diagnostics
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide a file inside an MP3
    Encode {
        /// Cover MP3
        #[arg(short, long)]
        input: PathBuf,
        /// File to hide
        #[arg(short, long)]
        secret: PathBuf,
        /// Where to write the stego MP3
        #[arg(short, long, default_value = "stego.mp3")]
        output: PathBuf,
        /// Shared key
        #[arg(short, long)]
        key: Option<String>,
        /// LSBs per carrier byte (1-4)
        #[arg(short = 'n', long)]
        width: Option<u8>,
        /// Obfuscate the payload with the key
        #[arg(long)]
        encrypt: bool,
        /// Visit carrier bytes in key-derived order
        #[arg(long, conflicts_with = "sequential")]
        random_order: bool,
        /// Visit carrier bytes front to back
        #[arg(long)]
        sequential: bool,
        /// Write a JSON or CSV report
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Recover a hidden file using only the key
    Decode {
        /// Stego MP3
        #[arg(short, long)]
        input: PathBuf,
        /// Shared key
        #[arg(short, long)]
        key: Option<String>,
        /// Directory for the recovered file
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Try sequential order before key-derived order
        #[arg(long)]
        sequential_hint: bool,
        /// Write a JSON or CSV report
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Show how much an MP3 can hold
    Capacity {
        #[arg(short, long)]
        input: PathBuf,
        /// Only show this width
        #[arg(short = 'n', long)]
        width: Option<u8>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    config.debug |= cli.debug;
    init_tracing(config.debug);

    match cli.command {
        Command::Encode {
            input,
            secret,
            output,
            key,
            width,
            encrypt,
            random_order,
            sequential,
            report,
        } => {
            if key.is_some() {
                config.key = key;
            }
            if let Some(w) = width {
                config.width = w;
            }
            config.encrypt |= encrypt;
            if random_order {
                config.random_order = true;
            } else if sequential {
                config.random_order = false;
            }
            config.validate()?;
            encode(&config, &input, &secret, &output, report.as_deref())
        }
        Command::Decode {
            input,
            key,
            output_dir,
            sequential_hint,
            report,
        } => {
            if key.is_some() {
                config.key = key;
            }
            if sequential_hint {
                config.random_order = false;
            }
            config.validate_key()?;
            decode(&config, &input, &output_dir, report.as_deref())
        }
        Command::Capacity { input, width } => capacity(&input, width),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "mp3stego", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "mp3stego=debug" } else { "mp3stego=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn encode(config: &Config, input: &Path, secret: &Path, output: &Path, report_path: Option<&Path>) -> Result<()> {
    let encoder = Encoder::from_config(config).context("a key is required (--key or config)")?;

    let cover = std::fs::read(input).with_context(|| format!("failed to read input MP3 {}", input.display()))?;
    let payload = std::fs::read(secret).with_context(|| format!("failed to read secret file {}", secret.display()))?;
    let (name, ext) = file_name_parts(secret);

    println!(
        "{} {} ({}) - {} bytes",
        "Encoding".cyan().bold(),
        name,
        if ext.is_empty() { "no extension" } else { ext.as_str() },
        payload.len()
    );

    let outcome = encoder.encode(&cover, &payload, &name, &ext)?;
    std::fs::write(output, &outcome.mp3).with_context(|| format!("failed to write output file {}", output.display()))?;

    println!("{} {}", "Output file:".green().bold(), output.display());
    println!(
        "  bits written: {} of {} ({} LSB{})",
        outcome.stats.bits_written,
        outcome.stats.capacity_bits,
        config.width,
        if config.width == 1 { "" } else { "s" }
    );
    match (outcome.psnr, outcome.quality) {
        (Some(psnr), Some(label)) => {
            let label = label.to_string();
            let label = if quality::is_acceptable(psnr) { label.green() } else { label.red() };
            println!("  PSNR: {}  {}", quality::format_psnr(psnr), label);
        }
        _ => println!("  PSNR: {}", "unknown".yellow()),
    }

    if let Some(path) = report_path {
        report::generate(path, &Report::Encode(EncodeRecord::new(input, output, &outcome)))
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }
    Ok(())
}

fn decode(config: &Config, input: &Path, output_dir: &Path, report_path: Option<&Path>) -> Result<()> {
    let decoder = Decoder::from_config(config).context("a key is required (--key or config)")?;

    let data = std::fs::read(input).with_context(|| format!("failed to read input file {}", input.display()))?;
    let outcome = decoder.decode(&data)?;

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
    let target = unique_output_path(output_dir, &outcome.header.name, &outcome.header.ext);
    std::fs::write(&target, &outcome.payload)
        .with_context(|| format!("failed to write output file {}", target.display()))?;

    println!(
        "{} width={} order={} bytes={} file={}{}",
        "Decoded".green().bold(),
        outcome.width,
        if outcome.random_order { "random" } else { "sequential" },
        outcome.payload.len(),
        target.display(),
        if outcome.header.is_encrypted() { " (decrypted)" } else { "" }
    );

    if let Some(path) = report_path {
        report::generate(path, &Report::Decode(DecodeRecord::new(input, &target, &outcome)))
            .with_context(|| format!("failed to write report {}", path.display()))?;
    }
    Ok(())
}

fn capacity(input: &Path, width: Option<u8>) -> Result<()> {
    let data = std::fs::read(input).with_context(|| format!("failed to read input MP3 {}", input.display()))?;
    let file = Mp3File::parse(&data)?;

    let widths: Vec<u8> = match width {
        Some(w) if WIDTHS.contains(&w) => vec![w],
        Some(w) => bail!("width must be 1, 2, 3 or 4, got {}", w),
        None => WIDTHS.to_vec(),
    };

    println!(
        "{} frames, {} carrier bytes",
        file.frames.len().to_string().bold(),
        file.carrier_len().to_string().bold()
    );
    for w in widths {
        println!("  width {}: {} bytes", w, file.capacity(w));
    }
    Ok(())
}

/// A path in `dir` for the recovered file that does not overwrite anything.
///
/// Only the final component of `name` is used. Collisions become
/// `stem_1.ext`, `stem_2.ext`, ...
fn unique_output_path(dir: &Path, name: &str, ext: &str) -> PathBuf {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("extracted{}", ext));

    let candidate = dir.join(&base);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, suffix) = match Path::new(&base).extension() {
        Some(e) => {
            let suffix = format!(".{}", e.to_string_lossy());
            (base[..base.len() - suffix.len()].to_string(), suffix)
        }
        None => (base.clone(), String::new()),
    };

    let mut counter = 1;
    loop {
        let candidate = dir.join(format!("{}_{}{}", stem, counter, suffix));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_unique_output_path() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let first = unique_output_path(dir.path(), "secret.txt", ".txt");
        assert_eq!(first, dir.path().join("secret.txt"));

        std::fs::write(&first, b"x").expect("Should write");
        let second = unique_output_path(dir.path(), "secret.txt", ".txt");
        assert_eq!(second, dir.path().join("secret_1.txt"));

        std::fs::write(&second, b"x").expect("Should write");
        assert_eq!(
            unique_output_path(dir.path(), "secret.txt", ".txt"),
            dir.path().join("secret_2.txt")
        );
    }

    #[test]
    fn test_unique_output_path_stays_in_dir() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        assert_eq!(
            unique_output_path(dir.path(), "../../etc/passwd", ""),
            dir.path().join("passwd")
        );
        assert_eq!(unique_output_path(dir.path(), "", ".bin"), dir.path().join("extracted.bin"));
        assert_eq!(unique_output_path(dir.path(), "..", ""), dir.path().join("extracted"));
    }
}
