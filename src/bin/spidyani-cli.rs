//! spidyani-cli - Command-line interface for SpidyAni containers
//!
//! Inspects containers and exports their frames and audio to GIF, PNG and WAV.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use spidyani::export::{ExportOptions, ExportReport, Exporter};
use spidyani::{read_summary, Algorithm, ContainerSummary, DecoderOptions};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "spidyani-cli")]
#[command(about = "Inspect and export SpidyAni animation containers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header fields and chunk statistics
    Info {
        /// Container to analyze
        input: PathBuf,
    },

    /// Export frames and audio
    Export {
        /// Container to export
        input: PathBuf,

        /// Write an animated GIF
        #[arg(long)]
        gif: Option<PathBuf>,

        /// Write one PNG per frame into this directory
        #[arg(long)]
        png_dir: Option<PathBuf>,

        /// Write the audio track as WAV
        #[arg(long)]
        wav: Option<PathBuf>,

        /// Frame encoder threads (defaults to the number of CPUs)
        #[arg(short, long)]
        workers: Option<usize>,

        /// GIF quantizer speed, 1 (best) to 30 (fastest)
        #[arg(long, default_value_t = 10)]
        gif_speed: i32,

        /// Skip the pre-scan; frame timing falls back to 17.89 fps
        #[arg(long)]
        no_prescan: bool,

        /// Force overwrite of output files
        #[arg(short, long)]
        force: bool,
    },
}

/// Output selection for the export command
#[derive(Debug, Default)]
struct ExportTargets {
    gif: Option<PathBuf>,
    png_dir: Option<PathBuf>,
    wav: Option<PathBuf>,
}

impl ExportTargets {
    fn is_empty(&self) -> bool {
        self.gif.is_none() && self.png_dir.is_none() && self.wav.is_none()
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Info { input } => show_file_info(&input, cli.verbose),
        Commands::Export {
            input,
            gif,
            png_dir,
            wav,
            workers,
            gif_speed,
            no_prescan,
            force,
        } => {
            let mut options = ExportOptions::new()
                .with_gif_speed(gif_speed)
                .with_decoder_options(DecoderOptions::default().with_prescan(!no_prescan));
            if let Some(workers) = workers {
                options = options.with_workers(workers);
            }
            export_file(
                &input,
                ExportTargets { gif, png_dir, wav },
                options,
                force,
                cli.verbose,
                cli.quiet,
            )
            .map(|_| ())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn check_output(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!(
            "Output file '{}' already exists. Use --force to overwrite",
            path.display()
        )
        .into());
    }
    Ok(())
}

/// Refuse to mix a new frame sequence into one already on disk
fn check_png_dir(dir: &Path, stem: &str, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if force || !dir.is_dir() {
        return Ok(());
    }
    let prefix = format!("{}_", stem);
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(&prefix) && name.ends_with(".png") {
            return Err(format!(
                "Output directory '{}' already holds frames for '{}'. Use --force to overwrite",
                dir.display(),
                stem
            )
            .into());
        }
    }
    Ok(())
}

fn export_file(
    input: &Path,
    targets: ExportTargets,
    options: ExportOptions,
    force: bool,
    verbose: bool,
    quiet: bool,
) -> Result<ExportReport, Box<dyn std::error::Error>> {
    // Check if input file exists
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }
    if targets.is_empty() {
        return Err("Nothing to export. Use --gif, --png-dir or --wav".into());
    }
    for path in targets.gif.iter().chain(targets.wav.iter()) {
        check_output(path, force)?;
    }
    if let Some(dir) = &targets.png_dir {
        let stem = input
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("frame");
        check_png_dir(dir, stem, force)?;
    }

    if verbose {
        println!("Exporting '{}'", input.display());
        println!(
            "Workers: {}, queue depth: {}",
            options.workers, options.queue_depth
        );
    }

    let start_time = Instant::now();
    // The exporter reports a broken chunk itself, after the frames before it
    let (summary, _) = ContainerSummary::scan_lenient(BufReader::new(File::open(input)?))?;

    let progress = if !quiet {
        let pb = ProgressBar::new(u64::from(summary.frames));
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        pb.set_message("Exporting...");
        Some(pb)
    } else {
        None
    };

    let mut exporter = Exporter::from_path(input)?.with_options(options);
    if let Some(path) = &targets.gif {
        exporter = exporter.add_gif(path)?;
    }
    if let Some(dir) = &targets.png_dir {
        exporter = exporter.add_png_dir(dir)?;
    }
    if let Some(path) = &targets.wav {
        exporter = exporter.add_wav(path)?;
    }
    if let Some(pb) = progress.clone() {
        exporter = exporter.on_progress(move |step| pb.set_position(u64::from(step.frames)));
    }

    let report = exporter.run();
    if let Some(ref pb) = progress {
        match &report {
            Ok(_) => pb.finish_with_message("Export complete"),
            Err(_) => pb.abandon_with_message("Export failed"),
        }
    }
    let report = report?;

    if !quiet {
        println!("✓ Export successful!");
        println!("  Frames: {}", report.frames);
        println!(
            "  Audio:  {} bytes ({:.2}s)",
            report.audio_bytes,
            report.audio_bytes as f64 / f64::from(spidyani::SAMPLE_RATE)
        );
        println!("  FPS:    {:.2}", report.fps);
        println!("  Time:   {:.2?}", start_time.elapsed());
    }

    Ok(report)
}

fn describe(summary: &ContainerSummary) -> Vec<(String, String)> {
    let header = &summary.header;
    let algorithm = match header.algorithm() {
        Algorithm::Type1 => "TYPE_1 (single-pixel literals)",
        Algorithm::Type2 => "TYPE_2 (literal runs)",
    };
    vec![
        (
            "Dimensions".into(),
            format!("{}x{}", header.width, header.height),
        ),
        ("Frames".into(), format!("{} announced, {} stored", header.frame_count, summary.frames)),
        ("Language".into(), header.language_code.to_string()),
        ("Algorithm".into(), algorithm.into()),
        ("LZSS".into(), if header.uses_lzss() { "yes" } else { "no" }.into()),
        (
            "Partial data".into(),
            if header.partial_data() { "yes" } else { "no" }.into(),
        ),
        (
            "Data chunks".into(),
            format!(
                "{} ({} stored without LZSS)",
                summary.data_chunks, summary.special_frames
            ),
        ),
        ("Palettes".into(), summary.palette_chunks.to_string()),
        (
            "Sound".into(),
            format!(
                "{} chunks, {} bytes ({:.2}s)",
                summary.sound_chunks,
                summary.sound_bytes,
                summary.audio_duration()
            ),
        ),
        ("FPS".into(), format!("{:.2}", summary.fps())),
        (
            "Audio delay".into(),
            format!("{} frames", summary.audio_frame_delay()),
        ),
    ]
}

fn show_file_info(input: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Check if input file exists
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    let summary = read_summary(input)?;

    println!("SpidyAni File Information:");
    println!("  File: {}", input.display());
    for (label, value) in describe(&summary) {
        println!("  {}: {}", label, value);
    }
    if verbose {
        println!("  Flags: {:#06x}", summary.header.flags);
        println!("  Header bytes: {}", hex_bytes(&summary.header.to_bytes()));
    }

    Ok(())
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use spidyani::{AnimationWriter, Header};
    use tempfile::tempdir;

    fn write_sample(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let header = Header::new(8, 4, 3, Algorithm::Type2, true);
        let mut writer = AnimationWriter::new(Vec::new(), header)?;
        writer.write_audio(&[0x80; 2000])?;
        for frame in 0..3u8 {
            let indices: Vec<u8> = (0..32u8).map(|i| i.wrapping_add(frame)).collect();
            writer.write_frame(&indices)?;
        }
        fs::write(path, writer.finish()?)?;
        Ok(())
    }

    #[test]
    fn test_export() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let input_path = dir.path().join("sample.ani");
        write_sample(&input_path)?;

        let targets = ExportTargets {
            gif: Some(dir.path().join("sample.gif")),
            png_dir: Some(dir.path().join("frames")),
            wav: Some(dir.path().join("sample.wav")),
        };
        let options = ExportOptions::new().with_workers(2);
        let report = export_file(&input_path, targets, options, false, false, true)?;

        assert_eq!(report.frames, 3);
        assert_eq!(report.audio_bytes, 2540);
        assert!(dir.path().join("sample.gif").exists());
        assert!(dir.path().join("frames").join("sample_00002.png").exists());
        assert!(dir.path().join("sample.wav").exists());

        Ok(())
    }

    #[test]
    fn test_refuses_overwrite() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let input_path = dir.path().join("sample.ani");
        write_sample(&input_path)?;
        let gif_path = dir.path().join("existing.gif");
        fs::write(&gif_path, b"keep")?;

        let targets = ExportTargets {
            gif: Some(gif_path.clone()),
            ..Default::default()
        };
        let result = export_file(&input_path, targets, ExportOptions::new(), false, false, true);
        assert!(result.is_err());
        assert_eq!(fs::read(&gif_path)?, b"keep");

        Ok(())
    }

    #[test]
    fn test_refuses_existing_png_frames() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let input_path = dir.path().join("sample.ani");
        write_sample(&input_path)?;
        let png_dir = dir.path().join("frames");
        fs::create_dir(&png_dir)?;
        let existing = png_dir.join("sample_00001.png");
        fs::write(&existing, b"keep")?;

        let targets = || ExportTargets {
            png_dir: Some(png_dir.clone()),
            ..Default::default()
        };
        let result = export_file(&input_path, targets(), ExportOptions::new(), false, false, true);
        assert!(result.is_err());
        assert_eq!(fs::read(&existing)?, b"keep");

        // Frames of another input do not block the export
        let other = dir.path().join("other.ani");
        write_sample(&other)?;
        export_file(&other, targets(), ExportOptions::new(), false, false, true)?;
        assert_eq!(fs::read(&existing)?, b"keep");

        let report = export_file(&input_path, targets(), ExportOptions::new(), true, false, true)?;
        assert_eq!(report.frames, 3);
        assert_ne!(fs::read(&existing)?, b"keep");

        Ok(())
    }

    #[test]
    fn test_describe() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let input_path = dir.path().join("sample.ani");
        write_sample(&input_path)?;

        let summary = read_summary(&input_path)?;
        let fields = describe(&summary);
        let value = |label: &str| {
            fields
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        assert_eq!(value("Dimensions"), "8x4");
        assert_eq!(value("Frames"), "3 announced, 3 stored");
        assert_eq!(value("Audio delay"), "0 frames");
        show_file_info(&input_path, true)?;

        Ok(())
    }
}
