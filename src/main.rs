use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use dialoguer::FuzzySelect;
use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use vidascii::{
    output, AppConfig, ConversionOptions, LastFrame, ProgressPhase, VideoAsciiConverter, VideoOptions,
};
use walkdir::WalkDir;

const DEFAULT_VIDEO: &str = "video.mp4";

static CANCELLED: AtomicBool = AtomicBool::new(false);

fn parse_step(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("step must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "vidascii",
    version,
    about = "Pre-render a video as a sequence of ASCII art frames.",
    override_usage = "vidascii -v my_video.mp4 -w 120 -h 40 -o 120",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// Video file, or a directory of still frames
    #[arg(short = 'v', long = "video", value_name = "FILE")]
    video: Option<PathBuf>,

    /// Frame width in glyphs [default: 90]
    #[arg(short = 'w', long)]
    width: Option<u32>,

    /// Frame height in rows, 0 keeps the aspect ratio [default: 32]
    #[arg(short = 'h', long)]
    height: Option<u32>,

    /// Video frames per ASCII frame [default: 1]
    #[arg(short = 's', long, value_parser = parse_step)]
    step: Option<usize>,

    /// Only print video info
    #[arg(short = 'i', long = "info", default_value_t = false)]
    info: bool,

    /// No block characters (also accepted as -nb)
    #[arg(long = "nb", default_value_t = false)]
    no_block: bool,

    /// Length in frames, 0 means the whole video
    #[arg(short = 'l', long, default_value_t = 0)]
    length: usize,

    /// Offset in frames
    #[arg(short = 'o', long, default_value_t = 0)]
    offset: usize,

    /// Also sample the final frame of the window
    #[arg(long, default_value_t = false)]
    include_last: bool,

    /// Worker threads, 0 uses one per CPU
    #[arg(long)]
    jobs: Option<usize>,

    /// Named preset from the config file
    #[arg(long)]
    preset: Option<String>,

    /// Config file (TOML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file [default: <input>.txt]
    #[arg(long)]
    out: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,
}

/// `-nb` is a multi-letter short flag, which clap cannot express directly.
fn normalized_args() -> Vec<OsString> {
    std::env::args_os()
        .map(|arg| if arg == "-nb" { OsString::from("--nb") } else { arg })
        .collect()
}

fn main() -> Result<()> {
    let argv = normalized_args();
    if argv.len() < 2 {
        Args::command().print_help()?;
        println!();
        return Ok(());
    }
    let args = Args::parse_from(argv);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level.as_str())).init();

    let cfg = AppConfig::load(args.config.as_deref())?;
    let converter = VideoAsciiConverter::with_config(cfg.clone())?;
    let preset_name = args.preset.as_deref().unwrap_or(cfg.default_preset.as_str());
    let preset = cfg.preset(preset_name)?;

    let input = resolve_input(args.video.clone())?;

    if args.info {
        let info = converter.video_info(&input)?;
        println!("{}", info);
        return Ok(());
    }

    let conv_opts = ConversionOptions {
        width: args.width.unwrap_or(preset.width),
        height: args.height.unwrap_or(preset.height),
        no_block: args.no_block,
    };

    let mut video_opts = VideoOptions::default()
        .with_offset(args.offset)
        .with_step(args.step.unwrap_or(preset.step))
        .with_length(args.length)
        .with_last_frame(if args.include_last {
            LastFrame::Include
        } else {
            LastFrame::Exclude
        });
    if let Some(jobs) = args.jobs {
        video_opts = video_opts.with_jobs(jobs);
    }

    if let Err(e) = ctrlc::set_handler(|| {
        CANCELLED.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, finishing with the frames converted so far...");
    }) {
        log::warn!("could not install Ctrl+C handler: {}", e);
    }

    let out_path = args.out.clone().unwrap_or_else(|| output::default_output_path(&input));

    let pb = ProgressBar::new(0);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
    {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => log::debug!("progress template rejected: {}", e),
    }
    pb.set_message("Converting frames");

    let written = converter.convert_video_with_progress(
        &input,
        &out_path,
        &conv_opts,
        &video_opts,
        Some(&CANCELLED),
        |progress| match progress.phase {
            ProgressPhase::ConvertingFrames => {
                pb.set_length(progress.total as u64);
                pb.set_position(progress.completed as u64);
            }
            ProgressPhase::Writing => pb.set_message("Writing"),
            ProgressPhase::Probing | ProgressPhase::Complete => {}
        },
    )?;
    pb.finish_with_message("Done");

    if CANCELLED.load(Ordering::SeqCst) {
        println!("\nCancelled: {} frames written to {}", written, out_path.display());
    } else {
        println!("\nASCII generation complete: {} frames written to {}", written, out_path.display());
    }
    Ok(())
}

/// The `-v` path, else `video.mp4`, else an interactive pick among the media
/// files of the current directory.
fn resolve_input(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    let default = PathBuf::from(DEFAULT_VIDEO);
    if default.exists() || !std::io::stdin().is_terminal() {
        return Ok(default);
    }

    let files = find_media_files();
    if files.is_empty() {
        return Ok(default);
    }
    let selection = FuzzySelect::with_theme(&dialoguer::theme::ColorfulTheme::default())
        .with_prompt(format!("{} not found, choose an input file", DEFAULT_VIDEO))
        .default(0)
        .items(&files)
        .interact()
        .context("selecting input file")?;
    Ok(PathBuf::from(&files[selection]))
}

fn find_media_files() -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(".")
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path().is_file()
                && e.path().extension().is_some_and(|ext| {
                    matches!(
                        ext.to_str().map(str::to_ascii_lowercase).as_deref(),
                        Some("mp4" | "mkv" | "mov" | "avi" | "webm" | "gif")
                    )
                })
        })
        .filter_map(|e| e.path().to_str().map(str::to_string))
        .collect();
    files.sort();
    files
}
