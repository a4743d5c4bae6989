use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::{error, info, warn, LevelFilter};
use qoicodec::{QoiChannels, QoiColorSpace};

mod png;
mod qoi;

#[derive(Parser, Debug)]
#[command(version, about)]
struct CmdArgs {
    #[command(subcommand)]
    command: Command,

    #[clap(global = true)]
    paths: Vec<PathBuf>,

    /// Log more, repeat for even more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert png files to qoi and qoi files to png
    Convert {
        /// Colorspace recorded in the header of written qoi files
        #[arg(long, value_enum, default_value_t = ColorSpaceArg::Srgb)]
        colorspace: ColorSpaceArg,

        /// Channels of written files, auto picks rgba only when some pixel is not fully opaque
        #[arg(long, value_enum, default_value_t = ChannelsArg::Auto)]
        channels: ChannelsArg,

        /// Directory for the written files, defaults to the directory of each input
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Print the header and chunk statistics of qoi files
    Info,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ColorSpaceArg {
    Srgb,
    Linear,
}

impl From<ColorSpaceArg> for QoiColorSpace {
    fn from(value: ColorSpaceArg) -> Self {
        match value {
            ColorSpaceArg::Srgb => QoiColorSpace::SRgbWithLinearAlpha,
            ColorSpaceArg::Linear => QoiColorSpace::AllChannelsLinear,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ChannelsArg {
    Auto,
    Rgb,
    Rgba,
}

impl ChannelsArg {
    fn resolve(self, detected: QoiChannels) -> QoiChannels {
        match self {
            ChannelsArg::Auto => detected,
            ChannelsArg::Rgb => QoiChannels::Rgb,
            ChannelsArg::Rgba => QoiChannels::Rgba,
        }
    }
}

struct ConvertOptions {
    color_space: QoiColorSpace,
    channels: ChannelsArg,
    out_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CmdArgs::parse();

    let level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if args.paths.is_empty() {
        warn!("no paths given, nothing to do");
    }

    let mut failed = 0;
    match args.command {
        Command::Convert {
            colorspace,
            channels,
            out_dir,
        } => {
            let options = ConvertOptions {
                color_space: colorspace.into(),
                channels,
                out_dir,
            };
            for src in &args.paths {
                if let Err(err) = convert(src, &options) {
                    error!("{err:#}");
                    failed += 1;
                }
            }
        }
        Command::Info => {
            for src in &args.paths {
                if let Err(err) = print_info(src) {
                    error!("{err:#}");
                    failed += 1;
                }
            }
        }
    }

    if failed > 0 {
        error!("{failed} of {} files failed", args.paths.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn convert(src: &Path, options: &ConvertOptions) -> Result<()> {
    let Some(ext) = src.extension() else {
        bail!("skipping {}, the file extension was not found", src.display());
    };

    if ext == "png" {
        transcode_png_to_qoi(src, options)
    } else if ext == "qoi" {
        transcode_qoi_to_png(src, options)
    } else {
        bail!(
            "skipping {}, only png and qoi files can be converted",
            src.display()
        )
    }
}

/// `src` with its extension replaced, moved into the output directory if there is one
fn destination(src: &Path, ext: &str, out_dir: Option<&Path>) -> PathBuf {
    let dest = src.with_extension(ext);
    match (out_dir, dest.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => dest,
    }
}

fn transcode_png_to_qoi(src: &Path, options: &ConvertOptions) -> Result<()> {
    let png_bytes = std::fs::read(src).with_context(|| format!("reading {}", src.display()))?;
    let image = png::load(&png_bytes).with_context(|| format!("loading {}", src.display()))?;
    let channels = options.channels.resolve(image.channels);

    let out_dir = options.out_dir.as_deref();
    let dests: Vec<_> = match image.frames.as_slice() {
        [_] => vec![destination(src, "qoi", out_dir)],
        frames => (0..frames.len())
            .map(|idx| destination(src, &format!("{idx}.qoi"), out_dir))
            .collect(),
    };

    for (frame, dest) in image.frames.iter().zip(dests) {
        let qoi = qoi::save(channels, options.color_space, (image.width, image.height), frame)
            .with_context(|| format!("converting {}", src.display()))?;
        std::fs::write(&dest, qoi).with_context(|| format!("writing {}", dest.display()))?;
        info!("converted {} -> {}", src.display(), dest.display());
    }

    Ok(())
}

fn transcode_qoi_to_png(src: &Path, options: &ConvertOptions) -> Result<()> {
    let dest = destination(src, "png", options.out_dir.as_deref());
    let qoi_bytes = std::fs::read(src).with_context(|| format!("reading {}", src.display()))?;
    let (header, pixels) =
        qoi::load(&qoi_bytes).with_context(|| format!("loading {}", src.display()))?;

    let channels = options.channels.resolve(header.channels);
    let png_bytes = png::save(channels, (header.width, header.height), &pixels)
        .with_context(|| format!("converting {}", src.display()))?;
    std::fs::write(&dest, png_bytes).with_context(|| format!("writing {}", dest.display()))?;
    info!("converted {} -> {}", src.display(), dest.display());

    Ok(())
}

fn print_info(src: &Path) -> Result<()> {
    let qoi_bytes = std::fs::read(src).with_context(|| format!("reading {}", src.display()))?;
    let (header, stats) =
        qoi::info(&qoi_bytes).with_context(|| format!("inspecting {}", src.display()))?;

    println!("{}: {}", src.display(), qoi::describe(&header));
    println!("{stats}");
    Ok(())
}
