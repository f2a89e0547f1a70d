use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "orbview",
    author,
    version,
    about = "Animated orb render surface",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Clone, Default)]
pub struct RunArgs {
    /// Configuration file; defaults to `<config dir>/orbview/orb.toml`.
    #[arg(long, value_name = "FILE", env = "ORBVIEW_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Hue rotation in degrees applied to the orb palette.
    #[arg(long, value_name = "DEGREES", allow_negative_numbers = true, global = true)]
    pub hue: Option<f32>,

    /// Strength of the hover distortion.
    #[arg(long, value_name = "AMOUNT", global = true)]
    pub hover_intensity: Option<f32>,

    /// Backdrop color (`#rrggbb`, `rgb(...)`, `hsl(...)`).
    #[arg(long, value_name = "COLOR", global = true)]
    pub background: Option<String>,

    /// Keep the orb in its hovered state regardless of the pointer.
    #[arg(long, global = true)]
    pub force_hover: bool,

    /// Do not rotate the orb while it is hovered.
    #[arg(long, global = true)]
    pub no_rotate_on_hover: bool,

    /// Behave as if the primary input were a touch screen.
    #[arg(long, global = true)]
    pub touch: bool,

    /// Freeze animation time as if the user asked for reduced motion.
    #[arg(long, global = true)]
    pub reduced_motion: bool,

    /// Override the device pixel ratio reported by the display.
    #[arg(long, value_name = "RATIO", global = true)]
    pub device_pixel_ratio: Option<f64>,

    /// Window size in logical pixels (e.g. `600x600`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size, global = true)]
    pub size: Option<(u32, u32)>,

    /// Drive the session without a window or GPU and print a JSON report.
    #[arg(long)]
    pub headless: bool,

    /// Frames to deliver in headless mode.
    #[arg(long, value_name = "N", default_value_t = 120)]
    pub frames: u32,

    /// Synthetic time between headless frames.
    #[arg(long, value_name = "MILLISECONDS", default_value_t = 16)]
    pub frame_interval_ms: u64,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the effective configuration as JSON.
    Config,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WxH format, e.g. 600x600".to_string())?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_accepts_both_separators() {
        assert_eq!(parse_size("800x600"), Ok((800, 600)));
        assert_eq!(parse_size(" 32X16 "), Ok((32, 16)));
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("800").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn flags_parse_into_run_args() {
        let cli = Cli::try_parse_from([
            "orbview",
            "--hue",
            "-45",
            "--force-hover",
            "--no-rotate-on-hover",
            "--size",
            "320x240",
            "--headless",
            "--frames",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.run.hue, Some(-45.0));
        assert!(cli.run.force_hover);
        assert!(cli.run.no_rotate_on_hover);
        assert_eq!(cli.run.size, Some((320, 240)));
        assert!(cli.run.headless);
        assert_eq!(cli.run.frames, 3);
        assert!(cli.command.is_none());
    }

    #[test]
    fn config_subcommand_keeps_overrides() {
        let cli = Cli::try_parse_from(["orbview", "config", "--hue", "90"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Config)));
        assert_eq!(cli.run.hue, Some(90.0));
    }
}
