use anyhow::Result;
use clap::Parser;
use ext_icon_gen::icon_gen::{self, DEFAULT_COLOR, DEFAULT_LABEL};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(
    name = "ext-icon-gen",
    about = "Draw the PNG icon set (16/32/48/128 px) for a browser extension"
)]
struct Cli {
    /// Output directory. Defaults to the directory containing this executable.
    #[clap(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Icon sizes to generate, comma separated.
    #[clap(short, long, value_delimiter = ',', value_name = "SIZES")]
    sizes: Option<Vec<u32>>,

    /// Text drawn in the middle of the icon
    #[clap(long, default_value = DEFAULT_LABEL)]
    label: String,

    /// Background and text color (CSS color format, must be opaque)
    #[clap(long, default_value = DEFAULT_COLOR)]
    color: String,

    /// Preferred TrueType font file. Replaces the system font search.
    #[clap(long, value_name = "FILE")]
    font: Option<PathBuf>,
}

impl From<Cli> for icon_gen::Args {
    fn from(cli: Cli) -> Self {
        Self {
            output: cli.output,
            sizes: cli.sizes,
            label: cli.label,
            color: cli.color,
            font: cli.font,
        }
    }
}

#[cfg(feature = "render")]
fn run(args: icon_gen::Args) -> Result<()> {
    icon_gen::generate_icons(args)?;
    Ok(())
}

#[cfg(not(feature = "render"))]
fn run(_args: icon_gen::Args) -> Result<()> {
    println!("{}", icon_gen::MISSING_RENDERER_GUIDANCE);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    run(cli.into())
}
