use anyhow::Result;
use clap::Parser;
use pwa_icon_gen::icon_gen::{
    self, DEFAULT_END_COLOR, DEFAULT_FONT_PATH, DEFAULT_START_COLOR, DEFAULT_SUBTITLE,
    DEFAULT_TITLE,
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(
    name = "pwa-icon-gen",
    about = "Render gradient app icons with centered text labels"
)]
struct Args {
    /// Output directory.
    #[clap(short, long, value_name = "DIR", default_value = "./icons")]
    output: PathBuf,

    /// Icon sizes to render. Defaults to 72,96,128,144,152,192,384,512.
    #[clap(short, long, value_delimiter = ',', value_name = "SIZES")]
    sizes: Option<Vec<u32>>,

    /// Scalable font (TTF, OTF or TTC). The built-in bitmap font is used when it can't be loaded.
    #[clap(long, value_name = "FILE", default_value = DEFAULT_FONT_PATH)]
    font: PathBuf,

    /// Primary label drawn above the center
    #[clap(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// Secondary label drawn below the center
    #[clap(long, default_value = DEFAULT_SUBTITLE)]
    subtitle: String,

    /// Gradient color at the top (CSS color format)
    #[clap(long, default_value = DEFAULT_START_COLOR)]
    start_color: String,

    /// Gradient color at the bottom (CSS color format)
    #[clap(long, default_value = DEFAULT_END_COLOR)]
    end_color: String,

    /// Also write manifest-icons.json for a web app manifest
    #[clap(long)]
    manifest: bool,

    /// URL prefix of the icons in manifest-icons.json
    #[clap(long, value_name = "URL", default_value = "/icons/")]
    manifest_prefix: String,
}

impl From<Args> for icon_gen::Args {
    fn from(args: Args) -> Self {
        Self {
            output: args.output,
            sizes: args
                .sizes
                .unwrap_or_else(|| icon_gen::DEFAULT_SIZES.to_vec()),
            font: args.font,
            title: args.title,
            subtitle: args.subtitle,
            start_color: args.start_color,
            end_color: args.end_color,
            manifest: args.manifest,
            manifest_prefix: args.manifest_prefix,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    icon_gen::generate_icons(args.into())
}
