//! Generate the manifest for the yearly heatmap SVGs.
//!
//! Run with: cargo run --features cli --bin svg-manifest -- --assets-dir assets

use std::path::PathBuf;
use std::process::ExitCode;

use activity_atlas::manifest::{generate_manifest, write_manifest};
use clap::{Parser, ValueHint};
use log::error;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Generate a manifest for github*.svg heatmap files",
    long_about = None
)]
struct Cli {
    /// Directory containing github.svg and github_YYYY.svg
    #[arg(long, default_value = "assets", value_hint = ValueHint::DirPath)]
    assets_dir: PathBuf,

    /// Manifest output path
    #[arg(long, default_value = "assets/github_manifest.json", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Optional absolute base URL for generating direct file URLs
    #[arg(long, default_value = "")]
    base_url: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = generate_manifest(&cli.assets_dir, Some(cli.base_url.as_str()))
        .and_then(|manifest| write_manifest(&cli.output, &manifest));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
