use crate::config::{Config, load_config};
use crate::layout::compute_layout;
use crate::layout_dump::{LayoutDump, write_layout_dump};
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{render_svg, write_output_svg};
use crate::roster::parse_roster;
use crate::theme::Theme;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "famtree", version, about = "Lay out and draw a family tree from a JSON5 roster")]
pub struct Args {
    /// Roster file (.json5/.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme name, themeVariables, layout)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Theme preset, overriding the config file
    #[arg(short = 't', long = "theme")]
    pub theme: Option<String>,

    /// Member key to highlight, overriding the roster's selection
    #[arg(short = 's', long = "select")]
    pub select: Option<String>,

    /// Measure card text with system fonts instead of the built-in width table
    #[arg(long = "fontMetrics")]
    pub font_metrics: bool,

    /// PNG fallback width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// PNG fallback height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// More logging on stderr (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = build_config(&args)?;
    let (source, base_dir) = read_input(args.input.as_deref())?;
    let mut roster = parse_roster(&source)?;
    if let Some(key) = &args.select {
        roster.selected = Some(key.clone());
    }
    roster.embed_photo_files(&base_dir)?;
    let built = roster.build()?;
    debug!(members = built.keys.len(), "roster replayed");

    let layout = compute_layout(&built.store, &config.theme, &config.layout)?;
    info!(
        people = layout.nodes.len(),
        levels = layout.levels.len(),
        width = layout.width,
        height = layout.height,
        "laid out family tree"
    );

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &built.store, &config.theme, &config.layout);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &layout, &built.store)?,
            None => {
                let dump = LayoutDump::from_layout(&layout, &built.store);
                println!("{}", serde_json::to_string_pretty(&dump)?);
            }
        },
        OutputFormat::Png => write_png(&args, &layout, &built.store, &config)?,
    }

    Ok(())
}

#[cfg(feature = "png")]
fn write_png(
    args: &Args,
    layout: &crate::layout::Layout,
    store: &crate::store::FamilyStore,
    config: &Config,
) -> Result<()> {
    let output = ensure_output(&args.output, "png")?;
    let svg = render_svg(layout, store, &config.theme, &config.layout);
    write_output_png(&svg, &output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(
    _args: &Args,
    _layout: &crate::layout::Layout,
    _store: &crate::store::FamilyStore,
    _config: &Config,
) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(name) = &args.theme {
        config.theme =
            Theme::from_name(name).with_context(|| format!("unknown theme `{name}`"))?;
    }
    if args.font_metrics {
        config.layout.fast_text_metrics = false;
    }
    config.render.width = args.width;
    config.render.height = args.height;
    Ok(config)
}

/// Returns the roster text and the directory photo paths resolve against.
fn read_input(path: Option<&Path>) -> Result<(String, PathBuf)> {
    if let Some(path) = path.filter(|path| *path != Path::new("-")) {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        return Ok((content, base));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, PathBuf::from(".")))
}

#[cfg(feature = "png")]
fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
