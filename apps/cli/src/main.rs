use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use cuepoints_core::{EditorConfig, Project, Session, Surface, WavDecoder};
use tracing::info;

const USAGE: &str = "\
Usage:
  cuepoints render <audio.wav> [--cues <doc.json>] [--out <file.png>]
                   [--width <px>] [--height <px>] [--at <seconds>] [--config <file>]
  cuepoints list <doc.json>";

#[derive(Debug, PartialEq)]
enum Command {
    Render(RenderArgs),
    List { document: PathBuf },
}

#[derive(Debug, PartialEq)]
struct RenderArgs {
    audio: PathBuf,
    cues: Option<PathBuf>,
    out: PathBuf,
    width: Option<u32>,
    height: Option<u32>,
    at: Option<f64>,
    config: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some((command, rest)) = args.split_first() else {
        bail!("missing command\n{}", USAGE);
    };

    match command.as_str() {
        "list" => match rest {
            [document] => Ok(Command::List {
                document: PathBuf::from(document),
            }),
            _ => bail!("list takes exactly one document\n{}", USAGE),
        },
        "render" => parse_render(rest).map(Command::Render),
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }
}

fn parse_render(args: &[String]) -> Result<RenderArgs> {
    let mut audio = None;
    let mut render = RenderArgs {
        audio: PathBuf::new(),
        cues: None,
        out: PathBuf::from("waveform.png"),
        width: None,
        height: None,
        at: None,
        config: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .with_context(|| format!("{} needs a value", arg))
        };

        match arg.as_str() {
            "--cues" => render.cues = Some(PathBuf::from(value()?)),
            "--out" | "-o" => render.out = PathBuf::from(value()?),
            "--width" => render.width = Some(value()?.parse::<u32>().context("--width")?),
            "--height" => render.height = Some(value()?.parse::<u32>().context("--height")?),
            "--at" => render.at = Some(value()?.parse::<f64>().context("--at")?),
            "--config" => render.config = Some(PathBuf::from(value()?)),
            flag if flag.starts_with('-') => bail!("unknown option '{}'\n{}", flag, USAGE),
            path if audio.is_none() => audio = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument '{}'\n{}", extra, USAGE),
        }
    }

    let Some(audio) = audio else {
        bail!("render needs an audio file\n{}", USAGE);
    };
    render.audio = audio;
    Ok(render)
}

async fn render(args: RenderArgs) -> Result<()> {
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => EditorConfig::default_path(),
    };
    let mut config = EditorConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    if let Some(width) = args.width {
        config.canvas_width = width;
    }
    if let Some(height) = args.height {
        config.canvas_height = height;
    }

    let mut session = Session::new(config).context("Invalid configuration")?;
    session
        .load_audio(&WavDecoder::new(), &args.audio)
        .await
        .with_context(|| format!("Failed to load {:?}", args.audio))?;

    if let Some(cues) = &args.cues {
        let json = std::fs::read_to_string(cues)
            .with_context(|| format!("Failed to read {:?}", cues))?;
        let outcome = session
            .import_json(&json)
            .with_context(|| format!("Failed to import {:?}", cues))?;
        let report = &outcome.report;
        info!(
            "Imported {} cue(s) on {} page(s), skipped {}",
            report.cues,
            report.pages,
            report.skipped_cues
        );
        if let Some(expected) = outcome.relink {
            tracing::warn!("Cue document was made for '{}'", expected);
        }
    }

    if let Some(at) = args.at {
        let tick = session.on_playback_tick(at);
        info!("Playhead at {}", tick.timecode);
    }

    session.render_frame();
    write_png(session.surface(), &args.out)?;
    info!("Wrote {:?}", args.out);
    Ok(())
}

fn write_png(surface: &Surface, path: &Path) -> Result<()> {
    let pixels = surface.data().to_vec();
    let image = image::RgbaImage::from_raw(surface.width(), surface.height(), pixels)
        .context("Surface size does not match its pixel buffer")?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

fn list(document: &Path) -> Result<()> {
    let (mut project, report) = Project::load_from_file(document)
        .with_context(|| format!("Failed to open {:?}", document))?;

    if let Some(audio) = &project.audio_file_name {
        println!("Audio: {}", audio);
    }

    for index in 0..project.pages().len() {
        project.select_page(index)?;
        let (name, color) = match project.active_page() {
            Some(page) => (page.name.clone(), page.color),
            None => continue,
        };
        println!("{} [{}]", name, color);

        let store = project.cue_store();
        for (_, cue) in store.sorted_by_time() {
            println!(
                "  {}  {:<24} {}  {}",
                cue.time()?,
                cue.display_name(),
                cue.color,
                cue.note
            );
        }
    }

    if report.skipped_cues > 0 {
        println!(
            "({} cue(s) without a usable time were skipped)",
            report.skipped_cues
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter("info,cuepoints=debug")
        .init();

    info!("Starting Cuepoints v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_args(&args)? {
        Command::Render(render_args) => render(render_args).await,
        Command::List { document } => list(&document),
    }
}
