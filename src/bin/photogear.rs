use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "photogear", version)]
struct Cli {
    /// Editor config JSON (defaults apply to missing fields).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a photo, add gear, and export `edited-image.png`.
    Decorate(DecorateArgs),
    /// Replay a session script; `export` actions write into the output dir.
    Run(RunArgs),
    /// Replay a session script and write the on-screen view, selection UI included.
    ///
    /// `export` actions still clear the selection but write no files.
    Preview(PreviewArgs),
    /// List the bundled gear.
    Gear,
}

#[derive(Parser, Debug)]
struct DecorateArgs {
    /// Background image.
    #[arg(long)]
    image: PathBuf,

    /// Gear to add (crown, saber-blue, saber-red). Repeatable.
    #[arg(long = "gear", value_parser = parse_gear)]
    gear: Vec<photogear::GearKind>,

    /// Custom overlay image or SVG. Repeatable.
    #[arg(long = "overlay")]
    overlay: Vec<PathBuf>,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Session script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Session script JSON.
    #[arg(long)]
    script: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Decorate(args) => cmd_decorate(config, args),
        Command::Run(args) => cmd_run(config, args),
        Command::Preview(args) => cmd_preview(config, args),
        Command::Gear => cmd_gear(),
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<photogear::EditorConfig> {
    Ok(match path {
        Some(p) => photogear::EditorConfig::from_json_file(p)?,
        None => photogear::EditorConfig::default(),
    })
}

fn parse_gear(s: &str) -> Result<photogear::GearKind, String> {
    s.parse().map_err(|e: photogear::GearError| e.to_string())
}

fn cmd_decorate(config: photogear::EditorConfig, args: DecorateArgs) -> anyhow::Result<()> {
    let mut editor = photogear::Editor::new(config)?;

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("read image '{}'", args.image.display()))?;
    editor.upload_background(&bytes)?;

    for kind in args.gear {
        editor.add_gear(kind)?;
    }
    for path in &args.overlay {
        let bytes =
            std::fs::read(path).with_context(|| format!("read overlay '{}'", path.display()))?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        editor.add_overlay_bytes(label, bytes)?;
    }

    let image = editor.export()?;
    let out = image.write_to_dir(&args.out_dir)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_run(config: photogear::EditorConfig, args: RunArgs) -> anyhow::Result<()> {
    let script = photogear::SessionScript::from_json_file(&args.script)?;
    let mut editor = photogear::Editor::new(config)?;
    let base_dir = args.script.parent().unwrap_or_else(|| Path::new("."));
    let report = photogear::replay(&mut editor, &script, base_dir, Some(&args.out_dir))?;
    for path in &report.exported {
        eprintln!("wrote {}", path.display());
    }
    if report.exported.is_empty() {
        eprintln!("script finished without an export action");
    }
    Ok(())
}

fn cmd_preview(config: photogear::EditorConfig, args: PreviewArgs) -> anyhow::Result<()> {
    let script = photogear::SessionScript::from_json_file(&args.script)?;
    let mut editor = photogear::Editor::new(config)?;
    let base_dir = args.script.parent().unwrap_or_else(|| Path::new("."));
    photogear::replay(&mut editor, &script, base_dir, None)?;

    let frame = editor.render_preview()?;
    let png = photogear::encode_png(frame)?;
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_gear() -> anyhow::Result<()> {
    for kind in photogear::GearKind::ALL {
        println!("{:<12} {}", kind.name(), kind.label());
    }
    Ok(())
}
