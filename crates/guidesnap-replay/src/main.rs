//! Replay driver entry point.

use clap::Parser;
use guidesnap_replay::{ReplayResult, load_scene, load_script, replay, write_reports};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "guidesnap-replay", about = "Replay move gestures through the snapping engine")]
struct Cli {
    /// Scene file (JSON).
    scene: PathBuf,

    /// Gesture script (JSON).
    script: PathBuf,

    /// Write the scene after the replay to this file.
    #[arg(long, env = "GUIDESNAP_SCENE_OUT")]
    scene_out: Option<PathBuf>,
}

fn run(cli: &Cli) -> ReplayResult<()> {
    let mut scene = load_scene(&cli.scene)?;
    let script = load_script(&cli.script)?;
    log::info!("loaded {} blocks, {} events", scene.len(), script.events.len());

    let reports = replay(&mut scene, &script)?;
    write_reports(&reports, io::stdout().lock())?;

    if let Some(path) = &cli.scene_out {
        fs::write(path, scene.to_json()?)?;
        log::info!("wrote scene to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("replay failed: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
