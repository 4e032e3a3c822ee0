//! Kiln Editor
//!
//! Headless driver: builds the editor world, optionally loads a scene,
//! plays it for a couple of seconds of simulated time and logs the result.
//!
//! ```text
//! kiln-editor [settings.json] [scene.txt]
//! ```

use anyhow::{Context, Result};
use kiln_editor::EditorApp;
use kiln_services::Settings;
use std::time::Duration;

const FRAMES: u32 = 120;
const FRAME_TIME: Duration = Duration::from_nanos(16_666_667);

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Kiln Editor v{}", kiln_core::VERSION);

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(&path).with_context(|| format!("loading settings from {path}"))?,
        None => Settings::default(),
    };

    let mut app = EditorApp::new(settings)
        .context("starting script runtime")?
        .with_sample_scene();
    if let Some(scene) = args.next() {
        app.load_scene(&scene)
            .with_context(|| format!("loading scene {scene}"))?;
    }
    tracing::info!("{}", app.status());

    app.play().context("entering play mode")?;
    let steps: u32 = (0..FRAMES).map(|_| app.frame(FRAME_TIME)).sum();
    tracing::info!(steps, "{}", app.status());
    app.stop().context("leaving play mode")?;

    for line in app.console().lines() {
        println!("{line}");
    }
    Ok(())
}
