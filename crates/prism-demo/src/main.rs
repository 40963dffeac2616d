mod app;
mod camera;
mod physics;

use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::window::{self, WindowConfig};

fn main() {
    init_logging(LoggingConfig::default());

    if let Err(err) = run() {
        // Fatal errors go to stdout so they are visible without a logger.
        println!("{err}");
        std::process::exit(1);
    }
}

fn run() -> prism_engine::Result<()> {
    prism_engine::time::verify_monotonic()?;

    let config = WindowConfig::new()
        .title("prism demo")
        .dimensions(1280, 720)
        .vsync(true);

    window::run(config, app::DemoApp::new())
}
