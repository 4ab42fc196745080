mod app;
mod runtime;

use std::path::PathBuf;

pub use app::App;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let app = App::new(args.next(), args.next())?;
    app.run()?;

    Ok(())
}
