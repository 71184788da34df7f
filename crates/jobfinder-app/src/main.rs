use std::path::PathBuf;

use anyhow::Context as _;
use jobfinder_app::pages::ROUTES;
use jobfinder_app::{App, AppConfig, AppContext};
use web_time::Duration;

/// Walks every route headlessly and prints the final document.
///
/// Usage: `jobfinder [CONFIG.toml]`
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::discover(std::env::args_os().nth(1).map(PathBuf::from))
        .context("loading config")?;
    let settle = Duration::from_millis(config.transition.leave_ms + config.transition.enter_ms);

    let ctx = AppContext::from_config(config).context("building runtime")?;
    let app = App::start(ctx.clone()).context("starting app")?;
    ctx.runtime.event_loop.run_until_idle(settle);

    for path in ROUTES {
        app.router().navigate(path);
        ctx.runtime.event_loop.run_until_idle(settle);
        log::info!(
            "{path} -> {} ({})",
            app.router().active().unwrap_or_default(),
            ctx.runtime.document.title()
        );
    }

    let doc = &ctx.runtime.document;
    println!("{}", doc.outer_html(doc.document_element()));
    app.shutdown();
    Ok(())
}
