use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::info;

use course_portal::api::ApiClient;
use course_portal::clock::SystemClock;
use course_portal::config::Config;
use course_portal::controller::PageContext;
use course_portal::dashboard::DashboardController;
use course_portal::sidebar::{DESKTOP_MIN_WIDTH, SidebarShell};
use course_portal::storage::FileStorage;
use course_portal::target::{DirectoryTarget, RenderTarget};
use course_portal::transport::HttpTransport;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Optional JSON config path, environment otherwise
    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => Config::from_file(Path::new(path))?,
        None => Config::from_env()?,
    };
    info!("portal client against {}", config.api_base);

    let transport = HttpTransport::new(&config.api_base, config.request_timeout())?;
    let api = ApiClient::new(transport).with_csrf_token(config.csrf_token.clone());
    let mut target = DirectoryTarget::new(&config.output_dir)?;

    let shell = SidebarShell::init(FileStorage::open(&config.state_file)?, DESKTOP_MIN_WIDTH);
    target.replace("layout", shell.layout_classes());

    let ctx = PageContext::new(api, target, Arc::new(SystemClock), &config)?;
    let mut dashboard = DashboardController::new(ctx, config.refresh_interval());
    dashboard.init().await;

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => dashboard.tick().await,
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    dashboard.teardown();
    info!("stopped, regions left in {}", config.output_dir.display());
    Ok(())
}
