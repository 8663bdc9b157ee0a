use anyhow::Context;
use clap::Parser;
use static_server::{
    SiteConfig,
    StaticServer,
    init_tracing,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Serves the game page and its deployment manifest", long_about = None)]
struct Args {
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Directory holding index.html and the page assets
    #[arg(short, long, default_value = "src")]
    root: PathBuf,

    /// Manifest served at /contractInfo.json (defaults to <root>/contractInfo.json)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    #[arg(short, long, default_value = "false")]
    tracing: bool,
}

async fn handle_interupt() {
    match tokio::signal::ctrl_c().await {
        Ok(_) => {
            tracing::info!("Received interrupt, exiting");
        }
        Err(_) => {
            tracing::warn!("Received interrupt error, exiting anyway");
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.tracing {
        init_tracing();
    }
    let mut site = SiteConfig::in_root(&args.root);
    if let Some(manifest) = args.manifest {
        site.manifest = manifest;
    }
    if !site.root.is_dir() {
        tracing::warn!("Root directory {} does not exist", site.root.display());
    }
    tracing::info!(
        "Serving {} with manifest {}",
        site.root.display(),
        site.manifest.display()
    );
    let server = StaticServer::new(site, Some(args.port))
        .with_context(|| format!("starting static server on port {}", args.port))?;
    println!("Server running on {}", server.base_url());
    println!("Access the game at: {}/", server.base_url());

    handle_interupt().await;
    drop(server);
    Ok(())
}
