use actix_cors::Cors;
use actix_files::{
    Files,
    NamedFile,
};
use actix_web::{
    App,
    HttpRequest,
    HttpResponse,
    HttpServer,
    dev::{
        ServerHandle,
        ServiceRequest,
        ServiceResponse,
        fn_service,
    },
    guard,
    http::StatusCode,
    web,
};
use anyhow::Context;
use serde_json::json;
use std::{
    io,
    net::TcpListener,
    path::PathBuf,
    thread::JoinHandle,
};

pub const INDEX_FILE: &str = "index.html";

/// Where the served files live on disk.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    pub root: PathBuf,
    pub manifest: PathBuf,
}

impl SiteConfig {
    /// Serves `root`, with the manifest under `root/contractInfo.json`.
    pub fn in_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let manifest = root.join(deployments::MANIFEST_FILE);
        Self { root, manifest }
    }
}

pub struct StaticServer {
    base_url: String,
    server_handle: ServerHandle,
    server_thread: Option<JoinHandle<()>>,
}

impl StaticServer {
    /// Binds `127.0.0.1:<port>`; `None` picks an ephemeral port.
    pub fn new(site: SiteConfig, port: Option<u16>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port.unwrap_or(0)))
            .context("failed to bind HTTP listener for static server")?;
        let address = listener
            .local_addr()
            .context("failed to read listener address")?;
        let base_url = format!("http://{}", address);

        let site = web::Data::new(site);
        let server = HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .app_data(site.clone())
                .route("/health", web::get().to(handle_health))
                .route(
                    &format!("/{}", deployments::MANIFEST_FILE),
                    web::get().to(handle_manifest),
                )
                .service(
                    Files::new("/", &site.root)
                        .index_file(INDEX_FILE)
                        .guard(guard::Get())
                        .default_handler(fn_service(|req: ServiceRequest| async move {
                            let (req, _) = req.into_parts();
                            Ok::<_, actix_web::Error>(ServiceResponse::new(req, not_found().await))
                        })),
                )
                .default_service(web::to(not_found))
        })
        .listen(listener)
        .context("failed to start Actix server")?
        .run();

        let server_handle = server.handle();
        let server_thread = std::thread::spawn(move || {
            let sys = actix_web::rt::System::new();
            if let Err(e) = sys.block_on(server) {
                tracing::error!(error = %e, "static server stopped with error");
            }
        });

        tracing::info!("static server listening on {}", base_url);

        Ok(Self {
            base_url,
            server_handle,
            server_thread: Some(server_thread),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for StaticServer {
    fn drop(&mut self) {
        let _ = self.server_handle.stop(true);
        if let Some(thread) = self.server_thread.take() {
            let _ = thread.join();
        }
    }
}

fn error_body(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message }))
}

async fn not_found() -> HttpResponse {
    error_body(StatusCode::NOT_FOUND, "Route not found")
}

async fn handle_manifest(site: web::Data<SiteConfig>, req: HttpRequest) -> HttpResponse {
    match NamedFile::open_async(&site.manifest).await {
        Ok(file) => {
            tracing::info!("serving deployment manifest");
            file.into_response(&req)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %site.manifest.display(), "manifest not found");
            not_found().await
        }
        Err(e) => {
            tracing::error!(path = %site.manifest.display(), error = %e, "failed to open manifest");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong!")
        }
    }
}

async fn handle_health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
