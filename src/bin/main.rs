#[cfg(not(target_arch = "wasm32"))]
mod native {
    extern crate chatter;

    use std::sync::Arc;

    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use tracing_subscriber::EnvFilter;

    use chatter::config;
    use chatter::core::db;
    use chatter::core::store::{FileStore, KeyValueStore, MemoryStore};
    use chatter::AppState;

    mod adapter {
        use actix_web::HttpRequest;
        use spin_sdk::http::{Method, Request};

        pub fn actix_to_spin_request(req: &HttpRequest, body: actix_web::web::Bytes) -> Request {
            let method = match req.method().as_str() {
                "GET" => Method::Get,
                "POST" => Method::Post,
                "PUT" => Method::Put,
                "DELETE" => Method::Delete,
                "HEAD" => Method::Head,
                "OPTIONS" => Method::Options,
                "PATCH" => Method::Patch,
                _ => Method::Get,
            };

            let uri = req.uri().to_string();
            let mut builder = Request::builder();
            builder.method(method).uri(&uri);
            for (name, value) in req.headers() {
                if let Ok(value) = value.to_str() {
                    builder.header(name.as_str(), value);
                }
            }
            builder.body(body.to_vec()).build()
        }

        pub fn spin_to_actix_response(spin_resp: spin_sdk::http::Response) -> actix_web::HttpResponse {
            let status = actix_web::http::StatusCode::from_u16(*spin_resp.status())
                .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);

            let mut response = actix_web::HttpResponse::build(status);
            for (name, value) in spin_resp.headers() {
                if let Some(value) = value.as_str() {
                    response.insert_header((name, value));
                }
            }
            response.body(spin_resp.body().to_vec())
        }
    }

    fn open_store() -> anyhow::Result<Arc<dyn KeyValueStore>> {
        Ok(match config::data_dir() {
            Some(dir) => {
                tracing::info!(%dir, "using file store");
                Arc::new(FileStore::open(dir)?)
            }
            None => {
                tracing::info!("using in-memory store");
                Arc::new(MemoryStore::new())
            }
        })
    }

    fn init_state() -> anyhow::Result<AppState> {
        let store = open_store()?;
        db::initialize_collections(store.as_ref())?;
        if config::seed_demo_data() {
            db::seed_demo_data(store.as_ref())?;
        }
        AppState::from_env(store)
    }

    pub async fn run() -> std::io::Result<()> {
        let _ = dotenvy::dotenv();
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .init();

        let state = init_state().map_err(std::io::Error::other)?;
        let addr = config::bind_address();
        tracing::info!(%addr, "server listening");

        let data = web::Data::new(state);
        HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::route().to(handle_all))
        })
        .bind(addr)?
        .run()
        .await
    }

    async fn handle_all(state: web::Data<AppState>, req: HttpRequest, body: web::Bytes) -> HttpResponse {
        let spin_req = adapter::actix_to_spin_request(&req, body);

        match chatter::route(&state, spin_req).await {
            Ok(spin_resp) => adapter::spin_to_actix_response(spin_resp),
            Err(e) => {
                tracing::error!(error = %e, path = %req.path(), "request failed");
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({ "success": false, "message": "Internal server error" }))
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
