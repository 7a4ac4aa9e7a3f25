//! Local HTTP upstream the outbound clients can be pointed at in tests.

use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpResponse, HttpServer};

#[derive(Debug, Clone, Copy)]
pub enum Upstream {
    Status(u16),
    Json(&'static str),
    Stall(Duration),
}

async fn reply(upstream: web::Data<Upstream>) -> HttpResponse {
    match *upstream.get_ref() {
        Upstream::Status(code) => {
            HttpResponse::build(StatusCode::from_u16(code).unwrap()).finish()
        }
        Upstream::Json(body) => HttpResponse::Ok()
            .content_type("application/json")
            .body(body),
        Upstream::Stall(delay) => {
            actix_web::rt::time::sleep(delay).await;
            HttpResponse::Ok().finish()
        }
    }
}

pub struct UpstreamServer {
    pub url: String,
    handle: ServerHandle,
}

impl UpstreamServer {
    /// Binds an ephemeral port on loopback and serves `upstream` on every path.
    pub fn start(upstream: Upstream) -> Self {
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(upstream))
                .default_service(web::to(reply))
        })
        .workers(1)
        .disable_signals()
        .shutdown_timeout(0)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        UpstreamServer {
            url: format!("http://{addr}/"),
            handle,
        }
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

pub fn client_with_timeout(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder().timeout(timeout).build().unwrap()
}
