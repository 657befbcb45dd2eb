//! Local HTTP origin standing in for steamcommunity.com.
//!
//! Text bodies may contain `{ORIGIN}`, which is replaced with the server's
//! `http://127.0.0.1:PORT` before responding.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread;

use tiny_http::{Header, Response, Server};

pub const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Path of the guide page served by [`TestOrigin::guide`].
pub const GUIDE_PATH: &str = "/sharedfiles/filedetails/?id=2501234567";

pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("{FIXTURES_DIR}/{name}")).expect("Failed to read fixture")
}

#[derive(Debug, Clone)]
pub struct Route {
    pub path: String,
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl Route {
    pub fn new(path: &str, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            content_type: content_type.to_string(),
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub user_agent: Option<String>,
}

pub struct TestOrigin {
    pub origin: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl TestOrigin {
    /// Serve `routes` on a random local port; unknown paths get a 404.
    pub fn start(routes: Vec<Route>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("Failed to bind test server");
        let port = server
            .server_addr()
            .to_ip()
            .map(|a| a.port())
            .expect("Test server has no port");
        let origin = format!("http://127.0.0.1:{port}");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        let base = origin.clone();

        thread::spawn(move || {
            for request in server.incoming_requests() {
                let path = request.url().to_string();
                let user_agent = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("User-Agent"))
                    .map(|h| h.value.as_str().to_string());
                log.lock().unwrap().push(Recorded {
                    path: path.clone(),
                    user_agent,
                });

                let response = match routes.iter().find(|r| r.path == path) {
                    Some(route) => {
                        let body = match std::str::from_utf8(&route.body) {
                            Ok(text) if text.contains("{ORIGIN}") => {
                                text.replace("{ORIGIN}", &base).into_bytes()
                            }
                            _ => route.body.clone(),
                        };
                        let content_type =
                            Header::from_bytes(&b"Content-Type"[..], route.content_type.as_bytes())
                                .unwrap();
                        Response::from_data(body)
                            .with_status_code(route.status)
                            .with_header(content_type)
                    }
                    None => Response::from_string("not found").with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });

        Self { origin, requests }
    }

    /// The guide fixture with its images.
    pub fn guide() -> Self {
        Self::start(vec![
            Route::new(GUIDE_PATH, "text/html; charset=utf-8", fixture("guide.html")),
            Route::new("/ugc/111/AAAA/", "image/jpeg", JPEG_BYTES),
            Route::new("/images/diagram.png", "image/png", PNG_BYTES),
        ])
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.origin)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

/// A local URL nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}
