//! Scripted HTTP server for exercising the token and storage endpoints.

use std::io::Read;
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Response, Server};

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
    pub authorization: Option<String>,
}

pub(crate) struct FakeServer {
    pub base_url: String,
    handle: JoinHandle<Vec<RecordedRequest>>,
}

impl FakeServer {
    /// Answer one request per `(status, json_body)` pair, in order, then stop
    pub(crate) fn start(responses: Vec<(u16, &str)>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let responses: Vec<(u16, String)> = responses
            .into_iter()
            .map(|(status, body)| (status, body.to_string()))
            .collect();

        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            for (status, body) in responses {
                let mut request = server.recv().unwrap();

                let mut request_body = String::new();
                request
                    .as_reader()
                    .read_to_string(&mut request_body)
                    .unwrap();
                let authorization = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.to_string());

                recorded.push(RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    body: request_body,
                    authorization,
                });

                let content_type =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(content_type);
                request.respond(response).unwrap();
            }
            recorded
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            handle,
        }
    }

    /// Wait for every scripted response to be served
    pub(crate) fn finish(self) -> Vec<RecordedRequest> {
        self.handle.join().unwrap()
    }
}

/// Client that never routes loopback traffic through an environment proxy
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
