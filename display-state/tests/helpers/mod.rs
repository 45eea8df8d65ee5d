//! Test helpers: an in-process control server with scriptable faults

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use display_state::{refresh_channel, DeviceId, DeviceState, DisplayClient, RefreshRequests};

/// A parsed control server request
#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub query: HashMap<String, String>,
}

impl Request {
    fn parse(target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let query = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Self {
            path: path.to_string(),
            query,
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// The feature a request targets, with input select reported as "inputSelect"
    pub fn feature(&self) -> Option<&str> {
        if self.param("vcp") == Some("inputSelect") {
            Some("inputSelect")
        } else {
            self.param("feature")
        }
    }

    pub fn is_read(&self) -> bool {
        self.path == "/get"
    }
}

/// What the fake server does with one request
#[derive(Debug, Clone)]
pub enum Response {
    Reply(u16, String),
    /// Close the connection without answering
    Drop,
    /// Never answer
    Hang,
}

impl Response {
    pub fn ok(body: impl Into<String>) -> Self {
        Response::Reply(200, body.into())
    }
}

type Handler = dyn Fn(&Request) -> Response + Send + Sync;

/// A control server bound to a random local port
pub struct FakeDisplay {
    url: String,
    log: Arc<Mutex<Vec<Request>>>,
    task: JoinHandle<()>,
}

impl FakeDisplay {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let task_log = Arc::clone(&log);
        let task = tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&task_log);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&buf);
                    let target = head
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or("/");
                    let request = Request::parse(target);
                    log.lock().push(request.clone());

                    match handler(&request) {
                        Response::Reply(status, body) => {
                            let response = format!(
                                "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                status,
                                body.len(),
                                body
                            );
                            let _ = stream.write_all(response.as_bytes()).await;
                            let _ = stream.shutdown().await;
                        }
                        Response::Drop => drop(stream),
                        Response::Hang => {
                            tokio::time::sleep(Duration::from_secs(60)).await;
                        }
                    }
                });
            }
        });

        Self { url, log, task }
    }

    /// A server answering every read with fixed values and accepting every write
    pub async fn healthy(volume: &str, brightness: &str, mute: &str, source: &str) -> Self {
        let (volume, brightness, mute, source) = (
            volume.to_string(),
            brightness.to_string(),
            mute.to_string(),
            source.to_string(),
        );
        Self::start(move |req| {
            if !req.is_read() {
                return Response::ok("");
            }
            match req.feature() {
                Some("volume") => Response::ok(volume.clone()),
                Some("brightness") => Response::ok(brightness.clone()),
                Some("mute") => Response::ok(mute.clone()),
                Some("inputSelect") => Response::ok(source.clone()),
                _ => Response::Reply(404, String::new()),
            }
        })
        .await
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<Request> {
        self.log.lock().clone()
    }

    /// Number of reads of one feature seen so far
    pub fn reads_of(&self, feature: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|r| r.is_read() && r.feature() == Some(feature))
            .count()
    }

    pub fn writes(&self) -> Vec<Request> {
        self.log
            .lock()
            .iter()
            .filter(|r| r.path == "/set")
            .cloned()
            .collect()
    }
}

impl Drop for FakeDisplay {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Build a device pointed at `url`, returning the request receiver too
pub fn device_for(url: &str, timeout: Duration) -> (Arc<DeviceState>, RefreshRequests) {
    let client = DisplayClient::new(url).unwrap();
    let (signal, requests) = refresh_channel();
    let device = DeviceState::new(DeviceId::new("DELL"), client, timeout, signal);
    (Arc::new(device), requests)
}
