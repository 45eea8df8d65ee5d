//! Test helpers: a stateful in-process control server

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use better_display::{ConfigEntry, EntryInput};

/// Values the fake monitor reports, plus fault switches
#[derive(Debug, Clone)]
pub struct FakeState {
    pub volume: String,
    pub brightness: String,
    pub mute: String,
    pub source: String,
    /// Drop every connection
    pub offline: bool,
    /// Answer writes with HTTP 500
    pub reject_writes: bool,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            volume: "0.3".to_string(),
            brightness: "0.7".to_string(),
            mute: "off".to_string(),
            source: "15".to_string(),
            offline: false,
            reject_writes: false,
        }
    }
}

/// A recorded request: path plus decoded query
#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub query: HashMap<String, String>,
}

impl Request {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn is_write(&self) -> bool {
        self.path == "/set"
    }
}

pub struct FakeMonitor {
    url: String,
    state: Arc<Mutex<FakeState>>,
    log: Arc<Mutex<Vec<Request>>>,
    task: JoinHandle<()>,
}

impl FakeMonitor {
    pub async fn start() -> Self {
        Self::with_state(FakeState::default()).await
    }

    pub async fn with_state(initial: FakeState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(Mutex::new(initial));
        let log = Arc::new(Mutex::new(Vec::new()));

        let task_state = Arc::clone(&state);
        let task_log = Arc::clone(&log);
        let task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let state = Arc::clone(&task_state);
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
                    let head = String::from_utf8_lossy(&buf).to_string();
                    let target = head
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or("/");
                    let request = parse(target);

                    let reply = handle(&mut state.lock(), &request);
                    log.lock().push(request);

                    if let Some((status, body)) = reply {
                        let response = format!(
                            "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            body.len(),
                            body
                        );
                        let _ = stream.write_all(response.as_bytes()).await;
                        let _ = stream.shutdown().await;
                    }
                });
            }
        });

        Self {
            url,
            state,
            log,
            task,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn update(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state.lock());
    }

    pub fn state(&self) -> FakeState {
        self.state.lock().clone()
    }

    pub fn writes(&self) -> Vec<Request> {
        self.log.lock().iter().filter(|r| r.is_write()).cloned().collect()
    }

    pub fn last_write(&self) -> Option<Request> {
        self.writes().pop()
    }

    pub fn request_count(&self) -> usize {
        self.log.lock().len()
    }

    /// Entry input pointing at this server
    pub fn input(&self, name: &str, sources: &str) -> EntryInput {
        EntryInput {
            device_name: name.to_string(),
            base_url: self.url.clone(),
            source_list: sources.to_string(),
        }
    }

    pub fn entry(&self, entry_id: &str, name: &str, sources: &str) -> ConfigEntry {
        let data = self.input(name, sources).validate().unwrap();
        ConfigEntry::new(entry_id, data)
    }
}

impl Drop for FakeMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn parse(target: &str) -> Request {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let query = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    Request {
        path: path.to_string(),
        query,
    }
}

fn handle(state: &mut FakeState, request: &Request) -> Option<(u16, String)> {
    if state.offline {
        return None;
    }

    let input_select = request.param("vcp") == Some("inputSelect");
    match request.path.as_str() {
        "/get" => {
            let value = if input_select {
                &state.source
            } else {
                match request.param("feature") {
                    Some("volume") => &state.volume,
                    Some("brightness") => &state.brightness,
                    Some("mute") => &state.mute,
                    _ => return Some((404, String::new())),
                }
            };
            Some((200, value.clone()))
        }
        "/set" => {
            if state.reject_writes {
                return Some((500, "rejected".to_string()));
            }
            if input_select {
                state.source = request.param("ddc").unwrap_or_default().to_string();
                return Some((200, String::new()));
            }
            let value = request.param("value").unwrap_or_default().to_string();
            match request.param("feature") {
                Some("volume") => state.volume = value,
                Some("brightness") => state.brightness = value,
                Some("mute") => state.mute = value,
                _ => return Some((404, String::new())),
            }
            Some((200, String::new()))
        }
        _ => Some((404, String::new())),
    }
}
