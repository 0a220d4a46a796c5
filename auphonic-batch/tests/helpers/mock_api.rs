//! Scripted in-memory implementation of `AuphonicApi`
//!
//! Productions receive their status sequence from the scripts queued with
//! [`MockApi::script_production`], in creation order. Once a sequence runs
//! out, its last status repeats.

use async_trait::async_trait;
use auphonic_batch::services::{AuphonicApi, DownloadedFile};
use auphonic_batch::{ClientError, ClientResult};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const WAITING: i64 = 1;
pub const ERROR: i64 = 2;
pub const DONE: i64 = 3;
pub const AUDIO_PROC: i64 = 4;
pub const AUDIO_ENC: i64 = 5;

/// One recorded API call
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub target: String,
    pub body: Option<Value>,
}

/// Behaviour of one production
#[derive(Debug, Clone)]
pub struct ScriptedProduction {
    pub statuses: Vec<i64>,
    pub download_url: Option<String>,
    pub error_message: Option<String>,
    pub output_count: usize,
}

impl ScriptedProduction {
    /// Runs through `statuses`, then reports DONE with `url`
    pub fn done_after(statuses: &[i64], url: &str) -> Self {
        let mut all = statuses.to_vec();
        all.push(DONE);
        Self {
            statuses: all,
            download_url: Some(url.to_string()),
            error_message: None,
            output_count: 1,
        }
    }

    /// Runs through `statuses`, then reports ERROR with `message`
    pub fn error_after(statuses: &[i64], message: &str) -> Self {
        let mut all = statuses.to_vec();
        all.push(ERROR);
        Self {
            statuses: all,
            download_url: None,
            error_message: Some(message.to_string()),
            output_count: 0,
        }
    }

    /// Reports `status` on every poll
    pub fn stuck_in(status: i64) -> Self {
        Self {
            statuses: vec![status],
            download_url: None,
            error_message: None,
            output_count: 0,
        }
    }

    pub fn with_output_count(mut self, count: usize) -> Self {
        self.output_count = count;
        self
    }
}

struct ProductionState {
    remaining: VecDeque<i64>,
    last: i64,
    script: ScriptedProduction,
}

impl ProductionState {
    fn next_status(&mut self) -> i64 {
        if let Some(status) = self.remaining.pop_front() {
            self.last = status;
        }
        self.last
    }

    fn record(&mut self, uuid: &str) -> Value {
        let status = self.next_status();
        let mut data = json!({
            "uuid": uuid,
            "status": status,
            "output_files": [],
            "error_message": "",
        });

        if status == DONE {
            let url = self.script.download_url.clone();
            let outputs: Vec<Value> = (0..self.script.output_count)
                .map(|i| match &url {
                    Some(u) if i == 0 => json!({"download_url": u, "format": "wav"}),
                    Some(u) => json!({"download_url": format!("{}.extra{}", u, i)}),
                    None => json!({"format": "wav"}),
                })
                .collect();
            data["output_files"] = Value::Array(outputs);
        }

        if status == ERROR {
            data["error_message"] = json!(self.script.error_message.clone().unwrap_or_default());
        }

        json!({ "data": data })
    }
}

#[derive(Default)]
struct MockState {
    presets: Vec<(String, String)>,
    calls: Vec<Call>,
    pending_scripts: VecDeque<ScriptedProduction>,
    productions: HashMap<String, ProductionState>,
    downloads: HashMap<String, DownloadedFile>,
    uploads: Vec<PathBuf>,
    next_id: usize,
}

/// In-memory Auphonic API
#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing remote preset
    pub fn with_preset(self, name: &str, uuid: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .presets
            .push((name.to_string(), uuid.to_string()));
        self
    }

    /// Queue the behaviour of the next created production
    pub fn script_production(&self, script: ScriptedProduction) {
        self.state.lock().unwrap().pending_scripts.push_back(script);
    }

    /// Serve `body` for `url`, as if redirected to `final_url`
    pub fn register_download(
        &self,
        url: &str,
        final_url: &str,
        content_length: Option<u64>,
        body: Vec<u8>,
    ) {
        self.state.lock().unwrap().downloads.insert(
            url.to_string(),
            DownloadedFile {
                final_url: final_url.to_string(),
                content_length,
                body,
            },
        );
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls with `method` whose target ends with `suffix`
    pub fn count(&self, method: &str, suffix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.target.ends_with(suffix))
            .count()
    }

    pub fn uploads(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().uploads.clone()
    }

    /// JSON bodies posted to targets ending with `suffix`
    pub fn bodies(&self, suffix: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|c| c.target.ends_with(suffix))
            .filter_map(|c| c.body)
            .collect()
    }

    fn record_call(state: &mut MockState, method: &'static str, target: &str, body: Option<&Value>) {
        state.calls.push(Call {
            method,
            target: target.to_string(),
            body: body.cloned(),
        });
    }
}

fn not_found(target: &str) -> ClientError {
    ClientError::Remote {
        status: 404,
        body: format!("no such resource: {}", target),
    }
}

#[async_trait]
impl AuphonicApi for MockApi {
    async fn get(&self, resource: &str) -> ClientResult<Value> {
        let mut state = self.state.lock().unwrap();
        Self::record_call(&mut state, "GET", resource, None);

        if resource == "presets.json" {
            let data: Vec<Value> = state
                .presets
                .iter()
                .map(|(name, uuid)| json!({"preset_name": name, "uuid": uuid, "short_name": ""}))
                .collect();
            return Ok(json!({ "data": data }));
        }

        if let Some(uuid) = resource
            .strip_prefix("production/")
            .and_then(|r| r.strip_suffix(".json"))
        {
            if let Some(production) = state.productions.get_mut(uuid) {
                return Ok(production.record(uuid));
            }
        }

        Err(not_found(resource))
    }

    async fn post(&self, resource: &str, body: Option<&Value>) -> ClientResult<Value> {
        let mut state = self.state.lock().unwrap();
        Self::record_call(&mut state, "POST", resource, body);

        match resource {
            "presets.json" => {
                let name = body
                    .and_then(|b| b.get("preset_name"))
                    .and_then(|n| n.as_str())
                    .ok_or(ClientError::Remote {
                        status: 400,
                        body: "preset_name required".to_string(),
                    })?
                    .to_string();
                state.next_id += 1;
                let uuid = format!("preset-{}", state.next_id);
                state.presets.push((name.clone(), uuid.clone()));
                Ok(json!({"data": {"preset_name": name, "uuid": uuid}}))
            }
            "productions.json" => {
                state.next_id += 1;
                let uuid = format!("prod-{}", state.next_id);
                let script = state.pending_scripts.pop_front().unwrap_or_else(|| {
                    ScriptedProduction::done_after(
                        &[],
                        &format!("https://mock.auphonic/files/{}.wav", uuid),
                    )
                });
                state.productions.insert(
                    uuid.clone(),
                    ProductionState {
                        remaining: script.statuses.iter().copied().collect(),
                        last: WAITING,
                        script,
                    },
                );
                Ok(json!({"data": {"uuid": uuid, "status": 9}}))
            }
            other => {
                let uuid = other
                    .strip_prefix("production/")
                    .and_then(|r| r.strip_suffix("/start.json"));
                match uuid {
                    Some(uuid) if state.productions.contains_key(uuid) => {
                        Ok(json!({"data": {"uuid": uuid}}))
                    }
                    _ => Err(not_found(other)),
                }
            }
        }
    }

    async fn post_file(&self, resource: &str, field: &str, path: &Path) -> ClientResult<Value> {
        let mut state = self.state.lock().unwrap();
        Self::record_call(&mut state, "UPLOAD", resource, None);

        if field != "input_file" {
            return Err(ClientError::Remote {
                status: 400,
                body: format!("unexpected field {}", field),
            });
        }
        if !path.is_file() {
            return Err(ClientError::FileNotFound(path.to_path_buf()));
        }

        state.uploads.push(path.to_path_buf());
        Ok(json!({"data": {}}))
    }

    async fn fetch_absolute(&self, url: &str) -> ClientResult<DownloadedFile> {
        let mut state = self.state.lock().unwrap();
        Self::record_call(&mut state, "DOWNLOAD", url, None);

        Ok(state
            .downloads
            .get(url)
            .cloned()
            .unwrap_or_else(|| DownloadedFile {
                final_url: url.to_string(),
                content_length: Some(16),
                body: vec![0u8; 16],
            }))
    }
}
