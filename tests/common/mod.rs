//! In-memory engine shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use videocompress::ports::ProgressReceiver;
use videocompress::{DomainError, EngineCore, EngineHandle, EnginePort, TranscodeSession};

/// What `exec` does when called
#[derive(Debug, Clone)]
pub enum ExecBehavior {
    /// Emit the fractions, then write the output file and exit 0
    Succeed { progress: Vec<f64> },
    /// Exit with a status without writing output
    ExitCode(i32),
    /// Fail to run at all
    Error(String),
    /// Exit 0 without writing output
    NoOutput,
}

pub struct FakeEngine {
    files: Mutex<HashMap<String, Vec<u8>>>,
    progress_tx: Mutex<Option<mpsc::UnboundedSender<f64>>>,
    behavior: Mutex<ExecBehavior>,
    exec_calls: Mutex<Vec<Vec<String>>>,
    deleted: Mutex<Vec<String>>,
    operations: Mutex<Vec<String>>,
    pub load_calls: AtomicUsize,
    failing_loads: AtomicUsize,
    load_delay: Mutex<Duration>,
    fail_deletes: AtomicBool,
    fail_writes: AtomicBool,
    exec_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            progress_tx: Mutex::new(None),
            behavior: Mutex::new(ExecBehavior::Succeed {
                progress: vec![0.0, 0.25, 0.5, 1.0],
            }),
            exec_calls: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            operations: Mutex::new(Vec::new()),
            load_calls: AtomicUsize::new(0),
            failing_loads: AtomicUsize::new(0),
            load_delay: Mutex::new(Duration::ZERO),
            fail_deletes: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            exec_gate: Mutex::new(None),
        }
    }

    pub fn set_behavior(&self, behavior: ExecBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Make the next `count` loads fail
    pub fn fail_next_loads(&self, count: usize) {
        self.failing_loads.store(count, Ordering::SeqCst);
    }

    pub fn set_load_delay(&self, delay: Duration) {
        *self.load_delay.lock().unwrap() = delay;
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Block `exec` until the returned notify fires
    pub fn gate_exec(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.exec_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn exec_calls(&self) -> Vec<Vec<String>> {
        self.exec_calls.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Port calls in order, e.g. `write:input`, `exec`, `read:output.mp4`
    pub fn operations(&self) -> Vec<String> {
        self.operations.lock().unwrap().clone()
    }

    /// Log a port call and yield, so phase watchers observe every stage
    async fn record(&self, operation: String) {
        self.operations.lock().unwrap().push(operation);
        tokio::task::yield_now().await;
    }

    /// Bytes the fake "encodes" an input into
    pub fn encoded(input: &[u8]) -> Vec<u8> {
        let mut out = b"encoded:".to_vec();
        out.extend_from_slice(input);
        out
    }
}

#[async_trait]
impl EnginePort for FakeEngine {
    async fn load(&self, _core: &EngineCore) -> Result<(), DomainError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        self.record("load".to_string()).await;
        let delay = *self.load_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failing = self.failing_loads.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_loads.store(failing - 1, Ordering::SeqCst);
            return Err(DomainError::EngineUnavailable("core fetch failed".to_string()));
        }
        Ok(())
    }

    async fn write_file(&self, name: &str, bytes: &[u8]) -> Result<(), DomainError> {
        self.record(format!("write:{}", name)).await;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::FsFail(format!("disk full writing {}", name)));
        }
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        self.record(format!("read:{}", name)).await;
        self.files
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::FileNotFound(name.to_string()))
    }

    async fn delete_file(&self, name: &str) -> Result<(), DomainError> {
        self.deleted.lock().unwrap().push(name.to_string());
        self.record(format!("delete:{}", name)).await;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(DomainError::FsFail(format!("cannot delete {}", name)));
        }
        self.files
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| DomainError::FileNotFound(name.to_string()))
    }

    async fn exec(&self, args: &[String]) -> Result<i32, DomainError> {
        self.exec_calls.lock().unwrap().push(args.to_vec());
        self.record("exec".to_string()).await;

        let gate = self.exec_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            ExecBehavior::Succeed { progress } => {
                let tx = self.progress_tx.lock().unwrap().clone();
                if let Some(tx) = tx {
                    for fraction in progress {
                        let _ = tx.send(fraction);
                        tokio::task::yield_now().await;
                    }
                }
                let output_name = args
                    .last()
                    .cloned()
                    .ok_or_else(|| DomainError::BadArgs("no output".to_string()))?;
                let mut files = self.files.lock().unwrap();
                let input = files
                    .get("input")
                    .cloned()
                    .ok_or_else(|| DomainError::FileNotFound("input".to_string()))?;
                files.insert(output_name, Self::encoded(&input));
                Ok(0)
            }
            ExecBehavior::ExitCode(code) => Ok(code),
            ExecBehavior::Error(message) => Err(DomainError::EngineFailure(message)),
            ExecBehavior::NoOutput => Ok(0),
        }
    }

    fn subscribe_progress(&self) -> ProgressReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.progress_tx.lock().unwrap() = Some(tx);
        rx
    }
}

/// Session over a fresh fake engine
pub fn fake_session() -> (Arc<FakeEngine>, TranscodeSession) {
    let engine = Arc::new(FakeEngine::new());
    let handle = EngineHandle::new(
        Arc::clone(&engine) as Arc<dyn EnginePort>,
        EngineCore::default(),
    );
    (engine, TranscodeSession::new(handle))
}
