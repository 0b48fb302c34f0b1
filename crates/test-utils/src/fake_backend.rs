use std::sync::{Arc, Mutex};

use splitscript::dev::process::{LaunchSpec, ProcessBackend, ProcessFuture};

/// One call observed by [`FakeProcessBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Start { generation: u64, pid: u32 },
    Stop { pid: u32 },
}

/// A process backend that runs nothing:
/// - records every start and every stop of a live process
/// - panics if a start happens while a previous process is still live.
#[derive(Debug, Clone, Default)]
pub struct FakeProcessBackend {
    calls: Arc<Mutex<Vec<BackendCall>>>,
    specs: Arc<Mutex<Vec<LaunchSpec>>>,
    live: Option<u32>,
    next_pid: u32,
}

impl FakeProcessBackend {
    pub fn new() -> Self {
        Self {
            next_pid: 1000,
            ..Self::default()
        }
    }

    /// Shared view of the recorded calls, usable after the backend moved
    /// into a supervisor.
    pub fn calls_handle(&self) -> Arc<Mutex<Vec<BackendCall>>> {
        Arc::clone(&self.calls)
    }

    pub fn specs_handle(&self) -> Arc<Mutex<Vec<LaunchSpec>>> {
        Arc::clone(&self.specs)
    }
}

impl ProcessBackend for FakeProcessBackend {
    fn start(&mut self, generation: u64, spec: LaunchSpec) -> ProcessFuture<'_, u32> {
        Box::pin(async move {
            assert!(
                self.live.is_none(),
                "started generation {generation} while pid {:?} is still live",
                self.live
            );
            self.next_pid += 1;
            let pid = self.next_pid;
            self.live = Some(pid);
            self.calls
                .lock()
                .unwrap()
                .push(BackendCall::Start { generation, pid });
            self.specs.lock().unwrap().push(spec);
            Ok(pid)
        })
    }

    fn stop(&mut self) -> ProcessFuture<'_, ()> {
        Box::pin(async move {
            if let Some(pid) = self.live.take() {
                self.calls.lock().unwrap().push(BackendCall::Stop { pid });
            }
            Ok(())
        })
    }

    fn is_running(&self) -> bool {
        self.live.is_some()
    }
}
