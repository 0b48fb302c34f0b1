#![allow(dead_code)]

pub use splitscript_test_utils::{
    BackendCall, FakeProcessBackend, InMemoryLoader, Project, ProjectBuilder, init_tracing,
    with_timeout,
};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
