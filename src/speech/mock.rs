/*!
 * Mock speech backend for testing.
 *
 * - `MockBackend::working()` - Always succeeds and writes a small placeholder file
 * - `MockBackend::intermittent(n)` - Fails every Nth request
 * - `MockBackend::failing()` - Always fails with an error
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::SpeechError;

use super::{SpeechBackend, SpeechRequest};

/// Placeholder content written by the working mock
pub const MOCK_AUDIO: &[u8] = b"RIFF-mock-audio";

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails every Nth request (1-based)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Reports success without writing a file
    NoOutput,
}

/// Mock backend recording every request it receives
#[derive(Debug)]
pub struct MockBackend {
    behavior: MockBehavior,
    request_count: AtomicUsize,
    requests: Mutex<Vec<SpeechRequest>>,
}

impl MockBackend {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Number of synthesize calls so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of the requests received, in arrival order
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn should_fail(&self, count: usize) -> bool {
        match self.behavior {
            MockBehavior::Working | MockBehavior::NoOutput => false,
            MockBehavior::Failing => true,
            MockBehavior::Intermittent { fail_every } => fail_every > 0 && count % fail_every == 0,
        }
    }
}

#[async_trait]
impl SpeechBackend for MockBackend {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<(), SpeechError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if self.should_fail(count) {
            return Err(SpeechError::CommandFailed {
                status: "exit status: 1".to_string(),
                stderr: format!("mock failure on request {}", count),
            });
        }

        if self.behavior != MockBehavior::NoOutput {
            tokio::fs::write(&request.output_path, MOCK_AUDIO).await?;
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
