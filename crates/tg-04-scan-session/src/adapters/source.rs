//! # In-Memory Scan Source
//!
//! Stand-in for a camera: tracks whether it is running and counts every
//! transition, so front-ends without a real device (stdin, tests) can
//! still observe the suspend/resume/release protocol.

use crate::domain::errors::SourceError;
use crate::ports::outbound::ScanSource;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::debug;

#[derive(Debug)]
pub struct InMemoryScanSource {
    running: AtomicBool,
    released: AtomicBool,
    suspends: AtomicU32,
    resumes: AtomicU32,
    releases: AtomicU32,
}

impl Default for InMemoryScanSource {
    fn default() -> Self {
        Self {
            running: AtomicBool::new(true),
            released: AtomicBool::new(false),
            suspends: AtomicU32::new(0),
            resumes: AtomicU32::new(0),
            releases: AtomicU32::new(0),
        }
    }
}

impl InMemoryScanSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    pub fn suspend_count(&self) -> u32 {
        self.suspends.load(Ordering::SeqCst)
    }

    pub fn resume_count(&self) -> u32 {
        self.resumes.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> u32 {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScanSource for InMemoryScanSource {
    async fn suspend(&self) -> Result<(), SourceError> {
        if self.is_released() {
            return Err(SourceError::Unavailable("source released".into()));
        }
        self.suspends.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        debug!("Scan source suspended");
        Ok(())
    }

    async fn resume(&self) -> Result<(), SourceError> {
        if self.is_released() {
            return Err(SourceError::Unavailable("source released".into()));
        }
        self.resumes.fetch_add(1, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        debug!("Scan source resumed");
        Ok(())
    }

    async fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.released.store(true, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        debug!("Scan source released");
    }
}
