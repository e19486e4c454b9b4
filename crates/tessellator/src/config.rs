//! Configuration for the tessellator worker.

use serde::{Deserialize, Serialize};

/// Configuration for the tessellator worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TessellatorConfig {
    /// Number of dedicated worker threads.
    pub worker_threads: usize,

    /// Requests that may wait in the queue before senders back off.
    pub queue_capacity: usize,

    /// Name prefix for worker threads.
    pub thread_name: String,
}

impl Default for TessellatorConfig {
    fn default() -> Self {
        Self {
            worker_threads: 1,
            queue_capacity: 64,
            thread_name: "tessellator".to_string(),
        }
    }
}

impl TessellatorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("TESSELLATOR_THREADS") {
            if let Ok(threads) = val.parse() {
                config.worker_threads = threads;
            }
        }

        if let Ok(val) = std::env::var("TESSELLATOR_QUEUE_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                config.queue_capacity = capacity;
            }
        }

        if let Ok(val) = std::env::var("TESSELLATOR_THREAD_NAME") {
            if !val.is_empty() {
                config.thread_name = val;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_threads == 0 {
            return Err("worker_threads must be > 0".to_string());
        }

        if self.queue_capacity == 0 {
            return Err("queue_capacity must be > 0".to_string());
        }

        if self.thread_name.is_empty() {
            return Err("thread_name must not be empty".to_string());
        }

        Ok(())
    }
}
