// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Runtime Context
//!
//! Sets up the process-wide resources a command runs on:
//! - the `rayon` global thread pool used to qualify and verify scripts in parallel;
//! - an `r2d2` pool of Oracle connections, built only for commands that talk to
//!   the database so offline rewriting never needs credentials.

use crate::config::{AppConfig, RuntimeConfig};
use crate::domain::errors::Result;
use crate::infrastructure::oracle::connection_manager::OracleConnectionManager;
use log::info;
use r2d2::Pool;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CPU_PERCENT: u8 = 50;
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared resources that live for the whole run.
pub struct RuntimeContext {
    /// Worker threads in the global rayon pool.
    pub num_threads: usize,
}

impl RuntimeContext {
    /// Initializes the global thread pool.
    ///
    /// `parallel` wins when set; otherwise `cpu_percent` (default 50%) of the
    /// available cores is used, never fewer than one thread.
    pub fn init(config: &AppConfig) -> Self {
        let num_threads = thread_count(&config.runtime, num_cpus::get());
        info!(
            "Initializing worker pool with {} threads (Target CPU: {}%)",
            num_threads,
            config.runtime.cpu_percent.unwrap_or(DEFAULT_CPU_PERCENT)
        );

        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .unwrap_or_else(|e| {
                info!("Global thread pool already initialized: {}", e);
            });

        Self { num_threads }
    }

    /// Opens the Oracle connection pool. Building the pool opens its first
    /// connection, so bad credentials fail here rather than mid-run.
    pub fn oracle_pool(&self, config: &AppConfig) -> Result<Arc<Pool<OracleConnectionManager>>> {
        let manager = OracleConnectionManager::from_config(&config.oracle);
        info!("Initializing connection pool for {}...", manager.target());

        // One spare connection for the session report.
        let pool = Pool::builder()
            .max_size((self.num_threads + 1) as u32)
            .min_idle(Some(1))
            .connection_timeout(CONNECTION_TIMEOUT)
            .build(manager)?;

        Ok(Arc::new(pool))
    }
}

fn thread_count(runtime: &RuntimeConfig, total_cpus: usize) -> usize {
    let cpu_percent = runtime.cpu_percent.unwrap_or(DEFAULT_CPU_PERCENT);
    let threads = runtime
        .parallel
        .unwrap_or_else(|| (total_cpus as f64 * (cpu_percent as f64 / 100.0)).ceil() as usize);
    std::cmp::max(1, threads)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_count() {
        let explicit = RuntimeConfig {
            parallel: Some(3),
            cpu_percent: Some(10),
        };
        assert_eq!(thread_count(&explicit, 16), 3);

        let default = RuntimeConfig::default();
        assert_eq!(thread_count(&default, 8), 4);
        assert_eq!(thread_count(&default, 1), 1);

        let quarter = RuntimeConfig {
            parallel: None,
            cpu_percent: Some(25),
        };
        assert_eq!(thread_count(&quarter, 6), 2);
        assert_eq!(thread_count(&quarter, 0), 1);
    }
}
