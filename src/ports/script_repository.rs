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

//! # Script Repository Port
//!
//! Where SQL scripts come from and where rewritten scripts go. The
//! orchestrator never touches `std::fs` directly, so tests can run against a
//! temporary directory and the rewriter stays free of I/O.

use crate::domain::errors::Result;
use std::path::{Path, PathBuf};

pub trait ScriptRepository: Send + Sync {
    /// Lists the `.sql` files directly under `dir`, sorted, skipping ignored names.
    fn list_scripts(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Reads a script as UTF-8. Invalid encodings surface as `InputError`.
    fn read_script(&self, path: &Path) -> Result<String>;

    /// Writes a script, creating parent directories as needed.
    fn write_script(&self, path: &Path, content: &str) -> Result<()>;

    /// Copies every script of `dir` into a fresh timestamped backup directory.
    fn backup_directory(&self, dir: &Path) -> Result<PathBuf>;

    /// Copies a single script next to itself with a timestamped suffix.
    fn backup_file(&self, path: &Path) -> Result<PathBuf>;
}
