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

//! Port for persisting run reports.

use crate::domain::entities::ObjectAccess;
use crate::domain::errors::Result;
use std::path::PathBuf;

pub trait ReportPort: Send + Sync {
    /// Writes `value` as pretty JSON to `<report_dir>/<name>_<timestamp>.json`.
    fn write_json(&self, name: &str, value: &serde_json::Value) -> Result<PathBuf>;

    /// Writes one CSV row per checked object.
    fn write_access_csv(&self, name: &str, rows: &[ObjectAccess]) -> Result<PathBuf>;
}
