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

//! Writes run reports as timestamped JSON and CSV files under the report directory.

use crate::domain::entities::ObjectAccess;
use crate::domain::errors::{QualifierError, Result};
use crate::ports::report_port::ReportPort;
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

const ACCESS_CSV_HEADER: [&str; 6] = [
    "object_name",
    "requested",
    "found",
    "has_access",
    "other_owners",
    "error",
];

pub struct LocalReportAdapter {
    report_dir: PathBuf,
}

impl LocalReportAdapter {
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    /// `<report_dir>/<name>_<YYYYmmdd_HHMMSS>.<ext>`, creating the directory on first use.
    fn report_path(&self, name: &str, ext: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.report_dir).map_err(|e| {
            QualifierError::ReportError(format!(
                "cannot create {}: {}",
                self.report_dir.display(),
                e
            ))
        })?;
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let mut path = self.report_dir.join(format!("{}_{}.{}", name, stamp, ext));
        let mut n = 1;
        while path.exists() {
            path = self
                .report_dir
                .join(format!("{}_{}_{}.{}", name, stamp, n, ext));
            n += 1;
        }
        Ok(path)
    }
}

impl ReportPort for LocalReportAdapter {
    fn write_json(&self, name: &str, value: &serde_json::Value) -> Result<PathBuf> {
        let path = self.report_path(name, "json")?;
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        info!("Report written to {}", path.display());
        Ok(path)
    }

    fn write_access_csv(&self, name: &str, rows: &[ObjectAccess]) -> Result<PathBuf> {
        let path = self.report_path(name, "csv")?;
        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(ACCESS_CSV_HEADER)?;
        for row in rows {
            let requested = row.requested.to_string();
            let found = row.found.map(|k| k.to_string()).unwrap_or_default();
            let has_access = if row.has_access() { "YES" } else { "NO" };
            let owners = row.other_owners.join(";");
            let error = row.error.clone().unwrap_or_default();
            writer.write_record([
                row.object_name.as_str(),
                requested.as_str(),
                found.as_str(),
                has_access,
                owners.as_str(),
                error.as_str(),
            ])?;
        }
        writer.flush()?;
        info!("Access report written to {}", path.display());
        Ok(path)
    }
}
