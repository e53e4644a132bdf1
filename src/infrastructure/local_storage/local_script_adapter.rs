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

//! Infrastructure adapter for reading, writing and backing up SQL scripts on
//! the local filesystem.

use crate::domain::errors::{QualifierError, Result};
use crate::ports::script_repository::ScriptRepository;
use log::{debug, info};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Concrete implementation of `ScriptRepository` for local directories.
///
/// Backups follow the layout the migration team already used:
/// `<parent>/sqls_backup/backup_<YYYYmmdd_HHMMSS>/` for a directory and
/// `<file>.bak_<YYYYmmdd_HHMMSS>` for a single script.
pub struct LocalScriptAdapter {
    ignore_patterns: Vec<Regex>,
}

impl LocalScriptAdapter {
    pub fn new(ignore_patterns: Vec<Regex>) -> Self {
        Self { ignore_patterns }
    }

    fn is_ignored(&self, file_name: &str) -> bool {
        self.ignore_patterns.iter().any(|re| re.is_match(file_name))
    }

    fn timestamp() -> String {
        chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
    }

    /// Every `.sql` file under `dir`, ignored or not.
    fn sql_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(|e| QualifierError::InputError {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_sql = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("sql"));
            if path.is_file() && is_sql {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Appends `_1`, `_2`... when a backup from the same second already exists.
    fn unique_path(candidate: PathBuf) -> PathBuf {
        if !candidate.exists() {
            return candidate;
        }
        let base = candidate.as_os_str().to_string_lossy().to_string();
        (1..)
            .map(|n| PathBuf::from(format!("{}_{}", base, n)))
            .find(|p| !p.exists())
            .unwrap_or(candidate)
    }
}

impl ScriptRepository for LocalScriptAdapter {
    fn list_scripts(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let scripts = Self::sql_files(dir)?
            .into_iter()
            .filter(|path| {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let ignored = self.is_ignored(&name);
                if ignored {
                    debug!("Skipping ignored script: {}", name);
                }
                !ignored
            })
            .collect();
        Ok(scripts)
    }

    fn read_script(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).map_err(|e| QualifierError::InputError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|e| QualifierError::InputError {
            path: path.to_path_buf(),
            reason: format!("not valid UTF-8 ({})", e.utf8_error()),
        })
    }

    fn write_script(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    fn backup_directory(&self, dir: &Path) -> Result<PathBuf> {
        let parent = dir.parent().unwrap_or_else(|| Path::new("."));
        let backup_dir = Self::unique_path(
            parent
                .join("sqls_backup")
                .join(format!("backup_{}", Self::timestamp())),
        );
        fs::create_dir_all(&backup_dir)?;

        let files = Self::sql_files(dir)?;
        for file in &files {
            if let Some(name) = file.file_name() {
                fs::copy(file, backup_dir.join(name))?;
            }
        }
        info!(
            "Backed up {} scripts to {}",
            files.len(),
            backup_dir.display()
        );
        Ok(backup_dir)
    }

    fn backup_file(&self, path: &Path) -> Result<PathBuf> {
        let backup = Self::unique_path(PathBuf::from(format!(
            "{}.bak_{}",
            path.display(),
            Self::timestamp()
        )));
        fs::copy(path, &backup).map_err(|e| QualifierError::InputError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        info!("Backed up {} to {}", path.display(), backup.display());
        Ok(backup)
    }
}
