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

//! # Configuration
//!
//! Settings come from three layers, later ones winning:
//! 1. An optional YAML or JSON file (`--config`).
//! 2. Environment variables (a `.env` file in the working directory is loaded first).
//! 3. Command-line flags.
//!
//! Nothing falls back to built-in credentials: `validate_oracle` and
//! `validate_postgres` name every missing field at once.

use crate::domain::errors::{QualifierError, Result};
use crate::domain::keywords::{Denylist, DEFAULT_EXEMPT_TABLES};
use crate::domain::qualifier::SchemaQualifier;
use crate::domain::entities::SchemaName;
use clap::{ArgGroup, Parser, Subcommand};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub oracle: OracleConfig,
    pub postgres: PostgresConfig,
    pub qualifier: QualifierConfig,
    pub paths: PathsConfig,
    pub runtime: RuntimeConfig,
}

/// Source database (the ERP schema being migrated).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OracleConfig {
    pub host: Option<String>,
    pub port: u16,
    pub service_name: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Full Easy Connect string; overrides host/port/service when set.
    pub connection_string: Option<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 1521,
            service_name: "ORCL".to_string(),
            username: None,
            password: None,
            connection_string: None,
        }
    }
}

impl OracleConfig {
    pub fn get_connection_string(&self) -> String {
        if let Some(cs) = &self.connection_string {
            return cs.clone();
        }
        format!(
            "//{}:{}/{}",
            self.host.as_deref().unwrap_or_default(),
            self.port,
            self.service_name
        )
    }
}

/// Destination database. Only validated and reported; the rewriter never connects to it.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "postgres".to_string(),
            user: None,
            password: None,
        }
    }
}

impl PostgresConfig {
    /// Connection URL with the password masked, for logging.
    pub fn display_url(&self) -> String {
        format!(
            "postgresql://{}:***@{}:{}/{}",
            self.user.as_deref().unwrap_or_default(),
            self.host,
            self.port,
            self.database
        )
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct QualifierConfig {
    /// Target schema, e.g. `BENTIVI`.
    pub schema: Option<String>,
    /// When set, only these tables are qualified.
    pub known_tables: Option<Vec<String>>,
    /// Additional identifiers never treated as tables.
    pub extra_reserved_words: Vec<String>,
    /// Tables never qualified. Defaults to `DUAL`.
    pub exempt_tables: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PathsConfig {
    pub sql_scripts_dir: Option<PathBuf>,
    pub report_dir: PathBuf,
    /// Regexes matched against script file names; matches are skipped.
    pub ignore_patterns: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sql_scripts_dir: None,
            report_dir: PathBuf::from("reports"),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

pub fn default_ignore_patterns() -> Vec<String> {
    [
        r"^test.*\.sql$",
        r".*_test\.sql$",
        r"^backup.*\.sql$",
        r".*_backup\.sql$",
        r".*\.bak\.sql$",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct RuntimeConfig {
    pub parallel: Option<usize>,
    pub cpu_percent: Option<u8>,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Target schema used to qualify table references
    #[arg(long, global = true)]
    pub schema: Option<String>,

    /// Directory receiving JSON/CSV reports
    #[arg(long, global = true)]
    pub report_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    pub parallel: Option<usize>,
    #[arg(long, global = true)]
    pub cpu_percent: Option<u8>,

    // Oracle overrides for ad-hoc runs
    #[arg(long, global = true)]
    pub host: Option<String>,
    #[arg(long, global = true)]
    pub port: Option<u16>,
    #[arg(long, global = true)]
    pub service: Option<String>,
    #[arg(long, global = true)]
    pub username: Option<String>,
    #[arg(long, global = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Prefix bare table references with the target schema
    #[command(group(ArgGroup::new("target").required(true).args(["output", "in_place"])))]
    Qualify {
        /// SQL file or directory (defaults to the configured scripts directory)
        input: Option<PathBuf>,
        /// Write results to this file or directory instead of the input
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite the input after taking a timestamped backup
        #[arg(long)]
        in_place: bool,
        /// Only qualify these tables (comma separated)
        #[arg(long, value_delimiter = ',')]
        tables: Option<Vec<String>>,
    },
    /// Report references still missing the target schema
    Verify { input: Option<PathBuf> },
    /// List schema objects referenced by the scripts
    Objects { input: Option<PathBuf> },
    /// Check that the connected Oracle user can see every referenced object
    CheckAccess { input: Option<PathBuf> },
    /// Run each script once with ROWNUM <= 1 against Oracle
    Probe { input: Option<PathBuf> },
    /// Test the Oracle connection and report the user's privileges
    Ping,
    /// Validate configuration and print a summary
    CheckConfig,
}

impl Command {
    pub fn input(&self) -> Option<&Path> {
        match self {
            Command::Qualify { input, .. }
            | Command::Verify { input }
            | Command::Objects { input }
            | Command::CheckAccess { input }
            | Command::Probe { input } => input.as_deref(),
            Command::Ping | Command::CheckConfig => None,
        }
    }

    pub fn needs_oracle(&self) -> bool {
        matches!(
            self,
            Command::CheckAccess { .. } | Command::Probe { .. } | Command::Ping
        )
    }
}

impl AppConfig {
    /// Builds the effective configuration for a CLI invocation.
    pub fn load(args: &CliArgs) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::info!("Loaded environment from {}", path.display());
        }

        let mut config = match &args.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.merge_cli(args);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| QualifierError::InputError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let is_json = path.extension().is_some_and(|e| e == "json");
        let config = if is_json {
            serde_json::from_str(&contents).map_err(|e| {
                QualifierError::ConfigError(format!("{}: {}", path.display(), e))
            })?
        } else {
            serde_yaml::from_str(&contents).map_err(|e| {
                QualifierError::ConfigError(format!("{}: {}", path.display(), e))
            })?
        };
        Ok(config)
    }

    /// Applies environment overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let port = |key: &str| -> Result<Option<u16>> {
            get(key)
                .map(|v| {
                    v.trim().parse::<u16>().map_err(|_| {
                        QualifierError::ConfigError(format!("{} is not a valid port: {}", key, v))
                    })
                })
                .transpose()
        };

        if let Some(v) = get("ORACLE_HOST") {
            self.oracle.host = Some(v);
        }
        if let Some(p) = port("ORACLE_PORT")? {
            self.oracle.port = p;
        }
        if let Some(v) = get("ORACLE_SERVICE_NAME") {
            self.oracle.service_name = v;
        }
        if let Some(v) = get("ORACLE_USER") {
            self.oracle.username = Some(v);
        }
        if let Some(v) = get("ORACLE_PASSWORD") {
            self.oracle.password = Some(v);
        }

        if let Some(v) = get("POSTGRES_HOST") {
            self.postgres.host = v;
        }
        if let Some(p) = port("POSTGRES_PORT")? {
            self.postgres.port = p;
        }
        if let Some(v) = get("POSTGRES_DATABASE") {
            self.postgres.database = v;
        }
        if let Some(v) = get("POSTGRES_USER") {
            self.postgres.user = Some(v);
        }
        if let Some(v) = get("POSTGRES_PASSWORD") {
            self.postgres.password = Some(v);
        }

        if let Some(v) = get("SQL_SCRIPTS_PATH") {
            self.paths.sql_scripts_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get("REPORT_DIRECTORY") {
            self.paths.report_dir = PathBuf::from(v);
        }
        if let Some(v) = get("TARGET_SCHEMA") {
            self.qualifier.schema = Some(v);
        }
        Ok(())
    }

    pub fn merge_cli(&mut self, args: &CliArgs) {
        if let Some(s) = &args.schema {
            self.qualifier.schema = Some(s.clone());
        }
        if let Some(d) = &args.report_dir {
            self.paths.report_dir = d.clone();
        }
        if let Some(p) = args.parallel {
            self.runtime.parallel = Some(p);
        }
        if let Some(c) = args.cpu_percent {
            self.runtime.cpu_percent = Some(c);
        }
        if let Some(h) = &args.host {
            self.oracle.host = Some(h.clone());
        }
        if let Some(p) = args.port {
            self.oracle.port = p;
        }
        if let Some(s) = &args.service {
            self.oracle.service_name = s.clone();
        }
        if let Some(u) = &args.username {
            self.oracle.username = Some(u.clone());
        }
        if let Some(p) = &args.password {
            self.oracle.password = Some(p.clone());
        }
        if let Command::Qualify {
            tables: Some(t), ..
        } = &args.command
        {
            self.qualifier.known_tables = Some(t.clone());
        }
    }

    /// Checks the settings every command depends on.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        match &self.qualifier.schema {
            None => errors.push("target schema is not set (TARGET_SCHEMA or --schema)".to_string()),
            Some(s) => {
                if let Err(e) = SchemaName::new(s) {
                    errors.push(e.to_string());
                }
            }
        }
        for pattern in &self.paths.ignore_patterns {
            if let Err(e) = Regex::new(pattern) {
                errors.push(format!("invalid ignore pattern '{}': {}", pattern, e));
            }
        }
        if let Some(pct) = self.runtime.cpu_percent {
            if pct == 0 || pct > 100 {
                errors.push(format!("cpu_percent must be between 1 and 100, got {}", pct));
            }
        }
        if self.runtime.parallel == Some(0) {
            errors.push("parallel must be at least 1".to_string());
        }

        into_result(errors)
    }

    /// Checks the Oracle credentials needed by database-backed commands.
    pub fn validate_oracle(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.oracle.connection_string.is_none() && self.oracle.host.is_none() {
            missing.push("ORACLE_HOST");
        }
        if self.oracle.username.is_none() {
            missing.push("ORACLE_USER");
        }
        if self.oracle.password.is_none() {
            missing.push("ORACLE_PASSWORD");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(QualifierError::ConfigError(format!(
                "required Oracle settings not defined: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn validate_postgres(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.postgres.user.is_none() {
            missing.push("POSTGRES_USER");
        }
        if self.postgres.password.is_none() {
            missing.push("POSTGRES_PASSWORD");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(QualifierError::ConfigError(format!(
                "required PostgreSQL settings not defined: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn schema_name(&self) -> Result<SchemaName> {
        let raw = self.qualifier.schema.as_deref().ok_or_else(|| {
            QualifierError::ConfigError("target schema is not set".to_string())
        })?;
        SchemaName::new(raw)
    }

    pub fn denylist(&self) -> Denylist {
        let exempt = self
            .qualifier
            .exempt_tables
            .clone()
            .unwrap_or_else(|| DEFAULT_EXEMPT_TABLES.iter().map(|s| s.to_string()).collect());
        Denylist::default()
            .with_extra_words(&self.qualifier.extra_reserved_words)
            .with_exempt_tables(exempt)
    }

    pub fn build_qualifier(&self) -> Result<SchemaQualifier> {
        let mut qualifier =
            SchemaQualifier::new(self.schema_name()?).with_denylist(self.denylist());
        if let Some(tables) = &self.qualifier.known_tables {
            qualifier = qualifier.with_known_tables(tables);
        }
        Ok(qualifier)
    }

    pub fn ignore_regexes(&self) -> Result<Vec<Regex>> {
        self.paths
            .ignore_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    QualifierError::ConfigError(format!("invalid ignore pattern '{}': {}", p, e))
                })
            })
            .collect()
    }

    /// Input path for a command: the explicit argument or the scripts directory.
    pub fn resolve_input(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.paths.sql_scripts_dir.clone())
            .ok_or_else(|| {
                QualifierError::ConfigError(
                    "no input given and SQL_SCRIPTS_PATH is not set".to_string(),
                )
            })
    }
}

fn into_result(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(QualifierError::ConfigError(errors.join("; ")))
    }
}
