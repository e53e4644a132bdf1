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

//! # Schema Qualifier
//!
//! Prefixes bare table references in Oracle SQL scripts with a target schema
//! (`FROM PEDIDO` becomes `FROM BENTIVI.PEDIDO`), verifies the result, and
//! diagnoses access problems against the source database during a migration.
//!
//! This application follows the **Hexagonal Architecture** (Ports and Adapters):
//! the rewriter in `domain` is pure text processing, and everything that
//! touches files or Oracle sits behind a trait in `ports`.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ports;

use crate::application::orchestrator::{Orchestrator, OutputTarget};
use crate::application::runtime::RuntimeContext;
use crate::config::{AppConfig, CliArgs, Command};
use crate::domain::errors::Result;
use crate::infrastructure::local_storage::local_script_adapter::LocalScriptAdapter;
use crate::infrastructure::oracle::connection_manager::OracleConnectionManager;
use crate::infrastructure::oracle::oracle_catalog_adapter::OracleCatalogAdapter;
use crate::infrastructure::reports::local_report_adapter::LocalReportAdapter;
use crate::ports::catalog_port::CatalogPort;
use clap::Parser;
use log::{error, info, warn};
use std::process;
use std::sync::Arc;

fn main() {
    // 1. Initialize Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 2. Parse Arguments
    let args = CliArgs::parse();

    // 3. Run the command; findings and failures both exit 1
    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command completed but found problems.
fn run(args: &CliArgs) -> Result<bool> {
    let config = AppConfig::load(args)?;

    match &args.command {
        Command::CheckConfig => return Ok(check_config(&config)),
        Command::Ping => {}
        _ => config.validate()?,
    }
    if args.command.needs_oracle() {
        config.validate_oracle()?;
    }

    let runtime = RuntimeContext::init(&config);

    if let Command::Ping = args.command {
        let pool = runtime.oracle_pool(&config)?;
        return ping(&OracleCatalogAdapter::new(pool));
    }

    let scripts = Arc::new(LocalScriptAdapter::new(config.ignore_regexes()?));
    let reports = Arc::new(LocalReportAdapter::new(config.paths.report_dir.clone()));
    let orchestrator = Orchestrator::new(scripts, reports, config.build_qualifier()?);
    let input = config.resolve_input(args.command.input())?;

    match &args.command {
        Command::Qualify {
            output, in_place, ..
        } => {
            let target = match output {
                Some(path) if !*in_place => OutputTarget::Path(path.clone()),
                _ => OutputTarget::InPlace,
            };
            let run = orchestrator.qualify_path(&input, target)?;
            if let Some(backup) = &run.backup {
                info!("Backup: {}", backup.display());
            }
            info!(
                "Qualification finished. {}/{} scripts successful, {} reference(s) qualified. Report: {}",
                run.outcomes.len() - run.failed(),
                run.outcomes.len(),
                run.substitutions(),
                run.report_path.display()
            );
            Ok(run.failed() == 0)
        }
        Command::Verify { .. } => {
            let run = orchestrator.verify_path(&input)?;
            let dirty = run.reports.iter().filter(|r| !r.is_clean()).count();
            if run.is_clean() {
                info!(
                    "All {} script(s) are fully qualified. Report: {}",
                    run.reports.len(),
                    run.report_path.display()
                );
            } else {
                warn!(
                    "{} script(s) still have unqualified tables, {} unreadable. Report: {}",
                    dirty,
                    run.unreadable.len(),
                    run.report_path.display()
                );
            }
            Ok(run.is_clean())
        }
        Command::Objects { .. } => {
            let objects = orchestrator.referenced_objects(&input)?;
            for object in &objects {
                info!("{:<10} {}", object.requested.to_string(), object.name);
            }
            info!("{} object(s) referenced", objects.len());
            Ok(true)
        }
        Command::CheckAccess { .. } => {
            let catalog = OracleCatalogAdapter::new(runtime.oracle_pool(&config)?);
            let run = orchestrator.check_access(&input, &catalog)?;
            let denied = run.inaccessible().len();
            info!(
                "{}/{} object(s) accessible to {}. Reports: {}, {}",
                run.results.len() - denied,
                run.results.len(),
                run.user,
                run.json_report.display(),
                run.csv_report.display()
            );
            Ok(denied == 0)
        }
        Command::Probe { .. } => {
            let catalog = OracleCatalogAdapter::new(runtime.oracle_pool(&config)?);
            let results = orchestrator.probe_scripts(&input, &catalog)?;
            let failed = results.iter().filter(|r| !r.ok).count();
            info!(
                "Probe finished. {}/{} script(s) ran.",
                results.len() - failed,
                results.len()
            );
            Ok(failed == 0)
        }
        Command::Ping | Command::CheckConfig => Ok(true),
    }
}

fn ping(catalog: &dyn CatalogPort) -> Result<bool> {
    let report = catalog.connection_report()?;
    info!("User:             {}", report.user);
    info!("Server time:      {}", report.server_time);
    info!("Owned tables:     {}", report.owned_tables);
    info!("Visible tables:   {}", report.visible_tables);
    info!("Table privileges: {}", report.table_privileges);
    info!("Roles:            {}", report.roles.join(", "));
    Ok(true)
}

fn check_config(config: &AppConfig) -> bool {
    let oracle = OracleConnectionManager::from_config(&config.oracle);
    info!("Oracle:      {}", oracle.target());
    info!("PostgreSQL:  {}", config.postgres.display_url());
    info!(
        "Schema:      {}",
        config.qualifier.schema.as_deref().unwrap_or("<unset>")
    );
    info!(
        "Scripts:     {}",
        config
            .paths
            .sql_scripts_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unset>".to_string())
    );
    info!("Reports:     {}", config.paths.report_dir.display());

    let checks = [
        ("general", config.validate()),
        ("oracle", config.validate_oracle()),
        ("postgres", config.validate_postgres()),
    ];
    let mut ok = true;
    for (name, result) in checks {
        match result {
            Ok(()) => info!("{} settings OK", name),
            Err(e) => {
                error!("{} settings: {}", name, e);
                ok = false;
            }
        }
    }
    ok
}
