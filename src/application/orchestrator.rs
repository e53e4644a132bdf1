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

//! The application logic that drives the qualifier over script files.
//!
//! This module coordinates the script repository, the report writer and, for
//! the database-backed commands, the catalog port. Each script is owned by a
//! single worker while it is processed, so files run in parallel on the
//! global rayon pool without coordination.

use crate::domain::entities::{
    FileOutcome, ObjectAccess, ProbeResult, ReferencedObject, SqlDocument, VerificationReport,
};
use crate::domain::errors::{QualifierError, Result};
use crate::domain::lexer::{tokenize, TokenKind};
use crate::domain::qualifier::SchemaQualifier;
use crate::domain::verifier;
use crate::ports::catalog_port::CatalogPort;
use crate::ports::report_port::ReportPort;
use crate::ports::script_repository::ScriptRepository;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Where qualified scripts are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Overwrite the input, after backing it up.
    InPlace,
    /// A new file (single-script input) or directory (directory input).
    Path(PathBuf),
}

#[derive(Debug)]
pub struct QualifyRun {
    pub backup: Option<PathBuf>,
    pub outcomes: Vec<FileOutcome>,
    pub report_path: PathBuf,
}

impl QualifyRun {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }

    pub fn substitutions(&self) -> usize {
        self.outcomes.iter().map(|o| o.substitutions).sum()
    }
}

#[derive(Debug)]
pub struct VerifyRun {
    pub reports: Vec<VerificationReport>,
    /// Scripts that could not be read.
    pub unreadable: Vec<FileOutcome>,
    pub report_path: PathBuf,
}

impl VerifyRun {
    pub fn is_clean(&self) -> bool {
        self.unreadable.is_empty() && self.reports.iter().all(VerificationReport::is_clean)
    }
}

#[derive(Debug)]
pub struct AccessRun {
    pub user: String,
    pub results: Vec<ObjectAccess>,
    pub json_report: PathBuf,
    pub csv_report: PathBuf,
}

impl AccessRun {
    pub fn inaccessible(&self) -> Vec<&ObjectAccess> {
        self.results.iter().filter(|r| !r.has_access()).collect()
    }
}

/// Runs qualification, verification and the Oracle-backed audits over script files.
pub struct Orchestrator {
    scripts: Arc<dyn ScriptRepository>,
    reports: Arc<dyn ReportPort>,
    qualifier: SchemaQualifier,
}

impl Orchestrator {
    pub fn new(
        scripts: Arc<dyn ScriptRepository>,
        reports: Arc<dyn ReportPort>,
        qualifier: SchemaQualifier,
    ) -> Self {
        Self {
            scripts,
            reports,
            qualifier,
        }
    }

    /// A single script, or every non-ignored `.sql` file of a directory.
    fn resolve_scripts(&self, input: &Path) -> Result<Vec<PathBuf>> {
        if input.is_dir() {
            self.scripts.list_scripts(input)
        } else if input.is_file() {
            Ok(vec![input.to_path_buf()])
        } else {
            Err(QualifierError::InputError {
                path: input.to_path_buf(),
                reason: "no such file or directory".to_string(),
            })
        }
    }

    fn destination(input: &Path, script: &Path, target: &OutputTarget) -> PathBuf {
        match target {
            OutputTarget::InPlace => script.to_path_buf(),
            OutputTarget::Path(out) => {
                if input.is_dir() || out.is_dir() {
                    match script.file_name() {
                        Some(name) => out.join(name),
                        None => out.clone(),
                    }
                } else {
                    out.clone()
                }
            }
        }
    }

    /// True when `out` names the input file, or the input directory itself.
    fn writes_over_input(input: &Path, out: &Path) -> bool {
        let dest = if input.is_dir() {
            out.to_path_buf()
        } else {
            Self::destination(input, input, &OutputTarget::Path(out.to_path_buf()))
        };
        match (fs::canonicalize(&dest), fs::canonicalize(input)) {
            (Ok(a), Ok(b)) => a == b,
            _ => dest == input,
        }
    }

    /// Qualifies one script or a directory of scripts.
    ///
    /// In-place runs back the input up before the first write; a failed backup
    /// aborts the run with nothing modified.
    pub fn qualify_path(&self, input: &Path, target: OutputTarget) -> Result<QualifyRun> {
        let start_time = Instant::now();
        let scripts = self.resolve_scripts(input)?;
        info!(
            "Qualifying {} script(s) under {} with schema {}",
            scripts.len(),
            input.display(),
            self.qualifier.schema()
        );

        let target = match target {
            OutputTarget::Path(out) if Self::writes_over_input(input, &out) => {
                info!("Output is the input itself; writing in place");
                OutputTarget::InPlace
            }
            other => other,
        };

        let backup = match target {
            OutputTarget::InPlace if scripts.is_empty() => None,
            OutputTarget::InPlace if input.is_dir() => {
                Some(self.scripts.backup_directory(input)?)
            }
            OutputTarget::InPlace => Some(self.scripts.backup_file(input)?),
            OutputTarget::Path(_) => None,
        };

        let outcomes: Vec<FileOutcome> = scripts
            .par_iter()
            .map(|script| {
                let dest = Self::destination(input, script, &target);
                match self.qualify_file(script, &dest, &target) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!("Script {} failed: {}", script.display(), e);
                        FileOutcome::failure(script.clone(), e.to_string())
                    }
                }
            })
            .collect();

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let modified = outcomes.iter().filter(|o| o.modified).count();
        let substitutions: usize = outcomes.iter().map(|o| o.substitutions).sum();
        let report = json!({
            "schema": self.qualifier.schema().as_str(),
            "input": input,
            "backup": backup,
            "summary": {
                "total_files": outcomes.len(),
                "success": succeeded,
                "failed": outcomes.len() - succeeded,
                "modified_files": modified,
                "substitutions": substitutions,
                "total_duration_seconds": start_time.elapsed().as_secs_f64(),
            },
            "files": outcomes,
        });
        let report_path = self.reports.write_json("qualify_report", &report)?;

        Ok(QualifyRun {
            backup,
            outcomes,
            report_path,
        })
    }

    fn qualify_file(
        &self,
        source: &Path,
        dest: &Path,
        target: &OutputTarget,
    ) -> Result<FileOutcome> {
        let text = self.scripts.read_script(source)?;
        let mut doc = SqlDocument::new(text);
        let substitutions = self.qualifier.qualify_document(&mut doc);

        // In place, untouched files keep their timestamps.
        if doc.is_modified() || *target != OutputTarget::InPlace {
            self.scripts.write_script(dest, doc.rewritten())?;
        }
        debug!(
            "{}: {} reference(s) qualified -> {}",
            source.display(),
            substitutions,
            dest.display()
        );
        Ok(FileOutcome::success(
            source.to_path_buf(),
            dest.to_path_buf(),
            substitutions,
        ))
    }

    /// Counts qualified and bare references in every script.
    pub fn verify_path(&self, input: &Path) -> Result<VerifyRun> {
        let scripts = self.resolve_scripts(input)?;
        let schema = self.qualifier.schema();
        let denylist = self.qualifier.denylist();

        let results: Vec<std::result::Result<VerificationReport, FileOutcome>> = scripts
            .par_iter()
            .map(|script| match self.scripts.read_script(script) {
                Ok(sql) => {
                    let mut report = verifier::verify(&sql, schema, denylist);
                    report.source = Some(script.clone());
                    Ok(report)
                }
                Err(e) => {
                    error!("Script {} failed: {}", script.display(), e);
                    Err(FileOutcome::failure(script.clone(), e.to_string()))
                }
            })
            .collect();

        let mut reports = Vec::new();
        let mut unreadable = Vec::new();
        for result in results {
            match result {
                Ok(report) => {
                    if !report.is_clean() {
                        warn!(
                            "{}: unqualified tables {:?}",
                            report
                                .source
                                .as_deref()
                                .map(|p| p.display().to_string())
                                .unwrap_or_default(),
                            report.unqualified_tables
                        );
                    }
                    reports.push(report);
                }
                Err(outcome) => unreadable.push(outcome),
            }
        }

        let unqualified: BTreeSet<&String> = reports
            .iter()
            .flat_map(|r| r.unqualified_tables.iter())
            .collect();
        let report = json!({
            "schema": schema.as_str(),
            "input": input,
            "summary": {
                "total_files": scripts.len(),
                "clean_files": reports.iter().filter(|r| r.is_clean()).count(),
                "files_with_issues": reports.iter().filter(|r| !r.is_clean()).count(),
                "unreadable_files": unreadable.len(),
                "qualified_references": reports.iter().map(|r| r.qualified_count).sum::<usize>(),
                "unqualified_tables": unqualified,
            },
            "files": reports,
            "errors": unreadable,
        });
        let report_path = self.reports.write_json("verify_report", &report)?;

        Ok(VerifyRun {
            reports,
            unreadable,
            report_path,
        })
    }

    /// Every object of the target schema used by the scripts, each listed once.
    pub fn referenced_objects(&self, input: &Path) -> Result<Vec<ReferencedObject>> {
        let mut objects = BTreeSet::new();
        for script in self.resolve_scripts(input)? {
            let sql = self.scripts.read_script(&script)?;
            objects.extend(verifier::referenced_objects(
                &sql,
                self.qualifier.schema(),
                self.qualifier.denylist(),
            ));
        }
        Ok(objects.into_iter().collect())
    }

    /// Looks every referenced object up in the data dictionary as the connected user.
    pub fn check_access(&self, input: &Path, catalog: &dyn CatalogPort) -> Result<AccessRun> {
        let objects = self.referenced_objects(input)?;
        let user = catalog.current_user()?;
        let schema = self.qualifier.schema().as_str();
        info!(
            "Checking {} object(s) of {} as {}",
            objects.len(),
            schema,
            user
        );

        let mut seen = BTreeSet::new();
        let unique: Vec<&ReferencedObject> =
            objects.iter().filter(|o| seen.insert(&o.name)).collect();

        let results: Vec<ObjectAccess> = unique
            .par_iter()
            .map(|object| {
                match catalog.check_object(schema, &object.name, object.requested) {
                    Ok(access) => access,
                    Err(e) => {
                        error!("Lookup of {}.{} failed: {}", schema, object.name, e);
                        ObjectAccess::failed(&object.name, object.requested, e.to_string())
                    }
                }
            })
            .collect();

        for missing in results.iter().filter(|r| !r.has_access()) {
            if missing.other_owners.is_empty() {
                warn!("{}.{} is not visible to {}", schema, missing.object_name, user);
            } else {
                warn!(
                    "{}.{} is not visible to {} (exists under {})",
                    schema,
                    missing.object_name,
                    user,
                    missing.other_owners.join(", ")
                );
            }
        }

        let accessible = results.iter().filter(|r| r.has_access()).count();
        let report = json!({
            "schema": schema,
            "user": user,
            "summary": {
                "total_objects": results.len(),
                "accessible": accessible,
                "inaccessible": results.len() - accessible,
            },
            "objects": results,
        });
        let json_report = self.reports.write_json("access_check", &report)?;
        let csv_report = self.reports.write_access_csv("access_check", &results)?;

        Ok(AccessRun {
            user,
            results,
            json_report,
            csv_report,
        })
    }

    /// Runs each query script once, fetching at most one row.
    ///
    /// Scripts that do not start with `SELECT` or `WITH` are skipped.
    pub fn probe_scripts(
        &self,
        input: &Path,
        catalog: &dyn CatalogPort,
    ) -> Result<Vec<ProbeResult>> {
        let mut results = Vec::new();
        for script in self.resolve_scripts(input)? {
            let sql = match self.scripts.read_script(&script) {
                Ok(sql) => sql,
                Err(e) => {
                    results.push(ProbeResult {
                        source: script,
                        ok: false,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };
            if !is_query(&sql) {
                info!("Skipping non-query script {}", script.display());
                continue;
            }
            let result = match catalog.probe_query(&sql) {
                Ok(()) => {
                    info!("Probe OK: {}", script.display());
                    ProbeResult {
                        source: script,
                        ok: true,
                        error: None,
                    }
                }
                Err(e) => {
                    error!("Probe failed for {}: {}", script.display(), e);
                    ProbeResult {
                        source: script,
                        ok: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }

        let passed = results.iter().filter(|r| r.ok).count();
        let report = json!({
            "summary": {
                "total_scripts": results.len(),
                "success": passed,
                "failed": results.len() - passed,
            },
            "scripts": results,
        });
        self.reports.write_json("probe_report", &report)?;
        Ok(results)
    }
}

/// True when the first keyword of the script is `SELECT` or `WITH`.
fn is_query(sql: &str) -> bool {
    tokenize(sql)
        .iter()
        .find(|t| !t.is_trivia())
        .is_some_and(|t| {
            t.kind == TokenKind::Word && {
                let word = t.text(sql);
                word.eq_ignore_ascii_case("SELECT") || word.eq_ignore_ascii_case("WITH")
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ConnectionReport, ObjectKind, SchemaName};
    use crate::infrastructure::local_storage::local_script_adapter::LocalScriptAdapter;
    use regex::Regex;
    use std::fs;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockReports {
        written: Mutex<Vec<(String, serde_json::Value)>>,
        csv_rows: Mutex<usize>,
    }

    impl ReportPort for MockReports {
        fn write_json(&self, name: &str, value: &serde_json::Value) -> Result<PathBuf> {
            self.written
                .lock()
                .unwrap()
                .push((name.to_string(), value.clone()));
            Ok(PathBuf::from(format!("{}.json", name)))
        }

        fn write_access_csv(&self, name: &str, rows: &[ObjectAccess]) -> Result<PathBuf> {
            *self.csv_rows.lock().unwrap() = rows.len();
            Ok(PathBuf::from(format!("{}.csv", name)))
        }
    }

    impl MockReports {
        fn last(&self, name: &str) -> serde_json::Value {
            self.written
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .unwrap()
        }
    }

    /// Sees NOTA as a table and FN_TOTAL as a function; PEDIDO lives elsewhere.
    struct MockCatalog {
        lookups: Mutex<Vec<String>>,
    }

    impl CatalogPort for MockCatalog {
        fn current_user(&self) -> Result<String> {
            Ok("MIGRACAO".to_string())
        }

        fn check_object(
            &self,
            _schema: &str,
            name: &str,
            requested: ObjectKind,
        ) -> Result<ObjectAccess> {
            self.lookups.lock().unwrap().push(name.to_string());
            Ok(match name {
                "NOTA" => ObjectAccess::accessible(name, requested, ObjectKind::Table),
                "FN_TOTAL" => ObjectAccess::accessible(name, requested, ObjectKind::Function),
                "BROKEN" => return Err(QualifierError::OracleError("ORA-03113".to_string())),
                _ => ObjectAccess::missing(name, requested, vec!["LEGADO".to_string()]),
            })
        }

        fn connection_report(&self) -> Result<ConnectionReport> {
            unimplemented!()
        }

        fn probe_query(&self, sql: &str) -> Result<()> {
            if sql.contains("PEDIDO") {
                Err(QualifierError::OracleError(
                    "ORA-00942: table or view does not exist".to_string(),
                ))
            } else {
                Ok(())
            }
        }
    }

    fn orchestrator() -> (Orchestrator, Arc<MockReports>) {
        let patterns = vec![Regex::new(r"^test.*\.sql$").unwrap()];
        let reports = Arc::new(MockReports::default());
        let qualifier = SchemaQualifier::new(SchemaName::new("BENTIVI").unwrap());
        let orch = Orchestrator::new(
            Arc::new(LocalScriptAdapter::new(patterns)),
            reports.clone(),
            qualifier,
        );
        (orch, reports)
    }

    fn scripts_dir() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let sqls = root.path().join("sqls");
        fs::create_dir(&sqls).unwrap();
        fs::write(
            sqls.join("pedidos.sql"),
            "SELECT * FROM PEDIDO P JOIN IPEDIDO I ON P.ID = I.PEDIDO_ID",
        )
        .unwrap();
        fs::write(sqls.join("cfo.sql"), "UPDATE BENTIVI.CFO SET X=1").unwrap();
        fs::write(sqls.join("test_skip.sql"), "SELECT * FROM NOTA").unwrap();
        root
    }

    #[test]
    fn test_qualify_directory_to_new_path() {
        let root = scripts_dir();
        let input = root.path().join("sqls");
        let out = root.path().join("out");
        let (orch, reports) = orchestrator();

        let run = orch
            .qualify_path(&input, OutputTarget::Path(out.clone()))
            .unwrap();

        assert!(run.backup.is_none());
        assert_eq!(run.outcomes.len(), 2);
        assert_eq!(run.failed(), 0);
        assert_eq!(run.substitutions(), 2);
        assert_eq!(
            fs::read_to_string(out.join("pedidos.sql")).unwrap(),
            "SELECT * FROM BENTIVI.PEDIDO P JOIN BENTIVI.IPEDIDO I ON P.ID = I.PEDIDO_ID"
        );
        assert_eq!(
            fs::read_to_string(out.join("cfo.sql")).unwrap(),
            "UPDATE BENTIVI.CFO SET X=1"
        );
        assert!(!out.join("test_skip.sql").exists());
        // Input untouched.
        assert_eq!(
            fs::read_to_string(input.join("pedidos.sql")).unwrap(),
            "SELECT * FROM PEDIDO P JOIN IPEDIDO I ON P.ID = I.PEDIDO_ID"
        );

        let report = reports.last("qualify_report");
        assert_eq!(report["summary"]["modified_files"], 1);
        assert_eq!(report["summary"]["substitutions"], 2);
    }

    #[test]
    fn test_qualify_in_place_backs_up_first() {
        let root = scripts_dir();
        let input = root.path().join("sqls");
        let (orch, _) = orchestrator();

        let run = orch.qualify_path(&input, OutputTarget::InPlace).unwrap();

        let backup = run.backup.clone().unwrap();
        assert!(backup.starts_with(root.path().join("sqls_backup")));
        assert_eq!(
            fs::read_to_string(backup.join("pedidos.sql")).unwrap(),
            "SELECT * FROM PEDIDO P JOIN IPEDIDO I ON P.ID = I.PEDIDO_ID"
        );
        assert!(fs::read_to_string(input.join("pedidos.sql"))
            .unwrap()
            .starts_with("SELECT * FROM BENTIVI.PEDIDO"));

        // A second run changes nothing.
        let again = orch.qualify_path(&input, OutputTarget::InPlace).unwrap();
        assert_eq!(again.substitutions(), 0);
    }

    #[test]
    fn test_qualify_single_file_into_directory() {
        let root = scripts_dir();
        let input = root.path().join("sqls").join("pedidos.sql");
        let out = root.path().join("single");
        fs::create_dir(&out).unwrap();
        let (orch, _) = orchestrator();

        let run = orch.qualify_path(&input, OutputTarget::Path(out.clone())).unwrap();
        assert_eq!(run.outcomes[0].destination, Some(out.join("pedidos.sql")));
        assert!(out.join("pedidos.sql").exists());
    }

    #[test]
    fn test_output_over_input_takes_backup() {
        let root = scripts_dir();
        let input = root.path().join("sqls").join("pedidos.sql");
        let (orch, _) = orchestrator();

        let run = orch
            .qualify_path(&input, OutputTarget::Path(input.clone()))
            .unwrap();

        let backup = run.backup.clone().unwrap();
        assert_eq!(
            fs::read_to_string(backup).unwrap(),
            "SELECT * FROM PEDIDO P JOIN IPEDIDO I ON P.ID = I.PEDIDO_ID"
        );
        assert!(fs::read_to_string(&input)
            .unwrap()
            .starts_with("SELECT * FROM BENTIVI.PEDIDO"));

        // Same for a directory written onto itself.
        let dir = root.path().join("sqls");
        let run = orch
            .qualify_path(&dir, OutputTarget::Path(dir.join(".")))
            .unwrap();
        assert!(run
            .backup
            .unwrap()
            .starts_with(root.path().join("sqls_backup")));
    }

    #[test]
    fn test_qualify_missing_input() {
        let root = tempfile::tempdir().unwrap();
        let (orch, _) = orchestrator();
        let err = orch
            .qualify_path(&root.path().join("nope"), OutputTarget::InPlace)
            .unwrap_err();
        assert!(matches!(err, QualifierError::InputError { .. }));
    }

    #[test]
    fn test_unreadable_script_is_reported_not_fatal() {
        let root = scripts_dir();
        let input = root.path().join("sqls");
        fs::write(input.join("latin1.sql"), [b'S', 0xE7, 0xE3]).unwrap();
        let (orch, _) = orchestrator();

        let run = orch
            .qualify_path(&input, OutputTarget::Path(root.path().join("out")))
            .unwrap();
        assert_eq!(run.failed(), 1);
        assert_eq!(run.outcomes.len(), 3);

        let verify = orch.verify_path(&input).unwrap();
        assert_eq!(verify.unreadable.len(), 1);
        assert!(!verify.is_clean());
    }

    #[test]
    fn test_verify_path() {
        let root = scripts_dir();
        let input = root.path().join("sqls");
        let (orch, reports) = orchestrator();

        let before = orch.verify_path(&input).unwrap();
        assert!(!before.is_clean());
        let report = reports.last("verify_report");
        assert_eq!(
            report["summary"]["unqualified_tables"],
            json!(["IPEDIDO", "PEDIDO"])
        );
        assert_eq!(report["summary"]["qualified_references"], 1);

        orch.qualify_path(&input, OutputTarget::InPlace).unwrap();
        let after = orch.verify_path(&input).unwrap();
        assert!(after.is_clean());
    }

    #[test]
    fn test_check_access_deduplicates_lookups() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("a.sql"),
            "SELECT BENTIVI.FN_TOTAL(N.ID) FROM BENTIVI.NOTA N JOIN BENTIVI.PEDIDO P ON 1=1",
        )
        .unwrap();
        fs::write(
            root.path().join("b.sql"),
            "DELETE FROM BENTIVI.NOTA WHERE 1=0; SELECT * FROM BENTIVI.BROKEN",
        )
        .unwrap();
        let (orch, reports) = orchestrator();
        let catalog = MockCatalog {
            lookups: Mutex::new(Vec::new()),
        };

        let run = orch.check_access(root.path(), &catalog).unwrap();

        assert_eq!(run.user, "MIGRACAO");
        assert_eq!(run.results.len(), 4);
        let mut lookups = catalog.lookups.lock().unwrap().clone();
        lookups.sort();
        assert_eq!(lookups, vec!["BROKEN", "FN_TOTAL", "NOTA", "PEDIDO"]);

        let denied: Vec<&str> = run
            .inaccessible()
            .iter()
            .map(|r| r.object_name.as_str())
            .collect();
        assert!(denied.contains(&"PEDIDO"));
        assert!(denied.contains(&"BROKEN"));
        assert_eq!(*reports.csv_rows.lock().unwrap(), 4);
        assert_eq!(reports.last("access_check")["summary"]["accessible"], 2);
    }

    #[test]
    fn test_probe_scripts() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("a_ok.sql"), "SELECT * FROM BENTIVI.NOTA;").unwrap();
        fs::write(root.path().join("b_bad.sql"), "-- pedidos\nSELECT * FROM PEDIDO").unwrap();
        fs::write(root.path().join("c_upd.sql"), "UPDATE BENTIVI.CFO SET X=1").unwrap();
        let (orch, _) = orchestrator();
        let catalog = MockCatalog {
            lookups: Mutex::new(Vec::new()),
        };

        let results = orch.probe_scripts(root.path(), &catalog).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].ok);
        assert!(!results[1].ok);
        assert!(results[1].error.as_deref().unwrap().contains("ORA-00942"));
    }

    #[test]
    fn test_is_query() {
        assert!(is_query("  /* hdr */ select 1 from dual"));
        assert!(is_query("WITH x AS (SELECT 1 FROM DUAL) SELECT * FROM x"));
        assert!(!is_query("UPDATE T SET A = 1"));
        assert!(!is_query(""));
    }
}
