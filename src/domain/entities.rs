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

//! # Domain Entities
//!
//! The nouns of the application: schema names, table references found in SQL
//! text, the documents being rewritten, and the report rows produced by the
//! verification and access-check passes.
//!
//! Report types derive `Serialize` so the report adapter can turn them into
//! JSON and CSV without extra mapping code.

use crate::domain::errors::{QualifierError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The namespace every bare table reference is prefixed with (e.g. `BENTIVI`).
///
/// The casing supplied by the user is preserved in the output; comparisons
/// against existing qualifiers are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaName(String);

impl SchemaName {
    pub fn new(name: &str) -> Result<Self> {
        let name = name.trim();
        let mut chars = name.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#'));
        if !valid_start || !valid_rest {
            return Err(QualifierError::InvalidSchema(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison with a qualifier found in SQL text.
    pub fn matches(&self, qualifier: &str) -> bool {
        let bare = qualifier.trim_matches('"');
        if qualifier.starts_with('"') {
            bare == self.0.to_ascii_uppercase() || bare == self.0
        } else {
            bare.eq_ignore_ascii_case(&self.0)
        }
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for SchemaName {
    type Error = QualifierError;

    fn try_from(value: &str) -> Result<Self> {
        SchemaName::new(value)
    }
}

/// The keyword phrase that introduced a table reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClauseKeyword {
    From,
    Join,
    InnerJoin,
    LeftJoin,
    RightJoin,
    FullJoin,
    Update,
    InsertInto,
    DeleteFrom,
}

impl ClauseKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClauseKeyword::From => "FROM",
            ClauseKeyword::Join => "JOIN",
            ClauseKeyword::InnerJoin => "INNER JOIN",
            ClauseKeyword::LeftJoin => "LEFT JOIN",
            ClauseKeyword::RightJoin => "RIGHT JOIN",
            ClauseKeyword::FullJoin => "FULL JOIN",
            ClauseKeyword::Update => "UPDATE",
            ClauseKeyword::InsertInto => "INSERT INTO",
            ClauseKeyword::DeleteFrom => "DELETE FROM",
        }
    }
}

impl fmt::Display for ClauseKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One occurrence of `<keyword> <identifier>` in a SQL document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReference {
    pub keyword: ClauseKeyword,
    /// Table name exactly as written (quoted identifiers keep their quotes).
    pub identifier: String,
    /// Owner prefix when the reference is written `<owner>.<table>`.
    pub qualifier: Option<String>,
    /// Byte offset of the first character of the reference (qualifier included).
    pub start: usize,
    pub end: usize,
}

impl TableReference {
    pub fn is_qualified(&self) -> bool {
        self.qualifier.is_some()
    }

    pub fn is_qualified_with(&self, schema: &SchemaName) -> bool {
        self.qualifier.as_deref().is_some_and(|q| schema.matches(q))
    }

    /// Upper-cased table name without quotes, used for reporting.
    pub fn normalized_name(&self) -> String {
        normalize_identifier(&self.identifier)
    }
}

/// Strips quotes from a quoted identifier, upper-cases a bare one.
pub fn normalize_identifier(raw: &str) -> String {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        raw[1..raw.len() - 1].replace("\"\"", "\"")
    } else {
        raw.to_ascii_uppercase()
    }
}

/// The original SQL text and its rewritten form.
#[derive(Debug, Clone)]
pub struct SqlDocument {
    original: String,
    rewritten: String,
}

impl SqlDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let original = text.into();
        Self {
            rewritten: original.clone(),
            original,
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn rewritten(&self) -> &str {
        &self.rewritten
    }

    pub(crate) fn set_rewritten(&mut self, text: String) {
        self.rewritten = text;
    }

    pub fn is_modified(&self) -> bool {
        self.original != self.rewritten
    }

    pub fn into_rewritten(self) -> String {
        self.rewritten
    }
}

/// Kinds of Oracle dictionary objects a script may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectKind {
    Table,
    View,
    Function,
    Procedure,
    Package,
    Synonym,
    Unknown,
}

impl ObjectKind {
    /// Maps an `ALL_OBJECTS.OBJECT_TYPE` value.
    pub fn from_oracle(object_type: &str) -> Self {
        match object_type.to_ascii_uppercase().as_str() {
            "TABLE" => ObjectKind::Table,
            "VIEW" => ObjectKind::View,
            "FUNCTION" => ObjectKind::Function,
            "PROCEDURE" => ObjectKind::Procedure,
            "PACKAGE" | "PACKAGE BODY" => ObjectKind::Package,
            "SYNONYM" => ObjectKind::Synonym,
            _ => ObjectKind::Unknown,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectKind::Table => "TABLE",
            ObjectKind::View => "VIEW",
            ObjectKind::Function => "FUNCTION",
            ObjectKind::Procedure => "PROCEDURE",
            ObjectKind::Package => "PACKAGE",
            ObjectKind::Synonym => "SYNONYM",
            ObjectKind::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A schema object named in a script, and what the script uses it as.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ReferencedObject {
    pub name: String,
    pub requested: ObjectKind,
}

/// Result of looking one referenced object up in the data dictionary.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectAccess {
    pub object_name: String,
    pub requested: ObjectKind,
    /// What the dictionary says the object is, when the connected user can see it.
    pub found: Option<ObjectKind>,
    /// Other owners holding an object with this name (only filled in when not found).
    pub other_owners: Vec<String>,
    pub error: Option<String>,
}

impl ObjectAccess {
    pub fn accessible(object_name: &str, requested: ObjectKind, found: ObjectKind) -> Self {
        Self {
            object_name: object_name.to_string(),
            requested,
            found: Some(found),
            other_owners: Vec::new(),
            error: None,
        }
    }

    pub fn missing(object_name: &str, requested: ObjectKind, other_owners: Vec<String>) -> Self {
        Self {
            object_name: object_name.to_string(),
            requested,
            found: None,
            other_owners,
            error: None,
        }
    }

    pub fn failed(object_name: &str, requested: ObjectKind, error: String) -> Self {
        Self {
            object_name: object_name.to_string(),
            requested,
            found: None,
            other_owners: Vec::new(),
            error: Some(error),
        }
    }

    pub fn has_access(&self) -> bool {
        self.found.is_some()
    }
}

/// Outcome of qualifying one script file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub substitutions: usize,
    pub modified: bool,
    /// Either "SUCCESS" or "FAILED".
    pub status: String,
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn success(source: PathBuf, destination: PathBuf, substitutions: usize) -> Self {
        Self {
            source,
            destination: Some(destination),
            substitutions,
            modified: substitutions > 0,
            status: "SUCCESS".to_string(),
            error: None,
        }
    }

    pub fn failure(source: PathBuf, error: String) -> Self {
        Self {
            source,
            destination: None,
            substitutions: 0,
            modified: false,
            status: "FAILED".to_string(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "SUCCESS"
    }
}

/// Qualified vs. unqualified reference counts for one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub source: Option<PathBuf>,
    /// References already prefixed with the target schema.
    pub qualified_count: usize,
    /// Bare table names still lacking a prefix (upper-cased, sorted, unique).
    pub unqualified_tables: Vec<String>,
    /// References prefixed with some other owner, as `OWNER.TABLE`.
    pub foreign_qualified: Vec<String>,
}

impl VerificationReport {
    pub fn is_clean(&self) -> bool {
        self.unqualified_tables.is_empty()
    }
}

/// What the `ping` command learns about the connected Oracle user.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub user: String,
    pub server_time: String,
    pub owned_tables: u64,
    pub visible_tables: u64,
    pub table_privileges: u64,
    pub roles: Vec<String>,
}

/// Result of running one script's probe query.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub source: PathBuf,
    pub ok: bool,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_name_validation() {
        assert_eq!(SchemaName::new("BENTIVI").unwrap().as_str(), "BENTIVI");
        assert_eq!(SchemaName::new(" geo_data$1 ").unwrap().as_str(), "geo_data$1");
        assert!(SchemaName::new("").is_err());
        assert!(SchemaName::new("1ABC").is_err());
        assert!(SchemaName::new("BENTIVI.X").is_err());
        assert!(SchemaName::try_from("has space").is_err());
    }

    #[test]
    fn test_schema_name_matches_case_insensitively() {
        let schema = SchemaName::new("Bentivi").unwrap();
        assert!(schema.matches("BENTIVI"));
        assert!(schema.matches("bentivi"));
        assert!(schema.matches("\"BENTIVI\""));
        assert!(!schema.matches("\"bentivi\""));
        assert!(!schema.matches("GEODATA"));
    }

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("nota"), "NOTA");
        assert_eq!(normalize_identifier("\"Nota\""), "Nota");
    }

    #[test]
    fn test_sql_document_lifecycle() {
        let mut doc = SqlDocument::new("SELECT 1 FROM T");
        assert!(!doc.is_modified());
        doc.set_rewritten("SELECT 1 FROM S.T".to_string());
        assert!(doc.is_modified());
        assert_eq!(doc.original(), "SELECT 1 FROM T");
        assert_eq!(doc.into_rewritten(), "SELECT 1 FROM S.T");
    }

    #[test]
    fn test_object_kind_from_oracle() {
        assert_eq!(ObjectKind::from_oracle("package body"), ObjectKind::Package);
        assert_eq!(ObjectKind::from_oracle("FUNCTION"), ObjectKind::Function);
        assert_eq!(ObjectKind::from_oracle("TYPE"), ObjectKind::Unknown);
    }
}
