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

//! # Keyword Tables
//!
//! Words that can follow a clause keyword without naming a table.
//!
//! `RESERVED_WORDS` is Oracle's reserved-word table (the entries a bare
//! identifier can never use) plus the handful of words older migration
//! scripts filtered by hand (`TOP`, `LIMIT`, `OFFSET`) and the row-locking
//! words that follow `FOR UPDATE`. Kept sorted: lookups use binary search.

use std::collections::HashSet;

pub const RESERVED_WORDS: &[&str] = &[
    "ACCESS", "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "AUDIT", "BETWEEN", "BY",
    "CHAR", "CHECK", "CLUSTER", "COLUMN", "COMMENT", "COMPRESS", "CONNECT", "CREATE",
    "CURRENT", "DATE", "DECIMAL", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE",
    "EXCLUSIVE", "EXISTS", "FILE", "FLOAT", "FOR", "FROM", "GRANT", "GROUP", "HAVING",
    "IDENTIFIED", "IMMEDIATE", "IN", "INCREMENT", "INDEX", "INITIAL", "INSERT", "INTEGER",
    "INTERSECT", "INTO", "IS", "LATERAL", "LEVEL", "LIKE", "LIMIT", "LOCK", "LONG",
    "MAXEXTENTS", "MINUS", "MLSLABEL", "MODE", "MODIFY", "NOAUDIT", "NOCOMPRESS", "NOT",
    "NOWAIT", "NULL", "NUMBER", "OF", "OFFLINE", "OFFSET", "ON", "ONLINE", "OPTION", "OR",
    "ORDER", "PCTFREE", "PRIOR", "PRIVILEGES", "PUBLIC", "RAW", "RENAME", "RESOURCE",
    "REVOKE", "ROW", "ROWID", "ROWNUM", "ROWS", "SELECT", "SESSION", "SET", "SHARE", "SIZE",
    "SKIP", "SMALLINT", "START", "SUCCESSFUL", "SYNONYM", "SYSDATE", "TABLE", "THEN", "TO",
    "TOP", "TRIGGER", "UID", "UNION", "UNIQUE", "UPDATE", "USER", "VALIDATE", "VALUES",
    "VARCHAR", "VARCHAR2", "VIEW", "WAIT", "WHENEVER", "WHERE", "WITH",
];

/// Valid table names that must never receive a schema prefix.
pub const DEFAULT_EXEMPT_TABLES: &[&str] = &["DUAL"];

/// Functions whose argument list uses `FROM` as a separator, e.g. `EXTRACT(YEAR FROM d)`.
pub const SPLIT_FROM_FUNCTIONS: &[&str] = &["EXTRACT", "OVERLAY", "POSITION", "SUBSTRING", "TRIM"];

/// Case-insensitive lookup in the reserved-word table.
pub fn is_reserved(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    RESERVED_WORDS.binary_search(&upper.as_str()).is_ok()
}

pub fn is_split_from_function(word: &str) -> bool {
    SPLIT_FROM_FUNCTIONS
        .iter()
        .any(|f| f.eq_ignore_ascii_case(word))
}

/// Decides which identifiers after a clause keyword are not table references.
///
/// Only bare words are checked. A quoted identifier such as `"ORDER"` is
/// always a legitimate object name.
#[derive(Debug, Clone)]
pub struct Denylist {
    extra: HashSet<String>,
    exempt: HashSet<String>,
}

impl Default for Denylist {
    fn default() -> Self {
        Self {
            extra: HashSet::new(),
            exempt: DEFAULT_EXEMPT_TABLES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Denylist {
    /// Adds words (compared case-insensitively) treated like reserved words.
    pub fn with_extra_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra
            .extend(words.into_iter().map(|w| w.as_ref().to_ascii_uppercase()));
        self
    }

    /// Replaces the exempt table list (`DUAL` by default).
    pub fn with_exempt_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exempt = tables
            .into_iter()
            .map(|t| t.as_ref().to_ascii_uppercase())
            .collect();
        self
    }

    /// Returns true when `identifier` (raw token text) must not be treated as a table.
    pub fn blocks(&self, identifier: &str) -> bool {
        if identifier.starts_with('"') {
            return false;
        }
        let upper = identifier.to_ascii_uppercase();
        is_reserved(&upper) || self.extra.contains(&upper) || self.exempt.contains(&upper)
    }
}
