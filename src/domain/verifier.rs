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

//! # Verification
//!
//! Read-only passes run after (or instead of) qualification.
//!
//! `verify` counts the references that carry the target schema and lists the
//! ones that still do not. `referenced_objects` lists the schema objects a
//! script depends on, which the access check then looks up in the Oracle
//! data dictionary. Both reuse the qualifier's scanner, so "unqualified" means
//! exactly what the rewriter would have prefixed.

use crate::domain::entities::{
    normalize_identifier, ObjectKind, ReferencedObject, SchemaName, VerificationReport,
};
use crate::domain::keywords::Denylist;
use crate::domain::lexer::{tokenize, Token};
use crate::domain::qualifier::scan_references;
use std::collections::BTreeSet;

pub fn verify(sql: &str, schema: &SchemaName, denylist: &Denylist) -> VerificationReport {
    let mut qualified_count = 0;
    let mut unqualified = BTreeSet::new();
    let mut foreign = BTreeSet::new();

    for reference in scan_references(sql, denylist) {
        match reference.qualifier.as_deref() {
            Some(owner) if schema.matches(owner) => qualified_count += 1,
            Some(owner) => {
                foreign.insert(format!(
                    "{}.{}",
                    normalize_identifier(owner),
                    reference.normalized_name()
                ));
            }
            None => {
                unqualified.insert(reference.normalized_name());
            }
        }
    }

    VerificationReport {
        source: None,
        qualified_count,
        unqualified_tables: unqualified.into_iter().collect(),
        foreign_qualified: foreign.into_iter().collect(),
    }
}

/// Objects of `schema` used by the script: tables and views after clause
/// keywords, and routines called as `<schema>.<name>(` or
/// `<schema>.<package>.<member>(`.
pub fn referenced_objects(
    sql: &str,
    schema: &SchemaName,
    denylist: &Denylist,
) -> Vec<ReferencedObject> {
    let mut objects = BTreeSet::new();

    for reference in scan_references(sql, denylist) {
        if reference.is_qualified_with(schema) {
            objects.insert(ReferencedObject {
                name: reference.normalized_name(),
                requested: ObjectKind::Table,
            });
        }
    }

    let tokens = tokenize(sql);
    let sig: Vec<&Token> = tokens.iter().filter(|t| !t.is_trivia()).collect();
    for i in 0..sig.len() {
        if !(sig[i].is_name() && schema.matches(sig[i].text(sql))) {
            continue;
        }
        if !(sig.get(i + 1).is_some_and(|t| t.is_punct('.'))
            && sig.get(i + 2).is_some_and(|t| t.is_name()))
        {
            continue;
        }
        let name = normalize_identifier(sig[i + 2].text(sql));
        if sig.get(i + 3).is_some_and(|t| t.is_punct('(')) {
            objects.insert(ReferencedObject {
                name,
                requested: ObjectKind::Function,
            });
        } else if sig.get(i + 3).is_some_and(|t| t.is_punct('.'))
            && sig.get(i + 4).is_some_and(|t| t.is_name())
            && sig.get(i + 5).is_some_and(|t| t.is_punct('('))
        {
            objects.insert(ReferencedObject {
                name,
                requested: ObjectKind::Package,
            });
        }
    }

    objects.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> SchemaName {
        SchemaName::new("BENTIVI").unwrap()
    }

    #[test]
    fn test_verify_counts_and_lists() {
        let sql = "SELECT * FROM BENTIVI.NOTA N JOIN inota I ON 1=1 \
                   JOIN GEODATA.cfo C ON 1=1 LEFT JOIN INOTA X ON 1=1 -- FROM HIDDEN";
        let report = verify(sql, &schema(), &Denylist::default());
        assert_eq!(report.qualified_count, 1);
        assert_eq!(report.unqualified_tables, vec!["INOTA".to_string()]);
        assert_eq!(report.foreign_qualified, vec!["GEODATA.CFO".to_string()]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_verify_clean_after_qualification() {
        use crate::domain::qualifier::SchemaQualifier;
        let sql = "UPDATE CFO SET X = (SELECT 1 FROM DUAL); DELETE FROM NOTA";
        let qualified = SchemaQualifier::new(schema()).qualify(sql);
        let report = verify(&qualified, &schema(), &Denylist::default());
        assert!(report.is_clean());
        assert_eq!(report.qualified_count, 2);
    }

    #[test]
    fn test_referenced_objects() {
        let sql = "SELECT BENTIVI.QTDE_ENTR_PED_VEN(P.ID), bentivi.pkg_util.fmt(P.X) \
                   FROM BENTIVI.PEDIDO P \
                   JOIN TABLE(BENTIVI.CUSTO_MEDIO(1)) C ON 1=1 \
                   JOIN BENTIVI.PEDIDO P2 ON 1=1 \
                   -- BENTIVI.IGNORED(1)\n\
                   WHERE P.ID IN (SELECT ID FROM OTHER.T)";
        let objects = referenced_objects(sql, &schema(), &Denylist::default());
        let listed: Vec<(String, ObjectKind)> = objects
            .into_iter()
            .map(|o| (o.name, o.requested))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("CUSTO_MEDIO".to_string(), ObjectKind::Function),
                ("PEDIDO".to_string(), ObjectKind::Table),
                ("PKG_UTIL".to_string(), ObjectKind::Package),
                ("QTDE_ENTR_PED_VEN".to_string(), ObjectKind::Function),
            ]
        );
    }
}
