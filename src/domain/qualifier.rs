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
//! Rewrites bare table references (`FROM NOTA`) into schema-qualified ones
//! (`FROM BENTIVI.NOTA`).
//!
//! The document is tokenized once and every clause keyword is classified in a
//! single left-to-right walk over the significant tokens:
//!
//! - `FROM`, `JOIN` (with any `INNER`/`LEFT`/`RIGHT`/`FULL` prefix), `UPDATE`,
//!   `INSERT INTO` and `DELETE FROM` introduce a table reference when the next
//!   significant token is a name.
//! - A name followed by `.` is already qualified and is left alone, whatever
//!   the owner.
//! - Reserved words, exempt tables (`DUAL`) and the CTE names of the current
//!   statement are never references.
//! - Comments and string literals are single tokens, so nothing inside them
//!   is ever rewritten.
//!
//! Only the identifier directly after the keyword is considered: aliases and
//! the rest of a comma-separated `FROM` list are untouched. The rewrite
//! inserts `<schema>.` in front of each reference and copies every other byte
//! of the input unchanged, which makes the transformation idempotent.

use crate::domain::entities::{
    normalize_identifier, ClauseKeyword, SchemaName, SqlDocument, TableReference,
};
use crate::domain::keywords::{is_split_from_function, Denylist};
use crate::domain::lexer::{tokenize, Token, TokenKind};
use log::debug;
use std::collections::HashSet;
use std::ops::Range;

/// Schema-qualifies table references in SQL text.
#[derive(Debug, Clone)]
pub struct SchemaQualifier {
    schema: SchemaName,
    denylist: Denylist,
    known_tables: Option<HashSet<String>>,
}

impl SchemaQualifier {
    pub fn new(schema: SchemaName) -> Self {
        Self {
            schema,
            denylist: Denylist::default(),
            known_tables: None,
        }
    }

    pub fn with_denylist(mut self, denylist: Denylist) -> Self {
        self.denylist = denylist;
        self
    }

    /// Restricts qualification to the given tables (case-insensitive).
    ///
    /// Names are compared as whole tokens, so `NOTA` never matches `NOTAORIG`.
    pub fn with_known_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.known_tables = Some(
            tables
                .into_iter()
                .map(|t| normalize_identifier(t.as_ref()))
                .collect(),
        );
        self
    }

    pub fn schema(&self) -> &SchemaName {
        &self.schema
    }

    pub fn denylist(&self) -> &Denylist {
        &self.denylist
    }

    /// Lists every table reference in `sql`, qualified or not.
    pub fn scan(&self, sql: &str) -> Vec<TableReference> {
        scan_references(sql, &self.denylist)
    }

    /// Returns `sql` with `<schema>.` inserted before every bare table reference.
    pub fn qualify(&self, sql: &str) -> String {
        self.rewrite(sql).0
    }

    /// Qualifies the document's current text in place and returns the number
    /// of references that were prefixed.
    pub fn qualify_document(&self, doc: &mut SqlDocument) -> usize {
        let (text, count) = self.rewrite(doc.rewritten());
        if count > 0 {
            doc.set_rewritten(text);
        }
        count
    }

    fn wants(&self, reference: &TableReference) -> bool {
        if reference.is_qualified() {
            return false;
        }
        match &self.known_tables {
            Some(known) => known.contains(&reference.normalized_name()),
            None => true,
        }
    }

    fn rewrite(&self, sql: &str) -> (String, usize) {
        let references = self.scan(sql);
        let prefix = format!("{}.", self.schema);
        let mut out = String::with_capacity(sql.len() + references.len() * prefix.len());
        let mut last = 0;
        let mut count = 0;

        for reference in references.iter().filter(|r| self.wants(r)) {
            debug!(
                "Qualifying {} {} at byte {}",
                reference.keyword, reference.identifier, reference.start
            );
            out.push_str(&sql[last..reference.start]);
            out.push_str(&prefix);
            last = reference.start;
            count += 1;
        }
        out.push_str(&sql[last..]);

        (out, count)
    }
}

fn word_upper(sql: &str, token: Option<&&Token>) -> Option<String> {
    token
        .filter(|t| t.kind == TokenKind::Word)
        .map(|t| t.text(sql).to_ascii_uppercase())
}

/// Token ranges of the statements in `sig`, split after each `;`.
fn statement_ranges(sig: &[&Token]) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for (i, token) in sig.iter().enumerate() {
        if token.is_punct(';') {
            ranges.push(start..i + 1);
            start = i + 1;
        }
    }
    if start < sig.len() {
        ranges.push(start..sig.len());
    }
    ranges
}

/// Names defined by `WITH name AS (` or `, name AS (` within one statement.
fn collect_cte_names(sql: &str, sig: &[&Token]) -> HashSet<String> {
    let mut names = HashSet::new();
    for j in 1..sig.len().saturating_sub(2) {
        let opens_cte = sig[j - 1].is_punct(',')
            || word_upper(sql, sig.get(j - 1)).as_deref() == Some("WITH");
        if opens_cte
            && sig[j].is_name()
            && word_upper(sql, sig.get(j + 1)).as_deref() == Some("AS")
            && sig[j + 2].is_punct('(')
        {
            names.insert(normalize_identifier(sig[j].text(sql)));
        }
    }
    names
}

fn classify_join(sql: &str, sig: &[&Token], i: usize) -> ClauseKeyword {
    let before = |n: usize| i.checked_sub(n).and_then(|j| word_upper(sql, sig.get(j)));
    let prefix = match before(1).as_deref() {
        Some("OUTER") => before(2),
        other => other.map(str::to_string),
    };
    match prefix.as_deref() {
        Some("INNER") => ClauseKeyword::InnerJoin,
        Some("LEFT") => ClauseKeyword::LeftJoin,
        Some("RIGHT") => ClauseKeyword::RightJoin,
        Some("FULL") => ClauseKeyword::FullJoin,
        _ => ClauseKeyword::Join,
    }
}

/// Finds every `<clause keyword> <name>` occurrence outside comments and literals.
pub fn scan_references(sql: &str, denylist: &Denylist) -> Vec<TableReference> {
    let tokens = tokenize(sql);
    let sig: Vec<&Token> = tokens.iter().filter(|t| !t.is_trivia()).collect();
    // CTE names only shadow tables inside the statement that defines them.
    let statements: Vec<(Range<usize>, HashSet<String>)> = statement_ranges(&sig)
        .into_iter()
        .map(|range| {
            let names = collect_cte_names(sql, &sig[range.clone()]);
            (range, names)
        })
        .collect();
    let mut statement = 0;

    // One entry per open parenthesis: true when opened by EXTRACT(, TRIM( ...
    let mut parens: Vec<bool> = Vec::new();
    let mut references = Vec::new();

    for i in 0..sig.len() {
        while statements
            .get(statement)
            .is_some_and(|(range, _)| i >= range.end)
        {
            statement += 1;
        }
        let token = sig[i];
        match token.kind {
            TokenKind::Punct('(') => {
                let split_from = word_upper(sql, i.checked_sub(1).and_then(|j| sig.get(j)))
                    .is_some_and(|w| is_split_from_function(&w));
                parens.push(split_from);
                continue;
            }
            TokenKind::Punct(')') => {
                parens.pop();
                continue;
            }
            TokenKind::Word => {}
            _ => continue,
        }

        // `T.FROM` is a column, not a keyword.
        if i > 0 && sig[i - 1].is_punct('.') {
            continue;
        }

        let prev = word_upper(sql, i.checked_sub(1).and_then(|j| sig.get(j)));
        let keyword = match token.text(sql).to_ascii_uppercase().as_str() {
            "FROM" => {
                if parens.last() == Some(&true) {
                    continue;
                }
                if prev.as_deref() == Some("DELETE") {
                    ClauseKeyword::DeleteFrom
                } else {
                    ClauseKeyword::From
                }
            }
            "JOIN" => classify_join(sql, &sig, i),
            "UPDATE" if prev.as_deref() != Some("FOR") => ClauseKeyword::Update,
            "INTO" if prev.as_deref() == Some("INSERT") => ClauseKeyword::InsertInto,
            _ => continue,
        };

        let Some(name) = sig.get(i + 1).filter(|t| t.is_name()) else {
            continue;
        };
        let name_text = name.text(sql);

        if sig.get(i + 2).is_some_and(|t| t.is_punct('.')) {
            if let Some(table) = sig.get(i + 3).filter(|t| t.is_name()) {
                references.push(TableReference {
                    keyword,
                    identifier: table.text(sql).to_string(),
                    qualifier: Some(name_text.to_string()),
                    start: name.start,
                    end: table.end,
                });
            }
            continue;
        }

        if name.kind == TokenKind::Word && denylist.blocks(name_text) {
            continue;
        }
        if statements
            .get(statement)
            .is_some_and(|(_, names)| names.contains(&normalize_identifier(name_text)))
        {
            continue;
        }

        references.push(TableReference {
            keyword,
            identifier: name_text.to_string(),
            qualifier: None,
            start: name.start,
            end: name.end,
        });
    }

    references
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bentivi() -> SchemaQualifier {
        SchemaQualifier::new(SchemaName::new("BENTIVI").unwrap())
    }

    #[test]
    fn test_from_and_join_with_aliases() {
        let sql = "SELECT * FROM PEDIDO P JOIN IPEDIDO I ON P.ID = I.PEDIDO_ID";
        assert_eq!(
            bentivi().qualify(sql),
            "SELECT * FROM BENTIVI.PEDIDO P JOIN BENTIVI.IPEDIDO I ON P.ID = I.PEDIDO_ID"
        );
    }

    #[test]
    fn test_already_qualified_is_untouched() {
        let sql = "UPDATE BENTIVI.CFO SET X=1";
        assert_eq!(bentivi().qualify(sql), sql);

        let lower = "select * from bentivi.nota n";
        assert_eq!(bentivi().qualify(lower), lower);
    }

    #[test]
    fn test_comment_is_untouched() {
        let sql = "DELETE FROM NOTA WHERE ID=1 -- FROM OLDNOTA";
        assert_eq!(
            bentivi().qualify(sql),
            "DELETE FROM BENTIVI.NOTA WHERE ID=1 -- FROM OLDNOTA"
        );

        let block = "SELECT 1 /* FROM LEGACY_TABLE */ FROM T";
        assert_eq!(
            bentivi().qualify(block),
            "SELECT 1 /* FROM LEGACY_TABLE */ FROM BENTIVI.T"
        );
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "SELECT * FROM PEDIDO P JOIN IPEDIDO I ON P.ID = I.PEDIDO_ID",
            "INSERT INTO LOG_TAB SELECT * FROM (SELECT ID FROM NOTA) X",
            "update cfo set x = 1 where id in (select id from transac)",
            "SELECT a FROM t1 LEFT OUTER JOIN t2 ON t1.id = t2.id -- FROM t3",
        ];
        let q = bentivi();
        for sql in samples {
            let once = q.qualify(sql);
            assert_eq!(q.qualify(&once), once, "not idempotent for {}", sql);
        }
    }

    #[test]
    fn test_prefix_table_names_not_partially_matched() {
        let q = bentivi().with_known_tables(["NOTA", "NOTAORIG"]);
        assert_eq!(
            q.qualify("SELECT * FROM NOTAORIG NO JOIN NOTA N ON N.ID = NO.ID"),
            "SELECT * FROM BENTIVI.NOTAORIG NO JOIN BENTIVI.NOTA N ON N.ID = NO.ID"
        );

        let only_nota = bentivi().with_known_tables(["nota"]);
        assert_eq!(
            only_nota.qualify("SELECT * FROM NOTAORIG JOIN nota ON 1=1"),
            "SELECT * FROM NOTAORIG JOIN BENTIVI.nota ON 1=1"
        );
    }

    #[test]
    fn test_keyword_casing_and_layout_preserved() {
        let sql = "select *\n  from\n\tpedido p\n  inner   join ipedido i on 1=1";
        assert_eq!(
            bentivi().qualify(sql),
            "select *\n  from\n\tBENTIVI.pedido p\n  inner   join BENTIVI.ipedido i on 1=1"
        );
    }

    #[test]
    fn test_subqueries_are_qualified() {
        let sql = "SELECT (SELECT MAX(V) FROM INDVALOR WHERE ID = N.ID) FROM NOTA N";
        assert_eq!(
            bentivi().qualify(sql),
            "SELECT (SELECT MAX(V) FROM BENTIVI.INDVALOR WHERE ID = N.ID) FROM BENTIVI.NOTA N"
        );
    }

    #[test]
    fn test_reserved_words_and_exempt_tables_skipped() {
        let sql = "SELECT SYSDATE FROM DUAL UNION ALL SELECT x FROM TABLE(f(1))";
        assert_eq!(bentivi().qualify(sql), sql);
    }

    #[test]
    fn test_other_owner_not_requalified() {
        let sql = "SELECT * FROM GEODATA.NOTA JOIN SYS.ALL_TABLES T ON 1=1";
        assert_eq!(bentivi().qualify(sql), sql);
    }

    #[test]
    fn test_string_literals_untouched() {
        let sql = "SELECT 'FROM NOTA' AS S FROM CFO";
        assert_eq!(
            bentivi().qualify(sql),
            "SELECT 'FROM NOTA' AS S FROM BENTIVI.CFO"
        );
    }

    #[test]
    fn test_extract_and_for_update_are_not_clauses() {
        let sql = "SELECT EXTRACT(YEAR FROM DTEMISSAO), TRIM(' ' FROM NOME) FROM NOTA FOR UPDATE NOWAIT";
        assert_eq!(
            bentivi().qualify(sql),
            "SELECT EXTRACT(YEAR FROM DTEMISSAO), TRIM(' ' FROM NOME) FROM BENTIVI.NOTA FOR UPDATE NOWAIT"
        );

        let nested = "SELECT EXTRACT(YEAR FROM (SELECT MAX(D) FROM NOTA)) FROM DUAL";
        assert_eq!(
            bentivi().qualify(nested),
            "SELECT EXTRACT(YEAR FROM (SELECT MAX(D) FROM BENTIVI.NOTA)) FROM DUAL"
        );
    }

    #[test]
    fn test_cte_names_are_not_qualified() {
        let sql = "WITH base AS (SELECT * FROM NOTA), itens AS (SELECT * FROM INOTA) \
                   SELECT * FROM base JOIN itens ON 1=1";
        assert_eq!(
            bentivi().qualify(sql),
            "WITH base AS (SELECT * FROM BENTIVI.NOTA), itens AS (SELECT * FROM BENTIVI.INOTA) \
                   SELECT * FROM base JOIN itens ON 1=1"
        );
    }

    #[test]
    fn test_cte_name_only_shadows_its_own_statement() {
        let sql = "WITH nota AS (SELECT 1 X FROM DUAL) SELECT * FROM nota;\n\
                   DELETE FROM NOTA WHERE ID = 1";
        assert_eq!(
            bentivi().qualify(sql),
            "WITH nota AS (SELECT 1 X FROM DUAL) SELECT * FROM nota;\n\
             DELETE FROM BENTIVI.NOTA WHERE ID = 1"
        );

        let refs = bentivi()
            .scan("SELECT * FROM NOTA; WITH nota AS (SELECT 1 FROM DUAL) SELECT * FROM nota");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].identifier, "NOTA");
        assert_eq!(refs[0].start, 14);
    }

    #[test]
    fn test_quoted_identifiers() {
        let sql = "SELECT * FROM \"Pedido\" p JOIN \"BENTIVI\".\"Item\" i ON 1=1";
        assert_eq!(
            bentivi().qualify(sql),
            "SELECT * FROM BENTIVI.\"Pedido\" p JOIN \"BENTIVI\".\"Item\" i ON 1=1"
        );
    }

    #[test]
    fn test_scan_classifies_keywords() {
        let sql = "INSERT /*+ APPEND */ INTO A SELECT * FROM B \
                   LEFT OUTER JOIN C ON 1=1 FULL JOIN D ON 1=1 RIGHT JOIN E ON 1=1 \
                   INNER JOIN F ON 1=1; DELETE FROM G; UPDATE H SET X = 1";
        let kinds: Vec<(ClauseKeyword, String)> = bentivi()
            .scan(sql)
            .into_iter()
            .map(|r| (r.keyword, r.identifier))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (ClauseKeyword::InsertInto, "A".to_string()),
                (ClauseKeyword::From, "B".to_string()),
                (ClauseKeyword::LeftJoin, "C".to_string()),
                (ClauseKeyword::FullJoin, "D".to_string()),
                (ClauseKeyword::RightJoin, "E".to_string()),
                (ClauseKeyword::InnerJoin, "F".to_string()),
                (ClauseKeyword::DeleteFrom, "G".to_string()),
                (ClauseKeyword::Update, "H".to_string()),
            ]
        );
    }

    #[test]
    fn test_scan_offsets_and_qualifier() {
        let sql = "SELECT 1 FROM bentivi.NOTA";
        let refs = bentivi().scan(sql);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].qualifier.as_deref(), Some("bentivi"));
        assert_eq!(&sql[refs[0].start..refs[0].end], "bentivi.NOTA");
        assert!(refs[0].is_qualified_with(bentivi().schema()));
    }

    #[test]
    fn test_select_into_is_not_insert() {
        let sql = "SELECT COUNT(*) INTO v_total FROM NOTA";
        assert_eq!(
            bentivi().qualify(sql),
            "SELECT COUNT(*) INTO v_total FROM BENTIVI.NOTA"
        );
    }

    #[test]
    fn test_qualify_document_counts() {
        let mut doc = SqlDocument::new("SELECT * FROM A JOIN B ON 1=1 JOIN BENTIVI.C ON 1=1");
        let q = bentivi();
        assert_eq!(q.qualify_document(&mut doc), 2);
        assert!(doc.is_modified());
        assert_eq!(q.qualify_document(&mut doc), 0);
        assert_eq!(
            doc.rewritten(),
            "SELECT * FROM BENTIVI.A JOIN BENTIVI.B ON 1=1 JOIN BENTIVI.C ON 1=1"
        );
    }

    #[test]
    fn test_malformed_sql_degrades_gracefully() {
        let samples = ["FROM", "SELECT * FROM (", "JOIN .", "FROM 'open", "/* FROM X"];
        for sql in samples {
            assert_eq!(bentivi().qualify(sql), sql);
        }
        assert_eq!(bentivi().qualify(""), "");
    }

    #[test]
    fn test_extra_denylist_words() {
        let q = bentivi().with_denylist(Denylist::default().with_extra_words(["PARAMS"]));
        assert_eq!(
            q.qualify("SELECT * FROM PARAMS, NOTA"),
            "SELECT * FROM PARAMS, NOTA"
        );
    }
}
