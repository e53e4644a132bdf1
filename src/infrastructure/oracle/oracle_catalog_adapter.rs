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

//! Infrastructure adapter answering catalog questions from the Oracle data dictionary.

use crate::domain::entities::{ConnectionReport, ObjectAccess, ObjectKind};
use crate::domain::errors::Result;
use crate::domain::lexer::tokenize;
use crate::infrastructure::oracle::connection_manager::OracleConnectionManager;
use crate::ports::catalog_port::CatalogPort;
use log::{debug, info};
use oracle::sql_type::ToSql;
use oracle::Connection;
use r2d2::Pool;
use std::sync::Arc;

const SQL_CURRENT_USER: &str = "SELECT USER FROM DUAL";
const SQL_SERVER_TIME: &str = "SELECT TO_CHAR(SYSDATE, 'YYYY-MM-DD HH24:MI:SS') FROM DUAL";
const SQL_TABLE_EXISTS: &str =
    "SELECT COUNT(*) FROM all_tables WHERE owner = :1 AND table_name = :2";
const SQL_VIEW_EXISTS: &str = "SELECT COUNT(*) FROM all_views WHERE owner = :1 AND view_name = :2";
const SQL_ROUTINE_TYPE: &str = "
    SELECT object_type
    FROM all_objects
    WHERE owner = :1
      AND object_name = :2
      AND object_type IN ('FUNCTION', 'PROCEDURE', 'PACKAGE')
      AND ROWNUM = 1
";
const SQL_SYNONYM_EXISTS: &str = "
    SELECT COUNT(*)
    FROM all_synonyms
    WHERE owner IN (:1, 'PUBLIC')
      AND synonym_name = :2
";
const SQL_OTHER_OWNERS: &str = "
    SELECT owner FROM (
        SELECT DISTINCT owner
        FROM all_objects
        WHERE object_name = :1
          AND owner <> :2
        ORDER BY owner
    )
    WHERE ROWNUM <= 5
";
const SQL_OWNED_TABLES: &str = "SELECT COUNT(*) FROM user_tables";
const SQL_VISIBLE_TABLES: &str = "SELECT COUNT(*) FROM all_tables";
const SQL_TABLE_PRIVS: &str = "SELECT COUNT(*) FROM all_tab_privs WHERE grantee = USER";
const SQL_ROLES: &str = "SELECT granted_role FROM user_role_privs ORDER BY granted_role";

/// Concrete implementation of `CatalogPort` backed by an r2d2 pool.
pub struct OracleCatalogAdapter {
    pool: Arc<Pool<OracleConnectionManager>>,
}

impl OracleCatalogAdapter {
    pub fn new(pool: Arc<Pool<OracleConnectionManager>>) -> Self {
        Self { pool }
    }

    fn count(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<u64> {
        let row = conn.query_row(sql, params)?;
        Ok(row.get::<usize, u64>(0)?)
    }

    fn strings(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<String>> {
        let rows = conn.query(sql, params)?;
        let mut out = Vec::new();
        for row_result in rows {
            let row = row_result?;
            out.push(row.get::<usize, String>(0)?);
        }
        Ok(out)
    }
}

/// Wraps a script so the server plans and runs it but returns at most one row.
///
/// Leading and trailing comments and the `;` terminator are dropped, so a
/// trailing `--` comment cannot swallow the closing parenthesis.
pub fn probe_sql(sql: &str) -> String {
    let tokens = tokenize(sql);
    let end = tokens
        .iter()
        .rev()
        .find(|t| !t.is_trivia() && !t.is_punct(';'))
        .map_or(0, |t| t.end);
    let start = tokens
        .iter()
        .find(|t| !t.is_trivia())
        .map_or(0, |t| t.start)
        .min(end);
    format!("SELECT * FROM ({}) WHERE ROWNUM <= 1", &sql[start..end])
}

impl CatalogPort for OracleCatalogAdapter {
    fn current_user(&self) -> Result<String> {
        let conn = self.pool.get()?;
        let row = conn.query_row(SQL_CURRENT_USER, &[])?;
        Ok(row.get::<usize, String>(0)?)
    }

    fn check_object(
        &self,
        schema: &str,
        name: &str,
        requested: ObjectKind,
    ) -> Result<ObjectAccess> {
        let conn = self.pool.get()?;
        let owner = schema.to_uppercase();
        let object = name.to_uppercase();
        debug!("Checking {}.{} ({})", owner, object, requested);

        if Self::count(&conn, SQL_TABLE_EXISTS, &[&owner, &object])? > 0 {
            return Ok(ObjectAccess::accessible(&object, requested, ObjectKind::Table));
        }
        if Self::count(&conn, SQL_VIEW_EXISTS, &[&owner, &object])? > 0 {
            return Ok(ObjectAccess::accessible(&object, requested, ObjectKind::View));
        }
        if let Some(kind) = Self::strings(&conn, SQL_ROUTINE_TYPE, &[&owner, &object])?
            .first()
        {
            return Ok(ObjectAccess::accessible(
                &object,
                requested,
                ObjectKind::from_oracle(kind),
            ));
        }
        if Self::count(&conn, SQL_SYNONYM_EXISTS, &[&owner, &object])? > 0 {
            return Ok(ObjectAccess::accessible(&object, requested, ObjectKind::Synonym));
        }

        let others = Self::strings(&conn, SQL_OTHER_OWNERS, &[&object, &owner])?;
        Ok(ObjectAccess::missing(&object, requested, others))
    }

    fn connection_report(&self) -> Result<ConnectionReport> {
        let conn = self.pool.get()?;
        let user: String = conn.query_row(SQL_CURRENT_USER, &[])?.get(0)?;
        let server_time: String = conn.query_row(SQL_SERVER_TIME, &[])?.get(0)?;
        info!("Connected as {} (server time {})", user, server_time);

        Ok(ConnectionReport {
            user,
            server_time,
            owned_tables: Self::count(&conn, SQL_OWNED_TABLES, &[])?,
            visible_tables: Self::count(&conn, SQL_VISIBLE_TABLES, &[])?,
            table_privileges: Self::count(&conn, SQL_TABLE_PRIVS, &[])?,
            roles: Self::strings(&conn, SQL_ROLES, &[])?,
        })
    }

    fn probe_query(&self, sql: &str) -> Result<()> {
        let conn = self.pool.get()?;
        let mut rows = conn.query(&probe_sql(sql), &[])?;
        if let Some(row) = rows.next() {
            row?;
        }
        Ok(())
    }
}
