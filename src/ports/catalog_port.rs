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

//! # Catalog Port
//!
//! Read-only questions asked of the source database's data dictionary while
//! diagnosing access problems (ORA-00942 "table or view does not exist",
//! ORA-00904 "invalid identifier"). Implemented for Oracle in
//! `infrastructure::oracle`; tests use an in-memory mock.

use crate::domain::entities::{ConnectionReport, ObjectAccess, ObjectKind};
use crate::domain::errors::Result;

pub trait CatalogPort: Send + Sync {
    /// The user the session is connected as.
    fn current_user(&self) -> Result<String>;

    /// Looks `schema.name` up as a table, then a view, then a routine or
    /// package, then a synonym. When nothing is visible, the result lists the
    /// other owners that hold an object of that name.
    fn check_object(&self, schema: &str, name: &str, requested: ObjectKind)
        -> Result<ObjectAccess>;

    /// Basic facts about the session: server time, visible tables, grants, roles.
    fn connection_report(&self) -> Result<ConnectionReport>;

    /// Executes `sql` wrapped so that at most one row is fetched.
    fn probe_query(&self, sql: &str) -> Result<()>;
}
