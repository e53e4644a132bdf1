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

use crate::config::OracleConfig;
use oracle::{Connection, Error};
use r2d2::ManageConnection;

/// R2D2 connection manager for the source Oracle database.
pub struct OracleConnectionManager {
    user: String,
    pass: String,
    conn_str: String,
}

impl OracleConnectionManager {
    pub fn new(user: &str, pass: &str, conn_str: &str) -> Self {
        Self {
            user: user.to_string(),
            pass: pass.to_string(),
            conn_str: conn_str.to_string(),
        }
    }

    /// Builds a manager from validated settings; missing credentials become empty strings
    /// and are rejected by the server, so callers run `validate_oracle` first.
    pub fn from_config(config: &OracleConfig) -> Self {
        Self::new(
            config.username.as_deref().unwrap_or_default(),
            config.password.as_deref().unwrap_or_default(),
            &config.get_connection_string(),
        )
    }

    pub fn target(&self) -> String {
        format!("{}@{}", self.user, self.conn_str)
    }
}

// Keeps the password out of logs.
impl std::fmt::Debug for OracleConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConnectionManager")
            .field("user", &self.user)
            .field("conn_str", &self.conn_str)
            .finish_non_exhaustive()
    }
}

impl ManageConnection for OracleConnectionManager {
    type Connection = Connection;
    type Error = Error;

    fn connect(&self) -> std::result::Result<Self::Connection, Self::Error> {
        Connection::connect(&self.user, &self.pass, &self.conn_str)
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> std::result::Result<(), Self::Error> {
        conn.ping()
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_password() {
        let mut config = OracleConfig::default();
        config.host = Some("db.local".to_string());
        config.username = Some("GEODATA".to_string());
        config.password = Some("hunter2".to_string());

        let manager = OracleConnectionManager::from_config(&config);
        let debug = format!("{:?}", manager);
        assert!(!debug.contains("hunter2"));
        assert_eq!(manager.target(), "GEODATA@//db.local:1521/ORCL");
    }
}
