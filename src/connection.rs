// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Connection implementation.

use crate::client::QueryService;
use crate::config::DriverConfig;
use crate::descriptor::{Descriptor, DescriptorHandle, DescriptorOwner};
use crate::error::{DriverErrorHelper, Result};
use crate::logging::init_logging;
use crate::statement::Statement;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Represents an open connection to the query service.
///
/// A Connection owns the service client, the tokio runtime that drives its
/// async calls, and the driver configuration. Statements and explicit
/// descriptors are allocated from it.
#[derive(Debug)]
pub struct Connection {
    id: u64,
    config: DriverConfig,

    // Query service (trait object for backend flexibility)
    service: Arc<dyn QueryService>,

    // Tokio runtime for async operations
    runtime: tokio::runtime::Runtime,

    next_statement_id: u64,
}

impl Connection {
    pub fn new(config: DriverConfig, service: Arc<dyn QueryService>) -> Result<Self> {
        init_logging(&config.log);
        let runtime = tokio::runtime::Runtime::new().map_err(|e| {
            DriverErrorHelper::io().message(format!("Failed to create async runtime: {}", e))
        })?;
        let id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
        info!("Opened connection {}", id);
        Ok(Self {
            id,
            config,
            service,
            runtime,
            next_statement_id: 1,
        })
    }

    /// Open a connection configured from a connection string.
    pub fn connect(connection_string: &str, service: Arc<dyn QueryService>) -> Result<Self> {
        Self::new(DriverConfig::from_connection_string(connection_string)?, service)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Allocate a statement with its four implicit descriptors.
    pub fn new_statement(&mut self) -> Statement {
        let statement_id = self.next_statement_id;
        self.next_statement_id += 1;
        Statement::new(
            self.id,
            statement_id,
            Arc::clone(&self.service),
            self.runtime.handle().clone(),
            &self.config,
        )
    }

    /// Allocate an explicit application descriptor.
    pub fn alloc_descriptor(&self) -> DescriptorHandle {
        debug!("Connection {}: allocated explicit descriptor", self.id);
        Descriptor::new_handle(Descriptor::explicit(DescriptorOwner {
            connection_id: self.id,
            statement_id: None,
        }))
    }

    /// Free an explicit descriptor. Statements using it fall back to their
    /// implicit descriptors.
    pub fn free_descriptor(&self, descriptor: &DescriptorHandle) -> Result<()> {
        let mut desc = descriptor.borrow_mut();
        if desc.is_implicit() {
            return Err(DriverErrorHelper::invalid_argument()
                .state(crate::error::SqlState::SHY017InvalidUseOfAutoDesc)
                .message("Implicitly allocated descriptors are freed with their statement"));
        }
        desc.deregister();
        debug!("Connection {}: freed explicit descriptor", self.id);
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!("Closing connection {}", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::QueryResult;
    use crate::descriptor::DescriptorType;
    use crate::error::SqlState;
    use crate::metadata::TableInfo;
    use crate::types::value::ColumnInfo;
    use async_trait::async_trait;

    /// Minimal mock service for connection tests.
    #[derive(Debug)]
    struct MockService;

    #[async_trait]
    impl QueryService for MockService {
        async fn execute_query(&self, _sql: &str) -> crate::error::Result<QueryResult> {
            Ok(QueryResult::default())
        }

        async fn list_tables(
            &self,
            _catalog: Option<&str>,
            _schema: Option<&str>,
        ) -> crate::error::Result<Vec<TableInfo>> {
            Ok(vec![])
        }

        async fn list_columns(
            &self,
            _catalog: Option<&str>,
            _schema: Option<&str>,
            _table: &str,
        ) -> crate::error::Result<Vec<ColumnInfo>> {
            Ok(vec![])
        }

        async fn cancel_query(&self, _query_id: &str) -> crate::error::Result<()> {
            Ok(())
        }
    }

    fn create_test_connection(connection_string: &str) -> Connection {
        Connection::connect(connection_string, Arc::new(MockService)).unwrap()
    }

    #[test]
    fn test_statements_get_unique_ids() {
        let mut conn = create_test_connection("");
        let a = conn.new_statement();
        let b = conn.new_statement();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_row_array_size_applies_to_new_statements() {
        let mut conn = create_test_connection("RowArraySize=25");
        assert_eq!(conn.config().row_array_size, 25);
        let stmt = conn.new_statement();
        let ard = stmt.descriptor(DescriptorType::Ard);
        assert_eq!(ard.borrow().header().array_size(), 25);
    }

    #[test]
    fn test_connection_ids_differ() {
        let a = create_test_connection("");
        let b = create_test_connection("");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_invalid_connection_string() {
        let err = Connection::connect("Bogus=1", Arc::new(MockService)).unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY092InvalidAttribute);
    }

    #[test]
    fn test_alloc_and_free_descriptor() {
        let conn = create_test_connection("");
        let desc = conn.alloc_descriptor();
        assert!(!desc.borrow().is_implicit());
        assert_eq!(desc.borrow().owner().connection_id, conn.id());
        conn.free_descriptor(&desc).unwrap();
        assert!(!desc.borrow().is_registered());
    }

    #[test]
    fn test_free_implicit_descriptor_rejected() {
        let mut conn = create_test_connection("");
        let stmt = conn.new_statement();
        let err = conn
            .free_descriptor(&stmt.descriptor(DescriptorType::Ird))
            .unwrap_err();
        assert_eq!(err.sql_state(), SqlState::SHY017InvalidUseOfAutoDesc);
    }
}
