// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! FlowStore: a generic vector store node for workflow engines.
//!
//! One node abstraction, many vector store backends. A backend implements
//! the [`core::vector_stores::VectorStoreProvider`] adapter trait and
//! declares its [`node::NodeMeta`]; [`node::VectorStoreNode`] turns the
//! pair into a workflow node with five operation modes:
//!
//! - **load** - similarity search returning ranked documents
//! - **insert** - embed and persist documents from workflow items
//! - **update** - overwrite store entries by external id
//! - **retrieve** - supply a live store handle to chain consumers
//! - **retrieve-as-tool** - supply a search tool to agent consumers
//!
//! ```no_run
//! use flowstore::node::{NodeMeta, OperationMode, VectorStoreNode};
//! use flowstore::node::context::{ExecutionContext, NodeVersion};
//! # use std::sync::Arc;
//! # fn provider() -> Arc<dyn flowstore::core::vector_stores::VectorStoreProvider> {
//! #     unimplemented!()
//! # }
//!
//! # async fn run() -> flowstore::Result<()> {
//! let node = VectorStoreNode::new(
//!     NodeMeta {
//!         display_name: "My Vector Store".to_string(),
//!         name: "myVectorStore".to_string(),
//!         description: "An example backend".to_string(),
//!         icon: None,
//!         operation_modes: vec![OperationMode::Load, OperationMode::Insert],
//!         fields: Vec::new(),
//!     },
//!     provider(),
//! );
//!
//! let context = ExecutionContext::new("My Vector Store", NodeVersion::V1_3);
//! let records = node.execute(&context).await?;
//! # let _ = records;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod node;

pub use crate::core::documents::Document;
pub use crate::core::error::{Error, Result};
pub use node::{NodeMeta, OperationMode, SuppliedResource, SupplyOutput, VectorStoreNode};
