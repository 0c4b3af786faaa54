// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Systems Data Core
//!
//! Object-graph handling for Speckle model versions: dynamic base objects,
//! transport recomposition, id collection, record flattening and grouping by
//! a classification parameter.
//!
//! ## Overview
//!
//! - **Base objects**: dynamically typed members accessed by string key
//! - **Serializer**: rebuilds a root object from the transport's object table
//!   (references and data chunks) and flattens objects back into dictionaries
//! - **Traversal**: depth-first id collection over elements, views, sheets,
//!   materials, project information and type definitions
//! - **Records**: one row of identifying columns plus property data per object
//! - **Grouping**: one table per classification value
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use systems_data_core::{
//!     collect_object_ids, group_by_classification, parse_object_stream, recompose,
//!     GroupingOptions, TraversalOptions,
//! };
//!
//! let table = parse_object_stream(&body)?;
//! let root = recompose(&root_id, &table)?;
//! let ids = collect_object_ids(&root, &TraversalOptions::default());
//! // ... fetch each id, build records ...
//! let groups = group_by_classification(&records, &GroupingOptions::default());
//! ```

pub mod base;
pub mod error;
pub mod grouping;
pub mod records;
pub mod serializer;
pub mod traversal;

pub use base::Base;
pub use error::{Error, Result};
pub use grouping::{
    group_by_classification, ClassificationGroups, GroupingOptions, Table,
    DEFAULT_CLASSIFICATION_PARAMETER,
};
pub use records::{
    records_from_children, records_from_objects, ChildObject, ObjectRecord, MODEL_URL_COLUMN,
    OBJECT_ID_COLUMN, SPECKLE_TYPE_COLUMN, VERSION_OBJECT_ID_COLUMN,
};
pub use serializer::{flatten, parse_object_stream, recompose, ObjectTable};
pub use traversal::{collect_object_ids, TraversalOptions};
