//! Bulk operations and batch processing for properties.
//!
//! This module provides efficient batch operations for property storage.
//!
//! IMPLEMENTATION REQUIRED:
//! - batch_set_properties(): Bulk property writes in single transaction
//! - batch_get_properties(): Bulk property reads with range queries
//! - bulk_delete_properties(): Efficient batch deletion
//! - Range query optimization for composite keys

// Implementation goes here
