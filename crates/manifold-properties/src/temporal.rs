//! Temporal query support and property versioning.
//!
//! This module provides time-travel queries and property version history.
//!
//! IMPLEMENTATION REQUIRED:
//! - get_property_at(entity_id, property_key, timestamp): Historical property values
//! - get_property_history(entity_id, property_key): Full version history
//! - Temporal range queries
//! - Integration with valid_from/updated_at metadata

// Implementation goes here
