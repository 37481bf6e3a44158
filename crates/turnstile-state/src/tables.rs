//! redb table definitions for the counter store.

use redb::TableDefinition;

/// Counter values keyed by logical counter name. Holds the next value to
/// hand out.
pub const COUNTERS: TableDefinition<&str, u64> = TableDefinition::new("counters");
