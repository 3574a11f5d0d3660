//! The schema bundled with the crate.

use std::sync::{Arc, LazyLock};

use crate::schema::Schema;

/// TOML source of the bundled Ahrefs API v2 schema.
pub const BUNDLED_SCHEMA: &str = include_str!("../data/schema.toml");

/// Table that is queried without a target or mode.
pub const SUBSCRIPTION_INFO: &str = "subscription_info";

static BUILTIN: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Arc::new(Schema::from_toml_str(BUNDLED_SCHEMA).expect("bundled schema must parse"))
});

/// Returns the bundled schema, parsing it on first use.
pub fn builtin() -> Arc<Schema> {
    BUILTIN.clone()
}
