//! Shape check for the registry document against `schema/registry.schema.json`.
//!
//! The schema ships inside the binary so the check does not depend on the
//! layout of the checkout being scanned.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

const REGISTRY_SCHEMA: &str = include_str!("../../schema/registry.schema.json");

fn compile_registry_schema() -> Result<JSONSchema> {
    let schema: Value =
        serde_json::from_str(REGISTRY_SCHEMA).context("parsing bundled registry schema")?;
    JSONSchema::compile(&schema).map_err(|err| anyhow!("compiling bundled registry schema: {err}"))
}

/// Validate a serialized registry, reporting every violation at once.
pub fn validate_registry_shape(value: &Value) -> Result<()> {
    let compiled = compile_registry_schema()?;
    if let Err(errors) = compiled.validate(value) {
        let details = errors
            .map(|err| format!("{}: {err}", err.instance_path))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("registry failed schema validation:\n{details}");
    }
    Ok(())
}
