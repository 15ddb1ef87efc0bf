use crate::config::Config;
use schemars::schema_for;

/// Print the JSON Schema of `prism.yaml`.
pub fn execute() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&schema_for!(Config))?);
    Ok(())
}
