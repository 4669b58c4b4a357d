//! Parameter read/write actions.

use super::args;
use crate::error::{ExecutionError, ValidationError};
use crate::registry::Executable;
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParamsGetArgs {
    element_id: u64,
    /// When present, only these parameters are returned; a missing name
    /// is a host-side error. When absent, all parameters are returned.
    names: Option<Vec<String>>,
}

/// `params.get` - reads parameters from one element.
pub fn params_get(raw: &Value) -> Result<Executable, ValidationError> {
    let parsed: ParamsGetArgs = args::parse("params.get", raw)?;
    let id = args::element_id(parsed.element_id);

    Ok(Box::new(move |doc| {
        let mut out = Map::new();
        match &parsed.names {
            Some(names) => {
                for name in names {
                    let value = doc.parameter(id, name).map_err(ExecutionError::from)?;
                    out.insert(name.clone(), value.clone());
                }
            }
            None => {
                let element = doc.element(id).map_err(ExecutionError::from)?;
                for (name, value) in &element.parameters {
                    out.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(json!({"elementId": id, "parameters": out}))
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParamsSetArgs {
    element_id: u64,
    name: String,
    value: Value,
}

/// `params.set` - writes one parameter on one element.
pub fn params_set(raw: &Value) -> Result<Executable, ValidationError> {
    let parsed: ParamsSetArgs = args::parse("params.set", raw)?;
    args::require_non_empty("params.set", "name", &parsed.name)?;
    let id = args::element_id(parsed.element_id);

    Ok(Box::new(move |doc| {
        doc.set_parameter(id, &parsed.name, parsed.value.clone())
            .map_err(ExecutionError::from)?;
        Ok(json!({"elementId": id, "name": parsed.name}))
    }))
}
