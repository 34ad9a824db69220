//! Reading the schema and data inputs.

use crate::cli::InputArgs;
use crate::error::{CliError, Result};
use reshape_domain::TargetSchema;
use serde_json::Value;
use std::fs;
use std::io::{IsTerminal, Read};
use std::path::Path;

/// Parse a JSON file.
pub fn read_json_file(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path).map_err(|e| {
        CliError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        CliError::InvalidInput(format!("{} is not valid JSON: {}", path.display(), e))
    })
}

/// Parse JSON from a reader.
pub fn read_json<R: Read>(mut reader: R) -> Result<Value> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    if contents.trim().is_empty() {
        return Err(CliError::InvalidInput("no data received on stdin".to_string()));
    }
    Ok(serde_json::from_str(&contents)?)
}

/// Load the target schema named by `--schema`.
pub fn load_schema(args: &InputArgs) -> Result<TargetSchema> {
    let path = args
        .schema
        .as_deref()
        .ok_or_else(|| CliError::InvalidInput("--schema is required".to_string()))?;
    Ok(TargetSchema::from_json(&read_json_file(path)?)?)
}

/// Load the input document from `--data`, or stdin when it is piped.
pub fn load_data(args: &InputArgs) -> Result<Value> {
    match &args.data {
        Some(path) => read_json_file(path),
        None => {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                return Err(CliError::InvalidInput(
                    "no data: pass --data or pipe JSON on stdin".to_string(),
                ));
            }
            read_json(stdin.lock())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_load_schema_and_data() {
        let dir = TempDir::new().unwrap();
        let schema_path = dir.path().join("schema.json");
        let data_path = dir.path().join("data.json");
        fs::write(
            &schema_path,
            r#"{"type": "object", "properties": {"id": {"type": "string"}}, "required": ["id"]}"#,
        )
        .unwrap();
        fs::write(&data_path, r#"{"call.id": "123"}"#).unwrap();

        let args = InputArgs {
            schema: Some(schema_path),
            data: Some(data_path),
            ..Default::default()
        };
        let schema = load_schema(&args).unwrap();
        assert_eq!(schema.required_fields(), vec!["id"]);
        assert_eq!(load_data(&args).unwrap()["call.id"], "123");
    }

    #[test]
    fn test_missing_schema_flag() {
        let result = load_schema(&InputArgs::default());
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_schema_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, r#"{"type": "object"}"#).unwrap();

        let args = InputArgs {
            schema: Some(path),
            ..Default::default()
        };
        assert!(matches!(load_schema(&args), Err(CliError::Schema(_))));
    }

    #[test]
    fn test_unreadable_file_names_path() {
        let err = read_json_file(&PathBuf::from("/nonexistent/data.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/data.json"));
    }

    #[test]
    fn test_read_json_from_reader() {
        assert_eq!(read_json(&b"{\"a\": 1}"[..]).unwrap()["a"], 1);
        assert!(read_json(&b"  \n"[..]).is_err());
        assert!(matches!(read_json(&b"{oops"[..]), Err(CliError::Serialization(_))));
    }
}
