//! Model JSON and q-value files.
//!
//! Model files hold one `ModelProfile`:
//!
//! ```json
//! {
//!   "name": "dumbbell",
//!   "subunits": [
//!     { "shape": "sphere", "dimensions": [50], "com": [-60, 0, 0] },
//!     { "shape": "cylinder", "dimensions": [10, 120], "rotation": [0, 90, 0] }
//!   ],
//!   "exclude_overlap": true
//! }
//! ```
//!
//! or several under `"models"`, each simulated separately:
//!
//! ```json
//! { "models": [ { "name": "a", "subunits": [...] }, { "name": "b", "conc": 0.05, "subunits": [...] } ] }
//! ```
//!
//! q files are plain text: the first whitespace-separated column of every
//! non-empty, non-`#` line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::domain::ModelProfile;
use crate::error::AppError;

/// Read a model JSON file holding one model or a `"models"` list.
pub fn read_models_json(path: &Path) -> Result<Vec<ModelProfile>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model file '{}': {e}", path.display())))?;
    let invalid = |e: serde_json::Error| AppError::new(2, format!("Invalid model file '{}': {e}", path.display()));

    let mut value: serde_json::Value = serde_json::from_reader(BufReader::new(file)).map_err(invalid)?;
    let batch = value.get_mut("models").map(serde_json::Value::take);
    let models: Vec<ModelProfile> = match batch {
        Some(list) => serde_json::from_value(list).map_err(invalid)?,
        None => vec![serde_json::from_value(value).map_err(invalid)?],
    };

    if models.is_empty() {
        return Err(AppError::new(
            2,
            format!("Model file '{}' lists no models.", path.display()),
        ));
    }
    if let Some(k) = models.iter().position(|m| m.subunits.is_empty()) {
        return Err(AppError::new(
            2,
            format!("Model file '{}': model {} has no subunits.", path.display(), k + 1),
        ));
    }
    Ok(models)
}

/// Read user-sampled q values.
pub fn read_q_file(path: &Path) -> Result<Vec<f64>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open q file '{}': {e}", path.display())))?;

    let mut values = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| AppError::new(2, format!("Failed to read q file: {e}")))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let first = trimmed.split_whitespace().next().unwrap_or(trimmed);
        let q: f64 = first.parse().map_err(|_| {
            AppError::new(
                2,
                format!(
                    "q file '{}', line {}: cannot parse '{first}' as a number.",
                    path.display(),
                    lineno + 1
                ),
            )
        })?;
        values.push(q);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn model_file_round_trips_through_serde() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"name":"pair","subunits":[
                {{"shape":"sphere","dimensions":[50]}},
                {{"shape":"Hollow sphere","dimensions":[30,20],"contrast":-0.5,"com":[100,0,0]}}
            ]}}"#
        )
        .unwrap();

        let models = read_models_json(file.path()).unwrap();
        assert_eq!(models.len(), 1);
        let model = &models[0];
        assert_eq!(model.name.as_deref(), Some("pair"));
        assert_eq!(model.subunits.len(), 2);
        assert_eq!(model.subunits[1].shape, "Hollow sphere");
        assert_eq!(model.subunits[1].contrast, -0.5);
        assert_eq!(model.subunits[1].com, [100.0, 0.0, 0.0]);
        assert_eq!(model.exclude_overlap, None);
        assert_eq!(model.concentration, None);
    }

    #[test]
    fn model_list_keeps_order_and_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"models":[
                {{"name":"small","subunits":[{{"shape":"sphere","dimensions":[20]}}]}},
                {{"name":"large","conc":0.05,"sigma_r":2.5,"polydispersity":0.1,
                  "subunits":[{{"shape":"sphere","dimensions":[60]}}]}}
            ]}}"#
        )
        .unwrap();

        let models = read_models_json(file.path()).unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name.as_deref(), Some("small"));
        assert_eq!(models[0].polydispersity, None);
        assert_eq!(models[1].concentration, Some(0.05));
        assert_eq!(models[1].sigma_roughness, Some(2.5));
        assert_eq!(models[1].polydispersity, Some(0.1));
    }

    #[test]
    fn bad_model_files_are_input_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"subunits": []}}"#).unwrap();
        assert_eq!(read_models_json(file.path()).unwrap_err().exit_code(), 2);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"models": []}}"#).unwrap();
        assert_eq!(read_models_json(file.path()).unwrap_err().exit_code(), 2);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"models": [{{"subunits": [{{"shape":"cube","dimensions":[5]}}]}}, {{"subunits": []}}]}}"#).unwrap();
        let err = read_models_json(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("model 2"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert_eq!(read_models_json(file.path()).unwrap_err().exit_code(), 2);

        let missing = Path::new("/definitely/not/here.json");
        assert_eq!(read_models_json(missing).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn q_file_reads_first_column_and_skips_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# q I").unwrap();
        writeln!(file, "0.01 5.0").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  2.0e-2\t4.0").unwrap();
        writeln!(file, "0.05").unwrap();
        assert_eq!(read_q_file(file.path()).unwrap(), vec![0.01, 0.02, 0.05]);
    }

    #[test]
    fn q_file_reports_the_bad_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0.01").unwrap();
        writeln!(file, "abc").unwrap();
        let err = read_q_file(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("line 2"));
    }
}
