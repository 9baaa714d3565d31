use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::records::{Dataset, PartnerRecord, StaffRecord};

const SAMPLE_DATASET: &str = include_str!("../../assets/sample_network.json");

pub fn load_dataset(path: Option<&Path>) -> Result<Dataset> {
    let Some(path) = path else {
        let dataset = parse_dataset(SAMPLE_DATASET).context("embedded sample dataset is invalid")?;
        info!(
            partners = dataset.partners.len(),
            staff = dataset.staff.len(),
            "loaded embedded sample dataset"
        );
        return Ok(dataset);
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    let dataset =
        parse_dataset(&raw).with_context(|| format!("failed to parse dataset {}", path.display()))?;
    info!(
        path = %path.display(),
        partners = dataset.partners.len(),
        staff = dataset.staff.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

pub fn parse_dataset(raw: &str) -> Result<Dataset> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in dataset")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("dataset must be a JSON object with partners and staff"))?;

    let partners = object
        .get("partners")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("dataset has no partners array"))?;
    let staff = match object.get("staff") {
        Some(Value::Array(staff)) => staff.as_slice(),
        Some(Value::Null) | None => &[],
        Some(_) => return Err(anyhow!("dataset staff entry must be an array")),
    };

    Ok(Dataset {
        partners: collect_records::<PartnerRecord>(partners, "partner"),
        staff: collect_records::<StaffRecord>(staff, "staff"),
    })
}

fn collect_records<T>(values: &[Value], label: &str) -> Vec<T>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::with_capacity(values.len());
    for (position, value) in values.iter().enumerate() {
        if !value.is_object() {
            warn!(position, "skipping {label} record that is not an object");
            continue;
        }
        match T::deserialize(value) {
            Ok(record) => records.push(record),
            Err(error) => warn!(position, %error, "skipping malformed {label} record"),
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_dataset_parses() {
        let dataset = load_dataset(None).unwrap();

        assert!(!dataset.partners.is_empty());
        assert!(!dataset.staff.is_empty());
        assert!(dataset.partners.iter().all(|partner| !partner.id.is_empty()));
    }

    #[test]
    fn test_missing_staff_is_empty() {
        let dataset = parse_dataset(r#"{"partners": [{"id": 1}]}"#).unwrap();

        assert_eq!(dataset.partners.len(), 1);
        assert!(dataset.staff.is_empty());
    }

    #[test]
    fn test_non_object_records_are_skipped() {
        let dataset =
            parse_dataset(r#"{"partners": [{"id": 1}, "junk", 4, {"id": 2}], "staff": [[]]}"#)
                .unwrap();

        assert_eq!(dataset.partners.len(), 2);
        assert!(dataset.staff.is_empty());
    }

    #[test]
    fn test_structural_errors_are_reported() {
        assert!(parse_dataset("not json").is_err());
        assert!(parse_dataset("[]").is_err());
        assert!(parse_dataset(r#"{"staff": []}"#).is_err());
        assert!(parse_dataset(r#"{"partners": [], "staff": {}}"#).is_err());
    }

    #[test]
    fn test_missing_file_has_context() {
        let error = load_dataset(Some(Path::new("/definitely/not/here.json"))).unwrap_err();

        assert!(error.to_string().contains("failed to read dataset"));
    }
}
