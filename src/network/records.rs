use serde::Deserialize;

/// A partner organization as handed over by the upstream loader.
///
/// Every field is optional in the source document. Values of the wrong shape
/// are replaced by their defaults instead of failing the whole record.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartnerRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub partner_type: String,
    #[serde(deserialize_with = "lenient::text")]
    pub sector: String,
    #[serde(deserialize_with = "lenient::text")]
    pub region: String,
    #[serde(deserialize_with = "lenient::text")]
    pub country: String,
    #[serde(rename = "mainContactPerson", deserialize_with = "lenient::optional_id")]
    pub main_contact: Option<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub contributions: Vec<ContributionRecord>,
    #[serde(deserialize_with = "lenient::list")]
    pub projects: Vec<ProjectRecord>,
    #[serde(deserialize_with = "lenient::id_list")]
    pub connections: Vec<String>,
}

impl PartnerRecord {
    pub fn contribution_value(&self) -> f64 {
        self.contributions
            .iter()
            .map(ContributionRecord::value)
            .sum::<f64>()
            .max(0.0)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContributionRecord {
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub kind: String,
    #[serde(deserialize_with = "lenient::number")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub estimated_value: Option<f64>,
}

impl ContributionRecord {
    /// Financial amount, falling back to the estimated value of in-kind support.
    pub fn value(&self) -> f64 {
        self.amount
            .filter(|amount| *amount != 0.0)
            .or(self.estimated_value)
            .unwrap_or(0.0)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub status: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StaffRecord {
    #[serde(deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::record")]
    pub unit: StaffUnit,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StaffUnit {
    #[serde(deserialize_with = "lenient::optional_text")]
    pub directorate: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub division: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub partners: Vec<PartnerRecord>,
    pub staff: Vec<StaffRecord>,
}

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn value_to_id(value: Value) -> Option<String> {
        match value {
            Value::String(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    pub(super) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(value_to_id(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub(super) fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(value_to_id(Value::deserialize(deserializer)?))
    }

    pub(super) fn id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().filter_map(value_to_id).collect(),
            _ => Vec::new(),
        })
    }

    pub(super) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(optional_text(deserializer)?.unwrap_or_default())
    }

    pub(super) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        })
    }

    pub(super) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number = match Value::deserialize(deserializer)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(number.filter(|value| value.is_finite()))
    }

    pub(super) fn record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(T::deserialize(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub(super) fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| T::deserialize(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}
