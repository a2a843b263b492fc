//! Flattens a provider lead record into scalar features.
//!
//! Three sections feed the output, each into its own typed map:
//!
//! 1. `data`: personal fields, written under their own name, text lower-cased.
//! 2. `demo`: demographic fields, written as `{field}_{qualifier}`.
//! 3. `score`: named scores, parsed to integers.
//!
//! [`LeadFeatures::into_map`] joins them with precedence
//! `score > personal > demographic`. With the default tables personal and
//! demographic keys never collide (composite keys always carry a qualifier
//! suffix), but a score named like a personal field replaces it. Every such
//! replacement is kept as last-write-wins and reported through
//! [`LeadFeatures::collisions`].

use crate::errors::AppError;
use crate::models::{FeatureMap, LeadRecord};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Personal fields copied from the `data` section.
pub const PERSONAL_FIELDS: [&str; 4] = ["email", "phone", "first", "last"];

/// (field, qualifier) pairs projected from the `demo` section.
pub const DEMOGRAPHIC_FIELDS: [(&str, &str); 10] = [
    ("age", "years"),
    ("income", "dollars"),
    ("net_worth", "dollars"),
    ("home_value", "dollars"),
    ("discretionary_income", "dollars"),
    ("length_of_residence", "years"),
    ("home_owner", "yes"),
    ("married", "yes"),
    ("children", "yes"),
    ("credit_card_holder", "yes"),
];

/// One projected field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Projected {
    /// The key was not in the source section.
    Absent,
    /// The key was present but null or an empty string.
    Empty,
    Value(Value),
}

impl Projected {
    /// Both `Absent` and `Empty` flatten to JSON null.
    pub fn to_value(&self) -> Value {
        match self {
            Projected::Absent | Projected::Empty => Value::Null,
            Projected::Value(v) => v.clone(),
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Projected::Value(_))
    }
}

/// Normalized features, one typed map per source section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFeatures {
    pub personal: BTreeMap<String, Projected>,
    pub demographic: BTreeMap<String, Projected>,
    pub scores: BTreeMap<String, i64>,
}

impl LeadFeatures {
    pub fn is_empty(&self) -> bool {
        self.personal.is_empty() && self.demographic.is_empty() && self.scores.is_empty()
    }

    /// Keys whose earlier value is dropped on merge.
    ///
    /// With the default tables only a score named like a personal field can
    /// land here; custom tables may also let a personal field shadow a
    /// demographic composite.
    pub fn collisions(&self) -> Vec<String> {
        let shadowed_demo = self
            .personal
            .keys()
            .filter(|key| self.demographic.contains_key(key.as_str()));
        let shadowed_by_score = self.scores.keys().filter(|name| {
            self.personal.contains_key(name.as_str())
                || self.demographic.contains_key(name.as_str())
        });

        shadowed_demo
            .chain(shadowed_by_score)
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Flattens into a single map: demographic first, then personal, then scores.
    pub fn into_map(self) -> FeatureMap {
        let mut out = Map::new();
        for (key, value) in &self.demographic {
            out.insert(key.clone(), value.to_value());
        }
        for (key, value) in &self.personal {
            out.insert(key.clone(), value.to_value());
        }
        for (name, score) in self.scores {
            out.insert(name, Value::from(score));
        }
        out
    }
}

/// Projects lead records onto a fixed set of feature names.
#[derive(Debug, Clone)]
pub struct Normalizer {
    personal_fields: Vec<String>,
    demographic_fields: Vec<(String, String)>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            personal_fields: PERSONAL_FIELDS.iter().map(|f| f.to_string()).collect(),
            demographic_fields: DEMOGRAPHIC_FIELDS
                .iter()
                .map(|(f, q)| (f.to_string(), q.to_string()))
                .collect(),
        }
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_personal_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.personal_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_demographic_fields<I, F, Q>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (F, Q)>,
        F: Into<String>,
        Q: Into<String>,
    {
        self.demographic_fields = fields
            .into_iter()
            .map(|(f, q)| (f.into(), q.into()))
            .collect();
        self
    }

    /// Extracts the typed feature maps. An absent record yields empty maps.
    ///
    /// Fails only on a score value that does not parse as an integer.
    pub fn extract(&self, record: Option<&LeadRecord>) -> Result<LeadFeatures, AppError> {
        let Some(record) = record else {
            return Ok(LeadFeatures::default());
        };

        Ok(LeadFeatures {
            personal: self.personal(record),
            demographic: self.demographic(record),
            scores: scores(record)?,
        })
    }

    /// Extracts and flattens in one step, warning about collisions.
    pub fn normalize(&self, record: Option<&LeadRecord>) -> Result<FeatureMap, AppError> {
        let features = self.extract(record)?;
        warn_collisions(&features);
        Ok(features.into_map())
    }

    fn personal(&self, record: &LeadRecord) -> BTreeMap<String, Projected> {
        let Some(data) = record.data() else {
            return BTreeMap::new();
        };

        self.personal_fields
            .iter()
            .map(|field| {
                let projected = match data.get(field) {
                    None => Projected::Absent,
                    Some(Value::Null) => Projected::Empty,
                    Some(Value::String(s)) if s.is_empty() => Projected::Empty,
                    Some(Value::String(s)) => Projected::Value(Value::String(s.to_lowercase())),
                    Some(other) => Projected::Value(other.clone()),
                };
                (field.clone(), projected)
            })
            .collect()
    }

    fn demographic(&self, record: &LeadRecord) -> BTreeMap<String, Projected> {
        let Some(demo) = record.demo() else {
            return BTreeMap::new();
        };

        self.demographic_fields
            .iter()
            .filter_map(|(field, qualifier)| {
                let entry = demo.get(field)?;
                let projected = match entry.as_object().and_then(|q| q.get(qualifier)) {
                    None => Projected::Absent,
                    Some(Value::Null) => Projected::Empty,
                    Some(value) => Projected::Value(value.clone()),
                };
                Some((format!("{}_{}", field, qualifier), projected))
            })
            .collect()
    }
}

/// Normalizes with the default field tables.
pub fn normalize(record: Option<&LeadRecord>) -> Result<FeatureMap, AppError> {
    Normalizer::default().normalize(record)
}

pub(crate) fn warn_collisions(features: &LeadFeatures) {
    for name in features.collisions() {
        tracing::warn!(
            "Feature '{}' is set by more than one section; earlier value dropped",
            name
        );
    }
}

// i64::MAX is not representable as f64; 2^63 is the first float past it.
const I64_MIN_F64: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER_F64: f64 = 9_223_372_036_854_775_808.0;

fn scores(record: &LeadRecord) -> Result<BTreeMap<String, i64>, AppError> {
    let mut out = BTreeMap::new();
    let Some(entries) = record.scores() else {
        return Ok(out);
    };

    // Later entries replace earlier ones with the same name.
    for entry in entries {
        let (Some(name), Some(raw)) = (entry.get("name"), entry.get("score")) else {
            continue;
        };
        let name = match name {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let score = parse_score(&name, raw)?;
        out.insert(name, score);
    }

    Ok(out)
}

/// Parses a score as `i64`. Integral floats such as `222.0` are accepted;
/// fractions, out-of-range numbers and non-numeric text are not.
fn parse_score(name: &str, raw: &Value) -> Result<i64, AppError> {
    let parsed = match raw {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= I64_MIN_F64 && *f < I64_UPPER_F64)
                .map(|f| f as i64)
        }),
        _ => None,
    };

    parsed.ok_or_else(|| AppError::InvalidScore {
        name: name.to_string(),
        value: raw.to_string(),
    })
}
