//! Data source seam: class queries resolving to attribute records.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::error::Error as StdError;

use indexmap::IndexMap;

use crate::spec::ReportError;

/// One queried inventory object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    class_id: String,
    attributes: IndexMap<String, String>,
}

impl Record {
    pub fn new(class_id: impl Into<String>) -> Self {
        Self {
            class_id: class_id.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Builder-style attribute insert.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    /// Distinguished name, when the record carries one.
    pub fn dn(&self) -> Option<&str> {
        self.attributes.get("dn").map(String::as_str)
    }

    /// Find attribute `name`.
    ///
    /// Exact match first; otherwise the name is compared with underscores
    /// removed and case folded, so `num_of_cpus` finds `numOfCpus`.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.attributes.get(name) {
            return Some(value);
        }
        let c_key = normalize_attribute_name(name);
        self.attributes
            .iter()
            .find(|(c_name, _)| normalize_attribute_name(c_name) == c_key)
            .map(|(_, value)| value.as_str())
    }

    /// Display text of attribute `name`, or [`ReportError::MissingAttribute`].
    pub fn get(&self, name: &str) -> Result<&str, ReportError> {
        self.lookup(name)
            .ok_or_else(|| ReportError::MissingAttribute {
                class_id: self.class_id.clone(),
                attribute: name.to_string(),
                dn: self.dn().map(ToString::to_string),
            })
    }
}

fn normalize_attribute_name(name: &str) -> String {
    name.chars()
        .filter(|chr| *chr != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolves a class identifier to the records of that class.
pub trait InventorySource {
    type Error: StdError + Send + Sync + 'static;

    /// Return all records of `class_id`, in source order.
    fn query_class(&mut self, class_id: &str) -> Result<Vec<Record>, Self::Error>;
}

/// In-memory source keyed by class identifier.
///
/// Unknown classes resolve to no records.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    dict_records_by_class: BTreeMap<String, Vec<Record>>,
    l_queries: Vec<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, class_id: &str, records: Vec<Record>) -> Self {
        self.dict_records_by_class
            .entry(class_id.to_string())
            .or_default()
            .extend(records);
        self
    }

    /// Class ids queried so far, in call order.
    pub fn queries(&self) -> &[String] {
        &self.l_queries
    }
}

impl InventorySource for MemorySource {
    type Error = Infallible;

    fn query_class(&mut self, class_id: &str) -> Result<Vec<Record>, Self::Error> {
        self.l_queries.push(class_id.to_string());
        Ok(self
            .dict_records_by_class
            .get(class_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blade() -> Record {
        Record::new("computeBlade")
            .with_attribute("dn", "sys/chassis-1/blade-3")
            .with_attribute("numOfCpus", "2")
            .with_attribute("serial", "FCH1234")
    }

    #[test]
    fn test_lookup_prefers_exact_then_normalized_name() {
        let record = blade().with_attribute("num_of_cpus", "exact");
        assert_eq!(record.lookup("num_of_cpus"), Some("exact"));
        assert_eq!(blade().lookup("num_of_cpus"), Some("2"));
        assert_eq!(blade().lookup("NumOfCpus"), Some("2"));
        assert_eq!(blade().lookup("serial"), Some("FCH1234"));
    }

    #[test]
    fn test_get_reports_missing_attribute_with_dn() {
        let err = blade().get("Status").unwrap_err();
        match err {
            ReportError::MissingAttribute {
                class_id,
                attribute,
                dn,
            } => {
                assert_eq!(class_id, "computeBlade");
                assert_eq!(attribute, "Status");
                assert_eq!(dn.as_deref(), Some("sys/chassis-1/blade-3"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_memory_source_records_queries_and_defaults_to_empty() {
        let mut source = MemorySource::new().with_records("computeBlade", vec![blade()]);

        assert_eq!(source.query_class("computeBlade").unwrap().len(), 1);
        assert!(source.query_class("equipmentChassis").unwrap().is_empty());
        assert_eq!(source.queries(), ["computeBlade", "equipmentChassis"]);
    }
}
