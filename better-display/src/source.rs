//! Input source configuration
//!
//! Users describe their monitor's inputs as a single `label:code,...` string.
//! [`SourceList`] is the parsed, ordered form that gets persisted;
//! [`SourceMap`] derives the select options and both lookup directions from
//! it; [`SourceCatalog`] publishes the current map and swaps it atomically
//! when the configuration changes.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::FormatError;

/// Prefix of every select option
pub const OPTION_PREFIX: &str = "switch to ";

/// Ordered label → code pairs with unique labels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList(Vec<(String, String)>);

/// Parse `label:code,label:code`
///
/// Entries are split on commas, trimmed, then split on their first colon.
/// Both halves are trimmed and must be non-empty; labels must be unique.
pub fn parse_source_list(raw: &str) -> Result<SourceList, FormatError> {
    if raw.trim().is_empty() {
        return Err(FormatError::Empty);
    }

    let mut list = SourceList::default();
    for entry in raw.split(',') {
        let entry = entry.trim();
        let (label, code) = entry
            .split_once(':')
            .ok_or_else(|| FormatError::MissingSeparator(entry.to_string()))?;
        list.push(label.trim(), code.trim())
            .map_err(|e| match e {
                FormatError::EmptyLabel(_) => FormatError::EmptyLabel(entry.to_string()),
                FormatError::EmptyCode(_) => FormatError::EmptyCode(entry.to_string()),
                other => other,
            })?;
    }
    Ok(list)
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        parse_source_list(raw)
    }

    /// Append a pair, keeping labels unique
    pub fn push(&mut self, label: &str, code: &str) -> Result<(), FormatError> {
        if label.is_empty() {
            return Err(FormatError::EmptyLabel(format!("{}:{}", label, code)));
        }
        if code.is_empty() {
            return Err(FormatError::EmptyCode(format!("{}:{}", label, code)));
        }
        if self.code(label).is_some() {
            return Err(FormatError::DuplicateLabel(label.to_string()));
        }
        self.0.push((label.to_string(), code.to_string()));
        Ok(())
    }

    pub fn code(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, c)| (l.as_str(), c.as_str()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Join back into the `label:code,...` form used by the options form
    pub fn format(&self) -> String {
        self.iter()
            .map(|(label, code)| format!("{}:{}", label, code))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Serialize for SourceList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, code) in &self.0 {
            map.serialize_entry(label, code)?;
        }
        map.end()
    }
}

struct SourceListVisitor;

impl<'de> Visitor<'de> for SourceListVisitor {
    type Value = SourceList;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of source labels to codes")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut list = SourceList::default();
        while let Some((label, code)) = access.next_entry::<String, String>()? {
            list.push(label.trim(), code.trim())
                .map_err(serde::de::Error::custom)?;
        }
        Ok(list)
    }
}

impl<'de> Deserialize<'de> for SourceList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SourceListVisitor)
    }
}

// ============================================================================
// SourceMap
// ============================================================================

/// Select options and lookups derived from one [`SourceList`]
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMap {
    sources: SourceList,
    options: Vec<String>,
    by_code: HashMap<String, usize>,
    by_option: HashMap<String, usize>,
}

impl SourceMap {
    pub fn new(sources: SourceList) -> Self {
        let options: Vec<String> = sources
            .labels()
            .map(|label| format!("{}{}", OPTION_PREFIX, label))
            .collect();

        let mut by_code = HashMap::new();
        let mut by_option = HashMap::new();
        for (index, (_, code)) in sources.iter().enumerate() {
            // Later labels win when codes repeat
            by_code.insert(code.to_string(), index);
            by_option.insert(options[index].clone(), index);
        }

        Self {
            sources,
            options,
            by_code,
            by_option,
        }
    }

    /// `"switch to {label}"` for every label, in configuration order
    pub fn forward_labels(&self) -> &[String] {
        &self.options
    }

    /// Option shown for a device code, if any label maps to it
    pub fn reverse_lookup(&self, code: &str) -> Option<&str> {
        self.by_code
            .get(code)
            .map(|&index| self.options[index].as_str())
    }

    /// Device code for a select option
    pub fn label_to_code(&self, option: &str) -> Option<&str> {
        self.by_option
            .get(option)
            .and_then(|&index| self.sources.0.get(index))
            .map(|(_, code)| code.as_str())
    }

    pub fn sources(&self) -> &SourceList {
        &self.sources
    }
}

impl Default for SourceMap {
    fn default() -> Self {
        Self::new(SourceList::default())
    }
}

/// The current [`SourceMap`] of one config entry
///
/// Readers always see a whole map; a rebuild replaces it in one step and
/// wakes every subscriber.
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    current: Arc<watch::Sender<Arc<SourceMap>>>,
}

impl SourceCatalog {
    pub fn new(sources: SourceList) -> Self {
        let (tx, _) = watch::channel(Arc::new(SourceMap::new(sources)));
        Self {
            current: Arc::new(tx),
        }
    }

    pub fn current(&self) -> Arc<SourceMap> {
        Arc::clone(&self.current.borrow())
    }

    /// Replace the map, returning whether it differed from the previous one
    pub fn rebuild(&self, sources: SourceList) -> bool {
        let map = SourceMap::new(sources);
        self.current.send_if_modified(|current| {
            if current.sources() == map.sources() {
                false
            } else {
                *current = Arc::new(map);
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SourceMap>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_keeps_order_and_trims() {
        let list = parse_source_list(" hdmi1 : 15 , hdmi2:16,dp:17 ").unwrap();
        let pairs: Vec<_> = list.iter().collect();
        assert_eq!(pairs, [("hdmi1", "15"), ("hdmi2", "16"), ("dp", "17")]);
    }

    #[test]
    fn test_parse_splits_on_first_colon() {
        let list = parse_source_list("usb-c:x:27").unwrap();
        assert_eq!(list.code("usb-c"), Some("x:27"));
    }

    #[rstest]
    #[case("", FormatError::Empty)]
    #[case("   ", FormatError::Empty)]
    #[case("hdmi1", FormatError::MissingSeparator("hdmi1".to_string()))]
    #[case("hdmi1:15,", FormatError::MissingSeparator("".to_string()))]
    #[case(":15", FormatError::EmptyLabel(":15".to_string()))]
    #[case("hdmi1: ", FormatError::EmptyCode("hdmi1:".to_string()))]
    #[case("dp:15,dp:16", FormatError::DuplicateLabel("dp".to_string()))]
    fn test_parse_rejects_malformed(#[case] raw: &str, #[case] expected: FormatError) {
        assert_eq!(parse_source_list(raw), Err(expected));
    }

    #[test]
    fn test_format_round_trips_user_input() {
        let raw = "hdmi1:15,hdmi2:16,dp:17";
        assert_eq!(parse_source_list(raw).unwrap().format(), raw);
    }

    #[test]
    fn test_serialize_as_ordered_object() {
        let list = parse_source_list("zeta:1,alpha:2").unwrap();
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, r#"{"zeta":"1","alpha":"2"}"#);

        let back: SourceList = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
    }

    #[test]
    fn test_deserialize_rejects_empty_code() {
        let result: Result<SourceList, _> = serde_json::from_str(r#"{"hdmi1":""}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_source_map_lookups() {
        let map = SourceMap::new(parse_source_list("hdmi1:15,hdmi2:16,dp:17").unwrap());

        assert_eq!(
            map.forward_labels(),
            ["switch to hdmi1", "switch to hdmi2", "switch to dp"]
        );
        assert_eq!(map.reverse_lookup("16"), Some("switch to hdmi2"));
        assert_eq!(map.reverse_lookup("0"), None);
        assert_eq!(map.label_to_code("switch to dp"), Some("17"));
        assert_eq!(map.label_to_code("dp"), None);
    }

    #[test]
    fn test_duplicate_codes_last_label_wins() {
        let map = SourceMap::new(parse_source_list("hdmi1:15,tv:15").unwrap());

        assert_eq!(map.reverse_lookup("15"), Some("switch to tv"));
        assert_eq!(map.label_to_code("switch to hdmi1"), Some("15"));
    }

    #[tokio::test]
    async fn test_catalog_rebuild_notifies() {
        let catalog = SourceCatalog::new(parse_source_list("hdmi1:15").unwrap());
        let mut rx = catalog.subscribe();

        assert!(!catalog.rebuild(parse_source_list("hdmi1:15").unwrap()));
        assert!(!rx.has_changed().unwrap());

        assert!(catalog.rebuild(parse_source_list("hdmi1:15,dp:17").unwrap()));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().forward_labels().len(), 2);
        assert_eq!(catalog.current().label_to_code("switch to dp"), Some("17"));
    }
}
