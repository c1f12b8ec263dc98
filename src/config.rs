//! # Diagram configuration
//!
//! [`Options`] is the fully resolved configuration a diagram run works with.
//! Every field has a documented default (see [`Options::default`]). Callers
//! only describe what they want to change through [`PartialOptions`], which is
//! merged on top of the defaults with [`Options::merge`]. Merging validates the
//! values eagerly, so a malformed option fails before any filtering starts.
//!
//! [`PartialOptions`] deserializes from the same YAML shape as an
//! `.erdconfig` file:
//!
//! ```yaml
//! attributes:
//!   - content
//!   - foreign_keys
//! only: User, Order
//! indirect: false
//! title: Shop
//! ```
//!
//! Keys that are not recognized here are kept in [`Options::renderer`] so that
//! renderer variants can read their own settings (file type, orientation, ...).
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::Path,
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{domain::Attribute, Error, Result};

/// Attribute categories that can be selected for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeCategory {
    /// Plain data columns.
    Content,
    PrimaryKeys,
    ForeignKeys,
    /// `created_*` / `updated_*` bookkeeping columns.
    Timestamps,
}

impl AttributeCategory {
    pub const ALL: [Self; 4] = [
        Self::Content,
        Self::PrimaryKeys,
        Self::ForeignKeys,
        Self::Timestamps,
    ];

    /// Tests whether the attribute belongs to this category.
    #[must_use]
    pub fn matches(self, attribute: &Attribute) -> bool {
        match self {
            Self::Content => attribute.is_content(),
            Self::PrimaryKeys => attribute.is_primary_key(),
            Self::ForeignKeys => attribute.is_foreign_key(),
            Self::Timestamps => attribute.is_timestamp(),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::PrimaryKeys => "primary_keys",
            Self::ForeignKeys => "foreign_keys",
            Self::Timestamps => "timestamps",
        }
    }
}

impl fmt::Display for AttributeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "unknown attribute category `{value}`, expected one of: content, primary_keys, foreign_keys, timestamps"
                ))
            })
    }
}

/// Resolved diagram options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Options {
    /// Attribute categories drawn for every entity. `None` draws no attributes.
    pub attributes: Option<BTreeSet<AttributeCategory>>,
    /// Whether entities without relationships are wanted. Renderers may consult
    /// it; entity filtering does not.
    pub disconnected: bool,
    /// Include relationships that go through another entity.
    pub indirect: bool,
    /// Include inheritance specializations.
    pub inheritance: bool,
    /// Include polymorphic specializations.
    pub polymorphism: bool,
    /// Focus set: restrict the diagram to entities related to these names.
    pub only: Option<BTreeSet<String>>,
    /// Entity names removed from the diagram.
    pub exclude: Option<BTreeSet<String>>,
    /// Surface non-fatal warnings while generating.
    pub warn: bool,
    /// Diagram title for renderers that draw one. `None` draws no title.
    pub title: Option<String>,
    /// Settings owned by the renderer variant, passed through untouched.
    pub renderer: BTreeMap<String, serde_yaml::Value>,
}

impl Default for Options {
    /// | option         | default |
    /// |----------------|---------|
    /// | `attributes`   | unset   |
    /// | `disconnected` | `false` |
    /// | `indirect`     | `true`  |
    /// | `inheritance`  | `false` |
    /// | `polymorphism` | `false` |
    /// | `only`         | unset   |
    /// | `exclude`      | unset   |
    /// | `warn`         | `true`  |
    /// | `title`        | unset   |
    fn default() -> Self {
        Self {
            attributes: None,
            disconnected: false,
            indirect: true,
            inheritance: false,
            polymorphism: false,
            only: None,
            exclude: None,
            warn: true,
            title: None,
            renderer: BTreeMap::new(),
        }
    }
}

impl Options {
    /// Parses an `.erdconfig` style YAML document and merges it over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the document or one of its values
    /// is malformed.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::default().merge(&PartialOptions::from_yaml_str(content)?)
    }

    /// Returns a copy of these options with every supplied override applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when an entity name is blank.
    pub fn merge(&self, overrides: &PartialOptions) -> Result<Self> {
        let mut merged = self.clone();

        if let Some(categories) = &overrides.attributes {
            merged.attributes = Some(categories.iter().copied().collect());
        }
        if let Some(value) = overrides.disconnected {
            merged.disconnected = value;
        }
        if let Some(value) = overrides.indirect {
            merged.indirect = value;
        }
        if let Some(value) = overrides.inheritance {
            merged.inheritance = value;
        }
        if let Some(value) = overrides.polymorphism {
            merged.polymorphism = value;
        }
        if let Some(names) = &overrides.only {
            merged.only = name_set("only", names)?;
        }
        if let Some(names) = &overrides.exclude {
            merged.exclude = name_set("exclude", names)?;
        }
        if let Some(value) = overrides.warn {
            merged.warn = value;
        }
        if let Some(title) = &overrides.title {
            merged.title = Some(title.clone());
        }
        merged.renderer.extend(
            overrides
                .renderer
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );

        Ok(merged)
    }

    /// Checks the invariants [`Options::merge`] enforces on options that were
    /// built by hand.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when `only` or `exclude` contains a
    /// blank entity name.
    pub fn validate(&self) -> Result<()> {
        for (option, names) in [("only", &self.only), ("exclude", &self.exclude)] {
            let blank = names
                .iter()
                .flatten()
                .any(|name| name.trim().is_empty());
            if blank {
                return Err(blank_name(option));
            }
        }
        Ok(())
    }

    /// The focus set, when one was given and is not empty.
    #[must_use]
    pub fn only_names(&self) -> Option<&BTreeSet<String>> {
        self.only.as_ref().filter(|names| !names.is_empty())
    }

    /// The exclusion set, when one was given and is not empty.
    #[must_use]
    pub fn excluded_names(&self) -> Option<&BTreeSet<String>> {
        self.exclude.as_ref().filter(|names| !names.is_empty())
    }

    /// The selected attribute categories, when at least one was selected.
    #[must_use]
    pub fn attribute_categories(&self) -> Option<&BTreeSet<AttributeCategory>> {
        self.attributes
            .as_ref()
            .filter(|categories| !categories.is_empty())
    }
}

fn name_set(option: &str, names: &[String]) -> Result<Option<BTreeSet<String>>> {
    let mut set = BTreeSet::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            return Err(blank_name(option));
        }
        set.insert(name.to_string());
    }
    Ok((!set.is_empty()).then_some(set))
}

fn blank_name(option: &str) -> Error {
    Error::configuration(format!("`{option}` contains a blank entity name"))
}

/// Caller supplied overrides. Every `None` keeps the value it is merged over.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PartialOptions {
    #[serde(deserialize_with = "deserialize_categories")]
    pub attributes: Option<Vec<AttributeCategory>>,
    pub disconnected: Option<bool>,
    pub indirect: Option<bool>,
    pub inheritance: Option<bool>,
    pub polymorphism: Option<bool>,
    #[serde(deserialize_with = "deserialize_names")]
    pub only: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_names")]
    pub exclude: Option<Vec<String>>,
    pub warn: Option<bool>,
    #[serde(deserialize_with = "deserialize_title")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub renderer: BTreeMap<String, serde_yaml::Value>,
}

impl PartialOptions {
    /// Parses overrides from a YAML document. An empty document yields no overrides.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the document does not describe
    /// valid options.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|err| Error::configuration(err.to_string()))
    }

    /// Reads overrides from an `.erdconfig` file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] when the file cannot be read and
    /// [`Error::Configuration`] when its content is not valid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    #[must_use]
    pub fn with_only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_attributes(mut self, categories: impl IntoIterator<Item = AttributeCategory>) -> Self {
        self.attributes = Some(categories.into_iter().collect());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrCsv {
    List(Vec<String>),
    Csv(String),
}

impl ListOrCsv {
    fn into_items(self) -> Vec<String> {
        match self {
            Self::List(items) => items,
            Self::Csv(text) => text
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoriesInput {
    Toggle(bool),
    Items(ListOrCsv),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TitleInput {
    Toggle(bool),
    Text(String),
}

fn deserialize_names<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<ListOrCsv>::deserialize(deserializer) {
        Ok(input) => Ok(input.map(ListOrCsv::into_items)),
        Err(_) => Err(de::Error::custom(
            "expected entity names as a list of strings or a comma separated string",
        )),
    }
}

fn deserialize_categories<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<AttributeCategory>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Ok(input) = Option::<CategoriesInput>::deserialize(deserializer) else {
        return Err(de::Error::custom(
            "expected attribute categories as a list, a comma separated string or `false`",
        ));
    };
    match input {
        None => Ok(None),
        Some(CategoriesInput::Toggle(false)) => Ok(Some(Vec::new())),
        Some(CategoriesInput::Toggle(true)) => Err(de::Error::custom(
            "`attributes: true` is ambiguous, list the categories to show",
        )),
        Some(CategoriesInput::Items(items)) => items
            .into_items()
            .iter()
            .map(|item| item.parse::<AttributeCategory>())
            .collect::<Result<Vec<_>>>()
            .map(Some)
            .map_err(de::Error::custom),
    }
}

fn deserialize_title<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<TitleInput>::deserialize(deserializer)? {
        None | Some(TitleInput::Toggle(false)) => Ok(None),
        Some(TitleInput::Toggle(true)) => {
            Err(de::Error::custom("`title` must be a string or `false`"))
        }
        Some(TitleInput::Text(text)) => Ok(Some(text)),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = Options::default();
        assert_eq!(options.attributes, None);
        assert!(!options.disconnected);
        assert!(options.indirect);
        assert!(!options.inheritance);
        assert!(!options.polymorphism);
        assert_eq!(options.only, None);
        assert_eq!(options.exclude, None);
        assert!(options.warn);
        assert_eq!(options.title, None);
    }

    #[test]
    fn merge_only_touches_supplied_fields() {
        let base = Options {
            inheritance: true,
            ..Options::default()
        };
        let overrides = PartialOptions {
            indirect: Some(false),
            ..PartialOptions::default()
        };

        let merged = base.merge(&overrides).expect("merge");

        assert!(!merged.indirect);
        assert!(merged.inheritance);
        assert!(merged.warn);
    }

    #[test]
    fn merge_rejects_blank_entity_names() {
        let overrides = PartialOptions::default().with_only(["User", "  "]);

        let err = Options::default().merge(&overrides).expect_err("blank name");

        assert!(matches!(err, Error::Configuration { reason } if reason.contains("`only`")));
    }

    #[test]
    fn validate_rejects_blank_names_in_hand_built_options() {
        let options = Options {
            exclude: Some(["User".to_string(), " ".to_string()].into()),
            ..Options::default()
        };

        let err = options.validate().expect_err("blank name");

        assert!(matches!(err, Error::Configuration { reason } if reason.contains("`exclude`")));
        assert!(Options::default().validate().is_ok());
    }

    #[test]
    fn reads_overrides_from_erdconfig_file() {
        let path = std::env::temp_dir().join(format!("loco-erd-{}.erdconfig", std::process::id()));
        std::fs::write(&path, "only: User\nindirect: false\n").expect("write config");

        let overrides = PartialOptions::from_file(&path);
        std::fs::remove_file(&path).expect("remove config");

        let overrides = overrides.expect("overrides");
        assert_eq!(overrides.only, Some(vec!["User".to_string()]));
        assert_eq!(overrides.indirect, Some(false));
    }

    #[test]
    fn missing_erdconfig_file_is_an_io_error() {
        let path = std::env::temp_dir().join("loco-erd-missing/.erdconfig");

        let err = PartialOptions::from_file(path).expect_err("missing file");

        assert!(matches!(err, Error::IO(_)));
    }

    #[test]
    fn empty_name_list_leaves_focus_unset() {
        let merged = Options::default()
            .merge(&PartialOptions::default().with_exclude(Vec::<String>::new()))
            .expect("merge");

        assert_eq!(merged.exclude, None);
        assert_eq!(merged.excluded_names(), None);
    }

    #[test]
    fn parses_erdconfig_document() {
        let options = Options::from_yaml_str(
            r"
attributes:
  - content
  - foreign_keys
only: User, Order
exclude:
  - Audit
indirect: false
title: Shop
filetype: svg
",
        )
        .expect("valid config");

        assert_eq!(
            options.attributes,
            Some(BTreeSet::from([
                AttributeCategory::Content,
                AttributeCategory::ForeignKeys
            ]))
        );
        assert_eq!(
            options.only,
            Some(BTreeSet::from(["User".to_string(), "Order".to_string()]))
        );
        assert_eq!(options.exclude, Some(BTreeSet::from(["Audit".to_string()])));
        assert!(!options.indirect);
        assert_eq!(options.title.as_deref(), Some("Shop"));
        assert_eq!(
            options.renderer.get("filetype"),
            Some(&serde_yaml::Value::String("svg".to_string()))
        );
    }

    #[test]
    fn attributes_false_selects_nothing() {
        let options = Options::from_yaml_str("attributes: false").expect("valid config");

        assert_eq!(options.attributes, Some(BTreeSet::new()));
        assert_eq!(options.attribute_categories(), None);
    }

    #[test]
    fn empty_document_keeps_defaults() {
        assert_eq!(Options::from_yaml_str("").expect("empty"), Options::default());
    }

    #[rstest]
    #[case("only: [1, 2]")]
    #[case("exclude: {name: User}")]
    #[case("attributes: [content, comments]")]
    #[case("attributes: true")]
    #[case("title: true")]
    #[case("indirect: sometimes")]
    fn rejects_malformed_values(#[case] document: &str) {
        let err = Options::from_yaml_str(document).expect_err("malformed");
        assert!(matches!(err, Error::Configuration { .. }), "{err:?}");
    }

    #[rstest]
    #[case("content", AttributeCategory::Content)]
    #[case("primary_keys", AttributeCategory::PrimaryKeys)]
    #[case(" foreign_keys ", AttributeCategory::ForeignKeys)]
    #[case("timestamps", AttributeCategory::Timestamps)]
    fn parses_attribute_categories(#[case] input: &str, #[case] expected: AttributeCategory) {
        assert_eq!(input.parse::<AttributeCategory>().expect("known"), expected);
    }
}
