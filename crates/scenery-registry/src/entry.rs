use std::fmt;

use scenery_query::Address;
use serde::{Deserialize, Serialize};

use crate::RegistryError;
use crate::matcher::{AddressMatcher, KeyMatcher, Matcher, MatchTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Color,
    Vector,
    Boolean,
    Dropdown,
    Number,
}

impl AnnotationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Vector => "vector",
            Self::Boolean => "boolean",
            Self::Dropdown => "dropdown",
            Self::Number => "number",
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a dropdown takes its choices from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choices {
    None,
    Fixed(Vec<String>),
    /// Keys of the map at this address, read from the current tree.
    KeysAt(Address),
}

#[derive(Debug)]
pub struct RegistryEntry {
    matcher: Box<dyn Matcher>,
    kind: AnnotationKind,
    choices: Choices,
}

impl RegistryEntry {
    pub fn new(matcher: impl Matcher + 'static, kind: AnnotationKind) -> Self {
        Self { matcher: Box::new(matcher), kind, choices: Choices::None }
    }

    pub fn by_key(key: &str, kind: AnnotationKind) -> Self {
        Self::new(KeyMatcher::new(key), kind)
    }

    pub fn with_choices(mut self, choices: Choices) -> Self {
        self.choices = choices;
        self
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    pub fn choices(&self) -> &Choices {
        &self.choices
    }

    pub fn matches(&self, target: &MatchTarget<'_>) -> bool {
        self.matcher.matches(target)
    }

    /// Several scalars of one sequence form a single value of this kind,
    /// such as the channels of a color.
    pub fn collapses_sequences(&self) -> bool {
        matches!(self.kind, AnnotationKind::Color | AnnotationKind::Vector)
    }
}

/// One entry of a registry table as written in JSON.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct EntryConfig {
    match_key: Option<String>,
    match_address: Option<String>,
    #[serde(rename = "type")]
    kind: AnnotationKind,
    options: Option<Vec<String>>,
    source: Option<String>,
}

impl EntryConfig {
    pub(crate) fn into_entry(self, index: usize) -> Result<RegistryEntry, RegistryError> {
        let matcher: Box<dyn Matcher> = match (self.match_key, self.match_address) {
            (Some(key), None) => Box::new(KeyMatcher::new(key)),
            (None, Some(pattern)) => match AddressMatcher::new(&pattern) {
                Ok(matcher) => Box::new(matcher),
                Err(source) => return Err(RegistryError::Pattern { index, pattern, source }),
            },
            _ => return Err(RegistryError::Matcher { index }),
        };

        let choices = match (self.options, self.source) {
            (Some(options), _) => Choices::Fixed(options),
            (None, Some(source)) => Choices::KeysAt(Address::parse(&source)),
            (None, None) if self.kind == AnnotationKind::Dropdown => {
                return Err(RegistryError::Dropdown { index });
            }
            (None, None) => Choices::None,
        };

        Ok(RegistryEntry { matcher, kind: self.kind, choices })
    }
}
