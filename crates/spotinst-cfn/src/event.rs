//! Event envelope handling: shape classification, resource config location,
//! and small property parsers.

use std::collections::BTreeSet;

use serde_json::Value;
use snafu::Snafu;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::config::patch::synthesize_nulls;

pub(crate) const RESOURCE_PROPERTIES: &str = "ResourceProperties";
const OLD_RESOURCE_PROPERTIES: &str = "OldResourceProperties";
const ACCOUNT_ID: &str = "accountId";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Must define groupConfig"))]
    MissingResourceConfig,

    #[snafu(display("event defines more than one resource config: {}", matches.join(", ")))]
    AmbiguousResourceConfig { matches: Vec<String> },
}

/// The resource types a Spot CloudFormation stack can carry, named the way
/// they appear as event property keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum ResourceKind {
    Group,
    Subscription,
    HealthCheck,
    BeanstalkElastigroup,
    MrScaler,
}

/// The set of property names recognized as resource configurations.
///
/// Defaults to every [`ResourceKind`]; additional names can be registered
/// without touching the locator logic.
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    names: BTreeSet<String>,
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self {
            names: ResourceKind::iter().map(|kind| kind.to_string()).collect(),
        }
    }
}

impl ResourceRegistry {
    pub fn register(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Registered names present as keys of `tree`, with their configs, in
    /// registry iteration order.
    fn matches_in<'r, 'v>(&'r self, tree: &'v Value) -> Vec<(&'r str, &'v Value)> {
        self.names
            .iter()
            .filter_map(|name| tree.get(name).map(|config| (name.as_str(), config)))
            .collect()
    }
}

/// The two envelope layouts CloudFormation hands us.
#[derive(Debug, Clone, Copy)]
pub enum EventShape<'a> {
    /// Custom-resource convention: the config lives under
    /// `ResourceProperties`, with `OldResourceProperties` carrying the
    /// pre-update state on updates.
    Nested {
        new: &'a Value,
        old: Option<&'a Value>,
    },

    /// Legacy flat event with the config at the top level.
    Flat { properties: &'a Value },
}

impl<'a> EventShape<'a> {
    pub fn classify(event: &'a Value) -> Self {
        match event.get(RESOURCE_PROPERTIES) {
            Some(new) if new.is_object() => Self::Nested {
                new,
                old: event.get(OLD_RESOURCE_PROPERTIES),
            },
            _ => Self::Flat { properties: event },
        }
    }
}

/// Locates the single resource configuration carried by an event.
#[derive(Debug, Clone, Default)]
pub struct ConfigLocator {
    registry: ResourceRegistry,
}

impl ConfigLocator {
    pub fn new(registry: ResourceRegistry) -> Self {
        Self { registry }
    }

    /// Extracts the resource config from `event`.
    ///
    /// For update events (old properties present) the returned config has
    /// every removed field explicitly nulled, see [`synthesize_nulls`].
    pub fn locate(&self, event: &Value) -> Result<Value, Error> {
        if let EventShape::Nested { new, old } = EventShape::classify(event) {
            let matches = self.registry.matches_in(new);
            match matches.as_slice() {
                [(name, new_config)] => {
                    tracing::debug!(resource = name, "found resource config in ResourceProperties");
                    return Ok(match old.and_then(|old| old.get(name)) {
                        Some(old_config) => synthesize_nulls(old_config, new_config),
                        None => (*new_config).clone(),
                    });
                }
                [] => {}
                _ => {
                    return AmbiguousResourceConfigSnafu {
                        matches: matches
                            .iter()
                            .map(|(name, _)| (*name).to_owned())
                            .collect::<Vec<String>>(),
                    }
                    .fail();
                }
            }
        }

        // Legacy events, and nested envelopes without a recognized key,
        // carry the config at the top level.
        if let Some((name, config)) = self.registry.matches_in(event).into_iter().next() {
            tracing::debug!(resource = name, "found resource config at event top level");
            return Ok(config.clone());
        }

        MissingResourceConfigSnafu.fail()
    }
}

/// The Spot account the event targets, if any.
pub fn account_id(event: &Value) -> Option<&str> {
    let account_id = event
        .get(RESOURCE_PROPERTIES)
        .and_then(|properties| properties.get(ACCOUNT_ID))
        .or_else(|| event.get(ACCOUNT_ID))
        .and_then(Value::as_str);
    tracing::debug!(account_id, "resolved spotinst account id");
    account_id
}

/// Reads a boolean CloudFormation property.
///
/// CloudFormation delivers template booleans as the strings `"true"` and
/// `"false"`; native booleans pass through. Anything else, including null,
/// yields `None`, meaning "not specified" rather than `false`.
pub fn parse_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(boolean) => Some(*boolean),
        Value::String(string) if string == "true" => Some(true),
        Value::String(string) if string == "false" => Some(false),
        _ => None,
    }
}
