//! This module provides the `Params` extractor, which deserializes the path
//! parameters captured by the router into a typed structure.
//!
//! The router stores captures as [`PathParams`] in the request extensions, in
//! the order they appear in the route pattern. The interceptor relies on that
//! order when it renders a call's arguments.
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::types::Request;

/// Path captures of the matched route, in pattern order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PathParams(pub Vec<(String, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(_, v)| v.as_str())
    }
}

/// Typed view of the path parameters.
///
/// ```rust,ignore
/// #[derive(Deserialize)]
/// struct RulePath { rule_id: u64, subject: String }
///
/// let Params(path) = Params::<RulePath>::from_request(&req)?;
/// ```
pub struct Params<T>(pub T);

impl<T> Params<T>
where
    T: DeserializeOwned,
{
    pub fn from_request(req: &Request) -> Result<Self> {
        let map = req
            .extensions()
            .get::<PathParams>()
            .context("request carries no path parameters")?;

        let value = Value::Object(Self::coerce_params(map));
        let parsed = serde_json::from_value::<T>(value).context("malformed path parameters")?;

        Ok(Params(parsed))
    }

    /// Numeric-looking values become JSON numbers so integer fields deserialize.
    fn coerce_params(map: &PathParams) -> Map<String, Value> {
        let mut result = Map::new();

        for (k, v) in &map.0 {
            let val = if let Ok(n) = v.parse::<i64>() {
                Value::Number(n.into())
            } else if let Ok(n) = v.parse::<u64>() {
                Value::Number(n.into())
            } else {
                Value::String(v.clone())
            };

            result.insert(k.clone(), val);
        }

        result
    }
}
