//! Layout options.
//!
//! Options are flat key/value objects with camelCase keys, deserialized with `serde`. Every key
//! is optional; missing keys take the defaults below and an explicit `null` clears an optional
//! value.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Layer assignment strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Algorithm {
    /// Keep everything on one layer.
    None,
    /// Round robin over the estimated number of layers.
    Simple,
    /// Greedily punt the most-overlapping nodes to the next layer.
    #[default]
    Overlap,
}

impl Algorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Simple => "simple",
            Self::Overlap => "overlap",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "simple" => Ok(Self::Simple),
            "overlap" => Ok(Self::Overlap),
            other => Err(Error::config(format!("unknown algorithm: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DistributorOptions {
    pub algorithm: Algorithm,
    pub layer_width: Option<f64>,
    pub density: f64,
    pub node_spacing: f64,
    pub stub_width: f64,
}

impl Default for DistributorOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Overlap,
            layer_width: Some(1000.0),
            density: 0.75,
            node_spacing: 3.0,
            stub_width: 1.0,
        }
    }
}

impl DistributorOptions {
    pub fn validate(&self) -> Result<()> {
        positive("density", self.density)?;
        if let Some(w) = self.layer_width {
            positive("layerWidth", w)?;
        }
        finite("nodeSpacing", self.node_spacing)?;
        finite("stubWidth", self.stub_width)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoveOverlapOptions {
    pub line_spacing: f64,
    pub node_spacing: f64,
    pub min_pos: Option<f64>,
    pub max_pos: Option<f64>,
}

impl Default for RemoveOverlapOptions {
    fn default() -> Self {
        Self {
            line_spacing: 2.0,
            node_spacing: 3.0,
            min_pos: Some(0.0),
            max_pos: None,
        }
    }
}

impl RemoveOverlapOptions {
    pub fn validate(&self) -> Result<()> {
        finite("lineSpacing", self.line_spacing)?;
        finite("nodeSpacing", self.node_spacing)?;
        if let Some(p) = self.min_pos {
            finite("minPos", p)?;
        }
        if let Some(p) = self.max_pos {
            finite("maxPos", p)?;
        }
        Ok(())
    }
}

/// Options for [`crate::Force`]; the distributor and overlap-remover options are derived from
/// these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceOptions {
    pub algorithm: Algorithm,
    /// Explicit layer width. When unset, `maxPos - minPos` is used if both bounds are set.
    pub layer_width: Option<f64>,
    pub density: f64,
    pub node_spacing: f64,
    pub stub_width: f64,
    pub line_spacing: f64,
    pub min_pos: Option<f64>,
    pub max_pos: Option<f64>,
}

impl Default for ForceOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Overlap,
            layer_width: None,
            density: 0.85,
            node_spacing: 3.0,
            stub_width: 1.0,
            line_spacing: 2.0,
            min_pos: Some(0.0),
            max_pos: None,
        }
    }
}

impl ForceOptions {
    /// Parses a flat JSON object; absent keys keep their defaults.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::config("options must be a JSON object"));
        }
        let options: Self =
            serde_json::from_value(value).map_err(|e| Error::config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Applies the keys present in `patch` on top of the current options.
    pub fn merge(&mut self, patch: &Value) -> Result<()> {
        let Value::Object(patch) = patch else {
            return Err(Error::config("options must be a JSON object"));
        };
        let mut base = match serde_json::to_value(&*self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(Error::config(e.to_string())),
        };
        for (key, value) in patch {
            base.insert(key.clone(), value.clone());
        }
        *self = Self::from_value(Value::Object(base))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.distributor_options().validate()?;
        self.remove_overlap_options().validate()?;
        if let (Some(min), Some(max)) = (self.min_pos, self.max_pos) {
            if max < min {
                return Err(Error::config(format!(
                    "maxPos ({max}) must not be less than minPos ({min})"
                )));
            }
        }
        Ok(())
    }

    pub fn effective_layer_width(&self) -> Option<f64> {
        self.layer_width.or(match (self.min_pos, self.max_pos) {
            (Some(min), Some(max)) if max > min => Some(max - min),
            _ => None,
        })
    }

    pub fn distributor_options(&self) -> DistributorOptions {
        DistributorOptions {
            algorithm: self.algorithm,
            layer_width: self.effective_layer_width(),
            density: self.density,
            node_spacing: self.node_spacing,
            stub_width: self.stub_width,
        }
    }

    pub fn remove_overlap_options(&self) -> RemoveOverlapOptions {
        RemoveOverlapOptions {
            line_spacing: self.line_spacing,
            node_spacing: self.node_spacing,
            min_pos: self.min_pos,
            max_pos: self.max_pos,
        }
    }
}

fn finite(key: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::config(format!("{key} must be finite, got {value}")))
    }
}

fn positive(key: &str, value: f64) -> Result<()> {
    finite(key, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(Error::config(format!("{key} must be positive, got {value}")))
    }
}
