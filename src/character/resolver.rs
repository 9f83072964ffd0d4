//! Attribute projection from growth curves.
//!
//! Picks the curve for each attribute (per-attribute override first, then the
//! record default), validates its parameters and evaluates it at a level.

use super::record::CharacterRecord;
use crate::core::config::GrowthConfig;
use crate::curves::{CurveSpec, CurveType, ParamBag};
use crate::error::{ForgeError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Something the resolver worked around rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The named curve does not exist; linear was used instead.
    UnknownCurveType { attribute: String, requested: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownCurveType {
                attribute,
                requested,
            } => write!(
                f,
                "unknown curve type '{requested}' for '{attribute}', using linear"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveSource {
    /// From the attribute's own growth curve entry.
    Override,
    /// From the record's default curve type.
    Default,
}

/// The curve chosen for one attribute, before parameter validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSelection {
    pub attribute: String,
    /// Curve name as written on the record.
    pub requested: String,
    pub curve_type: CurveType,
    pub params: ParamBag,
    pub source: CurveSource,
}

impl CurveSelection {
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        if CurveType::from_name(&self.requested).is_some() {
            return None;
        }
        Some(Diagnostic::UnknownCurveType {
            attribute: self.attribute.clone(),
            requested: self.requested.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub attribute: String,
    pub level: u32,
    pub value: f64,
    pub curve: CurveSpec,
    pub diagnostic: Option<Diagnostic>,
}

/// Projected values over a level range, one column per attribute.
///
/// Serializes as `{"level": [1, 2, ...], "attack": [...], ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionTable {
    #[serde(rename = "level")]
    pub levels: Vec<u32>,
    #[serde(flatten)]
    pub series: BTreeMap<String, Vec<f64>>,
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl ProjectionTable {
    pub fn column(&self, attribute: &str) -> Option<&[f64]> {
        self.series.get(attribute).map(Vec::as_slice)
    }
}

pub struct AttributeResolver<'a> {
    growth: &'a GrowthConfig,
}

impl<'a> AttributeResolver<'a> {
    pub fn new(growth: &'a GrowthConfig) -> Self {
        Self { growth }
    }

    pub fn select_curve(&self, record: &CharacterRecord, attribute: &str) -> CurveSelection {
        let default_params = record.default_params(attribute);

        let overridden = record
            .curve_override(attribute)
            .and_then(|o| o.curve_type.as_ref().map(|curve| (curve, o.curve_params.as_ref())));

        let (requested, params, source) = match overridden {
            Some((curve, own_params)) => (
                curve.clone(),
                own_params.or(default_params).cloned().unwrap_or_default(),
                CurveSource::Override,
            ),
            None => (
                record.growth_curve_type().to_string(),
                default_params.cloned().unwrap_or_default(),
                CurveSource::Default,
            ),
        };

        CurveSelection {
            attribute: attribute.to_string(),
            curve_type: CurveType::from_name(&requested).unwrap_or(CurveType::Linear),
            requested,
            params,
            source,
        }
    }

    /// Validated curve for `attribute`, plus a diagnostic if it fell back.
    pub fn curve_spec(
        &self,
        record: &CharacterRecord,
        attribute: &str,
    ) -> Result<(CurveSpec, Option<Diagnostic>)> {
        let selection = self.select_curve(record, attribute);
        let diagnostic = selection.diagnostic();
        if let Some(diag) = &diagnostic {
            tracing::warn!(character = record.name(), "{}", diag);
        }
        let spec = CurveSpec::from_params(selection.curve_type, &selection.params, attribute)?;
        Ok((spec, diagnostic))
    }

    fn value_at(&self, spec: &CurveSpec, attribute: &str, level: u32) -> Result<f64> {
        let raw = spec.evaluate(level as f64, self.growth.base_magnitude)
            * self.growth.coefficient(attribute);
        if !raw.is_finite() {
            return Err(ForgeError::configuration(
                attribute,
                format!("{} curve produced {raw} at level {level}", spec.curve_type()),
            ));
        }
        let capped = match self.growth.cap(attribute) {
            Some(cap) => raw.min(cap),
            None => raw,
        };
        Ok(capped.trunc())
    }

    pub fn project(
        &self,
        record: &CharacterRecord,
        attribute: &str,
        level: u32,
    ) -> Result<Projection> {
        require_level(level)?;
        let (curve, diagnostic) = self.curve_spec(record, attribute)?;
        let value = self.value_at(&curve, attribute, level)?;
        Ok(Projection {
            attribute: attribute.to_string(),
            level,
            value,
            curve,
            diagnostic,
        })
    }

    /// Every attribute on the record plus any that only has a curve entry.
    pub fn projected_attributes(record: &CharacterRecord) -> BTreeSet<String> {
        record
            .attributes()
            .names()
            .chain(record.attr_growth_curves().keys().map(String::as_str))
            .map(str::to_string)
            .collect()
    }

    /// Projection for levels `1..=max_level`.
    pub fn project_range(
        &self,
        record: &CharacterRecord,
        max_level: u32,
    ) -> Result<ProjectionTable> {
        require_level(max_level)?;
        let levels: Vec<u32> = (1..=max_level).collect();
        let mut series = BTreeMap::new();
        let mut diagnostics = Vec::new();

        for attribute in Self::projected_attributes(record) {
            let (curve, diagnostic) = self.curve_spec(record, &attribute)?;
            diagnostics.extend(diagnostic);
            let column = levels
                .iter()
                .map(|&level| self.value_at(&curve, &attribute, level))
                .collect::<Result<Vec<f64>>>()?;
            series.insert(attribute, column);
        }

        Ok(ProjectionTable {
            levels,
            series,
            diagnostics,
        })
    }

    /// Overwrites every attribute with its projection at the record's level.
    ///
    /// All projections are computed before anything is written, so an error
    /// leaves the record unchanged.
    pub fn recalculate_attributes(&self, record: &mut CharacterRecord) -> Result<Vec<Diagnostic>> {
        let level = record.level();
        let mut updates = Vec::new();
        let mut diagnostics = Vec::new();

        for attribute in Self::projected_attributes(record) {
            let projection = self.project(record, &attribute, level)?;
            diagnostics.extend(projection.diagnostic);
            updates.push((attribute, projection.value));
        }

        tracing::debug!(
            character = record.name(),
            level,
            count = updates.len(),
            "recalculated attributes"
        );
        let attributes = record.attributes_mut();
        for (attribute, value) in updates {
            attributes.set(attribute, value);
        }
        Ok(diagnostics)
    }
}

fn require_level(level: u32) -> Result<()> {
    if level == 0 {
        return Err(ForgeError::invalid_input("levels start at 1"));
    }
    Ok(())
}
