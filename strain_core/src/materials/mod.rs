//! # Material Model
//!
//! Resolves a material name to temperature-dependent properties:
//! lattice constant, Young's modulus, Poisson's ratio, and growth
//! temperature.
//!
//! ## Material Kinds
//!
//! - **Simple**: tabulated per-temperature data (GaN, AlN, Si111, ...)
//! - **Interpolated**: a two-boundary alloy such as `"Al25%GaN"`, every
//!   property linearly interpolated in composition between two simple
//!   materials at matching temperature
//!
//! Alloy boundaries are restricted to simple materials by construction:
//! [`Material::Interpolated`] holds `MaterialData` directly, so an
//! alloy referencing another alloy cannot be represented.
//!
//! ## Example
//!
//! ```rust
//! use strain_core::materials::MaterialDb;
//!
//! let db = MaterialDb::builtin();
//! let gan = db.resolve("GaN").unwrap();
//! let algan = db.resolve("Al25%GaN").unwrap();
//! assert!(algan.lattice(300.0) < gan.lattice(300.0));
//! ```

pub mod database;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{StrainError, StrainResult};
use crate::table::PropertyTable;

/// Anchor temperature of the tabulated lattice constant (K).
/// `lattice_300k` is defined at this temperature by convention.
pub const LATTICE_REFERENCE_K: f64 = 300.0;

/// Tabulated parameters of a simple (non-alloy) material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    /// Material name, e.g. "GaN"
    pub name: String,
    /// In-plane lattice constant at 300 K (Angstrom)
    pub lattice_300k: f64,
    /// Thermal expansion coefficient vs temperature (1/K)
    pub thermal_expansion: PropertyTable,
    /// Young's modulus vs temperature (GPa)
    pub youngs_modulus: PropertyTable,
    /// Poisson's ratio vs temperature
    pub poissons_ratio: PropertyTable,
    /// Typical growth temperature (K), `None` when not set
    pub growth_temperature: Option<f64>,
}

impl MaterialData {
    /// Lattice constant at `temperature`: the 300 K value scaled by the
    /// integrated thermal expansion from 300 K.
    fn lattice(&self, temperature: f64) -> f64 {
        let expansion = self.thermal_expansion.integrate(LATTICE_REFERENCE_K, temperature);
        self.lattice_300k * (1.0 + expansion)
    }
}

/// Linear interpolation between `(x1, y1)` and `(x2, y2)` at `x`.
fn interpolate_section(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    ((x - x1) * y2 + (x2 - x) * y1) / (x2 - x1)
}

/// A resolved material: simple tabulated data, or a composition-
/// interpolated alloy between two simple boundary materials.
///
/// All property queries take an explicit temperature; materials carry
/// no mutable temperature state, so concurrent sweep steps can share
/// them freely.
#[derive(Debug, Clone)]
pub enum Material {
    /// Tabulated data for one material
    Simple(Arc<MaterialData>),
    /// Alloy `A<pp>%BC`: properties interpolated in composition
    /// fraction between two simple boundary materials
    Interpolated {
        /// Full alloy name, e.g. "Al25%GaN"
        name: String,
        /// Boundary materials with their composition coordinates
        /// (conventionally 1.0 and 0.0)
        boundary: [(f64, Arc<MaterialData>); 2],
        /// Composition fraction parsed from the name
        fraction: f64,
    },
}

impl Material {
    /// Material name as resolved (alloy names keep their composition).
    pub fn name(&self) -> &str {
        match self {
            Material::Simple(data) => &data.name,
            Material::Interpolated { name, .. } => name,
        }
    }

    /// Interpolate a per-boundary property in composition fraction.
    fn interpolate<G>(&self, get: G) -> f64
    where
        G: Fn(&MaterialData) -> f64,
    {
        match self {
            Material::Simple(data) => get(data),
            Material::Interpolated {
                boundary, fraction, ..
            } => {
                let (x1, ref m1) = boundary[0];
                let (x2, ref m2) = boundary[1];
                interpolate_section(x1, get(m1), x2, get(m2), *fraction)
            }
        }
    }

    /// Unstrained lattice constant at `temperature` (Angstrom).
    pub fn lattice(&self, temperature: f64) -> f64 {
        self.interpolate(|data| data.lattice(temperature))
    }

    /// Lattice constant at the 300 K reference.
    pub fn lattice_300k(&self) -> f64 {
        self.lattice(LATTICE_REFERENCE_K)
    }

    /// Relative lattice expansion as temperature changes from
    /// `temp_begin` to `temp_end`.
    pub fn thermal_expansion(&self, temp_begin: f64, temp_end: f64) -> f64 {
        let lattice_begin = self.lattice(temp_begin);
        let lattice_end = self.lattice(temp_end);
        (lattice_end - lattice_begin) / lattice_begin
    }

    /// Young's modulus at `temperature` (GPa).
    pub fn youngs_modulus(&self, temperature: f64) -> f64 {
        self.interpolate(|data| data.youngs_modulus.value_at(temperature))
    }

    /// Poisson's ratio at `temperature`.
    pub fn poissons_ratio(&self, temperature: f64) -> f64 {
        self.interpolate(|data| data.poissons_ratio.value_at(temperature))
    }

    /// Biaxial modulus E' = E / (1 - nu) at `temperature` (GPa).
    pub fn biaxial_modulus(&self, temperature: f64) -> f64 {
        self.youngs_modulus(temperature) / (1.0 - self.poissons_ratio(temperature))
    }

    /// Typical growth temperature (K). For alloys, interpolated when
    /// both boundaries define one.
    pub fn growth_temperature(&self) -> Option<f64> {
        match self {
            Material::Simple(data) => data.growth_temperature,
            Material::Interpolated {
                boundary, fraction, ..
            } => {
                let (x1, ref m1) = boundary[0];
                let (x2, ref m2) = boundary[1];
                match (m1.growth_temperature, m2.growth_temperature) {
                    (Some(t1), Some(t2)) => {
                        Some(interpolate_section(x1, t1, x2, t2, *fraction))
                    }
                    _ => None,
                }
            }
        }
    }
}

/// Split an alloy name into its data-module base name and the two-digit
/// composition percentages found in it. `"Al25%GaN"` yields
/// `("AlGaN", [0.25])`; a name without `<dd>%` groups is unchanged.
pub(crate) fn split_composition(name: &str) -> (String, Vec<f64>) {
    let chars: Vec<char> = name.chars().collect();
    let mut base = String::new();
    let mut fractions = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if i + 2 < chars.len()
            && chars[i].is_ascii_digit()
            && chars[i + 1].is_ascii_digit()
            && chars[i + 2] == '%'
        {
            let pct = chars[i].to_digit(10).unwrap() * 10 + chars[i + 1].to_digit(10).unwrap();
            fractions.push(pct as f64 / 100.0);
            i += 3;
        } else {
            base.push(chars[i]);
            i += 1;
        }
    }
    (base, fractions)
}

/// A database entry: either direct tabulated data or an alloy
/// definition pointing at two boundary material names.
#[derive(Debug, Clone)]
enum MaterialEntry {
    Simple(Arc<MaterialData>),
    Alloy {
        boundary: [(f64, String); 2],
    },
}

/// Material parameter store: name to tabulated data or alloy
/// definition. A built-in database covers the common nitride and
/// substrate materials; callers can register their own.
#[derive(Debug, Clone, Default)]
pub struct MaterialDb {
    entries: HashMap<String, MaterialEntry>,
}

impl MaterialDb {
    /// Empty database.
    pub fn new() -> Self {
        MaterialDb::default()
    }

    /// The built-in database (GaN, AlN, Si111, SiC4H, AlGaN).
    pub fn builtin() -> &'static MaterialDb {
        database::builtin()
    }

    /// Register a simple material under its own name.
    pub fn insert_simple(&mut self, data: MaterialData) {
        self.entries
            .insert(data.name.clone(), MaterialEntry::Simple(Arc::new(data)));
    }

    /// Register an alloy family under `name` (e.g. "AlGaN") with two
    /// boundary material names at their composition coordinates.
    pub fn insert_alloy(&mut self, name: impl Into<String>, boundary: [(f64, String); 2]) {
        self.entries
            .insert(name.into(), MaterialEntry::Alloy { boundary });
    }

    /// Resolve a material name, parsing alloy compositions like
    /// `"Al25%GaN"`.
    ///
    /// # Errors
    ///
    /// - [`StrainError::MaterialNotFound`] when no entry matches
    /// - [`StrainError::MalformedComposition`] for composition digits
    ///   on a simple material, a missing or ambiguous composition on an
    ///   alloy, or an alloy boundary that is not a simple material
    pub fn resolve(&self, name: &str) -> StrainResult<Material> {
        let name = name.trim();
        let (base, fractions) = split_composition(name);
        let entry = self
            .entries
            .get(&base)
            .ok_or_else(|| StrainError::material_not_found(name))?;
        match entry {
            MaterialEntry::Simple(data) => {
                if !fractions.is_empty() {
                    return Err(StrainError::malformed_composition(
                        name,
                        "composition percentage given for a simple material",
                    ));
                }
                Ok(Material::Simple(Arc::clone(data)))
            }
            MaterialEntry::Alloy { boundary } => {
                if fractions.len() != 1 {
                    return Err(StrainError::malformed_composition(
                        name,
                        format!(
                            "expected exactly one two-digit composition, found {}",
                            fractions.len()
                        ),
                    ));
                }
                let resolve_boundary = |bd_name: &str| -> StrainResult<Arc<MaterialData>> {
                    match self.entries.get(bd_name) {
                        Some(MaterialEntry::Simple(data)) => Ok(Arc::clone(data)),
                        Some(MaterialEntry::Alloy { .. }) => Err(
                            StrainError::malformed_composition(
                                name,
                                format!("boundary material '{}' must be simple", bd_name),
                            ),
                        ),
                        None => Err(StrainError::material_not_found(bd_name)),
                    }
                };
                let first = resolve_boundary(&boundary[0].1)?;
                let second = resolve_boundary(&boundary[1].1)?;
                Ok(Material::Interpolated {
                    name: name.to_string(),
                    boundary: [(boundary[0].0, first), (boundary[1].0, second)],
                    fraction: fractions[0],
                })
            }
        }
    }
}
