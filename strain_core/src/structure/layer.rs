//! # Layer
//!
//! One physical layer of the stack: a material reference, a thickness,
//! the relaxation ratio of its bottom interface, and an optional
//! per-layer growth-temperature override. After a solve the layer also
//! carries its force-per-unit-width and the shared curvature, from
//! which stress and strain at any depth follow.

use crate::errors::{StrainError, StrainResult};
use crate::materials::Material;
use crate::units::{Gigapascals, Micrometers, Nanometers};

/// Stress queries tolerate this much relative overshoot past the top
/// surface, so sampling the exact boundary survives rounding.
const POSITION_SLACK: f64 = 1e-8;

/// A single layer in the stack. Force in GPa·nm, curvature in 1/nm.
#[derive(Debug, Clone)]
pub struct Layer {
    material: Material,
    thickness: Nanometers,
    relaxation: f64,
    growth_temperature_override: Option<f64>,
    force: Option<f64>,
    curvature: Option<f64>,
}

impl Layer {
    /// Create a layer.
    ///
    /// # Errors
    ///
    /// Thickness must be positive and finite; the relaxation ratio must
    /// lie in `[0, 1]`.
    pub fn new(material: Material, thickness: Nanometers, relaxation: f64) -> StrainResult<Self> {
        if !thickness.0.is_finite() || thickness.0 <= 0.0 {
            return Err(StrainError::invalid_input(
                "thickness",
                thickness.0.to_string(),
                "Layer thickness must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&relaxation) {
            return Err(StrainError::invalid_input(
                "relaxation",
                relaxation.to_string(),
                "Relaxation ratio must be within [0, 1]",
            ));
        }
        Ok(Layer {
            material,
            thickness,
            relaxation,
            growth_temperature_override: None,
            force: None,
            curvature: None,
        })
    }

    /// The layer's material.
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Layer thickness.
    pub fn thickness(&self) -> Nanometers {
        self.thickness
    }

    /// Fraction of the bottom-interface lattice mismatch relieved by
    /// defects.
    pub fn relaxation(&self) -> f64 {
        self.relaxation
    }

    /// Display name, e.g. `"GaN(0.2)"` with the thickness in um.
    pub fn name(&self) -> String {
        format!("{}({})", self.material.name(), Micrometers::from(self.thickness).0)
    }

    /// Growth temperature: the per-layer override when set, otherwise
    /// the material's.
    pub fn growth_temperature(&self) -> Option<f64> {
        self.growth_temperature_override
            .or_else(|| self.material.growth_temperature())
    }

    /// Override the growth temperature for this layer only.
    pub fn set_growth_temperature(&mut self, temperature: f64) {
        self.growth_temperature_override = Some(temperature);
    }

    /// Restore the growth temperature from the layer's material.
    pub fn reset_growth_temperature(&mut self) {
        self.growth_temperature_override = None;
    }

    /// Store the solved force-per-width and curvature. Must be called
    /// before any stress or strain query.
    pub fn set_force_and_curvature(&mut self, force: f64, curvature: f64) {
        self.force = Some(force);
        self.curvature = Some(curvature);
    }

    /// Whether a solve has populated this layer.
    pub fn is_solved(&self) -> bool {
        self.force.is_some() && self.curvature.is_some()
    }

    fn solved_state(&self) -> StrainResult<(f64, f64)> {
        match (self.force, self.curvature) {
            (Some(f), Some(k)) => Ok((f, k)),
            _ => Err(StrainError::LayerNotSolved { layer: self.name() }),
        }
    }

    /// Biaxial stress at depth `x` nm within the layer, with layer
    /// properties evaluated at `temperature`:
    /// `stress(x) = force/thickness + E'·(x − thickness/2)·curvature/2`.
    pub fn stress(&self, x: f64, temperature: f64) -> StrainResult<Gigapascals> {
        let (force, curvature) = self.solved_state()?;
        let thickness = self.thickness.0;
        if x < 0.0 || x > thickness * (1.0 + POSITION_SLACK) {
            return Err(StrainError::PositionOutOfRange {
                context: format!("layer '{}'", self.name()),
                position: x,
                min: 0.0,
                max: thickness,
            });
        }
        let biaxial = self.material.biaxial_modulus(temperature);
        Ok(Gigapascals(
            force / thickness + biaxial * (x - thickness / 2.0) * curvature / 2.0,
        ))
    }

    /// In-plane biaxial strain at depth `x` nm.
    pub fn strain(&self, x: f64, temperature: f64) -> StrainResult<f64> {
        let biaxial = self.material.biaxial_modulus(temperature);
        Ok(self.stress(x, temperature)?.0 / biaxial)
    }

    /// Strain energy per unit area integrated through the thickness
    /// (GPa·nm):
    /// `force²/(thickness·E') + thickness³·E'·curvature²/48`.
    pub fn strain_energy(&self, temperature: f64) -> StrainResult<f64> {
        let (force, curvature) = self.solved_state()?;
        let thickness = self.thickness.0;
        let biaxial = self.material.biaxial_modulus(temperature);
        Ok(force * force / (thickness * biaxial)
            + thickness.powi(3) * biaxial / 48.0 * curvature * curvature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialDb;

    fn gan_layer(thickness_nm: f64) -> Layer {
        let material = MaterialDb::builtin().resolve("GaN").unwrap();
        Layer::new(material, Nanometers(thickness_nm), 0.0).unwrap()
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let material = MaterialDb::builtin().resolve("GaN").unwrap();
        assert!(Layer::new(material.clone(), Nanometers(0.0), 0.0).is_err());
        assert!(Layer::new(material.clone(), Nanometers(-5.0), 0.0).is_err());
        assert!(Layer::new(material.clone(), Nanometers(100.0), -0.1).is_err());
        assert!(Layer::new(material, Nanometers(100.0), 1.5).is_err());
    }

    #[test]
    fn test_name_shows_thickness_in_um() {
        let layer = gan_layer(200.0);
        assert_eq!(layer.name(), "GaN(0.2)");
    }

    #[test]
    fn test_query_before_solve_fails() {
        let layer = gan_layer(100.0);
        let result = layer.stress(50.0, 300.0);
        assert!(matches!(result, Err(StrainError::LayerNotSolved { .. })));
    }

    #[test]
    fn test_position_out_of_range() {
        let mut layer = gan_layer(100.0);
        layer.set_force_and_curvature(0.0, 0.0);
        assert!(matches!(
            layer.stress(-1.0, 300.0),
            Err(StrainError::PositionOutOfRange { .. })
        ));
        assert!(matches!(
            layer.stress(101.0, 300.0),
            Err(StrainError::PositionOutOfRange { .. })
        ));
        // the exact top surface is allowed
        assert!(layer.stress(100.0, 300.0).is_ok());
    }

    #[test]
    fn test_unstressed_layer() {
        let mut layer = gan_layer(100.0);
        layer.set_force_and_curvature(0.0, 0.0);
        assert_eq!(layer.stress(50.0, 300.0).unwrap(), Gigapascals(0.0));
        assert_eq!(layer.strain(50.0, 300.0).unwrap(), 0.0);
        assert_eq!(layer.strain_energy(300.0).unwrap(), 0.0);
    }

    #[test]
    fn test_bending_stress_is_antisymmetric_about_midplane() {
        let mut layer = gan_layer(100.0);
        layer.set_force_and_curvature(0.0, 1e-6);
        let bottom = layer.stress(0.0, 300.0).unwrap();
        let top = layer.stress(100.0, 300.0).unwrap();
        let mid = layer.stress(50.0, 300.0).unwrap();
        assert!((bottom + top).0.abs() < 1e-12);
        assert!(mid.0.abs() < 1e-12);
    }

    #[test]
    fn test_uniform_force_stress() {
        let mut layer = gan_layer(100.0);
        layer.set_force_and_curvature(200.0, 0.0);
        // stress = force / thickness everywhere
        assert!((layer.stress(0.0, 300.0).unwrap().0 - 2.0).abs() < 1e-12);
        assert!((layer.stress(100.0, 300.0).unwrap().0 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_strain_energy_formula() {
        let mut layer = gan_layer(100.0);
        layer.set_force_and_curvature(200.0, 1e-6);
        let biaxial = layer.material().biaxial_modulus(300.0);
        let expected = 200.0f64.powi(2) / (100.0 * biaxial)
            + 100.0f64.powi(3) * biaxial / 48.0 * 1e-12;
        assert!((layer.strain_energy(300.0).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_growth_temperature_override() {
        let mut layer = gan_layer(100.0);
        assert_eq!(layer.growth_temperature(), Some(850.0));
        layer.set_growth_temperature(1000.0);
        assert_eq!(layer.growth_temperature(), Some(1000.0));
        layer.reset_growth_temperature();
        assert_eq!(layer.growth_temperature(), Some(850.0));
    }
}
