//! # Structure Solver
//!
//! The layer stack and the orchestration around it: mismatch-strain
//! computation, the neutral-plane search, the final equilibrium solve,
//! and temperature-ramp sweeps.
//!
//! ## Solve Pipeline
//!
//! Per temperature step:
//! 1. Interface mismatch strains: lattice mismatch frozen at the
//!    sweep's starting temperature and scaled by the top layer's
//!    relaxation ratio, plus the thermal mismatch accumulated from the
//!    sweep start to the current temperature
//! 2. Newton minimization of total strain energy over the trial
//!    neutral-plane position, where every objective evaluation builds
//!    and solves the full equilibrium system
//! 3. A final build-and-solve at the optimum writes force and
//!    curvature into the layers
//! 4. Stress and strain are sampled through the thickness for
//!    reporting
//!
//! Each step is a pure function of the stack and the two temperatures,
//! so sweep steps are independent of one another.

pub mod equation;
pub mod layer;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{StrainError, StrainResult};
use crate::materials::{Material, MaterialDb};
use crate::solver::{LinearSystem, NewtonMinimizer};
use crate::units::{Kelvin, Meters, Micrometers, Nanometers};

pub use layer::Layer;

/// One layer as described by the stack loader, listed top-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Material name, possibly an alloy composition like "Al25%GaN"
    pub material_name: String,
    /// Layer thickness
    pub thickness_nm: Nanometers,
    /// Bottom-interface relaxation ratio in [0, 1]
    pub relaxation: f64,
}

/// Solver configuration. Defaults match the reference behavior: room
/// temperature 300 K, energy-derivative tolerance 1e-9 GPa·nm per nm,
/// at most 10 samples per layer with a 10 nm minimum step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveConfig {
    /// Room temperature (K), the endpoint of cooldown/heatup sweeps
    pub room_temperature_k: f64,
    /// Tolerance on the strain-energy derivative at the neutral plane
    pub minimizer_tolerance: f64,
    /// Relative pivot tolerance of the linear solver
    pub relative_tolerance: f64,
    /// Upper bound on stress/strain samples per layer
    pub max_samples_per_layer: usize,
    /// Finest sampling step (nm) for thin layers
    pub min_sample_step_nm: f64,
    /// RNG seed for the minimizer's randomized restarts; fixed by
    /// default so repeated solves are reproducible
    pub seed: Option<u64>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        SolveConfig {
            room_temperature_k: 300.0,
            minimizer_tolerance: 1e-9,
            relative_tolerance: 1e-8,
            max_samples_per_layer: 10,
            min_sample_step_nm: 10.0,
            seed: Some(0),
        }
    }
}

/// One sampled stress or strain value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Global through-thickness position from the stack bottom
    pub position_um: Micrometers,
    /// Stress (GPa) or strain (dimensionless)
    pub value: f64,
    /// Name of the layer the sample falls in
    pub layer: String,
}

/// The solved state of the stack at one sweep temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepStep {
    /// Temperature of this step
    pub temperature_k: Kelvin,
    /// Radius of curvature; infinite for a flat stack
    pub radius_m: Meters,
    /// Neutral-plane position from the stack bottom
    pub neutral_plane_um: Micrometers,
    /// Stress profile (GPa)
    pub stress_gpa: Vec<Sample>,
    /// Strain profile
    pub strain: Vec<Sample>,
}

/// Per-layer inputs of the equilibrium system at one temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct EquationParameters {
    /// Biaxial moduli E' = E/(1−ν) (GPa), bottom to top
    pub young: Vec<f64>,
    /// Thicknesses (nm), bottom to top
    pub thickness: Vec<f64>,
    /// Total mismatch strain per interface (length N−1)
    pub mismatch: Vec<f64>,
}

/// An ordered stack of layers, index 0 at the bottom (substrate).
#[derive(Debug, Clone)]
pub struct Structure {
    layers: Vec<Layer>,
    config: SolveConfig,
}

impl Structure {
    /// Build a stack from top-first layer specs, resolving each unique
    /// material name once. The input order is reversed so that index 0
    /// is the bottom (substrate) layer.
    pub fn new(specs: &[LayerSpec], db: &MaterialDb, config: SolveConfig) -> StrainResult<Self> {
        if specs.is_empty() {
            return Err(StrainError::invalid_input(
                "specs",
                "[]",
                "Structure must contain at least one layer",
            ));
        }
        let mut materials: HashMap<String, Material> = HashMap::new();
        let mut layers = Vec::with_capacity(specs.len());
        for spec in specs.iter().rev() {
            let material = match materials.get(&spec.material_name) {
                Some(m) => m.clone(),
                None => {
                    let m = db.resolve(&spec.material_name)?;
                    materials.insert(spec.material_name.clone(), m.clone());
                    m
                }
            };
            layers.push(Layer::new(material, spec.thickness_nm, spec.relaxation)?);
        }
        Ok(Structure { layers, config })
    }

    /// The layers, bottom to top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Total stack thickness.
    pub fn total_thickness(&self) -> Nanometers {
        self.layers
            .iter()
            .fold(Nanometers(0.0), |sum, layer| sum + layer.thickness())
    }

    /// Lattice mismatch strain across the interface below `top`,
    /// evaluated at `temperature` and scaled by how much of it the top
    /// layer's bottom interface relaxes away.
    ///
    /// The mean of the two lattice constants serves as the
    /// denominator so that A-on-B and B-on-A give mismatches of equal
    /// magnitude and opposite sign.
    pub fn lattice_mismatch_strain(bottom: &Layer, top: &Layer, temperature: f64) -> f64 {
        let bottom_lattice = bottom.material().lattice(temperature);
        let top_lattice = top.material().lattice(temperature);
        let denominator = (top_lattice + bottom_lattice) / 2.0;
        (top_lattice - bottom_lattice) / denominator * (1.0 - top.relaxation())
    }

    /// Thermal mismatch strain: the difference between the two layers'
    /// thermal expansions as temperature moves from `temp_begin` to
    /// `temp_end`.
    pub fn thermal_mismatch_strain(
        bottom: &Layer,
        top: &Layer,
        temp_begin: f64,
        temp_end: f64,
    ) -> f64 {
        let bottom_expansion = bottom.material().thermal_expansion(temp_begin, temp_end);
        let top_expansion = top.material().thermal_expansion(temp_begin, temp_end);
        top_expansion - bottom_expansion
    }

    /// Assemble the per-layer equation inputs: biaxial moduli and
    /// thicknesses at `temp_end`, and per-interface mismatch with the
    /// lattice part frozen at `temp_begin`.
    pub fn equation_parameters(&self, temp_begin: f64, temp_end: f64) -> EquationParameters {
        let young: Vec<f64> = self
            .layers
            .iter()
            .map(|layer| layer.material().biaxial_modulus(temp_end))
            .collect();
        let thickness: Vec<f64> = self.layers.iter().map(|layer| layer.thickness().0).collect();
        let mut mismatch = Vec::with_capacity(self.layers.len().saturating_sub(1));
        for pair in self.layers.windows(2) {
            let lattice = Self::lattice_mismatch_strain(&pair[0], &pair[1], temp_begin);
            let thermal = Self::thermal_mismatch_strain(&pair[0], &pair[1], temp_begin, temp_end);
            mismatch.push(lattice + thermal);
        }
        EquationParameters {
            young,
            thickness,
            mismatch,
        }
    }

    /// Walk every layer with at most `max_samples_per_layer` positions
    /// each (at least 3, stepping no finer than `min_sample_step_nm`),
    /// collecting `f(layer index, local position)`.
    fn sampling<F>(&self, mut f: F) -> StrainResult<Vec<Sample>>
    where
        F: FnMut(usize, f64) -> StrainResult<f64>,
    {
        let mut samples = Vec::new();
        let mut global_pos = 0.0;
        for (i, layer) in self.layers.iter().enumerate() {
            let thickness = layer.thickness().0;
            let by_step = (thickness / self.config.min_sample_step_nm) as usize + 1;
            let num = self.config.max_samples_per_layer.min(by_step).max(3);
            let step = thickness / (num as f64 - 1.0);
            let mut local_pos = 0.0;
            samples.push(Sample {
                position_um: Nanometers(global_pos).into(),
                value: f(i, local_pos)?,
                layer: layer.name(),
            });
            for _ in 1..num {
                global_pos += step;
                local_pos += step;
                samples.push(Sample {
                    position_um: Nanometers(global_pos).into(),
                    value: f(i, local_pos.min(thickness))?,
                    layer: layer.name(),
                });
            }
        }
        Ok(samples)
    }

    /// Total strain energy of a candidate solution, computed from the
    /// root vector without touching layer state.
    fn total_energy(params: &EquationParameters, root: &[f64]) -> f64 {
        let num_layers = params.young.len();
        let curvature = root[num_layers];
        (0..num_layers)
            .map(|i| {
                let force = root[i];
                let (young, thickness) = (params.young[i], params.thickness[i]);
                force * force / (thickness * young)
                    + thickness.powi(3) * young / 48.0 * curvature * curvature
            })
            .sum()
    }

    /// Solve the stack for one temperature step: find the neutral
    /// plane by strain-energy minimization, solve the equilibrium
    /// system there, store per-layer force/curvature, and sample the
    /// stress and strain profiles.
    pub fn solve_step(&mut self, temp_begin: f64, temp_current: f64) -> StrainResult<SweepStep> {
        let params = self.equation_parameters(temp_begin, temp_current);
        let total = self.total_thickness().0;
        let relative_tolerance = self.config.relative_tolerance;

        // Every objective evaluation is a complete build-and-solve; the
        // inverse block is skipped there to keep the inner loop lean.
        // Finite-difference probes can land just past the interval
        // ends, so the trial position is clamped here; build_system
        // itself still rejects out-of-range positions.
        let objective = |pos: f64| -> StrainResult<f64> {
            let pos = pos.clamp(0.0, total);
            let (m, b) =
                equation::build_system(&params.young, &params.thickness, &params.mismatch, pos)?;
            let mut system = LinearSystem::with_options(m, b, false, relative_tolerance)?;
            system.solve()?;
            Ok(Self::total_energy(&params, system.root()?))
        };

        let mut minimizer =
            NewtonMinimizer::new(0.0, total, self.config.minimizer_tolerance);
        if let Some(seed) = self.config.seed {
            minimizer = minimizer.with_seed(seed);
        }
        let optimum = minimizer.minimize(objective)?;
        let neutral_plane_pos = optimum.position;

        // Final solve at the optimum
        let (m, b) = equation::build_system(
            &params.young,
            &params.thickness,
            &params.mismatch,
            neutral_plane_pos,
        )?;
        let mut system = LinearSystem::with_options(m, b, false, relative_tolerance)?;
        system.solve()?;
        let root = system.root()?.to_vec();

        let curvature = root[self.layers.len()];
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.set_force_and_curvature(root[i], curvature);
        }
        let radius_m = if curvature == 0.0 {
            Meters(f64::INFINITY)
        } else {
            Nanometers(1.0 / curvature).into()
        };

        let stress_gpa =
            self.sampling(|i, x| self.layers[i].stress(x, temp_current).map(|s| s.0))?;
        let strain = self.sampling(|i, x| self.layers[i].strain(x, temp_current))?;

        Ok(SweepStep {
            temperature_k: Kelvin(temp_current),
            radius_m,
            neutral_plane_um: Nanometers(neutral_plane_pos).into(),
            stress_gpa,
            strain,
        })
    }

    /// Ramp the temperature from `temp_begin` to `temp_end` in
    /// `num_steps` uniform steps (inclusive of both ends), solving the
    /// stack at each. The lattice mismatch stays frozen at
    /// `temp_begin` throughout.
    pub fn ramp_temperature(
        &mut self,
        temp_begin: f64,
        temp_end: f64,
        num_steps: usize,
    ) -> StrainResult<Vec<SweepStep>> {
        if num_steps < 2 {
            return Err(StrainError::invalid_input(
                "num_steps",
                num_steps.to_string(),
                "Temperature ramp needs at least 2 steps",
            ));
        }
        let temp_step = (temp_end - temp_begin) / (num_steps as f64 - 1.0);
        let mut results = Vec::with_capacity(num_steps);
        for i in 0..num_steps {
            let current = temp_begin + temp_step * i as f64;
            results.push(self.solve_step(temp_begin, current)?);
        }
        Ok(results)
    }

    /// Evaluate the stack as-is at a single temperature.
    pub fn statusquo(&mut self, temperature: f64) -> StrainResult<Vec<SweepStep>> {
        Ok(vec![self.solve_step(temperature, temperature)?])
    }

    /// Growth temperature of the top layer, required by
    /// cooldown/heatup sweeps.
    fn top_growth_temperature(&self) -> StrainResult<f64> {
        let top = self.layers.last().expect("stack is never empty");
        top.growth_temperature().ok_or_else(|| {
            StrainError::invalid_input(
                "growth_temperature",
                "None",
                format!("Top layer '{}' has no growth temperature", top.name()),
            )
        })
    }

    /// Cool from the top layer's growth temperature down to room
    /// temperature.
    pub fn cooldown(&mut self, num_steps: usize) -> StrainResult<Vec<SweepStep>> {
        let growth = self.top_growth_temperature()?;
        self.ramp_temperature(growth, self.config.room_temperature_k, num_steps)
    }

    /// Heat from room temperature up to the top layer's growth
    /// temperature.
    pub fn heatup(&mut self, num_steps: usize) -> StrainResult<Vec<SweepStep>> {
        let growth = self.top_growth_temperature()?;
        self.ramp_temperature(self.config.room_temperature_k, growth, num_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, thickness_nm: f64) -> LayerSpec {
        LayerSpec {
            material_name: name.to_string(),
            thickness_nm: Nanometers(thickness_nm),
            relaxation: 0.0,
        }
    }

    fn gan_on_aln() -> Structure {
        // top-first: GaN film on an AlN substrate
        let specs = [spec("GaN", 2000.0), spec("AlN", 100_000.0)];
        Structure::new(&specs, MaterialDb::builtin(), SolveConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_stack_rejected() {
        let result = Structure::new(&[], MaterialDb::builtin(), SolveConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_stack_order_is_reversed() {
        let structure = gan_on_aln();
        // index 0 must be the substrate (last spec)
        assert_eq!(structure.layers()[0].material().name(), "AlN");
        assert_eq!(structure.layers()[1].material().name(), "GaN");
        assert_eq!(structure.total_thickness(), Nanometers(102_000.0));
    }

    #[test]
    fn test_lattice_mismatch_antisymmetric() {
        let structure = gan_on_aln();
        let (substrate, film) = (&structure.layers()[0], &structure.layers()[1]);
        let forward = Structure::lattice_mismatch_strain(substrate, film, 300.0);
        let backward = Structure::lattice_mismatch_strain(film, substrate, 300.0);
        // mean-lattice denominator makes the two directions exact opposites
        assert!((forward + backward).abs() < 1e-15);
        // GaN lattice exceeds AlN: film-on-substrate mismatch is positive
        assert!(forward > 0.0);
    }

    #[test]
    fn test_relaxation_scales_lattice_mismatch() {
        let specs = [
            LayerSpec {
                material_name: "GaN".to_string(),
                thickness_nm: Nanometers(2000.0),
                relaxation: 0.5,
            },
            spec("AlN", 100_000.0),
        ];
        let relaxed =
            Structure::new(&specs, MaterialDb::builtin(), SolveConfig::default()).unwrap();
        let coherent = gan_on_aln();
        let m_relaxed = Structure::lattice_mismatch_strain(
            &relaxed.layers()[0],
            &relaxed.layers()[1],
            300.0,
        );
        let m_coherent = Structure::lattice_mismatch_strain(
            &coherent.layers()[0],
            &coherent.layers()[1],
            300.0,
        );
        assert!((m_relaxed - 0.5 * m_coherent).abs() < 1e-12);
    }

    #[test]
    fn test_thermal_mismatch_zero_without_temperature_change() {
        let structure = gan_on_aln();
        let (substrate, film) = (&structure.layers()[0], &structure.layers()[1]);
        let mismatch = Structure::thermal_mismatch_strain(substrate, film, 850.0, 850.0);
        assert_eq!(mismatch, 0.0);
    }

    #[test]
    fn test_equation_parameters_shapes() {
        let structure = gan_on_aln();
        let params = structure.equation_parameters(850.0, 300.0);
        assert_eq!(params.young.len(), 2);
        assert_eq!(params.thickness.len(), 2);
        assert_eq!(params.mismatch.len(), 1);
        // biaxial modulus exceeds Young's modulus
        assert!(params.young[1] > 320.0);
    }

    #[test]
    fn test_single_free_standing_layer_is_flat() {
        let specs = [spec("GaN", 1000.0)];
        let mut structure =
            Structure::new(&specs, MaterialDb::builtin(), SolveConfig::default()).unwrap();
        let steps = structure.statusquo(300.0).unwrap();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].radius_m.0.is_infinite());
        for sample in &steps[0].stress_gpa {
            assert!(sample.value.abs() < 1e-12);
        }
    }

    #[test]
    fn test_cooldown_produces_finite_bow() {
        let mut structure = gan_on_aln();
        let steps = structure.cooldown(3).unwrap();
        assert_eq!(steps.len(), 3);
        assert!((steps[0].temperature_k.0 - 850.0).abs() < 1e-9);
        assert!((steps[2].temperature_k.0 - 300.0).abs() < 1e-9);
        // once cooled, the mismatched film bows the wafer to a finite radius
        let final_step = &steps[2];
        assert!(final_step.radius_m.0.is_finite());
        assert!(final_step.radius_m.0 != 0.0);
        // both layers are thick enough to cap at 10 samples each
        assert_eq!(final_step.stress_gpa.len(), 20);
    }

    #[test]
    fn test_solve_is_idempotent() {
        let mut structure = gan_on_aln();
        let first = structure.statusquo(300.0).unwrap();
        let second = structure.statusquo(300.0).unwrap();
        let (a, b) = (&first[0], &second[0]);
        assert!((a.radius_m - b.radius_m).0.abs() <= 1e-6 * a.radius_m.0.abs());
        assert!((a.neutral_plane_um - b.neutral_plane_um).0.abs() < 1e-6);
        for (s1, s2) in a.stress_gpa.iter().zip(&b.stress_gpa) {
            assert!((s1.value - s2.value).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ramp_needs_two_steps() {
        let mut structure = gan_on_aln();
        assert!(structure.ramp_temperature(850.0, 300.0, 1).is_err());
    }

    #[test]
    fn test_cooldown_requires_growth_temperature() {
        // Si111 has no growth temperature; as top layer, cooldown fails
        let specs = [spec("Si111", 1000.0), spec("GaN", 1000.0)];
        let mut structure =
            Structure::new(&specs, MaterialDb::builtin(), SolveConfig::default()).unwrap();
        assert!(structure.cooldown(3).is_err());
    }

    #[test]
    fn test_sweep_step_serialization() {
        let mut structure = gan_on_aln();
        let steps = structure.statusquo(300.0).unwrap();
        let json = serde_json::to_string(&steps[0]).unwrap();
        let roundtrip: SweepStep = serde_json::from_str(&json).unwrap();
        assert_eq!(steps[0], roundtrip);
    }
}
