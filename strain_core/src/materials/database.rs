//! # Built-in Material Database
//!
//! In-plane parameters for the materials commonly seen in nitride
//! epitaxy: GaN and AlN films, the AlGaN alloy family, and Si(111) and
//! 4H-SiC substrates. Lattice constants are in Angstrom at 300 K,
//! moduli in GPa, expansion coefficients in 1/K.
//!
//! Single-point tables mean the property is treated as constant over
//! temperature; multi-point tables interpolate linearly.

use once_cell::sync::Lazy;

use crate::materials::{MaterialData, MaterialDb};
use crate::table::PropertyTable;

static BUILTIN: Lazy<MaterialDb> = Lazy::new(|| {
    let mut db = MaterialDb::new();

    db.insert_simple(MaterialData {
        name: "GaN".to_string(),
        lattice_300k: 3.189,
        thermal_expansion: PropertyTable::constant(300.0, 5.59e-6),
        youngs_modulus: PropertyTable::constant(300.0, 320.0),
        poissons_ratio: PropertyTable::constant(300.0, 0.25),
        growth_temperature: Some(850.0),
    });

    db.insert_simple(MaterialData {
        name: "AlN".to_string(),
        lattice_300k: 3.112,
        thermal_expansion: PropertyTable::constant(300.0, 4.2e-6),
        youngs_modulus: PropertyTable::constant(300.0, 345.0),
        poissons_ratio: PropertyTable::constant(300.0, 0.24),
        growth_temperature: Some(1100.0),
    });

    db.insert_simple(MaterialData {
        name: "Si111".to_string(),
        lattice_300k: 5.430,
        thermal_expansion: PropertyTable::constant(300.0, 2.59e-6),
        youngs_modulus: PropertyTable::constant(300.0, 169.0),
        poissons_ratio: PropertyTable::constant(300.0, 0.26),
        growth_temperature: None,
    });

    db.insert_simple(MaterialData {
        name: "SiC4H".to_string(),
        lattice_300k: 3.080,
        thermal_expansion: PropertyTable::constant(300.0, 4.2e-6),
        youngs_modulus: PropertyTable::constant(300.0, 466.0),
        poissons_ratio: PropertyTable::constant(300.0, 0.21),
        growth_temperature: None,
    });

    // AlxGa1-xN for 0 < x < 1; boundaries must be simple materials
    db.insert_alloy("AlGaN", [(1.0, "AlN".to_string()), (0.0, "GaN".to_string())]);

    db
});

/// The built-in material database.
pub fn builtin() -> &'static MaterialDb {
    &BUILTIN
}
