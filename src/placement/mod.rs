//! Object placement on a generated terrain: tree instances on a jittered
//! lattice and a single water body found by rejection sampling.

pub mod trees;
pub mod water;

pub use trees::{build_prototypes, place_trees, TreeParams, TreePlacementRecord, TreePrototype, TreeSpeciesDef};
pub use water::{place_water, WaterDef, WaterPlacementRecord};
