pub mod readings;
pub mod snapshot;

pub use readings::{
    BarometerReading, InterfaceKind, MagneticField, MagneticSample, NetworkPath,
    NetworkPathUpdate, PathType, PositionFix,
};
pub use snapshot::{GroundTruthLabel, Snapshot};
