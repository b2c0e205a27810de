pub mod addr;
pub mod ballistics;
pub mod codec;
pub mod context;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod model;
pub mod observable;
pub mod prefs;
pub mod projectile;
pub mod protocol;
pub mod sensor;
pub mod spring;
pub mod sync;
pub mod units;

pub use addr::{ConfigTarget, SensorId};
pub use context::{Observers, Session};
pub use error::{ConfigError, StoreError};
pub use filter::SensorFilter;
pub use model::{Impact, ModelData, ModelGeometry};
pub use observable::Observable;
pub use prefs::{MemoryStore, PrefStore, Settings};
pub use projectile::{ProjectileCatalog, ProjectileData, RecData};
pub use protocol::{Command, Event, Link};
pub use spring::SpringData;
pub use sync::ConfigSync;
pub use units::LengthUnit;
