//! Deployment layer model.
//!
//! ```text
//! .depl files ──load_layer──> JSON tree ──DeployFlatMap──> name -> DeployEntry(ies)
//!                                                           │
//!                                           DeployTypesMap <┘ (keyed factory)
//! ```

mod binding;
mod entry;
mod factory;
pub mod keys;
mod loader;
mod map;
mod methods;
mod resolve;
mod types;

pub use binding::{DeployCustom, DeployProtocolBinding, ProtocolVersion};
pub use entry::{Cardinality, DeployEntry};
pub use factory::{builder_for, deploy_from_config, DeployBuilder, DEPLOY_FACTORY};
pub use loader::{load_layer, load_layer_str};
pub use map::{DeployFlatMap, FlatEntry};
pub use methods::{DeployMethod, DeployMethods, MethodKind, ReadMethod, SubscribeMethod, WriteMethod};
pub use resolve::{deploy_from_entry, DeployTypesMap};
pub use types::{
    DeployConstant, DeployDispatcher, DeployList, DeployParentAttribute, DeployType,
};
