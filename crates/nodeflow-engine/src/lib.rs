pub mod adapter;
pub mod builder;
pub mod catalog;
pub mod driver;
pub mod node;
pub mod registry;
pub mod resolver;

pub use adapter::{AdapterChain, DictResult, SelectKeys, SortedKeys};
pub use builder::Builder;
pub use catalog::ModuleCatalog;
pub use driver::{Driver, Execution};
pub use node::{FnNode, Module};
pub use registry::{NodeRegistry, RegisteredNode};
pub use resolver::{execute_targets, Resolution, Resolver};
