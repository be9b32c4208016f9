#![allow(clippy::new_without_default)]

extern crate self as beanbag;

pub mod config;
pub mod context;
pub mod provider;
pub mod registry;
pub mod strategy;
mod util;

pub use beanbag_derive::configuration;

pub mod prelude {
    pub use crate::config::{BeanDecl, Configuration, ConfigurationError, Resource};
    pub use crate::configuration;
    pub use crate::context::Context;
    pub use crate::provider::ValueContainer;
    pub use crate::registry::{BeanError, BeanRegistry, RegistryOptions};
    pub use crate::strategy::{
        CreationStrategy, Factory, Instance, SharedCreationStrategy, Singleton, SmartFactory,
        SmartSingleton, StrategyKind,
    };
}
