//! The assembler: materializes registered configurations in whatever order
//! their resources become available.

mod cycle;

use std::any::TypeId;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::mem;

use tracing::{debug, warn};

use crate::config::{
    Configuration, ConfigurationError, ConfigurationSet, ConfigurationUnit, ConfigurationWrapper,
    PendingConfiguration,
};
use crate::registry::{BeanRegistry, RegistryOptions};

use cycle::CycleChecker;

/// Owns a [`BeanRegistry`] together with the configurations that fill it.
///
/// Configurations start out waiting. [`Context::assemble`] repeatedly passes
/// over the waiting ones, constructing each configuration whose resources
/// are all registered, until a pass makes no progress.
pub struct Context {
    registry: BeanRegistry,
    waiting: Vec<ConfigurationWrapper>,
    active: Vec<ConfigurationUnit>,
    registering: Vec<TypeId>,
}

impl Context {
    pub fn new() -> Self {
        Self::with_registry(BeanRegistry::new())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self::with_registry(BeanRegistry::with_options(options))
    }

    /// Wraps a registry which may already hold externally supplied beans.
    pub fn with_registry(registry: BeanRegistry) -> Self {
        Self {
            registry,
            waiting: Vec::new(),
            active: Vec::new(),
            registering: Vec::new(),
        }
    }

    /// Queues `C` and, transitively, everything in its
    /// [`Configuration::Dependencies`].
    ///
    /// Nothing is deduplicated: a configuration reached along two paths is
    /// queued twice, and assembly will later fail on the bean names both
    /// copies provide. A dependency leading back to a configuration that is
    /// still being queued is skipped.
    pub fn register_configuration<C: Configuration>(&mut self) -> &mut Self {
        let id = TypeId::of::<C>();
        if self.registering.contains(&id) {
            warn!(
                configuration = C::NAME,
                "skipped configuration that depends on itself"
            );
            return self;
        }

        self.waiting.push(ConfigurationWrapper::new::<C>());
        debug!(configuration = C::NAME, "registered configuration");

        self.registering.push(id);
        C::Dependencies::register_all(self);
        self.registering.pop();
        self
    }

    /// Constructs every waiting configuration.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::Cycle`] if the configurations left waiting
    ///   require each other's beans.
    /// - [`ConfigurationError::Initialization`] if they are left waiting for
    ///   any other reason.
    /// - Any error raised while constructing or initializing a
    ///   configuration, unchanged. The failed configuration stays waiting
    ///   and whatever it already did to the registry is kept.
    pub fn assemble(&mut self) -> Result<(), ConfigurationError> {
        loop {
            let mut progressed = false;
            let mut still_waiting = Vec::with_capacity(self.waiting.len());
            let mut pass = mem::take(&mut self.waiting).into_iter();

            while let Some(mut wrapper) = pass.next() {
                match self.load_config(&mut wrapper) {
                    Ok(true) => progressed = true,
                    Ok(false) => still_waiting.push(wrapper),
                    Err(err) => {
                        still_waiting.push(wrapper);
                        still_waiting.extend(pass);
                        self.waiting = still_waiting;
                        return Err(err);
                    }
                }
            }

            self.waiting = still_waiting;
            if !progressed {
                break;
            }
        }

        if self.waiting.is_empty() {
            debug!(configurations = self.active.len(), "assembled context");
            return Ok(());
        }

        if let Some(trace) = CycleChecker::from_wrappers(&self.waiting).find_cycle() {
            return Err(ConfigurationError::Cycle { trace });
        }

        let pending = self
            .waiting
            .iter()
            .map(|wrapper| PendingConfiguration {
                name: wrapper.name(),
                resources: wrapper.waiting_resources().to_vec(),
            })
            .collect();
        Err(ConfigurationError::Initialization { pending })
    }

    /// Constructs and initializes the configuration behind `wrapper` if all
    /// of its resources are registered. Returns whether it did.
    ///
    /// # Errors
    ///
    /// Returns whatever error construction or initialization raises. The
    /// configuration is dropped before the error is returned.
    pub fn load_config(
        &mut self,
        wrapper: &mut ConfigurationWrapper,
    ) -> Result<bool, ConfigurationError> {
        if !wrapper.are_resources_satisfied(&self.registry) {
            return Ok(false);
        }

        let mut unit = wrapper.build_config(&self.registry)?;
        unit.initialize(&mut self.registry)?;
        debug!(configuration = unit.name(), "loaded configuration");

        self.active.push(unit);
        Ok(true)
    }

    pub fn registry(&self) -> &BeanRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut BeanRegistry {
        &mut self.registry
    }

    /// Returns the first active configuration of type `C`.
    pub fn configuration<C: Configuration>(&self) -> Option<&C> {
        self.active.iter().find_map(ConfigurationUnit::downcast_ref::<C>)
    }

    pub fn active_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.active.iter().map(ConfigurationUnit::name)
    }

    pub fn waiting_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.waiting.iter().map(ConfigurationWrapper::name)
    }

    pub fn is_assembled(&self) -> bool {
        self.waiting.is_empty()
    }

    pub fn into_registry(self) -> BeanRegistry {
        self.registry
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Context")
            .field("registry", &self.registry)
            .field("waiting", &self.waiting)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{BeanDecl, Resource};
    use crate::registry::BeanError;
    use crate::strategy::{Factory, StrategyKind};

    use super::*;

    struct Producer;

    impl Configuration for Producer {
        const NAME: &'static str = "producer";
        const BEANS: &'static [BeanDecl] = &[BeanDecl::new("X", StrategyKind::Instance)];

        type Dependencies = ();

        fn construct(_registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Producer)
        }

        fn provide_beans(&mut self, registry: &mut BeanRegistry) -> Result<(), ConfigurationError> {
            registry.register_bean_instance("X", 56789i32)?;
            Ok(())
        }
    }

    struct Consumer {
        x: i32,
        observed: Option<i32>,
    }

    impl Configuration for Consumer {
        const NAME: &'static str = "consumer";
        const RESOURCES: &'static [Resource] = &[Resource::bound("X", "x")];

        type Dependencies = ();

        fn construct(registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Self {
                x: registry.get_bean("X")?,
                observed: None,
            })
        }

        fn post_init(&mut self, registry: &BeanRegistry) -> Result<(), ConfigurationError> {
            self.observed = Some(registry.get_bean("X")?);
            Ok(())
        }
    }

    #[test]
    fn context_assemble_succeeds_with_forward_reference() {
        let mut context = Context::new();
        context
            .register_configuration::<Consumer>()
            .register_configuration::<Producer>();

        let mut wrapper = ConfigurationWrapper::new::<Consumer>();
        assert!(!wrapper.are_resources_satisfied(context.registry()));

        context.assemble().unwrap();

        assert!(context.is_assembled());
        assert_eq!(context.registry().get_bean::<i32>("X").unwrap(), 56789);
        let consumer = context.configuration::<Consumer>().unwrap();
        assert_eq!(consumer.x, 56789);
        assert_eq!(consumer.observed, Some(56789));
        assert_eq!(context.active_names().collect::<Vec<_>>(), ["producer", "consumer"]);
    }

    struct Base;

    impl Configuration for Base {
        const NAME: &'static str = "base";
        const BEANS: &'static [BeanDecl] = &[BeanDecl::new("base", StrategyKind::Instance)];

        type Dependencies = ();

        fn construct(_registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Base)
        }

        fn provide_beans(&mut self, registry: &mut BeanRegistry) -> Result<(), ConfigurationError> {
            registry.register_bean_instance("base", 1i32)?;
            Ok(())
        }
    }

    struct Left(i32);

    impl Configuration for Left {
        const NAME: &'static str = "left";
        const RESOURCES: &'static [Resource] = &[Resource::named("base")];
        const BEANS: &'static [BeanDecl] = &[BeanDecl::new("left", StrategyKind::Instance)];

        type Dependencies = (Base,);

        fn construct(registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Left(registry.get_bean::<i32>("base")? + 1))
        }

        fn provide_beans(&mut self, registry: &mut BeanRegistry) -> Result<(), ConfigurationError> {
            registry.register_bean_instance("left", self.0)?;
            Ok(())
        }
    }

    struct Right(i32);

    impl Configuration for Right {
        const NAME: &'static str = "right";
        const RESOURCES: &'static [Resource] = &[Resource::named("base")];
        const BEANS: &'static [BeanDecl] = &[BeanDecl::new("right", StrategyKind::Instance)];

        type Dependencies = (Base,);

        fn construct(registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Right(registry.get_bean::<i32>("base")? * 10))
        }

        fn provide_beans(&mut self, registry: &mut BeanRegistry) -> Result<(), ConfigurationError> {
            registry.register_bean_instance("right", self.0)?;
            Ok(())
        }
    }

    struct Top;

    impl Configuration for Top {
        const NAME: &'static str = "top";
        const RESOURCES: &'static [Resource] = &[Resource::named("left"), Resource::named("right")];
        const BEANS: &'static [BeanDecl] = &[BeanDecl::new("top", StrategyKind::Factory)];

        type Dependencies = ();

        fn construct(_registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Top)
        }

        fn provide_beans(&mut self, registry: &mut BeanRegistry) -> Result<(), ConfigurationError> {
            let left = registry.get_bean::<i32>("left")?;
            let right = registry.get_bean::<i32>("right")?;
            registry.register_bean("top", Factory::new(move |_| Ok(left + right)))?;
            Ok(())
        }
    }

    #[test]
    fn context_assemble_succeeds_with_diamond_in_any_order() {
        fn queue<C: Configuration>(context: &mut Context) {
            context.waiting.push(ConfigurationWrapper::new::<C>());
        }

        let top: fn(&mut Context) = queue::<Top>;
        let left: fn(&mut Context) = queue::<Left>;
        let right: fn(&mut Context) = queue::<Right>;
        let base: fn(&mut Context) = queue::<Base>;

        for order in [[top, right, left, base], [base, left, right, top], [left, top, base, right]] {
            let mut context = Context::new();
            for register in order {
                register(&mut context);
            }

            context.assemble().unwrap();
            assert_eq!(context.registry().get_bean::<i32>("top").unwrap(), 12);
            assert_eq!(context.active_names().count(), 4);
        }
    }

    #[test]
    fn context_register_configuration_queues_dependencies_without_deduplication() {
        let mut context = Context::new();
        context
            .register_configuration::<Left>()
            .register_configuration::<Right>();
        assert_eq!(
            context.waiting_names().collect::<Vec<_>>(),
            ["left", "base", "right", "base"]
        );

        let err = context.assemble().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::Bean {
                source: BeanError::InvalidBeanName { ref name, .. }
            } if name == "base"
        ));
    }

    struct Ping;

    impl Configuration for Ping {
        const NAME: &'static str = "ping";
        const RESOURCES: &'static [Resource] = &[Resource::named("pong")];
        const BEANS: &'static [BeanDecl] = &[BeanDecl::new("ping", StrategyKind::Instance)];

        type Dependencies = (Pong,);

        fn construct(_registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Ping)
        }
    }

    struct Pong;

    impl Configuration for Pong {
        const NAME: &'static str = "pong";
        const RESOURCES: &'static [Resource] = &[Resource::named("ping")];
        const BEANS: &'static [BeanDecl] = &[BeanDecl::new("pong", StrategyKind::Instance)];

        type Dependencies = (Ping,);

        fn construct(_registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Pong)
        }
    }

    #[test]
    fn context_register_configuration_skips_repeated_dependency() {
        let mut context = Context::new();
        context.register_configuration::<Ping>();

        assert_eq!(context.waiting_names().collect::<Vec<_>>(), ["ping", "pong"]);
    }

    #[test]
    fn context_assemble_fails_when_configurations_form_a_cycle() {
        let mut context = Context::new();
        context.register_configuration::<Ping>();

        let err = context.assemble().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::Cycle { ref trace } if trace == &["ping::pong", "pong::ping", "ping::pong"]
        ));
        assert!(!context.is_assembled());
        assert_eq!(context.active_names().count(), 0);
    }

    struct Lonely;

    impl Configuration for Lonely {
        const NAME: &'static str = "lonely";
        const RESOURCES: &'static [Resource] = &[Resource::named("nowhere")];

        type Dependencies = ();

        fn construct(_registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Lonely)
        }
    }

    #[test]
    fn context_assemble_fails_when_resource_is_never_provided() {
        let mut context = Context::new();
        context
            .register_configuration::<Producer>()
            .register_configuration::<Lonely>();

        let err = context.assemble().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::Initialization { ref pending } if pending == &[PendingConfiguration {
                name: "lonely",
                resources: vec!["nowhere".to_owned()],
            }]
        ));
        assert_eq!(context.active_names().collect::<Vec<_>>(), ["producer"]);
    }

    #[test]
    fn context_assemble_succeeds_with_external_resource() {
        let mut registry = BeanRegistry::new();
        registry.register_bean_instance("nowhere", 0u8).unwrap();
        let mut context = Context::with_registry(registry);
        context.register_configuration::<Lonely>();

        context.assemble().unwrap();

        assert!(context.configuration::<Lonely>().is_some());
        assert!(context.configuration::<Producer>().is_none());
        assert_eq!(context.into_registry().len(), 1);
    }

    struct Exploding;

    impl Configuration for Exploding {
        const NAME: &'static str = "exploding";
        const BEANS: &'static [BeanDecl] = &[BeanDecl::new("shrapnel", StrategyKind::Instance)];

        type Dependencies = ();

        fn construct(_registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Exploding)
        }

        fn provide_beans(&mut self, registry: &mut BeanRegistry) -> Result<(), ConfigurationError> {
            registry.register_bean_instance("shrapnel", 1u8)?;
            Err(ConfigurationError::construction(Self::NAME, "boom"))
        }
    }

    #[test]
    fn context_assemble_fails_when_initialization_fails() {
        let mut context = Context::new();
        context
            .register_configuration::<Exploding>()
            .register_configuration::<Producer>();

        let err = context.assemble().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::Construction {
                configuration: "exploding",
                ..
            }
        ));
        assert_eq!(err.to_string(), "could not construct configuration exploding");
        assert_eq!(
            context.waiting_names().collect::<Vec<_>>(),
            ["exploding", "producer"]
        );
        assert!(context.registry().contains_bean("shrapnel"));
        assert!(!context.registry().contains_bean("X"));
    }

    struct Needy;

    impl Configuration for Needy {
        const RESOURCES: &'static [Resource] = &[Resource::named("shared")];

        type Dependencies = ();

        fn construct(_registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Needy)
        }
    }

    struct Supplier;

    impl Configuration for Supplier {
        const RESOURCES: &'static [Resource] = &[Resource::named("nowhere")];
        const BEANS: &'static [BeanDecl] = &[BeanDecl::new("shared", StrategyKind::Instance)];

        type Dependencies = ();

        fn construct(_registry: &BeanRegistry) -> Result<Self, ConfigurationError> {
            Ok(Supplier)
        }
    }

    #[test]
    fn context_assemble_fails_without_cycle_when_unnamed_configurations_are_stuck() {
        let mut context = Context::new();
        context
            .register_configuration::<Needy>()
            .register_configuration::<Supplier>();

        let err = context.assemble().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::Initialization { ref pending } if pending == &[
                PendingConfiguration { name: "Undefined", resources: vec!["shared".to_owned()] },
                PendingConfiguration { name: "Undefined", resources: vec!["nowhere".to_owned()] },
            ]
        ));
    }
}
