use std::sync::Arc;

use beanbag::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut context = Context::new();
    context
        .registry_mut()
        .register_bean_instance("app-name", "greeter")
        .unwrap();
    context.register_configuration::<AppConfiguration>();
    context.assemble().unwrap();

    let registry = context.registry();
    let app = registry.get_bean::<Arc<App>>("app").unwrap();
    app.run(registry).unwrap();
}

struct ConsoleLogger {
    app_name: &'static str,
}

impl ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.app_name, message);
    }
}

trait Greeter: Send + Sync + 'static {
    fn greet(&self, logger: &ConsoleLogger);
}

struct EnglishGreeter;

impl Greeter for EnglishGreeter {
    fn greet(&self, logger: &ConsoleLogger) {
        logger.log("Hello World!");
    }
}

struct ChineseGreeter;

impl Greeter for ChineseGreeter {
    fn greet(&self, logger: &ConsoleLogger) {
        logger.log("你好世界!");
    }
}

struct LoggingConfiguration {
    app_name: &'static str,
}

#[configuration(name = "logging", bean("logger", singleton))]
impl LoggingConfiguration {
    #[construct]
    fn new(#[resource("app-name")] app_name: &'static str) -> Self {
        Self { app_name }
    }

    #[provide_beans]
    fn provide(&mut self, registry: &mut BeanRegistry) -> Result<(), BeanError> {
        let app_name = self.app_name;
        registry.register_shared_bean(
            "logger",
            Singleton::new(move |_| Ok(ConsoleLogger { app_name })),
        )
    }
}

struct GreeterConfiguration;

#[configuration(
    name = "greeters",
    bean("english", instance),
    bean("chinese", instance),
    depends_on(LoggingConfiguration)
)]
impl GreeterConfiguration {
    #[construct]
    fn new() -> Self {
        GreeterConfiguration
    }

    #[provide_beans]
    fn provide(&mut self, registry: &mut BeanRegistry) -> Result<(), BeanError> {
        registry.register_bean_instance("english", Arc::new(EnglishGreeter) as Arc<dyn Greeter>)?;
        registry.register_bean_instance("chinese", Arc::new(ChineseGreeter) as Arc<dyn Greeter>)
    }
}

struct App {
    greeters: Vec<Arc<dyn Greeter>>,
}

impl App {
    fn run(&self, registry: &BeanRegistry) -> Result<(), BeanError> {
        let logger = registry.get_bean_ref::<ConsoleLogger>("logger")?;
        logger.log("Greeting from beanbag managed beans:");
        for greeter in &self.greeters {
            greeter.greet(logger);
        }
        Ok(())
    }
}

struct AppConfiguration;

#[configuration(name = "app", bean("app", smart_singleton), depends_on(GreeterConfiguration))]
impl AppConfiguration {
    #[construct]
    fn new(
        #[resource("english")] _english: Arc<dyn Greeter>,
        #[resource("chinese")] _chinese: Arc<dyn Greeter>,
    ) -> Self {
        AppConfiguration
    }

    #[provide_beans]
    fn provide(&mut self, registry: &mut BeanRegistry) -> Result<(), BeanError> {
        registry.register_bean(
            "app",
            SmartSingleton::new(|registry| {
                Ok(App {
                    greeters: vec![
                        registry.get_bean("english")?,
                        registry.get_bean("chinese")?,
                    ],
                })
            }),
        )
    }
}
