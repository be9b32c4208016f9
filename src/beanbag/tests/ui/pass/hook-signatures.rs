use beanbag::prelude::*;

pub struct Plain;

#[configuration(name = "plain")]
impl Plain {
    #[construct]
    fn new() -> Self {
        Plain
    }

    #[post_init]
    fn check(&mut self) {}

    #[provide_beans]
    fn provide(&mut self) {}
}

pub struct WithRegistry;

#[configuration(name = "with-registry", bean("answer", instance))]
impl WithRegistry {
    #[construct]
    fn new() -> Self {
        WithRegistry
    }

    #[post_init]
    fn check(&mut self, registry: &BeanRegistry) -> Result<(), BeanError> {
        registry.get_bean::<i32>("question").map(|_| ())
    }

    #[provide_beans]
    fn provide(&mut self, registry: &mut BeanRegistry) -> Result<(), ConfigurationError> {
        registry.register_bean_instance("answer", 42i32)?;
        Ok(())
    }
}

pub struct Borrowing {
    greeting: String,
}

#[configuration(resource("unused"), depends_on(Plain, WithRegistry))]
impl Borrowing {
    #[construct]
    fn new(#[resource("greeting")] greeting: &String, answer: i32) -> Self {
        Self {
            greeting: format!("{greeting} {answer}"),
        }
    }

    #[provide_beans]
    fn provide(&mut self, registry: &mut BeanRegistry) -> Result<(), BeanError> {
        registry.register_bean_instance("full-greeting", self.greeting.clone())
    }
}

fn main() {}
