use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::provider::Provider;

#[derive(Debug, Default)]
pub struct ProviderMap {
    providers: HashMap<String, Box<dyn Provider>>,
}

impl ProviderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `provider` under `name` unless the name is taken, in which
    /// case the provider is handed back untouched.
    pub fn insert(
        &mut self,
        name: String,
        provider: Box<dyn Provider>,
    ) -> Result<(), Box<dyn Provider>> {
        match self.providers.entry(name) {
            Entry::Occupied(_) => Err(provider),
            Entry::Vacant(entry) => {
                entry.insert(provider);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Provider> {
        self.providers.get(name).map(AsRef::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::provider::TypedProvider;
    use crate::strategy::Instance;

    use super::*;

    #[test]
    fn provider_map_insert_succeeds() {
        let mut map = ProviderMap::new();
        assert!(map
            .insert("a".into(), Box::new(TypedProvider::new(Instance::new(1i32))))
            .is_ok());
        assert!(map
            .insert("b".into(), Box::new(TypedProvider::new(Instance::new(2i32))))
            .is_ok());

        assert!(map.contains("a"));
        assert_eq!(map.get("b").map(|p| p.type_name()), Some("i32"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn provider_map_insert_fails_when_name_is_taken() {
        let mut map = ProviderMap::new();
        map.insert("a".into(), Box::new(TypedProvider::new(Instance::new(1i32))))
            .unwrap();

        let rejected = map.insert("a".into(), Box::new(TypedProvider::new(Instance::new(1u8))));
        assert_eq!(rejected.map_err(|p| p.type_name()), Err("u8"));
        assert_eq!(map.get("a").map(|p| p.type_name()), Some("i32"));
    }
}
