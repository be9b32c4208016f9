use std::collections::BTreeMap;

use crate::config::ConfigurationWrapper;

/// Explains why a set of configurations got stuck by searching for a chain
/// of resources that leads back to where it started.
///
/// Every configuration added is its own node, even when several share a
/// name. Path tokens are written `configuration::resource`.
#[derive(Debug, Default)]
pub(crate) struct CycleChecker {
    bean_source: BTreeMap<String, usize>,
    configs: Vec<ConfigNode>,
}

#[derive(Debug)]
struct ConfigNode {
    name: String,
    resources: Vec<String>,
}

impl CycleChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_wrappers<'a, I>(wrappers: I) -> Self
    where
        I: IntoIterator<Item = &'a ConfigurationWrapper>,
    {
        let mut checker = Self::new();
        for wrapper in wrappers {
            checker.add_configuration(
                wrapper.name(),
                wrapper.waiting_resources().iter().map(String::as_str),
                wrapper.bean_names(),
            );
        }
        checker
    }

    pub fn add_configuration<'r, 'b, R, B>(&mut self, name: &str, resources: R, beans: B)
    where
        R: IntoIterator<Item = &'r str>,
        B: IntoIterator<Item = &'b str>,
    {
        let index = self.configs.len();
        for bean in beans {
            self.bean_source.insert(bean.to_owned(), index);
        }
        self.configs.push(ConfigNode {
            name: name.to_owned(),
            resources: resources.into_iter().map(str::to_owned).collect(),
        });
    }

    /// Returns the shortest closed trace of the first cycle found, if any.
    /// Configurations are searched in name order.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut order: Vec<usize> = (0..self.configs.len()).collect();
        order.sort_by(|&a, &b| self.configs[a].name.cmp(&self.configs[b].name));

        let mut path = Vec::new();
        for config in order {
            if self.check_all_resources(config, &mut path) {
                return Some(
                    minimize_cycle(path)
                        .into_iter()
                        .map(|(config, resource)| {
                            format!("{}::{resource}", self.configs[config].name)
                        })
                        .collect(),
                );
            }
        }
        None
    }

    fn check_all_resources<'s>(
        &'s self,
        config: usize,
        path: &mut Vec<(usize, &'s str)>,
    ) -> bool {
        self.configs[config]
            .resources
            .iter()
            .any(|resource| self.follow_resource(config, resource, path))
    }

    fn follow_resource<'s>(
        &'s self,
        config: usize,
        resource: &'s str,
        path: &mut Vec<(usize, &'s str)>,
    ) -> bool {
        let step = (config, resource);
        if path.contains(&step) {
            path.push(step);
            return true;
        }

        path.push(step);
        if let Some(&source) = self.bean_source.get(resource) {
            if self.check_all_resources(source, path) {
                return true;
            }
        }
        path.pop();
        false
    }
}

/// Cuts a closed trace down to the segment starting at the first occurrence
/// of its last step.
pub(crate) fn minimize_cycle<T: PartialEq>(mut path: Vec<T>) -> Vec<T> {
    let Some(last) = path.last() else {
        return path;
    };
    if let Some(start) = path.iter().position(|step| step == last) {
        path.drain(..start);
    }
    path
}
