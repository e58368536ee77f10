//! Dependency resolver.
//!
//! Orders models so that every model is inserted after the models it
//! references. Cycles are tolerated: the model that closes a cycle is emitted
//! where it was first re-entered, which makes the tie-break depend on name
//! order rather than on anything in the data.
use std::collections::HashSet;

use migrator_shared::types::{ModelDescriptor, SchemaMap};
use tracing::warn;

/// Returns every model name exactly once, dependencies before dependents.
///
/// Dependencies naming models absent from `models` are ignored. Roots are
/// visited in the map's sorted order, so the output is deterministic.
pub fn resolve(models: &SchemaMap) -> Vec<String> {
    let mut visitor = Visitor {
        models,
        visiting: HashSet::new(),
        visited: HashSet::new(),
        order: Vec::with_capacity(models.len()),
    };

    for name in models.keys() {
        visitor.visit(name);
    }

    visitor.order
}

struct Visitor<'a> {
    models: &'a SchemaMap,
    visiting: HashSet<&'a str>,
    visited: HashSet<&'a str>,
    order: Vec<String>,
}

impl<'a> Visitor<'a> {
    fn visit(&mut self, name: &'a str) {
        if self.visited.contains(name) {
            return;
        }
        if self.visiting.contains(name) {
            warn!(model = name, "Dependency cycle detected, breaking it at this model");
            self.complete(name);
            return;
        }

        let models = self.models;
        let Some(model) = models.get(name) else {
            return;
        };

        self.visiting.insert(name);
        for dependency in &model.dependencies {
            self.visit(dependency);
        }
        self.visiting.remove(name);

        // A cycle may already have emitted this model while it was in progress.
        if !self.visited.contains(name) {
            self.complete(name);
        }
    }

    fn complete(&mut self, name: &'a str) {
        self.visited.insert(name);
        self.order.push(name.to_string());
    }
}

/// The parsed models together with their resolved insertion order.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    models: SchemaMap,
    order: Vec<String>,
}

impl DependencyGraph {
    pub fn build(models: SchemaMap) -> Self {
        let order = resolve(&models);
        Self { models, order }
    }

    /// Insertion order: referenced models first.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Teardown order: referencing models first.
    pub fn reverse_order(&self) -> impl Iterator<Item = &String> {
        self.order.iter().rev()
    }

    /// Models in insertion order.
    pub fn ordered_models(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.order.iter().filter_map(|name| self.models.get(name))
    }

    pub fn model(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.get(name)
    }

    pub fn models(&self) -> &SchemaMap {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
