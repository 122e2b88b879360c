//! Explicit `visibleWhen` dependency graph
//!
//! Edges point from a dependent field to the field it depends on. The graph
//! is built once per validation so cycles are rejected at mutation time and
//! render-time evaluation never has to follow chains.

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use std::collections::HashMap;

use super::{FormConfiguration, Violation, ViolationKind, ViolationLocation};

/// One `visibleWhen` reference as declared in the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyRef<'a> {
    pub section_key: &'a str,
    pub field_key: &'a str,
    pub depends_on: &'a str,
}

#[derive(Debug)]
pub struct DependencyGraph<'a> {
    graph: DiGraphMap<&'a str, ()>,
    /// field key -> section keys defining it, in render order
    owners: HashMap<&'a str, Vec<&'a str>>,
    references: Vec<DependencyRef<'a>>,
}

impl<'a> DependencyGraph<'a> {
    pub fn build(config: &'a FormConfiguration) -> Self {
        let mut graph = DiGraphMap::new();
        let mut owners: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        let mut references = Vec::new();

        for (section, field) in config.fields() {
            graph.add_node(field.field_key.as_str());
            owners
                .entry(field.field_key.as_str())
                .or_default()
                .push(section.section_key.as_str());
            if let Some(rule) = &field.visible_when {
                references.push(DependencyRef {
                    section_key: section.section_key.as_str(),
                    field_key: field.field_key.as_str(),
                    depends_on: rule.field_key.as_str(),
                });
            }
        }

        for reference in &references {
            if reference.field_key != reference.depends_on
                && owners.contains_key(reference.depends_on)
            {
                graph.add_edge(reference.field_key, reference.depends_on, ());
            }
        }

        Self {
            graph,
            owners,
            references,
        }
    }

    /// Keys this field's visibility depends on
    pub fn dependencies_of(&self, field_key: &str) -> Vec<&'a str> {
        self.neighbors(field_key, Direction::Outgoing)
    }

    /// Keys whose visibility depends on this field
    pub fn dependents_of(&self, field_key: &str) -> Vec<&'a str> {
        self.neighbors(field_key, Direction::Incoming)
    }

    fn neighbors(&self, field_key: &str, direction: Direction) -> Vec<&'a str> {
        let Some(node) = self.node(field_key) else {
            return Vec::new();
        };
        let mut keys: Vec<&'a str> = self.graph.neighbors_directed(node, direction).collect();
        keys.sort_unstable();
        keys
    }

    fn node(&self, field_key: &str) -> Option<&'a str> {
        self.graph.nodes().find(|n| *n == field_key)
    }

    pub fn references(&self) -> &[DependencyRef<'a>] {
        &self.references
    }

    /// Every dependency cycle, each as its sorted member keys
    pub fn cycles(&self) -> Vec<Vec<&'a str>> {
        let mut cycles: Vec<Vec<&'a str>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|mut component| {
                component.sort_unstable();
                component
            })
            .collect();
        cycles.sort();
        cycles
    }

    pub fn is_acyclic(&self) -> bool {
        self.cycles().is_empty()
    }

    /// Reference, self-dependency, ambiguity and cycle violations
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        for reference in &self.references {
            let location = ViolationLocation::field(reference.section_key, reference.field_key);
            if reference.depends_on == reference.field_key {
                violations.push(Violation::new(
                    location,
                    ViolationKind::SelfDependency,
                    format!("field '{}' cannot depend on itself", reference.field_key),
                ));
                continue;
            }
            match self.owners.get(reference.depends_on).map(Vec::len) {
                None => violations.push(Violation::new(
                    location,
                    ViolationKind::UnknownDependency,
                    format!(
                        "visibleWhen references unknown field '{}'",
                        reference.depends_on
                    ),
                )),
                Some(count) if count > 1 => violations.push(Violation::new(
                    location,
                    ViolationKind::AmbiguousDependency,
                    format!(
                        "visibleWhen references '{}', which is defined in {} sections",
                        reference.depends_on, count
                    ),
                )),
                Some(_) => {}
            }
        }

        for cycle in self.cycles() {
            let first = cycle[0];
            let section_key = self
                .owners
                .get(first)
                .and_then(|sections| sections.first())
                .copied()
                .unwrap_or_default();
            violations.push(Violation::new(
                ViolationLocation::field(section_key, first),
                ViolationKind::DependencyCycle,
                format!("visibleWhen dependency cycle: {}", cycle.join(" -> ")),
            ));
        }

        violations
    }
}
