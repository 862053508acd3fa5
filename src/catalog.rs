//! Static exam catalog: exams, their modules and sub-topics.
//!
//! The built-in data ships inside the binary as JSON and is parsed once.

use crate::models::{Exam, Module, ModuleId, SubTopic};
use serde::Deserialize;

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

lazy_static::lazy_static! {
    static ref BUILTIN: Catalog = Catalog::from_json(BUILTIN_CATALOG).unwrap_or_else(|e| {
        tracing::error!("Embedded catalog is invalid: {}", e);
        Catalog::default()
    });
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Catalog {
    pub exams: Vec<Exam>,
}

impl Catalog {
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// A single-exam catalog, mostly useful for tests and custom decks.
    pub fn single_exam(title: &str, modules: Vec<Module>) -> Self {
        Catalog {
            exams: vec![Exam {
                id: 1,
                title: title.to_string(),
                description: String::new(),
                modules,
            }],
        }
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.exams.iter().flat_map(|exam| exam.modules.iter())
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules().find(|m| m.id == id)
    }

    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.modules().map(|m| m.id).collect()
    }
}

/// Convenience constructor for a module with plain sub-topics.
pub fn simple_module(id: ModuleId, title: &str, sub_topics: &[&str]) -> Module {
    Module {
        id,
        title: title.to_string(),
        icon: "folder".to_string(),
        color: "gray".to_string(),
        sub_topics: sub_topics
            .iter()
            .map(|t| SubTopic::Simple {
                title: t.to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.exams.len(), 2);
        assert_eq!(catalog.exams[0].title, "CEH v13");
        assert_eq!(catalog.exams[0].modules.len(), 20);
        assert_eq!(catalog.exams[1].title, "CISSP");
        assert_eq!(catalog.exams[1].modules.len(), 8);
    }

    #[test]
    fn test_module_ids_are_unique() {
        let mut ids = Catalog::builtin().module_ids();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_cissp_sub_topics_carry_content_points() {
        let domain = Catalog::builtin().module(21).unwrap();
        assert!(domain.title.starts_with("DOMAIN 1"));
        let first = &domain.sub_topics[0];
        assert_eq!(first.title(), "1.1 Security Fundamentals");
        assert!(first.content_points().contains(&"CIA Triad".to_string()));
    }

    #[test]
    fn test_ceh_sub_topics_are_simple() {
        let scanning = Catalog::builtin().module(3).unwrap();
        assert_eq!(scanning.title, "Scanning Networks");
        assert!(matches!(scanning.sub_topics[0], SubTopic::Simple { .. }));
    }

    #[test]
    fn test_single_exam_lookup() {
        let catalog = Catalog::single_exam("Test", vec![simple_module(3, "M3", &["A", "B"])]);
        assert_eq!(catalog.module(3).unwrap().sub_topics.len(), 2);
        assert!(catalog.module(4).is_none());
    }
}
