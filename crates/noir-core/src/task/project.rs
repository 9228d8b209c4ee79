use serde::{Deserialize, Serialize};

/// Projects offered when no project list has been stored yet.
pub const DEFAULT_PROJECTS: [&str; 3] = ["Work", "Study", "Other"];

/// Ordered list of unique project names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ProjectList {
    names: Vec<String>,
}

impl ProjectList {
    pub fn empty() -> Self {
        Self { names: Vec::new() }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Append a trimmed, non-empty, not-yet-present name.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        self.names.len() != before
    }
}

impl Default for ProjectList {
    fn default() -> Self {
        Self {
            names: DEFAULT_PROJECTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl From<Vec<String>> for ProjectList {
    fn from(names: Vec<String>) -> Self {
        let mut list = Self::empty();
        for name in &names {
            list.add(name);
        }
        list
    }
}

impl From<ProjectList> for Vec<String> {
    fn from(list: ProjectList) -> Self {
        list.names
    }
}
