//! Per-task-type model and priority tables
//!
//! Both tables are keyed by task type first and provider second. A task type
//! missing from a table falls back to the `default` row.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Row used when a task type has no row of its own
pub const DEFAULT_TASK_TYPE: &str = "default";

/// Task type → provider → model identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelTable(pub HashMap<String, HashMap<String, String>>);

impl ModelTable {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Builder-style insertion, mainly for tests and programmatic setup
    pub fn with_model(
        mut self,
        task_type: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        self.insert(task_type, provider, model);
        self
    }

    pub fn insert(
        &mut self,
        task_type: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) {
        self.0
            .entry(task_type.into())
            .or_default()
            .insert(provider.into(), model.into());
    }

    /// Model for `(task_type, provider)`, falling back to the default row.
    ///
    /// `None` means the provider cannot serve this task type.
    pub fn resolve(&self, task_type: &str, provider: &str) -> Option<&str> {
        self.0
            .get(task_type)
            .and_then(|row| row.get(provider))
            .or_else(|| {
                self.0
                    .get(DEFAULT_TASK_TYPE)
                    .and_then(|row| row.get(provider))
            })
            .map(String::as_str)
    }

    /// Every distinct model configured for a provider, sorted
    pub fn models_for(&self, provider: &str) -> Vec<String> {
        self.0
            .values()
            .filter_map(|row| row.get(provider))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every provider mentioned in any row, sorted
    pub fn providers(&self) -> Vec<String> {
        self.0
            .values()
            .flat_map(|row| row.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Default for ModelTable {
    fn default() -> Self {
        let text = [
            ("openai", "gpt-4"),
            ("anthropic", "claude-3-opus-20240229"),
            ("ollama", "llama3"),
            ("lmstudio", "openchat"),
            ("local", "gpt4all"),
        ];
        let code = [
            ("openai", "gpt-4"),
            ("anthropic", "claude-3-opus-20240229"),
            ("ollama", "codellama"),
            ("lmstudio", "openchat"),
            ("local", "gpt4all"),
        ];
        let fallback = [
            ("openai", "gpt-3.5-turbo"),
            ("anthropic", "claude-3-haiku-20240307"),
            ("ollama", "llama3"),
            ("lmstudio", "openchat"),
            ("local", "gpt4all"),
        ];

        let mut table = Self::new();
        for (task_type, row) in [
            ("text-generation", &text),
            ("code-generation", &code),
            ("decision-making", &text),
            (DEFAULT_TASK_TYPE, &fallback),
        ] {
            for (provider, model) in row.iter() {
                table.insert(task_type, *provider, *model);
            }
        }
        table
    }
}

/// Task type → provider → priority weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityTable(pub HashMap<String, HashMap<String, f64>>);

impl PriorityTable {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn with_weight(
        mut self,
        task_type: impl Into<String>,
        provider: impl Into<String>,
        weight: f64,
    ) -> Self {
        self.0
            .entry(task_type.into())
            .or_default()
            .insert(provider.into(), weight);
        self
    }

    /// Weight of `provider` for `task_type`.
    ///
    /// Unknown task types use the default row; providers absent from the row weigh 0.
    pub fn weight(&self, task_type: &str, provider: &str) -> f64 {
        self.0
            .get(task_type)
            .or_else(|| self.0.get(DEFAULT_TASK_TYPE))
            .and_then(|row| row.get(provider))
            .copied()
            .unwrap_or(0.0)
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        let rows: [(&str, [(&str, f64); 5]); 4] = [
            (
                "text-generation",
                [
                    ("anthropic", 90.0),
                    ("openai", 80.0),
                    ("ollama", 70.0),
                    ("lmstudio", 60.0),
                    ("local", 50.0),
                ],
            ),
            (
                "code-generation",
                [
                    ("openai", 90.0),
                    ("anthropic", 80.0),
                    ("ollama", 70.0),
                    ("lmstudio", 60.0),
                    ("local", 50.0),
                ],
            ),
            (
                "decision-making",
                [
                    ("openai", 90.0),
                    ("anthropic", 85.0),
                    ("ollama", 70.0),
                    ("lmstudio", 60.0),
                    ("local", 50.0),
                ],
            ),
            (
                DEFAULT_TASK_TYPE,
                [
                    ("openai", 80.0),
                    ("anthropic", 80.0),
                    ("ollama", 70.0),
                    ("lmstudio", 60.0),
                    ("local", 50.0),
                ],
            ),
        ];

        rows.into_iter()
            .fold(Self::new(), |table, (task_type, weights)| {
                weights
                    .into_iter()
                    .fold(table, |t, (provider, w)| t.with_weight(task_type, provider, w))
            })
    }
}
