//! Marketing-action configuration.
//!
//! The score → action mapping is injectable configuration, not hardcoded
//! policy: new scores are added by editing the table, never by touching
//! classification logic. A built-in table carries the four reference RFV
//! actions; `load` accepts a custom table from JSON.

use serde::Deserialize;
use std::collections::HashMap;

/// Action assigned to every score the table does not name.
pub const NO_ACTION_DEFINED: &str = "no recommended action";

/// Fixed mapping from 3-character RFV score to a recommendation string.
/// Loaded once per run, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ActionTable {
    actions:  HashMap<String, String>,
    fallback: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ActionEntry {
    score:  String,
    action: String,
}

/// File shape for a custom action table:
/// `{ "actions": [ { "score": "AAA", "action": "..." }, ... ] }`
#[derive(Debug, Clone, Deserialize)]
struct ActionTableFile {
    actions: Vec<ActionEntry>,
    #[serde(default)]
    fallback: Option<String>,
}

impl ActionTable {
    /// Table from an explicit mapping, with the standard sentinel for
    /// unmapped scores.
    pub fn new(actions: HashMap<String, String>) -> Self {
        Self {
            actions,
            fallback: NO_ACTION_DEFINED.to_string(),
        }
    }

    /// The reference table: the four classic RFV marketing actions.
    /// Everything else intentionally falls through to the sentinel.
    pub fn builtin() -> Self {
        let actions = [
            (
                "AAA".to_string(),
                "send discount coupons, ask for a referral, ship free samples of new products"
                    .to_string(),
            ),
            (
                "DDD".to_string(),
                "churned: spent little and bought rarely, take no action".to_string(),
            ),
            (
                "DAA".to_string(),
                "churned: spent heavily and bought often, send discount coupons to win them back"
                    .to_string(),
            ),
            (
                "CAA".to_string(),
                "churned: spent heavily and bought often, send discount coupons to win them back"
                    .to_string(),
            ),
        ]
        .into();
        Self::new(actions)
    }

    /// Load a custom table from a JSON file.
    ///
    /// Every score key must be exactly 3 characters from A–D; duplicates
    /// are rejected. An optional `fallback` field overrides the sentinel.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: ActionTableFile = serde_json::from_str(&content)?;

        let mut actions = HashMap::with_capacity(file.actions.len());
        for entry in file.actions {
            validate_score_key(&entry.score)?;
            if actions.insert(entry.score.clone(), entry.action).is_some() {
                anyhow::bail!("duplicate score '{}' in {path}", entry.score);
            }
        }

        Ok(Self {
            actions,
            fallback: file.fallback.unwrap_or_else(|| NO_ACTION_DEFINED.to_string()),
        })
    }

    /// Recommended action for a score; the sentinel when unmapped.
    pub fn action_for(&self, score: &str) -> &str {
        self.actions
            .get(score)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    /// The sentinel handed to unmapped scores.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Number of explicitly mapped scores.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn validate_score_key(score: &str) -> anyhow::Result<()> {
    let well_formed = score.len() == 3 && score.chars().all(|c| matches!(c, 'A'..='D'));
    if !well_formed {
        anyhow::bail!("invalid score key '{score}': expected exactly 3 characters from A-D");
    }
    Ok(())
}
