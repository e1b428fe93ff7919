//! Reachability graph of a dialog, for documentation and review tooling

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::registry::HandlerRegistry;
use crate::error::DialogResult;
use crate::handlers::{HandlerKind, TransitionTrigger};

/// An edge between two handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub from: String,
    pub to: String,
    pub trigger: TransitionTrigger,
}

/// Handlers reachable from a start handler and the edges between them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub nodes: BTreeMap<String, HandlerKind>,
    pub edges: Vec<WorkflowEdge>,
}

impl Workflow {
    /// Edges leaving `name`
    pub fn edges_from<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a WorkflowEdge> {
        self.edges.iter().filter(move |edge| edge.from == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }
}

impl HandlerRegistry {
    /// Walk declared transitions breadth-first from `start`.
    ///
    /// Each handler is expanded once, so cycles terminate. Edges to
    /// unregistered handlers are kept but their targets get no node.
    pub fn workflow(&self, start: &str) -> DialogResult<Workflow> {
        self.resolve(start)?;

        let mut workflow = Workflow::default();
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([start.to_string()]);
        seen.insert(start.to_string());

        while let Some(name) = queue.pop_front() {
            let Ok(handler) = self.resolve(&name) else {
                continue;
            };
            workflow.nodes.insert(name.clone(), handler.kind());

            for transition in handler.transitions() {
                if seen.insert(transition.target.clone()) {
                    queue.push_back(transition.target.clone());
                }
                workflow.edges.push(WorkflowEdge {
                    from: name.clone(),
                    to: transition.target,
                    trigger: transition.trigger,
                });
            }
        }

        Ok(workflow)
    }
}
