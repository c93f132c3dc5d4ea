//! Trust graph — derives the person/employer/university/skill graph a profile
//! claims. Pure and deterministic: the same `Profile` always yields an equal
//! `TrustGraph`, so callers can recompute it whenever the profile changes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::profile::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Person,
    Employer,
    University,
    Skill,
}

impl NodeKind {
    fn prefix(self) -> &'static str {
        match self {
            NodeKind::Person => "person",
            NodeKind::Employer => "employer",
            NodeKind::University => "university",
            NodeKind::Skill => "skill",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    EmployedAt,
    StudiedAt,
    HasSkill,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
}

impl Node {
    fn new(kind: NodeKind, label: &str) -> Self {
        Self {
            id: node_id(kind, label),
            kind,
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub weight: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustGraph {
    pub nodes: BTreeSet<Node>,
    pub edges: BTreeSet<Edge>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub employers: usize,
    pub universities: usize,
    pub skills: usize,
    pub total_years: u32,
}

/// `<kind>:<value>`. Identity depends only on the kind and the exact value.
pub fn node_id(kind: NodeKind, value: &str) -> String {
    format!("{}:{}", kind.prefix(), value)
}

/// Builds the trust graph for `profile`.
///
/// - one `person` node for the profile name
/// - one `employer` node per distinct company (case-sensitive), linked by an
///   `employed_at` edge weighted by the summed years at that company
/// - one `university` node per distinct university, linked by a `studied_at`
///   edge weighted by the number of degrees earned there
/// - one `skill` node per skill, linked by a `has_skill` edge of weight 1
///
/// Weights saturate at `u32::MAX` rather than wrapping.
pub fn build_trust_graph(profile: &Profile) -> TrustGraph {
    let person = Node::new(NodeKind::Person, &profile.name);

    let mut years_by_company: BTreeMap<&str, u32> = BTreeMap::new();
    for exp in &profile.experience {
        let years = years_by_company.entry(exp.company.as_str()).or_default();
        *years = years.saturating_add(exp.years);
    }

    let mut degrees_by_university: BTreeMap<&str, u32> = BTreeMap::new();
    for edu in &profile.education {
        let count = degrees_by_university
            .entry(edu.university.as_str())
            .or_default();
        *count = count.saturating_add(1);
    }

    let mut graph = TrustGraph::default();

    let linked = years_by_company
        .into_iter()
        .map(|(company, years)| (NodeKind::Employer, EdgeKind::EmployedAt, company, years))
        .chain(
            degrees_by_university
                .into_iter()
                .map(|(uni, count)| (NodeKind::University, EdgeKind::StudiedAt, uni, count)),
        )
        .chain(
            profile
                .skills
                .iter()
                .map(|skill| (NodeKind::Skill, EdgeKind::HasSkill, skill.as_str(), 1)),
        );

    for (node_kind, edge_kind, value, weight) in linked {
        let node = Node::new(node_kind, value);
        graph.edges.insert(Edge {
            from: person.id.clone(),
            to: node.id.clone(),
            kind: edge_kind,
            weight,
        });
        graph.nodes.insert(node);
    }
    graph.nodes.insert(person);

    graph
}

impl TrustGraph {
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            employers: self.nodes_of(NodeKind::Employer).count(),
            universities: self.nodes_of(NodeKind::University).count(),
            skills: self.nodes_of(NodeKind::Skill).count(),
            total_years: self
                .edges
                .iter()
                .filter(|e| e.kind == EdgeKind::EmployedAt)
                .fold(0u32, |total, e| total.saturating_add(e.weight)),
        }
    }
}
