//! Monopartite projection over a shared bridge node
//!
//! Two members are linked when both reach the same bridge node through the
//! rule's legs, i.e. the pattern `(x1)-leg1-(bridge)-leg2-(x2)`. Each
//! unordered pair is written once, from the smaller natural key to the larger.

use crate::error::PipelineResult;
use crate::graph::{
    EdgeType, GraphBackend, Label, NodeKey, NodeRef, PropertyMap, PropertyValue, UpsertOutcome,
};
use crate::schema::{edge_types, labels};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound::{Excluded, Unbounded};
use tracing::{debug, info};

/// Direction of a leg, seen from the member node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// member -> bridge
    Outgoing,
    /// bridge -> member
    Incoming,
}

/// One hop between a member and the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub edge_type: EdgeType,
    pub direction: Direction,
}

impl Leg {
    pub fn new(edge_type: impl Into<EdgeType>, direction: Direction) -> Self {
        Self {
            edge_type: edge_type.into(),
            direction,
        }
    }
}

/// Describes one derived relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionRule {
    pub name: String,
    pub member_label: Label,
    pub bridge_label: Label,
    pub legs: (Leg, Leg),
    pub derived_type: EdgeType,
    /// When set, the number of shared bridges is written under this name
    pub weight_property: Option<String>,
}

impl ProjectionRule {
    /// Salespeople assigned to the same region
    pub fn works_with() -> Self {
        Self {
            name: "works_with".to_string(),
            member_label: Label::new(labels::PERSON),
            bridge_label: Label::new(labels::REGION),
            legs: (
                Leg::new(edge_types::ASSIGNED_TO, Direction::Outgoing),
                Leg::new(edge_types::ASSIGNED_TO, Direction::Outgoing),
            ),
            derived_type: EdgeType::new(edge_types::WORKS_WITH),
            weight_property: None,
        }
    }

    /// Products sold by the same reseller
    pub fn commonly_sold_by() -> Self {
        Self {
            name: "commonly_sold_by".to_string(),
            member_label: Label::new(labels::PRODUCT),
            bridge_label: Label::new(labels::RESELLER),
            legs: (
                Leg::new(edge_types::SOLD, Direction::Incoming),
                Leg::new(edge_types::SOLD, Direction::Incoming),
            ),
            derived_type: EdgeType::new(edge_types::COMMONLY_SOLD_BY),
            weight_property: Some("weight".to_string()),
        }
    }

    /// Rules run by the pipeline, in order
    pub fn builtin() -> Vec<Self> {
        vec![Self::works_with(), Self::commonly_sold_by()]
    }
}

/// Counts from one projection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectionStats {
    pub rule: String,
    /// Bridges reached by at least one member on each leg
    pub bridges: usize,
    /// Distinct member pairs
    pub pairs: usize,
    pub created: usize,
    pub merged: usize,
}

pub struct MonopartiteProjector<'a, B: GraphBackend + ?Sized> {
    backend: &'a mut B,
}

impl<'a, B: GraphBackend + ?Sized> MonopartiteProjector<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self { backend }
    }

    /// Members of each bridge reached through `leg`
    fn members_by_bridge(
        &self,
        rule: &ProjectionRule,
        leg: &Leg,
    ) -> PipelineResult<BTreeMap<NodeKey, BTreeSet<NodeKey>>> {
        let hops = match leg.direction {
            Direction::Outgoing => {
                self.backend
                    .match_hop(&rule.member_label, &leg.edge_type, &rule.bridge_label)?
            }
            Direction::Incoming => self
                .backend
                .match_hop(&rule.bridge_label, &leg.edge_type, &rule.member_label)?
                .into_iter()
                .map(|(bridge, member)| (member, bridge))
                .collect(),
        };

        let mut groups: BTreeMap<NodeKey, BTreeSet<NodeKey>> = BTreeMap::new();
        for (member, bridge) in hops {
            groups.entry(bridge).or_default().insert(member);
        }
        Ok(groups)
    }

    /// Shared bridge count per ordered member pair
    fn shared_bridges(
        &self,
        rule: &ProjectionRule,
    ) -> PipelineResult<(usize, BTreeMap<(NodeKey, NodeKey), u64>)> {
        let first = self.members_by_bridge(rule, &rule.legs.0)?;
        let second = self.members_by_bridge(rule, &rule.legs.1)?;

        let mut bridges = 0;
        let mut counts: BTreeMap<(NodeKey, NodeKey), u64> = BTreeMap::new();
        for (bridge, left) in &first {
            let Some(right) = second.get(bridge) else {
                continue;
            };
            bridges += 1;
            for x1 in left {
                for x2 in right.range((Excluded(x1), Unbounded)) {
                    *counts.entry((x1.clone(), x2.clone())).or_default() += 1;
                }
            }
        }
        Ok((bridges, counts))
    }

    pub fn project(&mut self, rule: &ProjectionRule) -> PipelineResult<ProjectionStats> {
        let (bridges, counts) = self.shared_bridges(rule)?;
        debug!("{}: {} bridges, {} candidate pairs", rule.name, bridges, counts.len());

        let mut stats = ProjectionStats {
            rule: rule.name.clone(),
            bridges,
            pairs: counts.len(),
            ..ProjectionStats::default()
        };

        for ((x1, x2), shared) in &counts {
            let mut properties = PropertyMap::new();
            if let Some(name) = &rule.weight_property {
                properties.insert(name.clone(), PropertyValue::Float(*shared as f64));
            }
            let outcome = self.backend.upsert_edge(
                &rule.derived_type,
                NodeRef::new(&rule.member_label, x1),
                NodeRef::new(&rule.member_label, x2),
                properties,
            )?;
            match outcome {
                UpsertOutcome::Created => stats.created += 1,
                UpsertOutcome::Merged => stats.merged += 1,
            }
        }

        info!(
            "Projected {} {} edges over {} bridges ({} created)",
            stats.pairs, rule.derived_type, stats.bridges, stats.created
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphStore;

    fn node(store: &mut GraphStore, label: &str, key: i64) {
        store.upsert_node(label, NodeKey::Int(key), PropertyMap::new());
    }

    fn edge(store: &mut GraphStore, edge_type: &str, from: (&str, i64), to: (&str, i64)) {
        let source = store.node_id(&Label::new(from.0), &NodeKey::Int(from.1)).unwrap();
        let target = store.node_id(&Label::new(to.0), &NodeKey::Int(to.1)).unwrap();
        store.upsert_edge(source, target, edge_type, PropertyMap::new()).unwrap();
    }

    fn derived_pairs(store: &GraphStore, edge_type: &str) -> Vec<(NodeKey, NodeKey)> {
        let mut pairs: Vec<_> = store
            .get_edges_by_type(&EdgeType::new(edge_type))
            .into_iter()
            .map(|e| {
                let s = store.get_node(e.source).unwrap();
                let t = store.get_node(e.target).unwrap();
                (s.key.clone(), t.key.clone())
            })
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_three_people_one_region() {
        let mut store = GraphStore::new();
        node(&mut store, "Region", 10);
        for person in [3, 1, 2] {
            node(&mut store, "Person", person);
            edge(&mut store, "ASSIGNED_TO", ("Person", person), ("Region", 10));
        }

        let stats = MonopartiteProjector::new(&mut store)
            .project(&ProjectionRule::works_with())
            .unwrap();

        assert_eq!(stats.pairs, 3);
        assert_eq!(
            derived_pairs(&store, "WORKS_WITH"),
            vec![
                (NodeKey::Int(1), NodeKey::Int(2)),
                (NodeKey::Int(1), NodeKey::Int(3)),
                (NodeKey::Int(2), NodeKey::Int(3)),
            ]
        );
        // Unweighted rule writes no attributes
        assert!(store
            .get_edges_by_type(&EdgeType::new("WORKS_WITH"))
            .iter()
            .all(|e| e.properties.is_empty()));
    }

    #[test]
    fn test_products_sharing_resellers() {
        // R1 sells {A, B}; R2 sells {B, C}
        let mut store = GraphStore::new();
        for reseller in [1, 2] {
            node(&mut store, "Reseller", reseller);
        }
        for product in [100, 200, 300] {
            node(&mut store, "Product", product);
        }
        for (reseller, product) in [(1, 100), (1, 200), (2, 200), (2, 300)] {
            edge(&mut store, "SOLD", ("Reseller", reseller), ("Product", product));
        }

        MonopartiteProjector::new(&mut store)
            .project(&ProjectionRule::commonly_sold_by())
            .unwrap();

        assert_eq!(
            derived_pairs(&store, "COMMONLY_SOLD_BY"),
            vec![(NodeKey::Int(100), NodeKey::Int(200)), (NodeKey::Int(200), NodeKey::Int(300))]
        );
    }

    #[test]
    fn test_weight_counts_shared_bridges_once_per_pair() {
        let mut store = GraphStore::new();
        for reseller in [1, 2, 3] {
            node(&mut store, "Reseller", reseller);
            node(&mut store, "Product", 100);
            node(&mut store, "Product", 200);
            edge(&mut store, "SOLD", ("Reseller", reseller), ("Product", 100));
            edge(&mut store, "SOLD", ("Reseller", reseller), ("Product", 200));
        }

        let stats = MonopartiteProjector::new(&mut store)
            .project(&ProjectionRule::commonly_sold_by())
            .unwrap();
        assert_eq!(stats.bridges, 3);
        assert_eq!(stats.created, 1);

        let edges = store.get_edges_by_type(&EdgeType::new("COMMONLY_SOLD_BY"));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].get_property("weight"), Some(&PropertyValue::Float(3.0)));
    }

    #[test]
    fn test_no_shared_bridge_no_edge() {
        let mut store = GraphStore::new();
        for (person, region) in [(1, 10), (2, 20)] {
            node(&mut store, "Person", person);
            node(&mut store, "Region", region);
            edge(&mut store, "ASSIGNED_TO", ("Person", person), ("Region", region));
        }
        node(&mut store, "Person", 3);

        let stats = MonopartiteProjector::new(&mut store)
            .project(&ProjectionRule::works_with())
            .unwrap();
        assert_eq!(stats.pairs, 0);
        assert_eq!(store.edge_type_count(&EdgeType::new("WORKS_WITH")), 0);
    }

    #[test]
    fn test_self_loops_never_pair_a_node_with_itself() {
        let mut store = GraphStore::new();
        for person in [1, 2, 3] {
            node(&mut store, "Person", person);
        }
        edge(&mut store, "KNOWS", ("Person", 1), ("Person", 1));
        edge(&mut store, "KNOWS", ("Person", 2), ("Person", 2));

        let rule = ProjectionRule {
            name: "knows_same".to_string(),
            member_label: Label::new("Person"),
            bridge_label: Label::new("Person"),
            legs: (
                Leg::new("KNOWS", Direction::Outgoing),
                Leg::new("KNOWS", Direction::Outgoing),
            ),
            derived_type: EdgeType::new("KNOWS_SAME"),
            weight_property: None,
        };
        let stats = MonopartiteProjector::new(&mut store).project(&rule).unwrap();
        assert_eq!(stats.pairs, 0);
        assert_eq!(store.edge_type_count(&EdgeType::new("KNOWS_SAME")), 0);

        // A real second member on a looped bridge still pairs, once
        edge(&mut store, "KNOWS", ("Person", 3), ("Person", 1));
        let stats = MonopartiteProjector::new(&mut store).project(&rule).unwrap();
        assert_eq!(stats.pairs, 1);
        assert_eq!(
            derived_pairs(&store, "KNOWS_SAME"),
            vec![(NodeKey::Int(1), NodeKey::Int(3))]
        );
    }

    #[test]
    fn test_rerun_merges() {
        let mut store = GraphStore::new();
        node(&mut store, "Region", 10);
        for person in [1, 2] {
            node(&mut store, "Person", person);
            edge(&mut store, "ASSIGNED_TO", ("Person", person), ("Region", 10));
        }
        let rule = ProjectionRule::works_with();
        MonopartiteProjector::new(&mut store).project(&rule).unwrap();
        let second = MonopartiteProjector::new(&mut store).project(&rule).unwrap();

        assert_eq!(second.created, 0);
        assert_eq!(second.merged, 1);
        assert_eq!(store.edge_type_count(&EdgeType::new("WORKS_WITH")), 1);
    }
}
