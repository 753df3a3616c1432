//! JSON-Export des Graphen (Knoten, Kanten mit Segmenten, Szenerie).

use serde_json::{json, Value};

use super::Graph;
use crate::core::ids::SceneryId;

impl Graph {
    /// Serialisiert den Graphen als eingerücktes JSON.
    ///
    /// Kanten verweisen über die Position in der Knotenliste auf ihre Knoten.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let nodes: Vec<Value> = self
            .nodes()
            .map(|(_, node)| {
                json!({
                    "x": node.pose.pos.x,
                    "y": node.pose.pos.y,
                    "direction": node.pose.direction,
                    "s": node.s,
                    "label": node.label,
                })
            })
            .collect();

        let edges: Vec<Value> = self
            .edges()
            .map(|(_, edge)| {
                let segments: Vec<Value> = edge
                    .segments
                    .iter()
                    .map(|segment| {
                        json!({
                            "length": segment.length,
                            "radius": segment.radius,
                        })
                    })
                    .collect();
                json!({
                    "source": self.node_position(edge.source),
                    "target": self.node_position(edge.target),
                    "segments": segments,
                    "scenery_objects": self.scenery_json(edge.scenery()),
                })
            })
            .collect();

        serde_json::to_string_pretty(&json!({
            "nodes": nodes,
            "edges": edges,
            "scenery_objects": self.scenery_json(self.graph_scenery()),
        }))
    }

    fn scenery_json(&self, ids: &[SceneryId]) -> Vec<Value> {
        ids.iter()
            .map(|id| {
                let object = &self[*id];
                json!({
                    "x": object.pose.pos.x,
                    "y": object.pose.pos.y,
                    "direction": object.pose.direction,
                    "kind": object.kind,
                    "name": object.name,
                    "render": object.render,
                    "attrs": object.attrs,
                })
            })
            .collect()
    }
}
