//! Deklarative Routenpläne (TOML) → Gleisgraph plus Pfad-Anforderungen.
//!
//! Ein Plan beschreibt Gleise als Folge von Bauschritten ab einer Startpose
//! oder ab einer Marke eines früheren Gleises, dazu Szenerie-Objekte und
//! die zu schreibenden Pfade.

use std::collections::HashMap;
use std::path::Path as FsPath;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{
    find_shortest_path, End, Graph, NodeId, Path, SceneryAttrs, SceneryKind, SceneryObject,
    SpatialIndex,
};
use crate::error::{RouteError, RouteResult};
use crate::shared::{Pose, Vector};

/// Kompletter Routenplan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutePlan {
    /// Überschreibt die Ursprungskachel der Writer-Optionen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_tile: Option<(i32, i32)>,
    /// Richtungen auflösen, Durchgangsknoten entfernen, Kanten ausrichten
    #[serde(default)]
    pub finalize: bool,
    #[serde(default)]
    pub tracks: Vec<TrackPlan>,
    #[serde(default)]
    pub scenery: Vec<SceneryPlan>,
    #[serde(default)]
    pub paths: Vec<PathPlan>,
}

/// Pose in Plan-Koordinaten (Richtung in Radiant)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanPose {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub direction: f64,
}

impl From<PlanPose> for Pose {
    fn from(pose: PlanPose) -> Self {
        Pose::new(Vector::new(pose.x, pose.y), pose.direction)
    }
}

/// Ein Gleiszug: Start (Pose oder Marke) und Bauschritte.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackPlan {
    /// Neuer Startknoten
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<PlanPose>,
    /// Weiterbauen ab einer bestehenden Marke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Marke für den Startknoten
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub steps: Vec<TrackStep>,
}

/// Ein Bauschritt: Gerade (`radius = 0`) oder Bogen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackStep {
    pub length: f64,
    #[serde(default)]
    pub radius: f64,
    /// Am Gleisende die bestehende Kante verlängern statt neu anzusetzen
    #[serde(default = "default_true")]
    pub extend: bool,
    /// Nur ab Startknoten: entgegen der Knotenrichtung bauen
    #[serde(default)]
    pub backward: bool,
    /// Marke für das erreichte Kantenende
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Szenerie-Objekt an einer Kante (über eine Marke) oder global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneryPlan {
    /// Marke eines Kantenendes; ohne Marke ist die Pose global
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub pose: PlanPose,
    #[serde(default)]
    pub kind: SceneryKind,
    #[serde(default = "default_true")]
    pub render: bool,
    #[serde(flatten)]
    pub attrs: SceneryAttrs,
}

/// Punkt eines Pfads: Marke oder Koordinate (wird auf den nächsten Knoten gezogen).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanPoint {
    Label(String),
    Position([f64; 2]),
}

/// Anforderung einer Pfad-Datei.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPlan {
    /// Dateiname ohne `.pat`
    pub file: String,
    pub name: String,
    #[serde(default = "default_start_name")]
    pub start_name: String,
    #[serde(default = "default_end_name")]
    pub end_name: String,
    pub from: PlanPoint,
    pub to: PlanPoint,
}

fn default_start_name() -> String {
    "start".to_string()
}

fn default_end_name() -> String {
    "end".to_string()
}

/// Gebauter Graph mit den gesuchten Pfaden.
#[derive(Debug, Clone)]
pub struct BuiltRoute {
    pub graph: Graph,
    pub paths: Vec<PathRequest>,
}

/// Ein gesuchter Pfad samt Dateiangaben.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRequest {
    pub file: String,
    pub name: String,
    pub start_name: String,
    pub end_name: String,
    pub path: Path,
}

/// Worauf eine Marke zeigt
#[derive(Debug, Clone, Copy)]
enum Anchor {
    Node(NodeId),
    End(End),
}

impl RoutePlan {
    /// Lädt einen Plan aus einer TOML-Datei.
    pub fn load_from_file(path: &FsPath) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Plan nicht lesbar: {}", path.display()))?;
        let plan = Self::from_toml_str(&content)
            .with_context(|| format!("Plan fehlerhaft: {}", path.display()))?;
        log::info!(
            "Plan geladen aus {}: {} Gleise, {} Objekte, {} Pfade",
            path.display(),
            plan.tracks.len(),
            plan.scenery.len(),
            plan.paths.len()
        );
        Ok(plan)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Baut den Graphen und sucht alle Pfade.
    ///
    /// Marken werden für Pfade über ihre Position aufgelöst, damit sie auch
    /// nach dem Zusammenfassen von Kanten gültig bleiben.
    pub fn build(&self) -> RouteResult<BuiltRoute> {
        let mut graph = Graph::new();
        graph.attrs.origin_tile = self.origin_tile;
        let mut anchors: HashMap<String, Anchor> = HashMap::new();

        for (number, track) in self.tracks.iter().enumerate() {
            let mut anchor = match (&track.start, &track.from) {
                (Some(start), None) => {
                    let node = match &track.label {
                        Some(label) => graph.add_labeled_node((*start).into(), label.clone()),
                        None => graph.add_node((*start).into()),
                    };
                    if let Some(label) = &track.label {
                        anchors.insert(label.clone(), Anchor::Node(node));
                    }
                    Anchor::Node(node)
                }
                (None, Some(from)) => lookup(&anchors, from)?,
                _ => {
                    return Err(RouteError::Configuration(format!(
                        "Gleis {}: genau eines von 'start' und 'from' angeben",
                        number + 1
                    )))
                }
            };

            for step in &track.steps {
                let end = match anchor {
                    Anchor::Node(node) => {
                        graph.add_edge_at_node(node, step.length, step.radius, step.backward)
                    }
                    Anchor::End(end) => {
                        graph.add_edge_at_end(end, step.length, step.radius, step.extend)?
                    }
                };
                anchor = Anchor::End(end);
                if let Some(label) = &step.label {
                    anchors.insert(label.clone(), anchor);
                }
            }
        }

        for object in &self.scenery {
            let mut scenery = SceneryObject::new(object.pose.into(), object.kind)
                .with_attrs(object.attrs.clone());
            scenery.name = object.name.clone();
            scenery.render = object.render;
            match &object.at {
                Some(label) => {
                    let Anchor::End(end) = lookup(&anchors, label)? else {
                        return Err(RouteError::Configuration(format!(
                            "Marke '{}' bezeichnet kein Kantenende",
                            label
                        )));
                    };
                    graph.attach_to_edge(end.edge, scenery);
                }
                None => {
                    graph.attach_to_graph(scenery);
                }
            }
        }

        let positions: HashMap<&str, Vector> = anchors
            .iter()
            .map(|(label, anchor)| {
                let node = match anchor {
                    Anchor::Node(node) => *node,
                    Anchor::End(end) => graph.end_node(*end),
                };
                (label.as_str(), graph[node].pose.pos)
            })
            .collect();

        if self.finalize {
            let splits = graph.set_directions();
            let contracted = graph.contract_edges();
            graph.make_directed();
            log::debug!(
                "Plan finalisiert: {} Knoten geteilt, {} Elemente zusammengefasst",
                splits.len(),
                contracted.len()
            );
        }
        graph.check()?;

        let index = SpatialIndex::from_graph(&graph);
        let mut paths = Vec::with_capacity(self.paths.len());
        for request in &self.paths {
            let from = resolve_point(&request.from, &positions, &index)?;
            let to = resolve_point(&request.to, &positions, &index)?;
            let path = find_shortest_path(&graph, from, to);
            if path.is_empty() {
                log::warn!("Pfad '{}': kein Weg von {} nach {}", request.name, from, to);
            }
            paths.push(PathRequest {
                file: request.file.clone(),
                name: request.name.clone(),
                start_name: request.start_name.clone(),
                end_name: request.end_name.clone(),
                path,
            });
        }

        Ok(BuiltRoute { graph, paths })
    }
}

fn lookup(anchors: &HashMap<String, Anchor>, label: &str) -> RouteResult<Anchor> {
    anchors
        .get(label)
        .copied()
        .ok_or_else(|| RouteError::Configuration(format!("Unbekannte Marke '{}'", label)))
}

fn resolve_point(
    point: &PlanPoint,
    positions: &HashMap<&str, Vector>,
    index: &SpatialIndex,
) -> RouteResult<NodeId> {
    let pos = match point {
        PlanPoint::Label(label) => *positions.get(label.as_str()).ok_or_else(|| {
            RouteError::Configuration(format!("Unbekannte Marke '{}'", label))
        })?,
        PlanPoint::Position([x, y]) => Vector::new(*x, *y),
    };
    index
        .nearest(pos)
        .map(|found| found.node)
        .ok_or_else(|| RouteError::Configuration("Plan ohne Knoten".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SWITCH_PLAN: &str = r#"
[[tracks]]
start = { x = -1000.0, y = 0.0 }
label = "start"
steps = [
    { length = 300.0, label = "dispatch" },
    { length = 600.0, extend = false, label = "end" },
]

[[tracks]]
from = "dispatch"
steps = [
    { length = 100.0, radius = 1000.0, extend = false },
    { length = 100.0 },
    { length = 100.0, radius = -1000.0 },
    { length = 500.0, label = "end2" },
]

[[paths]]
file = "0"
name = "main"
from = "start"
to = "end"

[[paths]]
file = "1"
name = "start_to_end2"
from = "start"
to = "end2"
"#;

    #[test]
    fn switch_plan_builds_one_junction() {
        let plan = RoutePlan::from_toml_str(SWITCH_PLAN).expect("gültiger Plan");
        let route = plan.build().expect("Plan baubar");
        let graph = &route.graph;

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        let degrees: Vec<usize> = graph.nodes().map(|(_, n)| n.degree()).collect();
        assert_eq!(degrees.iter().filter(|d| **d == 3).count(), 1);

        assert_eq!(route.paths.len(), 2);
        assert_abs_diff_eq!(route.paths[0].path.length(graph), 900.0, epsilon = 1e-6);
        assert_eq!(route.paths[1].path.len(), 2);
        assert_eq!(route.paths[0].start_name, "start");
    }

    #[test]
    fn coordinates_snap_to_nearest_node() {
        let plan = RoutePlan::from_toml_str(
            r#"
[[tracks]]
start = { x = 0.0, y = 0.0 }
steps = [{ length = 1200.0 }]

[[paths]]
file = "0"
name = "main"
from = [3.0, -2.0]
to = [1190.0, 5.0]
"#,
        )
        .expect("gültiger Plan");
        let route = plan.build().expect("Plan baubar");

        assert_eq!(route.paths[0].path.len(), 1);
        assert_abs_diff_eq!(route.paths[0].path.length(&route.graph), 1200.0, epsilon = 1e-9);
    }

    #[test]
    fn scenery_attaches_to_labelled_edge() {
        let plan = RoutePlan::from_toml_str(
            r#"
[[tracks]]
start = { x = -1000.0, y = 0.0 }
steps = [{ length = 2000.0, label = "end" }]

[[scenery]]
at = "end"
name = "tree"
pose = { x = 400.0, y = 4.0, direction = 1.5707963267948966 }
shapefile = "tree.s"
animated = true
"#,
        )
        .expect("gültiger Plan");
        let route = plan.build().expect("Plan baubar");
        let graph = &route.graph;

        let (edge_id, edge) = graph.edges().next().expect("eine Kante");
        assert_eq!(edge.scenery().len(), 1);
        let tree = &graph[edge.scenery()[0]];
        assert!(tree.attrs.animated);
        assert_eq!(tree.attrs.shapefile.as_deref(), Some("tree.s"));

        let global = graph.scenery_global_pose(edge.scenery()[0]);
        assert_abs_diff_eq!(global.pos.x, -600.0, epsilon = 1e-9);
        assert_abs_diff_eq!(global.pos.y, 4.0, epsilon = 1e-9);
        assert!(graph.edge(edge_id).is_some());
    }

    #[test]
    fn unknown_label_is_configuration_error() {
        let plan = RoutePlan::from_toml_str(
            r#"
[[tracks]]
from = "nirgendwo"
steps = [{ length = 10.0 }]
"#,
        )
        .expect("gültiger Plan");

        assert!(matches!(plan.build(), Err(RouteError::Configuration(_))));
    }

    #[test]
    fn track_needs_exactly_one_start() {
        let plan = RoutePlan {
            tracks: vec![TrackPlan::default()],
            ..RoutePlan::default()
        };
        assert!(matches!(plan.build(), Err(RouteError::Configuration(_))));
    }

    #[test]
    fn finalize_contracts_passthrough_nodes() {
        let plan = RoutePlan::from_toml_str(
            r#"
finalize = true

[[tracks]]
start = { x = 0.0, y = 0.0 }
steps = [
    { length = 100.0 },
    { length = 100.0, extend = false },
]
"#,
        )
        .expect("gültiger Plan");
        let route = plan.build().expect("Plan baubar");

        assert_eq!(route.graph.node_count(), 2);
        assert_eq!(route.graph.edge_count(), 1);
        let (id, _) = route.graph.edges().next().expect("eine Kante");
        assert_abs_diff_eq!(route.graph.edge_length(id), 200.0, epsilon = 1e-9);
    }
}
