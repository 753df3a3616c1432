//! Befahrbare Wege: Folge von Kantenenden mit Beschnitt an Anfang und Ende.

use std::slice::Iter;

use crate::core::edge::End;
use crate::core::graph::Graph;
use crate::core::segment;
use crate::shared::Pose;

/// Route durch den Graphen.
///
/// Jedes Ende bezeichnet die Stelle, an der der Weg die Kante betritt; die
/// Kante wird von dort zum anderen Ende befahren.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub ends: Vec<End>,
    /// Beschnitt am Anfang (Längeneinheiten)
    pub start_offset: f64,
    /// Beschnitt am Ende (Längeneinheiten)
    pub end_offset: f64,
}

impl Path {
    pub fn new(ends: Vec<End>) -> Self {
        Self {
            ends,
            start_offset: 0.0,
            end_offset: 0.0,
        }
    }

    /// Setzt beide Beschnitte
    pub fn with_offsets(mut self, start_offset: f64, end_offset: f64) -> Self {
        self.start_offset = start_offset;
        self.end_offset = end_offset;
        self
    }

    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, End> {
        self.ends.iter()
    }

    pub fn first(&self) -> Option<End> {
        self.ends.first().copied()
    }

    pub fn last(&self) -> Option<End> {
        self.ends.last().copied()
    }

    /// Befahrbare Länge: Summe der Kantenlängen abzüglich der Beschnitte.
    pub fn length(&self, graph: &Graph) -> f64 {
        self.ends
            .iter()
            .map(|end| graph.edge_length(end.edge))
            .sum::<f64>()
            - self.start_offset
            - self.end_offset
    }

    /// Kehrt die Fahrtrichtung um; die Beschnitte tauschen die Seiten.
    pub fn reverse(&mut self) {
        self.ends.reverse();
        for end in self.ends.iter_mut() {
            *end = end.other_end();
        }
        std::mem::swap(&mut self.start_offset, &mut self.end_offset);
    }

    /// Umgekehrte Kopie
    pub fn reversed(&self) -> Self {
        let mut path = self.clone();
        path.reverse();
        path
    }

    /// Weglokal → global.
    ///
    /// `x` ist der Weg ab `offset`; `offset = None` nimmt den Weg `s` des
    /// ersten Knotens. Vor dem Anfang wird nur bei `extend_before`, hinter dem
    /// Ende nur bei `extend_after` extrapoliert.
    pub fn to_global(
        &self,
        graph: &Graph,
        local: Pose,
        offset: Option<f64>,
        extend_before: bool,
        extend_after: bool,
    ) -> Option<Pose> {
        let mut offset = self.base_offset(graph, offset)?;
        let last = self.ends.len().saturating_sub(1);
        for (idx, end) in self.ends.iter().enumerate() {
            let geometry = graph.end_geometry(*end);
            let transformed = segment::chain_to_global(
                &geometry,
                local,
                offset,
                extend_before && idx == 0,
                extend_after && idx == last,
            );
            if transformed.is_some() {
                return transformed;
            }
            offset += segment::chain_length(&geometry);
        }
        None
    }

    /// Global → weglokal, Parameter wie bei [`Path::to_global`].
    pub fn to_local(
        &self,
        graph: &Graph,
        global: Pose,
        offset: Option<f64>,
        extend_before: bool,
        extend_after: bool,
    ) -> Option<Pose> {
        let mut offset = self.base_offset(graph, offset)?;
        let last = self.ends.len().saturating_sub(1);
        for (idx, end) in self.ends.iter().enumerate() {
            let geometry = graph.end_geometry(*end);
            let transformed = segment::chain_to_local(
                &geometry,
                global,
                offset,
                extend_before && idx == 0,
                extend_after && idx == last,
            );
            if transformed.is_some() {
                return transformed;
            }
            offset += segment::chain_length(&geometry);
        }
        None
    }

    fn base_offset(&self, graph: &Graph, offset: Option<f64>) -> Option<f64> {
        let first = self.first()?;
        let offset = offset.unwrap_or_else(|| graph[graph.end_node(first)].s);
        Some(offset - self.start_offset)
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a End;
    type IntoIter = Iter<'a, End>;

    fn into_iter(self) -> Self::IntoIter {
        self.ends.iter()
    }
}

impl FromIterator<End> for Path {
    fn from_iter<I: IntoIterator<Item = End>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
