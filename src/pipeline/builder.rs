use std::collections::BTreeMap;

use crate::foundation::error::{DarkroomError, DarkroomResult};
use crate::pipeline::graph::{Pipeline, Primary, ResolvedExtra, ResolvedSource, WindowSlot};
use crate::window::model::{Window, WindowSource};

/// Assembles windows into a [`Pipeline`].
///
/// All structural validation happens in [`PipelineBuilder::build`]:
/// identifier uniqueness, reference resolution and cycle detection.
/// Topology is frozen from that point on.
pub struct PipelineBuilder {
    windows: Vec<Window>,
}

impl PipelineBuilder {
    /// Start with no windows.
    pub fn new() -> Self {
        Self {
            windows: Vec::new(),
        }
    }

    /// Append a window. Windows without an explicit id are named `step-N`
    /// in declaration order, counting per builder so independent pipelines
    /// never share naming state.
    pub fn window(mut self, window: Window) -> Self {
        self.windows.push(window);
        self
    }

    /// Resolve references, derive the dependency graph and produce a
    /// [`Pipeline`] with every transform marked dirty.
    ///
    /// Fails with [`DarkroomError::UnresolvedReference`] when an extra-input
    /// edge or window source names a transform or window that does not
    /// exist, and with [`DarkroomError::CyclicPipeline`] when the derived
    /// graph has a cycle.
    pub fn build(self) -> DarkroomResult<Pipeline> {
        if self.windows.is_empty() {
            return Err(DarkroomError::validation(
                "pipeline must contain at least one window",
            ));
        }

        // Window ids and the transform arena.
        let mut nodes = Vec::new();
        let mut node_ids = BTreeMap::new();
        let mut windows = Vec::new();
        let mut window_ids = BTreeMap::new();
        let mut raw_sources = Vec::new();
        let mut auto_counter = 0usize;

        for window in self.windows {
            let (id, source, transforms) = window.into_parts();
            let id = match id {
                Some(id) => {
                    if id.trim().is_empty() {
                        return Err(DarkroomError::validation("window id must be non-empty"));
                    }
                    id
                }
                None => {
                    auto_counter += 1;
                    format!("step-{auto_counter}")
                }
            };
            if window_ids.contains_key(&id) {
                return Err(DarkroomError::validation(format!(
                    "duplicate window id '{id}'"
                )));
            }
            if transforms.is_empty() {
                return Err(DarkroomError::validation(format!(
                    "window '{id}' must contain at least one transform"
                )));
            }

            let mut slot_nodes = Vec::new();
            for transform in transforms {
                if node_ids.contains_key(transform.id()) {
                    return Err(DarkroomError::validation(format!(
                        "duplicate transform id '{}'",
                        transform.id()
                    )));
                }
                let n = nodes.len();
                node_ids.insert(transform.id().to_string(), n);
                nodes.push(transform);
                slot_nodes.push(n);
            }

            window_ids.insert(id.clone(), windows.len());
            raw_sources.push(source);
            windows.push(WindowSlot {
                id,
                // Placeholder until sources resolve below; window ids must
                // all be known first so forward references work.
                source: ResolvedSource::Node(usize::MAX),
                nodes: slot_nodes,
            });
        }

        // Window sources.
        for (w, source) in raw_sources.into_iter().enumerate() {
            let resolved = match source {
                WindowSource::Image(frame) => ResolvedSource::Image(frame),
                WindowSource::Window { window, transform } => {
                    let src_w = *window_ids.get(&window).ok_or_else(|| {
                        DarkroomError::unresolved(
                            windows[w].id.as_str(),
                            format!("window '{window}'"),
                        )
                    })?;
                    let chain = &windows[src_w].nodes;
                    let node = match transform {
                        None => chain[chain.len() - 1],
                        Some(index) => *chain.get(index).ok_or(DarkroomError::IndexOutOfRange {
                            index,
                            len: chain.len(),
                        })?,
                    };
                    ResolvedSource::Node(node)
                }
            };
            windows[w].source = resolved;
        }

        // Primary inputs and extra-input edges.
        let mut primary = vec![Primary::Source(0); nodes.len()];
        for (w, slot) in windows.iter().enumerate() {
            for (pos, &n) in slot.nodes.iter().enumerate() {
                primary[n] = if pos == 0 {
                    Primary::Source(w)
                } else {
                    Primary::Node(slot.nodes[pos - 1])
                };
            }
        }

        let mut extras = vec![Vec::new(); nodes.len()];
        for n in 0..nodes.len() {
            for spec in nodes[n].extra_inputs() {
                if extras[n]
                    .iter()
                    .any(|e: &ResolvedExtra| e.name == spec.name)
                {
                    return Err(DarkroomError::validation(format!(
                        "transform '{}' declares duplicate extra input '{}'",
                        nodes[n].id(),
                        spec.name
                    )));
                }
                let source = *node_ids.get(&spec.source.transform).ok_or_else(|| {
                    DarkroomError::unresolved(
                        nodes[n].id(),
                        format!("transform '{}'", spec.source.transform),
                    )
                })?;
                extras[n].push(ResolvedExtra {
                    name: spec.name.clone(),
                    node: source,
                    output: spec.source.output.clone(),
                });
            }
        }

        // Dependency edges: intra-window chains, window-source links,
        // cross-window extra inputs.
        let mut preds = vec![Vec::new(); nodes.len()];
        let mut succs = vec![Vec::new(); nodes.len()];
        let mut add_edge = |from: usize, to: usize| {
            if !succs[from].contains(&to) {
                succs[from].push(to);
                preds[to].push(from);
            }
        };
        for slot in &windows {
            if let ResolvedSource::Node(src) = slot.source {
                add_edge(src, slot.nodes[0]);
            }
            for pair in slot.nodes.windows(2) {
                add_edge(pair[0], pair[1]);
            }
        }
        for (n, resolved) in extras.iter().enumerate() {
            for extra in resolved {
                add_edge(extra.node, n);
            }
        }

        let topo = topo_sort(&nodes, &preds, &succs)?;

        Ok(Pipeline {
            nodes,
            node_ids,
            windows,
            window_ids,
            primary,
            extras,
            preds,
            succs,
            topo,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Kahn's algorithm with a FIFO queue seeded (and fed) in arena order, so
/// the execution order is deterministic for a given declaration.
fn topo_sort(
    nodes: &[crate::transform::node::Transform],
    preds: &[Vec<usize>],
    succs: &[Vec<usize>],
) -> DarkroomResult<Vec<usize>> {
    let mut indegree: Vec<usize> = preds.iter().map(Vec::len).collect();
    let mut queue: std::collections::VecDeque<usize> = (0..nodes.len())
        .filter(|&n| indegree[n] == 0)
        .collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(n) = queue.pop_front() {
        order.push(n);
        for &s in &succs[n] {
            indegree[s] -= 1;
            if indegree[s] == 0 {
                queue.push_back(s);
            }
        }
    }

    if order.len() < nodes.len() {
        let stuck: Vec<&str> = (0..nodes.len())
            .filter(|&n| indegree[n] > 0)
            .map(|n| nodes[n].id())
            .collect();
        return Err(DarkroomError::CyclicPipeline(stuck.join(", ")));
    }
    Ok(order)
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/builder.rs"]
mod tests;
