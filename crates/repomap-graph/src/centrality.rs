//! Structural importance measures over a [`DependencyGraph`].
//!
//! Centrality treats "file A imports file B" as A casting a vote for B:
//! a file depended on by many others should score highly, the way a
//! heavily-linked-to page scores highly in PageRank. Concretely, the
//! "vote" edge for a node `v` runs from `v` to each of `v`'s
//! dependencies (`graph.dependencies(v)`), and `v` receives votes from
//! `graph.dependents(v)`. This is the *reverse* of the graph's stored
//! edge direction (imported -> importing), which exists to make
//! `dependencies`/`dependents` cheap lookups, not to dictate the
//! direction importance should flow.

use crate::graph::DependencyGraph;
use repomap_core::error::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;

pub const PAGERANK_DAMPING: f64 = 0.85;
pub const PAGERANK_MAX_ITER: usize = 100;
pub const EIGENVECTOR_MAX_ITER: usize = 1000;
pub const CONVERGENCE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CentralityType {
    Degree,
    Betweenness,
    PageRank,
    HitsHub,
    HitsAuthority,
    Eigenvector,
    Closeness,
    Composite,
}

#[derive(Debug, Clone)]
pub struct CompositeWeights {
    pub degree: f64,
    pub betweenness: f64,
    pub pagerank: f64,
    pub eigenvector: f64,
    pub closeness: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            degree: 0.30,
            betweenness: 0.25,
            pagerank: 0.25,
            eigenvector: 0.10,
            closeness: 0.10,
        }
    }
}

impl CompositeWeights {
    pub fn normalized(&self) -> Self {
        let sum = self.degree + self.betweenness + self.pagerank + self.eigenvector + self.closeness;
        if (sum - 1.0).abs() < 1e-9 || sum <= 0.0 {
            return self.clone();
        }
        tracing::warn!(sum, "composite centrality weights did not sum to 1.0; normalizing");
        Self {
            degree: self.degree / sum,
            betweenness: self.betweenness / sum,
            pagerank: self.pagerank / sum,
            eigenvector: self.eigenvector / sum,
            closeness: self.closeness / sum,
        }
    }
}

pub type ScoreMap = HashMap<PathBuf, f64>;

pub struct CentralityCalculator<'g> {
    graph: &'g DependencyGraph,
    cache: parking_lot::Mutex<HashMap<CentralityType, ScoreMap>>,
    cache_enabled: bool,
}

impl<'g> CentralityCalculator<'g> {
    pub fn new(graph: &'g DependencyGraph) -> Self {
        Self {
            graph,
            cache: parking_lot::Mutex::new(HashMap::new()),
            cache_enabled: true,
        }
    }

    pub fn with_cache_disabled(graph: &'g DependencyGraph) -> Self {
        Self {
            graph,
            cache: parking_lot::Mutex::new(HashMap::new()),
            cache_enabled: false,
        }
    }

    fn cached(&self, kind: CentralityType, compute: impl FnOnce() -> ScoreMap) -> ScoreMap {
        if !self.cache_enabled {
            return compute();
        }
        if let Some(hit) = self.cache.lock().get(&kind) {
            return hit.clone();
        }
        let result = compute();
        self.cache.lock().insert(kind, result.clone());
        result
    }

    fn votes_out(&self, node: &std::path::Path) -> Vec<PathBuf> {
        self.graph.dependencies(node)
    }

    fn votes_in(&self, node: &std::path::Path) -> Vec<PathBuf> {
        self.graph.dependents(node)
    }

    pub fn degree_centrality(&self) -> ScoreMap {
        self.cached(CentralityType::Degree, || {
            let n = self.graph.len();
            let mut scores = HashMap::new();
            if n <= 1 {
                for f in self.graph.file_paths() {
                    scores.insert(f, 0.0);
                }
                return validate(scores);
            }
            let max_degree = 2 * (n - 1);
            for node in self.graph.nodes() {
                let degree = node.in_degree() + node.out_degree();
                scores.insert(node.file_path.clone(), degree as f64 / max_degree as f64);
            }
            validate(scores)
        })
    }

    /// Brandes' algorithm over the "vote" edges, normalized for a
    /// directed graph by `(n-1)(n-2)`.
    pub fn betweenness_centrality(&self) -> ScoreMap {
        self.cached(CentralityType::Betweenness, || {
            let nodes = self.graph.file_paths();
            let n = nodes.len();
            let mut scores: ScoreMap = nodes.iter().map(|f| (f.clone(), 0.0)).collect();
            if n == 0 {
                return scores;
            }

            for s in &nodes {
                let mut stack: Vec<PathBuf> = Vec::new();
                let mut preds: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
                let mut sigma: HashMap<PathBuf, f64> = nodes.iter().map(|f| (f.clone(), 0.0)).collect();
                let mut dist: HashMap<PathBuf, i64> = nodes.iter().map(|f| (f.clone(), -1)).collect();
                sigma.insert(s.clone(), 1.0);
                dist.insert(s.clone(), 0);
                let mut queue = std::collections::VecDeque::new();
                queue.push_back(s.clone());

                while let Some(v) = queue.pop_front() {
                    stack.push(v.clone());
                    for w in self.votes_out(&v) {
                        if dist[&w] < 0 {
                            dist.insert(w.clone(), dist[&v] + 1);
                            queue.push_back(w.clone());
                        }
                        if dist[&w] == dist[&v] + 1 {
                            let sv = sigma[&v];
                            *sigma.get_mut(&w).unwrap() += sv;
                            preds.entry(w.clone()).or_default().push(v.clone());
                        }
                    }
                }

                let mut delta: HashMap<PathBuf, f64> = nodes.iter().map(|f| (f.clone(), 0.0)).collect();
                while let Some(w) = stack.pop() {
                    if let Some(ps) = preds.get(&w) {
                        for v in ps {
                            let contrib = (sigma[v] / sigma[&w]) * (1.0 + delta[&w]);
                            *delta.get_mut(v).unwrap() += contrib;
                        }
                    }
                    if w != *s {
                        *scores.get_mut(&w).unwrap() += delta[&w];
                    }
                }
            }

            if n > 2 {
                let norm = ((n - 1) * (n - 2)) as f64;
                for v in scores.values_mut() {
                    *v /= norm;
                }
            }
            validate(scores)
        })
    }

    pub fn pagerank(&self) -> ScoreMap {
        self.cached(CentralityType::PageRank, || {
            let nodes = self.graph.file_paths();
            let n = nodes.len();
            if n == 0 {
                return HashMap::new();
            }
            let mut rank: ScoreMap = nodes.iter().map(|f| (f.clone(), 1.0 / n as f64)).collect();
            let base = (1.0 - PAGERANK_DAMPING) / n as f64;

            for _ in 0..PAGERANK_MAX_ITER {
                let mut next: ScoreMap = nodes.iter().map(|f| (f.clone(), base)).collect();
                for v in &nodes {
                    let mut contrib = 0.0;
                    for u in self.votes_in(v) {
                        let fan_out = self.votes_out(&u).len().max(1) as f64;
                        contrib += rank[&u] / fan_out;
                    }
                    *next.get_mut(v).unwrap() += PAGERANK_DAMPING * contrib;
                }
                let delta: f64 = nodes.iter().map(|f| (next[f] - rank[f]).abs()).sum();
                rank = next;
                if delta < CONVERGENCE_TOLERANCE {
                    break;
                }
            }
            validate(normalize_to_unit_range(rank))
        })
    }

    /// Returns `(hub, authority)` score maps.
    pub fn hits(&self) -> (ScoreMap, ScoreMap) {
        let nodes = self.graph.file_paths();
        if nodes.is_empty() {
            return (HashMap::new(), HashMap::new());
        }
        let mut hub: ScoreMap = nodes.iter().map(|f| (f.clone(), 1.0)).collect();
        let mut auth: ScoreMap = nodes.iter().map(|f| (f.clone(), 1.0)).collect();

        for _ in 0..PAGERANK_MAX_ITER {
            let mut new_auth: ScoreMap = HashMap::new();
            for v in &nodes {
                let sum: f64 = self.votes_in(v).iter().map(|u| hub[u]).sum();
                new_auth.insert(v.clone(), sum);
            }
            normalize_l2(&mut new_auth);

            let mut new_hub: ScoreMap = HashMap::new();
            for v in &nodes {
                let sum: f64 = self.votes_out(v).iter().map(|u| new_auth[u]).sum();
                new_hub.insert(v.clone(), sum);
            }
            normalize_l2(&mut new_hub);

            let delta: f64 = nodes.iter().map(|f| (new_hub[f] - hub[f]).abs() + (new_auth[f] - auth[f]).abs()).sum();
            hub = new_hub;
            auth = new_auth;
            if delta < CONVERGENCE_TOLERANCE {
                break;
            }
        }
        (validate(normalize_to_unit_range(hub)), validate(normalize_to_unit_range(auth)))
    }

    pub fn eigenvector_centrality(&self) -> ScoreMap {
        self.cached(CentralityType::Eigenvector, || {
            let nodes = self.graph.file_paths();
            let n = nodes.len();
            if n == 0 {
                return HashMap::new();
            }
            let mut scores: ScoreMap = nodes.iter().map(|f| (f.clone(), 1.0 / (n as f64).sqrt())).collect();

            for _ in 0..EIGENVECTOR_MAX_ITER {
                let mut next: ScoreMap = HashMap::new();
                for v in &nodes {
                    let sum: f64 = self.votes_in(v).iter().map(|u| scores[u]).sum();
                    next.insert(v.clone(), sum);
                }
                if next.values().all(|v| *v == 0.0) {
                    // Disconnected graph: fall back to uniform scores rather
                    // than collapsing to all-zero.
                    next = nodes.iter().map(|f| (f.clone(), 1.0)).collect();
                }
                normalize_l2(&mut next);
                let delta: f64 = nodes.iter().map(|f| (next[f] - scores[f]).abs()).sum();
                scores = next;
                if delta < CONVERGENCE_TOLERANCE {
                    break;
                }
            }
            validate(normalize_to_unit_range(scores))
        })
    }

    /// Harmonic closeness over the graph treated as undirected (the
    /// direction a file is connected by matters less than whether it is
    /// close to the rest of the codebase at all).
    pub fn closeness_centrality(&self) -> ScoreMap {
        self.cached(CentralityType::Closeness, || {
            let nodes = self.graph.file_paths();
            let n = nodes.len();
            let mut scores: ScoreMap = nodes.iter().map(|f| (f.clone(), 0.0)).collect();
            if n <= 1 {
                return scores;
            }
            for s in &nodes {
                let dist = bfs_undirected_distances(self.graph, s);
                let sum: f64 = dist.values().filter(|d| **d > 0).map(|d| 1.0 / *d as f64).sum();
                scores.insert(s.clone(), sum / (n - 1) as f64);
            }
            validate(scores)
        })
    }

    pub fn composite_importance(&self, weights: &CompositeWeights) -> ScoreMap {
        let weights = weights.normalized();
        let degree = self.degree_centrality();
        let betweenness = self.betweenness_centrality();
        let pagerank = self.pagerank();
        let eigenvector = self.eigenvector_centrality();
        let closeness = self.closeness_centrality();

        let mut scores = HashMap::new();
        for f in self.graph.file_paths() {
            let score = weights.degree * degree.get(&f).copied().unwrap_or(0.0)
                + weights.betweenness * betweenness.get(&f).copied().unwrap_or(0.0)
                + weights.pagerank * pagerank.get(&f).copied().unwrap_or(0.0)
                + weights.eigenvector * eigenvector.get(&f).copied().unwrap_or(0.0)
                + weights.closeness * closeness.get(&f).copied().unwrap_or(0.0);
            scores.insert(f, score.clamp(0.0, 1.0));
        }
        validate(scores)
    }

    pub fn score_for(&self, kind: CentralityType, file: &std::path::Path) -> Option<f64> {
        self.scores_for(kind).get(file).copied()
    }

    pub fn scores_for(&self, kind: CentralityType) -> ScoreMap {
        match kind {
            CentralityType::Degree => self.degree_centrality(),
            CentralityType::Betweenness => self.betweenness_centrality(),
            CentralityType::PageRank => self.pagerank(),
            CentralityType::HitsHub => self.hits().0,
            CentralityType::HitsAuthority => self.hits().1,
            CentralityType::Eigenvector => self.eigenvector_centrality(),
            CentralityType::Closeness => self.closeness_centrality(),
            CentralityType::Composite => self.composite_importance(&CompositeWeights::default()),
        }
    }

    pub fn top_n(&self, kind: CentralityType, n: usize) -> Vec<(PathBuf, f64)> {
        let scores = self.scores_for(kind);
        let mut ranked: Vec<_> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    pub fn ranking(&self, kind: CentralityType) -> Vec<(PathBuf, f64, usize)> {
        self.top_n(kind, self.graph.len())
            .into_iter()
            .enumerate()
            .map(|(i, (f, s))| (f, s, i + 1))
            .collect()
    }

    pub fn percentile(&self, file: &std::path::Path, kind: CentralityType) -> Result<f64> {
        let scores = self.scores_for(kind);
        let target = scores
            .get(file)
            .copied()
            .ok_or_else(|| Error::Validation(format!("{} not present in graph", file.display())))?;
        let below = scores.values().filter(|v| **v <= target).count();
        Ok(below as f64 / scores.len().max(1) as f64 * 100.0)
    }
}

fn normalize_l2(scores: &mut ScoreMap) {
    let norm: f64 = scores.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in scores.values_mut() {
            *v /= norm;
        }
    }
}

fn normalize_to_unit_range(mut scores: ScoreMap) -> ScoreMap {
    let max = scores.values().cloned().fold(0.0_f64, f64::max);
    if max > 0.0 {
        for v in scores.values_mut() {
            *v /= max;
        }
    }
    scores
}

fn validate(scores: ScoreMap) -> ScoreMap {
    for (file, score) in &scores {
        debug_assert!(!score.is_nan(), "NaN centrality score for {}", file.display());
        debug_assert!(*score >= -1e-9 && *score <= 1.0 + 1e-9, "out-of-range score for {}", file.display());
    }
    scores
        .into_iter()
        .map(|(f, s)| (f, s.clamp(0.0, 1.0)))
        .collect()
}

fn bfs_undirected_distances(graph: &DependencyGraph, start: &PathBuf) -> HashMap<PathBuf, i64> {
    let mut dist: HashMap<PathBuf, i64> = HashMap::new();
    dist.insert(start.clone(), 0);
    let mut queue = std::collections::VecDeque::new();
    queue.push_back(start.clone());
    while let Some(v) = queue.pop_front() {
        let d = dist[&v];
        let mut neighbors = graph.dependencies(&v);
        neighbors.extend(graph.dependents(&v));
        for n in neighbors {
            if !dist.contains_key(&n) {
                dist.insert(n.clone(), d + 1);
                queue.push_back(n);
            }
        }
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ProjectImports;
    use repomap_core::types::{Import, ImportType};
    use std::path::PathBuf;

    fn import_to(target: &str) -> Import {
        Import {
            module: target.to_string(),
            alias: None,
            symbols: vec![],
            is_relative: false,
            import_type: ImportType::Absolute,
            line_number: 1,
            resolved_path: Some(PathBuf::from(target)),
        }
    }

    fn hub_graph() -> DependencyGraph {
        let mut per_file = vec![(PathBuf::from("core.py"), None, vec![])];
        for i in 0..10 {
            per_file.push((PathBuf::from(format!("leaf{i}.py")), None, vec![import_to("core.py")]));
        }
        DependencyGraph::build(&ProjectImports { per_file })
    }

    #[test]
    fn empty_graph_returns_empty_maps() {
        let graph = DependencyGraph::new();
        let calc = CentralityCalculator::new(&graph);
        assert!(calc.degree_centrality().is_empty());
        assert!(calc.betweenness_centrality().is_empty());
        assert!(calc.pagerank().is_empty());
        assert!(calc.eigenvector_centrality().is_empty());
        assert!(calc.closeness_centrality().is_empty());
    }

    #[test]
    fn hub_has_max_degree_and_pagerank() {
        let graph = hub_graph();
        let calc = CentralityCalculator::new(&graph);
        let degree = calc.degree_centrality();
        let core = PathBuf::from("core.py");
        let core_degree = degree[&core];
        assert!(degree.values().all(|v| *v <= core_degree + 1e-9));

        let pagerank = calc.pagerank();
        let core_pr = pagerank[&core];
        for i in 0..10 {
            assert!(core_pr > pagerank[&PathBuf::from(format!("leaf{i}.py"))]);
        }

        let composite = calc.composite_importance(&CompositeWeights::default());
        let ranking = calc.ranking(CentralityType::Composite);
        assert_eq!(ranking[0].0, core);
        assert!(composite[&core] > 0.0);
    }

    #[test]
    fn all_scores_in_unit_range() {
        let graph = hub_graph();
        let calc = CentralityCalculator::new(&graph);
        for kind in [
            CentralityType::Degree,
            CentralityType::Betweenness,
            CentralityType::PageRank,
            CentralityType::Eigenvector,
            CentralityType::Closeness,
            CentralityType::Composite,
        ] {
            for score in calc.scores_for(kind).values() {
                assert!(*score >= 0.0 && *score <= 1.0);
                assert!(!score.is_nan());
            }
        }
    }
}
