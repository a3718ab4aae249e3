use std::collections::HashSet;
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::info;

use crate::chain::LoadedAddress;
use crate::flow::build_flow_graph;

use super::super::{SearchMatchCache, VisualizerEvent, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    pub(in crate::app) fn finish_loading(&mut self, loaded: LoadedAddress) {
        let graph = build_flow_graph(
            &loaded.address,
            &loaded.transactions,
            loaded.risk_score,
            &self.build_config,
        );
        info!(
            address = %loaded.address,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            risk_score = graph.stats.risk_score,
            "flow graph ready"
        );

        self.graph = graph;
        self.graph_revision = self.graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.interaction.reset();
        self.related_rows_visible = Self::INITIAL_RELATED_ROWS;

        if self.loading {
            self.loading = false;
            let _ = self.events.send(VisualizerEvent::LoadingChanged(false));
        }
    }

    /// Nodes whose address fuzzily matches the search box, recomputed only
    /// when the query or the graph changes.
    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.graph_revision
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.id, search_query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            graph_revision: self.graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    /// Best fuzzy match for the search box, used to jump to it.
    pub(in crate::app) fn best_search_match(&self) -> Option<usize> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        self.graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.id, search_query).map(|score| (index, score))
            })
            .max_by_key(|(_, score)| *score)
            .map(|(index, _)| index)
    }
}
