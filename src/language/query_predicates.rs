//! Text predicates that tree-sitter leaves to the host.
//!
//! `eq?`, `match?` and `any-of?` are evaluated by the query cursor itself.
//! Queries written for Neovim also use `lua-match?`, which arrives here as a
//! general predicate and is evaluated by translating the Lua pattern to a
//! regex.

use regex::Regex;
use std::collections::HashMap;
use tree_sitter::{Query, QueryCapture, QueryMatch, QueryPredicateArg};

/// Evaluates general predicates, caching compiled patterns
#[derive(Debug, Default)]
pub struct PredicateFilter {
    patterns: HashMap<String, Option<Regex>>,
}

impl PredicateFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `capture` satisfies every general predicate on its pattern
    pub fn accepts(
        &mut self,
        query: &Query,
        match_: &QueryMatch<'_, '_>,
        capture: &QueryCapture<'_>,
        text: &str,
    ) -> bool {
        for predicate in query.general_predicates(match_.pattern_index) {
            let Some(QueryPredicateArg::Capture(capture_id)) = predicate.args.first() else {
                continue;
            };
            if *capture_id != capture.index {
                continue;
            }
            let Some(QueryPredicateArg::String(pattern)) = predicate.args.get(1) else {
                continue;
            };

            let expected = match predicate.operator.as_ref() {
                "lua-match?" => true,
                "not-lua-match?" => false,
                other => {
                    log::trace!(target: "irodori::query", "Ignoring predicate {}", other);
                    continue;
                }
            };

            let node_text = capture.node.utf8_text(text.as_bytes()).unwrap_or("");
            // An uncompilable pattern never filters anything out
            if let Some(re) = self.compile(pattern)
                && re.is_match(node_text) != expected
            {
                return false;
            }
        }
        true
    }

    fn compile(&mut self, pattern: &str) -> Option<&Regex> {
        self.patterns
            .entry(pattern.to_string())
            .or_insert_with(|| lua_pattern_to_regex(pattern))
            .as_ref()
    }
}

fn lua_pattern_to_regex(pattern: &str) -> Option<Regex> {
    let parsed = match lua_pattern::parse(pattern) {
        Ok(parsed) => parsed,
        Err(err) => {
            log::warn!(target: "irodori::query", "Invalid lua-pattern {:?}: {:?}", pattern, err);
            return None;
        }
    };
    let regex_str = match lua_pattern::try_to_regex(&parsed, false, false) {
        Ok(regex_str) => regex_str,
        Err(err) => {
            log::warn!(
                target: "irodori::query",
                "Failed to convert lua-pattern {:?} to regex: {:?}",
                pattern,
                err
            );
            return None;
        }
    };
    match Regex::new(&regex_str) {
        Ok(re) => Some(re),
        Err(err) => {
            log::warn!(
                target: "irodori::query",
                "Failed to compile regex {} from lua-pattern: {}",
                regex_str,
                err
            );
            None
        }
    }
}
