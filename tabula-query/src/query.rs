//! The where-input a list query is built from.
//!
//! Quick filters and advanced search both contribute [`Filter`] fragments to one
//! [`WhereInput`]. It keeps the three places a Prisma-style `where` object can hold a
//! condition apart: directly at the top level, inside `AND`, or inside `OR`.

use serde_json::{Map, Value};

use crate::filter::Filter;
use crate::search::GlobalLogic;

/// Accumulated conditions of a list query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereInput {
    /// Conditions merged at the top level.
    pub conditions: Vec<Filter>,
    /// Members of the `AND` list.
    pub and: Vec<Filter>,
    /// Members of the `OR` list.
    pub or: Vec<Filter>,
}

impl WhereInput {
    /// Create an empty where-input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no condition has been added.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.and.is_empty() && self.or.is_empty()
    }

    /// Merge compiled quick-filter fragments.
    ///
    /// A single fragment goes in without a wrapper; an OR group becomes the query's OR
    /// list when there is none yet. Two or more fragments are appended to the AND list.
    pub fn merge_fragments(&mut self, fragments: Vec<Filter>) {
        let mut fragments: Vec<_> = fragments.into_iter().filter(|f| !f.is_none()).collect();
        match fragments.len() {
            0 => {}
            1 => {
                let Some(fragment) = fragments.pop() else {
                    return;
                };
                match fragment {
                    Filter::Or(members) if self.or.is_empty() => self.or = members,
                    other => self.conditions.push(other),
                }
            }
            _ => self.and.extend(fragments),
        }
    }

    /// Combine advanced-search fragments under `logic`.
    ///
    /// With [`GlobalLogic::Or`] the fragments join the existing OR list. When there is no
    /// OR list yet one is created, and the conditions already present become its first
    /// member so they stay an alternative rather than a requirement.
    pub fn apply_search(&mut self, fragments: Vec<Filter>, logic: GlobalLogic) {
        let fragments: Vec<_> = fragments.into_iter().filter(|f| !f.is_none()).collect();
        if fragments.is_empty() {
            return;
        }

        match logic {
            GlobalLogic::And => self.merge_fragments(fragments),
            GlobalLogic::Or if !self.or.is_empty() => self.or.extend(fragments),
            GlobalLogic::Or => {
                let existing = Filter::and(self.conditions.drain(..).chain(self.and.drain(..)));
                self.or = std::iter::once(existing)
                    .chain(fragments)
                    .filter(|f| !f.is_none())
                    .collect();
            }
        }
    }

    /// Collapse into a single filter tree.
    pub fn into_filter(self) -> Filter {
        let or = Filter::or(self.or);
        Filter::and(self.conditions.into_iter().chain(self.and).chain([or]))
    }

    /// Render as a Prisma-shaped `where` object.
    ///
    /// Top-level conditions are merged into the root object. A condition whose key is
    /// already taken moves into `AND`.
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        let mut and: Vec<Value> = self.and.iter().map(Filter::to_json).collect();

        for condition in &self.conditions {
            let Value::Object(object) = condition.to_json() else {
                continue;
            };
            for (key, value) in object {
                let taken = root.contains_key(&key) || (key == "OR" && !self.or.is_empty());
                if key == "AND" {
                    match value {
                        Value::Array(members) => and.extend(members),
                        other => and.push(other),
                    }
                } else if taken {
                    let mut single = Map::new();
                    single.insert(key, value);
                    and.push(Value::Object(single));
                } else {
                    root.insert(key, value);
                }
            }
        }

        if !and.is_empty() {
            root.insert("AND".into(), Value::Array(and));
        }
        if !self.or.is_empty() {
            root.insert(
                "OR".into(),
                Value::Array(self.or.iter().map(Filter::to_json).collect()),
            );
        }
        Value::Object(root)
    }
}

impl From<WhereInput> for Filter {
    fn from(input: WhereInput) -> Self {
        input.into_filter()
    }
}

/// Merge compiled quick-filter fragments into `where_input`.
pub fn merge_fragments(where_input: &mut WhereInput, fragments: Vec<Filter>) {
    where_input.merge_fragments(fragments);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn status() -> Filter {
        Filter::equals("status", "active")
    }

    fn name_contains() -> Filter {
        Filter::ContainsInsensitive("name".into(), "acme".into())
    }

    #[test]
    fn test_no_fragments_leave_input_untouched() {
        let mut input = WhereInput::new();
        input.merge_fragments(vec![]);
        input.merge_fragments(vec![Filter::None]);
        assert!(input.is_empty());
        assert_eq!(input.to_json(), json!({}));
    }

    #[test]
    fn test_single_fragment_has_no_wrapper() {
        let mut input = WhereInput::new();
        input.merge_fragments(vec![status()]);
        assert_eq!(input.to_json(), json!({ "status": "active" }));
    }

    #[test]
    fn test_single_or_group_becomes_or_list() {
        let mut input = WhereInput::new();
        input.merge_fragments(vec![Filter::or([status(), name_contains()])]);
        assert_eq!(input.or.len(), 2);
        assert!(input.conditions.is_empty());
    }

    #[test]
    fn test_second_or_group_does_not_replace_or_list() {
        let mut input = WhereInput::new();
        input.merge_fragments(vec![Filter::or([status(), name_contains()])]);
        input.merge_fragments(vec![Filter::or([
            Filter::equals("kind", "a"),
            Filter::equals("kind", "b"),
        ])]);
        assert_eq!(input.or.len(), 2);
        assert_eq!(input.conditions.len(), 1);
        assert_eq!(
            input.to_json(),
            json!({
                "AND": [{ "OR": [{ "kind": "a" }, { "kind": "b" }] }],
                "OR": [
                    { "status": "active" },
                    { "name": { "contains": "acme", "mode": "insensitive" } },
                ],
            })
        );
    }

    #[test]
    fn test_many_fragments_go_to_and_list() {
        let mut input = WhereInput::new();
        input.merge_fragments(vec![status(), name_contains()]);
        assert_eq!(input.and.len(), 2);
        assert_eq!(
            input.to_json(),
            json!({ "AND": [
                { "status": "active" },
                { "name": { "contains": "acme", "mode": "insensitive" } },
            ] })
        );
    }

    #[test]
    fn test_colliding_conditions_move_to_and() {
        let mut input = WhereInput::new();
        input.merge_fragments(vec![status()]);
        input.merge_fragments(vec![Filter::NotEquals("status".into(), "archived".into())]);
        assert_eq!(
            input.to_json(),
            json!({ "status": "active", "AND": [{ "status": { "not": "archived" } }] })
        );
    }

    #[test]
    fn test_or_search_absorbs_existing_conditions() {
        let mut input = WhereInput::new();
        input.merge_fragments(vec![status()]);
        input.apply_search(vec![name_contains()], GlobalLogic::Or);
        assert_eq!(
            input.to_json(),
            json!({ "OR": [
                { "status": "active" },
                { "name": { "contains": "acme", "mode": "insensitive" } },
            ] })
        );
    }

    #[test]
    fn test_or_search_groups_several_existing_conditions() {
        let mut input = WhereInput::new();
        input.merge_fragments(vec![status(), Filter::equals("kind", "pallet")]);
        input.apply_search(vec![name_contains()], GlobalLogic::Or);
        assert!(input.and.is_empty());
        assert_eq!(
            input.or[0],
            Filter::And(vec![status(), Filter::equals("kind", "pallet")])
        );
    }

    #[test]
    fn test_or_search_extends_existing_or_list() {
        let mut input = WhereInput::new();
        input.merge_fragments(vec![Filter::or([status(), Filter::equals("status", "new")])]);
        input.apply_search(vec![name_contains()], GlobalLogic::Or);
        assert_eq!(input.or.len(), 3);
    }

    #[test]
    fn test_and_search_merges_like_quick_filters() {
        let mut input = WhereInput::new();
        input.apply_search(vec![name_contains()], GlobalLogic::And);
        assert_eq!(input.conditions, vec![name_contains()]);
    }

    #[test]
    fn test_into_filter_renders_sql() {
        let mut input = WhereInput::new();
        input.merge_fragments(vec![status()]);
        input.apply_search(
            vec![Filter::equals("total", FilterValue::Int(5)), name_contains()],
            GlobalLogic::Or,
        );
        let (sql, params) = input.into_filter().to_sql(0);
        assert_eq!(sql, "(status = $1 OR total = $2 OR name ILIKE $3)");
        assert_eq!(params.len(), 3);
    }
}
