//! WHERE predicate accumulation and rendering
//!
//! Predicates are stored once and rendered through a [`PredicateRenderer`].
//! Both renderers walk the same selection pass, so a predicate that is
//! skipped on the read path is skipped on the write path too.

use super::common::{Joiner, Predicate};
use crate::codec::{implode, to_bound_param, to_literal};
use crate::{Operator, Value};

/// One stored predicate with its joiner
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub joiner: Joiner,
    pub predicate: Predicate,
}

/// Ordered WHERE predicates plus an optional trailing raw fragment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateSet {
    entries: Vec<Entry>,
    raw: Option<String>,
}

/// Renders the individual predicate shapes
pub trait PredicateRenderer {
    /// `column op <value>`
    fn compare(&mut self, column: &str, operator: Operator, value: &Value) -> String;

    /// `column in (<values>)` / `column not in (<values>)`
    fn membership(&mut self, column: &str, operator: Operator, values: Vec<Value>) -> String;

    fn raw(&mut self, text: &str) -> String {
        format!("({text})")
    }

    /// Equality maps always inline their values
    fn equals(&mut self, pairs: &[(String, Value)]) -> String {
        let parts: Vec<String> = pairs
            .iter()
            .map(|(column, value)| format!("{} = {}", column, to_literal(value)))
            .collect();
        format!("({})", parts.join(" and "))
    }
}

/// Placeholder rendering for the read paths
#[derive(Debug, Default)]
pub struct Parameterized {
    params: Vec<Value>,
}

impl Parameterized {
    pub fn into_params(self) -> Vec<Value> {
        self.params
    }
}

impl PredicateRenderer for Parameterized {
    fn compare(&mut self, column: &str, operator: Operator, value: &Value) -> String {
        self.params.push(to_bound_param(value.clone()));
        format!("{column} {operator} ?")
    }

    fn membership(&mut self, column: &str, operator: Operator, values: Vec<Value>) -> String {
        let placeholders = vec!["?"; values.len()].join(",");
        self.params.extend(values.into_iter().map(to_bound_param));
        format!("{column} {operator} ({placeholders})")
    }
}

/// Literal rendering for the write paths
#[derive(Debug, Default)]
pub struct Inlined;

impl PredicateRenderer for Inlined {
    fn compare(&mut self, column: &str, operator: Operator, value: &Value) -> String {
        format!("{column} {operator} {}", to_literal(value))
    }

    fn membership(&mut self, column: &str, operator: Operator, values: Vec<Value>) -> String {
        format!("{column} {operator} ({})", implode(&values))
    }
}

/// Whether a predicate carries a usable driving value. Empty columns, blank
/// raw text, empty maps and zero values mean "not supplied".
fn is_supplied(predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Raw(text) => !text.trim().is_empty(),
        Predicate::Equals(pairs) => !pairs.is_empty(),
        Predicate::Pair(column, value) | Predicate::Compare(column, _, value) => {
            !column.trim().is_empty() && !value.is_zero()
        }
    }
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, joiner: Joiner, predicate: Predicate) {
        self.entries.push(Entry { joiner, predicate });
    }

    /// Replace the trailing raw fragment
    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.raw = Some(raw.into());
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Predicates that survive selection, in insertion order
    pub fn selected(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| is_supplied(&entry.predicate))
    }

    /// True when rendering would produce no condition at all
    pub fn is_empty(&self) -> bool {
        self.selected().next().is_none() && self.trailing_raw().is_none()
    }

    fn trailing_raw(&self) -> Option<&str> {
        self.raw.as_deref().map(str::trim).filter(|raw| !raw.is_empty())
    }

    /// Render the condition text (without the `where` keyword)
    pub fn render<R: PredicateRenderer>(&self, renderer: &mut R) -> String {
        let mut fragments: Vec<(Joiner, String)> = Vec::new();

        for entry in self.selected() {
            let text = match &entry.predicate {
                Predicate::Raw(text) => renderer.raw(text),
                Predicate::Equals(pairs) => renderer.equals(pairs),
                Predicate::Pair(column, value) => renderer.compare(column, Operator::EQ, value),
                Predicate::Compare(column, operator, value) if operator.is_membership() => {
                    renderer.membership(column, *operator, value.clone().into_list())
                }
                Predicate::Compare(column, operator, value) => {
                    renderer.compare(column, *operator, value)
                }
            };
            fragments.push((entry.joiner, text));
        }

        if let Some(raw) = self.trailing_raw() {
            fragments.push((Joiner::And, raw.to_string()));
        }

        fragments
            .into_iter()
            .enumerate()
            .map(|(i, (joiner, text))| {
                if i == 0 {
                    text
                } else {
                    format!("{joiner} {text}")
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Condition with `?` placeholders and the values to bind
    pub fn render_parameterized(&self) -> (String, Vec<Value>) {
        let mut renderer = Parameterized::default();
        let condition = self.render(&mut renderer);
        (condition, renderer.into_params())
    }

    /// Condition with every value inlined as an escaped literal
    pub fn render_inlined(&self) -> String {
        self.render(&mut Inlined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntoPredicate;
    use serde_json::json;

    fn set(predicates: Vec<(Joiner, Predicate)>) -> PredicateSet {
        let mut set = PredicateSet::new();
        for (joiner, predicate) in predicates {
            set.push(joiner, predicate);
        }
        set
    }

    #[test]
    fn test_compare_renders_both_ways() {
        let set = set(vec![(Joiner::And, ("age", ">", 18).into_predicate())]);
        assert_eq!(
            set.render_parameterized(),
            ("age > ?".to_string(), vec![Value::Int(18)])
        );
        assert_eq!(set.render_inlined(), "age > 18");
    }

    #[test]
    fn test_first_joiner_is_dropped() {
        let set = set(vec![
            (Joiner::Or, ("a", 1).into_predicate()),
            (Joiner::And, ("b", "x").into_predicate()),
            (Joiner::Or, ("c", "<>", 2).into_predicate()),
        ]);
        let (condition, params) = set.render_parameterized();
        assert_eq!(condition, "a = ? and b = ? or c <> ?");
        assert_eq!(params, vec![Value::Int(1), Value::from("x"), Value::Int(2)]);
        assert_eq!(set.render_inlined(), "a = 1 and b = 'x' or c <> 2");
    }

    #[test]
    fn test_membership_flattens() {
        let set = set(vec![
            (Joiner::And, ("id", "in", vec![1, 2, 3]).into_predicate()),
            (Joiner::And, ("name", "not in", vec!["a", "b"]).into_predicate()),
        ]);
        let (condition, params) = set.render_parameterized();
        assert_eq!(condition, "id in (?,?,?) and name not in (?,?)");
        assert_eq!(params.len(), 5);
        assert_eq!(params[3], Value::from("a"));
        assert_eq!(set.render_inlined(), "id in (1,2,3) and name not in ('a','b')");
    }

    #[test]
    fn test_raw_and_equals_shapes() {
        let mut set = set(vec![
            (Joiner::And, "status = 1 OR Flag = 'X'".into_predicate()),
            (
                Joiner::And,
                Predicate::Equals(vec![
                    ("kind".to_string(), Value::from("it's")),
                    ("level".to_string(), Value::from(2)),
                ]),
            ),
        ]);
        set.set_raw(" deleted_at IS NULL ");

        let expected = "(status = 1 OR Flag = 'X') and (kind = 'it\\'s' and level = 2) and deleted_at IS NULL";
        let (condition, params) = set.render_parameterized();
        assert_eq!(condition, expected);
        assert!(params.is_empty());
        assert_eq!(set.render_inlined(), expected);
    }

    #[test]
    fn test_zero_values_are_skipped() {
        let set = set(vec![
            (Joiner::And, ("name", "").into_predicate()),
            (Joiner::And, ("age", ">", 0).into_predicate()),
            (Joiner::And, ("id", "in", Vec::<i32>::new()).into_predicate()),
            (Joiner::And, ("", 5).into_predicate()),
            (Joiner::And, "   ".into_predicate()),
            (Joiner::And, Predicate::Equals(Vec::new())),
            (Joiner::And, ("meta", Value::Json(json!({}))).into_predicate()),
            (Joiner::And, ("score", Value::Json(json!(0))).into_predicate()),
        ]);
        assert!(set.is_empty());
        assert_eq!(set.render_parameterized(), (String::new(), Vec::new()));
        assert_eq!(set.render_inlined(), "");
    }

    #[test]
    fn test_false_is_not_skipped() {
        let set = set(vec![(Joiner::And, ("active", false).into_predicate())]);
        assert_eq!(set.render_inlined(), "active = false");
    }

    #[test]
    fn test_renderers_agree_on_selection() {
        let shapes = vec![
            "".into_predicate(),
            "x = 1".into_predicate(),
            ("a", "").into_predicate(),
            ("a", "v").into_predicate(),
            ("a", 0).into_predicate(),
            ("a", 0.0f64).into_predicate(),
            ("a", 3.5f64).into_predicate(),
            ("a", ">", 0).into_predicate(),
            ("a", "like", "%x%").into_predicate(),
            ("a", "in", Vec::<i64>::new()).into_predicate(),
            ("a", "in", vec![0]).into_predicate(),
            ("a", "not in", 7).into_predicate(),
            ("a", Value::Null).into_predicate(),
            ("a", Value::Json(json!([]))).into_predicate(),
            ("a", Value::Json(json!({"k": 1}))).into_predicate(),
            Predicate::Equals(Vec::new()),
            Predicate::Equals(vec![("k".to_string(), Value::Null)]),
        ];

        for predicate in shapes {
            let set = set(vec![(Joiner::And, predicate.clone())]);
            let (parameterized, _) = set.render_parameterized();
            let inlined = set.render_inlined();
            assert_eq!(
                parameterized.is_empty(),
                inlined.is_empty(),
                "selection differs for {predicate:?}"
            );
            assert_eq!(set.is_empty(), inlined.is_empty());
        }
    }

    #[test]
    fn test_structured_values() {
        let set = set(vec![(Joiner::And, ("tags", Value::Json(json!(["a"]))).into_predicate())]);
        let (condition, params) = set.render_parameterized();
        assert_eq!(condition, "tags = ?");
        assert_eq!(params, vec![Value::from("[\"a\"]")]);
        assert_eq!(set.render_inlined(), "tags = '[\\\"a\\\"]'");
    }

    #[test]
    fn test_trailing_raw_alone() {
        let mut set = PredicateSet::new();
        set.set_raw("id > 3");
        assert!(!set.is_empty());
        assert_eq!(set.render_inlined(), "id > 3");
    }
}
