//! Declarative matching over entities and raw telemetry fragments.
//!
//! - [`match_objects`] - string, wildcard, regex and boolean matching at one or more paths
//! - [`threshold_test`] - numeric comparison against a literal or a per-object path
//! - [`match_test`] - boolean tree of the two, evaluated on a shrinking working set
//!
//! A test tree is usually loaded from JSON:
//!
//! ```json
//! [
//!   { "k": "fibrechannel/operational-status", "t": "==", "v": 2 },
//!   { "logic": "or", "l": [
//!       { "k": "fibrechannel/port-type", "t": "exact", "v": "e-port" },
//!       { "k": "fibrechannel/user-friendly-name", "t": "wild", "v": "isl*", "i": true }
//!   ] }
//! ]
//! ```

use crate::entity::{Entity, EntityKind};
use crate::error::{FcdbError, FcdbResult};
use crate::node::{Node, Scalar};
use crate::project::Project;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Something a path can be looked up on.
pub trait Queryable {
    fn query_value(&self, path: &str) -> Option<Cow<'_, Node>>;
}

impl<T: Entity + ?Sized> Queryable for T {
    fn query_value(&self, path: &str) -> Option<Cow<'_, Node>> {
        self.get(path)
    }
}

impl Queryable for Node {
    fn query_value(&self, path: &str) -> Option<Cow<'_, Node>> {
        self.lookup(path).map(Cow::Borrowed)
    }
}

/// String match kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MatchKind {
    Exact,
    /// Shell style wildcard: `*`, `?`, `[seq]`, `[!seq]`. Matches the whole string.
    Wild,
    /// Regex anchored at the start of the string.
    RegexMatch,
    /// Regex anywhere in the string.
    RegexSearch,
    Bool,
}

impl MatchKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Wild => "wild",
            MatchKind::RegexMatch => "regex-m",
            MatchKind::RegexSearch => "regex-s",
            MatchKind::Bool => "bool",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchKind {
    type Err = FcdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(MatchKind::Exact),
            "wild" | "wildcard" => Ok(MatchKind::Wild),
            "regex-m" | "regexm" | "regex_m" => Ok(MatchKind::RegexMatch),
            "regex-s" | "regexs" | "regex_s" => Ok(MatchKind::RegexSearch),
            "bool" => Ok(MatchKind::Bool),
            _ => Err(FcdbError::user("t", format!("unknown match type '{}'", s))),
        }
    }
}

impl TryFrom<String> for MatchKind {
    type Error = FcdbError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MatchKind> for String {
    fn from(k: MatchKind) -> Self {
        k.as_str().to_string()
    }
}

/// Numeric comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThresholdOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl ThresholdOp {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ThresholdOp::Gt => ">",
            ThresholdOp::Lt => "<",
            ThresholdOp::Ge => ">=",
            ThresholdOp::Le => "<=",
            ThresholdOp::Eq => "==",
            ThresholdOp::Ne => "!=",
        }
    }

    pub fn apply(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            ThresholdOp::Gt => lhs > rhs,
            ThresholdOp::Lt => lhs < rhs,
            ThresholdOp::Ge => lhs >= rhs,
            ThresholdOp::Le => lhs <= rhs,
            ThresholdOp::Eq => lhs == rhs,
            ThresholdOp::Ne => lhs != rhs,
        }
    }
}

impl fmt::Display for ThresholdOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThresholdOp {
    type Err = FcdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(ThresholdOp::Gt),
            "<" => Ok(ThresholdOp::Lt),
            ">=" => Ok(ThresholdOp::Ge),
            "<=" => Ok(ThresholdOp::Le),
            "==" | "=" => Ok(ThresholdOp::Eq),
            "!=" => Ok(ThresholdOp::Ne),
            _ => Err(FcdbError::user("t", format!("unknown comparison '{}'", s))),
        }
    }
}

/// Right hand side of a threshold test.
#[derive(Debug, Clone, PartialEq)]
pub enum Threshold {
    Literal(f64),
    /// Looked up on the same object as the left hand side.
    Path(String),
}

/// Composition of the tests in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    #[default]
    And,
    Or,
    Nand,
    Nor,
}

/// Test type of a leaf test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TestKind {
    Match(MatchKind),
    Threshold(ThresholdOp),
}

impl TryFrom<String> for TestKind {
    type Error = FcdbError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.parse::<ThresholdOp>() {
            Ok(op) => Ok(TestKind::Threshold(op)),
            Err(_) => s.parse::<MatchKind>().map(TestKind::Match),
        }
    }
}

impl From<TestKind> for String {
    fn from(k: TestKind) -> Self {
        match k {
            TestKind::Match(m) => m.as_str().to_string(),
            TestKind::Threshold(op) => op.as_str().to_string(),
        }
    }
}

/// Paths tested by a leaf; several paths are OR'd.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeySpec {
    One(String),
    Many(Vec<String>),
}

impl KeySpec {
    pub fn paths(&self) -> Vec<&str> {
        match self {
            KeySpec::One(p) => vec![p.as_str()],
            KeySpec::Many(ps) => ps.iter().map(String::as_str).collect(),
        }
    }
}

/// Value of a leaf test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Terms(Vec<String>),
}

/// One node of a test tree: a leaf test (`k`, `t`, `v`) or a group (`l`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TestNode {
    /// Comments the test out.
    #[serde(default)]
    pub skip: bool,
    #[serde(default, rename = "l", alias = "group", skip_serializing_if = "Option::is_none")]
    pub group: Option<Vec<TestNode>>,
    /// Logic applied to the members of `group`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<Logic>,
    #[serde(default, rename = "k", alias = "key", skip_serializing_if = "Option::is_none")]
    pub key: Option<KeySpec>,
    #[serde(default, rename = "t", alias = "test", skip_serializing_if = "Option::is_none")]
    pub test: Option<TestKind>,
    #[serde(default, rename = "v", alias = "value", skip_serializing_if = "Option::is_none")]
    pub value: Option<TestValue>,
    #[serde(default, rename = "i", alias = "ignore_case")]
    pub ignore_case: bool,
}

impl TestNode {
    /// Leaf test.
    pub fn leaf(key: impl Into<String>, test: TestKind, value: TestValue) -> Self {
        Self {
            key: Some(KeySpec::One(key.into())),
            test: Some(test),
            value: Some(value),
            ..Self::default()
        }
    }

    /// Group of tests combined with `logic`.
    pub fn group(logic: Logic, tests: Vec<TestNode>) -> Self {
        Self {
            group: Some(tests),
            logic: Some(logic),
            ..Self::default()
        }
    }

    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }
}

/// Parses a test tree: a single node or a list of nodes.
pub fn parse_tests(json: &str) -> FcdbResult<Vec<TestNode>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Box<TestNode>),
        Many(Vec<TestNode>),
    }

    match serde_json::from_str::<OneOrMany>(json)? {
        OneOrMany::One(node) => Ok(vec![*node]),
        OneOrMany::Many(nodes) => Ok(nodes),
    }
}

/// Match term of a leaf test.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Str(String),
    Bool(bool),
}

enum Matcher {
    Exact(Vec<String>),
    Pattern(Vec<Regex>),
    Bool(Vec<bool>),
}

impl Matcher {
    fn compile(terms: &[Term], kind: MatchKind, ignore_case: bool) -> FcdbResult<Self> {
        if kind == MatchKind::Bool {
            return Ok(Matcher::Bool(
                terms
                    .iter()
                    .filter_map(|t| match t {
                        Term::Bool(b) => Some(*b),
                        Term::Str(_) => None,
                    })
                    .collect(),
            ));
        }
        let strings = terms.iter().filter_map(|t| match t {
            Term::Str(s) => Some(s.as_str()),
            Term::Bool(_) => None,
        });
        match kind {
            MatchKind::Exact => Ok(Matcher::Exact(
                strings
                    .map(|s| if ignore_case { s.to_lowercase() } else { s.to_string() })
                    .collect(),
            )),
            _ => strings
                .map(|s| {
                    let pattern = match kind {
                        MatchKind::Wild => wildcard_to_regex(s),
                        MatchKind::RegexMatch => format!("^(?:{})", s),
                        _ => s.to_string(),
                    };
                    RegexBuilder::new(&pattern)
                        .case_insensitive(ignore_case)
                        .build()
                        .map_err(|e| FcdbError::user("v", format!("invalid pattern '{}': {}", s, e)))
                })
                .collect::<FcdbResult<Vec<_>>>()
                .map(Matcher::Pattern),
        }
    }

    fn matches_str(&self, s: &str, ignore_case: bool) -> bool {
        match self {
            Matcher::Exact(terms) => {
                if ignore_case {
                    let s = s.to_lowercase();
                    terms.iter().any(|t| *t == s)
                } else {
                    terms.iter().any(|t| t == s)
                }
            }
            Matcher::Pattern(res) => res.iter().any(|re| re.is_match(s)),
            Matcher::Bool(_) => false,
        }
    }

    /// Any leaf at or below `node` matches.
    fn matches_node(&self, node: &Node, ignore_case: bool) -> bool {
        match node {
            Node::Scalar(Scalar::Str(s)) => self.matches_str(s, ignore_case),
            Node::Scalar(Scalar::Bool(b)) => match self {
                Matcher::Bool(terms) => terms.contains(b),
                _ => false,
            },
            Node::Scalar(_) => false,
            Node::List(items) => items.iter().any(|n| self.matches_node(n, ignore_case)),
            Node::Map(map) => map.values().any(|n| self.matches_node(n, ignore_case)),
        }
    }
}

/// Converts a shell wildcard to an anchored regex.
fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                let mut class = String::new();
                let mut closed = false;
                if chars.peek() == Some(&'!') {
                    chars.next();
                    class.push('^');
                }
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    if c == '\\' || c == '[' || c == '^' {
                        class.push('\\');
                    }
                    class.push(c);
                }
                if closed {
                    out.push('[');
                    out.push_str(&class);
                    out.push(']');
                } else {
                    out.push_str(&regex::escape("["));
                    out.push_str(&regex::escape(class.trim_start_matches('^')));
                }
            }
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}

/// Identity of an object in a working set.
fn addr<T: ?Sized>(obj: &T) -> usize {
    obj as *const T as *const () as usize
}

/// Returns the objects with at least one leaf matching any term at any path.
///
/// Matching descends through nested lists and maps. Each object is returned
/// at most once, in input order.
pub fn match_objects<'a, T: Queryable + ?Sized>(
    objects: &[&'a T],
    paths: &[&str],
    terms: &[Term],
    ignore_case: bool,
    kind: MatchKind,
) -> FcdbResult<Vec<&'a T>> {
    let matcher = Matcher::compile(terms, kind, ignore_case)?;
    let mut seen: HashSet<usize> = HashSet::with_capacity(objects.len());
    let mut out: Vec<&'a T> = Vec::new();
    for obj in objects {
        if !seen.insert(addr(*obj)) {
            continue;
        }
        let hit = paths.iter().any(|path| {
            obj.query_value(path)
                .map_or(false, |v| matcher.matches_node(&v, ignore_case))
        });
        if hit {
            out.push(*obj);
        }
    }
    Ok(out)
}

/// Returns the objects whose numeric value at `path` satisfies `op value`.
///
/// Objects where either side is absent or not numeric are excluded.
pub fn threshold_test<'a, T: Queryable + ?Sized>(
    objects: &[&'a T],
    path: &str,
    op: ThresholdOp,
    value: &Threshold,
) -> Vec<&'a T> {
    objects
        .iter()
        .filter(|obj| {
            let lhs = obj.query_value(path).and_then(|v| v.as_f64());
            let rhs = match value {
                Threshold::Literal(v) => Some(*v),
                Threshold::Path(p) => obj.query_value(p).and_then(|v| v.as_f64()),
            };
            matches!((lhs, rhs), (Some(l), Some(r)) if op.apply(l, r))
        })
        .copied()
        .collect()
}

fn eval_leaf<'a, T: Queryable + ?Sized>(
    objects: &[&'a T],
    key: &KeySpec,
    test: TestKind,
    value: &TestValue,
    ignore_case: bool,
) -> FcdbResult<Vec<&'a T>> {
    match test {
        TestKind::Match(kind) => {
            let terms = match value {
                TestValue::Bool(b) => vec![Term::Bool(*b)],
                TestValue::Str(s) => vec![Term::Str(s.clone())],
                TestValue::Terms(ts) => ts.iter().cloned().map(Term::Str).collect(),
                TestValue::Int(_) | TestValue::Float(_) => {
                    return Err(FcdbError::user(
                        "v",
                        format!("a number cannot be used with '{}'", kind),
                    ))
                }
            };
            match_objects(objects, &key.paths(), &terms, ignore_case, kind)
        }
        TestKind::Threshold(op) => {
            let threshold = match value {
                TestValue::Int(i) => Threshold::Literal(*i as f64),
                TestValue::Float(f) => Threshold::Literal(*f),
                TestValue::Str(p) => Threshold::Path(p.clone()),
                TestValue::Bool(_) | TestValue::Terms(_) => {
                    return Err(FcdbError::user(
                        "v",
                        format!("'{}' requires a number or a path", op),
                    ))
                }
            };
            let mut hits: HashSet<usize> = HashSet::new();
            for path in key.paths() {
                hits.extend(threshold_test(objects, path, op, &threshold).into_iter().map(addr));
            }
            let mut emitted: HashSet<usize> = HashSet::with_capacity(hits.len());
            Ok(objects
                .iter()
                .filter(|o| hits.contains(&addr(**o)) && emitted.insert(addr(**o)))
                .copied()
                .collect())
        }
    }
}

/// Evaluates a test tree against `objects`.
///
/// The tests of a group run in order against a working set that starts as
/// `objects`:
/// - `and` replaces the working set with each test's matches
/// - `or` accumulates each test's matches against the unchanged working set
/// - `nand` and `nor` remove each test's matches from the working set
///
/// Evaluation stops as soon as the working set is empty. Skipped tests are
/// ignored.
pub fn match_test<'a, T: Queryable + ?Sized>(
    objects: &[&'a T],
    tests: &[TestNode],
    logic: Logic,
) -> FcdbResult<Vec<&'a T>> {
    let mut working: Vec<&'a T> = objects.to_vec();
    let mut accum: Vec<&'a T> = Vec::new();
    let mut accum_seen: HashSet<usize> = HashSet::new();

    for test in tests {
        if working.is_empty() {
            break;
        }
        if test.skip {
            continue;
        }
        let matched = match (&test.group, &test.key, test.test, &test.value) {
            (Some(group), None, None, None) => {
                match_test(&working, group, test.logic.unwrap_or_default())?
            }
            (None, Some(key), Some(kind), Some(value)) => {
                eval_leaf(&working, key, kind, value, test.ignore_case)?
            }
            _ => {
                return Err(FcdbError::user(
                    "test",
                    "a test needs either 'l' or all of 'k', 't' and 'v'",
                ))
            }
        };
        trace!(?logic, matched = matched.len(), working = working.len(), "test evaluated");

        match logic {
            Logic::And => working = matched,
            Logic::Nand | Logic::Nor => {
                let removed: HashSet<usize> = matched.iter().map(|o| addr(*o)).collect();
                working.retain(|o| !removed.contains(&addr(*o)));
            }
            Logic::Or => {
                for o in matched {
                    if accum_seen.insert(addr(o)) {
                        accum.push(o);
                    }
                }
            }
        }
    }

    if logic == Logic::Or {
        working = accum;
    }
    Ok(working)
}

/// Every entity of `kind` in the project.
pub fn entities_of_kind(project: &Project, kind: EntityKind) -> Vec<&dyn Entity> {
    let mut out: Vec<&dyn Entity> = Vec::new();
    match kind {
        EntityKind::Project => out.push(project),
        EntityKind::Chassis => out.extend(project.chassis.values().map(|e| e as &dyn Entity)),
        EntityKind::Switch => out.extend(project.switches.values().map(|e| e as &dyn Entity)),
        EntityKind::Port => {
            for s in project.switches.values() {
                out.extend(s.ports.values().map(|e| e as &dyn Entity));
                out.extend(s.ge_ports.values().map(|e| e as &dyn Entity));
            }
        }
        EntityKind::Fabric => out.extend(project.fabrics.values().map(|e| e as &dyn Entity)),
        EntityKind::Iocp => out.extend(project.iocps.values().map(|e| e as &dyn Entity)),
        _ => {
            for f in project.fabrics.values() {
                match kind {
                    EntityKind::Zone => {
                        out.extend(f.zones.values().map(|e| e as &dyn Entity));
                        out.extend(f.eff_zones.values().map(|e| e as &dyn Entity));
                    }
                    EntityKind::ZoneCfg => out.extend(f.zonecfgs.values().map(|e| e as &dyn Entity)),
                    EntityKind::Alias => out.extend(f.aliases.values().map(|e| e as &dyn Entity)),
                    EntityKind::Login => out.extend(f.logins.values().map(|e| e as &dyn Entity)),
                    EntityKind::FdmiNode => {
                        out.extend(f.fdmi_nodes.values().map(|e| e as &dyn Entity))
                    }
                    EntityKind::FdmiPort => {
                        out.extend(f.fdmi_ports.values().map(|e| e as &dyn Entity))
                    }
                    _ => {}
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ports() -> Vec<Node> {
        vec![
            Node::from(json!({"name": "0/1", "type": "e-port", "speed": 32, "max": 32, "on": true,
                              "tags": ["isl", "core"]})),
            Node::from(json!({"name": "0/2", "type": "f-port", "speed": 16, "max": 32, "on": true,
                              "tags": {"role": "Host"}})),
            Node::from(json!({"name": "0/3", "type": "f-port", "speed": 8, "max": 16, "on": false})),
            Node::from(json!({"name": "1/1", "type": "e-port", "speed": 4, "max": 32, "on": false,
                              "tags": [["nested", "HOST"]]})),
        ]
    }

    fn names(objs: &[&Node]) -> Vec<String> {
        objs.iter()
            .map(|o| o.lookup("name").and_then(Node::as_str).unwrap_or("").to_string())
            .collect()
    }

    fn s(v: &str) -> Term {
        Term::Str(v.to_string())
    }

    #[test]
    fn test_match_kinds() {
        let data = ports();
        let objs: Vec<&Node> = data.iter().collect();

        let r = match_objects(&objs, &["type"], &[s("e-port")], false, MatchKind::Exact).unwrap();
        assert_eq!(names(&r), vec!["0/1", "1/1"]);

        let r = match_objects(&objs, &["name"], &[s("0/?")], false, MatchKind::Wild).unwrap();
        assert_eq!(names(&r), vec!["0/1", "0/2", "0/3"]);

        let r = match_objects(&objs, &["name"], &[s("[!0]*")], false, MatchKind::Wild).unwrap();
        assert_eq!(names(&r), vec!["1/1"]);

        // regex-m anchors at the start, regex-s does not.
        let r = match_objects(&objs, &["type"], &[s("port")], false, MatchKind::RegexMatch).unwrap();
        assert!(r.is_empty());
        let r = match_objects(&objs, &["type"], &[s("port")], false, MatchKind::RegexSearch).unwrap();
        assert_eq!(r.len(), 4);

        let r = match_objects(&objs, &["on"], &[Term::Bool(false)], false, MatchKind::Bool).unwrap();
        assert_eq!(names(&r), vec!["0/3", "1/1"]);
    }

    #[test]
    fn test_match_recurses_and_ignores_case() {
        let data = ports();
        let objs: Vec<&Node> = data.iter().collect();

        let r = match_objects(&objs, &["tags"], &[s("host")], false, MatchKind::Exact).unwrap();
        assert!(r.is_empty());
        let r = match_objects(&objs, &["tags"], &[s("host")], true, MatchKind::Exact).unwrap();
        assert_eq!(names(&r), vec!["0/2", "1/1"]);

        // Multiple paths and terms are OR'd.
        let r = match_objects(&objs, &["tags", "name"], &[s("core"), s("0/3")], false, MatchKind::Exact)
            .unwrap();
        assert_eq!(names(&r), vec!["0/1", "0/3"]);
    }

    #[test]
    fn test_match_dedupes_input() {
        let data = ports();
        let objs: Vec<&Node> = vec![&data[0], &data[0]];
        let r = match_objects(&objs, &["type"], &[s("e-port")], false, MatchKind::Exact).unwrap();
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn test_invalid_regex_is_user_error() {
        let data = ports();
        let objs: Vec<&Node> = data.iter().collect();
        let err = match_objects(&objs, &["name"], &[s("(")], false, MatchKind::RegexSearch).unwrap_err();
        assert!(matches!(err, FcdbError::User { .. }));
    }

    #[test]
    fn test_threshold_literal_and_path() {
        let data = ports();
        let objs: Vec<&Node> = data.iter().collect();

        let r = threshold_test(&objs, "speed", ThresholdOp::Ge, &Threshold::Literal(16.0));
        assert_eq!(names(&r), vec!["0/1", "0/2"]);
        let r = threshold_test(&objs, "speed", ThresholdOp::Lt, &Threshold::Path("max".into()));
        assert_eq!(names(&r), vec!["0/2", "0/3", "1/1"]);
        // Non-numeric values never compare.
        let r = threshold_test(&objs, "name", ThresholdOp::Ne, &Threshold::Literal(0.0));
        assert!(r.is_empty());
    }

    fn t1() -> TestNode {
        TestNode::leaf("type", TestKind::Match(MatchKind::Exact), TestValue::Str("e-port".into()))
    }

    fn t2() -> TestNode {
        TestNode::leaf("on", TestKind::Match(MatchKind::Bool), TestValue::Bool(true))
    }

    #[test]
    fn test_logic_truth_tables() {
        // T1 = {0/1, 1/1}, T2 = {0/1, 0/2}
        let data = ports();
        let objs: Vec<&Node> = data.iter().collect();
        let run = |logic| names(&match_test(&objs, &[t1(), t2()], logic).unwrap());

        assert_eq!(run(Logic::And), vec!["0/1"]);
        assert_eq!(run(Logic::Or), vec!["0/1", "1/1", "0/2"]);
        assert_eq!(run(Logic::Nor), vec!["0/3"]);
        assert_eq!(run(Logic::Nand), vec!["0/3"]);

        // Restricted to the working set passed in.
        let subset: Vec<&Node> = vec![&data[1], &data[3]];
        assert_eq!(names(&match_test(&subset, &[t1(), t2()], Logic::Or).unwrap()), vec!["1/1", "0/2"]);
        assert!(match_test(&subset, &[t1(), t2()], Logic::And).unwrap().is_empty());
    }

    #[test]
    fn test_nested_groups_and_skip() {
        let data = ports();
        let objs: Vec<&Node> = data.iter().collect();
        let mut skipped = t2();
        skipped.skip = true;
        let tests = vec![
            TestNode::leaf("speed", TestKind::Threshold(ThresholdOp::Lt), TestValue::Int(32)),
            skipped,
            TestNode::group(Logic::Or, vec![t1(), t2()]),
        ];
        assert_eq!(names(&match_test(&objs, &tests, Logic::And).unwrap()), vec!["1/1", "0/2"]);
    }

    #[test]
    fn test_parse_tests() {
        let tests = parse_tests(
            r#"[{"k": "speed", "t": ">=", "v": 16},
                {"logic": "nor", "l": [{"k": ["type"], "t": "regex-s", "v": "^f", "i": true}]}]"#,
        )
        .unwrap();
        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].test, Some(TestKind::Threshold(ThresholdOp::Ge)));
        assert_eq!(tests[1].logic, Some(Logic::Nor));

        let data = ports();
        let objs: Vec<&Node> = data.iter().collect();
        assert_eq!(names(&match_test(&objs, &tests, Logic::And).unwrap()), vec!["0/1"]);

        assert!(parse_tests(r#"{"k": "x", "t": "fuzzy", "v": "y"}"#).is_err());
        let incomplete = parse_tests(r#"{"k": "x"}"#).unwrap();
        assert!(match_test(&objs, &incomplete, Logic::And).is_err());
    }

    #[test]
    fn test_logic_over_large_working_set() {
        let data: Vec<Node> = (0..5000)
            .map(|i| Node::from(json!({"index": i, "even": i % 2 == 0, "high": i >= 4000})))
            .collect();
        let objs: Vec<&Node> = data.iter().collect();
        let even = TestNode::leaf("even", TestKind::Match(MatchKind::Bool), TestValue::Bool(true));
        let high = TestNode::leaf("high", TestKind::Match(MatchKind::Bool), TestValue::Bool(true));

        let either = match_test(&objs, &[even.clone(), high.clone()], Logic::Or).unwrap();
        assert_eq!(either.len(), 2500 + 500);

        let neither = match_test(&objs, &[even, high], Logic::Nand).unwrap();
        assert_eq!(neither.len(), 2000);
        assert!(neither.iter().all(|o| o.lookup("index").and_then(Node::as_f64).map_or(false, |i| i < 4000.0)));

        let mut both_paths =
            TestNode::leaf("index", TestKind::Threshold(ThresholdOp::Ge), TestValue::Int(4990));
        both_paths.key = Some(KeySpec::Many(vec!["index".into(), "index".into()]));
        let tail = match_test(&objs, &[both_paths], Logic::And).unwrap();
        assert_eq!(tail.len(), 10);
        assert!(std::ptr::eq(tail[0], &data[4990]));
    }

    #[test]
    fn test_wildcard_translation() {
        assert_eq!(wildcard_to_regex("a*b?.c"), r"^a.*b.\.c$");
        assert_eq!(wildcard_to_regex("[!ab]x"), "^[^ab]x$");
        assert_eq!(wildcard_to_regex("[ab"), r"^\[ab$");
    }
}
