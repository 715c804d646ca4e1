//! Property-based tests for the lattices
//!
//! Uses both quickcheck and proptest: merge must be a join for the
//! property-set domain and for entity maps over it, under both missing
//! entry policies. The fixpoint over these lattices must terminate on
//! arbitrary graphs with back-edges.

mod common;

use codegraph_dataflow::features::lattice::laws::{check_map_laws, check_value_laws};
use codegraph_dataflow::features::property_set::PropertySetDomain;
use codegraph_dataflow::{
    AbstractValueDomain, AnalysisEntity, BlockId, EntityMap, LatticeOrdering, MapAbstractDomain,
    MissingEntryPolicy, Procedure, ProcedureSymbol, PropertySetValue,
};
use common::*;
use proptest::prelude::*;
use quickcheck::{Arbitrary, Gen, TestResult};
use quickcheck_macros::quickcheck;
use std::collections::HashSet;
use std::sync::Arc;

const ALL_VALUES: [PropertySetValue; 5] = [
    PropertySetValue::NotApplicable,
    PropertySetValue::Unflagged,
    PropertySetValue::Flagged,
    PropertySetValue::MaybeFlagged,
    PropertySetValue::Unknown,
];

const POLICIES: [MissingEntryPolicy; 2] =
    [MissingEntryPolicy::CarryThrough, MissingEntryPolicy::DropUnknown];

// ============================================================================
// QuickCheck
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct AnyValue(PropertySetValue);

impl Arbitrary for AnyValue {
    fn arbitrary(g: &mut Gen) -> Self {
        AnyValue(*g.choose(&ALL_VALUES).unwrap())
    }
}

/// Entity map over a small universe of locals so keys collide often
#[derive(Debug, Clone)]
struct AnyMap(Vec<(u8, AnyValue)>);

impl AnyMap {
    fn to_map(&self) -> EntityMap<PropertySetValue> {
        self.0
            .iter()
            .map(|(name, value)| (AnalysisEntity::local(format!("v{}", name % 4)), value.0))
            .collect()
    }
}

impl Arbitrary for AnyMap {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 6;
        AnyMap((0..len).map(|_| (u8::arbitrary(g), AnyValue::arbitrary(g))).collect())
    }
}

#[quickcheck]
fn qc_merge_is_commutative(a: AnyValue, b: AnyValue) -> bool {
    let domain = PropertySetDomain;
    domain.merge(&a.0, &b.0) == domain.merge(&b.0, &a.0)
}

#[quickcheck]
fn qc_merge_is_associative(a: AnyValue, b: AnyValue, c: AnyValue) -> bool {
    let domain = PropertySetDomain;
    let left = domain.merge(&domain.merge(&a.0, &b.0), &c.0);
    let right = domain.merge(&a.0, &domain.merge(&b.0, &c.0));
    left == right
}

#[quickcheck]
fn qc_unknown_absorbs(a: AnyValue) -> bool {
    let domain = PropertySetDomain;
    domain.merge(&a.0, &domain.unknown()) == domain.unknown()
}

#[quickcheck]
fn qc_distinct_tracked_states_merge_to_maybe(a: AnyValue, b: AnyValue) -> TestResult {
    if !a.0.is_tracked() || !b.0.is_tracked() || a.0 == b.0 {
        return TestResult::discard();
    }
    TestResult::from_bool(PropertySetDomain.merge(&a.0, &b.0) == PropertySetValue::MaybeFlagged)
}

#[quickcheck]
fn qc_map_merge_is_an_upper_bound(a: AnyMap, b: AnyMap) -> bool {
    let domain = PropertySetDomain;
    let (a, b) = (a.to_map(), b.to_map());
    POLICIES.iter().all(|policy| {
        let maps = MapAbstractDomain::new(&domain, *policy);
        let merged = maps.merge(&a, &b);
        maps.compare(&a, &merged).is_le() && maps.compare(&b, &merged).is_le()
    })
}

#[quickcheck]
fn qc_map_laws_hold(samples: Vec<AnyMap>) -> TestResult {
    if samples.len() > 6 {
        return TestResult::discard();
    }
    let domain = PropertySetDomain;
    let samples: Vec<_> = samples.iter().map(AnyMap::to_map).collect();
    TestResult::from_bool(POLICIES.iter().all(|policy| {
        check_map_laws(&MapAbstractDomain::new(&domain, *policy), &samples).is_ok()
    }))
}

// ============================================================================
// Proptest
// ============================================================================

fn value_strategy() -> impl Strategy<Value = PropertySetValue> {
    prop_oneof![
        Just(PropertySetValue::NotApplicable),
        Just(PropertySetValue::Unflagged),
        Just(PropertySetValue::Flagged),
        Just(PropertySetValue::MaybeFlagged),
        Just(PropertySetValue::Unknown),
    ]
}

proptest! {
    #[test]
    fn prop_value_laws(samples in prop::collection::vec(value_strategy(), 0..8)) {
        prop_assert_eq!(check_value_laws(&PropertySetDomain, &samples), Ok(()));
    }

    #[test]
    fn prop_merge_all_matches_fold(values in prop::collection::vec(value_strategy(), 1..8)) {
        let domain = PropertySetDomain;
        let folded = values[1..]
            .iter()
            .fold(values[0], |acc, v| domain.merge(&acc, v));
        prop_assert_eq!(domain.merge_all(values.iter()), Some(folded));
    }

    #[test]
    fn prop_compare_is_antisymmetric(a in value_strategy(), b in value_strategy()) {
        let domain = PropertySetDomain;
        let forward = domain.compare(&a, &b);
        let backward = domain.compare(&b, &a);
        let consistent = match forward {
            LatticeOrdering::Less => backward == LatticeOrdering::Greater,
            LatticeOrdering::Greater => backward == LatticeOrdering::Less,
            LatticeOrdering::Equal => backward == LatticeOrdering::Equal && a == b,
            LatticeOrdering::Incomparable => backward == LatticeOrdering::Incomparable,
        };
        prop_assert!(consistent, "compare({:?}, {:?}) = {:?} but reverse = {:?}", a, b, forward, backward);
    }

    #[test]
    fn prop_hazardous_values_are_tracked(v in value_strategy()) {
        prop_assert!(!v.is_hazardous() || v.is_tracked());
    }
}

// ============================================================================
// Fixpoint termination
// ============================================================================

/// Longest strictly increasing chain among the five property-set values
const VALUE_HEIGHT: usize = 4;

#[derive(Debug, Clone, Copy)]
enum Statement {
    Nothing,
    GuardSafe,
    GuardNull,
    Deserialize,
}

#[derive(Debug, Clone, Copy)]
enum Terminator {
    /// Target index: 0 is the exit block, `i` is body block `i - 1`
    Goto(usize),
    /// `if (flag)`
    OnFlag(usize, usize),
    /// `if (s.Binder == null)`
    OnNullGuard(usize, usize),
}

fn statement_strategy() -> impl Strategy<Value = Statement> {
    prop_oneof![
        Just(Statement::Nothing),
        Just(Statement::GuardSafe),
        Just(Statement::GuardNull),
        Just(Statement::Deserialize),
    ]
}

fn terminator_strategy() -> impl Strategy<Value = Terminator> {
    prop_oneof![
        any::<usize>().prop_map(Terminator::Goto),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Terminator::OnFlag(a, b)),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Terminator::OnNullGuard(a, b)),
    ]
}

/// `s = new Serializer()` in the entry block, then `blocks` in a graph whose
/// edges may point backwards
fn random_procedure(graph: u64, blocks: &[(Statement, Terminator)]) -> Arc<Procedure> {
    let symbol = ProcedureSymbol::method(format!("Gen.P{graph}"), &["flag"], false);
    let mut p = ProcedureBuilder::new(graph, symbol);
    let body: Vec<BlockId> = (0..blocks.len()).map(|_| p.cfg().add_block()).collect();
    let exit = p.cfg().exit();
    let entry = p.cfg().entry();
    let target = |index: usize| match index % (body.len() + 1) {
        0 => exit,
        i => body[i - 1],
    };

    p.create_tracked(entry, "s");
    p.cfg().goto(entry, body[0]);

    for (&block, &(statement, terminator)) in body.iter().zip(blocks) {
        match statement {
            Statement::Nothing => {}
            Statement::GuardSafe => p.set_guard(block, "s", true),
            Statement::GuardNull => p.set_guard(block, "s", false),
            Statement::Deserialize => {
                p.call_hazardous(block, "s");
            }
        }

        let cfg = p.cfg();
        match terminator {
            Terminator::Goto(to) => cfg.goto(block, target(to)),
            Terminator::OnFlag(when_true, when_false) => {
                let flag = cfg.ops().param(0, "flag");
                cfg.branch(block, flag, target(when_true), target(when_false));
            }
            Terminator::OnNullGuard(when_true, when_false) => {
                let ops = cfg.ops();
                let s = ops.local("s");
                let guard = ops.field(s, GUARD_FIELD);
                let null = ops.null();
                let condition = ops.eq(guard, null);
                cfg.branch(block, condition, target(when_true), target(when_false));
            }
        }
    }
    p.build()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_fixpoint_terminates_within_lattice_height(
        blocks in prop::collection::vec((statement_strategy(), terminator_strategy()), 1..10),
        predicates in any::<bool>(),
    ) {
        let procedure = random_procedure(blocks.len() as u64, &blocks);
        let analyzer = analyzer_with(balanced().with_predicate_analysis(predicates));
        let report = analyzer.analyze(Arc::clone(&procedure));
        prop_assert!(report.is_ok(), "{:?}", report.err());
        let report = report.unwrap();

        // Height of the state lattice: every tracked entity and predicate
        // can rise VALUE_HEIGHT times
        let mut entities = HashSet::new();
        let mut predicate_count = 0;
        for snapshot in report.result.snapshots() {
            for data in [&snapshot.input, &snapshot.output] {
                entities.extend(data.core().keys().cloned());
                predicate_count = predicate_count.max(data.predicate_count());
            }
        }
        let state_height = VALUE_HEIGHT * (entities.len() + predicate_count);

        // Each block is queued once, then at most once per change of a
        // predecessor's output; a block has at most two successors
        let stats = report.stats;
        let bound = stats.reachable_blocks * (1 + 2 * (state_height + 1));
        prop_assert!(
            stats.block_visits <= bound,
            "{} visits over {} reachable blocks exceed {}",
            stats.block_visits,
            stats.reachable_blocks,
            bound
        );
        prop_assert!(stats.block_visits >= stats.reachable_blocks);
    }
}
