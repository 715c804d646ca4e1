//! Performance benchmarks for the dataflow engine
//!
//! - Fixpoint over chains of diamonds (merge cost)
//! - Nested loops (revisit cost)
//! - Cached vs uncached analysis of the same procedure
//! - Interprocedural calls through a registry

use codegraph_dataflow::config::{DataflowConfig, Preset};
use codegraph_dataflow::features::flow_graph::MethodRef;
use codegraph_dataflow::features::points_to::AllocationSiteAnalysis;
use codegraph_dataflow::features::property_set::HazardousUsageRule;
use codegraph_dataflow::{
    BlockId, CfgBuilder, GraphId, Procedure, ProcedureRegistry, ProcedureSymbol,
    PropertySetAnalyzer,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

fn rule() -> HazardousUsageRule {
    HazardousUsageRule::new("insecure-deserializer", "Serializer", "Binder", &["Deserialize"])
}

fn uncached(config: DataflowConfig) -> PropertySetAnalyzer {
    PropertySetAnalyzer::new(rule(), config.with_cache_enabled(false)).unwrap()
}

fn finish(cfg: CfgBuilder, symbol: ProcedureSymbol) -> Arc<Procedure> {
    let graph = cfg.build().unwrap();
    let points_to = AllocationSiteAnalysis::new().analyze(&graph);
    Arc::new(Procedure::new(symbol, graph).with_points_to(Arc::new(points_to)))
}

fn create_serializer(cfg: &mut CfgBuilder, block: BlockId, local: &str) {
    let ops = cfg.ops();
    let target = ops.local(local);
    let create = ops.new_object("Serializer", vec![]);
    let assign = ops.assign(target, create);
    cfg.push(block, assign);
}

fn set_guard(cfg: &mut CfgBuilder, block: BlockId, local: &str, safe: bool) {
    let ops = cfg.ops();
    let instance = ops.local(local);
    let field = ops.field(instance, "Binder");
    let value = if safe { ops.new_object("Binder", vec![]) } else { ops.null() };
    let assign = ops.assign(field, value);
    cfg.push(block, assign);
}

fn deserialize(cfg: &mut CfgBuilder, block: BlockId, local: &str) {
    let ops = cfg.ops();
    let receiver = ops.local(local);
    let call = ops.call(Some(receiver), MethodRef::method("Serializer", "Deserialize"), vec![]);
    cfg.push(block, call);
}

/// `n` sequential if/else diamonds, each touching the guard
fn diamonds(n: usize) -> Arc<Procedure> {
    let mut cfg = CfgBuilder::new(GraphId(n as u64));
    let mut current = cfg.entry();
    create_serializer(&mut cfg, current, "s");
    for i in 0..n {
        let then_block = cfg.add_block();
        let else_block = cfg.add_block();
        let join = cfg.add_block();
        let flag = cfg.ops().param(0, "flag");
        cfg.branch(current, flag, then_block, else_block);
        set_guard(&mut cfg, then_block, "s", i % 2 == 0);
        set_guard(&mut cfg, else_block, "s", i % 2 == 1);
        cfg.goto(then_block, join);
        cfg.goto(else_block, join);
        deserialize(&mut cfg, join, "s");
        current = join;
    }
    let exit = cfg.exit();
    cfg.goto(current, exit);
    finish(cfg, ProcedureSymbol::method(format!("Bench.Diamonds{n}"), &["flag"], false))
}

/// `depth` nested while loops around a guard update
fn nested_loops(depth: usize) -> Arc<Procedure> {
    let depth = depth.max(1);
    let mut cfg = CfgBuilder::new(GraphId(1_000 + depth as u64));
    let entry = cfg.entry();
    create_serializer(&mut cfg, entry, "s");

    let headers: Vec<BlockId> = (0..depth).map(|_| cfg.add_block()).collect();
    let body = cfg.add_block();
    let exit = cfg.exit();
    deserialize(&mut cfg, body, "s");
    set_guard(&mut cfg, body, "s", true);

    // Header i enters header i + 1 (or the body) and leaves to header i - 1
    cfg.goto(entry, headers[0]);
    for (level, header) in headers.iter().enumerate() {
        let enter = headers.get(level + 1).copied().unwrap_or(body);
        let leave = if level == 0 { exit } else { headers[level - 1] };
        let flag = cfg.ops().param(0, "flag");
        cfg.branch(*header, flag, enter, leave);
    }
    cfg.goto(body, headers[depth - 1]);
    finish(cfg, ProcedureSymbol::method(format!("Bench.Loops{depth}"), &["flag"], false))
}

// ============================================================================
// Fixpoint
// ============================================================================

fn bench_diamond_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("diamond_chain");
    let analyzer = uncached(DataflowConfig::preset(Preset::Balanced));

    for n in [1usize, 10, 50, 200] {
        let procedure = diamonds(n);
        group.throughput(Throughput::Elements(procedure.graph.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &procedure, |b, procedure| {
            b.iter(|| black_box(analyzer.analyze(Arc::clone(procedure)).unwrap()));
        });
    }

    group.finish();
}

fn bench_nested_loops(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_loops");
    let analyzer = uncached(DataflowConfig::preset(Preset::Balanced));

    for depth in [1usize, 4, 16] {
        let procedure = nested_loops(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &procedure, |b, procedure| {
            b.iter(|| black_box(analyzer.analyze(Arc::clone(procedure)).unwrap()));
        });
    }

    group.finish();
}

fn bench_predicate_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("predicate_analysis");
    let procedure = diamonds(50);

    for enabled in [false, true] {
        let config = DataflowConfig::preset(Preset::Balanced).with_predicate_analysis(enabled);
        let analyzer = uncached(config);
        group.bench_with_input(BenchmarkId::from_parameter(enabled), &procedure, |b, procedure| {
            b.iter(|| black_box(analyzer.analyze(Arc::clone(procedure)).unwrap()));
        });
    }

    group.finish();
}

// ============================================================================
// Cache
// ============================================================================

fn bench_cache_hit(c: &mut Criterion) {
    let procedure = diamonds(50);
    let analyzer = PropertySetAnalyzer::new(rule(), DataflowConfig::default()).unwrap();
    analyzer.analyze(Arc::clone(&procedure)).unwrap();

    c.bench_function("cache_hit", |b| {
        b.iter(|| black_box(analyzer.analyze(Arc::clone(&procedure)).unwrap()));
    });
}

// ============================================================================
// Interprocedural
// ============================================================================

fn bench_interprocedural(c: &mut Criterion) {
    // Helper.Secure(p) { p.Binder = new Binder(); }
    let mut cfg = CfgBuilder::new(GraphId(5_000));
    let body = cfg.add_block();
    let exit = cfg.exit();
    cfg.goto(cfg.entry(), body);
    cfg.goto(body, exit);
    let ops = cfg.ops();
    let param = ops.param(0, "p");
    let field = ops.field(param, "Binder");
    let binder = ops.new_object("Binder", vec![]);
    let assign = ops.assign(field, binder);
    cfg.push(body, assign);
    let secure = finish(cfg, ProcedureSymbol::method("Helper.Secure", &["p"], false));

    let registry = Arc::new(ProcedureRegistry::new());
    registry.register_arc(secure);

    let mut group = c.benchmark_group("interprocedural");
    for calls in [1usize, 10, 50] {
        let mut cfg = CfgBuilder::new(GraphId(5_001 + calls as u64));
        let body = cfg.add_block();
        let exit = cfg.exit();
        cfg.goto(cfg.entry(), body);
        cfg.goto(body, exit);
        for i in 0..calls {
            let local = format!("s{i}");
            create_serializer(&mut cfg, body, &local);
            let argument = cfg.ops().local(local.as_str());
            let call = cfg.ops().call(None, MethodRef::method("Helper", "Secure"), vec![argument]);
            cfg.push(body, call);
            deserialize(&mut cfg, body, &local);
        }
        let caller = finish(cfg, ProcedureSymbol::method(format!("Bench.Calls{calls}"), &[], false));

        let analyzer = uncached(DataflowConfig::preset(Preset::Balanced)).with_resolver(registry.clone());
        group.bench_with_input(BenchmarkId::from_parameter(calls), &caller, |b, caller| {
            b.iter(|| black_box(analyzer.analyze(Arc::clone(caller)).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(fixpoint_benches, bench_diamond_chain, bench_nested_loops, bench_predicate_analysis);
criterion_group!(cache_benches, bench_cache_hit);
criterion_group!(interprocedural_benches, bench_interprocedural);

criterion_main!(fixpoint_benches, cache_benches, interprocedural_benches);
