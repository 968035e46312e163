use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use mrfvm_rs::coupling::continuity::ContinuityInterfaceBc;
use mrfvm_rs::coupling::{InterfaceBc, PartitionContext};
use mrfvm_rs::discretization::node_index::{FvmNode, NodeId, NodeIndex, RegionId};
use mrfvm_rs::system::serial::{SerialMatrix, SerialVector};
use mrfvm_rs::system::{SystemMatrix, SystemVector};

const U: usize = 2;
const REGIONS: usize = 3;

fn interface_sizes() -> Vec<usize> {
    vec![100, 1000]
}

/// `nodes` shared geometric nodes, each claimed by three regions.
fn build_problem(nodes: usize) -> (NodeIndex, ContinuityInterfaceBc, Vec<f64>, usize) {
    let mut b = NodeIndex::builder();
    for node in 0..nodes {
        for r in 0..REGIONS {
            let off = (node * REGIONS + r) * U;
            b.add_entry(FvmNode::new(RegionId(r), NodeId(node), off, off, 0));
        }
    }
    let index = b.build();
    let bc = ContinuityInterfaceBc::new((0..nodes).map(NodeId).collect(), U);
    let n = nodes * REGIONS * U;
    let x: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();
    (index, bc, x, n)
}

fn bench_residual(c: &mut Criterion) {
    let mut group = c.benchmark_group("interface_residual");
    for &size in &interface_sizes() {
        let (index, bc, x, n) = build_problem(size);
        let ctx = PartitionContext::default();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| {
                let mut f = SerialVector::zeros(n);
                let plan = bc.preprocess_residual(&ctx, &index).unwrap();
                f.fold_rows(&plan);
                bc.assemble_residual(&ctx, &index, &x, &mut f).unwrap();
                f.flush();
                std::hint::black_box(f);
            });
        });
    }
    group.finish();
}

fn bench_jacobian(c: &mut Criterion) {
    let mut group = c.benchmark_group("interface_jacobian");
    for &size in &interface_sizes() {
        let (index, bc, x, n) = build_problem(size);
        let ctx = PartitionContext::default();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &_| {
            b.iter(|| {
                let mut jac = SerialMatrix::zeros(n, n);
                bc.reserve_sparsity(&ctx, &index, &mut jac).unwrap();
                bc.assemble_jacobian(&ctx, &index, &x, &mut jac).unwrap();
                jac.flush();
                std::hint::black_box(jac);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_residual, bench_jacobian);
criterion_main!(benches);
