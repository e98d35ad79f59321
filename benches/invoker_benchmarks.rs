use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pixel_invoker::command::CommandHistory;
use pixel_invoker::graphics::{Props, ShapeType};
use pixel_invoker::{CommandFactory, CommandKind, Invoker, MemoryGraphics, RotationType};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// Execute/undo/redo directly on the history, no queue involved
fn bench_history(c: &mut Criterion) {
    let rt = runtime();

    c.bench_function("history_rotate_undo_redo", |b| {
        let mut history = CommandHistory::new();
        let mut graphics = MemoryGraphics::default();

        b.iter(|| {
            rt.block_on(async {
                let command =
                    CommandFactory::create(CommandKind::Rotate(RotationType::Rotate(15.0)));
                black_box(history.execute(command, &mut graphics).await.unwrap());
                black_box(history.undo(&mut graphics).await.unwrap());
                black_box(history.redo(&mut graphics).await.unwrap());
            })
        });
    });
}

/// Round trip through the invoker's FIFO worker
fn bench_invoker_round_trip(c: &mut Criterion) {
    let rt = runtime();
    let invoker = rt.block_on(async { Invoker::new(MemoryGraphics::default()) });

    c.bench_function("invoker_execute_undo", |b| {
        b.iter(|| {
            rt.block_on(async {
                let kind = CommandKind::AddShape {
                    shape_type: ShapeType::Rect,
                    options: Props::new(),
                };
                black_box(invoker.execute(kind).await.unwrap());
                black_box(invoker.undo().await.unwrap());
            })
        });
    });
}

/// Many queued commands awaited together
fn bench_queued_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoker_burst");
    let rt = runtime();

    for burst in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(burst), &burst, |b, &size| {
            b.iter(|| {
                rt.block_on(async {
                    let invoker = Invoker::new(MemoryGraphics::default());
                    let pending: Vec<_> = (0..size)
                        .map(|i| {
                            invoker.execute(CommandKind::Rotate(RotationType::Rotate(i as f64)))
                        })
                        .collect();
                    for future in pending {
                        black_box(future.await.unwrap());
                    }
                })
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_history,
    bench_invoker_round_trip,
    bench_queued_burst
);
criterion_main!(benches);
