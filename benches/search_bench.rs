use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pawngrid::search::minimax::MiniMax;
use pawngrid::Board;

fn bench_search(c: &mut Criterion) {
    let board = Board::standard();
    c.bench_function("minimax_depth_2_startpos", |ben| {
        ben.iter(|| {
            let mut engine = MiniMax::new(2);
            let mv = engine.execute(black_box(&board));
            black_box((mv, engine.boards_evaluated()))
        })
    });

    c.bench_function("minimax_depth_2_startpos_parallel", |ben| {
        ben.iter(|| {
            let mut engine = MiniMax::new(2);
            engine.set_threads(4);
            let mv = engine.execute(black_box(&board));
            black_box(mv)
        })
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
