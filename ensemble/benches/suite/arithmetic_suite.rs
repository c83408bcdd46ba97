use ensemble::prelude::*;
use std::hint::black_box;

fn register(suite: &mut SuiteBuilder) {
    suite.group("arithmetic", |g| {
        g.report("add", |r| {
            r.control("Integer", || black_box(42u64) + black_box(17u64));
            r.test("Float", || black_box(42.0f64) + black_box(17.0f64));
        });

        g.report("divide", |r| {
            r.control("Integer", || black_box(1_000_003u64) / black_box(7u64));
            r.test("Float", || black_box(1_000_003.0f64) / black_box(7.0f64));
            r.test("Shift", || black_box(1_000_003u64) >> black_box(3u32));
        });
    });
}

ensemble::declare!(register);
