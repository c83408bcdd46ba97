//! A group that fails on purpose; every other group still completes.

use ensemble::prelude::*;

fn register(suite: &mut SuiteBuilder) {
    suite.group("crash_test", |g| {
        g.report("panics", |r| {
            r.test("after a few calls", || {
                static CALLS: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(0);
                let calls = CALLS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                if calls >= 5 {
                    panic!("Intentional panic for crash isolation test!");
                }
                calls
            });
        });
    });
}

ensemble::declare!(register);
