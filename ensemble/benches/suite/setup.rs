//! Loaded once before the declaration files.

use ensemble::prelude::*;

fn register(suite: &mut SuiteBuilder) {
    suite.group("baseline", |g| {
        g.report("noop", |r| {
            r.control("empty", || ());
        });
    });
}

ensemble::declare!(register);
