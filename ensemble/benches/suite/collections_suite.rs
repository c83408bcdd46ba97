use ensemble::prelude::*;
use std::collections::{BTreeMap, HashMap};

fn register(suite: &mut SuiteBuilder) {
    suite.group("collections", |g| {
        g.report("insert 100", |r| {
            r.control("Vec", || {
                let mut v = Vec::new();
                for i in 0..100 {
                    v.push(i * 2);
                }
                v
            });
            r.test("HashMap", || {
                let mut map = HashMap::new();
                for i in 0..100 {
                    map.insert(i, i * 2);
                }
                map
            });
            r.test("BTreeMap", || {
                let mut map = BTreeMap::new();
                for i in 0..100 {
                    map.insert(i, i * 2);
                }
                map
            });
        });

        g.report("sum 1000", |r| {
            let data: Vec<i64> = (0..1000).collect();
            r.control("iter", move || data.iter().sum::<i64>());
            r.test("fold", || (0..1000i64).fold(0, |acc, x| acc + x));
        });
    });
}

ensemble::declare!(register);
