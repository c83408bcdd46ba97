use ensemble::prelude::*;

fn register(suite: &mut SuiteBuilder) {
    suite.group("strings", |g| {
        g.report("build", |r| {
            r.control("push_str", || {
                let mut s = String::new();
                for i in 0..100 {
                    s.push_str(&i.to_string());
                }
                s
            });
            r.test("collect", || (0..100).map(|i| i.to_string()).collect::<String>());
        });

        g.report("parse", |r| {
            let numbers: Vec<String> = (0..100).map(|i| i.to_string()).collect();
            r.test("i64", move || {
                numbers
                    .iter()
                    .filter_map(|s| s.parse::<i64>().ok())
                    .sum::<i64>()
            });
        });
    });
}

ensemble::declare!(register);
