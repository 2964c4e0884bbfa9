use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use powerlite::{
    Condition, Connection, DbError, DbResult, Limit, Placeholders, QueryBuilder, Statement,
    WhereClause, dialect_for, sql,
};

/// Rendering never reaches the connection.
struct Offline;

impl Connection for Offline {
    fn prepare(&mut self, _sql: &str) -> DbResult<Box<dyn Statement>> {
        Err(DbError::driver("offline"))
    }
    fn exec(&mut self, _sql: &str) -> DbResult<u64> {
        Err(DbError::driver("offline"))
    }
    fn begin_transaction(&mut self) -> DbResult<()> {
        Ok(())
    }
    fn commit(&mut self) -> DbResult<()> {
        Ok(())
    }
    fn rollback(&mut self) -> DbResult<()> {
        Ok(())
    }
    fn in_transaction(&self) -> bool {
        false
    }
}

fn condition(n: usize) -> Condition {
    (0..n).fold(Condition::new(), |c, i| c.eq(format!("col{i}"), i as i64))
}

fn bench_where_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_render/where_compile");

    for n in [1, 5, 10, 50] {
        let cond = condition(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &cond, |b, cond| {
            b.iter(|| {
                let mut w = WhereClause::new();
                w.compile(cond).unwrap();
                black_box(w.sql().len());
            });
        });
    }

    group.finish();
}

fn bench_select_per_dialect(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_render/select");
    let cond = condition(5);

    for driver in ["mysql", "pgsql", "oci", "firebird"] {
        let mut qb = QueryBuilder::new(Box::new(Offline), dialect_for(driver).unwrap());
        group.bench_with_input(BenchmarkId::from_parameter(driver), &cond, |b, cond| {
            b.iter(|| {
                qb.select("id, name, email")
                    .from("users u LEFT JOIN orders o ON o.user_id = u.id")
                    .filter(cond.clone())
                    .unwrap()
                    .order_by("name")
                    .limit(Limit::range(40, 20));
                black_box(qb.to_sql().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_render/interpolate");

    for n in [1, 10, 50] {
        let mut w = WhereClause::new();
        w.compile(&condition(n)).unwrap();
        let sql_text = format!("SELECT * FROM t{}", w.sql());
        let placeholders: Placeholders = w.placeholders().clone();

        group.bench_with_input(BenchmarkId::from_parameter(n), &sql_text, |b, text| {
            b.iter(|| black_box(sql::interpolate(text, &placeholders)));
        });
    }

    group.finish();
}

fn bench_count_probe(c: &mut Criterion) {
    let query = "SELECT DISTINCT u.id, u.name FROM users u INNER JOIN orders o ON o.user_id = u.id \
                 WHERE o.total > 100 ORDER BY u.name";
    c.bench_function("query_render/count_probe", |b| {
        b.iter(|| black_box(sql::count_probe_sql(black_box(query), Some("DISTINCT u.id, u.name"))));
    });
}

criterion_group!(
    benches,
    bench_where_compile,
    bench_select_per_dialect,
    bench_interpolate,
    bench_count_probe
);
criterion_main!(benches);
