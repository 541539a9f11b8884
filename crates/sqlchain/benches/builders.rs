use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sqlchain::prelude::*;
use sqlchain::{ColumnValue, SelectQb};
use std::collections::HashMap;

const PSQL: StatementBuilder = StatementBuilder::dollar();

fn tickets() -> SelectQb {
    PSQL.select(["id"])
        .from("tickets")
        .where_expr("subdomain_id = ? and (state = ? or state = ?)", args![1, "open", "spam"])
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("builders/select");

    group.bench_function("simple", |b| {
        b.iter(|| black_box(tickets().build()));
    });

    group.bench_function("conditional", |b| {
        let mut n = 0u64;
        b.iter(|| {
            let mut qb = tickets();
            if n % 2 == 0 {
                qb = qb
                    .group_by(["subdomain_id"])
                    .having_expr("number = ?", args![1])
                    .order_by(["state"])
                    .limit(7)
                    .offset(8);
            }
            n += 1;
            black_box(qb.build())
        });
    });

    group.bench_function("complex", |b| {
        b.iter(|| {
            let qb = PSQL
                .select(["a", "b", "z", "y", "x"])
                .distinct()
                .from("c")
                .where_expr("d = ? OR e = ?", args![1, "wat"])
                .where_(ColumnMap::from([("f", ColumnValue::from(2)), ("x", ColumnValue::from("hi"))]))
                .where_(HashMap::from([("g", 3)]))
                .where_(ColumnMap::new().set("h", vec![1, 2, 3]))
                .group_by(["i"])
                .group_by(["ii"])
                .group_by(["iii"])
                .having("j = k")
                .having_expr("jj = ?", args![1])
                .having_expr("jjj = ?", args![2])
                .order_by(["l"])
                .order_by(["l"])
                .order_by(["l"])
                .limit(7)
                .offset(8);
            black_box(qb.build())
        });
    });

    group.bench_function("subquery", |b| {
        b.iter(|| {
            let qb = PSQL
                .select(["a", "b"])
                .from("c")
                .distinct()
                .column(Alias::new(tickets(), "subq"))
                .where_(ColumnMap::from([("f", ColumnValue::from(2)), ("x", ColumnValue::from("hi"))]))
                .where_(HashMap::from([("g", 3)]))
                .order_by(["l"])
                .limit(7)
                .offset(8);
            black_box(qb.build())
        });
    });

    group.bench_function("more_complex", |b| {
        b.iter(|| {
            let qb = PSQL
                .select(["a", "b"])
                .prefix_expr("WITH prefix AS ?", args![0])
                .distinct()
                .columns(["c"])
                .column_expr(
                    &format!("IF(d IN ({}), 1, 0) as stat_column", placeholders(3)),
                    args![1, 2, 3],
                )
                .column(Expr::new("a > ?", args![100]))
                .column(ColumnMap::new().set("b", vec![101, 102, 103]))
                .from("e")
                .join_clause("CROSS JOIN j1")
                .join("j2")
                .left_join("j3")
                .right_join("j4")
                .where_expr("f = ?", args![4])
                .where_(ColumnMap::new().set("g", 5))
                .where_(HashMap::from([("h", 6)]))
                .where_(ColumnMap::new().set("i", vec![7, 8, 9]))
                .where_(Pred::or([
                    Pred::expr("j = ?", args![10]).expect("valid fragment"),
                    Pred::and([
                        Pred::eq([("k", 11)]),
                        Pred::raw("true").expect("valid fragment"),
                    ]),
                ]))
                .group_by(["l"])
                .having("m = n")
                .order_by(["o ASC", "p DESC"])
                .limit(12)
                .offset(13)
                .suffix_expr("FETCH FIRST ? ROWS ONLY", args![14]);
            black_box(qb.build())
        });
    });

    group.finish();
}

fn bench_mutations(c: &mut Criterion) {
    let mut group = c.benchmark_group("builders/mutations");

    group.bench_function("insert", |b| {
        b.iter(|| {
            let qb = PSQL
                .insert("mytable")
                .columns(["id", "a", "b", "price", "created", "updated"])
                .values(args![1, "test_a", "test_b", 100.05, "2014-01-05", "2015-01-05"]);
            black_box(qb.build())
        });
    });

    let bump = Expr::raw("COALESCE(bar, 0) + 1").expect("valid fragment");

    group.bench_function("update_set", |b| {
        b.iter(|| {
            let qb = PSQL
                .update("mytable")
                .set("foo", 1)
                .set("bar", bump.clone())
                .set("c", 2)
                .where_expr("id = ?", args![9]);
            black_box(qb.build())
        });
    });

    group.bench_function("update_set_map", |b| {
        b.iter(|| {
            let qb = PSQL
                .update("mytable")
                .set_map(HashMap::from([
                    ("b", ColumnValue::from(1)),
                    ("c", ColumnValue::from(2)),
                    ("bar", ColumnValue::from(bump.clone())),
                ]))
                .where_expr("id = ?", args![9]);
            black_box(qb.build())
        });
    });

    group.bench_function("delete", |b| {
        b.iter(|| {
            let qb = PSQL
                .delete("test_table")
                .where_expr("b = ?", args![1])
                .order_by(["c"]);
            black_box(qb.build())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_select, bench_mutations);
criterion_main!(benches);
