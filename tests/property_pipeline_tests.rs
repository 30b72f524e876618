mod common;

use approx::relative_eq;
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use sales_dashboard::export::{self, CsvTable};
use sales_dashboard::filter::{self, all_columns, Constraint, FilterCriteria};
use sales_dashboard::models::SellerRanking;
use sales_dashboard::queries::{rank_sellers, SalesQuery};
use sales_dashboard::{Connection, Field, Record, RecordCollection};
use std::collections::BTreeSet;

const SELLERS: [&str; 6] = ["Alice", "Bruno", "Carla", "Diego", "Elisa", "Fabio"];
const LOCATIONS: [&str; 4] = ["SP", "RJ", "MG", "BA"];
const CATEGORIES: [&str; 3] = ["livros", "eletronicos", "moveis"];

fn record_strategy() -> impl Strategy<Value = Record> {
    (0u32..500_000, 0usize..6, 0usize..4, 0usize..3, 0i64..1460, 1i64..=5).prop_map(
        |(cents, seller, location, category, day, rating)| {
            let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(day);
            let mut record = common::sale(
                "Produto",
                CATEGORIES[category],
                cents as f64 / 100.0,
                (2020, 1, 1),
                SELLERS[seller],
                LOCATIONS[location],
            );
            record.purchase_date = date;
            record.rating = rating;
            record
        },
    )
}

fn collection_strategy() -> impl Strategy<Value = RecordCollection> {
    prop::collection::vec(record_strategy(), 0..40).prop_map(RecordCollection::new)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn filter_output_is_matching_subsequence(
        records in collection_strategy(),
        lo in 0.0f64..2_500.0,
        width in 0.0f64..2_500.0,
        seller in 0usize..6
    ) {
        let criteria = FilterCriteria::new()
            .with(Field::Price, Constraint::Between(lo, lo + width))
            .unwrap()
            .with(Field::Seller, Constraint::one_of([SELLERS[seller]]))
            .unwrap();

        let out = filter::apply(&records, &criteria, &all_columns()).unwrap();
        prop_assert!(out.len() <= records.len());
        prop_assert!(out.iter().all(|r| criteria.matches(r)));

        let expected: Vec<&Record> = records.iter().filter(|r| criteria.matches(r)).collect();
        let actual: Vec<&Record> = out.iter().collect();
        prop_assert_eq!(actual, expected);

        let again = filter::apply(&out, &criteria, &all_columns()).unwrap();
        prop_assert_eq!(again, out);
    }

    #[test]
    fn grouped_revenue_partitions_total(records in collection_strategy()) {
        let conn = Connection::load(&records).unwrap();
        let query = SalesQuery::new(&conn);
        let total: f64 = records.iter().map(|r| r.price).sum();

        let by_category: f64 = query.revenue_by_category().unwrap().iter().map(|r| r.revenue).sum();
        let by_location: f64 = query.revenue_by_location().unwrap().iter().map(|r| r.revenue).sum();
        let by_month: f64 = query.revenue_by_month().unwrap().iter().map(|r| r.revenue).sum();

        for sum in [by_category, by_location, by_month] {
            prop_assert!(relative_eq!(sum, total, epsilon = 1e-6, max_relative = 1e-9));
        }
        prop_assert_eq!(query.totals().unwrap().sales as usize, records.len());
    }

    #[test]
    fn sorted_aggregates_are_non_increasing(records in collection_strategy()) {
        let conn = Connection::load(&records).unwrap();
        let query = SalesQuery::new(&conn);

        let locations = query.revenue_by_location().unwrap();
        for pair in locations.windows(2) {
            prop_assert!(pair[0].revenue >= pair[1].revenue);
        }
        let categories = query.revenue_by_category().unwrap();
        for pair in categories.windows(2) {
            prop_assert!(pair[0].revenue >= pair[1].revenue);
        }
        let months = query.revenue_by_month().unwrap();
        for pair in months.windows(2) {
            prop_assert!(pair[0].month_end < pair[1].month_end);
        }
    }

    #[test]
    fn top_k_sellers_dominate_the_rest(records in collection_strategy(), k in 2usize..=10) {
        let conn = Connection::load(&records).unwrap();
        let stats = SalesQuery::new(&conn).seller_stats().unwrap();

        let top = rank_sellers(&stats, SellerRanking::SalesCount, k).unwrap();
        prop_assert_eq!(top.len(), k.min(stats.len()));
        let floor = top.iter().map(|s| s.sales).min().unwrap_or(i64::MAX);
        for other in stats.iter().filter(|s| !top.contains(s)) {
            prop_assert!(other.sales <= floor);
        }
    }

    #[test]
    fn csv_export_reads_back(
        records in collection_strategy(),
        columns in prop::sample::subsequence(Field::ALL.to_vec(), 1..=Field::ALL.len())
    ) {
        let columns: BTreeSet<Field> = columns.into_iter().collect();
        let table = filter::apply(&records, &FilterCriteria::new(), &columns).unwrap();

        let parsed = export::read_csv(&export::to_csv(&table).unwrap()).unwrap();
        prop_assert_eq!(&parsed.columns, &columns.iter().copied().collect::<Vec<_>>());
        prop_assert_eq!(parsed, CsvTable::from(&table));
    }
}
