//! Tests for the aggregation algebra: partial aggregates must merge the
//! same no matter how the input is split, and rounding must happen exactly
//! once, when a partial is finished.

use tally::{Measurement, PartialAggregate, Schema, round2};


fn m(values: [f64; 3]) -> Measurement {
    Measurement {
        category: "electronics".to_string(),
        values: values.to_vec(),
    }
}

fn sample_measurements() -> Vec<Measurement> {
    vec![
        m([1200.50, 2.0, 2401.0]),
        m([25.00, 1.0, 25.0]),
        m([300.00, 1.0, 300.0]),
        m([120.25, 4.0, 481.0]),
        m([7.75, 2.0, 15.5]),
    ]
}

#[test]
fn test_single_measurement_matches_fold() {
    let one = m([10.0, 2.0, 20.0]);

    let folded = {
        let mut agg = PartialAggregate::new("electronics".to_string(), 3);
        agg.add(&one);
        agg
    };
    assert_eq!(PartialAggregate::from(one), folded);
}

#[test]
fn test_combine_empty_is_none() {
    assert!(PartialAggregate::combine(Vec::<Measurement>::new()).is_none());
}

#[test]
fn test_merge_matches_sequential_adds() {
    let ms = sample_measurements();

    let mut sequential = PartialAggregate::new("electronics".to_string(), 3);
    for item in &ms {
        sequential.add(item);
    }

    let left = PartialAggregate::combine(ms[..2].to_vec()).unwrap();
    let right = PartialAggregate::combine(ms[2..].to_vec()).unwrap();
    let mut merged = left;
    merged.merge(right);

    assert_eq!(merged.count, sequential.count);
    for (a, b) in merged.sums.iter().zip(&sequential.sums) {
        assert_approx_eq!(*a, *b);
    }
}

#[test]
fn test_every_split_produces_identical_stats() {
    let schema = Schema::sales();
    let ms = sample_measurements();
    let reference = PartialAggregate::combine(ms.clone())
        .unwrap()
        .finish(&schema);

    // Enumerate every composition of the sequence: bit i of the mask says
    // whether a partition boundary sits after element i.
    let n = ms.len();
    for mask in 0u32..(1 << (n - 1)) {
        let mut parts: Vec<Vec<Measurement>> = vec![Vec::new()];
        for (i, item) in ms.iter().enumerate() {
            parts.last_mut().unwrap().push(item.clone());
            if i + 1 < n && mask & (1 << i) != 0 {
                parts.push(Vec::new());
            }
        }

        let mut acc: Option<PartialAggregate> = None;
        for part in parts {
            let partial = PartialAggregate::combine(part).unwrap();
            match acc.as_mut() {
                Some(agg) => agg.merge(partial),
                None => acc = Some(partial),
            }
        }

        let stats = acc.unwrap().finish(&schema);
        assert_eq!(stats, reference, "split mask {mask:#b} diverged");
    }
}

#[test]
fn test_merge_order_does_not_matter() {
    let schema = Schema::sales();
    let ms = sample_measurements();
    let reference = PartialAggregate::combine(ms.clone())
        .unwrap()
        .finish(&schema);

    let mut reversed: Option<PartialAggregate> = None;
    for item in ms.into_iter().rev() {
        let partial = PartialAggregate::from(item);
        match reversed.as_mut() {
            Some(agg) => agg.merge(partial),
            None => reversed = Some(partial),
        }
    }
    assert_eq!(reversed.unwrap().finish(&schema), reference);
}

#[test]
fn test_finish_reports_expected_stats() {
    let schema = Schema::sales();
    let stats = PartialAggregate::combine(sample_measurements())
        .unwrap()
        .finish(&schema);

    assert_eq!(stats.category, "electronics");
    assert_eq!(stats.count, 5);
    // avg_price = 1653.50 / 5, total_quantity, total_revenue.
    assert_approx_eq!(stats.stats[0], 330.70);
    assert_approx_eq!(stats.stats[1], 10.0);
    assert_approx_eq!(stats.stats[2], 3222.50);
}

#[test]
fn test_finish_with_zero_count_reports_zero_averages() {
    let schema = Schema::sales();
    let stats = PartialAggregate::new("empty".to_string(), 3).finish(&schema);
    assert_eq!(stats.count, 0);
    assert_eq!(stats.stats, vec![0.0, 0.0, 0.0]);
}

#[test]
fn test_rounding_happens_only_at_finish() {
    let schema = Schema::sales();
    // Three records averaging to 2/3; only the finished value is rounded.
    let ms = vec![
        m([1.0, 1.0, 0.1]),
        m([1.0, 1.0, 0.2]),
        m([0.0, 1.0, 0.0]),
    ];

    let agg = PartialAggregate::combine(ms).unwrap();
    // The running sum keeps full precision (0.1 + 0.2 != 0.3 exactly).
    assert!((agg.sums[2] - 0.3).abs() > 0.0);

    let stats = agg.finish(&schema);
    assert_approx_eq!(stats.stats[0], 0.67);
    assert_approx_eq!(stats.stats[2], 0.30);
}

#[test]
fn test_average_rounding_of_inexact_decimal_total() {
    let schema = Schema::sales();
    // 10.005 stores as a double slightly above the decimal value, so the
    // average over three records lands just above the .005 midpoint.
    let ms = vec![
        m([10.005, 1.0, 10.005]),
        m([0.0, 1.0, 0.0]),
        m([0.0, 1.0, 0.0]),
    ];
    let stats = PartialAggregate::combine(ms).unwrap().finish(&schema);
    assert_eq!(stats.count, 3);
    assert_approx_eq!(stats.stats[0], 3.34);
}

#[test]
fn test_round2_is_half_away_from_zero() {
    // Values chosen to be exactly representable in binary.
    assert_eq!(round2(0.125), 0.13);
    assert_eq!(round2(-0.125), -0.13);
    assert_eq!(round2(3.375), 3.38);
    assert_eq!(round2(0.625), 0.63);
    assert_eq!(round2(210.125), 210.13);
}

#[test]
fn test_round2_preserves_exact_values() {
    assert_eq!(round2(7.75), 7.75);
    assert_eq!(round2(0.0), 0.0);
    assert_eq!(round2(-15.5), -15.5);
    assert_eq!(round2(2426.0), 2426.0);
}
