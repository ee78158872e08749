use kira_splicetrend::groups::GroupAssignment;
use kira_splicetrend::io::table::Table;
use kira_splicetrend::schema::v1::IsoformMode;
use kira_splicetrend::trend::permute::{Permuter, replicate_orders};
use kira_splicetrend::trend::{EventOutcome, TrendEngine, TrendParams, run_trend};

fn header(samples: &[&str]) -> Vec<String> {
    let mut h = vec!["#Event".to_string()];
    for s in samples {
        for suffix in ["low", "mean", "high"] {
            h.push(format!("{}_{}", s, suffix));
        }
    }
    for i in 0..samples.len() {
        for j in (i + 1)..samples.len() {
            h.push(format!("{}_vs_{}", samples[i], samples[j]));
        }
    }
    h.extend(["gene", "symb", "desc"].map(String::from));
    h
}

fn row(event: &str, psi: &[&str], bf: &str) -> Vec<String> {
    let n = psi.len();
    let mut r = vec![event.to_string()];
    for p in psi {
        r.extend([p.to_string(), p.to_string(), p.to_string()]);
    }
    for _ in 0..n * (n - 1) / 2 {
        r.push(bf.to_string());
    }
    r.extend([format!("G_{}", event), format!("S_{}", event), "desc".to_string()]);
    r
}

fn table(samples: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new(header(samples));
    t.rows = rows;
    t
}

fn two_by_two() -> GroupAssignment {
    GroupAssignment::parse("A control\nB control\nC treatment\nD treatment\n", "groups").unwrap()
}

fn three_by_two() -> GroupAssignment {
    GroupAssignment::parse("s1 g1\ns2 g1\ns3 g2\ns4 g2\ns5 g3\ns6 g3\n", "groups").unwrap()
}

const SIX: [&str; 6] = ["s1", "s2", "s3", "s4", "s5", "s6"];

fn params(mode: IsoformMode, nshuffles: usize) -> TrendParams {
    let mut p = TrendParams::new(mode);
    p.nshuffles = nshuffles;
    p
}

#[test]
fn two_group_example() {
    let t = table(
        &["A", "B", "C", "D"],
        vec![row("E1", &["0.10", "0.15", "0.60", "0.70"], "100")],
    );
    let out = run_trend(&t, &two_by_two(), &params(IsoformMode::Single, 200)).unwrap();
    assert_eq!(out.control_label, "control");
    assert_eq!(out.experimental_label, "treatment");
    assert_eq!(out.rows.len(), 1);
    let r = &out.rows[0];
    assert_eq!(r.event, "E1");
    assert_eq!(r.symbol, "S_E1");
    let iso = &r.isoforms[0];
    assert_eq!(iso.observed, 4);
    assert!(iso.z > 1.0, "z = {}", iso.z);
    assert!(!iso.degenerate_null);
    assert!((iso.delta_psi - 0.52).abs() < 1e-9);
    assert!((iso.experimental_psi - 0.65).abs() < 1e-9);
}

#[test]
fn observed_statistic_counts_concordant_minus_discordant() {
    // A->C -1, A->D +1, B->C +1, B->D +1
    let t = table(
        &["A", "B", "C", "D"],
        vec![row("E1", &["0.5", "0.2", "0.3", "0.9"], "10")],
    );
    let out = run_trend(&t, &two_by_two(), &params(IsoformMode::Single, 10)).unwrap();
    assert_eq!(out.rows[0].isoforms[0].observed, 2);
}

#[test]
fn bayes_factor_threshold_is_inclusive() {
    let t = table(
        &["A", "B", "C", "D"],
        vec![
            row("AT", &["0.1", "0.1", "0.9", "0.9"], "5"),
            row("BELOW", &["0.1", "0.1", "0.9", "0.9"], "4.99"),
        ],
    );
    let out = run_trend(&t, &two_by_two(), &params(IsoformMode::Single, 50)).unwrap();
    let at = out.rows.iter().find(|r| r.event == "AT").unwrap();
    let below = out.rows.iter().find(|r| r.event == "BELOW").unwrap();
    assert_eq!(at.isoforms[0].observed, 4);
    assert_eq!(below.isoforms[0].observed, 0);
    assert_eq!(below.isoforms[0].z, 0.0);
    assert!(!below.isoforms[0].degenerate_null);
}

#[test]
fn monotonic_increase_over_three_groups() {
    let t = table(
        &SIX,
        vec![row("UP", &["0.10", "0.12", "0.40", "0.45", "0.80", "0.85"], "20")],
    );
    let out = run_trend(&t, &three_by_two(), &params(IsoformMode::Single, 1000)).unwrap();
    let iso = &out.rows[0].isoforms[0];
    assert_eq!(iso.observed, 12);
    assert!(iso.z > 2.0, "z = {}", iso.z);
    assert_eq!(out.control_label, "g1");
    assert_eq!(out.experimental_label, "g3");
}

#[test]
fn reversed_trend_negates_observed() {
    let t = table(
        &SIX,
        vec![row("DOWN", &["0.85", "0.80", "0.45", "0.40", "0.12", "0.10"], "20")],
    );
    let out = run_trend(&t, &three_by_two(), &params(IsoformMode::Single, 1000)).unwrap();
    let iso = &out.rows[0].isoforms[0];
    assert_eq!(iso.observed, -12);
    assert!(iso.z < -2.0, "z = {}", iso.z);
    assert!(iso.delta_psi < 0.0);
}

#[test]
fn missing_sample_excludes_event() {
    let t = table(
        &SIX,
        vec![
            row("OK", &["0.1", "0.1", "0.4", "0.4", "0.8", "0.8"], "20"),
            row("GAP", &["0.1", "0.1", "n/a", "0.4", "0.8", "0.8"], "20"),
        ],
    );
    let out = run_trend(&t, &three_by_two(), &params(IsoformMode::Single, 20)).unwrap();
    assert_eq!(out.events_read, 2);
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].event, "OK");
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].event, "GAP");
    assert_eq!(out.skipped[0].reason.kind(), "missing_psi");
    assert_eq!(out.skip_counts().get("missing_psi"), Some(&1));
}

#[test]
fn malformed_and_short_rows_are_skipped() {
    let mut short = row("SHORT", &["0.1", "0.2", "0.3", "0.4"], "9");
    short.truncate(5);
    let t = table(
        &["A", "B", "C", "D"],
        vec![row("BAD", &["0.1", "x", "0.3", "0.4"], "9"), short],
    );
    let out = run_trend(&t, &two_by_two(), &params(IsoformMode::Single, 5)).unwrap();
    assert!(out.rows.is_empty());
    let counts = out.skip_counts();
    assert_eq!(counts.get("malformed_value"), Some(&1));
    assert_eq!(counts.get("short_row"), Some(&1));
}

#[test]
fn zero_shuffles_gives_degenerate_null() {
    let t = table(
        &["A", "B", "C", "D"],
        vec![row("E1", &["0.1", "0.1", "0.9", "0.9"], "10")],
    );
    let out = run_trend(&t, &two_by_two(), &params(IsoformMode::Single, 0)).unwrap();
    let iso = &out.rows[0].isoforms[0];
    assert_eq!(iso.observed, 4);
    assert_eq!(iso.z, 0.0);
    assert!(iso.degenerate_null);
    assert_eq!(out.degenerate_null(), 1);
}

struct Reverse;

impl Permuter for Reverse {
    fn permute(&mut self, order: &mut [usize]) {
        order.reverse();
    }
}

#[test]
fn injected_permuter_drives_the_null() {
    let t = table(
        &["A", "B", "C", "D"],
        vec![row("E1", &["0.1", "0.2", "0.7", "0.8"], "10")],
    );
    let engine = TrendEngine::new(&t, &two_by_two(), params(IsoformMode::Single, 3)).unwrap();
    let evidence = engine.parse_evidence(&t.rows[0]).unwrap();
    let orders = replicate_orders(evidence.n_samples(), 3, &mut Reverse);
    assert_eq!(engine.replicate_statistics(&evidence, &orders, 0), vec![4, -4, -4, -4]);

    // Identical replicates have no spread.
    match engine.evaluate_with(&t.rows[0], &mut Reverse) {
        EventOutcome::Reported(r) => {
            let iso = &r.isoforms[0];
            assert_eq!(iso.null_mean, -4.0);
            assert_eq!(iso.null_std, 0.0);
            assert!(iso.degenerate_null);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn fixed_seed_is_reproducible_across_threads() {
    let rows = (0..12)
        .map(|i| {
            let lift = format!("{:.2}", 0.3 + i as f64 * 0.05);
            row(&format!("E{}", i), &["0.2", "0.25", lift.as_str(), "0.3"], "10")
        })
        .collect();
    let t = table(&["A", "B", "C", "D"], rows);
    let mut one = params(IsoformMode::Single, 100);
    one.threads = 1;
    let mut four = one.clone();
    four.threads = 4;
    let a = run_trend(&t, &two_by_two(), &one).unwrap();
    let b = run_trend(&t, &two_by_two(), &one).unwrap();
    let c = run_trend(&t, &two_by_two(), &four).unwrap();
    assert_eq!(a.rows, b.rows);
    assert_eq!(a.rows, c.rows);
}

#[test]
fn single_mode_sorts_by_observed_with_stable_ties() {
    let t = table(
        &["A", "B", "C", "D"],
        vec![
            row("LOW", &["0.5", "0.2", "0.3", "0.9"], "10"),
            row("TIE1", &["0.1", "0.1", "0.9", "0.9"], "10"),
            row("NEG", &["0.9", "0.9", "0.1", "0.1"], "10"),
            row("TIE2", &["0.2", "0.2", "0.8", "0.8"], "10"),
        ],
    );
    let out = run_trend(&t, &two_by_two(), &params(IsoformMode::Single, 20)).unwrap();
    let order: Vec<&str> = out.rows.iter().map(|r| r.event.as_str()).collect();
    assert_eq!(order, ["TIE1", "TIE2", "LOW", "NEG"]);
}

#[test]
fn interleaved_group_file_uses_block_order() {
    let g = GroupAssignment::parse("A control\nC treatment\nB control\nD treatment\n", "groups")
        .unwrap();
    let t = table(
        &["A", "B", "C", "D"],
        vec![row("E1", &["0.1", "0.15", "0.6", "0.7"], "10")],
    );
    let out = run_trend(&t, &g, &params(IsoformMode::Single, 20)).unwrap();
    assert_eq!(out.rows[0].isoforms[0].observed, 4);
}

#[test]
fn grouped_sample_without_column_is_fatal() {
    let g = GroupAssignment::parse("A control\nB control\nC treatment\nX treatment\n", "groups")
        .unwrap();
    let t = table(&["A", "B", "C", "D"], Vec::new());
    let err = run_trend(&t, &g, &params(IsoformMode::Single, 5)).unwrap_err();
    assert!(err.to_string().contains("X"));
}

#[test]
fn multi_isoform_keeps_signal_and_drops_flat_events() {
    let t = table(
        &SIX,
        vec![
            row(
                "MIXED",
                &["0.1,0.5", "0.12,0.5", "0.4,0.5", "0.45,0.5", "0.8,0.5", "0.85,0.5"],
                "20,20",
            ),
            row(
                "FLAT",
                &["0.3,0.7", "0.3,0.7", "0.3,0.7", "0.3,0.7", "0.3,0.7", "0.3,0.7"],
                "20,20",
            ),
        ],
    );
    let out = run_trend(&t, &three_by_two(), &params(IsoformMode::Multi, 500)).unwrap();
    assert_eq!(out.dropped_flat, 1);
    assert_eq!(out.rows.len(), 1);
    let r = &out.rows[0];
    assert_eq!(r.event, "MIXED");
    assert_eq!(r.isoforms.len(), 2);
    assert_eq!(r.isoforms[0].observed, 12);
    assert_eq!(r.isoforms[1].observed, 0);
    assert_eq!(r.isoforms[1].z, 0.0);
    assert_eq!(r.max_abs_z(), r.isoforms[0].z.abs());
    // Multi-isoform runs compare the second group against the first.
    assert_eq!(out.control_label, "g2");
    assert_eq!(out.experimental_label, "g1");
}

#[test]
fn multi_isoform_neutral_scalar_adds_no_sign_and_ragged_lists_are_rejected() {
    let t = table(
        &["A", "B", "C", "D"],
        vec![
            row("NEUTRAL", &["0.1,0.9", "0.1,0.9", "0.9,0.1", "0.9,0.1"], "1"),
            row("RAGGED", &["0.1,0.9", "0.1,0.9,0.0", "0.9,0.1", "0.9,0.1"], "9,9"),
            row("BADBF", &["0.1,0.9", "0.1,0.9", "0.9,0.1", "0.9,0.1"], "9,9,9"),
        ],
    );
    let out = run_trend(&t, &two_by_two(), &params(IsoformMode::Multi, 20)).unwrap();
    assert!(out.rows.is_empty());
    assert_eq!(out.dropped_flat, 1);
    assert_eq!(out.skip_counts().get("isoform_mismatch"), Some(&2));
}

#[test]
fn comparisons_without_source_file_never_count() {
    let t = table(
        &["A", "B", "C", "D"],
        vec![row("E1", &["0.1", "0.15", "0.6", "0.7"], "1")],
    );
    let mut p = params(IsoformMode::Single, 20);
    p.min_bf = 1.0;
    p.excluded_comparisons = vec!["A_vs_C".to_string()];
    let out = run_trend(&t, &two_by_two(), &p).unwrap();
    assert_eq!(out.rows[0].isoforms[0].observed, 3);

    // Stored under the reverse ordering still matches.
    p.excluded_comparisons = ["C_vs_A", "A_vs_D", "B_vs_C", "B_vs_D"]
        .map(String::from)
        .to_vec();
    let out = run_trend(&t, &two_by_two(), &p).unwrap();
    let iso = &out.rows[0].isoforms[0];
    assert_eq!(iso.observed, 0);
    assert_eq!(iso.z, 0.0);
}

#[test]
fn explicit_reference_groups_override_convention() {
    let t = table(
        &SIX,
        vec![row("UP", &["0.10", "0.10", "0.40", "0.40", "0.80", "0.80"], "20")],
    );
    let mut p = params(IsoformMode::Single, 10);
    p.control = Some("g2".to_string());
    let out = run_trend(&t, &three_by_two(), &p).unwrap();
    assert_eq!(out.control_label, "g2");
    assert_eq!(out.experimental_label, "g3");
    let iso = &out.rows[0].isoforms[0];
    assert!((iso.control_psi - 0.4).abs() < 1e-9);
    assert!((iso.delta_psi - 0.4).abs() < 1e-9);
}
