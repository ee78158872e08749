use kira_splicetrend::io::annotation::{AnnotationLookup, AnnotationTable};
use kira_splicetrend::io::miso_bf::{
    annotated_header, max_bayes_factor, parse_comparison, summarize_raw_comparison,
};
use kira_splicetrend::io::miso_summary::parse_miso_summary;
use kira_splicetrend::io::table::Table;

fn cell<'a>(table: &'a Table, event: &str, column: &str) -> Option<&'a str> {
    let col = table.header.iter().position(|h| h == column)?;
    table
        .rows
        .iter()
        .find(|r| r[0] == event)
        .and_then(|r| r.get(col))
        .map(String::as_str)
}

#[test]
fn summary_columns_are_located_by_name() {
    let content = "#event_name\tci_high\tmiso_posterior_mean\tci_low\n\
                   E1\t0.3\t0.2\t0.1\n\
                   \n\
                   E2\t0.9,0.4\t0.8,0.3\t0.7,0.2\n";
    let recs = parse_miso_summary(content, "s").unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].mean, vec!["0.2"]);
    assert_eq!(recs[0].low, vec!["0.1"]);
    assert_eq!(recs[1].isoforms(), 2);
    assert!(!recs[1].is_ragged());
}

#[test]
fn summary_short_row_is_an_error() {
    let content = "event_name\tmiso_posterior_mean\tci_low\tci_high\nE1\t0.2\n";
    let err = parse_miso_summary(content, "s.miso_summary").unwrap_err();
    assert!(err.to_string().contains("s.miso_summary:2"));
}

#[test]
fn summary_missing_column_is_an_error() {
    assert!(parse_miso_summary("event_name\tci_low\tci_high\n", "s").is_err());
}

#[test]
fn comparison_with_and_without_annotation() {
    let annotated = "#event_name\tbayes_factor\tmax_bf\tgene\tsymb\tdesc\nE1\t1.5,9\t9\tG\tS\tD\n";
    let recs = parse_comparison(annotated, "c").unwrap();
    assert_eq!(recs[0].bayes_factors, vec!["1.5", "9"]);
    assert_eq!(recs[0].max_bf.as_deref(), Some("9"));
    assert_eq!(recs[0].annotation.as_ref().unwrap().symbol, "S");

    let bare = "event_name\tdiff\tbayes_factor\nE1\t0.1\t4\n";
    let recs = parse_comparison(bare, "c").unwrap();
    assert_eq!(recs[0].event, "E1");
    assert_eq!(recs[0].max_bf, None);
    assert_eq!(recs[0].annotation, None);

    assert!(parse_comparison("event_name\tdiff\n", "c").is_err());
}

#[test]
fn max_bayes_factor_over_isoforms() {
    let v: Vec<String> = ["0.5", "12", "3"].iter().map(|s| s.to_string()).collect();
    assert_eq!(max_bayes_factor(&v).unwrap(), 12.0);
    assert!(max_bayes_factor(&[]).is_err());
    assert!(max_bayes_factor(&["abc".to_string()]).is_err());
}

#[test]
fn annotation_table_parsing() {
    let t = AnnotationTable::parse("# comment\nE1\tG1\tS1\tD1\nE1\tG2\tS2\tD2\n", "a").unwrap();
    assert_eq!(t.len(), 1);
    assert_eq!(t.resolve("E1").gene, "G2");
    assert_eq!(t.resolve("missing").fields(), ["n/a", "n/a", "n/a"]);
    assert!(AnnotationTable::parse("E1\tG1\tS1\n", "a").is_err());
}

#[test]
fn raw_comparison_is_ranked_by_max_bf() {
    let raw = "event_name\tA_posterior_mean\tA_ci_low\tA_ci_high\tB_posterior_mean\tB_ci_low\tB_ci_high\tdiff\tbayes_factors\tisoforms\tA_counts\tA_assigned_counts\tB_counts\tB_assigned_counts\tchrom\tstrand\tmRNA_starts\tmRNA_ends\n\
               E1\t0.1\t0.0\t0.2\t0.2\t0.1\t0.3\t0.1\t2.5\tx\tc\tc\tc\tc\tchr1\t+\t1\t2\n\
               E2\t0.1,0.9\t0,0\t1,1\t0.5,0.5\t0,0\t1,1\t0.4,-0.4\t1.0,30\tx\tc\tc\tc\tc\tchr2\t-\t1\t2\n";
    let lookup = AnnotationTable::parse("E2\tENSG2\tTWO\tsecond\n", "a").unwrap();
    let table = summarize_raw_comparison(raw, "raw", "A", "B", &lookup).unwrap();
    assert_eq!(table.header, annotated_header("A", "B"));
    assert_eq!(table.rows[0][0], "E2");
    assert_eq!(table.rows[1][0], "E1");
    assert_eq!(cell(&table, "E2", "max_bf"), Some("30"));
    assert_eq!(cell(&table, "E2", "symb"), Some("TWO"));
    assert_eq!(cell(&table, "E1", "max_bf"), Some("2.5"));
    assert_eq!(cell(&table, "E1", "gene"), Some("n/a"));
}

#[test]
fn table_round_trips_through_disk() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("t.tsv");
    let mut t = Table::new(vec!["#Event".into(), "x".into()]);
    t.rows.push(vec!["E1".into(), "1".into()]);
    t.write(&path).unwrap();
    assert_eq!(Table::read(&path).unwrap(), t);
}

#[test]
fn table_requires_header_first() {
    assert!(Table::parse("E1\t1\n#Event\tx\n", "t").is_err());
    assert!(Table::parse("#Event\tx\n#Event\tx\n", "t").is_err());
    assert!(Table::parse("", "t").is_err());
}
