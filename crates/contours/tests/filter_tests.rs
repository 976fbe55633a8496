//! Filters applied to a small corpus loaded from CSV.

use std::collections::HashSet;
use std::io::Write;

use contours::filter::{
    ByGenre, DuplicatedNotes, IncipitIsFullText, NotStartingWithGClef, StratifiedSample,
    WithFClef, WithMissingPitches, WithNonVolpianoChars, WithoutFullText, WithoutNotes,
    WithoutSimpleMode, WithoutVolpiano, WithoutWordBoundary,
};
use contours::{
    antiphon_filters, apply_filter, extract_connections, write_connections_csv, ChantFilter,
    ChantTable, ConnectionOptions, MemoryLogger, NotEndingOnEuouae, NullLogger, REQUIRED_COLUMNS,
};
use pretty_assertions::assert_eq;

const CORPUS: &str = "\
id,incipit,full_text,full_text_manuscript,volpiano,genre_id,mode,cantus_id,siglum
c1,Ave,Ave Maria,Ave Maria euouae,1---fgh---gf-3---ghjk-4,genre_a,1,001,A
c2,Alma,Alma,Alma Seuouae,1---fgh---gf-3---ghjk-4,genre_a,1,001,B
c3,Salve,Salve regina,Salve regina,1---cde---dc-3,genre_r,2T,002,A
c4,Regina,Regina caeli,Regina caeli E u o u a e,2---cde---dc-3---cdef-4,genre_a,8,003,A
c5,,,,,genre_a,3,004,C
c6,Ecce,Ecce nomen,Ecce nomen euouae,1---fgh6------6h---k-3---ghj-4,genre_a,5,005,B
c7,Dum,Dum esset,Dum esset euouae,1--fgh--gf-3--ghjk-4,genre_a,1,006,C
c8,Tu,Tu es,Tu es euouae,1---fgh---gf-3---ghjk-4,genre_a,1,001,C
";

fn corpus() -> ChantTable {
    ChantTable::from_reader(CORPUS.as_bytes(), REQUIRED_COLUMNS).unwrap()
}

fn all_filters() -> Vec<Box<dyn ChantFilter>> {
    vec![
        Box::new(WithoutVolpiano),
        Box::new(WithoutNotes),
        Box::new(WithNonVolpianoChars),
        Box::new(WithFClef),
        Box::new(NotStartingWithGClef),
        Box::new(WithMissingPitches),
        Box::new(ByGenre::include(["genre_a"])),
        Box::new(ByGenre::exclude(["genre_a"])),
        Box::new(WithoutSimpleMode::default()),
        Box::new(WithoutSimpleMode::untransposed()),
        Box::new(WithoutFullText),
        Box::new(IncipitIsFullText),
        Box::new(DuplicatedNotes),
        Box::new(WithoutWordBoundary),
        Box::new(NotEndingOnEuouae),
        Box::new(StratifiedSample::new(0)),
        Box::new(StratifiedSample::new(11)),
    ]
}

#[test]
fn test_filters_return_subsets() {
    let table = corpus();
    let input: HashSet<&str> = table.ids().collect();

    for filter in all_filters() {
        let (filtered, report) = apply_filter(&table, filter.as_ref(), &mut NullLogger);
        assert!(filtered.len() <= table.len(), "{}", filter.name());
        assert!(
            filtered.ids().all(|id| input.contains(id)),
            "{} produced an unknown id",
            filter.name()
        );
        assert_eq!(report.after, filtered.len());
        assert_eq!(report.before, table.len());
    }
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CORPUS.as_bytes()).unwrap();

    let table = ChantTable::from_csv_path(file.path(), REQUIRED_COLUMNS).unwrap();
    assert_eq!(table, corpus());
}

#[test]
fn test_antiphon_chain_and_connections() {
    let mut logger = MemoryLogger::default();
    let (antiphons, reports) = antiphon_filters().run(&corpus(), &mut logger);

    // c2 repeats its incipit, c3 is transposed, c4 uses an F clef, c5 has
    // no volpiano and c7 has no word boundary
    assert_eq!(antiphons.ids().collect::<Vec<_>>(), vec!["c1", "c6", "c8"]);
    assert_eq!(reports.len(), 11);
    assert_eq!(logger.lines[0], "Filter Chants Without Volpiano:");
    assert_eq!(logger.lines[2], " > 12.50% removed (1 out of 8; 7 remain)");
    assert!(logger.lines.contains(&" * include_transposed=false".to_string()));

    let (rows, stats) = extract_connections(&antiphons, &ConnectionOptions::default());
    assert_eq!(stats.extracted, 3);
    assert_eq!(
        rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
        vec!["c1", "c6", "c8"]
    );
    assert_eq!(rows[0].differentia.len(), 15);
    assert_eq!(
        rows[0].differentia[11..].to_vec(),
        vec![Some(67), Some(69), Some(71), Some(72)]
    );

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("connections.csv");
    write_connections_csv(&rows, 15, &out).unwrap();
    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written.lines().count(), 4);
    assert!(written.starts_with("id,mode,siglum,-15,"));
}

#[test]
fn test_stratified_sample_on_corpus() {
    let table = corpus();
    let (sampled, _) = apply_filter(&table, &StratifiedSample::new(0), &mut NullLogger);

    let pairs: HashSet<(String, String)> = sampled
        .iter()
        .map(|r| (r.cantus_id.clone().unwrap(), r.mode.clone().unwrap()))
        .collect();
    assert_eq!(pairs.len(), sampled.len());
    // (001, 1) has three candidates, every other pair one
    assert_eq!(sampled.len(), 6);
}
