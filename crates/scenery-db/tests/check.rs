use salsa::Setter as _;
use scenery_db::{Diagnostic, Document, DocumentParse as _, RootDatabase, diagnostics};
use scenery_errors::Severity;

#[derive(Debug, PartialEq, Eq)]
struct ExpectedDiag {
    line: usize,
    message: String,
}

#[derive(Debug, PartialEq, Eq)]
struct ActualDiag {
    line: usize,
    message: String,
}

fn parse_expectations(fixture: &str) -> Vec<ExpectedDiag> {
    let mut expected = Vec::new();

    for (idx, line) in fixture.lines().enumerate() {
        let Some((_, comment)) = line.split_once("#~") else {
            continue;
        };
        let comment = comment.trim();
        if comment.is_empty() {
            continue;
        }
        expected.push(ExpectedDiag { line: idx + 1, message: comment.to_owned() });
    }

    expected
}

fn collect_actual(
    db: &RootDatabase,
    document: Document,
    diagnostics: &[&Diagnostic],
) -> Vec<ActualDiag> {
    let line_index = document.line_index(db);
    let mut actual = diagnostics
        .iter()
        .map(|diag| {
            let line = line_index.line_col(diag.range().start()).line as usize + 1;
            ActualDiag { line, message: diag.message().to_owned() }
        })
        .collect::<Vec<_>>();
    actual.sort_by_key(|diag| (diag.line, diag.message.clone()));
    actual
}

#[track_caller]
fn check(fixture: &str) {
    let db = RootDatabase::default();
    let document = db.open("scene.yaml", fixture.to_owned());

    let diagnostics = diagnostics(&db, document);
    let mut actual = collect_actual(&db, document, &diagnostics);
    let mut expected = parse_expectations(fixture);

    expected.sort_by_key(|diag| (diag.line, diag.message.clone()));

    assert_eq!(
        expected.len(),
        actual.len(),
        "expected {} diagnostic(s), got {}\nexpected: {expected:#?}\nactual: {actual:#?}",
        expected.len(),
        actual.len(),
    );

    for expected_diag in expected {
        let Some(pos) = actual.iter().position(|diag| {
            diag.line == expected_diag.line && diag.message.contains(&expected_diag.message)
        }) else {
            panic!(
                "missing diagnostic on line {} containing `{}`\nactual: {actual:#?}",
                expected_diag.line, expected_diag.message
            );
        };
        actual.remove(pos);
    }

    assert!(actual.is_empty(), "unexpected diagnostics:\n{actual:#?}");
}

#[test]
fn clean_document() {
    check(
        r#"
sources:
  mapzen:
    type: TopoJSON
    url: "https://tile.example.com/{z}/{x}/{y}.topojson"
layers:
  earth:
    data: { source: mapzen }
    draw:
      polygons:
        color: [0.5, 0.5, 0.5]
"#,
    );
}

#[test]
fn recovery_keeps_reporting() {
    check(
        "\
a: [1, 2 #~ unterminated flow collection
b: ok
b: again #~ duplicate key `b`
  c: deeper #~ unexpected indentation
d: *nowhere #~ undefined alias `nowhere`
",
    );
}

#[test]
fn warnings_and_errors_keep_their_severity() {
    let db = RootDatabase::default();
    let document = db.open("scene.yaml", "a: 1\na: 2\nb: 'open\n".to_owned());

    let severities =
        diagnostics(&db, document).iter().map(|diag| diag.severity()).collect::<Vec<_>>();
    assert_eq!(severities, [Severity::Warning, Severity::Error]);
}

#[test]
fn edits_replace_the_tree() {
    let mut db = RootDatabase::default();
    let document = db.open("scene.yaml", "a: [1\n".to_owned());
    assert_eq!(diagnostics(&db, document).len(), 1);
    assert!(std::ptr::eq(document.tree(&db), document.tree(&db)));

    document.set_text(&mut db).to("a: [1]\n".to_owned());
    assert!(diagnostics(&db, document).is_empty());
    assert_eq!(document.tree(&db).len(), 5);
}
