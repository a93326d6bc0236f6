use super::*;
use pretty_assertions::assert_eq;
use refl_ir::SourceLocation;

fn node(kind: CursorKind, name: &str, children: Vec<Cursor>) -> Cursor {
    let mut cursor = Cursor::new(kind, name, SourceLocation::default());
    cursor.children = children;
    cursor
}

fn names<'a>(iter: impl Iterator<Item = &'a Cursor>) -> Vec<&'a str> {
    iter.map(|c| c.spelling.as_str()).collect()
}

#[test]
fn test_preorder_enters_namespaces_only() {
    let root = node(
        CursorKind::TranslationUnit,
        "",
        vec![
            node(
                CursorKind::Namespace,
                "game",
                vec![
                    node(
                        CursorKind::ClassDecl,
                        "Player",
                        vec![node(CursorKind::FieldDecl, "health", vec![])],
                    ),
                    node(CursorKind::EnumDecl, "Team", vec![]),
                ],
            ),
            node(CursorKind::StructDecl, "Point", vec![]),
        ],
    );

    assert_eq!(
        names(Declarations::new(&root)),
        vec!["game", "Player", "Team", "Point"]
    );
}

#[test]
fn test_stops_at_sentinel() {
    let root = node(
        CursorKind::TranslationUnit,
        "",
        vec![
            node(CursorKind::ClassDecl, "A", vec![]),
            node(
                CursorKind::Namespace,
                "ns",
                vec![
                    node(CursorKind::ClassDecl, "B", vec![]),
                    node(CursorKind::Invalid, "", vec![]),
                    node(CursorKind::ClassDecl, "C", vec![]),
                ],
            ),
            node(CursorKind::ClassDecl, "D", vec![]),
        ],
    );

    let mut walk = Declarations::new(&root).stop_at(CursorKind::Invalid);
    assert_eq!(names(walk.by_ref()), vec!["A", "ns", "B"]);
    assert!(walk.stopped_at_sentinel());
    // One-shot: nothing more after the sentinel
    assert!(walk.next().is_none());
}

#[test]
fn test_invalid_inside_record_does_not_stop() {
    let root = node(
        CursorKind::TranslationUnit,
        "",
        vec![
            node(
                CursorKind::ClassDecl,
                "A",
                vec![node(CursorKind::Invalid, "", vec![])],
            ),
            node(CursorKind::ClassDecl, "B", vec![]),
        ],
    );
    let mut walk = Declarations::new(&root).stop_at(CursorKind::Invalid);
    assert_eq!(names(walk.by_ref()), vec!["A", "B"]);
    assert!(!walk.stopped_at_sentinel());
}

#[test]
fn test_empty_root() {
    let root = node(CursorKind::TranslationUnit, "", vec![]);
    assert_eq!(Declarations::new(&root).count(), 0);
}
