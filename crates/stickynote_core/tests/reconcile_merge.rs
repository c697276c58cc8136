use stickynote_core::{merge, Extent, Note, Point};

fn note(id: &str, position: (f64, f64), size: (f64, f64), order: i64) -> Note {
    Note::with_id(
        id,
        Point::new(position.0, position.1),
        Extent::new(size.0, size.1),
        "#fff59d",
        order,
    )
}

fn with_text(mut note: Note, text: &str, color: &str) -> Note {
    note.text = text.to_string();
    note.color = color.to_string();
    note
}

#[test]
fn shared_note_keeps_local_geometry_and_remote_content() {
    let local = vec![note("A", (10.0, 10.0), (200.0, 150.0), 5)];
    let remote = vec![with_text(
        note("A", (0.0, 0.0), (50.0, 50.0), 1),
        "hi",
        "#fff",
    )];

    let outcome = merge(&local, &remote);
    assert_eq!(outcome.notes.len(), 1);
    let merged = &outcome.notes[0];
    assert_eq!(merged.id, "A");
    assert_eq!(merged.position, Point::new(10.0, 10.0));
    assert_eq!(merged.size, Extent::new(200.0, 150.0));
    assert_eq!(merged.stack_order, 5);
    assert_eq!(merged.text, "hi");
    assert_eq!(merged.color, "#fff");
    assert_eq!(outcome.stack_counter, 6);
}

#[test]
fn local_only_notes_survive_unchanged_after_remote_notes() {
    let local_only = with_text(note("L", (1.0, 2.0), (120.0, 90.0), 9), "draft", "#abc");
    let local = vec![
        local_only.clone(),
        note("S", (3.0, 3.0), (200.0, 150.0), 2),
    ];
    let remote = vec![
        note("R", (0.0, 0.0), (200.0, 150.0), 4),
        with_text(note("S", (0.0, 0.0), (200.0, 150.0), 1), "server", "#def"),
    ];

    let outcome = merge(&local, &remote);
    let ids: Vec<&str> = outcome.notes.iter().map(|note| note.id.as_str()).collect();
    assert_eq!(ids, vec!["R", "S", "L"]);
    assert_eq!(outcome.notes[0], remote[0]);
    assert_eq!(outcome.notes[2], local_only);
    assert_eq!(outcome.stack_counter, 10);
}

#[test]
fn merge_is_idempotent_against_same_remote() {
    let local = vec![
        note("A", (10.0, 10.0), (200.0, 150.0), 5),
        note("B", (20.0, 20.0), (300.0, 200.0), 7),
    ];
    let remote = vec![
        with_text(note("A", (0.0, 0.0), (50.0, 50.0), 1), "a", "#111"),
        with_text(note("C", (9.0, 9.0), (100.0, 80.0), 12), "c", "#222"),
    ];

    let once = merge(&local, &remote);
    let twice = merge(&once.notes, &remote);
    assert_eq!(twice, once);
}

#[test]
fn counter_is_one_past_max_order_or_one_when_empty() {
    assert_eq!(merge(&[], &[]).stack_counter, 1);

    let local = vec![note("A", (0.0, 0.0), (200.0, 150.0), 41)];
    let remote = vec![note("B", (0.0, 0.0), (200.0, 150.0), 3)];
    let outcome = merge(&local, &remote);
    let max_order = outcome
        .notes
        .iter()
        .map(|note| note.stack_order)
        .max()
        .expect("merged set should not be empty");
    assert_eq!(outcome.stack_counter, max_order + 1);
    assert_eq!(outcome.stack_counter, 42);
}

#[test]
fn repeated_remote_ids_collapse_to_first_occurrence() {
    let local = vec![note("A", (10.0, 10.0), (200.0, 150.0), 5)];
    let remote = vec![
        with_text(note("A", (0.0, 0.0), (200.0, 150.0), 1), "first", "#111"),
        with_text(note("D", (4.0, 4.0), (200.0, 150.0), 2), "dup one", "#222"),
        with_text(note("A", (0.0, 0.0), (200.0, 150.0), 1), "second", "#333"),
        with_text(note("D", (8.0, 8.0), (200.0, 150.0), 30), "dup two", "#444"),
    ];

    let outcome = merge(&local, &remote);
    let ids: Vec<&str> = outcome.notes.iter().map(|note| note.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "D"]);
    assert_eq!(outcome.notes[0].text, "first");
    assert_eq!(outcome.notes[0].position, Point::new(10.0, 10.0));
    assert_eq!(outcome.notes[1], remote[1]);
    assert_eq!(outcome.stack_counter, 6);

    let again = merge(&outcome.notes, &remote);
    assert_eq!(again, outcome);
}
