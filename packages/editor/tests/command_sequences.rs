//! Long command sequences against the structural invariants
//!
//! This tests:
//! - No section is ever empty
//! - No block ever sits directly under the document
//! - No two nodes ever share an id
//! - The selection always resolves inside a textblock

use proptest::prelude::*;
use proptest::sample::{select, Index};
use quire_document::{schema, Document, Node, Pos, Selection};
use quire_editor::{Command, EditSession, EditorConfig, Key};

fn config() -> EditorConfig {
    EditorConfig {
        id_seed: Some("walk".to_string()),
        ..EditorConfig::default()
    }
}

fn starting_document() -> Document {
    Document::new(vec![
        Node::section(vec![
            Node::heading(1, "Title"),
            Node::paragraph("First paragraph"),
            Node::code_block("fn main() {}"),
        ]),
        Node::section(vec![
            Node::paragraph("Second section"),
            Node::blockquote(vec![Node::paragraph("Quoted")]),
            Node::paragraph(""),
        ]),
    ])
}

#[derive(Debug, Clone)]
enum Action {
    Command(Command),
    Key(Key),
    Text(&'static str),
    /// Paste a copy of one of the current sections
    Paste(Index),
    /// Save and load again with the same config
    Reload,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Command(Command::SplitSection)),
        Just(Action::Command(Command::MergeSectionWithPrevious)),
        Just(Action::Command(Command::MergeSectionWithNext)),
        (2u8..=4).prop_map(|count| Action::Command(Command::InsertColumns { count })),
        (1u32..=3).prop_map(|w| Action::Command(Command::SetColumnWidths {
            widths: Some(vec![f64::from(w); 2]),
        })),
        Just(Action::Command(Command::SetColumnWidths { widths: None })),
        Just(Action::Command(Command::ToggleColumnBorders)),
        Just(Action::Command(Command::RemoveColumns)),
        Just(Action::Command(Command::UnwrapColumns)),
        Just(Action::Key(Key::Enter)),
        Just(Action::Key(Key::Backspace)),
        select(vec!["xy", "a", "é"]).prop_map(Action::Text),
        any::<Index>().prop_map(Action::Paste),
        Just(Action::Reload),
    ]
}

/// Cursor choice (textblock, offset, or the start when `false`) plus an action
fn step_strategy() -> impl Strategy<Value = (Index, Index, bool, Action)> {
    (
        any::<Index>(),
        any::<Index>(),
        any::<bool>(),
        action_strategy(),
    )
}

fn place_cursor(session: &mut EditSession, block: &Index, offset: &Index, inside: bool) {
    let paths = session.doc().textblock_paths();
    let path = paths[block.index(paths.len())].clone();
    let len = session.doc().node_at(&path).map(Node::text_len).unwrap_or(0);
    let offset = if inside { offset.index(len + 1) } else { 0 };
    session
        .set_selection(Selection::cursor(Pos::new(path, offset)))
        .unwrap();
}

fn perform(session: &mut EditSession, action: Action) {
    match action {
        Action::Command(command) => {
            session.execute(&command);
        }
        Action::Key(key) => {
            session.handle_key(&key);
        }
        Action::Text(text) => {
            session.insert_text(text);
        }
        Action::Paste(pick) => {
            let sections = &session.doc().content;
            let copied = sections[pick.index(sections.len())].clone();
            session.paste(vec![copied]);
        }
        Action::Reload => {
            let json = session.to_json().unwrap();
            *session = EditSession::from_json("walk".to_string(), &json, config()).unwrap();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// No empty section, no block under the document, no shared id, and a
    /// selection inside a textblock, after every action
    #[test]
    fn test_invariants_hold_across_edit_sequences(
        steps in prop::collection::vec(step_strategy(), 1..40)
    ) {
        let mut session = EditSession::new("walk".to_string(), starting_document(), config());
        prop_assert!(schema::check(session.doc()).is_empty());

        for (i, (block, offset, inside, action)) in steps.into_iter().enumerate() {
            place_cursor(&mut session, &block, &offset, inside);
            let label = format!("{:?}", action);
            perform(&mut session, action);

            let violations = schema::check(session.doc());
            prop_assert!(violations.is_empty(), "step {} ({}): {:?}", i, label, violations);
            prop_assert!(
                session.selection().is_valid_in(session.doc()),
                "step {} ({}): selection {:?} is invalid",
                i,
                label,
                session.selection()
            );
        }
    }
}

#[test]
fn test_split_everything_then_merge_everything() {
    let doc = Document::new(vec![Node::section(
        (0..6).map(|i| Node::paragraph(format!("p{}", i))).collect(),
    )]);
    let config = EditorConfig {
        id_seed: Some("all".to_string()),
        ..EditorConfig::default()
    };
    let mut session = EditSession::new("seq".to_string(), doc, config);

    // Split from the bottom up so every section ends with one paragraph
    for i in (1..6).rev() {
        session
            .set_selection(Selection::cursor(Pos::start_of(vec![0, i])))
            .unwrap();
        assert!(session.execute(&Command::SplitSection));
    }
    assert_eq!(session.doc().section_count(), 6);
    assert!(schema::check(session.doc()).is_empty());

    for _ in 0..5 {
        session
            .set_selection(Selection::cursor(Pos::start_of(vec![1, 0])))
            .unwrap();
        assert!(session.execute(&Command::MergeSectionWithPrevious));
    }
    assert_eq!(session.doc().section_count(), 1);

    let texts: Vec<_> = session.doc().content[0]
        .content()
        .iter()
        .filter_map(Node::text)
        .collect();
    assert_eq!(texts, vec!["p0", "p1", "p2", "p3", "p4", "p5"]);
    assert!(schema::check(session.doc()).is_empty());
}
