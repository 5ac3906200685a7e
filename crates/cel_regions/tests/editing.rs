mod common;

use cel_regions::{
    EditMode, EditOutcome, EditorState, Grid, IVec2, Pipeline, RegionEditor, RegionError, Rgb,
    Session, Vec2, View,
};
use common::*;

const WIDTH: u32 = 16;
const HEIGHT: u32 = 10;

/// A 10x4 red bar at x 2..=11, y 2..=5 in both views
fn bar_session() -> Session {
    let mut front = canvas(WIDTH, HEIGHT);
    fill_rect(&mut front, (2, 2), (11, 5), RED);
    let side = front.clone();
    session(front, side)
}

fn cut() -> Grid<cel_regions::Rgba> {
    scribble_rect(WIDTH, HEIGHT, (6, 2), (7, 5))
}

#[test]
fn test_divide_then_combine_restores_region() {
    let mut session = bar_session();
    let original = session.region(View::Front, 0).expect("Should exist").mask();

    let created = session
        .divide_region(View::Front, 0, &cut())
        .expect("Should divide");
    assert_eq!(created, vec![1, 2]);
    let left = session.region(View::Front, 1).expect("Should exist");
    let right = session.region(View::Front, 2).expect("Should exist");
    assert_eq!(left.area(), 20);
    assert_eq!(right.area(), 20);
    assert!(left.contains(IVec2::new(6, 3)));
    assert!(right.contains(IVec2::new(7, 3)));

    // new front regions get their own records, the side partner is left unlinked
    assert!(session.link_for(View::Front, 1).is_some());
    assert!(session.link_for(View::Front, 2).is_some());
    assert!(session.link_for(View::Side, 0).is_none());

    let absorbed = session
        .combine_regions(View::Front, 1, &cut())
        .expect("Should combine");
    assert_eq!(absorbed, vec![2]);
    let merged = session.region(View::Front, 1).expect("Should exist");
    assert_eq!(merged.mask(), original);
    assert!(session.link_for(View::Front, 2).is_none());
    assert_eq!(session.frame(View::Front).region_at(IVec2::new(11, 5)), Some(1));
}

#[test]
fn test_divide_side_region_keeps_front_record() {
    let mut session = bar_session();
    let created = session
        .divide_region(View::Side, 0, &cut())
        .expect("Should divide");
    assert_eq!(created.len(), 2);
    let record = session.link_for(View::Front, 0).expect("Should keep the record");
    assert_eq!(record.get(View::Side), None);
    for id in created {
        assert!(session.link_for(View::Side, id).is_none());
    }
}

#[test]
fn test_freehand_keeps_connected_paint_only() {
    let mut session = bar_session();
    let mut scribble = scribble_rect(WIDTH, HEIGHT, (12, 2), (13, 5));
    scribble.set(0, 8, cel_regions::Rgba::new(255, 0, 0, 255));

    session
        .modify_region(View::Front, 0, &scribble)
        .expect("Should modify");
    let region = session.region(View::Front, 0).expect("Should exist");
    assert_eq!(region.area(), 48);
    assert!(!region.contains(IVec2::new(0, 8)));
    assert_eq!(session.frame(View::Front).region_at(IVec2::new(13, 4)), Some(0));
}

#[test]
fn test_fill_region_holes() {
    let mut front = canvas(WIDTH, HEIGHT);
    fill_rect(&mut front, (1, 1), (7, 7), RED);
    fill_rect(&mut front, (3, 3), (5, 5), Rgb::WHITE);
    let side = front.clone();
    let mut session = Pipeline::builder()
        .absorb_line_art(false)
        .build()
        .process(front, side)
        .expect("Should process both views");

    assert_eq!(session.region(View::Front, 0).expect("Should exist").area(), 40);
    let added = session
        .fill_region_holes(View::Front, 0)
        .expect("Should fill");
    assert_eq!(added, 9);
    assert_eq!(session.region(View::Front, 0).expect("Should exist").area(), 49);
    assert_eq!(session.frame(View::Front).region_at(IVec2::new(4, 4)), Some(0));
    assert_eq!(session.fill_region_holes(View::Front, 0).expect("Should fill"), 0);
}

#[test]
fn test_translate_region() {
    let mut session = bar_session();
    session
        .translate_region(View::Front, 0, IVec2::new(2, 3))
        .expect("Should translate");

    let region = session.region(View::Front, 0).expect("Should exist");
    assert_eq!(region.bbox().min, IVec2::new(4, 5));
    assert_eq!(region.bbox().max, IVec2::new(13, 8));
    assert_eq!(region.area(), 40);
    assert_eq!(session.frame(View::Front).region_at(IVec2::new(2, 2)), None);
}

#[test]
fn test_editor_requires_selection() {
    let session = bar_session();
    let mut editor = RegionEditor::new(1);
    assert!(matches!(
        editor.begin(&session, EditMode::Divide),
        Err(RegionError::InvalidEditState(_))
    ));
    assert!(matches!(
        editor.select(&session, View::Front, 9),
        Err(RegionError::RegionNotFound { .. })
    ));
    assert_eq!(editor.state(), EditorState::Select { selection: None });
}

#[test]
fn test_editor_divide_flow() {
    let mut session = bar_session();
    let mut editor = RegionEditor::new(1);
    editor.select(&session, View::Front, 0).expect("Should select");
    editor.begin(&session, EditMode::Divide).expect("Should begin");
    assert_eq!(editor.mode(), Some(EditMode::Divide));
    assert!(editor.drag(IVec2::new(1, 0)).is_err());

    editor.paint(Vec2::new(6.0, 2.0)).expect("Should paint");
    editor.paint(Vec2::new(6.0, 5.0)).expect("Should paint");
    editor.end_stroke();

    let outcome = editor.commit(&mut session).expect("Should commit");
    let EditOutcome::Divided { original, created } = outcome else {
        panic!("Should divide, got {outcome:?}");
    };
    assert_eq!(original, 0);
    assert_eq!(created.len(), 2);
    let total: usize = created
        .iter()
        .map(|id| session.region(View::Front, *id).expect("Should exist").area())
        .sum();
    assert_eq!(total, 40);
    assert_eq!(editor.state(), EditorState::Select { selection: None });
    assert!(editor.scribble().is_none());
}

#[test]
fn test_editor_failed_commit_stays_active() {
    let mut session = bar_session();
    let mut editor = RegionEditor::new(1);
    editor.select(&session, View::Front, 0).expect("Should select");
    editor.begin(&session, EditMode::Divide).expect("Should begin");

    assert!(matches!(
        editor.commit(&mut session),
        Err(RegionError::ScribbleOutsideRegion(0))
    ));
    assert!(matches!(editor.state(), EditorState::Active { .. }));
    assert!(editor.select(&session, View::Side, 0).is_err());

    editor.cancel();
    assert_eq!(
        editor.state(),
        EditorState::Select {
            selection: Some((View::Front, 0))
        }
    );
    assert_eq!(session.frame(View::Front).len(), 1);
}

#[test]
fn test_editor_translate_flow() {
    let mut session = bar_session();
    let mut editor = RegionEditor::new(1);
    editor.select(&session, View::Front, 0).expect("Should select");
    editor.begin(&session, EditMode::Translate).expect("Should begin");
    assert!(editor.paint(Vec2::new(3.0, 3.0)).is_err());

    editor.drag(IVec2::new(1, 0)).expect("Should drag");
    editor.drag(IVec2::new(1, 1)).expect("Should drag");
    let first = session.region(View::Front, 0).expect("Should exist").boundary()[0];
    let preview = editor.preview_polygon(&session).expect("Should preview");
    assert_eq!(preview[0], first + IVec2::new(2, 1));

    let outcome = editor.commit(&mut session).expect("Should commit");
    assert_eq!(
        outcome,
        EditOutcome::Translated {
            id: 0,
            offset: IVec2::new(2, 1)
        }
    );
    assert_eq!(session.region(View::Front, 0).expect("Should exist").bbox().min, IVec2::new(4, 3));
    assert_eq!(editor.selection(), Some((View::Front, 0)));
}

#[test]
fn test_editor_combine_flow() {
    let mut session = bar_session();
    session
        .divide_region(View::Front, 0, &cut())
        .expect("Should divide");

    let mut editor = RegionEditor::new(1);
    editor.select(&session, View::Front, 1).expect("Should select");
    editor.begin(&session, EditMode::Combine).expect("Should begin");
    editor.paint(Vec2::new(6.0, 3.0)).expect("Should paint");
    editor.paint(Vec2::new(7.0, 3.0)).expect("Should paint");

    let outcome = editor.commit(&mut session).expect("Should commit");
    assert_eq!(
        outcome,
        EditOutcome::Combined {
            target: 1,
            absorbed: vec![2]
        }
    );
    assert_eq!(session.region(View::Front, 1).expect("Should exist").area(), 40);
    assert_eq!(session.frame(View::Front).len(), 1);
}
