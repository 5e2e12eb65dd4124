//! Session lifecycle, save locking and drag gestures

use folio_editor::testing::{
    source_bytes, FailAt, MemorySaveTarget, RecordingBackend, VecRenderer,
};
use folio_editor::{
    DragEffect, DragEvent, DragState, EditOutcome, Editor, EditorError, EditorOptions, LoadError,
    MutationError, PageCollection, PageId, Point, PointerSurface, Rect, ReconstructionStage,
    SaveCompletion, SessionError, Slot, SlotLayout,
};

fn loaded(pages: usize) -> Editor {
    let mut editor = Editor::default();
    editor
        .load(&VecRenderer::default(), "doc.pdf", source_bytes(pages))
        .unwrap();
    editor
}

/// One row of 100x140 slots with a 20px gap, in display order
fn row_layout(pages: &PageCollection) -> SlotLayout {
    let slots = pages
        .ids()
        .iter()
        .enumerate()
        .map(|(i, &page)| Slot {
            page,
            rect: Rect::new(i as f32 * 120.0, 0.0, 100.0, 140.0),
        })
        .collect();
    SlotLayout::new(slots)
}

fn press(page: u32, x: f32) -> DragEvent {
    DragEvent::PointerDown {
        page: PageId::from(page),
        position: Point::new(x, 70.0),
        surface: PointerSurface::Page,
    }
}

fn order(editor: &Editor) -> Vec<u32> {
    editor
        .session()
        .unwrap()
        .list()
        .iter()
        .map(|v| v.page.id().raw())
        .collect()
}

#[test]
fn test_load_replaces_previous_session() {
    let mut editor = loaded(3);
    let first = editor.session().unwrap().token();
    editor.session_mut().unwrap().rotate(PageId::from(0)).unwrap();

    editor
        .load(&VecRenderer::default(), "other.pdf", source_bytes(2))
        .unwrap();
    let session = editor.session().unwrap();

    assert_ne!(session.token(), first);
    assert_eq!(session.pages().len(), 2);
    assert!(session.pages().is_pristine());
    assert_eq!(session.source().name, "other.pdf");
}

#[test]
fn test_failed_render_leaves_no_session() {
    let mut editor = loaded(3);
    let result = editor.load(&VecRenderer { fail: true }, "bad.pdf", source_bytes(3));

    assert!(matches!(
        result,
        Err(EditorError::Load(LoadError::Render { ref name, .. })) if name == "bad.pdf"
    ));
    assert!(editor.session().is_none());
}

#[test]
fn test_thumbnails_follow_rotation() {
    let mut editor = loaded(2);
    let session = editor.session_mut().unwrap();
    session.rotate(PageId::from(1)).unwrap();

    let thumb = session.thumbnail(PageId::from(1)).unwrap();
    let size = thumb.display_size();
    assert_eq!((size.width, size.height), (84.0, 60.0));
    assert!(thumb.preview.has_image());
}

#[test]
fn test_save_without_document() {
    let mut editor = Editor::default();
    assert_eq!(editor.begin_save().unwrap_err(), SessionError::NoSession);
}

#[test]
fn test_second_save_is_rejected() {
    let mut editor = loaded(2);
    let ticket = editor.begin_save().unwrap();

    assert_eq!(editor.begin_save().unwrap_err(), SessionError::SaveInProgress);

    let result = ticket.run(&RecordingBackend::default());
    assert!(matches!(
        editor.finish_save(ticket.token, result),
        SaveCompletion::Completed(_)
    ));
    assert!(editor.begin_save().is_ok());
}

#[test]
fn test_mutations_locked_during_save() {
    let mut editor = loaded(3);
    let _ticket = editor.begin_save().unwrap();
    let session = editor.session_mut().unwrap();

    assert_eq!(session.rotate(PageId::from(0)), Err(MutationError::Locked));
    assert_eq!(session.toggle_deleted(PageId::from(0)), Err(MutationError::Locked));
    assert_eq!(
        session.reorder(PageId::from(0), PageId::from(2)),
        Err(MutationError::Locked)
    );
    assert!(session.pages().is_pristine());
}

#[test]
fn test_result_for_discarded_session_is_dropped() {
    let mut editor = loaded(2);
    let ticket = editor.begin_save().unwrap();
    let result = ticket.run(&RecordingBackend::default());

    editor
        .load(&VecRenderer::default(), "next.pdf", source_bytes(4))
        .unwrap();

    let completion = editor.finish_save(ticket.token, result);
    assert!(matches!(completion, SaveCompletion::Stale { token } if token == ticket.token));

    let session = editor.session().unwrap();
    assert!(!session.is_saving());
    assert_eq!(session.pages().len(), 4);
}

#[test]
fn test_failed_save_keeps_edits_and_allows_retry() {
    let mut editor = loaded(3);
    let session = editor.session_mut().unwrap();
    session.rotate(PageId::from(1)).unwrap();
    session.toggle_deleted(PageId::from(0)).unwrap();
    let before = session.list();
    let version = session.version();

    let mut target = MemorySaveTarget::default();
    let err = editor
        .save_with(&RecordingBackend::failing(FailAt::Copy(1)), &mut target)
        .unwrap_err();
    match err {
        EditorError::Reconstruction(e) => {
            assert_eq!(e.stage, ReconstructionStage::CopyPage { original_index: 1 })
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(target.saved.is_empty());

    let session = editor.session().unwrap();
    assert_eq!(session.list(), before);
    assert_eq!(session.version(), version);
    assert!(!session.is_saving());

    editor
        .save_with(&RecordingBackend::default(), &mut target)
        .unwrap();
    assert_eq!(target.saved.len(), 1);
}

#[test]
fn test_unreadable_source_fails_at_open() {
    let mut editor = loaded(1);
    let err = editor
        .save_with(&RecordingBackend::failing(FailAt::Open), &mut MemorySaveTarget::default())
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::Reconstruction(ref e) if e.stage == ReconstructionStage::OpenSource
    ));
}

#[test]
fn test_pointer_drag_commits_reorder() {
    let mut editor = loaded(3);
    let session = editor.session_mut().unwrap();
    let layout = row_layout(session.pages());
    session.set_layout(layout);

    session.drag_event(press(0, 50.0)).unwrap();
    let started = session
        .drag_event(DragEvent::PointerMove {
            position: Point::new(290.0, 70.0),
        })
        .unwrap();
    assert!(matches!(started.effect, DragEffect::DragStarted { .. }));
    // Nothing moves until the drop
    assert!(session.pages().is_pristine());

    let dropped = session
        .drag_event(DragEvent::PointerUp {
            position: Point::new(290.0, 70.0),
        })
        .unwrap();
    assert_eq!(
        dropped.effect,
        DragEffect::Committed {
            source: PageId::from(0),
            target: PageId::from(2),
            outcome: EditOutcome::Applied,
        }
    );
    assert_eq!(session.version(), 1);
    assert_eq!(order(&editor), vec![1, 2, 0]);
}

#[test]
fn test_drop_outside_grid_returns_page() {
    let mut editor = loaded(3);
    let session = editor.session_mut().unwrap();
    let layout = row_layout(session.pages());
    session.set_layout(layout);

    session.drag_event(press(1, 170.0)).unwrap();
    session
        .drag_event(DragEvent::PointerMove {
            position: Point::new(170.0, 400.0),
        })
        .unwrap();
    let released = session
        .drag_event(DragEvent::PointerUp {
            position: Point::new(170.0, 400.0),
        })
        .unwrap();

    assert_eq!(
        released.effect,
        DragEffect::Returned {
            active: PageId::from(1),
            display_index: Some(1),
        }
    );
    assert_eq!(session.drag().state(), DragState::Idle);
    assert_eq!(session.version(), 0);
    assert_eq!(order(&editor), vec![0, 1, 2]);
}

#[test]
fn test_cancelled_drag_keeps_order_and_version() {
    let mut editor = loaded(3);
    let session = editor.session_mut().unwrap();
    let layout = row_layout(session.pages());
    session.set_layout(layout);

    session.drag_event(press(0, 50.0)).unwrap();
    session
        .drag_event(DragEvent::PointerMove {
            position: Point::new(290.0, 70.0),
        })
        .unwrap();
    assert!(session.drag().is_dragging());

    let cancelled = session.drag_event(DragEvent::PointerCancel).unwrap();
    assert_eq!(
        cancelled.effect,
        DragEffect::Returned {
            active: PageId::from(0),
            display_index: Some(0),
        }
    );
    assert_eq!(session.drag().state(), DragState::Idle);
    assert_eq!(session.version(), 0);
    assert_eq!(order(&editor), vec![0, 1, 2]);
}

#[test]
fn test_keyboard_drag() {
    let mut editor = loaded(4);
    let session = editor.session_mut().unwrap();
    let layout = row_layout(session.pages());
    session.set_layout(layout);

    session
        .drag_event(DragEvent::KeyPickUp {
            page: PageId::from(3),
        })
        .unwrap();
    session.drag_event(DragEvent::KeyStep { offset: -2 }).unwrap();
    let dropped = session.drag_event(DragEvent::KeyDrop).unwrap();

    assert!(matches!(
        dropped.effect,
        DragEffect::Committed { target, .. } if target == PageId::from(1)
    ));
    assert_eq!(order(&editor), vec![0, 3, 1, 2]);
}

#[test]
fn test_save_cancels_active_drag() {
    let mut editor = loaded(3);
    let session = editor.session_mut().unwrap();
    let layout = row_layout(session.pages());
    session.set_layout(layout);
    session.drag_event(press(0, 50.0)).unwrap();
    session
        .drag_event(DragEvent::PointerMove {
            position: Point::new(290.0, 70.0),
        })
        .unwrap();

    let _ticket = editor.begin_save().unwrap();
    let session = editor.session_mut().unwrap();
    assert_eq!(session.drag().state(), DragState::Idle);
    assert_eq!(
        session
            .drag_event(DragEvent::PointerUp {
                position: Point::new(290.0, 70.0),
            })
            .unwrap_err(),
        MutationError::Locked
    );
    assert!(session.pages().is_pristine());
}

#[test]
fn test_custom_threshold_from_options() {
    let options: EditorOptions = serde_json::from_str(r#"{ "dragThreshold": 20.0 }"#).unwrap();
    let mut editor = Editor::new(options);
    let session = editor
        .load(&VecRenderer::default(), "doc.pdf", source_bytes(2))
        .unwrap();
    assert_eq!(session.drag().threshold(), 20.0);

    session.drag_event(press(0, 50.0)).unwrap();
    let moved = session
        .drag_event(DragEvent::PointerMove {
            position: Point::new(60.0, 70.0),
        })
        .unwrap();
    assert!(matches!(moved.effect, DragEffect::Noop { .. }));
}
