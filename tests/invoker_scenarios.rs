// End-to-end editing sessions driven through the Invoker

use pixel_invoker::command::{FlipStatus, Outcome};
use pixel_invoker::graphics::{FilterType, GraphicsObject, ObjectKind, Props, ShapeType};
use pixel_invoker::{
    CommandError, CommandKind, FlipType, GraphicsState, Invoker, MemoryGraphics, RotationType,
    StackKind,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn load(name: &str, url: &str) -> CommandKind {
    CommandKind::LoadImage {
        name: name.into(),
        url: url.into(),
    }
}

fn rect(options: Props) -> CommandKind {
    CommandKind::AddShape {
        shape_type: ShapeType::Rect,
        options,
    }
}

async fn angle(invoker: &Invoker<MemoryGraphics>) -> f64 {
    invoker.graphics().lock().await.transform().angle
}

#[tokio::test]
async fn test_rotation_session_unwinds_to_original_image() {
    let graphics = MemoryGraphics::default().with_image_source("photo.png", 1024, 768);
    let invoker = Invoker::new(graphics);

    invoker.execute(load("photo", "photo.png")).await.unwrap();
    invoker
        .execute(CommandKind::Rotate(RotationType::SetAngle(10.0)))
        .await
        .unwrap();
    let rotated = invoker
        .execute(CommandKind::Rotate(RotationType::Rotate(10.0)))
        .await
        .unwrap();
    assert_eq!(rotated.angle(), Some(20.0));

    invoker.undo().await.unwrap();
    assert_eq!(angle(&invoker).await, 10.0);

    invoker.undo().await.unwrap();
    invoker.undo().await.unwrap();
    assert_eq!(angle(&invoker).await, 0.0);
    assert!(invoker.graphics().lock().await.image().is_none());
    assert!(invoker.is_empty_undo_stack());
    assert_eq!(invoker.redo_count(), 3);
}

#[tokio::test]
async fn test_removed_shape_comes_back_with_its_id() {
    let invoker = Invoker::new(MemoryGraphics::default());

    let mut options = Props::new();
    options.insert("fill".into(), json!("#ff0000"));
    options.insert("width".into(), json!(40));
    let added = invoker.execute(rect(options)).await.unwrap();
    assert_eq!(added.object_id(), Some(1));
    let original = invoker.graphics().lock().await.object(1).cloned().unwrap();

    invoker.execute(CommandKind::RemoveObject(1)).await.unwrap();
    assert!(invoker.graphics().lock().await.object(1).is_none());

    invoker.undo().await.unwrap();
    assert_eq!(
        invoker.graphics().lock().await.object(1).cloned(),
        Some(original)
    );

    invoker.redo().await.unwrap();
    assert!(invoker.graphics().lock().await.object(1).is_none());
    assert!(invoker.is_empty_redo_stack());
}

#[tokio::test]
async fn test_new_command_after_undo_drops_redo() {
    let invoker = Invoker::new(MemoryGraphics::default());

    for id in [10, 11] {
        invoker
            .execute(CommandKind::AddObject(GraphicsObject::new(id, ObjectKind::Text)))
            .await
            .unwrap();
    }
    invoker.undo().await.unwrap();
    assert_eq!(invoker.redo_count(), 1);

    invoker
        .execute(CommandKind::AddObject(GraphicsObject::new(12, ObjectKind::Text)))
        .await
        .unwrap();
    assert!(invoker.is_empty_redo_stack());
    assert_eq!(
        invoker.graphics().lock().await.object_ids(),
        vec![10, 12]
    );
}

#[tokio::test]
async fn test_flip_reset_and_back() {
    let invoker = Invoker::new(MemoryGraphics::default());

    invoker
        .execute(CommandKind::Flip(FlipType::FlipX))
        .await
        .unwrap();
    invoker
        .execute(CommandKind::Flip(FlipType::FlipX))
        .await
        .unwrap();
    let reset = invoker
        .execute(CommandKind::Flip(FlipType::Reset))
        .await
        .unwrap();
    assert_eq!(
        reset,
        Outcome::Flip(FlipStatus {
            flip_x: false,
            flip_y: false,
            angle: 0.0
        })
    );

    for _ in 0..3 {
        invoker.undo().await.unwrap();
    }
    let transform = invoker.graphics().lock().await.transform();
    assert!(!transform.flip_x);
    assert!(!transform.flip_y);
    assert_eq!(transform.angle, 0.0);
}

#[tokio::test]
async fn test_execute_undo_redo_gives_same_outcome() {
    let invoker = Invoker::new(MemoryGraphics::default());
    invoker.execute(rect(Props::new())).await.unwrap();

    let mut styles = Props::new();
    styles.insert("stroke".into(), json!("#00ff00"));
    let changed = invoker
        .execute(CommandKind::ChangeShape {
            id: 1,
            options: styles,
        })
        .await
        .unwrap();
    let after = invoker.graphics().lock().await.objects();

    invoker.undo().await.unwrap();
    let redone = invoker.redo().await.unwrap();

    assert_eq!(redone, changed);
    assert_eq!(invoker.graphics().lock().await.objects(), after);
}

#[tokio::test]
async fn test_failed_execute_changes_nothing() {
    let invoker = Invoker::new(MemoryGraphics::default());
    invoker.execute(rect(Props::new())).await.unwrap();
    invoker.execute(rect(Props::new())).await.unwrap();
    invoker.undo().await.unwrap();

    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    invoker.on_undo_stack_changed(move |_| *counter.lock().unwrap() += 1);

    let missing_image = invoker.execute(load("ghost", "ghost.png")).await;
    assert!(matches!(missing_image, Err(CommandError::ExecutionFailed(_))));

    let not_text = invoker
        .execute(CommandKind::ChangeText {
            id: 1,
            text: "hello".into(),
        })
        .await;
    assert!(matches!(not_text, Err(CommandError::ExecutionFailed(_))));

    let no_filter = invoker
        .execute(CommandKind::RemoveFilter(FilterType::Blur))
        .await;
    assert!(no_filter.is_err());

    assert_eq!(invoker.undo_count(), 1);
    assert_eq!(invoker.redo_count(), 1);
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_shortcut_on_empty_history_is_harmless() {
    let invoker = Invoker::new(MemoryGraphics::default());

    let err = invoker.undo().await.unwrap_err();
    assert!(err.is_empty_stack());
    assert_eq!(err, CommandError::EmptyStack(StackKind::Undo));
    assert_eq!(err.to_string(), "Undo stack is empty");
}

#[tokio::test]
async fn test_slow_load_does_not_let_later_commands_overtake() {
    let graphics = MemoryGraphics::default()
        .with_image_source("big.png", 4000, 3000)
        .with_load_delay(Duration::from_millis(50));
    let invoker = Invoker::new(graphics);

    let descriptions = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&descriptions);
    let observer = invoker.clone();
    invoker.on_undo_stack_changed(move |_| {
        seen.lock().unwrap().push(observer.undo_description());
    });

    let mut handles = Vec::new();
    for kind in [
        load("big", "big.png"),
        CommandKind::Rotate(RotationType::Rotate(90.0)),
        rect(Props::new()),
    ] {
        handles.push(tokio::spawn(invoker.execute(kind)));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(
        *descriptions.lock().unwrap(),
        vec![
            Some("Load Image 'big'".to_string()),
            Some("Rotate by 90°".to_string()),
            Some("Add Shape (rect)".to_string()),
        ]
    );
    // Neither the rotation nor the shape was wiped by the load
    assert_eq!(angle(&invoker).await, 90.0);
    assert_eq!(invoker.graphics().lock().await.object_count(), 1);
}

#[tokio::test]
async fn test_mask_filter_round_trip() {
    let invoker = Invoker::new(MemoryGraphics::default());
    invoker.execute(rect(Props::new())).await.unwrap();

    let mut options = Props::new();
    options.insert("maskObjId".into(), json!(1));
    invoker
        .execute(CommandKind::ApplyFilter {
            filter_type: FilterType::Mask,
            options,
        })
        .await
        .unwrap();
    {
        let graphics = invoker.graphics();
        let graphics = graphics.lock().await;
        assert!(graphics.has_filter(FilterType::Mask));
        assert!(graphics.object(1).is_none());
    }

    invoker.undo().await.unwrap();
    let graphics = invoker.graphics();
    let graphics = graphics.lock().await;
    assert!(!graphics.has_filter(FilterType::Mask));
    assert!(graphics.object(1).is_some());
}

#[tokio::test]
async fn test_stacked_masks_undo_one_at_a_time() {
    let invoker = Invoker::new(MemoryGraphics::default());
    invoker.execute(rect(Props::new())).await.unwrap();
    invoker.execute(rect(Props::new())).await.unwrap();

    for id in [1, 2] {
        let mut options = Props::new();
        options.insert("maskObjId".into(), json!(id));
        invoker
            .execute(CommandKind::ApplyFilter {
                filter_type: FilterType::Mask,
                options,
            })
            .await
            .unwrap();
    }
    assert!(invoker.graphics().lock().await.objects().is_empty());

    invoker.undo().await.unwrap();
    assert_eq!(invoker.graphics().lock().await.object_ids(), vec![2]);
    invoker.undo().await.unwrap();
    assert_eq!(invoker.graphics().lock().await.object_ids(), vec![1, 2]);
    assert!(
        !invoker
            .graphics()
            .lock()
            .await
            .has_filter(FilterType::Mask)
    );
    assert_eq!(invoker.undo_count(), 2);
    assert_eq!(invoker.redo_count(), 2);
}
