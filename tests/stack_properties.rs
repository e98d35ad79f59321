// Randomized sessions checking the undo/redo stack invariants

use pixel_invoker::graphics::{Props, ShapeType};
use pixel_invoker::{CommandKind, FlipType, GraphicsState, Invoker, MemoryGraphics, RotationType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_kind(rng: &mut StdRng) -> CommandKind {
    match rng.gen_range(0..5) {
        0 => CommandKind::Rotate(RotationType::Rotate(rng.gen_range(-720.0..720.0))),
        1 => CommandKind::Rotate(RotationType::SetAngle(rng.gen_range(-360.0..360.0))),
        2 => CommandKind::Flip(if rng.gen_bool(0.5) {
            FlipType::FlipX
        } else {
            FlipType::FlipY
        }),
        3 => CommandKind::AddShape {
            shape_type: ShapeType::Circle,
            options: Props::new(),
        },
        // Usually refers to an object that does not exist
        _ => CommandKind::RemoveObject(rng.gen_range(1..50)),
    }
}

#[tokio::test]
async fn test_random_sessions_keep_stack_invariants() {
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let invoker = Invoker::new(MemoryGraphics::default());

        for _ in 0..60 {
            let (undo_before, redo_before) = (invoker.undo_count(), invoker.redo_count());

            match rng.gen_range(0..3) {
                0 => match invoker.execute(random_kind(&mut rng)).await {
                    Ok(_) => {
                        assert_eq!(invoker.undo_count(), undo_before + 1);
                        assert_eq!(invoker.redo_count(), 0);
                    }
                    Err(_) => {
                        assert_eq!(invoker.undo_count(), undo_before);
                        assert_eq!(invoker.redo_count(), redo_before);
                    }
                },
                1 => match invoker.undo().await {
                    Ok(_) => {
                        assert_eq!(invoker.undo_count() + 1, undo_before);
                        assert_eq!(invoker.redo_count(), redo_before + 1);
                    }
                    Err(err) => {
                        assert!(err.is_empty_stack());
                        assert_eq!(undo_before, 0);
                    }
                },
                _ => match invoker.redo().await {
                    Ok(_) => {
                        assert_eq!(invoker.undo_count(), undo_before + 1);
                        assert_eq!(invoker.redo_count() + 1, redo_before);
                    }
                    Err(err) => {
                        assert!(err.is_empty_stack());
                        assert_eq!(redo_before, 0);
                    }
                },
            }

            let angle = invoker.graphics().lock().await.transform().angle;
            assert!(angle > -360.0 && angle < 360.0, "angle {} out of range", angle);
        }
    }
}

#[tokio::test]
async fn test_undo_all_then_redo_all_restores_state() {
    let mut rng = StdRng::seed_from_u64(7);
    let invoker = Invoker::new(MemoryGraphics::default());

    let mut executed = 0;
    while executed < 25 {
        if invoker.execute(random_kind(&mut rng)).await.is_ok() {
            executed += 1;
        }
    }
    let (transform, objects) = {
        let graphics = invoker.graphics();
        let graphics = graphics.lock().await;
        (graphics.transform(), graphics.objects())
    };

    while !invoker.is_empty_undo_stack() {
        invoker.undo().await.unwrap();
    }
    assert_eq!(invoker.redo_count(), 25);
    {
        let graphics = invoker.graphics();
        let graphics = graphics.lock().await;
        assert_eq!(graphics.transform(), Default::default());
        assert!(graphics.objects().is_empty());
    }

    while !invoker.is_empty_redo_stack() {
        invoker.redo().await.unwrap();
    }
    let graphics = invoker.graphics();
    let graphics = graphics.lock().await;
    assert_eq!(graphics.transform(), transform);
    assert_eq!(graphics.objects(), objects);
}
