#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sfui_core::{
    DragGestureController, GestureConfig, GestureOutput, ListenerRegistry, Point, PointerEvent,
    PointerEventKind, Size,
};

#[derive(Debug, Arbitrary)]
enum Step {
    Down(i16, i16),
    Move(i16, i16),
    Up,
    Cancel,
    Click,
    Resize(u16, u16),
}

#[derive(Debug, Arbitrary)]
struct Input {
    element: (u16, u16),
    viewport: (u16, u16),
    steps: Vec<Step>,
}

fuzz_target!(|input: Input| {
    let listeners = ListenerRegistry::new();
    let config = GestureConfig::default();
    let margin = config.margin;
    let mut gc = DragGestureController::new(config, Point::new(20.0, 20.0), listeners.clone());

    let element = Size::new(f64::from(input.element.0 % 2000), f64::from(input.element.1 % 2000));
    let mut viewport = Size::new(
        f64::from(input.viewport.0 % 4000),
        f64::from(input.viewport.1 % 4000),
    );

    for step in input.steps.iter().take(512) {
        let event = match *step {
            Step::Down(x, y) => PointerEvent::down(f64::from(x), f64::from(y)),
            Step::Move(x, y) => PointerEvent::moved(f64::from(x), f64::from(y)),
            Step::Up => PointerEvent::up(0.0, 0.0),
            Step::Cancel => PointerEvent::cancel(),
            Step::Click => {
                gc.accept_click();
                continue;
            }
            Step::Resize(w, h) => {
                viewport = Size::new(f64::from(w % 4000), f64::from(h % 4000));
                gc.clamp_to(element, viewport);
                continue;
            }
        };

        let out = gc.process(&event, element, viewport);

        // Post-conditions that must always hold:
        if let GestureOutput::Moved(pos) = out {
            let max_x = (viewport.width - element.width - margin).max(margin);
            let max_y = (viewport.height - element.height - margin).max(margin);
            assert!(pos.x >= margin && pos.x <= max_x, "x out of bounds: {pos:?}");
            assert!(pos.y >= margin && pos.y <= max_y, "y out of bounds: {pos:?}");
        }
        if event.kind == PointerEventKind::Up || event.kind == PointerEventKind::Cancel {
            assert!(!gc.is_dragging());
        }
        assert_eq!(listeners.active(), usize::from(gc.is_dragging()));
        assert_eq!(gc.state().origin().is_some(), gc.is_dragging());
    }

    drop(gc);
    assert_eq!(listeners.active(), 0);
});
