//! Gesture state machine.
//!
//! [`transition`] is pure: it consumes the current state and one event and
//! returns the next state plus the effects the session must execute, in order.

use super::events::{distance, midpoint, CanvasPoint, InputEvent};
use tilescope_core::{compose_affine_transformations, Mat3, Transform, Viewport};

/// Finger spread below which a pinch cannot be measured.
const MIN_PINCH_DISTANCE: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq)]
pub struct PanGesture {
    /// Pointer position at which the current drag started.
    pub anchor: CanvasPoint,
    /// Preview transform in effect when the drag started.
    pub base: Mat3,
    /// Latest preview transform.
    pub current: Mat3,
    /// Viewport at gesture start. Committed through `current` on release.
    pub snapshot_viewport: Viewport,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PinchGesture {
    /// Finger midpoint when the pinch started.
    pub anchor: CanvasPoint,
    pub initial_distance: f64,
    pub base: Mat3,
    pub current: Mat3,
    pub snapshot_viewport: Viewport,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning(PanGesture),
    Pinching(PinchGesture),
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }
}

/// Session values a transition reads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionContext {
    pub viewport: Viewport,
    pub canvas_size: (u32, u32),
    pub zoom_step: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Show the persistent raster through this pixel transform.
    Preview(Mat3),
    SetViewport(Viewport),
    /// Keep the previewed pixels and end the preview.
    Commit,
    /// Start a new render generation for the current viewport.
    Render,
}

pub fn transition(
    state: InteractionState,
    event: &InputEvent,
    ctx: &InteractionContext,
) -> (InteractionState, Vec<Effect>) {
    use InputEvent::*;
    use InteractionState::*;

    match (state, event) {
        // ===== Idle =====
        (Idle, PointerDown { x, y }) => (Panning(start_pan((*x, *y), ctx)), Vec::new()),

        (Idle, TouchStart { touches }) if touches.len() == 1 => {
            (Panning(start_pan(touches[0], ctx)), Vec::new())
        }

        (Idle, TouchStart { touches }) if touches.len() >= 2 => (
            Pinching(start_pinch(
                touches[0],
                touches[1],
                Mat3::identity(),
                ctx.viewport,
            )),
            Vec::new(),
        ),

        (
            Idle,
            Wheel {
                delta_y,
                offset_x,
                offset_y,
            },
        ) => (Idle, wheel_zoom(*delta_y, *offset_x, *offset_y, ctx)),

        // ===== Panning =====
        (Panning(pan), PointerMove { x, y }) => drag(pan, (*x, *y)),

        (Panning(pan), TouchMove { touches }) if touches.len() == 1 => drag(pan, touches[0]),

        (Panning(pan), PointerUp { .. } | PointerLeave) => {
            (Idle, finish(&pan.current, &pan.snapshot_viewport, ctx))
        }

        (Panning(pan), TouchEnd { touches }) if touches.is_empty() => {
            (Idle, finish(&pan.current, &pan.snapshot_viewport, ctx))
        }

        (Panning(pan), TouchStart { touches }) if touches.len() >= 2 => (
            Pinching(start_pinch(
                touches[0],
                touches[1],
                pan.current,
                pan.snapshot_viewport,
            )),
            Vec::new(),
        ),

        // ===== Pinching =====
        (Pinching(pinch), TouchMove { touches }) if touches.len() >= 2 => {
            pinch_move(pinch, touches[0], touches[1])
        }

        (Pinching(pinch), TouchEnd { touches }) if touches.len() == 1 => (
            Panning(PanGesture {
                anchor: touches[0],
                base: pinch.current,
                current: pinch.current,
                snapshot_viewport: pinch.snapshot_viewport,
            }),
            Vec::new(),
        ),

        (Pinching(pinch), TouchEnd { touches }) if touches.is_empty() => (
            Idle,
            finish(&pinch.current, &pinch.snapshot_viewport, ctx),
        ),

        (state, _) => (state, Vec::new()),
    }
}

fn start_pan(anchor: CanvasPoint, ctx: &InteractionContext) -> PanGesture {
    PanGesture {
        anchor,
        base: Mat3::identity(),
        current: Mat3::identity(),
        snapshot_viewport: ctx.viewport,
    }
}

fn start_pinch(
    a: CanvasPoint,
    b: CanvasPoint,
    base: Mat3,
    snapshot_viewport: Viewport,
) -> PinchGesture {
    PinchGesture {
        anchor: midpoint(a, b),
        initial_distance: distance(a, b),
        base,
        current: base,
        snapshot_viewport,
    }
}

fn drag(mut pan: PanGesture, position: CanvasPoint) -> (InteractionState, Vec<Effect>) {
    let drag = compose_affine_transformations([Transform::Translate {
        dx: position.0 - pan.anchor.0,
        dy: position.1 - pan.anchor.1,
    }]);
    pan.current = drag.multiply(&pan.base);
    let preview = pan.current;
    (InteractionState::Panning(pan), vec![Effect::Preview(preview)])
}

fn pinch_move(
    mut pinch: PinchGesture,
    a: CanvasPoint,
    b: CanvasPoint,
) -> (InteractionState, Vec<Effect>) {
    let factor = if pinch.initial_distance > MIN_PINCH_DISTANCE {
        distance(a, b) / pinch.initial_distance
    } else {
        1.0
    };
    let mid = midpoint(a, b);

    // Scale about the original midpoint, then follow the midpoint's travel.
    let gesture = compose_affine_transformations([
        Transform::Scale {
            factor,
            center_x: pinch.anchor.0,
            center_y: pinch.anchor.1,
        },
        Transform::Translate {
            dx: mid.0 - pinch.anchor.0,
            dy: mid.1 - pinch.anchor.1,
        },
    ]);
    pinch.current = gesture.multiply(&pinch.base);

    let preview = pinch.current;
    (InteractionState::Pinching(pinch), vec![Effect::Preview(preview)])
}

fn wheel_zoom(delta_y: f64, offset_x: f64, offset_y: f64, ctx: &InteractionContext) -> Vec<Effect> {
    if delta_y == 0.0 || !delta_y.is_finite() {
        return Vec::new();
    }

    let factor = if delta_y < 0.0 {
        ctx.zoom_step
    } else {
        1.0 / ctx.zoom_step
    };

    let preview = compose_affine_transformations([Transform::Scale {
        factor: 1.0 / factor,
        center_x: offset_x,
        center_y: offset_y,
    }]);

    vec![
        Effect::Preview(preview),
        Effect::SetViewport(
            ctx.viewport
                .zoom_at(offset_x, offset_y, factor, ctx.canvas_size),
        ),
        Effect::Commit,
        Effect::Render,
    ]
}

fn finish(current: &Mat3, snapshot_viewport: &Viewport, ctx: &InteractionContext) -> Vec<Effect> {
    vec![
        Effect::SetViewport(snapshot_viewport.apply_pixel_transform(current, ctx.canvas_size)),
        Effect::Commit,
        Effect::Render,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: (u32, u32) = (256, 256);

    fn ctx() -> InteractionContext {
        InteractionContext {
            viewport: Viewport::default(),
            canvas_size: CANVAS,
            zoom_step: 0.9,
        }
    }

    fn renders(effects: &[Effect]) -> usize {
        effects.iter().filter(|e| matches!(e, Effect::Render)).count()
    }

    fn set_viewport(effects: &[Effect]) -> Option<Viewport> {
        effects.iter().find_map(|e| match e {
            Effect::SetViewport(vp) => Some(*vp),
            _ => None,
        })
    }

    fn step(state: InteractionState, event: InputEvent) -> (InteractionState, Vec<Effect>) {
        transition(state, &event, &ctx())
    }

    #[test]
    fn pointer_down_starts_pan() {
        let (state, effects) = step(
            InteractionState::Idle,
            InputEvent::PointerDown { x: 10.0, y: 20.0 },
        );
        match state {
            InteractionState::Panning(pan) => {
                assert_eq!(pan.anchor, (10.0, 20.0));
                assert_eq!(pan.snapshot_viewport, Viewport::default());
            }
            other => panic!("expected Panning, got {:?}", other),
        }
        assert!(effects.is_empty());
    }

    #[test]
    fn pan_move_previews_translation_without_render() {
        let (state, _) = step(
            InteractionState::Idle,
            InputEvent::PointerDown { x: 10.0, y: 20.0 },
        );
        let (state, effects) = step(state, InputEvent::PointerMove { x: 40.0, y: 10.0 });

        assert!(matches!(state, InteractionState::Panning(_)));
        assert_eq!(effects, vec![Effect::Preview(Mat3::translation(30.0, -10.0))]);
    }

    #[test]
    fn pan_release_commits_translated_viewport() {
        let (state, _) = step(InteractionState::Idle, InputEvent::PointerDown { x: 0.0, y: 0.0 });
        let (state, _) = step(state, InputEvent::PointerMove { x: 64.0, y: 0.0 });
        let (state, effects) = step(state, InputEvent::PointerUp { x: 64.0, y: 0.0 });

        assert!(state.is_idle());
        assert_eq!(effects.len(), 3);
        assert!(matches!(effects[1], Effect::Commit));
        assert!(matches!(effects[2], Effect::Render));

        let vp = set_viewport(&effects).unwrap();
        assert!((vp.x - (-2.5 - 64.0 * 3.5 / 256.0)).abs() < 1e-12);
        assert!((vp.width - 3.5).abs() < 1e-12);
    }

    #[test]
    fn pointer_leave_ends_pan() {
        let (state, _) = step(InteractionState::Idle, InputEvent::PointerDown { x: 0.0, y: 0.0 });
        let (state, effects) = step(state, InputEvent::PointerLeave);
        assert!(state.is_idle());
        assert_eq!(renders(&effects), 1);
    }

    #[test]
    fn wheel_up_zooms_in_at_cursor() {
        let (state, effects) = step(
            InteractionState::Idle,
            InputEvent::Wheel {
                delta_y: -100.0,
                offset_x: 128.0,
                offset_y: 128.0,
            },
        );

        assert!(state.is_idle());
        assert_eq!(effects.len(), 4);
        assert_eq!(
            effects[0],
            Effect::Preview(Mat3::scale_around(1.0 / 0.9, 128.0, 128.0))
        );
        assert_eq!(renders(&effects), 1);

        let vp = set_viewport(&effects).unwrap();
        assert!((vp.width - 3.15).abs() < 1e-12);
        assert!((vp.height - 3.15).abs() < 1e-12);

        let before = Viewport::default().to_param(128.0, 128.0, CANVAS);
        let after = vp.to_param(128.0, 128.0, CANVAS);
        assert!((before.0 - after.0).abs() < 1e-12);
        assert!((before.1 - after.1).abs() < 1e-12);
    }

    #[test]
    fn wheel_down_zooms_out() {
        let (_, effects) = step(
            InteractionState::Idle,
            InputEvent::Wheel {
                delta_y: 3.0,
                offset_x: 0.0,
                offset_y: 0.0,
            },
        );
        let vp = set_viewport(&effects).unwrap();
        assert!((vp.width - 3.5 / 0.9).abs() < 1e-12);
    }

    #[test]
    fn zero_wheel_delta_is_ignored() {
        let (state, effects) = step(
            InteractionState::Idle,
            InputEvent::Wheel {
                delta_y: 0.0,
                offset_x: 5.0,
                offset_y: 5.0,
            },
        );
        assert!(state.is_idle());
        assert!(effects.is_empty());
    }

    #[test]
    fn two_finger_touch_starts_pinch() {
        let (state, effects) = step(
            InteractionState::Idle,
            InputEvent::TouchStart {
                touches: vec![(100.0, 100.0), (140.0, 100.0)],
            },
        );
        match state {
            InteractionState::Pinching(pinch) => {
                assert_eq!(pinch.anchor, (120.0, 100.0));
                assert!((pinch.initial_distance - 40.0).abs() < 1e-12);
            }
            other => panic!("expected Pinching, got {:?}", other),
        }
        assert!(effects.is_empty());
    }

    #[test]
    fn pinch_then_release_renders_once() {
        let (state, _) = step(
            InteractionState::Idle,
            InputEvent::TouchStart {
                touches: vec![(100.0, 100.0), (140.0, 100.0)],
            },
        );
        let (state, effects) = step(state, InputEvent::TouchEnd { touches: vec![] });

        assert!(state.is_idle());
        assert_eq!(renders(&effects), 1);
        assert_eq!(set_viewport(&effects), Some(Viewport::default()));
    }

    #[test]
    fn pinch_spread_previews_scale_about_midpoint() {
        let (state, _) = step(
            InteractionState::Idle,
            InputEvent::TouchStart {
                touches: vec![(100.0, 100.0), (140.0, 100.0)],
            },
        );
        let (state, effects) = step(
            state,
            InputEvent::TouchMove {
                touches: vec![(80.0, 100.0), (160.0, 100.0)],
            },
        );

        assert!(matches!(state, InteractionState::Pinching(_)));
        assert_eq!(
            effects,
            vec![Effect::Preview(Mat3::scale_around(2.0, 120.0, 100.0))]
        );

        let (_, effects) = step(state, InputEvent::TouchEnd { touches: vec![] });
        let vp = set_viewport(&effects).unwrap();
        assert!((vp.width - 1.75).abs() < 1e-12);
    }

    #[test]
    fn pinch_preview_scales_then_follows_midpoint() {
        let (state, _) = step(
            InteractionState::Idle,
            InputEvent::TouchStart {
                touches: vec![(100.0, 100.0), (140.0, 100.0)],
            },
        );
        let (_, effects) = step(
            state,
            InputEvent::TouchMove {
                touches: vec![(90.0, 110.0), (170.0, 110.0)],
            },
        );

        let preview = match effects.as_slice() {
            [Effect::Preview(m)] => *m,
            other => panic!("expected one preview, got {:?}", other),
        };
        // Old midpoint lands on the new one, a finger keeps its relative spot
        let (mx, my) = preview.apply(120.0, 100.0);
        assert!((mx - 130.0).abs() < 1e-12 && (my - 110.0).abs() < 1e-12);
        let (fx, fy) = preview.apply(140.0, 100.0);
        assert!((fx - 170.0).abs() < 1e-12 && (fy - 110.0).abs() < 1e-12);
    }

    #[test]
    fn pinch_to_single_finger_continues_as_pan() {
        let (state, _) = step(
            InteractionState::Idle,
            InputEvent::TouchStart {
                touches: vec![(100.0, 100.0), (140.0, 100.0)],
            },
        );
        let (state, _) = step(
            state,
            InputEvent::TouchMove {
                touches: vec![(80.0, 100.0), (160.0, 100.0)],
            },
        );
        let (state, effects) = step(
            state,
            InputEvent::TouchEnd {
                touches: vec![(160.0, 100.0)],
            },
        );
        assert!(effects.is_empty());

        let pan = match &state {
            InteractionState::Panning(pan) => pan.clone(),
            other => panic!("expected Panning, got {:?}", other),
        };
        assert_eq!(pan.anchor, (160.0, 100.0));
        assert_eq!(pan.base, Mat3::scale_around(2.0, 120.0, 100.0));

        let (_, effects) = step(
            state,
            InputEvent::TouchMove {
                touches: vec![(170.0, 100.0)],
            },
        );
        assert_eq!(
            effects,
            vec![Effect::Preview(
                Mat3::translation(10.0, 0.0).multiply(&Mat3::scale_around(2.0, 120.0, 100.0))
            )]
        );
    }

    #[test]
    fn pan_to_pinch_carries_pan_transform() {
        let (state, _) = step(
            InteractionState::Idle,
            InputEvent::TouchStart {
                touches: vec![(50.0, 50.0)],
            },
        );
        let (state, _) = step(
            state,
            InputEvent::TouchMove {
                touches: vec![(70.0, 50.0)],
            },
        );
        let (state, _) = step(
            state,
            InputEvent::TouchStart {
                touches: vec![(70.0, 50.0), (90.0, 50.0)],
            },
        );

        match state {
            InteractionState::Pinching(pinch) => {
                assert_eq!(pinch.base, Mat3::translation(20.0, 0.0));
                assert_eq!(pinch.current, Mat3::translation(20.0, 0.0));
            }
            other => panic!("expected Pinching, got {:?}", other),
        }
    }

    #[test]
    fn unlisted_events_are_ignored() {
        let (state, effects) = step(
            InteractionState::Idle,
            InputEvent::PointerMove { x: 1.0, y: 1.0 },
        );
        assert!(state.is_idle());
        assert!(effects.is_empty());

        let (pan, _) = step(InteractionState::Idle, InputEvent::PointerDown { x: 0.0, y: 0.0 });
        let (state, effects) = step(
            pan.clone(),
            InputEvent::Wheel {
                delta_y: -1.0,
                offset_x: 0.0,
                offset_y: 0.0,
            },
        );
        assert_eq!(state, pan);
        assert!(effects.is_empty());
    }
}
