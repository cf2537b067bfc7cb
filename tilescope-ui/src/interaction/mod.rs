mod events;
mod state;

pub use events::{CanvasPoint, InputEvent};
pub use state::{
    transition, Effect, InteractionContext, InteractionState, PanGesture, PinchGesture,
};
