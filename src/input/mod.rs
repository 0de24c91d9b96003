//! Raw terminal input to game intents.

pub mod gesture;
pub mod handler;

pub use gesture::{JoystickReading, SwipeTracker, VirtualJoystick};
pub use handler::{InputHandler, KeyAction};
