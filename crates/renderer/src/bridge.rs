use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::types::OrbParameters;

/// Latest-value cell between the embedder and the frame loop.
///
/// Writes land immediately in the cell; the loop reads whatever is there at
/// the start of its next tick. Nothing is queued and nothing restarts.
#[derive(Debug)]
pub(crate) struct ParameterBridge {
    cell: Rc<RefCell<OrbParameters>>,
}

impl ParameterBridge {
    pub fn new(initial: OrbParameters) -> Self {
        Self {
            cell: Rc::new(RefCell::new(initial)),
        }
    }

    pub fn handle(&self) -> ParameterHandle {
        ParameterHandle {
            cell: Rc::clone(&self.cell),
        }
    }

    pub fn current(&self) -> Ref<'_, OrbParameters> {
        self.cell.borrow()
    }
}

/// Embedder-side writer for the visual parameters of one session.
///
/// Handles are cheap to clone and stay valid after the session is disposed;
/// writes then simply have no reader.
#[derive(Debug, Clone)]
pub struct ParameterHandle {
    cell: Rc<RefCell<OrbParameters>>,
}

impl ParameterHandle {
    pub fn set_hue(&self, hue: f32) {
        self.cell.borrow_mut().hue = hue;
    }

    pub fn set_hover_intensity(&self, hover_intensity: f32) {
        self.cell.borrow_mut().hover_intensity = hover_intensity;
    }

    pub fn set_rotate_on_hover(&self, rotate_on_hover: bool) {
        self.cell.borrow_mut().rotate_on_hover = rotate_on_hover;
    }

    pub fn set_force_hover_state(&self, force_hover_state: bool) {
        self.cell.borrow_mut().force_hover_state = force_hover_state;
    }

    pub fn set_background_color(&self, background_color: impl Into<String>) {
        self.cell.borrow_mut().background_color = background_color.into();
    }

    /// Applies several changes at once.
    pub fn update(&self, change: impl FnOnce(&mut OrbParameters)) {
        change(&mut self.cell.borrow_mut());
    }

    pub fn snapshot(&self) -> OrbParameters {
        self.cell.borrow().clone()
    }
}
