// SPDX-License-Identifier: GPL-3.0-or-later
// src/host.rs
//
// Host side of the crop engine: containers it attaches to and the shared
// input surface that receives pointer moves during a drag.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifies one engine's drawing surface inside a container.
pub type SurfaceId = u64;

/// Child of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Drawing surface owned by a crop engine.
    Surface(SurfaceId),
    /// Any other host content (form fields, buttons, ...).
    Element(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointerKind {
    Move,
    Up,
}

#[derive(Debug, Default)]
struct InputState {
    next_id: u64,
    listeners: Vec<(u64, PointerKind)>,
}

/// Document-wide pointer listener registry.
///
/// Drags subscribe here rather than on their own container so that a pointer
/// leaving the container keeps being tracked.
#[derive(Debug, Clone, Default)]
pub struct InputSurface {
    state: Rc<RefCell<InputState>>,
}

impl InputSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty container living on this input surface.
    pub fn create_container(&self, name: &str) -> Container {
        Container {
            state: Rc::new(RefCell::new(ContainerState {
                name: name.to_owned(),
                children: Vec::new(),
                pointer_down: Vec::new(),
            })),
            input: self.clone(),
        }
    }

    /// Number of registered pointer-move and pointer-up listeners.
    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Register move and up listeners for one drag gesture.
    pub(crate) fn subscribe(&self) -> DragSubscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.push((id, PointerKind::Move));
        state.listeners.push((id, PointerKind::Up));
        log::trace!("drag subscription {id} acquired");

        DragSubscription {
            state: Rc::downgrade(&self.state),
            id,
        }
    }
}

/// Move/up listeners held for the duration of a drag; released on drop.
pub struct DragSubscription {
    state: Weak<RefCell<InputState>>,
    id: u64,
}

impl Drop for DragSubscription {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state
                .borrow_mut()
                .listeners
                .retain(|(id, _)| *id != self.id);
            log::trace!("drag subscription {} released", self.id);
        }
    }
}

impl fmt::Debug for DragSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DragSubscription({})", self.id)
    }
}

#[derive(Debug)]
struct ContainerState {
    name: String,
    children: Vec<Node>,
    pointer_down: Vec<SurfaceId>,
}

/// Element a crop engine inserts its surface into.
///
/// Cheap to clone; clones refer to the same element.
#[derive(Clone)]
pub struct Container {
    state: Rc<RefCell<ContainerState>>,
    input: InputSurface,
}

impl Container {
    pub fn name(&self) -> String {
        self.state.borrow().name.clone()
    }

    /// Append host content at the end of the child list.
    pub fn append(&self, node: Node) {
        self.state.borrow_mut().children.push(node);
    }

    pub fn children(&self) -> Vec<Node> {
        self.state.borrow().children.clone()
    }

    pub fn pointer_down_listener_count(&self) -> usize {
        self.state.borrow().pointer_down.len()
    }

    pub fn has_pointer_down(&self, surface: SurfaceId) -> bool {
        self.state.borrow().pointer_down.contains(&surface)
    }

    /// Whether both handles refer to the same element.
    pub fn same_as(&self, other: &Container) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Input surface this container belongs to.
    pub fn input(&self) -> &InputSurface {
        &self.input
    }

    pub(crate) fn insert_first(&self, node: Node) {
        self.state.borrow_mut().children.insert(0, node);
    }

    pub(crate) fn remove_child(&self, node: &Node) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.children.len();
        state.children.retain(|child| child != node);
        state.children.len() != before
    }

    pub(crate) fn add_pointer_down(&self, surface: SurfaceId) {
        let mut state = self.state.borrow_mut();
        if !state.pointer_down.contains(&surface) {
            state.pointer_down.push(surface);
        }
    }

    pub(crate) fn remove_pointer_down(&self, surface: SurfaceId) {
        self.state
            .borrow_mut()
            .pointer_down
            .retain(|id| *id != surface);
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Container")
            .field("name", &state.name)
            .field("children", &state.children)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_releases_on_drop() {
        let input = InputSurface::new();
        let first = input.subscribe();
        let second = input.subscribe();
        assert_eq!(input.listener_count(), 4);

        drop(first);
        assert_eq!(input.listener_count(), 2);
        drop(second);
        assert_eq!(input.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_input_is_harmless() {
        let input = InputSurface::new();
        let subscription = input.subscribe();
        drop(input);
        drop(subscription);
    }

    #[test]
    fn surfaces_are_inserted_before_host_content() {
        let input = InputSurface::new();
        let container = input.create_container("upload-resize");
        container.append(Node::Element("fwd".into()));
        container.insert_first(Node::Surface(7));

        assert_eq!(
            container.children(),
            vec![Node::Surface(7), Node::Element("fwd".into())]
        );
        assert!(container.remove_child(&Node::Surface(7)));
        assert!(!container.remove_child(&Node::Surface(7)));
    }

    #[test]
    fn identity_follows_the_element_not_the_name() {
        let input = InputSurface::new();
        let a = input.create_container("form");
        let b = input.create_container("form");
        assert!(a.same_as(&a.clone()));
        assert!(!a.same_as(&b));
    }

    #[test]
    fn pointer_down_registration_is_idempotent() {
        let input = InputSurface::new();
        let container = input.create_container("form");
        container.add_pointer_down(1);
        container.add_pointer_down(1);
        assert_eq!(container.pointer_down_listener_count(), 1);
        container.remove_pointer_down(1);
        assert!(!container.has_pointer_down(1));
    }
}
