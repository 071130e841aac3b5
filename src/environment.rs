use crate::value::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One scope frame. Frames are shared through `Rc<RefCell<_>>`: a closure
/// keeps its defining frame (and that frame's ancestors) alive for as long
/// as the closure itself is reachable.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Rc<Object>>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn enclosed(outer: Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Self {
            store: HashMap::new(),
            outer: Some(outer),
        }))
    }

    /// Looks `name` up in this frame, then outward along the chain.
    pub fn get(&self, name: &str) -> Option<Rc<Object>> {
        if let Some(value) = self.store.get(name) {
            Some(Rc::clone(value))
        } else if let Some(ref outer) = self.outer {
            outer.borrow().get(name)
        } else {
            None
        }
    }

    /// Binds in this frame only, shadowing any outer binding.
    pub fn set(&mut self, name: &str, value: Rc<Object>) -> Rc<Object> {
        self.store.insert(name.to_string(), Rc::clone(&value));
        value
    }

    /// Empties this frame, and every frame reachable through the functions it
    /// held, so that closures stored in the frame they captured stop keeping
    /// it alive. Frames already borrowed further up are being released by the
    /// caller and are skipped.
    pub fn release(&mut self) {
        let values: Vec<Rc<Object>> = self.store.drain().map(|(_, value)| value).collect();

        for value in &values {
            if let Object::Function(function) = &**value {
                if let Ok(mut captured) = function.environment.try_borrow_mut() {
                    captured.release();
                }
            }
        }
    }

    /// Bindings of this frame, sorted by name.
    pub fn entries(&self) -> Vec<(String, Rc<Object>)> {
        let mut entries: Vec<_> = self
            .store
            .iter()
            .map(|(name, value)| (name.clone(), Rc::clone(value)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}
