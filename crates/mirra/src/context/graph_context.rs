use std::collections::HashMap;

use crate::reflection::{ObjectId, Reflect};

// -----------------------------------------------------------------------------
// GraphContext

/// The root document path.
pub const ROOT_PATH: &str = "#";

/// Per-call traversal state for graph conversion.
///
/// One context lives for exactly one top-level serialize or deserialize call;
/// it is never shared between concurrent calls. The serializer uses the visit
/// map to detect the second arrival at a shared node and emit a reference
/// marker instead of recursing forever; the deserializer uses the alias map to
/// resolve those markers back into handles.
#[derive(Default)]
pub struct GraphContext {
    path: Vec<String>,
    visited: HashMap<ObjectId, String>,
    aliases: HashMap<String, Box<dyn Reflect>>,
}

impl GraphContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a path segment. An empty name is a no-op, so unnamed roots do
    /// not pollute the path.
    pub fn enter(&mut self, name: &str) {
        if !name.is_empty() {
            self.path.push(name.to_owned());
        }
    }

    /// Pops the segment pushed by the matching [`enter`](Self::enter).
    pub fn exit(&mut self) {
        self.path.pop();
    }

    /// The JSON-Pointer-style path of the node currently being converted,
    /// `"#"` at the root.
    pub fn current_path(&self) -> String {
        if self.path.is_empty() {
            ROOT_PATH.to_owned()
        } else {
            let mut out = String::from(ROOT_PATH);
            for segment in &self.path {
                out.push('/');
                out.push_str(segment);
            }
            out
        }
    }

    /// Records `id` at the current path. Returns `false` when the object was
    /// already registered, which is exactly the cycle/aliasing case.
    pub fn try_register(&mut self, id: ObjectId) -> bool {
        if self.visited.contains_key(&id) {
            return false;
        }
        self.visited.insert(id, self.current_path());
        true
    }

    /// Drops a registration made by [`try_register`](Self::try_register).
    pub fn unregister(&mut self, id: ObjectId) {
        self.visited.remove(&id);
    }

    /// The path `id` was first reached at, or the root marker if unknown.
    pub fn path_of(&self, id: ObjectId) -> String {
        self.visited
            .get(&id)
            .cloned()
            .unwrap_or_else(|| ROOT_PATH.to_owned())
    }

    /// Deserialize side: remembers the handle materialized at `path` so later
    /// reference markers can alias it.
    pub fn record_alias(&mut self, path: String, handle: Box<dyn Reflect>) {
        self.aliases.insert(path, handle);
    }

    /// Produces a fresh alias of the handle recorded at `path`. `None` means
    /// the marker dangles.
    pub fn resolve_alias(&self, path: &str) -> Option<Box<dyn Reflect>> {
        self.aliases.get(path)?.reflect_clone()
    }

    /// Current recursion depth: number of segments below the root.
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::Shared;
    use crate::reflection::SharedNode;

    #[test]
    fn path_stack() {
        let mut cx = GraphContext::new();
        assert_eq!(cx.current_path(), "#");

        cx.enter("child");
        cx.enter(""); // no-op
        cx.enter("2");
        assert_eq!(cx.current_path(), "#/child/2");
        assert_eq!(cx.depth(), 2);

        cx.exit();
        assert_eq!(cx.current_path(), "#/child");
    }

    #[test]
    fn second_registration_reports_the_first_path() {
        let node = Shared::new(1_i32);
        let mut cx = GraphContext::new();

        assert!(cx.try_register(node.id()));
        cx.enter("next");
        assert!(!cx.try_register(node.id()));
        assert_eq!(cx.path_of(node.id()), "#");
    }

    #[test]
    fn alias_resolution_clones_the_handle() {
        let node = Shared::new(5_i32);
        let mut cx = GraphContext::new();
        cx.record_alias("#".to_owned(), node.alias());

        let alias = cx.resolve_alias("#").unwrap();
        let alias = alias.take::<Shared<i32>>().unwrap();
        assert!(alias.ptr_eq(&node));
        assert!(cx.resolve_alias("#/nope").is_none());
    }
}
