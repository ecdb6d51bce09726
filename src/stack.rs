//! Last-in-first-out sequence used for the input, pending and output stacks.

use crate::error::ReduceError;

#[derive(Debug, Clone)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Stack<T> {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `item` on top.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Removes the top item.
    ///
    /// # Errors
    /// Popping an empty stack is a reducer defect ([`ReduceError::Internal`]).
    pub fn pop(&mut self) -> Result<T, ReduceError> {
        self.items
            .pop()
            .ok_or_else(|| ReduceError::internal("stack underflow"))
    }

    /// Returns the top item without removing it.
    pub fn top(&self) -> Option<&T> {
        self.items.last()
    }

    /// Replaces the top item, returning the previous one.
    pub fn replace_top(&mut self, item: T) -> Result<T, ReduceError> {
        let top = self
            .items
            .last_mut()
            .ok_or_else(|| ReduceError::internal("stack underflow"))?;
        Ok(std::mem::replace(top, item))
    }

    /// Pops the top item and pushes it onto `other`.
    pub fn move_top_to(&mut self, other: &mut Stack<T>) -> Result<(), ReduceError> {
        let item = self.pop()?;
        other.push(item);
        Ok(())
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
